//! Score scale and letter-grade conversion.
//!
//! Scores live on a closed 0-6 scale. 1..=6 map to the letters F through A;
//! 0 marks an empty slot and is never stored against a grade.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest value on the score scale
pub const MAX_SCORE: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    #[error("score {0} is outside the 0-{max} scale", max = MAX_SCORE)]
    OutOfRange(u8),

    #[error("score 0 marks an empty slot and cannot be assigned")]
    Ungraded,

    #[error("unknown letter grade: {0}")]
    UnknownLetter(char),
}

/// A value on the 0-6 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const UNGRADED: Score = Score(0);

    /// Any value on the scale, including the empty-slot marker.
    pub fn new(value: u8) -> Result<Self, ScoreError> {
        if value > MAX_SCORE {
            return Err(ScoreError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    /// A value that can be recorded against a grade (1..=6).
    pub fn assigned(value: u8) -> Result<Self, ScoreError> {
        match Self::new(value)? {
            Score(0) => Err(ScoreError::Ungraded),
            score => Ok(score),
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }

    pub fn letter(self) -> Option<LetterGrade> {
        LetterGrade::from_score(self)
    }
}

impl TryFrom<u8> for Score {
    type Error = ScoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Score::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> u8 {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.letter() {
            Some(letter) => write!(f, "{} ({})", self.0, letter),
            None => f.write_str("0 (ungraded)"),
        }
    }
}

/// Letter grades, worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LetterGrade {
    F,
    E,
    D,
    C,
    B,
    A,
}

const LETTER_TABLE: [(u8, LetterGrade, char); 6] = [
    (1, LetterGrade::F, 'F'),
    (2, LetterGrade::E, 'E'),
    (3, LetterGrade::D, 'D'),
    (4, LetterGrade::C, 'C'),
    (5, LetterGrade::B, 'B'),
    (6, LetterGrade::A, 'A'),
];

impl LetterGrade {
    pub fn from_score(score: Score) -> Option<Self> {
        LETTER_TABLE
            .iter()
            .find(|(value, _, _)| *value == score.0)
            .map(|(_, letter, _)| *letter)
    }

    pub fn score(self) -> Score {
        LETTER_TABLE
            .iter()
            .find(|(_, letter, _)| *letter == self)
            .map(|(value, _, _)| Score(*value))
            .unwrap_or(Score::UNGRADED)
    }

    pub fn as_char(self) -> char {
        LETTER_TABLE
            .iter()
            .find(|(_, letter, _)| *letter == self)
            .map(|(_, _, c)| *c)
            .unwrap_or('?')
    }

    pub fn from_char(c: char) -> Result<Self, ScoreError> {
        let upper = c.to_ascii_uppercase();
        LETTER_TABLE
            .iter()
            .find(|(_, _, ch)| *ch == upper)
            .map(|(_, letter, _)| *letter)
            .ok_or(ScoreError::UnknownLetter(c))
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_bounds() {
        assert!(Score::new(0).is_ok());
        assert!(Score::new(6).is_ok());
        assert_eq!(Score::new(7), Err(ScoreError::OutOfRange(7)));
        assert_eq!(Score::assigned(0), Err(ScoreError::Ungraded));
        assert_eq!(Score::assigned(9), Err(ScoreError::OutOfRange(9)));
    }

    #[test]
    fn test_letter_table_is_bidirectional() {
        for value in 1..=MAX_SCORE {
            let score = Score::assigned(value).unwrap();
            let letter = score.letter().unwrap();
            assert_eq!(letter.score(), score);
            assert_eq!(LetterGrade::from_char(letter.as_char()).unwrap(), letter);
        }
        assert_eq!(Score::UNGRADED.letter(), None);
    }

    #[test]
    fn test_letter_endpoints() {
        assert_eq!(Score::assigned(1).unwrap().letter(), Some(LetterGrade::F));
        assert_eq!(Score::assigned(6).unwrap().letter(), Some(LetterGrade::A));
        assert_eq!(LetterGrade::from_char('b').unwrap(), LetterGrade::B);
        assert_eq!(LetterGrade::from_char('G'), Err(ScoreError::UnknownLetter('G')));
    }

    #[test]
    fn test_serde_rejects_out_of_scale() {
        assert_eq!(serde_json::from_str::<Score>("4").unwrap().value(), 4);
        assert!(serde_json::from_str::<Score>("12").is_err());
    }
}
