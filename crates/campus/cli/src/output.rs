//! Output formatting utilities

use campus_runtime::{JournalEntry, Response};
use serde_json::{json, Value};

use crate::script::Outcome;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

pub fn print_outcome(outcome: &Outcome, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", outcome_text(outcome)),
        OutputFormat::Json => println!("{}", outcome_json(outcome)),
    }
}

pub fn outcome_text(outcome: &Outcome) -> String {
    let head = format!(
        "[{}] {}.{}",
        outcome.index, outcome.request.module, outcome.request.entry
    );
    match &outcome.result {
        Err(e) => format!("{head} error: {e}"),
        Ok(Response::Value(value)) => format!("{head} = {value}"),
        Ok(Response::Receipt(receipt)) if receipt.is_empty() => format!("{head} ok"),
        Ok(Response::Receipt(receipt)) => {
            let mut text = format!("{head} ok");
            for event in receipt.events() {
                let mark = if event.is_rejection() { '!' } else { '+' };
                text.push_str(&format!("\n  {mark} {event}"));
            }
            text
        }
    }
}

pub fn outcome_json(outcome: &Outcome) -> Value {
    let mut line = json!({
        "step": outcome.index,
        "module": outcome.request.module,
        "entry": outcome.request.entry,
        "ok": outcome.is_ok(),
    });
    match &outcome.result {
        Ok(response) => {
            line["response"] = serde_json::to_value(response).unwrap_or(Value::Null);
        }
        Err(e) => line["error"] = Value::String(e.to_string()),
    }
    line
}

pub fn print_journal(entries: &[JournalEntry], format: OutputFormat) {
    for entry in entries {
        match format {
            OutputFormat::Text => println!(
                "#{} {} {} {}",
                entry.seq, entry.module, entry.caller, entry.event
            ),
            OutputFormat::Json => {
                println!("{}", serde_json::to_value(entry).unwrap_or(Value::Null))
            }
        }
    }
}
