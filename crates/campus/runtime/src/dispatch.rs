//! Request routing.
//!
//! A [`Request`] names a module, an entry point and its JSON arguments. The
//! entry and arguments are decoded together into a typed call; anything that
//! does not decode is rejected as an invalid call before any module runs.

use campus_guard::Guarded;
use campus_types::{
    AccountId, CertificateId, ClassId, CourseId, GradeId, LetterGrade, ModuleKind, Receipt,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::campus::Campus;
use crate::error::{CampusError, Result};

/// One call into a campus module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub caller: AccountId,
    pub module: ModuleKind,
    pub entry: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub args: Value,
}

impl Request {
    pub fn new(caller: AccountId, module: ModuleKind, entry: impl Into<String>, args: Value) -> Self {
        Self {
            caller,
            module,
            entry: entry.into(),
            args,
        }
    }
}

/// Result of a successful call: a receipt for mutations, a JSON value for
/// reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "camelCase")]
pub enum Response {
    Receipt(Receipt),
    Value(Value),
}

impl Response {
    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            Response::Receipt(r) => Some(r),
            Response::Value(_) => None,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Response::Value(v) => Some(v),
            Response::Receipt(_) => None,
        }
    }
}

fn value(v: impl Serialize) -> Result<Response> {
    Ok(Response::Value(serde_json::to_value(v)?))
}

// ============================================================================
// Entry points
// ============================================================================

/// Entry points every module exposes
#[derive(Debug, Deserialize)]
#[serde(tag = "entry", content = "args", rename_all = "camelCase")]
enum GuardCall {
    Pause,
    Unpause,
    TransferOwnership {
        #[serde(rename = "newOwner")]
        new_owner: AccountId,
    },
    RenounceOwnership,
    Owner,
    IsPaused,
    ReentryTest,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Call<M> {
    Guard(GuardCall),
    Module(M),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "entry", content = "args", rename_all = "camelCase")]
enum StudentsCall {
    #[serde(alias = "addClass")]
    AddClasses {
        ids: Vec<ClassId>,
    },
    DeleteClasses {
        ids: Vec<ClassId>,
    },
    RegisterStudents {
        students: Vec<AccountId>,
        class: ClassId,
    },
    DeleteStudents {
        students: Vec<AccountId>,
        class: ClassId,
    },
    UpdateStudent {
        student: AccountId,
        #[serde(rename = "oldClass")]
        old_class: ClassId,
        #[serde(rename = "newClass")]
        new_class: ClassId,
    },
    #[serde(alias = "updateTeacherContract")]
    LinkTeacherDirectory,
    GetAllClasses,
    GetTotalClasses,
    GetAllStudents {
        class: ClassId,
    },
    GetTotalStudents {
        class: ClassId,
    },
    GetStudent {
        student: AccountId,
    },
    DoesClassExist {
        class: ClassId,
    },
    DoesStudentExist {
        student: AccountId,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "entry", content = "args", rename_all = "camelCase")]
enum TeachersCall {
    RegisterTeachers {
        teachers: Vec<AccountId>,
        classes: Vec<ClassId>,
    },
    DeleteTeachers {
        teachers: Vec<AccountId>,
    },
    UpdateTeacher {
        teacher: AccountId,
        class: ClassId,
    },
    RegisterCourse {
        teacher: AccountId,
        courses: Vec<CourseId>,
        classes: Vec<ClassId>,
        modules: Vec<u8>,
    },
    DeleteCourses {
        courses: Vec<CourseId>,
        teacher: AccountId,
    },
    #[serde(alias = "updateStudentContract")]
    LinkStudentDirectory,
    GetAllTeachers,
    GetTotalTeachers,
    GetTeacher {
        teacher: AccountId,
    },
    GetAllCoursesByTeacher {
        teacher: AccountId,
    },
    GetTotalCoursesByTeacher {
        teacher: AccountId,
    },
    GetCourse {
        course: CourseId,
    },
    GetCourseTeacher {
        course: CourseId,
    },
    DoesTeacherExist {
        teacher: AccountId,
    },
    DoesCourseExist {
        course: CourseId,
    },
}

/// Grade argument: a raw scale value or a single letter (`"A"` to `"F"`)
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(try_from = "ScoreInput")]
struct ScoreArg(u8);

#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreInput {
    Value(u8),
    Letter(String),
}

impl TryFrom<ScoreInput> for ScoreArg {
    type Error = String;

    fn try_from(input: ScoreInput) -> std::result::Result<Self, Self::Error> {
        match input {
            ScoreInput::Value(value) => Ok(ScoreArg(value)),
            ScoreInput::Letter(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => LetterGrade::from_char(c)
                        .map(|letter| ScoreArg(letter.score().value()))
                        .map_err(|e| e.to_string()),
                    _ => Err(format!("invalid letter grade: {text:?}")),
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "entry", content = "args", rename_all = "camelCase")]
enum GradesCall {
    AddGrades {
        students: Vec<AccountId>,
        grades: Vec<ScoreArg>,
        course: CourseId,
        module: u8,
    },
    DeleteGrade {
        grade: GradeId,
    },
    UpdateGrade {
        grade: GradeId,
        score: ScoreArg,
    },
    #[serde(alias = "updateStudentAndTeacherContracts")]
    LinkDirectories,
    GetGrade {
        grade: GradeId,
    },
    GetAllGradesByStudent {
        student: AccountId,
    },
    GetTotalGradesByStudent {
        student: AccountId,
    },
    DoesGradeExist {
        grade: GradeId,
    },
    /// Role of `account`, or of the caller when omitted
    GetUserRole {
        #[serde(default)]
        account: Option<AccountId>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "entry", content = "args", rename_all = "camelCase")]
enum CredentialsCall {
    MintCertificate {
        owner: AccountId,
        grade: GradeId,
        course: CourseId,
        image: String,
    },
    UpdateCertificate {
        certificate: CertificateId,
        owner: AccountId,
        image: String,
    },
    #[serde(alias = "updateGradingAndTeacherContracts")]
    LinkDirectories,
    GetCertificate {
        certificate: CertificateId,
    },
    GetTotalCertificates,
    GetCertificatesOf {
        owner: AccountId,
    },
}

fn decode<M: DeserializeOwned>(request: &Request) -> Result<Call<M>> {
    let mut envelope = Map::new();
    envelope.insert("entry".into(), Value::String(request.entry.clone()));
    if !request.args.is_null() {
        envelope.insert("args".into(), request.args.clone());
    }
    serde_json::from_value(Value::Object(envelope)).map_err(|e| {
        debug!(module = %request.module, entry = %request.entry, error = %e, "Undecodable call");
        CampusError::InvalidCall {
            module: request.module,
            entry: request.entry.clone(),
        }
    })
}

// ============================================================================
// Execution
// ============================================================================

impl Campus {
    /// Route a request to its entry point. Committed events are appended to
    /// the journal; a failed call appends nothing.
    pub fn execute(&self, request: &Request) -> Result<Response> {
        let caller = &request.caller;
        let response = match request.module {
            ModuleKind::Students => match decode(request)? {
                Call::Guard(call) => guard_call(self.students(), caller, call)?,
                Call::Module(call) => self.students_call(caller, call)?,
            },
            ModuleKind::Teachers => match decode(request)? {
                Call::Guard(call) => guard_call(self.teachers(), caller, call)?,
                Call::Module(call) => self.teachers_call(caller, call)?,
            },
            ModuleKind::Grades => match decode(request)? {
                Call::Guard(call) => guard_call(self.grades(), caller, call)?,
                Call::Module(call) => self.grades_call(caller, call)?,
            },
            ModuleKind::Credentials => match decode(request)? {
                Call::Guard(call) => guard_call(self.credentials(), caller, call)?,
                Call::Module(call) => self.credentials_call(caller, call)?,
            },
        };

        if let Response::Receipt(receipt) = &response {
            self.journal().record(request.module, *caller, receipt);
        }
        Ok(response)
    }

    fn students_call(&self, caller: &AccountId, call: StudentsCall) -> Result<Response> {
        let students = self.students();
        Ok(match call {
            StudentsCall::AddClasses { ids } => Response::Receipt(students.add_classes(caller, &ids)?),
            StudentsCall::DeleteClasses { ids } => {
                Response::Receipt(students.delete_classes(caller, &ids)?)
            }
            StudentsCall::RegisterStudents { students: ids, class } => {
                Response::Receipt(students.register_students(caller, &ids, class)?)
            }
            StudentsCall::DeleteStudents { students: ids, class } => {
                Response::Receipt(students.delete_students(caller, &ids, class)?)
            }
            StudentsCall::UpdateStudent {
                student,
                old_class,
                new_class,
            } => Response::Receipt(students.update_student(caller, student, old_class, new_class)?),
            StudentsCall::LinkTeacherDirectory => {
                Response::Receipt(self.link_teacher_directory(caller)?)
            }
            StudentsCall::GetAllClasses => value(students.all_classes())?,
            StudentsCall::GetTotalClasses => value(students.total_classes())?,
            StudentsCall::GetAllStudents { class } => value(students.all_students(class))?,
            StudentsCall::GetTotalStudents { class } => {
                value(students.total_students(class))?
            }
            StudentsCall::GetStudent { student } => value(students.student(&student))?,
            StudentsCall::DoesClassExist { class } => value(students.class_exists(class))?,
            StudentsCall::DoesStudentExist { student } => {
                value(students.student_exists(&student))?
            }
        })
    }

    fn teachers_call(&self, caller: &AccountId, call: TeachersCall) -> Result<Response> {
        let teachers = self.teachers();
        Ok(match call {
            TeachersCall::RegisterTeachers {
                teachers: ids,
                classes,
            } => Response::Receipt(teachers.register_teachers(caller, &ids, &classes)?),
            TeachersCall::DeleteTeachers { teachers: ids } => {
                Response::Receipt(teachers.delete_teachers(caller, &ids)?)
            }
            TeachersCall::UpdateTeacher { teacher, class } => {
                Response::Receipt(teachers.update_teacher(caller, teacher, class)?)
            }
            TeachersCall::RegisterCourse {
                teacher,
                courses,
                classes,
                modules,
            } => Response::Receipt(teachers.register_course(
                caller, teacher, &courses, &classes, &modules,
            )?),
            TeachersCall::DeleteCourses { courses, teacher } => {
                Response::Receipt(teachers.delete_courses(caller, &courses, teacher)?)
            }
            TeachersCall::LinkStudentDirectory => {
                Response::Receipt(self.link_student_directory(caller)?)
            }
            TeachersCall::GetAllTeachers => value(teachers.all_teachers())?,
            TeachersCall::GetTotalTeachers => value(teachers.total_teachers())?,
            TeachersCall::GetTeacher { teacher } => value(teachers.teacher(&teacher))?,
            TeachersCall::GetAllCoursesByTeacher { teacher } => {
                value(teachers.courses_by_teacher(&teacher))?
            }
            TeachersCall::GetTotalCoursesByTeacher { teacher } => {
                value(teachers.total_courses_by_teacher(&teacher))?
            }
            TeachersCall::GetCourse { course } => value(teachers.course(course))?,
            TeachersCall::GetCourseTeacher { course } => {
                value(teachers.course_teacher(course))?
            }
            TeachersCall::DoesTeacherExist { teacher } => {
                value(teachers.teacher_exists(&teacher))?
            }
            TeachersCall::DoesCourseExist { course } => {
                value(teachers.course_exists(course))?
            }
        })
    }

    fn grades_call(&self, caller: &AccountId, call: GradesCall) -> Result<Response> {
        let grades = self.grades();
        Ok(match call {
            GradesCall::AddGrades {
                students,
                grades: scores,
                course,
                module,
            } => {
                let scores: Vec<u8> = scores.iter().map(|s| s.0).collect();
                Response::Receipt(grades.add_grades(caller, &students, &scores, course, module)?)
            }
            GradesCall::DeleteGrade { grade } => Response::Receipt(grades.delete_grade(caller, grade)?),
            GradesCall::UpdateGrade { grade, score } => {
                Response::Receipt(grades.update_grade(caller, grade, score.0)?)
            }
            GradesCall::LinkDirectories => Response::Receipt(self.link_grade_directories(caller)?),
            GradesCall::GetGrade { grade } => value(grades.grade(caller, grade)?)?,
            GradesCall::GetAllGradesByStudent { student } => {
                value(grades.grades_by_student(caller, &student)?)?
            }
            GradesCall::GetTotalGradesByStudent { student } => {
                value(grades.total_grades_by_student(caller, &student)?)?
            }
            GradesCall::DoesGradeExist { grade } => value(grades.grade_exists(grade))?,
            GradesCall::GetUserRole { account } => {
                let role = grades.role_of(&account.unwrap_or(*caller));
                Response::Value(json!({ "role": role.to_string(), "code": role.code() }))
            }
        })
    }

    fn credentials_call(&self, caller: &AccountId, call: CredentialsCall) -> Result<Response> {
        let credentials = self.credentials();
        Ok(match call {
            CredentialsCall::MintCertificate {
                owner,
                grade,
                course,
                image,
            } => Response::Receipt(credentials.mint(caller, owner, grade, course, image)?),
            CredentialsCall::UpdateCertificate {
                certificate,
                owner,
                image,
            } => Response::Receipt(credentials.update(caller, certificate, owner, image)?),
            CredentialsCall::LinkDirectories => {
                Response::Receipt(self.link_credential_directories(caller)?)
            }
            CredentialsCall::GetCertificate { certificate } => {
                value(credentials.certificate(certificate)?)?
            }
            CredentialsCall::GetTotalCertificates => {
                value(credentials.total_certificates())?
            }
            CredentialsCall::GetCertificatesOf { owner } => {
                value(credentials.certificates_of(&owner))?
            }
        })
    }
}

fn guard_call(module: &dyn Guarded, caller: &AccountId, call: GuardCall) -> Result<Response> {
    Ok(match call {
        GuardCall::Pause => Response::Receipt(module.pause(caller)?),
        GuardCall::Unpause => Response::Receipt(module.unpause(caller)?),
        GuardCall::TransferOwnership { new_owner } => {
            Response::Receipt(module.transfer_ownership(caller, new_owner)?)
        }
        GuardCall::RenounceOwnership => Response::Receipt(module.renounce_ownership(caller)?),
        GuardCall::Owner => value(module.owner())?,
        GuardCall::IsPaused => value(module.is_paused())?,
        GuardCall::ReentryTest => {
            module.reentry_check(caller)?;
            Response::Value(Value::Null)
        }
    })
}
