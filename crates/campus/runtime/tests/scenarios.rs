//! End-to-end scenarios driven through `Campus::execute`.

use campus_runtime::{Campus, CampusConfig, CampusError, Request, Response};
use campus_types::{
    AccountId, ClassEvent, ClassId, CourseEvent, CourseId, Event, GradeEvent, ModuleKind, Role,
    StudentEvent,
};
use serde_json::{json, Value};

fn account(n: u64) -> AccountId {
    AccountId::from_low_u64(n)
}

fn owner() -> AccountId {
    account(1)
}

fn deploy() -> Campus {
    Campus::deploy(CampusConfig::default().with_owner(owner())).unwrap()
}

fn send(
    campus: &Campus,
    caller: AccountId,
    module: ModuleKind,
    entry: &str,
    args: Value,
) -> Result<Response, CampusError> {
    campus.execute(&Request::new(caller, module, entry, args))
}

fn read(campus: &Campus, module: ModuleKind, entry: &str, args: Value) -> Value {
    send(campus, owner(), module, entry, args)
        .unwrap()
        .value()
        .cloned()
        .unwrap()
}

#[test]
fn class_deletion_cascades_to_students() {
    let campus = deploy();
    let (a, b, c, d) = (account(11), account(12), account(13), account(14));

    send(&campus, owner(), ModuleKind::Students, "addClasses", json!({ "ids": [1, 2, 3] })).unwrap();
    send(
        &campus,
        owner(),
        ModuleKind::Students,
        "registerStudents",
        json!({ "students": [a, b], "class": 1 }),
    )
    .unwrap();
    send(
        &campus,
        owner(),
        ModuleKind::Students,
        "registerStudents",
        json!({ "students": [c, d], "class": 2 }),
    )
    .unwrap();

    assert_eq!(
        read(&campus, ModuleKind::Students, "getAllStudents", json!({ "class": 1 })),
        json!([a, b])
    );
    assert_eq!(
        read(&campus, ModuleKind::Students, "getTotalStudents", json!({ "class": 2 })),
        json!(2)
    );

    let response = send(&campus, owner(), ModuleKind::Students, "deleteClasses", json!({ "ids": [1] })).unwrap();
    let receipt = response.receipt().unwrap();
    assert!(receipt.contains(StudentEvent::Deleted(a)));
    assert!(receipt.contains(StudentEvent::Deleted(b)));
    assert!(receipt.contains(ClassEvent::Deleted(ClassId(1))));

    assert_eq!(
        read(&campus, ModuleKind::Students, "getAllStudents", json!({ "class": 1 })),
        json!([])
    );
    assert_eq!(
        read(&campus, ModuleKind::Students, "getAllClasses", Value::Null),
        json!([2, 3])
    );
    assert_eq!(
        read(&campus, ModuleKind::Students, "getTotalStudents", json!({ "class": 2 })),
        json!(2)
    );
    assert_eq!(
        read(&campus, ModuleKind::Students, "doesStudentExist", json!({ "student": a })),
        json!(false)
    );
}

#[test]
fn deleting_another_teachers_course_is_a_soft_rejection() {
    let campus = deploy();
    let (t, other) = (account(20), account(21));

    send(&campus, owner(), ModuleKind::Students, "addClasses", json!({ "ids": [1] })).unwrap();
    send(
        &campus,
        owner(),
        ModuleKind::Teachers,
        "registerTeachers",
        json!({ "teachers": [t, other], "classes": [1, 1] }),
    )
    .unwrap();
    send(
        &campus,
        t,
        ModuleKind::Teachers,
        "registerCourse",
        json!({ "teacher": t, "courses": [10, 11], "classes": [1, 1], "modules": [5, 5] }),
    )
    .unwrap();

    let response = send(
        &campus,
        other,
        ModuleKind::Teachers,
        "deleteCourses",
        json!({ "courses": [10], "teacher": other }),
    )
    .unwrap();
    let receipt = response.receipt().unwrap();
    assert_eq!(
        receipt.events(),
        &[Event::Course(CourseEvent::NotOwned(CourseId(10)))]
    );

    assert_eq!(
        read(&campus, ModuleKind::Teachers, "doesCourseExist", json!({ "course": 10 })),
        json!(true)
    );
    assert_eq!(
        read(&campus, ModuleKind::Teachers, "doesCourseExist", json!({ "course": 11 })),
        json!(true)
    );
    assert_eq!(
        read(&campus, ModuleKind::Teachers, "getCourseTeacher", json!({ "course": 11 })),
        json!(t)
    );
}

#[test]
fn grade_batch_commits_valid_students_only() {
    let campus = deploy();
    let (t, s) = (account(20), account(30));

    send(&campus, owner(), ModuleKind::Students, "addClasses", json!({ "ids": [1] })).unwrap();
    send(
        &campus,
        owner(),
        ModuleKind::Students,
        "registerStudents",
        json!({ "students": [s], "class": 1 }),
    )
    .unwrap();
    send(
        &campus,
        owner(),
        ModuleKind::Teachers,
        "registerTeachers",
        json!({ "teachers": [t], "classes": [1] }),
    )
    .unwrap();
    send(
        &campus,
        t,
        ModuleKind::Teachers,
        "registerCourse",
        json!({ "teacher": t, "courses": [10], "classes": [1], "modules": [3] }),
    )
    .unwrap();

    let response = send(
        &campus,
        t,
        ModuleKind::Grades,
        "addGrades",
        json!({ "students": [s, AccountId::ZERO], "grades": [5, 4], "course": 10, "module": 1 }),
    )
    .unwrap();
    let receipt = response.receipt().unwrap();
    assert_eq!(receipt.accepted().count(), 1);
    assert_eq!(
        receipt.rejections().copied().collect::<Vec<_>>(),
        vec![Event::Grade(GradeEvent::ZeroIdentity)]
    );

    assert_eq!(
        read(&campus, ModuleKind::Grades, "getTotalGradesByStudent", json!({ "student": s })),
        json!(1)
    );

    // Re-submitting the batch with a newly enrolled student grades only the
    // new one; scores may be given as letters.
    let late = account(31);
    send(
        &campus,
        owner(),
        ModuleKind::Students,
        "registerStudents",
        json!({ "students": [late], "class": 1 }),
    )
    .unwrap();
    let response = send(
        &campus,
        t,
        ModuleKind::Grades,
        "addGrades",
        json!({ "students": [s, late], "grades": [6, "b"], "course": 10, "module": 1 }),
    )
    .unwrap();
    let receipt = response.receipt().unwrap();
    assert_eq!(
        receipt.rejections().copied().collect::<Vec<_>>(),
        vec![Event::Grade(GradeEvent::AlreadyAssigned {
            student: s,
            course: CourseId(10),
            module: 1,
        })]
    );
    let grade = match receipt.accepted().copied().collect::<Vec<_>>()[..] {
        [Event::Grade(GradeEvent::Added { grade, student })] if student == late => grade,
        ref other => panic!("unexpected events: {other:?}"),
    };
    assert_eq!(
        read(&campus, ModuleKind::Grades, "getGrade", json!({ "grade": grade }))["score"],
        json!(5)
    );
    assert_eq!(
        read(&campus, ModuleKind::Grades, "getTotalGradesByStudent", json!({ "student": s })),
        json!(1)
    );
}

#[test]
fn certificate_follows_a_committed_grade() {
    let campus = deploy();
    let (t, s) = (account(20), account(30));

    send(&campus, owner(), ModuleKind::Students, "addClasses", json!({ "ids": [1] })).unwrap();
    send(
        &campus,
        owner(),
        ModuleKind::Students,
        "registerStudents",
        json!({ "students": [s], "class": 1 }),
    )
    .unwrap();
    send(
        &campus,
        owner(),
        ModuleKind::Teachers,
        "registerTeachers",
        json!({ "teachers": [t], "classes": [1] }),
    )
    .unwrap();
    send(
        &campus,
        owner(),
        ModuleKind::Teachers,
        "registerCourse",
        json!({ "teacher": t, "courses": [10], "classes": [1], "modules": [1] }),
    )
    .unwrap();
    let response = send(
        &campus,
        t,
        ModuleKind::Grades,
        "addGrades",
        json!({ "students": [s], "grades": [6], "course": 10, "module": 1 }),
    )
    .unwrap();
    let grade = match response.receipt().unwrap().events() {
        [Event::Grade(GradeEvent::Added { grade, .. })] => *grade,
        other => panic!("unexpected events: {other:?}"),
    };

    send(
        &campus,
        t,
        ModuleKind::Credentials,
        "mintCertificate",
        json!({ "owner": s, "grade": grade, "course": 10, "image": "ipfs://cert" }),
    )
    .unwrap();
    assert_eq!(
        read(&campus, ModuleKind::Credentials, "getCertificatesOf", json!({ "owner": s }))
            .as_array()
            .map(Vec::len),
        Some(1)
    );

    // A student may not mint.
    let err = send(
        &campus,
        s,
        ModuleKind::Credentials,
        "mintCertificate",
        json!({ "owner": s, "grade": grade, "course": 10, "image": "ipfs://forged" }),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CampusError::Credential(campus_credential::CredentialError::Unauthorized(_))
    ));
    assert_eq!(campus.credentials().total_certificates(), 1);
}

#[test]
fn deleting_a_teacher_drops_their_courses_and_role() {
    let campus = deploy();
    let t = account(20);

    send(
        &campus,
        owner(),
        ModuleKind::Teachers,
        "registerTeachers",
        json!({ "teachers": [t], "classes": [1] }),
    )
    .unwrap();
    send(
        &campus,
        owner(),
        ModuleKind::Teachers,
        "registerCourse",
        json!({ "teacher": t, "courses": [10, 11], "classes": [1, 1], "modules": [2, 2] }),
    )
    .unwrap();
    assert_eq!(campus.role_of(&t), Role::Teacher);

    send(&campus, owner(), ModuleKind::Teachers, "deleteTeachers", json!({ "teachers": [t] })).unwrap();
    assert_eq!(campus.role_of(&t), Role::Unauthorized);
    assert_eq!(
        read(&campus, ModuleKind::Teachers, "doesCourseExist", json!({ "course": 10 })),
        json!(false)
    );
    assert_eq!(
        read(&campus, ModuleKind::Teachers, "getCourse", json!({ "course": 11 })),
        Value::Null
    );
}

#[test]
fn paused_module_rejects_mutations_but_serves_reads() {
    let campus = deploy();
    send(&campus, owner(), ModuleKind::Students, "addClasses", json!({ "ids": [1] })).unwrap();
    send(&campus, owner(), ModuleKind::Students, "pause", Value::Null).unwrap();

    let err = send(&campus, owner(), ModuleKind::Students, "addClasses", json!({ "ids": [2] })).unwrap_err();
    assert_eq!(err.guard_error(), Some(campus_guard::GuardError::Paused));
    assert_eq!(
        read(&campus, ModuleKind::Students, "getTotalClasses", Value::Null),
        json!(1)
    );

    // Other modules keep running.
    send(
        &campus,
        owner(),
        ModuleKind::Teachers,
        "registerTeachers",
        json!({ "teachers": [account(20)], "classes": [1] }),
    )
    .unwrap();

    send(&campus, owner(), ModuleKind::Students, "unpause", Value::Null).unwrap();
    send(&campus, owner(), ModuleKind::Students, "addClasses", json!({ "ids": [2] })).unwrap();
}

#[test]
fn reentry_is_rejected_with_caller_on_every_module() {
    let campus = deploy();
    for caller in [owner(), account(42)] {
        for module in ModuleKind::ALL {
            let err = send(&campus, caller, module, "reentryTest", Value::Null).unwrap_err();
            assert_eq!(
                err.guard_error(),
                Some(campus_guard::GuardError::AccountLocked(caller))
            );
        }
    }
}
