use std::sync::{Arc, Mutex};

use axum::http::Method;
use client::collection::run;
use client::{Change, OptimisticList};
use pretty_assertions::assert_eq;
use shared_types::{
    summarize, AppErrorKind, Grade, Notice, NoticeLevel, ResultForm, ResultRecord,
    MARKS_RANGE_MESSAGE,
};

use crate::common::{Backend, Recorder};

#[tokio::test]
async fn test_out_of_range_marks_never_reach_backend() {
    let backend = Backend::start().await;
    let _api = backend.client_as("tom@school.test").await;

    for marks in ["101", "-1", "abc", ""] {
        let form = ResultForm {
            student_id: "s1".into(),
            subject: "Math".into(),
            marks: marks.into(),
        };
        let err = form.validate().unwrap_err();
        assert!(err.is_validation(), "marks {marks:?} accepted");
    }
    let form = ResultForm {
        student_id: "s1".into(),
        subject: "Math".into(),
        marks: "101".into(),
    };
    assert_eq!(form.validate().unwrap_err().message, MARKS_RANGE_MESSAGE);
    assert_eq!(backend.count(Method::POST, "/add-result"), 0);
}

#[tokio::test]
async fn test_teacher_adds_result_for_assigned_student() {
    let backend = Backend::start().await;
    let api = backend.client_as("tom@school.test").await;
    let session = api.session().session().unwrap();

    let form = ResultForm {
        student_id: "s1".into(),
        subject: "Science".into(),
        marks: " 90 ".into(),
    };
    assert_eq!(form.preview_grade(), Some(Grade::APlus));
    api.add_result(&form.validate().unwrap()).await.unwrap();

    let results = api.results_for(&session).await.unwrap();
    let science = results.iter().find(|r| r.subject == "Science").unwrap();
    assert_eq!(science.marks.value(), 90);
    assert_eq!(science.grade(), Grade::APlus);
    assert_eq!(science.student.id, "s1");
    assert_eq!(backend.count(Method::GET, "/teacher"), 1);
}

#[tokio::test]
async fn test_teacher_cannot_grade_unassigned_student() {
    let backend = Backend::start().await;
    let api = backend.client_as("tom@school.test").await;
    let before = backend.result_count();

    let payload = ResultForm {
        student_id: "s3".into(),
        subject: "Math".into(),
        marks: "70".into(),
    }
    .validate()
    .unwrap();
    let err = api.add_result(&payload).await.unwrap_err();

    assert_eq!(err.kind, AppErrorKind::Forbidden);
    assert_eq!(err.friendly_message(), "Student is not assigned to you");
    assert_eq!(backend.result_count(), before);
}

#[tokio::test]
async fn test_teacher_updates_then_deletes_result() {
    let backend = Backend::start().await;
    let api = backend.client_as("tom@school.test").await;
    let session = api.session().session().unwrap();
    let list: Arc<Mutex<OptimisticList<ResultRecord>>> = Arc::new(Mutex::new(
        OptimisticList::new(api.results_for(&session).await.unwrap()),
    ));
    let rec = Recorder::default();

    let payload = ResultForm {
        student_id: "s2".into(),
        subject: "Math".into(),
        marks: "61".into(),
    }
    .validate()
    .unwrap();
    let mut edited = list.lock().unwrap().get("r2").cloned().unwrap();
    edited.marks = payload.marks;
    run(
        &list,
        Change::Replace(edited),
        api.update_result("r2", &payload),
        api.results_for(&session),
        &rec,
        Notice::success("Result updated"),
    )
    .await
    .unwrap();
    assert_eq!(list.lock().unwrap().get("r2").unwrap().grade(), Grade::C);

    run(
        &list,
        Change::Remove("r1".into()),
        api.delete_result("r1"),
        api.results_for(&session),
        &rec,
        Notice::success("Result deleted"),
    )
    .await
    .unwrap();

    assert!(!list.lock().unwrap().contains("r1"));
    assert_eq!(rec.levels(), vec![NoticeLevel::Success, NoticeLevel::Success]);
    assert_eq!(backend.count(Method::PATCH, "/results/r2"), 1);
    assert_eq!(backend.count(Method::DELETE, "/results/r1"), 1);
}

#[tokio::test]
async fn test_teacher_sees_only_own_results() {
    let backend = Backend::start().await;
    let api = backend.client_as("tia@school.test").await;
    let session = api.session().session().unwrap();

    let results = api.results_for(&session).await.unwrap();

    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["r3"]);
}

#[tokio::test]
async fn test_student_sees_only_own_results() {
    let backend = Backend::start().await;
    let api = backend.client_as("sam@school.test").await;
    let session = api.session().session().unwrap();

    let results = api.results_for(&session).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].student.id, "s2");
    let summary = summarize(&results);
    assert_eq!(summary.count, 1);
    assert_eq!(summary.passing, 0);
    assert_eq!(summary.average_grade(), Some(Grade::F));
}

#[tokio::test]
async fn test_admin_summary_covers_all_results() {
    let backend = Backend::start().await;
    let api = backend.client_as("ada@school.test").await;
    let session = api.session().session().unwrap();

    let results = api.results_for(&session).await.unwrap();
    let summary = summarize(&results);

    assert_eq!(summary.count, 3);
    assert_eq!(summary.passing, 2);
    assert_eq!(summary.average_label(), "75.3");
    assert_eq!(summary.best, Some(("History".to_string(), 92)));
}

#[tokio::test]
async fn test_student_cannot_add_results() {
    let backend = Backend::start().await;
    let api = backend.client_as("sue@school.test").await;

    let payload = ResultForm {
        student_id: "s1".into(),
        subject: "Math".into(),
        marks: "100".into(),
    }
    .validate()
    .unwrap();
    let err = api.add_result(&payload).await.unwrap_err();

    assert_eq!(err.kind, AppErrorKind::Forbidden);
}

#[tokio::test]
async fn test_admin_grades_any_student_and_edits_then_deletes() {
    let backend = Backend::start().await;
    let api = backend.client_as("ada@school.test").await;
    let session = api.session().session().unwrap();

    let students = api.gradable_students(&session).await.unwrap();
    let ids: Vec<&str> = students.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2", "s3"]);

    let list: Arc<Mutex<OptimisticList<ResultRecord>>> = Arc::new(Mutex::new(
        OptimisticList::new(api.results_for(&session).await.unwrap()),
    ));
    let rec = Recorder::default();
    let payload = ResultForm {
        student_id: "s3".into(),
        subject: "Science".into(),
        marks: "78".into(),
    }
    .validate()
    .unwrap();
    run(
        &list,
        Change::Insert(payload.preview("pending-1", students[2].clone(), None)),
        api.add_result(&payload),
        api.results_for(&session),
        &rec,
        Notice::success("Result saved"),
    )
    .await
    .unwrap();

    let added = list
        .lock()
        .unwrap()
        .items()
        .iter()
        .find(|r| r.subject == "Science")
        .cloned()
        .unwrap();
    assert!(!added.id.starts_with("pending-"));
    assert_eq!(added.teacher, None);
    assert_eq!(added.grade(), Grade::B);

    // Admins may also correct and remove results another teacher gave.
    let correction = ResultForm {
        student_id: "s3".into(),
        subject: "History".into(),
        marks: "95".into(),
    }
    .validate()
    .unwrap();
    api.update_result("r3", &correction).await.unwrap();
    run(
        &list,
        Change::Remove(added.id.clone()),
        api.delete_result(&added.id),
        api.results_for(&session),
        &rec,
        Notice::success("Result deleted"),
    )
    .await
    .unwrap();

    let items = list.lock().unwrap().items().to_vec();
    assert_eq!(items.len(), 3);
    assert_eq!(items.iter().find(|r| r.id == "r3").unwrap().marks.value(), 95);
    assert_eq!(backend.count(Method::POST, "/add-result"), 1);
}

#[tokio::test]
async fn test_student_has_nobody_to_grade() {
    let backend = Backend::start().await;
    let api = backend.client_as("sue@school.test").await;
    let session = api.session().session().unwrap();

    assert!(api.gradable_students(&session).await.unwrap().is_empty());
    assert_eq!(backend.count(Method::GET, "/students"), 0);
}
