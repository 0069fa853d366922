use std::sync::{Arc, Mutex};

use axum::http::Method;
use client::collection::run;
use client::{Change, OptimisticList};
use pretty_assertions::assert_eq;
use shared_types::{AppErrorKind, AssignForm, Assignment, Notice};

use crate::common::{Backend, Recorder};

#[tokio::test]
async fn test_bulk_assign_reports_count() {
    let backend = Backend::start().await;
    let api = backend.client_as("ada@school.test").await;

    let mut form = AssignForm {
        teacher_id: "t2".into(),
        ..AssignForm::default()
    };
    form.toggle_student("s1");
    form.toggle_student("s2");
    let resp = api.bulk_assign(&form.validate().unwrap()).await.unwrap();

    assert!(resp.success);
    assert_eq!(resp.assigned_count, 2);
    let assignments = api.list_assignments().await.unwrap();
    let tia: Vec<&str> = assignments
        .iter()
        .filter(|a| a.teacher.as_ref().is_some_and(|t| t.id == "t2"))
        .map(|a| a.student.id.as_str())
        .collect();
    assert_eq!(tia, vec!["s3", "s1", "s2"]);
}

#[tokio::test]
async fn test_reassigning_existing_pair_is_partial() {
    let backend = Backend::start().await;
    let api = backend.client_as("ada@school.test").await;

    let form = AssignForm {
        teacher_id: "t1".into(),
        student_ids: vec!["s1".into(), "s3".into()],
    };
    let resp = api.bulk_assign(&form.validate().unwrap()).await.unwrap();

    assert!(!resp.success);
    assert_eq!(resp.assigned_count, 1);
    assert_eq!(resp.message.as_deref(), Some("1 of 2 assigned"));
}

#[tokio::test]
async fn test_incomplete_assign_form_sends_nothing() {
    let backend = Backend::start().await;
    let _api = backend.client_as("ada@school.test").await;

    let no_teacher = AssignForm {
        teacher_id: String::new(),
        student_ids: vec!["s1".into()],
    };
    let no_students = AssignForm {
        teacher_id: "t1".into(),
        student_ids: Vec::new(),
    };

    assert_eq!(
        no_teacher.validate().unwrap_err().message,
        "Please select a teacher"
    );
    assert_eq!(
        no_students.validate().unwrap_err().message,
        "Please select at least one student"
    );
    assert_eq!(backend.count(Method::POST, "/assign/bulk"), 0);
}

#[tokio::test]
async fn test_unassign_removes_assignment() {
    let backend = Backend::start().await;
    let api = backend.client_as("ada@school.test").await;
    let list: Arc<Mutex<OptimisticList<Assignment>>> = Arc::new(Mutex::new(
        OptimisticList::new(api.list_assignments().await.unwrap()),
    ));
    let rec = Recorder::default();

    run(
        &list,
        Change::Remove("as1".into()),
        api.unassign("as1"),
        api.list_assignments(),
        &rec,
        Notice::success("Student unassigned"),
    )
    .await
    .unwrap();

    assert!(!list.lock().unwrap().contains("as1"));
    assert_eq!(list.lock().unwrap().items().len(), 2);
    assert_eq!(backend.count(Method::DELETE, "/assignment/as1"), 1);
}

#[tokio::test]
async fn test_unassign_unknown_restores_list() {
    let backend = Backend::start().await;
    let api = backend.client_as("ada@school.test").await;
    let list: Arc<Mutex<OptimisticList<Assignment>>> = Arc::new(Mutex::new(
        OptimisticList::new(api.list_assignments().await.unwrap()),
    ));
    let student = list.lock().unwrap().items()[0].student.clone();
    list.lock().unwrap().apply(Change::Insert(Assignment {
        id: "ghost".into(),
        teacher: None,
        student,
        assigned_at: None,
    }));
    let rec = Recorder::default();

    let err = run(
        &list,
        Change::Remove("ghost".into()),
        api.unassign("ghost"),
        api.list_assignments(),
        &rec,
        Notice::success("Student unassigned"),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind, AppErrorKind::NotFound);
    assert!(list.lock().unwrap().contains("ghost"));
    assert_eq!(rec.notices().len(), 1);
}

#[tokio::test]
async fn test_teacher_reaches_only_assigned_students() {
    let backend = Backend::start().await;
    let api = backend.client_as("tom@school.test").await;
    let session = api.session().session().unwrap();

    let students = api.reachable_students(&session).await.unwrap();

    let ids: Vec<&str> = students.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2"]);
    assert_eq!(backend.count(Method::GET, "/teacher/students"), 1);
}

#[tokio::test]
async fn test_student_reaches_no_one_without_a_request() {
    let backend = Backend::start().await;
    let api = backend.client_as("sue@school.test").await;
    let session = api.session().session().unwrap();
    let requests = backend.total_requests();

    let students = api.reachable_students(&session).await.unwrap();

    assert!(students.is_empty());
    assert_eq!(backend.total_requests(), requests);
}
