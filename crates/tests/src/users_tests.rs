use std::sync::{Arc, Mutex};

use axum::http::{Method, StatusCode};
use client::collection::run;
use client::{Change, OptimisticList};
use pretty_assertions::assert_eq;
use shared_types::{AppError, AppErrorKind, Notice, NoticeLevel, Role, User, UserForm};

use crate::common::{Backend, Recorder};

async fn loaded_users(api: &client::ApiClient) -> Arc<Mutex<OptimisticList<User>>> {
    let users = api.list_users().await.unwrap();
    Arc::new(Mutex::new(OptimisticList::new(users)))
}

fn ids(list: &Arc<Mutex<OptimisticList<User>>>) -> Vec<String> {
    list.lock()
        .unwrap()
        .items()
        .iter()
        .map(|u| u.id().to_string())
        .collect()
}

#[tokio::test]
async fn test_admin_delete_removes_user_and_refetches() {
    let backend = Backend::start().await;
    let api = backend.client_as("ada@school.test").await;
    let list = loaded_users(&api).await;
    let rec = Recorder::default();

    run(
        &list,
        Change::Remove("42".into()),
        api.delete_user("42"),
        api.list_users(),
        &rec,
        Notice::success("User deleted"),
    )
    .await
    .unwrap();

    assert!(!ids(&list).contains(&"42".to_string()));
    assert_eq!(ids(&list).len(), 6);
    assert_eq!(rec.levels(), vec![NoticeLevel::Success]);
    assert_eq!(backend.count(Method::DELETE, "/users/42"), 1);
    assert_eq!(backend.count(Method::GET, "/users"), 2);
}

#[tokio::test]
async fn test_failed_delete_restores_list_with_one_error() {
    let backend = Backend::start().await;
    let api = backend.client_as("ada@school.test").await;
    let list = loaded_users(&api).await;
    let before = ids(&list);
    backend.fail_next(Method::DELETE, "/users/42", StatusCode::INTERNAL_SERVER_ERROR);
    let rec = Recorder::default();

    let err = run(
        &list,
        Change::Remove("42".into()),
        api.delete_user("42"),
        api.list_users(),
        &rec,
        Notice::success("User deleted"),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind, AppErrorKind::InternalError);
    assert_eq!(ids(&list), before);
    let notices = rec.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    // No refetch after a failed mutation.
    assert_eq!(backend.count(Method::GET, "/users"), 1);
}

#[tokio::test]
async fn test_create_teacher_from_form() {
    let backend = Backend::start().await;
    let api = backend.client_as("ada@school.test").await;
    let list = loaded_users(&api).await;
    let rec = Recorder::default();

    let mut form = UserForm {
        name: "Theo".into(),
        email: "theo@school.test".into(),
        role: Role::Teacher,
        password: "welcome1".into(),
        ..UserForm::default()
    };
    form.toggle_subject("Science");
    let payload = form.validate().unwrap();

    let created = api.create_user(&payload).await.unwrap();
    assert_eq!(created.role(), Role::Teacher);
    assert_eq!(created.name(), "Theo");

    run(
        &list,
        Change::Insert(created.clone()),
        async { Ok::<(), AppError>(()) },
        api.list_users(),
        &rec,
        Notice::success("User created"),
    )
    .await
    .unwrap();
    assert!(list.lock().unwrap().contains(created.id()));
}

#[tokio::test]
async fn test_teacher_without_subjects_is_not_sent() {
    let backend = Backend::start().await;
    let _api = backend.client_as("ada@school.test").await;
    let requests = backend.total_requests();

    let form = UserForm {
        name: "Theo".into(),
        email: "theo@school.test".into(),
        role: Role::Teacher,
        password: "welcome1".into(),
        ..UserForm::default()
    };

    assert!(form.validate().unwrap_err().is_validation());
    assert_eq!(backend.total_requests(), requests);
}

#[tokio::test]
async fn test_edit_user_keeps_password_optional() {
    let backend = Backend::start().await;
    let api = backend.client_as("ada@school.test").await;
    let users = api.list_users().await.unwrap();
    let tom = users.iter().find(|u| u.id() == "t1").unwrap();

    let mut form = UserForm::edit(tom);
    assert!(form.is_edit());
    form.name = "Thomas".into();
    let payload = form.validate().unwrap();
    assert!(payload.password.is_none());

    let updated = api.update_user("t1", &payload).await.unwrap();
    assert_eq!(updated.name(), "Thomas");
    assert_eq!(backend.count(Method::PUT, "/users/t1"), 1);
}

#[tokio::test]
async fn test_teacher_cannot_list_users() {
    let backend = Backend::start().await;
    let api = backend.client_as("tom@school.test").await;

    let err = api.list_users().await.unwrap_err();

    assert_eq!(err.kind, AppErrorKind::Forbidden);
    assert_eq!(err.friendly_message(), "Access denied");
}

#[tokio::test]
async fn test_teacher_and_student_lists_are_role_filtered() {
    let backend = Backend::start().await;
    let api = backend.client_as("ada@school.test").await;

    let teachers = api.list_teachers().await.unwrap();
    let students = api.list_students().await.unwrap();

    assert_eq!(teachers.len(), 2);
    assert!(teachers.iter().all(|u| u.role() == Role::Teacher));
    assert_eq!(students.len(), 3);
    assert!(students.iter().all(|u| u.as_student().is_some()));
}
