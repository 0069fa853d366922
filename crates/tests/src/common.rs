//! In-process stand-in for the school backend.
//!
//! Every handler re-validates the bearer token with `jsonwebtoken` and
//! checks the role itself, so the client's role is never trusted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use client::{ApiClient, MemoryStorage, SessionStore};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared_types::{
    AdminProfile, Assignment, Guardian, Marks, Relation, ResultRecord, Role, StudentProfile,
    TeacherProfile, User, UserSummary,
};
use tower::ServiceExt;

pub const SECRET: &[u8] = b"school-stub-secret";
pub const PASSWORD: &str = "secret123";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// A canned failure for the next matching request.
#[derive(Debug, Clone)]
struct Failure {
    method: Method,
    path: String,
    status: StatusCode,
}

#[derive(Default)]
pub struct StubState {
    users: Vec<User>,
    passwords: HashMap<String, String>,
    assignments: Vec<Assignment>,
    results: Vec<ResultRecord>,
    alerts: Vec<Value>,
    requests: Vec<(Method, String)>,
    failures: Vec<Failure>,
    delay: Option<Duration>,
    next_id: u32,
}

impl StubState {
    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn find_user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id() == id)
    }

    fn summary(&self, id: &str) -> Option<UserSummary> {
        self.find_user(id).map(User::summary)
    }
}

pub type Shared = Arc<Mutex<StubState>>;

/// A running stub backend plus handles to inspect it.
pub struct Backend {
    pub base_url: String,
    pub state: Shared,
    pub router: Router,
}

impl Backend {
    /// Start the stub on an ephemeral port with the seed data below.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(seed()));
        let router = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub address");
        let serve_router = router.clone();
        tokio::spawn(async move {
            axum::serve(listener, serve_router).await.expect("stub backend crashed");
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
            router,
        }
    }

    /// A client with empty credential storage.
    pub fn client(&self) -> ApiClient {
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("http client");
        ApiClient::with_http(
            http,
            &self.base_url,
            SessionStore::new(Arc::new(MemoryStorage::new())),
        )
    }

    /// A client already signed in as the seeded user with `email`.
    pub async fn client_as(&self, email: &str) -> ApiClient {
        let api = self.client();
        api.login(&shared_types::LoginRequest {
            email: email.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .expect("seeded login");
        api
    }

    /// Number of requests received for `method path`.
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|(m, p)| *m == method && p == path)
            .count()
    }

    pub fn total_requests(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    /// Make the next `method path` answer with `status`.
    pub fn fail_next(&self, method: Method, path: &str, status: StatusCode) {
        self.state.lock().unwrap().failures.push(Failure {
            method,
            path: path.to_string(),
            status,
        });
    }

    /// Delay every response by `delay`.
    pub fn slow_down(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    pub fn alerts(&self) -> Vec<Value> {
        self.state.lock().unwrap().alerts.clone()
    }

    pub fn result_count(&self) -> usize {
        self.state.lock().unwrap().results.len()
    }
}

/// Issue a token signed with the stub secret.
pub fn token_for(id: &str, email: &str, name: &str, role: &str, ttl_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        id: id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        role: role.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).expect("sign token")
}

fn token_for_user(user: &User) -> String {
    token_for(user.id(), user.email(), user.name(), user.role().as_str(), 3600)
}

fn guardian(name: &str, phone: &str) -> Guardian {
    Guardian {
        name: name.to_string(),
        relation: Relation::Mother,
        primary_contact: phone.to_string(),
        secondary_contact: None,
    }
}

fn student(id: &str, name: &str, phone: &str, guardian_phone: &str) -> User {
    User::Student(StudentProfile {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@school.test", name.to_lowercase()),
        class_name: Some("7B".to_string()),
        roll_number: None,
        phone: Some(phone.to_string()),
        guardian: Some(guardian(&format!("{name}'s mother"), guardian_phone)),
        address: None,
        is_blocked: false,
    })
}

/// Seed: admin `ada`, teachers `tom` (t1) and `tia` (t2), students
/// `sue` (s1, assigned to tom), `sam` (s2, assigned to tom, shares a
/// guardian phone with sue), `lee` (s3, assigned to tia) and user `42`.
fn seed() -> StubState {
    let users = vec![
        User::Admin(AdminProfile {
            id: "a1".into(),
            name: "Ada".into(),
            email: "ada@school.test".into(),
        }),
        User::Teacher(TeacherProfile {
            id: "t1".into(),
            name: "Tom".into(),
            email: "tom@school.test".into(),
            subjects: vec!["Math".into()],
        }),
        User::Teacher(TeacherProfile {
            id: "t2".into(),
            name: "Tia".into(),
            email: "tia@school.test".into(),
            subjects: vec!["History".into()],
        }),
        student("s1", "Sue", "+1100", "+1900"),
        student("s2", "Sam", "+1200", "+1900"),
        student("s3", "Lee", "+1300", "+1950"),
        User::Admin(AdminProfile {
            id: "42".into(),
            name: "Deletable".into(),
            email: "old@school.test".into(),
        }),
    ];
    let passwords = users
        .iter()
        .map(|u| (u.email().to_string(), PASSWORD.to_string()))
        .collect();

    let mut state = StubState {
        users,
        passwords,
        next_id: 100,
        ..StubState::default()
    };
    for (id, teacher, student) in [("as1", "t1", "s1"), ("as2", "t1", "s2"), ("as3", "t2", "s3")] {
        let assignment = Assignment {
            id: id.into(),
            teacher: state.summary(teacher),
            student: state.summary(student).expect("seeded student"),
            assigned_at: Some("2024-01-10T09:00:00.000Z".into()),
        };
        state.assignments.push(assignment);
    }
    for (id, student, teacher, subject, marks) in [
        ("r1", "s1", "t1", "Math", 85),
        ("r2", "s2", "t1", "Math", 49),
        ("r3", "s3", "t2", "History", 92),
    ] {
        let record = ResultRecord {
            id: id.into(),
            student: state.summary(student).expect("seeded student"),
            teacher: state.summary(teacher),
            subject: subject.into(),
            marks: Marks::new(marks).expect("seeded marks"),
            date: Some("2024-03-01T10:00:00.000Z".into()),
        };
        state.results.push(record);
    }
    state
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: Shared) -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register/student", post(register_student))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", axum::routing::put(update_user).delete(delete_user))
        .route("/teachers", get(list_teachers))
        .route("/students", get(list_students))
        .route("/assign/assignments", get(list_assignments))
        .route("/assign/bulk", post(bulk_assign))
        .route("/assignment/{id}", delete(unassign))
        .route("/teacher/students", get(teacher_students))
        .route("/teacher", get(teacher_results))
        .route("/results", get(list_results))
        .route("/add-result", post(add_result))
        .route("/results/{id}", patch(update_result).delete(delete_result))
        .route("/progress-alert", post(progress_alert));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), record_and_inject))
        .with_state(state)
}

/// Record the request, then apply any canned failure or delay.
async fn record_and_inject(State(state): State<Shared>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().trim_start_matches("/api").to_string();
    let (failure, delay) = {
        let mut s = state.lock().unwrap();
        s.requests.push((method.clone(), path.clone()));
        let pos = s
            .failures
            .iter()
            .position(|f| f.method == method && f.path == path);
        (pos.map(|i| s.failures.remove(i)), s.delay)
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if let Some(failure) = failure {
        return error(failure.status, "Injected failure");
    }
    next.run(req).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Verify the bearer token and require one of `roles`.
fn authorize(headers: &HeaderMap, roles: &[Role]) -> Result<Claims, Response> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Authentication required"))?;
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(SECRET),
        &Validation::default(),
    )
    .map_err(|_| error(StatusCode::UNAUTHORIZED, "Invalid token"))?
    .claims;
    match Role::parse(&claims.role) {
        Some(role) if roles.contains(&role) => Ok(claims),
        _ => Err(error(StatusCode::FORBIDDEN, "Access denied")),
    }
}

macro_rules! authorize {
    ($headers:expr, $($role:expr),+) => {
        match authorize(&$headers, &[$($role),+]) {
            Ok(claims) => claims,
            Err(resp) => return resp,
        }
    };
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    let s = state.lock().unwrap();
    let ok = s.passwords.get(&body.email).is_some_and(|p| *p == body.password);
    match s.users.iter().find(|u| u.email() == body.email) {
        Some(user) if ok => Json(json!({
            "token": token_for_user(user),
            "role": user.role().as_str(),
        }))
        .into_response(),
        _ => error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn register_student(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut s = state.lock().unwrap();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if s.users.iter().any(|u| u.email() == email) {
        return error(StatusCode::CONFLICT, "Email already registered");
    }
    let id = s.fresh_id("s");
    let user = User::Student(StudentProfile {
        id,
        name: body["name"].as_str().unwrap_or_default().to_string(),
        email: email.clone(),
        class_name: body["class"].as_str().map(str::to_string),
        roll_number: body["rollNumber"].as_str().map(str::to_string),
        phone: None,
        guardian: serde_json::from_value(body["guardian"].clone()).ok(),
        address: body["address"].as_str().map(str::to_string),
        is_blocked: false,
    });
    let token = token_for_user(&user);
    s.passwords.insert(
        email,
        body["password"].as_str().unwrap_or_default().to_string(),
    );
    s.users.push(user);
    (
        StatusCode::CREATED,
        Json(json!({ "token": token, "role": "student" })),
    )
        .into_response()
}

async fn list_users(State(state): State<Shared>, headers: HeaderMap) -> Response {
    authorize!(headers, Role::Admin);
    Json(state.lock().unwrap().users.clone()).into_response()
}

fn user_from_payload(id: String, body: &Value) -> Option<User> {
    let mut value = body.clone();
    value["_id"] = json!(id);
    if let Some(obj) = value.as_object_mut() {
        obj.remove("password");
    }
    serde_json::from_value(value).ok()
}

async fn create_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    authorize!(headers, Role::Admin);
    let mut s = state.lock().unwrap();
    let id = s.fresh_id("u");
    let Some(user) = user_from_payload(id, &body) else {
        return error(StatusCode::BAD_REQUEST, "Invalid user");
    };
    if let Some(password) = body["password"].as_str() {
        s.passwords.insert(user.email().to_string(), password.to_string());
    }
    s.users.push(user.clone());
    (StatusCode::CREATED, Json(user)).into_response()
}

async fn update_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    authorize!(headers, Role::Admin);
    let mut s = state.lock().unwrap();
    let Some(pos) = s.users.iter().position(|u| u.id() == id) else {
        return error(StatusCode::NOT_FOUND, "User not found");
    };
    let Some(user) = user_from_payload(id, &body) else {
        return error(StatusCode::BAD_REQUEST, "Invalid user");
    };
    s.users[pos] = user.clone();
    Json(user).into_response()
}

async fn delete_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    authorize!(headers, Role::Admin);
    let mut s = state.lock().unwrap();
    let before = s.users.len();
    s.users.retain(|u| u.id() != id);
    if s.users.len() == before {
        return error(StatusCode::NOT_FOUND, "User not found");
    }
    Json(json!({ "message": "User deleted" })).into_response()
}

async fn list_by_role(state: &Shared, role: Role) -> Response {
    let users: Vec<User> = state
        .lock()
        .unwrap()
        .users
        .iter()
        .filter(|u| u.role() == role)
        .cloned()
        .collect();
    Json(users).into_response()
}

async fn list_teachers(State(state): State<Shared>, headers: HeaderMap) -> Response {
    authorize!(headers, Role::Admin);
    list_by_role(&state, Role::Teacher).await
}

async fn list_students(State(state): State<Shared>, headers: HeaderMap) -> Response {
    authorize!(headers, Role::Admin, Role::Teacher);
    list_by_role(&state, Role::Student).await
}

async fn list_assignments(State(state): State<Shared>, headers: HeaderMap) -> Response {
    authorize!(headers, Role::Admin);
    Json(state.lock().unwrap().assignments.clone()).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkBody {
    teacher_id: String,
    student_ids: Vec<String>,
}

async fn bulk_assign(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<BulkBody>,
) -> Response {
    authorize!(headers, Role::Admin);
    let mut s = state.lock().unwrap();
    let Some(teacher) = s.summary(&body.teacher_id) else {
        return error(StatusCode::NOT_FOUND, "Teacher not found");
    };
    let mut assigned = 0;
    for student_id in &body.student_ids {
        let exists = s.assignments.iter().any(|a| {
            a.student.id == *student_id && a.teacher.as_ref().is_some_and(|t| t.id == teacher.id)
        });
        let Some(student) = s.summary(student_id) else {
            continue;
        };
        if exists {
            continue;
        }
        let id = s.fresh_id("as");
        s.assignments.push(Assignment {
            id,
            teacher: Some(teacher.clone()),
            student,
            assigned_at: None,
        });
        assigned += 1;
    }
    Json(json!({
        "success": assigned == body.student_ids.len(),
        "assignedCount": assigned,
        "message": format!("{assigned} of {} assigned", body.student_ids.len()),
    }))
    .into_response()
}

async fn unassign(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    authorize!(headers, Role::Admin);
    let mut s = state.lock().unwrap();
    let before = s.assignments.len();
    s.assignments.retain(|a| a.id != id);
    if s.assignments.len() == before {
        return error(StatusCode::NOT_FOUND, "Assignment not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn teacher_students(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let claims = authorize!(headers, Role::Teacher);
    let own: Vec<Assignment> = state
        .lock()
        .unwrap()
        .assignments
        .iter()
        .filter(|a| a.teacher.as_ref().is_some_and(|t| t.id == claims.id))
        .cloned()
        .collect();
    Json(own).into_response()
}

async fn teacher_results(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let claims = authorize!(headers, Role::Teacher);
    let own: Vec<ResultRecord> = state
        .lock()
        .unwrap()
        .results
        .iter()
        .filter(|r| r.teacher.as_ref().is_some_and(|t| t.id == claims.id))
        .cloned()
        .collect();
    Json(own).into_response()
}

async fn list_results(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let claims = authorize!(headers, Role::Admin, Role::Student);
    let s = state.lock().unwrap();
    let results: Vec<ResultRecord> = if claims.role == "admin" {
        s.results.clone()
    } else {
        s.results
            .iter()
            .filter(|r| r.student.id == claims.id)
            .cloned()
            .collect()
    };
    Json(results).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultBody {
    student_id: String,
    subject: String,
    marks: i64,
}

/// Validate a result body the way the backend does: the teacher must be
/// assigned to the student and marks must be in range.
/// Admins may grade anyone; teachers only their assigned students.
fn check_result(s: &StubState, claims: &Claims, body: &ResultBody) -> Result<Marks, Response> {
    let marks = Marks::new(body.marks).map_err(|e| error(StatusCode::BAD_REQUEST, &e.message))?;
    if s.summary(&body.student_id).is_none() {
        return Err(error(StatusCode::NOT_FOUND, "Student not found"));
    }
    if is_admin(claims) {
        return Ok(marks);
    }
    let assigned = s.assignments.iter().any(|a| {
        a.student.id == body.student_id && a.teacher.as_ref().is_some_and(|t| t.id == claims.id)
    });
    if !assigned {
        return Err(error(StatusCode::FORBIDDEN, "Student is not assigned to you"));
    }
    Ok(marks)
}

fn is_admin(claims: &Claims) -> bool {
    Role::parse(&claims.role) == Some(Role::Admin)
}

async fn add_result(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<ResultBody>,
) -> Response {
    let claims = authorize!(headers, Role::Teacher, Role::Admin);
    let mut s = state.lock().unwrap();
    let marks = match check_result(&s, &claims, &body) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let id = s.fresh_id("r");
    let record = ResultRecord {
        id,
        student: s.summary(&body.student_id).unwrap_or(UserSummary {
            id: body.student_id.clone(),
            name: String::new(),
            email: String::new(),
        }),
        teacher: if is_admin(&claims) { None } else { s.summary(&claims.id) },
        subject: body.subject,
        marks,
        date: Some(chrono::Utc::now().to_rfc3339()),
    };
    s.results.push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn update_result(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ResultBody>,
) -> Response {
    let claims = authorize!(headers, Role::Teacher, Role::Admin);
    let mut s = state.lock().unwrap();
    let marks = match check_result(&s, &claims, &body) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let Some(record) = s.results.iter_mut().find(|r| r.id == id) else {
        return error(StatusCode::NOT_FOUND, "Result not found");
    };
    record.subject = body.subject;
    record.marks = marks;
    Json(record.clone()).into_response()
}

async fn delete_result(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let claims = authorize!(headers, Role::Teacher, Role::Admin);
    let mut s = state.lock().unwrap();
    let owned = s.results.iter().any(|r| {
        r.id == id && (is_admin(&claims) || r.teacher.as_ref().is_some_and(|t| t.id == claims.id))
    });
    if !owned {
        return error(StatusCode::NOT_FOUND, "Result not found");
    }
    s.results.retain(|r| r.id != id);
    Json(json!({ "message": "Result deleted" })).into_response()
}

async fn progress_alert(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    authorize!(headers, Role::Admin, Role::Teacher);
    let sent = body["recipients"].as_array().map_or(0, Vec::len);
    if sent == 0 {
        return error(StatusCode::BAD_REQUEST, "No recipients");
    }
    state.lock().unwrap().alerts.push(body);
    Json(json!({ "sent": sent })).into_response()
}

// ---------------------------------------------------------------------------
// Raw router helpers
// ---------------------------------------------------------------------------

/// Send a request straight through the router, bypassing the client.
pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app
        .clone()
        .oneshot(req)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Collects notices instead of showing them.
#[derive(Default)]
pub struct Recorder(Mutex<Vec<shared_types::Notice>>);

impl shared_types::Notifier for Recorder {
    fn notify(&self, notice: shared_types::Notice) {
        self.0.lock().unwrap().push(notice);
    }
}

impl Recorder {
    pub fn notices(&self) -> Vec<shared_types::Notice> {
        self.0.lock().unwrap().clone()
    }

    pub fn levels(&self) -> Vec<shared_types::NoticeLevel> {
        self.notices().iter().map(|n| n.level).collect()
    }
}
