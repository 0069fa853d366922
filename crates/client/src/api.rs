//! REST client for the school backend.

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{
    visible_results, visible_students, ApiSettings, AppError, Assignment, AuthResponse,
    BulkAssignRequest, BulkAssignResponse, Contact, LoginRequest, ProgressAlertRequest,
    ProgressAlertResponse, RegisterStudentRequest, ResultPayload, ResultRecord, Role, Session,
    User, UserPayload, UserSummary,
};

use crate::error_convert::{ReqwestErrorExt, ValidateRequest};
use crate::session::SessionStore;

/// Typed access to every backend endpoint. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl PartialEq for ApiClient {
    fn eq(&self, other: &Self) -> bool {
        self.base_url == other.base_url && self.session == other.session
    }
}

impl ApiClient {
    pub fn new(settings: &ApiSettings, session: SessionStore) -> Result<Self, AppError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(std::time::Duration::from_secs(settings.timeout_secs));
        let http = builder.build().map_err(|e| e.into_app_error())?;
        Ok(Self::with_http(http, &settings.base_url, session))
    }

    /// Build around an existing HTTP client.
    pub fn with_http(http: reqwest::Client, base_url: &str, session: SessionStore) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> Result<reqwest::Response, AppError> {
        tracing::debug!(%method, path, "request");
        let mut builder = self.request(method.clone(), path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await.map_err(|e| {
            let err = e.into_app_error();
            tracing::warn!(%method, path, kind = %err.kind, "request failed");
            err
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let err = AppError::from_status(status.as_u16(), &text);
        tracing::warn!(%method, path, status = status.as_u16(), kind = %err.kind, "request rejected");
        Err(err)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self.execute(Method::GET, path, None::<&()>).await?;
        response.json::<T>().await.map_err(|e| e.into_app_error())
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(method, path, Some(body)).await?;
        response.json::<T>().await.map_err(|e| e.into_app_error())
    }

    /// Send and ignore whatever body comes back.
    async fn send_unit<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<(), AppError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(method, path, body).await.map(|_| ())
    }

    // --- Auth ---

    /// Validate, authenticate, and store the issued credential.
    pub async fn login(&self, req: &LoginRequest) -> Result<Session, AppError> {
        req.validate_request()?;
        let auth: AuthResponse = self.send_json(Method::POST, "/auth/login", req).await?;
        self.session.sign_in(&auth)
    }

    pub async fn register_student(&self, req: &RegisterStudentRequest) -> Result<Session, AppError> {
        req.validate_request()?;
        let auth: AuthResponse = self
            .send_json(Method::POST, "/auth/register/student", req)
            .await?;
        self.session.sign_in(&auth)
    }

    pub fn logout(&self) {
        self.session.clear();
    }

    // --- Users ---

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.get_json("/users").await
    }

    pub async fn create_user(&self, payload: &UserPayload) -> Result<User, AppError> {
        self.send_json(Method::POST, "/users", payload).await
    }

    pub async fn update_user(&self, id: &str, payload: &UserPayload) -> Result<User, AppError> {
        self.send_json(Method::PUT, &format!("/users/{id}"), payload)
            .await
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        self.send_unit(Method::DELETE, &format!("/users/{id}"), None::<&()>)
            .await
    }

    pub async fn list_teachers(&self) -> Result<Vec<User>, AppError> {
        self.get_json("/teachers").await
    }

    pub async fn list_students(&self) -> Result<Vec<User>, AppError> {
        self.get_json("/students").await
    }

    // --- Assignments ---

    pub async fn list_assignments(&self) -> Result<Vec<Assignment>, AppError> {
        self.get_json("/assign/assignments").await
    }

    pub async fn bulk_assign(&self, req: &BulkAssignRequest) -> Result<BulkAssignResponse, AppError> {
        self.send_json(Method::POST, "/assign/bulk", req).await
    }

    pub async fn unassign(&self, assignment_id: &str) -> Result<(), AppError> {
        self.send_unit(
            Method::DELETE,
            &format!("/assignment/{assignment_id}"),
            None::<&()>,
        )
        .await
    }

    /// Assignments of the signed-in teacher.
    pub async fn teacher_students(&self) -> Result<Vec<Assignment>, AppError> {
        self.get_json("/teacher/students").await
    }

    /// Students the actor may grade or message, deduplicated.
    pub async fn reachable_students(&self, session: &Session) -> Result<Vec<UserSummary>, AppError> {
        let assignments = match session.role {
            Role::Teacher => self.teacher_students().await?,
            Role::Admin => self.list_assignments().await?,
            Role::Student => Vec::new(),
        };
        Ok(visible_students(session, &assignments))
    }

    /// Students the actor may enter results for: every student for an
    /// admin, assigned students for a teacher, nobody for a student (no
    /// request is sent).
    pub async fn gradable_students(&self, session: &Session) -> Result<Vec<UserSummary>, AppError> {
        match session.role {
            Role::Admin => Ok(self
                .list_students()
                .await?
                .iter()
                .filter(|u| u.role() == Role::Student)
                .map(User::summary)
                .collect()),
            Role::Teacher => self.reachable_students(session).await,
            Role::Student => Ok(Vec::new()),
        }
    }

    // --- Results ---

    pub async fn teacher_results(&self) -> Result<Vec<ResultRecord>, AppError> {
        self.get_json("/teacher").await
    }

    pub async fn list_results(&self) -> Result<Vec<ResultRecord>, AppError> {
        self.get_json("/results").await
    }

    /// Results scoped to the actor: teachers read their own endpoint, the
    /// others read `/results`, and the client filter is applied on top.
    pub async fn results_for(&self, session: &Session) -> Result<Vec<ResultRecord>, AppError> {
        let results = match session.role {
            Role::Teacher => self.teacher_results().await?,
            Role::Admin | Role::Student => self.list_results().await?,
        };
        Ok(visible_results(session, results))
    }

    pub async fn add_result(&self, payload: &ResultPayload) -> Result<(), AppError> {
        self.send_unit(Method::POST, "/add-result", Some(payload)).await
    }

    pub async fn update_result(&self, id: &str, payload: &ResultPayload) -> Result<(), AppError> {
        self.send_unit(Method::PATCH, &format!("/results/{id}"), Some(payload))
            .await
    }

    pub async fn delete_result(&self, id: &str) -> Result<(), AppError> {
        self.send_unit(Method::DELETE, &format!("/results/{id}"), None::<&()>)
            .await
    }

    // --- Messaging ---

    /// Message contacts. Admins reach every student, teachers only their
    /// assigned ones, students nobody.
    pub async fn contacts_for(&self, session: &Session) -> Result<Vec<Contact>, AppError> {
        let reachable = match session.role {
            Role::Student => return Ok(Vec::new()),
            Role::Teacher => Some(self.reachable_students(session).await?),
            Role::Admin => None,
        };
        let students = self.list_students().await?;
        Ok(students
            .iter()
            .filter_map(User::as_student)
            .filter(|s| {
                reachable
                    .as_ref()
                    .map_or(true, |ids| ids.iter().any(|r| r.id == s.id))
            })
            .map(Contact::from_student)
            .collect())
    }

    pub async fn progress_alert(
        &self,
        req: &ProgressAlertRequest,
    ) -> Result<ProgressAlertResponse, AppError> {
        self.send_json(Method::POST, "/progress-alert", req).await
    }
}
