use shared_types::AppError;

/// Convert a reqwest::Error into an AppError.
pub fn reqwest_to_app_error(err: reqwest::Error) -> AppError {
    if let Some(status) = err.status() {
        return AppError::from_status(status.as_u16(), "");
    }
    if err.is_decode() {
        return AppError::internal("Unexpected response from the server");
    }
    if is_transport(&err) {
        return AppError::network("Could not reach the server. Check your connection.");
    }
    AppError::internal(err.to_string())
}

#[cfg(not(target_arch = "wasm32"))]
fn is_transport(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
}

#[cfg(target_arch = "wasm32")]
fn is_transport(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_request() || err.is_body()
}

/// Extension trait providing `.into_app_error()` on reqwest::Error.
pub trait ReqwestErrorExt {
    fn into_app_error(self) -> AppError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_app_error(self) -> AppError {
        reqwest_to_app_error(self)
    }
}

/// Trait for validating request DTOs before they are sent.
pub trait ValidateRequest {
    fn validate_request(&self) -> Result<(), AppError>;
}

impl<T: validator::Validate> ValidateRequest for T {
    fn validate_request(&self) -> Result<(), AppError> {
        self.validate().map_err(AppError::from)
    }
}
