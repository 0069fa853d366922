//! Identity derived from the stored credential.
//!
//! The client never verifies the token signature; it only reads the claims
//! to decide what to render. Every API call is re-authorized by the backend.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::role::Role;

/// Claims the school backend puts in its tokens. All optional: the payload
/// shape is only trusted as far as it parses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decoded identity of the signed-in actor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user_id: Option<String>,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub expires_at: Option<i64>,
}

impl Session {
    /// First letter of the display name, for avatars.
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "U".to_string())
    }

    /// Whether a record owned by `id`/`email` belongs to this actor.
    pub fn owns(&self, id: &str, email: &str) -> bool {
        match &self.user_id {
            Some(own) if !own.is_empty() => own == id,
            _ => !self.email.is_empty() && self.email.eq_ignore_ascii_case(email),
        }
    }
}

/// Why a stored credential could not produce a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionError {
    Malformed,
    UnknownRole,
    Expired,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Malformed => write!(f, "malformed token"),
            SessionError::UnknownRole => write!(f, "token carries no known role"),
            SessionError::Expired => write!(f, "token expired"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Result of resolving the stored credential.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Authenticated(Session),
    Unauthenticated,
    Invalid(SessionError),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn role(&self) -> Option<Role> {
        self.session().map(|s| s.role)
    }
}

/// Decode the claims segment of a JWT-shaped string.
///
/// Only the second segment is read. Both padded and unpadded base64url are
/// accepted, as is the standard alphabet some encoders emit.
pub fn decode_claims(token: &str) -> Result<TokenClaims, SessionError> {
    let mut parts = token.trim().split('.');
    let _header = parts.next().ok_or(SessionError::Malformed)?;
    let payload = parts
        .next()
        .filter(|p| !p.is_empty())
        .ok_or(SessionError::Malformed)?;
    let payload = payload.trim_end_matches('=');

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .map_err(|_| SessionError::Malformed)?;

    let value: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|_| SessionError::Malformed)?;
    if !value.is_object() {
        return Err(SessionError::Malformed);
    }
    serde_json::from_value(value).map_err(|_| SessionError::Malformed)
}

/// Build a session from decoded claims, checking role and expiry.
pub fn session_from_claims(claims: TokenClaims, now: i64) -> Result<Session, SessionError> {
    let role = claims
        .role
        .as_deref()
        .and_then(Role::parse)
        .ok_or(SessionError::UnknownRole)?;

    if let Some(exp) = claims.exp {
        if exp <= now {
            return Err(SessionError::Expired);
        }
    }

    let email = claims.email.unwrap_or_default();
    let name = claims
        .name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| {
            email
                .split('@')
                .next()
                .filter(|local| !local.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "User".to_string());

    Ok(Session {
        user_id: claims.id.filter(|id| !id.is_empty()),
        role,
        name,
        email,
        expires_at: claims.exp,
    })
}

/// Resolve a stored credential against an explicit clock (unix seconds).
pub fn resolve_at(stored: Option<&str>, now: i64) -> SessionState {
    let token = match stored.map(str::trim) {
        None | Some("") => return SessionState::Unauthenticated,
        Some(t) => t,
    };
    match decode_claims(token).and_then(|claims| session_from_claims(claims, now)) {
        Ok(session) => SessionState::Authenticated(session),
        Err(reason) => SessionState::Invalid(reason),
    }
}

/// Resolve a stored credential against the current time.
pub fn resolve(stored: Option<&str>) -> SessionState {
    resolve_at(stored, chrono::Utc::now().timestamp())
}
