use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::domain::UserId;
use super::repository::{BoardStore, RepositoryError};
use crate::access::{CredentialHasher, PasswordError, Principal};

/// Facade over the store that keeps jobs, seeker profiles, and employer profiles
/// consistent. Operations are split by audience across `catalog`, `seeker`,
/// `employer`, `admin`, and `accounts`.
pub struct JobBoard<S> {
    pub(crate) store: Arc<S>,
    pub(crate) hasher: CredentialHasher,
}

impl<S> JobBoard<S>
where
    S: BoardStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_hasher(store, CredentialHasher::default())
    }

    pub fn with_hasher(store: Arc<S>, hasher: CredentialHasher) -> Self {
        Self { store, hasher }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Resolve the caller behind a verified token. Banned users no longer exist, so
    /// their outstanding tokens stop working here.
    pub fn authenticate(&self, user_id: &UserId) -> Result<Principal, BoardError> {
        let user = self
            .store
            .fetch_user(user_id)?
            .ok_or_else(|| BoardError::Auth("invalid token".to_string()))?;
        Ok(Principal::from(&user))
    }
}

/// Error taxonomy surfaced by every job board operation.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("server error: {0}")]
    Server(String),
}

impl BoardError {
    pub(crate) fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BoardError::Validation(_) | BoardError::Conflict(_) => StatusCode::BAD_REQUEST,
            BoardError::Auth(_) => StatusCode::UNAUTHORIZED,
            BoardError::Forbidden(_) => StatusCode::FORBIDDEN,
            BoardError::NotFound(_) => StatusCode::NOT_FOUND,
            BoardError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for BoardError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict => BoardError::Conflict("record already exists".to_string()),
            RepositoryError::NotFound => BoardError::not_found("record"),
            RepositoryError::Unavailable(reason) => {
                tracing::error!(%reason, "storage unavailable");
                BoardError::Server(reason)
            }
        }
    }
}

impl From<PasswordError> for BoardError {
    fn from(value: PasswordError) -> Self {
        tracing::error!(error = %value, "password hashing failed");
        BoardError::Server(value.to_string())
    }
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            BoardError::Validation(fields) => json!({
                "error": self.to_string(),
                "fields": fields,
            }),
            BoardError::Server(_) => json!({ "error": "internal server error" }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
