use std::sync::Arc;

use axum::{
    async_trait,
    extract::{
        rejection::QueryRejection, FromRequest, FromRequestParts, Path, Query, Request, State,
    },
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::accounts::{Credentials, Registration};
use super::catalog::{JobDraft, JobFilter};
use super::domain::{ApplicationStatus, JobId, SeekerId, User, UserId};
use super::employer::EmployerProfileInput;
use super::repository::BoardStore;
use super::seeker::SeekerProfileInput;
use super::service::{BoardError, JobBoard};
use crate::access::{Capability, Principal, TokenError, TokenIssuer};

/// Shared handler state: the engine plus the bearer token issuer.
pub struct BoardState<S> {
    pub board: Arc<JobBoard<S>>,
    pub tokens: Arc<TokenIssuer>,
}

impl<S> BoardState<S> {
    pub fn new(board: Arc<JobBoard<S>>, tokens: Arc<TokenIssuer>) -> Self {
        Self { board, tokens }
    }
}

impl<S> Clone for BoardState<S> {
    fn clone(&self) -> Self {
        Self {
            board: Arc::clone(&self.board),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<BoardState<S>> for Principal
where
    S: BoardStore + 'static,
{
    type Rejection = BoardError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &BoardState<S>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| BoardError::Auth("missing bearer token".to_string()))?;

        let claims = state.tokens.verify(token).map_err(|err| match err {
            TokenError::Expired => BoardError::Auth("token expired".to_string()),
            other => {
                tracing::debug!(error = %other, "bearer token rejected");
                BoardError::Auth("invalid token".to_string())
            }
        })?;
        state.board.authenticate(&UserId::from(claims.sub))
    }
}

/// JSON body extractor whose rejections use the board's validation error shape.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, St> FromRequest<St> for JsonBody<T>
where
    T: DeserializeOwned,
    St: Send + Sync,
{
    type Rejection = BoardError;

    async fn from_request(req: Request, state: &St) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(BoardError::Validation(vec![rejection.body_text()])),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    #[serde(default)]
    status: Option<String>,
}

/// Router exposing the auth, seeker, employer, and admin endpoints.
pub fn board_router<S>(state: BoardState<S>) -> Router
where
    S: BoardStore + 'static,
{
    Router::new()
        .route("/auth/register", post(register_handler::<S>))
        .route("/auth/login", post(login_handler::<S>))
        .route(
            "/seeker/profile",
            post(create_seeker_profile_handler::<S>)
                .get(seeker_profile_handler::<S>)
                .put(update_seeker_profile_handler::<S>),
        )
        .route("/seeker/view-jobs", get(view_jobs_handler::<S>))
        .route("/seeker/apply/:job_id", post(apply_handler::<S>))
        .route("/seeker/save/:job_id", post(save_handler::<S>))
        .route("/seeker/unsave/:job_id", delete(unsave_handler::<S>))
        .route("/seeker/applied-jobs", get(applied_jobs_handler::<S>))
        .route("/seeker/saved-jobs", get(saved_jobs_handler::<S>))
        .route(
            "/employer/profile",
            post(create_employer_profile_handler::<S>)
                .get(employer_profile_handler::<S>)
                .put(update_employer_profile_handler::<S>),
        )
        .route("/employer/create-job", post(create_job_handler::<S>))
        .route("/employer/my-jobs", get(my_jobs_handler::<S>))
        .route("/employer/update-job/:job_id", put(update_job_handler::<S>))
        .route("/employer/delete-job/:job_id", delete(delete_job_handler::<S>))
        .route("/employer/:job_id/applicants", get(applicants_handler::<S>))
        .route(
            "/employer/:job_id/applicants/:seeker_id/status",
            put(application_status_handler::<S>),
        )
        .route("/admin/getAllUsers", get(all_users_handler::<S>))
        .route("/admin/getAllJobs", get(all_jobs_handler::<S>))
        .route("/admin/statistics", get(statistics_handler::<S>))
        .route("/admin/banUser/:user_id", patch(ban_user_handler::<S>))
        .route("/admin/removeJob/:job_id", delete(remove_job_handler::<S>))
        .with_state(state)
}

fn session_response<S>(
    state: &BoardState<S>,
    user: User,
    status: StatusCode,
) -> Result<Response, BoardError> {
    let token = state.tokens.issue(&user).map_err(|err| {
        tracing::error!(error = %err, "token signing failed");
        BoardError::Server(err.to_string())
    })?;
    Ok((status, Json(json!({ "user": user, "token": token }))).into_response())
}

fn message(text: &str) -> Response {
    (StatusCode::OK, Json(json!({ "message": text }))).into_response()
}

fn blocking_failed(err: tokio::task::JoinError) -> BoardError {
    tracing::error!(error = %err, "credential worker failed");
    BoardError::Server(err.to_string())
}

pub(crate) async fn register_handler<S>(
    State(state): State<BoardState<S>>,
    JsonBody(registration): JsonBody<Registration>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    let board = Arc::clone(&state.board);
    let user = tokio::task::spawn_blocking(move || board.register(registration))
        .await
        .map_err(blocking_failed)??;
    session_response(&state, user, StatusCode::CREATED)
}

pub(crate) async fn login_handler<S>(
    State(state): State<BoardState<S>>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    let board = Arc::clone(&state.board);
    let user = tokio::task::spawn_blocking(move || board.login(credentials))
        .await
        .map_err(blocking_failed)??;
    session_response(&state, user, StatusCode::OK)
}

async fn create_seeker_profile_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
    JsonBody(input): JsonBody<SeekerProfileInput>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::ManageSeekerProfile)?;
    let profile = state
        .board
        .create_seeker_profile(&principal.user_id, input)?;
    Ok((StatusCode::CREATED, Json(profile)).into_response())
}

async fn seeker_profile_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::ManageSeekerProfile)?;
    let profile = state
        .board
        .seeker_profile(&principal.user_id)?
        .ok_or_else(|| BoardError::not_found("seeker profile"))?;
    Ok(Json(profile).into_response())
}

async fn update_seeker_profile_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
    JsonBody(input): JsonBody<SeekerProfileInput>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::ManageSeekerProfile)?;
    let profile = state
        .board
        .update_seeker_profile(&principal.user_id, input)?;
    Ok(Json(profile).into_response())
}

async fn view_jobs_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
    filter: Result<Query<JobFilter>, QueryRejection>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::BrowseJobs)?;
    let Query(filter) =
        filter.map_err(|rejection| BoardError::Validation(vec![rejection.body_text()]))?;
    let jobs = state.board.view_jobs(&principal.user_id, &filter)?;
    Ok(Json(jobs).into_response())
}

async fn apply_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
    Path(job_id): Path<String>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::ApplyToJobs)?;
    let application = state
        .board
        .apply_to_job(&principal.user_id, &JobId::from(job_id))?;
    Ok(Json(json!({
        "message": "Job applied successfully",
        "application": application,
    }))
    .into_response())
}

async fn save_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
    Path(job_id): Path<String>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::ApplyToJobs)?;
    let job = state
        .board
        .save_job(&principal.user_id, &JobId::from(job_id))?;
    Ok(Json(json!({ "message": "Job saved successfully", "job": job })).into_response())
}

async fn unsave_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
    Path(job_id): Path<String>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::ApplyToJobs)?;
    state
        .board
        .unsave_job(&principal.user_id, &JobId::from(job_id))?;
    Ok(message("Job unsaved successfully"))
}

async fn applied_jobs_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::BrowseJobs)?;
    let jobs = state.board.applied_jobs(&principal.user_id)?;
    Ok(Json(jobs).into_response())
}

async fn saved_jobs_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::BrowseJobs)?;
    let jobs = state.board.saved_jobs(&principal.user_id)?;
    Ok(Json(jobs).into_response())
}

async fn create_employer_profile_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
    JsonBody(input): JsonBody<EmployerProfileInput>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::ManageEmployerProfile)?;
    let profile = state
        .board
        .create_employer_profile(&principal.user_id, input)?;
    Ok((StatusCode::CREATED, Json(profile)).into_response())
}

async fn employer_profile_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::ManageEmployerProfile)?;
    let profile = state
        .board
        .employer_profile(&principal.user_id)?
        .ok_or_else(|| BoardError::not_found("employer profile"))?;
    Ok(Json(profile).into_response())
}

async fn update_employer_profile_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
    JsonBody(input): JsonBody<EmployerProfileInput>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::ManageEmployerProfile)?;
    let profile = state
        .board
        .update_employer_profile(&principal.user_id, input)?;
    Ok(Json(profile).into_response())
}

async fn create_job_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
    JsonBody(draft): JsonBody<JobDraft>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::PostJobs)?;
    // Posting without a profile is a client error on this route.
    let job = state
        .board
        .create_job(&principal.user_id, draft)
        .map_err(|err| match err {
            BoardError::NotFound(message) => BoardError::Validation(vec![message]),
            other => other,
        })?;
    Ok((StatusCode::CREATED, Json(job)).into_response())
}

async fn my_jobs_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::PostJobs)?;
    let jobs = state.board.my_jobs(&principal.user_id)?;
    Ok(Json(jobs).into_response())
}

async fn update_job_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
    Path(job_id): Path<String>,
    JsonBody(draft): JsonBody<JobDraft>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    let job = state
        .board
        .owned_job(&principal, &JobId::from(job_id), Capability::PostJobs)?;
    let job = state.board.update_job(&job.id, draft)?;
    Ok(Json(job).into_response())
}

async fn delete_job_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
    Path(job_id): Path<String>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    let job = state
        .board
        .owned_job(&principal, &JobId::from(job_id), Capability::PostJobs)?;
    state.board.delete_job(&job.id)?;
    Ok(message("Job deleted successfully"))
}

async fn applicants_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
    Path(job_id): Path<String>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    let job = state.board.owned_job(
        &principal,
        &JobId::from(job_id),
        Capability::ReviewApplicants,
    )?;
    let applicants = state.board.applicants_for_job(&job.id)?;
    Ok(Json(applicants).into_response())
}

async fn application_status_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
    Path((job_id, seeker_id)): Path<(String, String)>,
    JsonBody(update): JsonBody<StatusUpdate>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    let job = state.board.owned_job(
        &principal,
        &JobId::from(job_id),
        Capability::ReviewApplicants,
    )?;
    let status = match update.status.as_deref() {
        None => {
            return Err(BoardError::Validation(vec!["status is required".to_string()]));
        }
        Some(raw) => ApplicationStatus::parse(raw).ok_or_else(|| {
            BoardError::Validation(vec![format!(
                "status must be one of applied, under_review, rejected, accepted (got '{raw}')"
            )])
        })?,
    };
    let job = state
        .board
        .update_application_status(&job.id, &SeekerId::from(seeker_id), status)?;
    Ok(Json(json!({ "message": "Status updated", "job": job })).into_response())
}

async fn all_users_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::ModeratePlatform)?;
    Ok(Json(state.board.list_all_users()?).into_response())
}

async fn all_jobs_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::ModeratePlatform)?;
    Ok(Json(state.board.list_all_jobs()?).into_response())
}

async fn statistics_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::ModeratePlatform)?;
    Ok(Json(state.board.statistics()?).into_response())
}

async fn ban_user_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
    Path(user_id): Path<String>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::ModeratePlatform)?;
    state.board.ban_user(&UserId::from(user_id))?;
    Ok(message("User banned and deleted successfully"))
}

async fn remove_job_handler<S>(
    State(state): State<BoardState<S>>,
    principal: Principal,
    Path(job_id): Path<String>,
) -> Result<Response, BoardError>
where
    S: BoardStore + 'static,
{
    principal.require(Capability::ModeratePlatform)?;
    state.board.remove_job(&JobId::from(job_id))?;
    Ok(message("Job removed successfully"))
}
