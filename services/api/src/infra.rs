use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use job_board::access::TokenIssuer;
use job_board::board::{BoardState, InMemoryStore, JobBoard, User};
use job_board::config::AppConfig;
use job_board::error::AppError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory job board with the configured super-admin already in place.
pub(crate) fn build_board(
    config: &AppConfig,
) -> Result<(BoardState<InMemoryStore>, User), AppError> {
    let store = Arc::new(InMemoryStore::new());
    let board = Arc::new(JobBoard::new(store));
    let super_admin = board.ensure_super_admin(&config.super_admin)?;
    let tokens = Arc::new(TokenIssuer::from_config(&config.auth));
    Ok((BoardState::new(board, tokens), super_admin))
}
