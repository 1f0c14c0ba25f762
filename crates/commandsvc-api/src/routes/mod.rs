//! Route modules.

pub mod commands;
pub mod health;
pub mod metrics;

use axum::Router;

use crate::state::AppState;

/// Returns every route the server exposes.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(metrics::router())
        .merge(commands::router())
}
