//! HTTP route handlers.

pub mod health;
pub mod helpers;
pub mod metrics;
pub mod restaurant;

use axum::Router;

use crate::state::AppState;

/// All application routes with request metrics attached.
///
/// Sessions, tracing and compression are layered on by the caller so that
/// tests can swap the session store.
pub fn app(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(restaurant::router())
        .merge(health::router())
        .merge(metrics::router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::track_metrics,
        ))
}
