use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tracing::debug;

pub mod db_service;
pub mod env_utils;
pub mod extract;
pub mod object_storage;
pub mod route_handlers;
pub mod state;
pub mod stream_service;

use crate::state::AppState;

/**
 * main router for the app, defines the webhook event route
 * and the healthcheck used by the deploy platform
 **/
pub fn app(state: Arc<AppState>) -> Router {
    debug!("initializing router(s) ...");

    Router::new()
        .route("/webhook-endpoint", post(route_handlers::webhook::handler))
        .route("/healthcheck", get(|| async { "Ok" }))
        .with_state(state)
}
