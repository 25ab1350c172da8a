//! HTTP API for the SyncScript entity store.
//!
//! Every route maps onto one façade operation of a shared [`Workspace`].
//! Unknown ids answer 404, validation and lifecycle errors 422, and writes
//! to append-only collections 409.

mod error;
mod routes;

pub use error::{ApiError, ApiResult};

use axum::Router;
use std::sync::Arc;
use syncscript_domains::Workspace;

/// Build the HTTP API router over `workspace`.
pub fn build_router(workspace: Arc<Workspace>) -> Router {
    Router::new()
        .nest("/api/v1", routes::api())
        .with_state(workspace)
}
