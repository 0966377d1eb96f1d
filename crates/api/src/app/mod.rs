//! HTTP application wiring (Axum router + pipeline wiring).
//!
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;
use crate::mvc::Mvc;
use crate::mvc::config::MvcConfig;
use crate::settings::ServerConfig;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &ServerConfig) -> Router {
    let mvc = Mvc::builder()
        .configurer(MvcConfig::new().uniform_response(config.uniform_response))
        .build();
    build_router(Arc::new(mvc))
}

/// Router over an already assembled pipeline.
pub fn build_router(mvc: Arc<Mvc>) -> Router {
    // Extension first so extractors can reach the pipeline.
    let pipeline = ServiceBuilder::new()
        .layer(Extension(mvc.clone()))
        .layer(axum::middleware::from_fn_with_state(
            mvc,
            middleware::return_value_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(pipeline)
}
