use axum::Router;

pub mod samples;
pub mod system;

/// Router for everything behind the mvc pipeline.
pub fn router() -> Router {
    Router::new().nest("/samples", samples::router())
}
