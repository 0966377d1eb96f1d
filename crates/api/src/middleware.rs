use std::sync::Arc;

use axum::{
    extract::State,
    http::header::ACCEPT,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::context::ResponseContext;
use crate::mvc::Mvc;
use crate::mvc::media_type::MediaType;
use crate::mvc::return_value::ReturnValue;

/// Runs the return-value handler chain on body-annotated handler results.
///
/// Responses without a [`ReturnValue`] (plain `Json`, status codes, errors)
/// pass through untouched.
pub async fn return_value_middleware(
    State(mvc): State<Arc<Mvc>>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let ctx = ResponseContext::new(
        MediaType::parse_accept(req.headers().get(ACCEPT)),
        req.uri().path(),
    );

    let mut response = next.run(req).await;

    let Some(return_value) = response.extensions_mut().remove::<ReturnValue>() else {
        return response;
    };

    match mvc
        .return_value_handlers()
        .handle(return_value, &ctx, &mut response)
    {
        Ok(()) => response,
        Err(e) => e.into_response(),
    }
}
