use axum::http::StatusCode;
use axum::response::IntoResponse;

use webmvc_core::Envelope;

/// Error response in envelope shape: `{status, message, data: null}`.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(Envelope::error(status.as_u16(), message)),
    )
        .into_response()
}
