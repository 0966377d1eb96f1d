//! Pipeline errors and their HTTP mapping.

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use webmvc_core::BindingError;

use crate::app::errors::json_error;

/// A message converter failed to read or write a payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error("cannot read {media_type}: {message}")]
    Read { media_type: String, message: String },

    #[error("cannot write {media_type}: {message}")]
    Write { media_type: String, message: String },
}

/// Failure anywhere in argument binding or return-value handling.
#[derive(Debug, Error)]
pub enum MvcError {
    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Message(#[from] MessageError),

    /// The request body could not be buffered (too large, or the stream failed).
    #[error(transparent)]
    Body(#[from] BytesRejection),

    #[error("no converter can produce any of: {0}")]
    NotAcceptable(String),

    #[error("cannot serialize handler result: {0}")]
    Serialization(String),

    #[error("no return value handler supports the handler result")]
    NoReturnValueHandler,

    #[error("mvc pipeline is not installed on this router")]
    NotConfigured,
}

impl MvcError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Binding(BindingError::UnsupportedMediaType(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            Self::Binding(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
            Self::Body(rejection) => rejection.status(),
            Self::Binding(_)
            | Self::Message(_)
            | Self::Serialization(_)
            | Self::NoReturnValueHandler
            | Self::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MvcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request pipeline failure");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        json_error(status, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webmvc_core::ConversionError;

    #[test]
    fn binding_failures_are_client_errors() {
        let missing = MvcError::from(BindingError::missing("id"));
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let conv = MvcError::from(BindingError::conversion(
            "gender",
            ConversionError::OrdinalOutOfRange { target_type: "Gender", ordinal: 9, len: 3 },
        ));
        assert_eq!(conv.status(), StatusCode::BAD_REQUEST);

        let media = MvcError::from(BindingError::UnsupportedMediaType("text/csv".into()));
        assert_eq!(media.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn misconfiguration_is_a_server_error() {
        assert_eq!(
            MvcError::from(BindingError::NoResolver("Foo")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(MvcError::NotConfigured.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(MvcError::NotAcceptable("text/csv".into()).status(), StatusCode::NOT_ACCEPTABLE);
    }
}
