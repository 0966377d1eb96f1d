//! Return-value handling for body-annotated handlers.
//!
//! A handler returning [`ResponseBody`] stashes its payload as a
//! [`ReturnValue`] in the response extensions. The middleware then offers it to
//! the [`ReturnValueHandlers`] chain, where the first supporting handler writes
//! the final body.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use webmvc_core::Envelope;

use super::error::MvcError;
use super::message::MessageConverters;
use crate::context::ResponseContext;

/// A handler result destined for body serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnValue {
    pub status: StatusCode,
    pub value: Value,
}

impl ReturnValue {
    pub fn new(status: StatusCode, value: Value) -> Self {
        Self { status, value }
    }
}

/// Marks a handler's result for body serialization through the pipeline.
///
/// Without the return-value middleware the payload is still written as plain
/// JSON, so handlers never produce an empty body by accident.
#[derive(Debug, Clone)]
pub struct ResponseBody<T> {
    status: StatusCode,
    body: T,
}

impl<T> ResponseBody<T> {
    pub fn ok(body: T) -> Self {
        Self::with_status(StatusCode::OK, body)
    }

    pub fn created(body: T) -> Self {
        Self::with_status(StatusCode::CREATED, body)
    }

    pub fn with_status(status: StatusCode, body: T) -> Self {
        Self { status, body }
    }
}

impl<T: Serialize> IntoResponse for ResponseBody<T> {
    fn into_response(self) -> Response {
        let value = match serde_json::to_value(&self.body) {
            Ok(v) => v,
            Err(e) => return MvcError::Serialization(e.to_string()).into_response(),
        };

        let mut response = (self.status, Json(&value)).into_response();
        response
            .extensions_mut()
            .insert(ReturnValue::new(self.status, value));
        response
    }
}

pub trait ReturnValueHandler: Send + Sync + fmt::Debug {
    fn supports_return_type(&self, return_value: &ReturnValue) -> bool;

    /// Write `return_value` into `response` (status, headers, body).
    fn handle_return_value(
        &self,
        return_value: ReturnValue,
        ctx: &ResponseContext,
        response: &mut Response,
    ) -> Result<(), MvcError>;

    fn as_any(&self) -> &dyn Any;
}

/// Default body handler: negotiates a message converter from `Accept` and
/// writes the payload with it.
#[derive(Debug, Clone)]
pub struct RequestResponseBodyProcessor {
    converters: MessageConverters,
}

impl RequestResponseBodyProcessor {
    pub fn new(converters: MessageConverters) -> Self {
        Self { converters }
    }
}

impl ReturnValueHandler for RequestResponseBodyProcessor {
    fn supports_return_type(&self, _return_value: &ReturnValue) -> bool {
        true
    }

    fn handle_return_value(
        &self,
        return_value: ReturnValue,
        ctx: &ResponseContext,
        response: &mut Response,
    ) -> Result<(), MvcError> {
        let (converter, media_type) = self.converters.writer_for(ctx.accept()).ok_or_else(|| {
            let wanted: Vec<String> = ctx.accept().iter().map(ToString::to_string).collect();
            MvcError::NotAcceptable(wanted.join(", "))
        })?;

        let bytes = converter.write(&return_value.value)?;
        let content_type = HeaderValue::from_str(&media_type.to_string())
            .map_err(|e| MvcError::Serialization(e.to_string()))?;

        tracing::debug!(
            path = ctx.path(),
            content_type = %media_type,
            status = return_value.status.as_u16(),
            "writing response body"
        );

        *response.status_mut() = return_value.status;
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, content_type);
        headers.remove(header::CONTENT_LENGTH);
        *response.body_mut() = Body::from(bytes);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Decorator that wraps the payload in `{status, data}` and hands the
/// envelope to the wrapped handler.
#[derive(Debug, Clone)]
pub struct UniformResponseHandler {
    delegate: Arc<dyn ReturnValueHandler>,
}

impl UniformResponseHandler {
    pub fn new(delegate: Arc<dyn ReturnValueHandler>) -> Self {
        Self { delegate }
    }

    pub fn delegate(&self) -> &Arc<dyn ReturnValueHandler> {
        &self.delegate
    }
}

impl ReturnValueHandler for UniformResponseHandler {
    fn supports_return_type(&self, return_value: &ReturnValue) -> bool {
        self.delegate.supports_return_type(return_value)
    }

    fn handle_return_value(
        &self,
        return_value: ReturnValue,
        ctx: &ResponseContext,
        response: &mut Response,
    ) -> Result<(), MvcError> {
        let ReturnValue { status, value } = return_value;
        let wrapped = ReturnValue::new(status, Envelope::wrap(status.as_u16(), value));
        self.delegate.handle_return_value(wrapped, ctx, response)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Ordered return-value handler chain.
#[derive(Debug, Clone, Default)]
pub struct ReturnValueHandlers {
    handlers: Vec<Arc<dyn ReturnValueHandler>>,
}

impl ReturnValueHandlers {
    pub fn defaults(converters: MessageConverters) -> Self {
        Self {
            handlers: vec![Arc::new(RequestResponseBodyProcessor::new(converters))],
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Arc<dyn ReturnValueHandler>> {
        self.handlers.get(idx)
    }

    pub fn push(&mut self, handler: Arc<dyn ReturnValueHandler>) {
        self.handlers.push(handler);
    }

    pub fn insert(&mut self, idx: usize, handler: Arc<dyn ReturnValueHandler>) {
        self.handlers.insert(idx, handler);
    }

    /// Index of the first handler whose concrete type is `T`.
    pub fn position_of<T: ReturnValueHandler + 'static>(&self) -> Option<usize> {
        self.handlers.iter().position(|h| h.as_any().is::<T>())
    }

    /// Replace the handler at `idx`, returning the previous one.
    pub fn replace(
        &mut self,
        idx: usize,
        handler: Arc<dyn ReturnValueHandler>,
    ) -> Option<Arc<dyn ReturnValueHandler>> {
        let slot = self.handlers.get_mut(idx)?;
        Some(std::mem::replace(slot, handler))
    }

    /// Offer `return_value` to the first supporting handler.
    pub fn handle(
        &self,
        return_value: ReturnValue,
        ctx: &ResponseContext,
        response: &mut Response,
    ) -> Result<(), MvcError> {
        let handler = self
            .handlers
            .iter()
            .find(|h| h.supports_return_type(&return_value))
            .ok_or(MvcError::NoReturnValueHandler)?;
        handler.handle_return_value(return_value, ctx, response)
    }
}

/// Swap the default body processor for a [`UniformResponseHandler`] wrapping it.
///
/// The replacement keeps the processor's position. Returns `None` and leaves
/// the chain untouched when no [`RequestResponseBodyProcessor`] is present.
pub fn install_uniform_response(
    handlers: &mut ReturnValueHandlers,
) -> Option<Arc<UniformResponseHandler>> {
    let Some(idx) = handlers.position_of::<RequestResponseBodyProcessor>() else {
        tracing::debug!("no body processor registered; uniform response not installed");
        return None;
    };

    let delegate = Arc::clone(handlers.get(idx)?);
    let uniform = Arc::new(UniformResponseHandler::new(delegate));
    handlers.replace(idx, uniform.clone());
    Some(uniform)
}
