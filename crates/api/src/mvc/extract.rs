//! Parameter markers for handlers, bound through the resolver chain.
//!
//! ```ignore
//! async fn search(ParamMapping(q): ParamMapping<SampleQuery>) -> ResponseBody<SampleQuery> {
//!     ResponseBody::ok(q)
//! }
//! ```

use std::sync::Arc;

use axum::async_trait;
use axum::body::{Body, Bytes};
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use webmvc_core::naming::to_snake_case;
use webmvc_core::{BindingError, ConversionError, MvcResult, OrdinalEnum};

use super::Mvc;
use super::error::MvcError;
use super::resolver::{BindingKind, MethodParameter, NativeRequest};

fn mvc_of(parts: &Parts) -> Result<Arc<Mvc>, MvcError> {
    parts
        .extensions
        .get::<Arc<Mvc>>()
        .cloned()
        .ok_or(MvcError::NotConfigured)
}

/// Query parameters mapped onto `T` by naming agreement.
#[derive(Debug, Clone)]
pub struct ParamMapping<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ParamMapping<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = MvcError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let mvc = mvc_of(parts)?;
        let parameter = MethodParameter::new::<T>(BindingKind::ParamMapping);
        let request = NativeRequest {
            parts,
            body: None,
            converters: mvc.message_converters(),
        };

        let value = mvc
            .argument_resolvers()
            .resolve(&parameter, &request)?
            .bind::<T>()?;
        Ok(Self(value))
    }
}

/// Request body read by the converter chain and mapped onto `T`.
///
/// Consumes the body, so it must be the last handler argument. The body size
/// limit is axum's `DefaultBodyLimit` (2 MiB unless a layer changes it).
#[derive(Debug, Clone)]
pub struct BodyMapping<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for BodyMapping<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = MvcError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let mvc = mvc_of(&parts)?;

        // Buffered like axum's own extractors: `DefaultBodyLimit` (read from the
        // extensions) applies, and an oversized body is rejected with 413.
        let mut buffered = Request::new(body);
        *buffered.extensions_mut() = parts.extensions.clone();
        let bytes = Bytes::from_request(buffered, state).await?;

        let parameter = MethodParameter::new::<T>(BindingKind::BodyMapping);
        let request = NativeRequest {
            parts: &parts,
            body: Some(&bytes),
            converters: mvc.message_converters(),
        };

        let value = mvc
            .argument_resolvers()
            .resolve(&parameter, &request)?
            .bind::<T>()?;
        Ok(Self(value))
    }
}

/// Typed access to individual query parameters through the formatter registry.
#[derive(Debug, Clone)]
pub struct RequestParams {
    pairs: Vec<(String, String)>,
    mvc: Arc<Mvc>,
}

impl RequestParams {
    /// Raw value of the first parameter named `name` (naming agreement applies).
    pub fn raw(&self, name: &str) -> Option<&str> {
        let key = to_snake_case(name);
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Convert a parameter with the registered `String → T` converter.
    ///
    /// `Ok(None)` when the parameter is absent or the converter yields no value.
    pub fn get<T: Send + 'static>(&self, name: &str) -> MvcResult<Option<T>> {
        let Some(raw) = self.raw(name) else {
            return Ok(None);
        };
        self.mvc
            .formatters()
            .convert::<String, T>(raw.to_string())
            .map_err(|e| BindingError::conversion(name, e))
    }

    /// Like [`get`](Self::get) but absent or unconvertible values are errors.
    pub fn require<T: Send + 'static>(&self, name: &str) -> MvcResult<T> {
        let raw = self.raw(name).ok_or_else(|| BindingError::missing(name))?;
        self.get::<T>(name)?.ok_or_else(|| {
            BindingError::conversion(
                name,
                ConversionError::InvalidValue {
                    target_type: core::any::type_name::<T>(),
                    message: format!("no value could be converted from {raw:?}"),
                },
            )
        })
    }

    /// Convert an ordinal parameter to an enum constant.
    pub fn get_enum<T: OrdinalEnum>(&self, name: &str) -> MvcResult<Option<T>> {
        let Some(raw) = self.raw(name) else {
            return Ok(None);
        };
        let ordinal: i64 = raw.trim().parse().map_err(|_| {
            BindingError::conversion(
                name,
                ConversionError::InvalidValue {
                    target_type: core::any::type_name::<T>(),
                    message: format!("{raw:?} is not an ordinal"),
                },
            )
        })?;
        self.mvc
            .formatters()
            .convert_ordinal::<T>(ordinal)
            .map_err(|e| BindingError::conversion(name, e))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestParams
where
    S: Send + Sync,
{
    type Rejection = MvcError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let mvc = mvc_of(parts)?;
        let query = parts.uri.query().unwrap_or_default();
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| BindingError::deserialize("RequestParams", e.to_string()))?;

        Ok(Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (to_snake_case(&k), v))
                .collect(),
            mvc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mvc::config::MvcConfig;
    use axum::http::Request as HttpRequest;
    use chrono::{NaiveDate, NaiveDateTime};

    webmvc_core::ordinal_enum! {
        enum Color { Red, Green, Blue }
    }

    async fn params(uri: &str) -> RequestParams {
        let mvc = Arc::new(Mvc::builder().configurer(MvcConfig::default()).build());
        let (mut parts, _) = HttpRequest::builder()
            .uri(uri)
            .extension(mvc)
            .body(())
            .unwrap()
            .into_parts();
        RequestParams::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn dates_convert_through_registry() {
        let p = params("/d?startTime=2022-09-09%2009:25:14&day=2022-09-10&bad=nope").await;

        let start: Option<NaiveDateTime> = p.get("startTime").unwrap();
        assert_eq!(
            start,
            NaiveDate::from_ymd_opt(2022, 9, 9).unwrap().and_hms_opt(9, 25, 14)
        );
        let day: NaiveDateTime = p.require("day").unwrap();
        let midnight = NaiveDate::from_ymd_opt(2022, 9, 10).unwrap().and_hms_opt(0, 0, 0);
        assert_eq!(Some(day), midnight);

        // The converter yields no value; optional access sees `None` ...
        assert_eq!(p.get::<NaiveDateTime>("bad").unwrap(), None);
        // ... and required access reports it.
        assert!(matches!(p.require::<NaiveDateTime>("bad"), Err(BindingError::Conversion { .. })));
        assert!(matches!(p.require::<NaiveDateTime>("absent"), Err(BindingError::Missing(_))));
    }

    #[tokio::test]
    async fn enums_convert_through_factory() {
        let p = params("/e?color=2&other=5&word=red").await;

        assert_eq!(p.get_enum::<Color>("color").unwrap(), Some(Color::Blue));
        assert_eq!(p.get_enum::<Color>("missing").unwrap(), None);
        assert!(matches!(
            p.get_enum::<Color>("other"),
            Err(BindingError::Conversion { source: ConversionError::OrdinalOutOfRange { .. }, .. })
        ));
        assert!(matches!(p.get_enum::<Color>("word"), Err(BindingError::Conversion { .. })));
    }

    #[tokio::test]
    async fn unregistered_target_is_a_conversion_error() {
        let p = params("/x?n=1").await;
        assert!(matches!(
            p.get::<u8>("n"),
            Err(BindingError::Conversion { source: ConversionError::NotRegistered { .. }, .. })
        ));
    }

    #[tokio::test]
    async fn extractors_without_pipeline_report_misconfiguration() {
        let (mut parts, _) = HttpRequest::builder().uri("/x").body(()).unwrap().into_parts();
        let err = RequestParams::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, MvcError::NotConfigured));
    }
}
