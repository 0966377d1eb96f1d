//! Argument resolvers: bind marked handler parameters from the request.

use core::any::type_name;
use std::fmt;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::header;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_json::Value;

use webmvc_core::naming::{normalize_keys, to_snake_case};
use webmvc_core::{BindingError, MvcResult};

use super::media_type::MediaType;
use super::message::MessageConverters;

/// How a parameter asks to be bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// Query parameters, keys mapped by naming agreement.
    ParamMapping,
    /// Request body read by a message converter, keys mapped by naming agreement.
    BodyMapping,
}

/// Metadata about a handler parameter, as seen by resolvers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParameter {
    kind: BindingKind,
    type_name: &'static str,
}

impl MethodParameter {
    pub fn new<T>(kind: BindingKind) -> Self {
        Self {
            kind,
            type_name: type_name::<T>(),
        }
    }

    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// The request as visible to resolvers.
#[derive(Debug, Clone, Copy)]
pub struct NativeRequest<'a> {
    pub parts: &'a Parts,
    /// Buffered body; `None` when the extractor only sees the head.
    pub body: Option<&'a Bytes>,
    pub converters: &'a MessageConverters,
}

/// Untyped result of a resolver, deserialized into the parameter type by the extractor.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedArgument {
    /// `application/x-www-form-urlencoded` pairs.
    Form(String),
    Json(Value),
}

impl ResolvedArgument {
    pub fn bind<T: DeserializeOwned>(self) -> MvcResult<T> {
        let target = type_name::<T>();
        match self {
            Self::Form(encoded) => serde_urlencoded::from_str(&encoded)
                .map_err(|e| BindingError::deserialize(target, e.to_string())),
            Self::Json(value) => serde_json::from_value(value)
                .map_err(|e| BindingError::deserialize(target, e.to_string())),
        }
    }
}

pub trait HandlerMethodArgumentResolver: Send + Sync + fmt::Debug {
    fn supports_parameter(&self, parameter: &MethodParameter) -> bool;

    fn resolve_argument(
        &self,
        parameter: &MethodParameter,
        request: &NativeRequest<'_>,
    ) -> MvcResult<ResolvedArgument>;
}

/// Binds `ParamMapping` parameters from the query string.
///
/// Keys follow the naming agreement: `userName`, `user-name` and `user_name`
/// all bind to the field `user_name`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestParamMappingAgreementResolver;

impl HandlerMethodArgumentResolver for RequestParamMappingAgreementResolver {
    fn supports_parameter(&self, parameter: &MethodParameter) -> bool {
        parameter.kind() == BindingKind::ParamMapping
    }

    fn resolve_argument(
        &self,
        parameter: &MethodParameter,
        request: &NativeRequest<'_>,
    ) -> MvcResult<ResolvedArgument> {
        let query = request.parts.uri.query().unwrap_or_default();
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| BindingError::deserialize(parameter.type_name(), e.to_string()))?;

        let mapped: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (to_snake_case(&k), v))
            .collect();

        let encoded = serde_urlencoded::to_string(&mapped)
            .map_err(|e| BindingError::deserialize(parameter.type_name(), e.to_string()))?;
        Ok(ResolvedArgument::Form(encoded))
    }
}

/// Binds `BodyMapping` parameters from the request body.
///
/// The reader is the first message converter accepting the request's
/// `Content-Type`; a missing header counts as `application/octet-stream`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestBodyMappingResolver;

impl HandlerMethodArgumentResolver for RequestBodyMappingResolver {
    fn supports_parameter(&self, parameter: &MethodParameter) -> bool {
        parameter.kind() == BindingKind::BodyMapping
    }

    fn resolve_argument(
        &self,
        _parameter: &MethodParameter,
        request: &NativeRequest<'_>,
    ) -> MvcResult<ResolvedArgument> {
        let content_type = match request.parts.headers.get(header::CONTENT_TYPE) {
            None => MediaType::octet_stream(),
            Some(raw) => raw
                .to_str()
                .ok()
                .and_then(|s| s.parse::<MediaType>().ok())
                .ok_or_else(|| BindingError::UnsupportedMediaType(format!("{raw:?}")))?,
        };

        let reader = request
            .converters
            .reader_for(&content_type)
            .ok_or_else(|| BindingError::UnsupportedMediaType(content_type.essence().to_string()))?;

        let body = request
            .body
            .filter(|b| !b.is_empty())
            .ok_or_else(|| {
                BindingError::Unreadable("required request body is missing".to_string())
            })?;

        let value = reader
            .read(body)
            .map_err(|e| BindingError::Unreadable(e.to_string()))?;
        Ok(ResolvedArgument::Json(normalize_keys(value)?))
    }
}

/// Ordered resolver chain; the first supporting resolver binds the parameter.
#[derive(Debug, Clone, Default)]
pub struct ArgumentResolvers {
    resolvers: Vec<Arc<dyn HandlerMethodArgumentResolver>>,
}

impl ArgumentResolvers {
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn supports(&self, parameter: &MethodParameter) -> bool {
        self.resolvers.iter().any(|r| r.supports_parameter(parameter))
    }

    pub fn resolve(
        &self,
        parameter: &MethodParameter,
        request: &NativeRequest<'_>,
    ) -> MvcResult<ResolvedArgument> {
        let resolver = self
            .resolvers
            .iter()
            .find(|r| r.supports_parameter(parameter))
            .ok_or(BindingError::NoResolver(parameter.type_name()))?;

        tracing::debug!(
            parameter = parameter.type_name(),
            kind = ?parameter.kind(),
            resolver = ?resolver,
            "resolving argument"
        );
        resolver.resolve_argument(parameter, request)
    }
}

impl From<Vec<Arc<dyn HandlerMethodArgumentResolver>>> for ArgumentResolvers {
    fn from(resolvers: Vec<Arc<dyn HandlerMethodArgumentResolver>>) -> Self {
        Self { resolvers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Search {
        user_name: String,
        page_size: Option<u32>,
    }

    fn parts(uri: &str, content_type: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn chain() -> ArgumentResolvers {
        ArgumentResolvers::from(vec![
            Arc::new(RequestParamMappingAgreementResolver)
                as Arc<dyn HandlerMethodArgumentResolver>,
            Arc::new(RequestBodyMappingResolver),
        ])
    }

    fn converters() -> MessageConverters {
        MessageConverters::from(MessageConverters::defaults())
    }

    #[test]
    fn each_resolver_supports_only_its_marker() {
        let query = MethodParameter::new::<Search>(BindingKind::ParamMapping);
        let body = MethodParameter::new::<Search>(BindingKind::BodyMapping);

        assert!(RequestParamMappingAgreementResolver.supports_parameter(&query));
        assert!(!RequestParamMappingAgreementResolver.supports_parameter(&body));
        assert!(RequestBodyMappingResolver.supports_parameter(&body));
        assert!(!RequestBodyMappingResolver.supports_parameter(&query));
    }

    #[test]
    fn query_keys_bind_by_agreement() {
        let converters = converters();
        for uri in [
            "/s?userName=ann&pageSize=20",
            "/s?user-name=ann&page-size=20",
            "/s?user_name=ann&page_size=20",
        ] {
            let parts = parts(uri, None);
            let request = NativeRequest { parts: &parts, body: None, converters: &converters };
            let param = MethodParameter::new::<Search>(BindingKind::ParamMapping);

            let bound: Search = chain().resolve(&param, &request).unwrap().bind().unwrap();
            assert_eq!(bound, Search { user_name: "ann".into(), page_size: Some(20) }, "uri {uri}");
        }
    }

    #[test]
    fn percent_encoded_values_survive_mapping() {
        let converters = converters();
        let parts = parts("/s?userName=a%20b%26c", None);
        let request = NativeRequest { parts: &parts, body: None, converters: &converters };
        let param = MethodParameter::new::<Search>(BindingKind::ParamMapping);

        let bound: Search = chain().resolve(&param, &request).unwrap().bind().unwrap();
        assert_eq!(bound.user_name, "a b&c");
    }

    #[test]
    fn missing_required_query_field_is_a_client_error() {
        let converters = converters();
        let parts = parts("/s?pageSize=1", None);
        let request = NativeRequest { parts: &parts, body: None, converters: &converters };
        let param = MethodParameter::new::<Search>(BindingKind::ParamMapping);

        let err = chain().resolve(&param, &request).unwrap().bind::<Search>().unwrap_err();
        assert!(matches!(err, BindingError::Deserialize { .. }));
        assert!(err.is_client_error());
    }

    #[test]
    fn body_keys_bind_by_agreement() {
        let converters = converters();
        let parts = parts("/s", Some("application/json; charset=utf-8"));
        let body = Bytes::from_static(br#"{"userName":"bob","pageSize":3}"#);
        let request = NativeRequest { parts: &parts, body: Some(&body), converters: &converters };
        let param = MethodParameter::new::<Search>(BindingKind::BodyMapping);

        let bound: Search = chain().resolve(&param, &request).unwrap().bind().unwrap();
        assert_eq!(bound, Search { user_name: "bob".into(), page_size: Some(3) });
    }

    #[test]
    fn body_keys_colliding_under_agreement_are_rejected() {
        let converters = converters();
        let parts = parts("/s", Some("application/json"));
        let body = Bytes::from_static(br#"{"user_name":"first","userName":"second"}"#);
        let request = NativeRequest { parts: &parts, body: Some(&body), converters: &converters };
        let param = MethodParameter::new::<Search>(BindingKind::BodyMapping);

        let err = chain().resolve(&param, &request).unwrap_err();
        assert_eq!(err, BindingError::DuplicateKey("user_name".to_string()));
        assert!(err.is_client_error());
    }

    #[test]
    fn body_without_readable_content_type_is_unsupported() {
        let converters = converters();
        let body = Bytes::from_static(b"{}");
        let param = MethodParameter::new::<Search>(BindingKind::BodyMapping);

        for ct in [None, Some("application/xml")] {
            let parts = parts("/s", ct);
            let request =
                NativeRequest { parts: &parts, body: Some(&body), converters: &converters };
            let err = chain().resolve(&param, &request).unwrap_err();
            assert!(matches!(err, BindingError::UnsupportedMediaType(_)), "content type {ct:?}");
        }
    }

    #[test]
    fn empty_or_malformed_body_is_unreadable() {
        let converters = converters();
        let parts = parts("/s", Some("application/json"));
        let param = MethodParameter::new::<Search>(BindingKind::BodyMapping);

        for raw in [&b""[..], &b"{oops"[..]] {
            let body = Bytes::copy_from_slice(raw);
            let request =
                NativeRequest { parts: &parts, body: Some(&body), converters: &converters };
            let err = chain().resolve(&param, &request).unwrap_err();
            assert!(matches!(err, BindingError::Unreadable(_)));
        }
    }

    #[test]
    fn unsupported_parameter_has_no_resolver() {
        let converters = converters();
        let parts = parts("/s", None);
        let request = NativeRequest { parts: &parts, body: None, converters: &converters };
        let param = MethodParameter::new::<Search>(BindingKind::ParamMapping);

        let err = ArgumentResolvers::default().resolve(&param, &request).unwrap_err();
        assert!(matches!(err, BindingError::NoResolver(_)));
        assert!(!err.is_client_error());
    }
}
