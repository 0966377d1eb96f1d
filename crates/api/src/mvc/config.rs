//! The application's pipeline configuration.

use std::sync::Arc;

use chrono::NaiveDateTime;
use webmvc_core::{FormatterRegistry, IntToEnumConverterFactory, StringToDateConverter};

use super::WebMvcConfigurer;
use super::message::{CompactJsonMessageConverter, HttpMessageConverter};
use super::resolver::{
    HandlerMethodArgumentResolver, RequestBodyMappingResolver, RequestParamMappingAgreementResolver,
};
use super::return_value::{ReturnValueHandlers, install_uniform_response};

/// Registers the date/enum converters, both mapping resolvers, the compact
/// JSON converter and (unless disabled) the uniform response envelope.
#[derive(Debug, Clone)]
pub struct MvcConfig {
    uniform_response: bool,
}

impl Default for MvcConfig {
    fn default() -> Self {
        Self {
            uniform_response: true,
        }
    }
}

impl MvcConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uniform_response(mut self, enabled: bool) -> Self {
        self.uniform_response = enabled;
        self
    }
}

impl WebMvcConfigurer for MvcConfig {
    fn add_formatters(&self, registry: &mut FormatterRegistry) {
        registry.add_converter::<String, NaiveDateTime, _>(StringToDateConverter);
        registry.add_converter_factory(IntToEnumConverterFactory);
    }

    fn add_argument_resolvers(&self, resolvers: &mut Vec<Arc<dyn HandlerMethodArgumentResolver>>) {
        resolvers.push(Arc::new(RequestParamMappingAgreementResolver));
        resolvers.push(Arc::new(RequestBodyMappingResolver));
    }

    fn extend_message_converters(&self, converters: &mut Vec<Arc<dyn HttpMessageConverter>>) {
        converters.push(Arc::new(CompactJsonMessageConverter::default()));
    }

    fn customize_return_value_handlers(&self, handlers: &mut ReturnValueHandlers) {
        if !self.uniform_response {
            return;
        }
        if install_uniform_response(handlers).is_none() {
            tracing::warn!("uniform response requested but no body processor is registered");
        }
    }
}
