//! Request pipeline customization: the four extension slots and the
//! configurer that fills them at startup.
//!
//! - `message.rs`: HTTP message converters (content-type specific codecs)
//! - `return_value.rs`: return-value handlers and the uniform envelope
//! - `resolver.rs` / `extract.rs`: argument resolvers and handler markers
//! - `config.rs`: the application's [`WebMvcConfigurer`]

use std::sync::Arc;

use webmvc_core::FormatterRegistry;

pub mod config;
pub mod error;
pub mod extract;
pub mod media_type;
pub mod message;
pub mod resolver;
pub mod return_value;

use message::{HttpMessageConverter, MessageConverters};
use resolver::{ArgumentResolvers, HandlerMethodArgumentResolver};
use return_value::ReturnValueHandlers;

/// Startup hooks into the pipeline's extension slots. Every hook defaults to a no-op.
pub trait WebMvcConfigurer: Send + Sync {
    fn add_formatters(&self, _registry: &mut FormatterRegistry) {}

    /// Resolvers are consulted in list order.
    fn add_argument_resolvers(
        &self,
        _resolvers: &mut Vec<Arc<dyn HandlerMethodArgumentResolver>>,
    ) {
    }

    /// The list already holds the default converters; append to keep them.
    fn extend_message_converters(&self, _converters: &mut Vec<Arc<dyn HttpMessageConverter>>) {}

    fn customize_return_value_handlers(&self, _handlers: &mut ReturnValueHandlers) {}
}

/// The assembled pipeline. Immutable once built; shared as `Arc<Mvc>`.
#[derive(Debug)]
pub struct Mvc {
    formatters: FormatterRegistry,
    argument_resolvers: ArgumentResolvers,
    message_converters: MessageConverters,
    return_value_handlers: ReturnValueHandlers,
}

impl Mvc {
    pub fn builder() -> MvcBuilder {
        MvcBuilder::default()
    }

    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    pub fn argument_resolvers(&self) -> &ArgumentResolvers {
        &self.argument_resolvers
    }

    pub fn message_converters(&self) -> &MessageConverters {
        &self.message_converters
    }

    pub fn return_value_handlers(&self) -> &ReturnValueHandlers {
        &self.return_value_handlers
    }
}

#[derive(Default)]
pub struct MvcBuilder {
    configurers: Vec<Box<dyn WebMvcConfigurer>>,
}

impl std::fmt::Debug for MvcBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MvcBuilder")
            .field("configurers", &self.configurers.len())
            .finish()
    }
}

impl MvcBuilder {
    /// Add a configurer. Configurers run in registration order.
    pub fn configurer(mut self, configurer: impl WebMvcConfigurer + 'static) -> Self {
        self.configurers.push(Box::new(configurer));
        self
    }

    pub fn build(self) -> Mvc {
        let mut formatters = FormatterRegistry::new();
        let mut resolvers: Vec<Arc<dyn HandlerMethodArgumentResolver>> = Vec::new();
        let mut converters = MessageConverters::defaults();

        for c in &self.configurers {
            c.add_formatters(&mut formatters);
            c.add_argument_resolvers(&mut resolvers);
            c.extend_message_converters(&mut converters);
        }

        // The body processor writes with the final converter list.
        let message_converters = MessageConverters::from(converters);
        let mut return_value_handlers = ReturnValueHandlers::defaults(message_converters.clone());
        for c in &self.configurers {
            c.customize_return_value_handlers(&mut return_value_handlers);
        }

        let mvc = Mvc {
            formatters,
            argument_resolvers: ArgumentResolvers::from(resolvers),
            message_converters,
            return_value_handlers,
        };

        tracing::info!(
            formatters = ?mvc.formatters,
            argument_resolvers = mvc.argument_resolvers.len(),
            message_converters = mvc.message_converters.len(),
            return_value_handlers = ?mvc.return_value_handlers,
            "mvc pipeline assembled"
        );
        mvc
    }
}
