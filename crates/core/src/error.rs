//! Error model shared by conversion and binding.

use thiserror::Error;

/// Result type used by the binding layer.
pub type MvcResult<T> = Result<T, BindingError>;

/// A value could not be converted to the requested type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// No converter (or converter factory) is registered for the pair.
    #[error("no converter registered from {source_type} to {target_type}")]
    NotRegistered {
        source_type: &'static str,
        target_type: &'static str,
    },

    /// An ordinal does not name a constant of the target enum.
    #[error("ordinal {ordinal} is out of range for {target_type} (0..{len})")]
    OrdinalOutOfRange {
        target_type: &'static str,
        ordinal: i64,
        len: usize,
    },

    /// The source value was malformed for the conversion.
    #[error("invalid value for {target_type}: {message}")]
    InvalidValue {
        target_type: &'static str,
        message: String,
    },
}

/// A handler parameter could not be bound from the request.
///
/// Every variant except [`BindingError::NoResolver`] is the client's fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// A required parameter was absent.
    #[error("missing required parameter `{0}`")]
    Missing(String),

    /// A parameter was present but could not be converted.
    #[error("parameter `{name}`: {source}")]
    Conversion {
        name: String,
        #[source]
        source: ConversionError,
    },

    /// The request payload could not be mapped onto the parameter type.
    #[error("cannot bind {target_type}: {message}")]
    Deserialize {
        target_type: &'static str,
        message: String,
    },

    /// No message converter can read the request content type.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// The request body could not be read by the selected converter.
    #[error("unreadable body: {0}")]
    Unreadable(String),

    /// Several request keys map to the same field under the naming agreement.
    #[error("several request keys bind to `{0}`")]
    DuplicateKey(String),

    /// No registered resolver supports the parameter.
    #[error("no argument resolver supports parameter of type {0}")]
    NoResolver(&'static str),
}

impl BindingError {
    pub fn missing(name: impl Into<String>) -> Self {
        Self::Missing(name.into())
    }

    pub fn conversion(name: impl Into<String>, source: ConversionError) -> Self {
        Self::Conversion {
            name: name.into(),
            source,
        }
    }

    pub fn deserialize(target_type: &'static str, message: impl Into<String>) -> Self {
        Self::Deserialize {
            target_type,
            message: message.into(),
        }
    }

    /// Whether the failure should be reported as a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::NoResolver(_))
    }
}
