//! Type conversion: converters, converter factories and the registry that
//! looks them up by source/target type.

pub mod date;
pub mod ordinal;
pub mod registry;

pub use date::StringToDateConverter;
pub use ordinal::{IntToEnumConverter, IntToEnumConverterFactory, OrdinalEnum};
pub use registry::{ConverterFactory, ErasedConverter, FormatterRegistry, TypeDescriptor};

use crate::error::ConversionError;

/// Converts a `S` into a `T`.
///
/// `Ok(None)` is a legitimate outcome: the source had no usable value.
pub trait Converter<S, T>: Send + Sync {
    fn convert(&self, source: S) -> Result<Option<T>, ConversionError>;
}
