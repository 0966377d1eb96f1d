//! `webmvc-core`: framework-independent building blocks of the request pipeline.
//!
//! This crate contains **no HTTP code**: the response envelope, type conversion
//! (string→date, ordinal→enum, the converter registry) and the key naming
//! agreement shared by the argument resolvers.

pub mod convert;
pub mod envelope;
pub mod error;
pub mod naming;

pub use convert::{
    Converter, FormatterRegistry, IntToEnumConverter, IntToEnumConverterFactory, OrdinalEnum,
    StringToDateConverter, TypeDescriptor,
};
pub use envelope::Envelope;
pub use error::{BindingError, ConversionError, MvcResult};

#[doc(hidden)]
pub mod __private {
    pub use serde;
}
