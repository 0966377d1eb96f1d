//! Integer → enum conversion by ordinal position.

use core::any::type_name;
use core::fmt;
use core::marker::PhantomData;
use std::any::{Any, TypeId};
use std::sync::Arc;

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserializer, Serializer};

use super::Converter;
use super::registry::{ConverterFactory, ErasedConverter, ErasedOutput, TypeDescriptor};
use crate::error::ConversionError;

/// A fieldless enum whose constants are addressable by declaration index.
///
/// Implement it with [`ordinal_enum!`](crate::ordinal_enum) rather than by hand.
pub trait OrdinalEnum: Sized + Copy + Send + 'static {
    /// Constants in declaration order.
    const VARIANTS: &'static [Self];

    fn ordinal(self) -> usize;
}

/// Bounds-check `ordinal` against a table of `len` constants.
pub fn checked_index(
    ordinal: i64,
    len: usize,
    target_type: &'static str,
) -> Result<usize, ConversionError> {
    usize::try_from(ordinal)
        .ok()
        .filter(|&i| i < len)
        .ok_or(ConversionError::OrdinalOutOfRange {
            target_type,
            ordinal,
            len,
        })
}

/// Maps an ordinal onto the matching constant of `T`.
pub struct IntToEnumConverter<T> {
    _target: PhantomData<fn() -> T>,
}

impl<T: OrdinalEnum> IntToEnumConverter<T> {
    pub fn to_constant(&self, ordinal: i64) -> Result<T, ConversionError> {
        let idx = checked_index(ordinal, T::VARIANTS.len(), type_name::<T>())?;
        Ok(T::VARIANTS[idx])
    }
}

impl<T> fmt::Debug for IntToEnumConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IntToEnumConverter<{}>", type_name::<T>())
    }
}

impl<T: OrdinalEnum> Converter<i64, T> for IntToEnumConverter<T> {
    fn convert(&self, source: i64) -> Result<Option<T>, ConversionError> {
        self.to_constant(source).map(Some)
    }
}

/// Produces an [`IntToEnumConverter`] for any [`OrdinalEnum`].
///
/// Registered with a [`FormatterRegistry`](super::FormatterRegistry), it serves
/// `i64 → T` lookups for every target described by
/// [`TypeDescriptor::ordinal_enum`].
#[derive(Debug, Default, Clone, Copy)]
pub struct IntToEnumConverterFactory;

impl IntToEnumConverterFactory {
    pub fn get_converter<T: OrdinalEnum>(&self) -> IntToEnumConverter<T> {
        IntToEnumConverter {
            _target: PhantomData,
        }
    }
}

impl ConverterFactory for IntToEnumConverterFactory {
    fn source_type(&self) -> TypeId {
        TypeId::of::<i64>()
    }

    fn get_erased(&self, target: &TypeDescriptor) -> Option<ErasedConverter> {
        let table = target.ordinal_table()?;
        let target_type = target.type_name();

        Some(Arc::new(move |source: Box<dyn Any + Send>| -> ErasedOutput {
            let ordinal = source.downcast::<i64>().map_err(|_| ConversionError::InvalidValue {
                target_type,
                message: "ordinal source must be an i64".to_string(),
            })?;
            let idx = checked_index(*ordinal, table.len(), target_type)?;
            Ok(Some(table.constant(idx)))
        }))
    }
}

pub fn serialize_ordinal<T, S>(value: T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: OrdinalEnum,
    S: Serializer,
{
    serializer.serialize_u64(value.ordinal() as u64)
}

/// Accepts an integer or a numeric string (query strings carry no types).
pub fn deserialize_ordinal<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: OrdinalEnum,
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(OrdinalVisitor::<T>(PhantomData))
}

struct OrdinalVisitor<T>(PhantomData<T>);

impl<'de, T: OrdinalEnum> Visitor<'de> for OrdinalVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an ordinal of {}", type_name::<T>())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
        IntToEnumConverterFactory
            .get_converter::<T>()
            .to_constant(v)
            .map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
        match i64::try_from(v) {
            Ok(v) => self.visit_i64(v),
            Err(_) => Err(E::invalid_value(Unexpected::Unsigned(v), &self)),
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        match v.trim().parse::<i64>() {
            Ok(n) => self.visit_i64(n),
            Err(_) => Err(E::invalid_value(Unexpected::Str(v), &self)),
        }
    }
}

/// Declare a fieldless enum that converts from its ordinal.
///
/// The enum gets `Debug, Clone, Copy, PartialEq, Eq, Hash`, an
/// [`OrdinalEnum`] impl, and serde impls that read/write the ordinal.
///
/// ```ignore
/// webmvc_core::ordinal_enum! {
///     pub enum Gender { Male, Female, Unknown }
/// }
/// ```
#[macro_export]
macro_rules! ordinal_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::convert::OrdinalEnum for $name {
            const VARIANTS: &'static [Self] = &[$(Self::$variant),+];

            fn ordinal(self) -> usize {
                self as usize
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                $crate::convert::ordinal::serialize_ordinal(*self, serializer)
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                $crate::convert::ordinal::deserialize_ordinal(deserializer)
            }
        }
    };
}
