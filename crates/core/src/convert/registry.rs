//! Converter registry keyed by `(source type, target type)`.

use core::any::type_name;
use core::fmt;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use super::Converter;
use super::ordinal::OrdinalEnum;
use crate::error::ConversionError;

/// Result of a type-erased conversion.
pub type ErasedOutput = Result<Option<Box<dyn Any + Send>>, ConversionError>;

/// A converter with its source and target types erased.
pub type ErasedConverter = Arc<dyn Fn(Box<dyn Any + Send>) -> ErasedOutput + Send + Sync>;

/// Produces converters for a family of target types on demand.
pub trait ConverterFactory: Send + Sync {
    fn source_type(&self) -> TypeId;

    /// Converter for `target`, or `None` if the target is outside this factory's family.
    fn get_erased(&self, target: &TypeDescriptor) -> Option<ErasedConverter>;
}

/// Constant table of an ordinal enum, captured without naming the type.
#[derive(Debug, Clone, Copy)]
pub struct OrdinalTable {
    len: usize,
    constant: fn(usize) -> Box<dyn Any + Send>,
}

impl OrdinalTable {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Constant at `idx`; callers bounds-check first.
    pub fn constant(&self, idx: usize) -> Box<dyn Any + Send> {
        (self.constant)(idx)
    }
}

/// Describes a conversion target to factories that cannot name it statically.
#[derive(Debug, Clone, Copy)]
pub struct TypeDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    ordinal: Option<OrdinalTable>,
}

impl TypeDescriptor {
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            ordinal: None,
        }
    }

    pub fn ordinal_enum<T: OrdinalEnum>() -> Self {
        Self {
            ordinal: Some(OrdinalTable {
                len: T::VARIANTS.len(),
                constant: |idx| Box::new(T::VARIANTS[idx]) as Box<dyn Any + Send>,
            }),
            ..Self::of::<T>()
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn ordinal_table(&self) -> Option<OrdinalTable> {
        self.ordinal
    }
}

/// Registry of converters and converter factories.
///
/// Exact `(S, T)` registrations win over factories; factories are consulted
/// in registration order.
#[derive(Default)]
pub struct FormatterRegistry {
    converters: HashMap<(TypeId, TypeId), ErasedConverter>,
    factories: Vec<Arc<dyn ConverterFactory>>,
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("converters", &self.converters.len())
            .field("factories", &self.factories.len())
            .finish()
    }
}

impl FormatterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `converter` for `S → T`, replacing any previous registration for the pair.
    pub fn add_converter<S, T, C>(&mut self, converter: C)
    where
        S: Send + 'static,
        T: Send + 'static,
        C: Converter<S, T> + 'static,
    {
        let erased: ErasedConverter = Arc::new(move |source: Box<dyn Any + Send>| -> ErasedOutput {
            let source = source.downcast::<S>().map_err(|_| ConversionError::InvalidValue {
                target_type: type_name::<T>(),
                message: format!("expected a {} source", type_name::<S>()),
            })?;
            let converted = converter.convert(*source)?;
            Ok(converted.map(|t| Box::new(t) as Box<dyn Any + Send>))
        });
        self.converters
            .insert((TypeId::of::<S>(), TypeId::of::<T>()), erased);
    }

    pub fn add_converter_factory<F>(&mut self, factory: F)
    where
        F: ConverterFactory + 'static,
    {
        self.factories.push(Arc::new(factory));
    }

    pub fn can_convert<S: 'static>(&self, target: &TypeDescriptor) -> bool {
        self.find(TypeId::of::<S>(), target).is_some()
    }

    /// Convert `source` to `T` using an exact registration or a factory.
    pub fn convert<S, T>(&self, source: S) -> Result<Option<T>, ConversionError>
    where
        S: Send + 'static,
        T: Send + 'static,
    {
        self.convert_described(source, &TypeDescriptor::of::<T>())
    }

    /// Convert an ordinal to an [`OrdinalEnum`] constant.
    pub fn convert_ordinal<T: OrdinalEnum>(
        &self,
        ordinal: i64,
    ) -> Result<Option<T>, ConversionError> {
        self.convert_described(ordinal, &TypeDescriptor::ordinal_enum::<T>())
    }

    fn convert_described<S, T>(
        &self,
        source: S,
        target: &TypeDescriptor,
    ) -> Result<Option<T>, ConversionError>
    where
        S: Send + 'static,
        T: Send + 'static,
    {
        let converter = self
            .find(TypeId::of::<S>(), target)
            .ok_or(ConversionError::NotRegistered {
                source_type: type_name::<S>(),
                target_type: target.type_name(),
            })?;

        match converter(Box::new(source))? {
            None => Ok(None),
            Some(value) => value
                .downcast::<T>()
                .map(|v| Some(*v))
                .map_err(|_| ConversionError::InvalidValue {
                    target_type: target.type_name(),
                    message: "converter produced a value of another type".to_string(),
                }),
        }
    }

    fn find(&self, source: TypeId, target: &TypeDescriptor) -> Option<ErasedConverter> {
        if let Some(c) = self.converters.get(&(source, target.type_id())) {
            return Some(Arc::clone(c));
        }

        self.factories
            .iter()
            .filter(|f| f.source_type() == source)
            .find_map(|f| f.get_erased(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{IntToEnumConverterFactory, StringToDateConverter};
    use chrono::{NaiveDate, NaiveDateTime};

    struct Upper;

    impl Converter<String, String> for Upper {
        fn convert(&self, source: String) -> Result<Option<String>, ConversionError> {
            Ok(Some(source.to_uppercase()))
        }
    }

    #[test]
    fn exact_registration_is_found_by_type_pair() {
        let mut registry = FormatterRegistry::new();
        registry.add_converter::<String, NaiveDateTime, _>(StringToDateConverter);

        let got: Option<NaiveDateTime> = registry.convert("2022-09-09".to_string()).unwrap();
        assert_eq!(
            got,
            NaiveDate::from_ymd_opt(2022, 9, 9).unwrap().and_hms_opt(0, 0, 0)
        );
        assert!(registry.can_convert::<String>(&TypeDescriptor::of::<NaiveDateTime>()));
    }

    #[test]
    fn documented_none_passes_through_registry() {
        let mut registry = FormatterRegistry::new();
        registry.add_converter::<String, NaiveDateTime, _>(StringToDateConverter);

        let got: Option<NaiveDateTime> = registry.convert("garbage".to_string()).unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn missing_pair_is_reported() {
        let registry = FormatterRegistry::new();
        let err = registry.convert::<String, NaiveDateTime>("x".to_string()).unwrap_err();
        assert!(matches!(err, ConversionError::NotRegistered { .. }));
    }

    #[test]
    fn later_registration_replaces_earlier_for_same_pair() {
        struct Lower;
        impl Converter<String, String> for Lower {
            fn convert(&self, source: String) -> Result<Option<String>, ConversionError> {
                Ok(Some(source.to_lowercase()))
            }
        }

        let mut registry = FormatterRegistry::new();
        registry.add_converter::<String, String, _>(Upper);
        registry.add_converter::<String, String, _>(Lower);
        let got = registry.convert::<String, String>("MiXeD".to_string());
        assert_eq!(got, Ok(Some("mixed".to_string())));
    }

    #[test]
    fn factories_only_serve_their_source_type() {
        crate::ordinal_enum! {
            enum Flag { Off, On }
        }

        let mut registry = FormatterRegistry::new();
        registry.add_converter_factory(IntToEnumConverterFactory);

        assert!(registry.can_convert::<i64>(&TypeDescriptor::ordinal_enum::<Flag>()));
        assert!(!registry.can_convert::<String>(&TypeDescriptor::ordinal_enum::<Flag>()));
        // Without the variant table the factory cannot build the target.
        assert!(!registry.can_convert::<i64>(&TypeDescriptor::of::<Flag>()));
        assert_eq!(registry.convert_ordinal::<Flag>(1), Ok(Some(Flag::On)));
    }

    #[test]
    fn ordinal_descriptor_carries_variant_table() {
        crate::ordinal_enum! {
            enum Tri { A, B, C }
        }

        let table = TypeDescriptor::ordinal_enum::<Tri>().ordinal_table().unwrap();
        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
        assert_eq!(table.constant(2).downcast_ref::<Tri>(), Some(&Tri::C));
        assert!(TypeDescriptor::of::<Tri>().ordinal_table().is_none());
    }
}
