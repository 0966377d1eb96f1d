//! String → date conversion with two accepted layouts.

use chrono::{NaiveDate, NaiveDateTime};

use super::Converter;
use crate::error::ConversionError;

/// `yyyy-MM-dd HH:mm:ss`
pub const DATE_TIME_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

/// `yyyy-MM-dd`
pub const DATE_PATTERN: &str = "%Y-%m-%d";

/// Parses `yyyy-MM-dd HH:mm:ss`, falling back to `yyyy-MM-dd` (midnight).
///
/// A layout only has to match the start of the input; anything after the
/// match is ignored, so `2022-09-09T09:25:14` binds as midnight of that day
/// and `2022-09-09 09:25:14.123` as `09:25:14`.
///
/// Input that matches neither layout converts to `None` rather than an error.
/// Callers that need the value must treat `None` as "missing".
#[derive(Debug, Default, Clone, Copy)]
pub struct StringToDateConverter;

impl StringToDateConverter {
    pub fn parse(&self, raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();

        if let Ok((dt, rest)) = NaiveDateTime::parse_and_remainder(raw, DATE_TIME_PATTERN) {
            if !rest.is_empty() {
                tracing::debug!(input = raw, ignored = rest, "trailing date text ignored");
            }
            return Some(dt);
        }

        match NaiveDate::parse_and_remainder(raw, DATE_PATTERN) {
            Ok((date, rest)) => {
                if !rest.is_empty() {
                    tracing::debug!(input = raw, ignored = rest, "trailing date text ignored");
                }
                date.and_hms_opt(0, 0, 0)
            }
            Err(_) => {
                tracing::warn!(input = raw, "unparseable date; converted to none");
                None
            }
        }
    }
}

impl Converter<String, NaiveDateTime> for StringToDateConverter {
    fn convert(&self, source: String) -> Result<Option<NaiveDateTime>, ConversionError> {
        Ok(self.parse(&source))
    }
}

/// `#[serde(default, with = "webmvc_core::convert::date::lenient")]` for
/// `Option<NaiveDateTime>` fields.
///
/// Serializes as `yyyy-MM-dd HH:mm:ss`; deserializes through
/// [`StringToDateConverter`].
pub mod lenient {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{DATE_TIME_PATTERN, StringToDateConverter};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.collect_str(&dt.format(DATE_TIME_PATTERN)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.and_then(|s| StringToDateConverter.parse(&s)))
    }
}
