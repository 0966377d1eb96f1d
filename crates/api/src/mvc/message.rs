//! HTTP message converters: content-type specific (de)serialization of
//! JSON trees, and the ordered chain used for negotiation.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use axum::body::Bytes;
use serde_json::Value;

use super::error::MessageError;
use super::media_type::MediaType;

pub trait HttpMessageConverter: Send + Sync + fmt::Debug {
    fn supported_media_types(&self) -> &[MediaType];

    fn can_read(&self, media_type: &MediaType) -> bool {
        self.supported_media_types().iter().any(|m| m.includes(media_type))
    }

    fn can_write(&self, media_type: &MediaType) -> bool {
        self.supported_media_types()
            .iter()
            .any(|m| m.is_compatible_with(media_type))
    }

    fn read(&self, body: &[u8]) -> Result<Value, MessageError>;

    fn write(&self, value: &Value) -> Result<Bytes, MessageError>;

    fn as_any(&self) -> &dyn Any;
}

/// `application/json` and `application/*+json`.
#[derive(Debug, Clone)]
pub struct JsonMessageConverter {
    media_types: Vec<MediaType>,
}

impl Default for JsonMessageConverter {
    fn default() -> Self {
        Self {
            media_types: vec![MediaType::application_json(), MediaType::application_plus_json()],
        }
    }
}

impl HttpMessageConverter for JsonMessageConverter {
    fn supported_media_types(&self) -> &[MediaType] {
        &self.media_types
    }

    fn read(&self, body: &[u8]) -> Result<Value, MessageError> {
        serde_json::from_slice(body).map_err(|e| MessageError::Read {
            media_type: "application/json".to_string(),
            message: e.to_string(),
        })
    }

    fn write(&self, value: &Value) -> Result<Bytes, MessageError> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| MessageError::Write {
                media_type: "application/json".to_string(),
                message: e.to_string(),
            })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `text/plain`. Strings are written raw; other values as JSON text.
#[derive(Debug, Clone)]
pub struct StringMessageConverter {
    media_types: Vec<MediaType>,
}

impl Default for StringMessageConverter {
    fn default() -> Self {
        Self {
            media_types: vec![MediaType::text_plain()],
        }
    }
}

impl HttpMessageConverter for StringMessageConverter {
    fn supported_media_types(&self) -> &[MediaType] {
        &self.media_types
    }

    fn read(&self, body: &[u8]) -> Result<Value, MessageError> {
        let text = std::str::from_utf8(body).map_err(|e| MessageError::Read {
            media_type: "text/plain".to_string(),
            message: e.to_string(),
        })?;
        Ok(Value::String(text.to_string()))
    }

    fn write(&self, value: &Value) -> Result<Bytes, MessageError> {
        Ok(match value {
            Value::String(s) => Bytes::from(s.clone()),
            other => Bytes::from(other.to_string()),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub const COMPACT_JSON: &str = "x-compact-json";

/// `application/x-compact-json`: JSON with every `null` object member dropped.
#[derive(Debug, Clone)]
pub struct CompactJsonMessageConverter {
    media_types: Vec<MediaType>,
}

impl CompactJsonMessageConverter {
    pub fn media_type() -> MediaType {
        MediaType::new("application", COMPACT_JSON)
    }
}

impl Default for CompactJsonMessageConverter {
    fn default() -> Self {
        Self {
            media_types: vec![Self::media_type()],
        }
    }
}

fn strip_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), strip_nulls(v)))
                .collect(),
        ),
        // Array positions are significant; only members are dropped.
        Value::Array(items) => Value::Array(items.iter().map(strip_nulls).collect()),
        other => other.clone(),
    }
}

impl HttpMessageConverter for CompactJsonMessageConverter {
    fn supported_media_types(&self) -> &[MediaType] {
        &self.media_types
    }

    fn read(&self, body: &[u8]) -> Result<Value, MessageError> {
        serde_json::from_slice(body).map_err(|e| MessageError::Read {
            media_type: Self::media_type().to_string(),
            message: e.to_string(),
        })
    }

    fn write(&self, value: &Value) -> Result<Bytes, MessageError> {
        serde_json::to_vec(&strip_nulls(value))
            .map(Bytes::from)
            .map_err(|e| MessageError::Write {
                media_type: Self::media_type().to_string(),
                message: e.to_string(),
            })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Ordered converter chain. Earlier converters win among equal matches.
#[derive(Debug, Clone, Default)]
pub struct MessageConverters {
    converters: Vec<Arc<dyn HttpMessageConverter>>,
}

impl MessageConverters {
    /// JSON first, then plain text.
    pub fn defaults() -> Vec<Arc<dyn HttpMessageConverter>> {
        vec![
            Arc::new(JsonMessageConverter::default()),
            Arc::new(StringMessageConverter::default()),
        ]
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn HttpMessageConverter>> {
        self.converters.iter()
    }

    pub fn contains<T: HttpMessageConverter + 'static>(&self) -> bool {
        self.converters.iter().any(|c| c.as_any().is::<T>())
    }

    /// First converter able to read `content_type`.
    pub fn reader_for(&self, content_type: &MediaType) -> Option<&Arc<dyn HttpMessageConverter>> {
        self.converters.iter().find(|c| c.can_read(content_type))
    }

    /// Negotiate a writer for the accepted types (already sorted by quality).
    ///
    /// Returns the converter and the concrete media type to announce.
    pub fn writer_for(
        &self,
        accepted: &[MediaType],
    ) -> Option<(&Arc<dyn HttpMessageConverter>, MediaType)> {
        accepted.iter().find_map(|wanted| {
            self.converters.iter().find_map(|c| {
                if !c.can_write(wanted) {
                    return None;
                }
                if wanted.is_concrete() {
                    return Some((c, wanted.essence()));
                }
                c.supported_media_types()
                    .iter()
                    .find(|m| m.is_concrete() && wanted.includes(m))
                    .map(|m| (c, m.clone()))
            })
        })
    }
}

impl From<Vec<Arc<dyn HttpMessageConverter>>> for MessageConverters {
    fn from(converters: Vec<Arc<dyn HttpMessageConverter>>) -> Self {
        Self { converters }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extended() -> MessageConverters {
        let mut list = MessageConverters::defaults();
        list.push(Arc::new(CompactJsonMessageConverter::default()));
        MessageConverters::from(list)
    }

    fn mt(s: &str) -> MediaType {
        s.parse().unwrap()
    }

    #[test]
    fn appending_keeps_builtins_for_their_types() {
        let converters = extended();
        assert_eq!(converters.len(), 3);
        assert!(converters.contains::<JsonMessageConverter>());
        assert!(converters.contains::<StringMessageConverter>());

        let (json, media) = converters.writer_for(&[MediaType::application_json()]).unwrap();
        assert!(json.as_any().is::<JsonMessageConverter>());
        assert_eq!(media.to_string(), "application/json");

        let (text, _) = converters.writer_for(&[MediaType::text_plain()]).unwrap();
        assert!(text.as_any().is::<StringMessageConverter>());

        let reader = converters.reader_for(&MediaType::application_json()).unwrap();
        assert!(reader.as_any().is::<JsonMessageConverter>());
    }

    #[test]
    fn appended_converter_serves_its_own_type() {
        let converters = extended();
        let (compact, media) = converters
            .writer_for(&[CompactJsonMessageConverter::media_type()])
            .unwrap();
        assert!(compact.as_any().is::<CompactJsonMessageConverter>());
        assert_eq!(media, CompactJsonMessageConverter::media_type());
        assert!(converters.reader_for(&CompactJsonMessageConverter::media_type()).is_some());
    }

    #[test]
    fn wildcard_accept_picks_first_in_list_order() {
        let converters = extended();
        let (first, media) = converters.writer_for(&[MediaType::all()]).unwrap();
        assert!(first.as_any().is::<JsonMessageConverter>());
        assert_eq!(media, MediaType::application_json());
    }

    #[test]
    fn list_order_decides_between_equal_matches() {
        #[derive(Debug)]
        struct ShadowJson(Vec<MediaType>);
        impl HttpMessageConverter for ShadowJson {
            fn supported_media_types(&self) -> &[MediaType] {
                &self.0
            }
            fn read(&self, _: &[u8]) -> Result<Value, MessageError> {
                Ok(Value::Null)
            }
            fn write(&self, _: &Value) -> Result<Bytes, MessageError> {
                Ok(Bytes::from_static(b"shadow"))
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        let mut list = MessageConverters::defaults();
        list.push(Arc::new(ShadowJson(vec![MediaType::application_json()])));
        let converters = MessageConverters::from(list);

        let (winner, _) = converters.writer_for(&[MediaType::application_json()]).unwrap();
        assert!(winner.as_any().is::<JsonMessageConverter>());
    }

    #[test]
    fn suffix_types_are_written_by_json_converter() {
        let converters = extended();
        let (c, media) = converters.writer_for(&[mt("application/vnd.acme+json")]).unwrap();
        assert!(c.as_any().is::<JsonMessageConverter>());
        assert_eq!(media.to_string(), "application/vnd.acme+json");
    }

    #[test]
    fn unsupported_types_have_no_writer_or_reader() {
        let converters = extended();
        assert!(converters.writer_for(&[mt("text/csv")]).is_none());
        assert!(converters.reader_for(&MediaType::octet_stream()).is_none());
    }

    #[test]
    fn compact_converter_drops_null_members_only() {
        let value = json!({"a": null, "b": [null, {"c": null, "d": 1}], "e": "x"});
        let bytes = CompactJsonMessageConverter::default().write(&value).unwrap();
        let written: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(written, json!({"b": [null, {"d": 1}], "e": "x"}));

        let plain = JsonMessageConverter::default().write(&value).unwrap();
        assert_eq!(serde_json::from_slice::<Value>(&plain).unwrap(), value);
    }

    #[test]
    fn string_converter_reads_text_and_writes_strings_raw() {
        let c = StringMessageConverter::default();
        assert_eq!(c.read(b"hello").unwrap(), json!("hello"));
        assert_eq!(c.write(&json!("raw")).unwrap(), Bytes::from_static(b"raw"));
        assert_eq!(c.write(&json!({"k": 1})).unwrap(), Bytes::from_static(br#"{"k":1}"#));
        assert!(c.read(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn json_reader_reports_malformed_input() {
        let err = JsonMessageConverter::default().read(b"{not json").unwrap_err();
        assert!(matches!(err, MessageError::Read { .. }));
    }
}
