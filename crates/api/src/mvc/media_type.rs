//! Media types (`type/subtype; params`) and `Accept` header parsing.

use core::fmt;
use core::str::FromStr;

use axum::http::HeaderValue;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid media type `{0}`")]
pub struct InvalidMediaType(pub String);

/// A media type with an optional quality weight (from `Accept`).
///
/// Type, subtype and parameter names are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    main: String,
    sub: String,
    params: Vec<(String, String)>,
    /// `q` scaled to 0..=1000.
    quality: u16,
}

pub const WILDCARD: &str = "*";

impl MediaType {
    pub fn new(main: &str, sub: &str) -> Self {
        Self {
            main: main.to_ascii_lowercase(),
            sub: sub.to_ascii_lowercase(),
            params: Vec::new(),
            quality: 1000,
        }
    }

    pub fn all() -> Self {
        Self::new(WILDCARD, WILDCARD)
    }

    pub fn application_json() -> Self {
        Self::new("application", "json")
    }

    pub fn application_plus_json() -> Self {
        Self::new("application", "*+json")
    }

    pub fn text_plain() -> Self {
        Self::new("text", "plain")
    }

    pub fn octet_stream() -> Self {
        Self::new("application", "octet-stream")
    }

    pub fn main_type(&self) -> &str {
        &self.main
    }

    pub fn subtype(&self) -> &str {
        &self.sub
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn quality(&self) -> f32 {
        f32::from(self.quality) / 1000.0
    }

    pub fn is_wildcard_type(&self) -> bool {
        self.main == WILDCARD
    }

    pub fn is_wildcard_subtype(&self) -> bool {
        self.sub == WILDCARD || self.sub.starts_with("*+")
    }

    pub fn is_concrete(&self) -> bool {
        !self.is_wildcard_type() && !self.is_wildcard_subtype()
    }

    /// Structured syntax suffix, e.g. `json` for `vnd.acme+json`.
    fn suffix(&self) -> Option<&str> {
        self.sub.rsplit_once('+').map(|(_, s)| s)
    }

    /// Whether `self` (possibly a wildcard) covers `other`.
    pub fn includes(&self, other: &MediaType) -> bool {
        if self.is_wildcard_type() {
            return true;
        }
        if self.main != other.main {
            return false;
        }
        if self.sub == other.sub || self.sub == WILDCARD {
            return true;
        }
        // `application/*+json` covers `application/vnd.acme+json`.
        match (self.sub.strip_prefix("*+"), other.suffix()) {
            (Some(own), Some(theirs)) => own == theirs,
            _ => false,
        }
    }

    pub fn is_compatible_with(&self, other: &MediaType) -> bool {
        self.includes(other) || other.includes(self)
    }

    /// Same type without parameters or quality.
    pub fn essence(&self) -> MediaType {
        Self::new(&self.main, &self.sub)
    }

    /// Parse a comma-separated `Accept` value, highest quality first.
    ///
    /// Malformed entries are skipped; `q=0` entries are dropped. An absent or
    /// empty header means `*/*`.
    pub fn parse_accept(header: Option<&HeaderValue>) -> Vec<MediaType> {
        let raw = header.and_then(|h| h.to_str().ok()).unwrap_or("");

        let mut accepted: Vec<MediaType> = raw
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .filter_map(|part| part.parse().ok())
            .filter(|mt: &MediaType| mt.quality > 0)
            .collect();

        if accepted.is_empty() {
            return vec![Self::all()];
        }

        // Stable: equal weights keep header order.
        accepted.sort_by(|a, b| b.quality.cmp(&a.quality));
        accepted
    }
}

impl FromStr for MediaType {
    type Err = InvalidMediaType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidMediaType(s.to_string());

        let mut segments = s.split(';');
        let essence = segments.next().map(str::trim).unwrap_or_default();
        let (main, sub) = essence.split_once('/').ok_or_else(invalid)?;
        let (main, sub) = (main.trim(), sub.trim());
        if main.is_empty() || sub.is_empty() || (main == WILDCARD && sub != WILDCARD) {
            return Err(invalid());
        }

        let mut media = Self::new(main, sub);
        for segment in segments {
            let Some((name, value)) = segment.split_once('=') else {
                continue;
            };
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().trim_matches('"');

            if name == "q" {
                let q: f32 = value.parse().map_err(|_| invalid())?;
                if !(0.0..=1.0).contains(&q) {
                    return Err(invalid());
                }
                media.quality = (q * 1000.0).round() as u16;
            } else {
                media.params.push((name, value.to_string()));
            }
        }
        Ok(media)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main, self.sub)?;
        for (k, v) in &self.params {
            write!(f, ";{k}={v}")?;
        }
        Ok(())
    }
}
