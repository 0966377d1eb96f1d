use crate::mvc::media_type::MediaType;

/// Request facts the return-value handlers need after the handler has run.
///
/// Captured by the middleware before the request is handed to the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseContext {
    accept: Vec<MediaType>,
    path: String,
}

impl ResponseContext {
    pub fn new(accept: Vec<MediaType>, path: impl Into<String>) -> Self {
        Self {
            accept,
            path: path.into(),
        }
    }

    /// Accepted media types, highest quality first. Never empty.
    pub fn accept(&self) -> &[MediaType] {
        &self.accept
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}
