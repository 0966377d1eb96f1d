//! Process-wide tracing setup shared by the binaries.

pub use self::tracing::{DEFAULT_FILTER, LogFormat};

/// Initialize tracing with the default `info` filter (`RUST_LOG` overrides it).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init_with(format: LogFormat) {
    tracing::init(DEFAULT_FILTER, format);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
