// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::missing_errors_doc, // Internal API
    clippy::missing_panics_doc, // Internal API
    clippy::must_use_candidate, // Annotated selectively on critical APIs
    clippy::doc_markdown        // Internal API
)]

pub mod error;
pub mod logger;
pub mod notify;

// Re-export main types for easy access
pub use error::{
    HasTrail, SEPARATOR, TrailError, join, join_errors, unwrap_as_error, unwrap_trail, wrap,
    wrap_fmt,
};
pub use logger::{
    ConfigError, Level, LogRecord, LoggingContext, Sink, SinkKind, configure, install, log,
    log_at, set_level, set_separator,
};
pub use notify::{BroadcastBot, BroadcastOptions};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
