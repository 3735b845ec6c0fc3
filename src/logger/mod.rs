//! Multi-sink, non-blocking error logging.
//!
//! All mutable logging state (the sink list, the severity gate, the fragment
//! separator) lives on an explicit [`LoggingContext`]. One documented default
//! instance, [`LoggingContext::global`], backs the module-level convenience
//! functions for ergonomic top-level use; nothing else is process-global.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::OnceLock;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::warn;

mod level;
mod record;
mod registry;
mod sink;

pub use level::{Level, ParseLevelError};
pub use record::LogRecord;
pub use registry::SinkRegistry;
pub use sink::{
    ConfigError, FileSink, HumanReadableSink, ParseSinkKindError, Sink, SinkKind,
    StructuredSink, parse_kinds,
};

use crate::error::{HasTrail, SEPARATOR, TrailError, join};

/// Default destination for the file sink when no path is supplied.
pub const DEFAULT_LOG_FILE: &str = "log/logger.json";

/// Owned logging state: sink registry, severity gate, fragment separator.
///
/// Starts unconfigured (dispatch is a silent no-op) and moves to configured
/// on the first [`configure`](LoggingContext::configure) or
/// [`install`](LoggingContext::install); later calls replace the sink list
/// atomically. Lives for the process; there is no terminal state.
pub struct LoggingContext {
    registry: SinkRegistry,
    level: RwLock<Level>,
    separator: RwLock<String>,
}

impl LoggingContext {
    pub fn new() -> Self {
        Self {
            registry: SinkRegistry::new(),
            level: RwLock::new(Level::Error),
            separator: RwLock::new(SEPARATOR.to_string()),
        }
    }

    /// The default process-wide instance backing the module-level functions.
    pub fn global() -> &'static LoggingContext {
        static GLOBAL: OnceLock<LoggingContext> = OnceLock::new();
        GLOBAL.get_or_init(LoggingContext::new)
    }

    /// Builds the requested built-in sinks and atomically replaces the
    /// active list. Must run inside a tokio runtime.
    ///
    /// `File` uses `file_path`, falling back to [`DEFAULT_LOG_FILE`];
    /// missing parent directories are created. If the file cannot be opened
    /// the error is returned but the other requested sinks are still
    /// installed: partial success, not total rollback.
    pub fn configure(
        &self,
        kinds: &[SinkKind],
        file_path: Option<&Path>,
    ) -> Result<(), ConfigError> {
        let mut sinks: Vec<Arc<dyn Sink>> = Vec::with_capacity(kinds.len());
        let mut failure = None;
        for kind in kinds {
            match kind {
                SinkKind::Structured => sinks.push(Arc::new(StructuredSink::new())),
                SinkKind::HumanReadable => sinks.push(Arc::new(HumanReadableSink::new())),
                SinkKind::File => {
                    let path = file_path
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
                    match FileSink::open(&path) {
                        Ok(file_sink) => sinks.push(Arc::new(file_sink)),
                        Err(err) => {
                            warn!(%err, "file sink omitted, installing remaining sinks");
                            failure = Some(err);
                        }
                    }
                }
            }
        }
        self.registry.install(sinks);
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Installs caller-supplied sinks (the pluggable-renderer surface).
    /// Same atomic whole-list replacement as `configure`.
    pub fn install(&self, sinks: Vec<Arc<dyn Sink>>) {
        self.registry.install(sinks);
    }

    /// Lowest severity that is still forwarded to the sinks.
    pub fn set_level(&self, level: Level) {
        *self.level.write() = level;
    }

    pub fn level(&self) -> Level {
        *self.level.read()
    }

    /// Overrides the separator used when joining log message fragments.
    /// The pure wrapping engine keeps using the crate default
    /// [`SEPARATOR`](crate::error::SEPARATOR).
    pub fn set_separator(&self, sep: impl Into<String>) {
        *self.separator.write() = sep.into();
    }

    pub fn separator(&self) -> String {
        self.separator.read().clone()
    }

    /// Reports `err` at `Error` severity. See [`LoggingContext::log_at`].
    pub fn log<C, I, S>(&self, err: Option<&TrailError>, context: C, fragments: I)
    where
        C: fmt::Debug,
        I: IntoIterator<Item = Option<S>>,
        S: fmt::Display,
    {
        self.log_at(Level::Error, err, context, fragments);
    }

    /// Builds a summary from the fragments, a fresh field map carrying the
    /// error trail and the opaque request context, and fans the record out
    /// to every installed sink.
    ///
    /// Returns immediately: dispatch is enqueue-only and never waits on sink
    /// I/O, so caller latency is independent of sink count and speed. An
    /// absent `err` is a no-op with strictly no side effects; records below
    /// the context level are discarded before dispatch.
    pub fn log_at<C, I, S>(&self, level: Level, err: Option<&TrailError>, context: C, fragments: I)
    where
        C: fmt::Debug,
        I: IntoIterator<Item = Option<S>>,
        S: fmt::Display,
    {
        let Some(err) = err else { return };
        if level < self.level() {
            return;
        }
        let separator = self.separator();
        let summary = join(&separator, fragments);
        let mut fields = Map::new();
        fields.insert("error".to_string(), Value::String(err.trail().to_string()));
        fields.insert(
            "request".to_string(),
            Value::String(format!("{context:?}")),
        );
        self.registry.dispatch(LogRecord::new(level, summary, fields));
    }

    /// Number of currently installed sinks.
    pub fn sink_count(&self) -> usize {
        self.registry.sink_count()
    }

    /// Records dropped by the current sinks because their queues were full.
    pub fn dropped_records(&self) -> u64 {
        self.registry.dropped_records()
    }
}

impl Default for LoggingContext {
    fn default() -> Self {
        Self::new()
    }
}

/// [`LoggingContext::configure`] on the default instance.
pub fn configure(kinds: &[SinkKind], file_path: Option<&Path>) -> Result<(), ConfigError> {
    LoggingContext::global().configure(kinds, file_path)
}

/// [`LoggingContext::install`] on the default instance.
pub fn install(sinks: Vec<Arc<dyn Sink>>) {
    LoggingContext::global().install(sinks);
}

/// [`LoggingContext::set_level`] on the default instance.
pub fn set_level(level: Level) {
    LoggingContext::global().set_level(level);
}

/// [`LoggingContext::set_separator`] on the default instance.
pub fn set_separator(sep: impl Into<String>) {
    LoggingContext::global().set_separator(sep);
}

/// [`LoggingContext::log`] on the default instance.
pub fn log<C, I, S>(err: Option<&TrailError>, context: C, fragments: I)
where
    C: fmt::Debug,
    I: IntoIterator<Item = Option<S>>,
    S: fmt::Display,
{
    LoggingContext::global().log(err, context, fragments);
}

/// [`LoggingContext::log_at`] on the default instance.
pub fn log_at<C, I, S>(level: Level, err: Option<&TrailError>, context: C, fragments: I)
where
    C: fmt::Debug,
    I: IntoIterator<Item = Option<S>>,
    S: fmt::Display,
{
    LoggingContext::global().log_at(level, err, context, fragments);
}
