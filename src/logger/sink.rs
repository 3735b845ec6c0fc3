//! Sink contract and the built-in renderers.
//!
//! A sink consumes finalized `(message, fields)` records. Emit failures stay
//! inside the sink: a sink that cannot write drops the record and at most
//! self-logs a diagnostic, so nothing ever propagates back into the dispatch
//! path or the original caller.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use colored::Colorize;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

use super::record::LogRecord;

/// Pluggable logging destination.
pub trait Sink: Send + Sync {
    fn name(&self) -> &str;

    /// Renders one record. Must not block indefinitely and must not panic;
    /// failures are swallowed here, never surfaced to the dispatcher.
    fn emit(&self, record: &LogRecord);
}

/// The built-in sink kinds selectable through `configure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Structured,
    HumanReadable,
    File,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sink kind: {input}")]
pub struct ParseSinkKindError {
    pub input: String,
}

impl FromStr for SinkKind {
    type Err = ParseSinkKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "structured" => Ok(SinkKind::Structured),
            "text" | "pretty" => Ok(SinkKind::HumanReadable),
            "file" => Ok(SinkKind::File),
            _ => Err(ParseSinkKindError {
                input: s.to_string(),
            }),
        }
    }
}

/// Parses sink kind names, reporting unknown ones as a side-channel
/// diagnostic and skipping them (non-fatal).
pub fn parse_kinds<S: AsRef<str>>(names: &[S]) -> Vec<SinkKind> {
    let mut kinds = Vec::with_capacity(names.len());
    for name in names {
        match name.as_ref().parse::<SinkKind>() {
            Ok(kind) => kinds.push(kind),
            Err(err) => tracing::warn!(kind = name.as_ref(), %err, "skipping unknown sink kind"),
        }
    }
    kinds
}

/// Failures configuring sinks that touch I/O. Non-fatal to the sinks that
/// were installed alongside the failing one.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid log file path")]
    EmptyPath,
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Writes one JSON object per record to a shared writer (stderr by default).
pub struct StructuredSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl StructuredSink {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stderr()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl Default for StructuredSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for StructuredSink {
    fn name(&self) -> &str {
        "structured"
    }

    fn emit(&self, record: &LogRecord) {
        let Ok(line) = serde_json::to_string(record) else {
            debug!("structured sink: record serialization failed, dropping");
            return;
        };
        let mut out = self.out.lock();
        if let Err(err) = writeln!(out, "{line}") {
            debug!(%err, "structured sink: write failed, dropping record");
        }
    }
}

/// Colored, human-readable rendering: level tag, summary, pretty fields.
pub struct HumanReadableSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl HumanReadableSink {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stderr()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl Default for HumanReadableSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for HumanReadableSink {
    fn name(&self) -> &str {
        "human-readable"
    }

    fn emit(&self, record: &LogRecord) {
        let tag = format!("{}:", record.level);
        let tag = match record.level {
            super::Level::Error => tag.red(),
            super::Level::Warn => tag.yellow(),
            super::Level::Info => tag.green(),
            super::Level::Debug => tag.blue(),
        };
        let fields = serde_json::to_string_pretty(&record.fields)
            .unwrap_or_else(|_| "{}".to_string());
        let mut out = self.out.lock();
        if let Err(err) = writeln!(
            out,
            "{} {} {}",
            tag,
            record.message.cyan(),
            fields.white()
        ) {
            debug!(%err, "human-readable sink: write failed, dropping record");
        }
    }
}

/// Appends JSON lines to a single shared file handle.
///
/// The handle is the one resource shared by all dispatch workers, so writes
/// are serialized behind a mutex to keep lines whole. The file is never
/// rotated or truncated.
pub struct FileSink {
    file: Mutex<std::fs::File>,
    path: PathBuf,
}

impl FileSink {
    /// Opens `path` for append, creating missing parent directories.
    pub fn open(path: &Path) -> Result<Self, ConfigError> {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath);
        }
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| ConfigError::OpenFile {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            file: Mutex::new(file),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    fn emit(&self, record: &LogRecord) {
        let Ok(line) = serde_json::to_string(record) else {
            debug!("file sink: record serialization failed, dropping");
            return;
        };
        let mut file = self.file.lock();
        if let Err(err) = writeln!(file, "{line}") {
            debug!(%err, path = %self.path.display(), "file sink: write failed, dropping record");
        }
    }
}
