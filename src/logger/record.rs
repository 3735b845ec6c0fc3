use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::level::Level;

/// A finalized report handed to every sink.
///
/// `fields` is an insertion-ordered mapping (serde_json with `preserve_order`)
/// built fresh per log call; sinks receive records behind an `Arc` and must
/// treat them as read-only.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub level: Level,
    pub time: DateTime<Utc>,
    #[serde(rename = "msg")]
    pub message: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LogRecord {
    pub fn new(level: Level, message: String, fields: Map<String, Value>) -> Self {
        Self {
            level,
            time: Utc::now(),
            message,
            fields,
        }
    }
}
