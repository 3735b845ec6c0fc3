//! Sink registry and the asynchronous dispatcher.
//!
//! Every installed sink gets its own bounded queue and worker task, so a slow
//! or failing sink can only delay or lose its own records. Dispatch enqueues
//! with `try_send` and never awaits: the caller returns immediately whatever
//! the sinks are doing. When the queue is full the record is dropped and
//! counted (backpressure policy: drop, never block).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::warn;

use super::record::LogRecord;
use super::sink::Sink;

/// Per-sink queue depth. Dispatch beyond this while the worker is stalled
/// drops records rather than growing memory or blocking the caller.
pub(crate) const QUEUE_CAPACITY: usize = 1024;

struct SinkHandle {
    name: String,
    tx: mpsc::Sender<Arc<LogRecord>>,
    dropped: AtomicU64,
}

impl SinkHandle {
    /// Spawns the worker that drains this sink's queue. The worker exits once
    /// every sender is gone, i.e. after the registry swaps this handle out
    /// and in-flight records have been delivered.
    fn spawn(sink: Arc<dyn Sink>) -> Self {
        let (tx, mut rx) = mpsc::channel::<Arc<LogRecord>>(QUEUE_CAPACITY);
        let name = sink.name().to_string();
        tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                sink.emit(&record);
            }
        });
        Self {
            name,
            tx,
            dropped: AtomicU64::new(0),
        }
    }
}

/// Process-lifetime list of installed sinks.
///
/// Readers clone an `Arc` snapshot of the whole list; `install` replaces the
/// snapshot in one store, so an in-flight dispatch never observes a
/// half-updated list.
pub struct SinkRegistry {
    sinks: RwLock<Arc<Vec<SinkHandle>>>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self {
            sinks: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Atomically replaces the active sink list. Must run inside a tokio
    /// runtime (one worker task is spawned per sink).
    pub fn install(&self, sinks: Vec<Arc<dyn Sink>>) {
        let handles: Vec<SinkHandle> = sinks.into_iter().map(SinkHandle::spawn).collect();
        *self.sinks.write() = Arc::new(handles);
    }

    /// Fans the record out to every installed sink without waiting for any
    /// of them. Completion order across sinks, and relative to later
    /// dispatches, is unspecified.
    pub fn dispatch(&self, record: LogRecord) {
        let sinks = Arc::clone(&self.sinks.read());
        if sinks.is_empty() {
            return;
        }
        let record = Arc::new(record);
        for handle in &*sinks {
            if handle.tx.try_send(Arc::clone(&record)).is_err() {
                let dropped = handle.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                // Rate-limit the diagnostic to power-of-two counts.
                if dropped.is_power_of_two() {
                    warn!(sink = %handle.name, dropped, "sink queue full, dropping record");
                }
            }
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.read().len()
    }

    /// Total records dropped by the currently installed sinks.
    pub fn dropped_records(&self) -> u64 {
        self.sinks
            .read()
            .iter()
            .map(|h| h.dropped.load(Ordering::Relaxed))
            .sum()
    }
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}
