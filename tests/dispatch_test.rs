//! Non-blocking dispatch guarantees: caller latency independent of sink
//! speed, per-sink isolation, drop-on-full backpressure.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use errtrail::{LogRecord, LoggingContext, Sink, TrailError};

struct SlowSink {
    delay: Duration,
    seen: AtomicU64,
}

impl Sink for SlowSink {
    fn name(&self) -> &str {
        "slow"
    }

    fn emit(&self, _record: &LogRecord) {
        std::thread::sleep(self.delay);
        self.seen.fetch_add(1, Ordering::Relaxed);
    }
}

struct CountingSink {
    seen: AtomicU64,
}

impl Sink for CountingSink {
    fn name(&self) -> &str {
        "counting"
    }

    fn emit(&self, _record: &LogRecord) {
        self.seen.fetch_add(1, Ordering::Relaxed);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn caller_latency_is_independent_of_sink_speed() {
    let slow = Arc::new(SlowSink {
        delay: Duration::from_millis(100),
        seen: AtomicU64::new(0),
    });
    let ctx = LoggingContext::new();
    ctx.install(vec![Arc::clone(&slow) as Arc<dyn Sink>]);

    let err = TrailError::new("backend unavailable");
    let start = Instant::now();
    for i in 0..100_000u32 {
        ctx.log(Some(&err), i, [Some("burst")]);
    }
    let elapsed = start.elapsed();

    // 100k calls against a 100ms-per-record sink: the caller must not have
    // waited on any of that I/O.
    assert!(
        elapsed < Duration::from_secs(2),
        "caller observed dispatch latency: {elapsed:?}"
    );

    // Almost everything was dropped once the bounded queue filled; that is
    // the documented backpressure policy.
    assert!(ctx.dropped_records() > 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn slow_sink_does_not_block_fast_sink() {
    let slow = Arc::new(SlowSink {
        delay: Duration::from_millis(200),
        seen: AtomicU64::new(0),
    });
    let fast = Arc::new(CountingSink {
        seen: AtomicU64::new(0),
    });
    let ctx = LoggingContext::new();
    ctx.install(vec![
        Arc::clone(&slow) as Arc<dyn Sink>,
        Arc::clone(&fast) as Arc<dyn Sink>,
    ]);

    let err = TrailError::new("boom");
    for _ in 0..50 {
        ctx.log(Some(&err), (), [Some("fanout")]);
    }

    // The fast sink drains all 50 while the slow one is still on its first.
    for _ in 0..200 {
        if fast.seen.load(Ordering::Relaxed) == 50 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(fast.seen.load(Ordering::Relaxed), 50);
    assert!(slow.seen.load(Ordering::Relaxed) < 50);
}

#[tokio::test(flavor = "multi_thread")]
async fn every_record_reaches_every_sink_under_capacity() {
    let a = Arc::new(CountingSink {
        seen: AtomicU64::new(0),
    });
    let b = Arc::new(CountingSink {
        seen: AtomicU64::new(0),
    });
    let ctx = LoggingContext::new();
    ctx.install(vec![
        Arc::clone(&a) as Arc<dyn Sink>,
        Arc::clone(&b) as Arc<dyn Sink>,
    ]);

    let err = TrailError::new("boom");
    for _ in 0..100 {
        ctx.log(Some(&err), (), [Some("steady")]);
    }

    for _ in 0..200 {
        if a.seen.load(Ordering::Relaxed) == 100 && b.seen.load(Ordering::Relaxed) == 100 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(a.seen.load(Ordering::Relaxed), 100);
    assert_eq!(b.seen.load(Ordering::Relaxed), 100);
    assert_eq!(ctx.dropped_records(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_callers_share_the_registry_safely() {
    let counter = Arc::new(CountingSink {
        seen: AtomicU64::new(0),
    });
    let ctx = Arc::new(LoggingContext::new());
    ctx.install(vec![Arc::clone(&counter) as Arc<dyn Sink>]);

    let mut join_set = tokio::task::JoinSet::new();
    for task_id in 0..10 {
        let ctx = Arc::clone(&ctx);
        join_set.spawn(async move {
            let err = TrailError::new(format!("task {task_id} failed"));
            for _ in 0..50 {
                ctx.log(Some(&err), task_id, [Some("concurrent")]);
            }
        });
    }
    while let Some(result) = join_set.join_next().await {
        result.unwrap();
    }

    for _ in 0..200 {
        if counter.seen.load(Ordering::Relaxed) == 500 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(counter.seen.load(Ordering::Relaxed), 500);
}
