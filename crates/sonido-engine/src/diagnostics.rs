//! Render-path diagnostics side channel (§9 "Render-thread logging"): the
//! render and stream-error callbacks never call into `tracing` directly;
//! they publish into this ring buffer instead, and a control-thread drain
//! loop forwards each event to `tracing`, rate-limited per kind.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

/// Render-path event kinds, each rate-limited independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The loaded plug-in's `render` call returned an error; the block
    /// fell back to pass-through.
    PluginRenderFault,
    /// The input stream's cpal error callback fired.
    InputStreamError,
    /// The output stream's cpal error callback fired.
    OutputStreamError,
}

const KIND_COUNT: usize = 3;

fn kind_index(kind: DiagnosticKind) -> usize {
    match kind {
        DiagnosticKind::PluginRenderFault => 0,
        DiagnosticKind::InputStreamError => 1,
        DiagnosticKind::OutputStreamError => 2,
    }
}

/// One occurrence of a render-path diagnostic event.
#[derive(Debug, Clone)]
pub struct RenderDiagnostic {
    /// Which event kind this is, for rate-limiting purposes.
    pub kind: DiagnosticKind,
    /// A short, human-readable detail string (an error's `Display`, a
    /// device name, etc).
    pub detail: String,
}

/// Ring buffer capacity, sized generously above anything the rate limiter
/// below could let through between two drain passes.
const CAPACITY: usize = 256;

/// At most one `tracing` line per kind per this interval; occurrences in
/// between are folded into the next line's `suppressed` count.
const LOG_INTERVAL: Duration = Duration::from_millis(200);

/// The producer half. Cloneable and shared across the input-error,
/// output-error, and render callbacks despite the underlying ring buffer
/// being single-producer: a publish takes a non-blocking `try_lock`, so a
/// diagnostic is dropped rather than ever blocking a realtime thread.
#[derive(Clone)]
pub struct DiagnosticSink {
    producer: Arc<Mutex<HeapProd<RenderDiagnostic>>>,
}

impl DiagnosticSink {
    /// Publishes one diagnostic. Never blocks: drops the event if the
    /// producer is momentarily held by another thread or the buffer is
    /// full.
    pub fn publish(&self, kind: DiagnosticKind, detail: impl Into<String>) {
        if let Some(mut producer) = self.producer.try_lock() {
            let _ = producer.try_push(RenderDiagnostic { kind, detail: detail.into() });
        }
    }
}

/// Drains a [`DiagnosticSink`]'s events on a control thread, forwarding
/// each to `tracing::warn!` at most once per kind per [`LOG_INTERVAL`].
pub struct DiagnosticDrain {
    consumer: HeapCons<RenderDiagnostic>,
    last_logged: [Option<Instant>; KIND_COUNT],
    suppressed: [u64; KIND_COUNT],
}

impl DiagnosticDrain {
    /// Drains every diagnostic currently queued.
    pub fn drain(&mut self) {
        while let Some(diagnostic) = self.consumer.try_pop() {
            self.record(diagnostic);
        }
    }

    fn record(&mut self, diagnostic: RenderDiagnostic) {
        let idx = kind_index(diagnostic.kind);
        let now = Instant::now();
        let due = match self.last_logged[idx] {
            Some(last) => now.duration_since(last) >= LOG_INTERVAL,
            None => true,
        };
        if due {
            let suppressed = self.suppressed[idx];
            self.last_logged[idx] = Some(now);
            self.suppressed[idx] = 0;
            tracing::warn!(kind = ?diagnostic.kind, detail = %diagnostic.detail, suppressed, "render-path diagnostic");
        } else {
            self.suppressed[idx] += 1;
        }
    }
}

/// Builds a connected sink/drain pair for one engine run.
pub fn channel() -> (DiagnosticSink, DiagnosticDrain) {
    let ring = HeapRb::new(CAPACITY);
    let (producer, consumer) = ring.split();
    (
        DiagnosticSink { producer: Arc::new(Mutex::new(producer)) },
        DiagnosticDrain { consumer, last_logged: [None; KIND_COUNT], suppressed: [0; KIND_COUNT] },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_burst_within_the_interval_logs_once_and_counts_the_rest() {
        let (sink, mut drain) = channel();
        for _ in 0..5 {
            sink.publish(DiagnosticKind::PluginRenderFault, "boom");
        }
        drain.drain();
        assert_eq!(drain.suppressed[kind_index(DiagnosticKind::PluginRenderFault)], 4);
    }

    #[test]
    fn different_kinds_rate_limit_independently() {
        let (sink, mut drain) = channel();
        sink.publish(DiagnosticKind::PluginRenderFault, "a");
        sink.publish(DiagnosticKind::InputStreamError, "b");
        drain.drain();
        assert_eq!(drain.suppressed[kind_index(DiagnosticKind::PluginRenderFault)], 0);
        assert_eq!(drain.suppressed[kind_index(DiagnosticKind::InputStreamError)], 0);
    }
}
