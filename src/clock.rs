//! Monotonic elapsed-time source for the render loop.

/// Millisecond timestamps from a monotonic clock. On the web this is backed
/// by `Performance.now()`; tests drive a manual source instead.
pub trait TimeSource {
    fn now_ms(&self) -> f64;
}

/// Elapsed seconds since construction. Never reset; readings are
/// monotonically non-decreasing as long as the underlying source is.
pub struct Clock<T: TimeSource> {
    source: T,
    start_ms: f64,
}

impl<T: TimeSource> Clock<T> {
    pub fn new(source: T) -> Self {
        let start_ms = source.now_ms();
        Self { source, start_ms }
    }

    /// Seconds since the clock was created.
    pub fn elapsed(&self) -> f32 {
        ((self.source.now_ms() - self.start_ms) / 1000.0) as f32
    }
}
