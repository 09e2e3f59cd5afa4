//! Keel Metrics
//!
//! Named counters and a rolling sample window used to account for state
//! transitions. Collection only happens with the `metrics` feature; without
//! it both types are empty shells whose methods do nothing and read back
//! zero, so callers never need their own `cfg` guards.
//!
//! ```ignore
//! let mut stats = keel_metrics::Counter::new();
//! stats.increment("texture.applied", 1);
//! let mut recent = keel_metrics::RingBuffer::new(60);
//! recent.push(stats.total(".applied") as f64);
//! ```

#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod ring_buffer;

#[cfg(feature = "metrics")]
pub use counter::Counter;
#[cfg(feature = "metrics")]
pub use ring_buffer::RingBuffer;

#[cfg(not(feature = "metrics"))]
pub use disabled::{Counter, RingBuffer};

#[cfg(not(feature = "metrics"))]
mod disabled {
    #[derive(Debug, Default)]
    pub struct Counter;

    impl Counter {
        pub fn new() -> Self {
            Self
        }
        pub fn increment(&mut self, _name: &'static str, _value: usize) {}
        pub fn set(&mut self, _name: &'static str, _value: usize) {}
        pub fn get(&self, _name: &str) -> usize {
            0
        }
        pub fn reset(&mut self, _name: &'static str) {}
        pub fn reset_all(&mut self) {}
        pub fn total(&self, _suffix: &str) -> usize {
            0
        }
        pub fn sorted(&self) -> Vec<(&'static str, usize)> {
            Vec::new()
        }
    }

    #[derive(Debug, Clone)]
    pub struct RingBuffer;

    impl RingBuffer {
        pub fn new(_capacity: usize) -> Self {
            Self
        }
        pub fn push(&mut self, _sample: f64) {}
        pub fn len(&self) -> usize {
            0
        }
        pub fn is_empty(&self) -> bool {
            true
        }
        pub fn latest(&self) -> Option<f64> {
            None
        }
        pub fn average(&self) -> f64 {
            0.0
        }
        pub fn min_max(&self) -> (f64, f64) {
            (0.0, 0.0)
        }
    }

}
