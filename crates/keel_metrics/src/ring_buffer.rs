//! Fixed-size window over the most recent samples

use std::collections::VecDeque;

/// Keeps the last `capacity` samples; older ones fall off the front.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    window: VecDeque<f64>,
    capacity: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer needs a non-zero capacity");
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: f64) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn latest(&self) -> Option<f64> {
        self.window.back().copied()
    }

    /// Mean of the window, 0 when empty.
    pub fn average(&self) -> f64 {
        match self.window.len() {
            0 => 0.0,
            n => self.window.iter().sum::<f64>() / n as f64,
        }
    }

    /// Smallest and largest sample, `(0, 0)` when empty.
    pub fn min_max(&self) -> (f64, f64) {
        let mut samples = self.window.iter().copied();
        let Some(first) = samples.next() else {
            return (0.0, 0.0);
        };
        samples.fold((first, first), |(lo, hi), s| (lo.min(s), hi.max(s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_sample_is_evicted() {
        let mut calls = RingBuffer::new(2);
        assert!(calls.is_empty());
        assert_eq!(calls.min_max(), (0.0, 0.0));

        calls.push(7.0);
        calls.push(1.0);
        assert_eq!(calls.average(), 4.0);

        calls.push(0.0);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls.latest(), Some(0.0));
        assert_eq!(calls.average(), 0.5);
        assert_eq!(calls.min_max(), (0.0, 1.0));
    }

    #[test]
    #[should_panic]
    fn zero_capacity_is_rejected() {
        RingBuffer::new(0);
    }
}
