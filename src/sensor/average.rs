//! Fixed-depth rolling average of recent readings.

use crate::error::Error;

/// Ring buffer of the last `N` readings of one sensor.
///
/// Pushing into a full buffer evicts the oldest reading. The mean covers
/// only the readings currently held, so a partly filled buffer is never
/// diluted by empty slots.
#[derive(Debug)]
pub struct RollingAverage<const N: usize> {
    samples: heapless::Deque<f32, N>,
}

impl<const N: usize> RollingAverage<N> {
    /// Maximum number of readings held.
    pub const CAPACITY: usize = N;

    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self {
            samples: heapless::Deque::new(),
        }
    }

    /// Add a reading, evicting the oldest one when full.
    pub fn push(&mut self, value: f32) {
        if self.samples.is_full() {
            self.samples.pop_front();
        }
        // Cannot fail: a slot was freed above (no-op when N == 0)
        let _ = self.samples.push_back(value);
    }

    /// Unweighted mean of the held readings.
    ///
    /// Returns `Err(Error::EmptyAverage)` before the first push.
    pub fn average(&self) -> Result<f32, Error> {
        if self.samples.is_empty() {
            return Err(Error::EmptyAverage);
        }
        let sum: f32 = self.samples.iter().sum();
        Ok(sum / self.samples.len() as f32)
    }

    /// Number of readings held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True before the first push.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of readings held.
    pub fn capacity(&self) -> usize {
        N
    }

    /// Held readings, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.samples.iter()
    }

    /// Drop every held reading.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl<const N: usize> Default for RollingAverage<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_average_is_error() {
        let avg = RollingAverage::<3>::new();
        assert!(avg.is_empty());
        assert_eq!(avg.len(), 0);
        assert_eq!(avg.average(), Err(Error::EmptyAverage));
    }

    #[test]
    fn test_single_value() {
        let mut avg = RollingAverage::<3>::new();
        avg.push(21.25);
        assert_eq!(avg.average(), Ok(21.25));
        assert_eq!(avg.len(), 1);
    }

    #[test]
    fn test_partial_fill_uses_held_count() {
        let mut avg = RollingAverage::<4>::new();
        avg.push(10.0);
        avg.push(20.0);
        // 15.0, not (10 + 20) / 4
        assert_eq!(avg.average(), Ok(15.0));
    }

    #[test]
    fn test_overwrites_oldest() {
        let mut avg = RollingAverage::<3>::new();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            avg.push(v);
            assert!(avg.len() <= avg.capacity());
        }
        assert_eq!(avg.len(), 3);
        assert_eq!(avg.average(), Ok(4.0));

        let held: [f32; 3] = [3.0, 4.0, 5.0];
        assert!(avg.iter().copied().eq(held.iter().copied()));
    }

    #[test]
    fn test_size_bounded_over_long_run() {
        let mut avg = RollingAverage::<3>::new();
        for i in 0..100 {
            avg.push(i as f32);
            assert!(avg.len() <= 3);
        }
        // Last three: 97, 98, 99
        assert_eq!(avg.average(), Ok(98.0));
    }

    #[test]
    fn test_clear() {
        let mut avg = RollingAverage::<2>::new();
        avg.push(1.0);
        avg.clear();
        assert_eq!(avg.average(), Err(Error::EmptyAverage));
        assert_eq!(RollingAverage::<2>::CAPACITY, 2);
    }
}
