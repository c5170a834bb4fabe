//! # Delay Line (Masked Ring Buffer)
//!
//! A delay line stores audio samples and lets you read them back after a
//! specified number of samples. Every piece of both engines is built on
//! it: the reverb's eight feedback lines, its eight allpass sections and
//! its stereo pre-delay, and the pitch shifter's history buffer.
//!
//! ## Masked Indexing
//!
//! The capacity is always a power of two. A monotonically increasing
//! counter (the "write head") is combined with a tap offset and masked
//! into range:
//!
//! ```text
//! slot = (counter - offset) & (capacity - 1)
//! ```
//!
//! The subtraction wraps on overflow, and the mask folds any counter value
//! into the buffer, so there is no branch and no modulo in the hot path.
//! Taps are only ever offsets *behind* the write head, so an offset must
//! stay strictly below the capacity to read a sample that is still stored.
//!
//! ## Order of Operations
//!
//! Per sample, callers `write()` the new value, `tap()` any number of
//! older values and finally `advance()`. A tap of `0` returns the sample
//! written this step; a tap of `d` returns the one written `d` steps ago.
//! Reading a tap before writing is also fine as long as the offset is at
//! least 1, since that slot was written on an earlier step.
//!
//! ## Linear Interpolation
//!
//! When the read position isn't a whole number of samples (the pitch
//! shifter's phase is fractional), two neighbours are blended:
//!
//! ```text
//! result = sample_a * (1 - frac) + sample_b * frac
//! ```

use std::num::NonZeroUsize;

/// A power-of-two ring buffer addressed through a wrapping sample counter.
///
/// The buffer is allocated once in [`new()`](Self::new) and never resized,
/// so nothing in the audio path allocates.
#[derive(Debug, Clone)]
pub struct DelayLine {
    /// The circular buffer storing audio samples. All values start at
    /// 0.0 (silence).
    buffer: Vec<f32>,

    /// `capacity - 1`. Folds any counter value into the buffer.
    mask: usize,

    /// Sample counter. Only its low bits matter.
    counter: usize,
}

impl DelayLine {
    /// Create a delay line able to hold at least `min_capacity` samples.
    /// The real capacity is rounded up to the next power of two.
    pub fn new(min_capacity: NonZeroUsize) -> Self {
        let capacity = min_capacity.get().next_power_of_two();
        Self {
            buffer: vec![0.0; capacity],
            mask: capacity - 1,
            counter: 0,
        }
    }

    /// Number of samples the buffer holds.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Largest usable tap offset.
    pub fn max_delay(&self) -> usize {
        self.mask
    }

    /// Store a sample at the current write position.
    ///
    /// Does NOT advance the write position; call
    /// [`advance()`](Self::advance) once all taps for this step are read.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.counter & self.mask] = sample;
    }

    /// Read the sample written `delay` steps ago.
    ///
    /// Offsets beyond the capacity are clamped to the oldest stored slot.
    #[inline]
    pub fn tap(&self, delay: usize) -> f32 {
        let delay = delay.min(self.mask);
        self.buffer[self.counter.wrapping_sub(delay) & self.mask]
    }

    /// Read a fractional number of steps back with linear interpolation.
    ///
    /// For `delay = 441.3`, slot 441 gets weight 0.7 and slot 442 (one step
    /// older) gets weight 0.3.
    #[inline]
    pub fn tap_interpolated(&self, delay: f32) -> f32 {
        let delay = delay.clamp(0.0, self.mask.saturating_sub(1) as f32);
        let whole = delay.floor();
        let frac = delay - whole;
        let index = whole as usize;

        self.tap(index) * (1.0 - frac) + self.tap(index + 1) * frac
    }

    /// Move the write head forward by one sample.
    #[inline]
    pub fn advance(&mut self) {
        self.counter = self.counter.wrapping_add(1);
    }

    /// Clear the entire buffer to silence and rewind the write head.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.counter = 0;
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn line(capacity: usize) -> DelayLine {
        DelayLine::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn test_capacity_rounds_up_to_power_of_two() {
        assert_eq!(line(100).capacity(), 128);
        assert_eq!(line(128).capacity(), 128);
        assert_eq!(line(1).capacity(), 1);
        assert_eq!(line(129).max_delay(), 255);
    }

    /// A tap of zero returns the sample written this step.
    #[test]
    fn test_tap_zero_is_current_sample() {
        let mut dl = line(16);
        dl.write(0.75);
        assert!((dl.tap(0) - 0.75).abs() < 1e-6);
    }

    /// Verify basic write-then-read one step later.
    #[test]
    fn test_write_and_read_exact() {
        let mut dl = line(16);

        dl.write(0.75);
        dl.advance();
        dl.write(0.0);

        let result = dl.tap(1);
        assert!((result - 0.75).abs() < 1e-6, "Expected 0.75, got {result}");
    }

    /// Verify linear interpolation between two samples.
    #[test]
    fn test_interpolation() {
        let mut dl = line(16);

        // 0.0 two steps ago, 1.0 one step ago, 0.5 now.
        dl.write(0.0);
        dl.advance();
        dl.write(1.0);
        dl.advance();
        dl.write(0.5);

        // Halfway between one and two steps back.
        let result = dl.tap_interpolated(1.5);
        assert!((result - 0.5).abs() < 1e-6, "Expected 0.5, got {result}");

        // A quarter of the way from "now" to one step back.
        let result = dl.tap_interpolated(0.25);
        assert!((result - 0.625).abs() < 1e-6, "Expected 0.625, got {result}");
    }

    /// Verify the buffer wraps correctly past its boundaries.
    #[test]
    fn test_wrapping() {
        let mut dl = line(4);

        // Values 0 through 5 into a buffer of 4: the last four survive.
        for i in 0..6 {
            dl.write(i as f32);
            dl.advance();
        }
        dl.write(6.0);

        assert!((dl.tap(0) - 6.0).abs() < 1e-6);
        assert!((dl.tap(1) - 5.0).abs() < 1e-6);
        assert!((dl.tap(3) - 3.0).abs() < 1e-6);
    }

    /// Offsets past the end clamp to the oldest slot instead of wrapping
    /// around onto newer samples.
    #[test]
    fn test_tap_clamps_to_capacity() {
        let mut dl = line(4);
        for i in 0..4 {
            dl.write(i as f32);
            dl.advance();
        }
        dl.write(4.0);
        assert!((dl.tap(100) - dl.tap(3)).abs() < 1e-6);
    }

    /// The counter wraps around `usize::MAX` without disturbing taps.
    #[test]
    fn test_counter_overflow() {
        let mut dl = line(8);
        dl.counter = usize::MAX - 2;
        for i in 0..6 {
            dl.write(i as f32);
            dl.advance();
        }
        dl.write(6.0);
        for d in 0..=6 {
            assert!((dl.tap(d) - (6 - d) as f32).abs() < 1e-6, "tap {d}");
        }
    }

    /// Verify that clearing resets everything to silence.
    #[test]
    fn test_clear() {
        let mut dl = line(10);

        dl.write(0.5);
        dl.advance();
        dl.clear();

        for delay in 0..dl.capacity() {
            assert!(dl.tap(delay).abs() < 1e-6, "Expected silence at {delay}");
        }
    }

    /// Verify that writing multiple samples and reading them back
    /// produces the correct sequence (FIFO behavior).
    #[test]
    fn test_fifo_sequence() {
        let mut dl = line(10);

        for i in 1..=5 {
            dl.write(i as f32);
            dl.advance();
        }

        // One step back is the most recent write.
        assert!((dl.tap(1) - 5.0).abs() < 1e-6);
        assert!((dl.tap(2) - 4.0).abs() < 1e-6);
        assert!((dl.tap(3) - 3.0).abs() < 1e-6);
        assert!((dl.tap(4) - 2.0).abs() < 1e-6);
        assert!((dl.tap(5) - 1.0).abs() < 1e-6);
    }
}
