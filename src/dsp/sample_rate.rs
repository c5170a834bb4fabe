//! # Sample Rate Context
//!
//! Every time-based quantity in the engines (delay lengths in seconds,
//! pre-delay in milliseconds, filter cutoffs in Hz, decay times in
//! seconds) only becomes a number of samples once we know the sample rate.
//! An engine is bound to one rate for its whole life: the ring buffers are
//! sized for the fastest rate we support, and all constant lengths are
//! derived exactly once at construction.

use crate::error::{FxError, FxResult};

/// The operating sample rate of an engine instance, in Hz.
///
/// Construct with [`SampleRate::new`], which rejects anything outside
/// [`SampleRate::MIN_HZ`]`..=`[`SampleRate::MAX_HZ`]. Once constructed the
/// value never changes.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SampleRate(f32);

impl SampleRate {
    /// Slowest supported rate. Below this, the shortest allpass section of
    /// the reverb would round to zero samples.
    pub const MIN_HZ: f32 = 1_000.0;

    /// Fastest supported rate. Every ring buffer capacity is derived from
    /// this value.
    pub const MAX_HZ: f32 = 192_000.0;

    /// Validate and wrap a sample rate.
    pub fn new(hz: f32) -> FxResult<Self> {
        if hz.is_finite() && (Self::MIN_HZ..=Self::MAX_HZ).contains(&hz) {
            Ok(Self(hz))
        } else {
            Err(FxError::UnsupportedSampleRate { rate: hz })
        }
    }

    /// The rate in Hz.
    pub const fn hz(self) -> f32 {
        self.0
    }

    /// Convert a duration in seconds to the nearest whole number of
    /// samples, the way all fixed delay lengths are derived:
    /// `floor(0.5 + seconds * rate)`.
    pub fn seconds_to_samples(self, seconds: f32) -> usize {
        (0.5 + seconds * self.0).floor().max(0.0) as usize
    }

    /// Convert milliseconds to the nearest whole number of samples.
    pub fn ms_to_samples(self, ms: f32) -> usize {
        self.seconds_to_samples(ms * 0.001)
    }
}

impl Default for SampleRate {
    /// 44.1 kHz, the rate most material is delivered at.
    fn default() -> Self {
        Self(44_100.0)
    }
}

impl TryFrom<f32> for SampleRate {
    type Error = FxError;

    fn try_from(hz: f32) -> FxResult<Self> {
        Self::new(hz)
    }
}

impl TryFrom<u32> for SampleRate {
    type Error = FxError;

    fn try_from(hz: u32) -> FxResult<Self> {
        Self::new(hz as f32)
    }
}

/// Size of a power-of-two ring buffer able to hold a delay of `seconds` at
/// the fastest supported sample rate.
///
/// One extra slot is reserved so that a tap at the full length never lands
/// on the slot currently being written.
pub(crate) fn capacity_for(seconds: f32) -> usize {
    let max_len = SampleRate(SampleRate::MAX_HZ).seconds_to_samples(seconds);
    (max_len + 1).next_power_of_two()
}
