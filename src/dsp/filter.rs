//! # One-Pole Filters
//!
//! Two first-order recursive filters carry most of the reverb's tone
//! shaping, and one of them doubles as the parameter smoother.
//!
//! ## One-Pole Smoother
//!
//! ```text
//! y[n] = (1 - p) * x[n] + p * y[n-1]
//! ```
//!
//! A weighted average between the new input and the previous output. The
//! pole `p` controls the balance:
//!
//! - `p = 0.0` → output = input (no filtering)
//! - `p → 1.0` → output ≈ previous output (extreme filtering)
//!
//! DC passes with unity gain, whatever the pole. In code the filter keeps
//! `b = 1 - p` as its coefficient, because the damping stage can ask for
//! poles so close to 1.0 that `f32` can't tell them apart from it.
//!
//! The reverb uses it twice:
//!
//! 1. As the **high-frequency damping** stage inside each feedback line.
//!    There the pole is chosen so the filter's gain at the damping
//!    frequency equals the line's mid-band decay gain. Frequencies above
//!    the damping point lose twice as many dB per trip around the loop as
//!    mid frequencies, so they die out in about half the time.
//! 2. As the **Mix/Level smoother**, with `b = 44.1 / sample_rate`
//!    (about 1000 samples of time constant at 44.1 kHz). Parameter jumps
//!    turn into short exponential glides instead of clicks.
//!
//! ## Bilinear Crossover Lowpass
//!
//! A first-order Butterworth lowpass designed with the bilinear transform:
//!
//! ```text
//! c  = 1 / tan(π * fc / sample_rate)
//! y[n] = (x[n] + x[n-1] - (1 - c) * y[n-1]) / (1 + c)
//! ```
//!
//! The tangent pre-warps the cutoff so the digital filter is exactly
//! -3 dB at `fc`. The reverb uses it to split each feedback line into a
//! low band (decaying at RT60 Low) and everything above (RT60 Mid).

use std::f32::consts::PI;

/// Highest frequency, as a fraction of the sample rate, that any
/// frequency-to-coefficient conversion accepts. Approaching Nyquist makes
/// the tangent blow up.
pub const MAX_FREQUENCY_RATIO: f32 = 0.49;

/// Keep a frequency inside `(0, 0.49 * sample_rate]`.
#[inline]
pub fn nyquist_safe(freq_hz: f32, sample_rate: f32) -> f32 {
    freq_hz.clamp(f32::MIN_POSITIVE, sample_rate * MAX_FREQUENCY_RATIO)
}

/// Largest feedback coefficient a one-pole stage runs with. At 1.0 the
/// register would hold its value forever.
pub const MAX_POLE: f32 = 1.0 - f32::EPSILON;

/// A one-pole (6 dB/octave) unity-DC-gain lowpass.
///
/// The filter stores the input weight `b = 1 - p` rather than deriving it
/// from the pole. Heavy damping asks for poles within a few ulps of 1.0,
/// where `1 - p` computed in `f32` is either coarse or exactly zero. The
/// pole itself is capped at [`MAX_POLE`]. Weights under `f32::EPSILON` are
/// kept as asked, so DC is attenuated there instead of the register
/// freezing.
#[derive(Debug, Clone)]
pub struct OnePoleFilter {
    /// Weight of the new input. 1.0 is a passthrough, values near 0.0
    /// smooth heavily.
    weight: f32,

    /// `1 - weight`, at most [`MAX_POLE`], applied to the previous output.
    pole: f32,

    /// The previous output sample — the filter's only state variable.
    prev_output: f32,
}

impl Default for OnePoleFilter {
    fn default() -> Self {
        Self {
            weight: 1.0,
            pole: 0.0,
            prev_output: 0.0,
        }
    }
}

impl OnePoleFilter {
    /// Create a new filter initialized to passthrough (no filtering).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input weight directly, clamped to `[0.0, 1.0]`.
    pub fn set_weight(&mut self, weight: f32) {
        let weight = if weight.is_nan() {
            0.0
        } else {
            weight.clamp(0.0, 1.0)
        };
        self.weight = weight;
        self.pole = (1.0 - weight).min(MAX_POLE);
    }

    /// Configure the filter as a parameter smoother with a time constant
    /// of `sample_rate / 44.1` samples.
    pub fn set_smoothing(&mut self, sample_rate: f32) {
        self.set_weight(smoothing_weight(sample_rate));
    }

    /// Choose the weight so that the gain at `freq_hz` equals `gain`
    /// (`0 < gain < 1`) while DC still passes unchanged.
    ///
    /// # The Math
    ///
    /// The squared magnitude response of the smoother with pole `p` at
    /// angular frequency `w` is
    ///
    /// ```text
    /// |H|² = (1 - p)² / (1 - 2p·cos(w) + p²)
    /// ```
    ///
    /// Setting `|H|² = g²` and solving for the root inside the unit circle
    /// gives `p = m - sqrt(m² - 1)` with `m = 1 + d` and
    ///
    /// ```text
    /// d = g²·(1 - cos(w)) / (1 - g²)
    /// ```
    ///
    /// Written directly in terms of the input weight, without ever forming
    /// `p`:
    ///
    /// ```text
    /// b = 1 - p = sqrt(d·(d + 2)) - d = 2d / (d + sqrt(d·(d + 2)))
    /// ```
    ///
    /// The last form has no cancellation for large `d`, and for small `d`
    /// it tends to `sqrt(2d)` instead of collapsing to zero.
    pub fn set_gain_at(&mut self, gain: f32, freq_hz: f32, sample_rate: f32) {
        self.set_weight(damping_weight(gain, freq_hz, sample_rate));
    }

    /// Process one sample through the filter.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.weight * input + self.pole * self.prev_output;
        self.prev_output = output;
        output
    }

    /// The most recent output.
    #[inline]
    pub fn value(&self) -> f32 {
        self.prev_output
    }

    /// Reset the filter state to zero.
    pub fn reset(&mut self) {
        self.prev_output = 0.0;
    }
}

/// Input weight of the Mix/Level smoother: `44.1 / sample_rate`.
pub fn smoothing_weight(sample_rate: f32) -> f32 {
    (44.1 / sample_rate).min(1.0)
}

/// Input weight of a unity-DC one-pole lowpass whose gain at `freq_hz` is
/// `gain`. See [`OnePoleFilter::set_gain_at`]. Solved in `f64`.
pub fn damping_weight(gain: f32, freq_hz: f32, sample_rate: f32) -> f32 {
    let freq = nyquist_safe(freq_hz, sample_rate) as f64;
    let half_w = std::f64::consts::PI * freq / sample_rate as f64;
    // 1 - cos(w), without the cancellation near w = 0.
    let one_minus_cos = 2.0 * half_w.sin().powi(2);
    let gain_sq = (gain as f64).powi(2);
    let d = gain_sq * one_minus_cos / (1.0 - gain_sq);

    let weight = if d.is_infinite() {
        1.0
    } else if d > 0.0 {
        2.0 * d / (d + (d * (d + 2.0)).sqrt())
    } else {
        0.0
    };
    (weight as f32).clamp(0.0, 1.0)
}

/// Coefficients of the bilinear first-order lowpass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowpassCoefficients {
    /// Feed-forward gain applied to `x[n] + x[n-1]`.
    pub b: f32,
    /// Feedback coefficient applied to `y[n-1]` (subtracted).
    pub a1: f32,
}

impl LowpassCoefficients {
    /// Cutoff at Nyquist: the two-tap average `(x[n] + x[n-1]) / 2`.
    pub const fn at_nyquist() -> Self {
        Self { b: 0.5, a1: 0.0 }
    }

    /// Pre-warped bilinear design for a cutoff in Hz.
    pub fn bilinear(cutoff_hz: f32, sample_rate: f32) -> Self {
        let cutoff = nyquist_safe(cutoff_hz, sample_rate);
        let c = 1.0 / (PI * cutoff / sample_rate).tan();
        let norm = 1.0 / (1.0 + c);
        Self {
            b: norm,
            a1: (1.0 - c) * norm,
        }
    }
}

impl Default for LowpassCoefficients {
    fn default() -> Self {
        Self::at_nyquist()
    }
}

/// First-order bilinear lowpass used as the reverb's crossover.
#[derive(Debug, Clone, Default)]
pub struct CrossoverLowpass {
    coefficients: LowpassCoefficients,
    prev_input: f32,
    prev_output: f32,
}

impl CrossoverLowpass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_coefficients(&mut self, coefficients: LowpassCoefficients) {
        self.coefficients = coefficients;
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let LowpassCoefficients { b, a1 } = self.coefficients;
        let output = b * (input + self.prev_input) - a1 * self.prev_output;
        self.prev_input = input;
        self.prev_output = output;
        output
    }

    pub fn reset(&mut self) {
        self.prev_input = 0.0;
        self.prev_output = 0.0;
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
