//! # Regalia–Mitra Peaking Equalizer
//!
//! A second-order section that boosts or cuts a band around a centre
//! frequency while leaving frequencies far away untouched. It is built from
//! a second-order allpass `A(z)`:
//!
//! ```text
//! out = ½·(x + A·x) + ½·K·(x - A·x)
//! ```
//!
//! At the centre frequency the allpass shifts phase by 180°, so
//! `x + A·x` cancels and `x - A·x = 2x`: the output is `K·x`. Far from the
//! centre the allpass is in phase with its input and the output is `x`.
//!
//! ```text
//! K  = 10^(level_dB / 20)                 peak gain
//! ω  = 2π·f / sample_rate                 centre, rad/sample
//! t  = ω / sqrt(K)                        ≈ tan(π·B / sample_rate)
//! k1 = -cos(ω)
//! k2 = (1 - t) / (1 + t)
//!
//!        k2 + k1(1+k2)·z⁻¹ + z⁻²
//! A(z) = ─────────────────────────
//!        1 + k1(1+k2)·z⁻¹ + k2·z⁻²
//! ```
//!
//! The bandwidth shrinks as the boost grows (`Q² ≈ K/4`), which is the
//! constant-Q-ish behaviour the reverb's output EQ was voiced with.
//! `|k2| < 1` for every positive `t`, so the section is stable for any
//! level.

use std::f32::consts::PI;

use nih_plug::util::db_to_gain;

use super::filter::nyquist_safe;

/// Block-scoped coefficients of one peaking section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakingCoefficients {
    /// `k1·(1 + k2)`, shared by numerator and denominator.
    k1k2: f32,
    k2: f32,
    /// Linear peak gain `K`.
    gain: f32,
}

impl PeakingCoefficients {
    /// A flat (0 dB) section.
    pub const fn flat() -> Self {
        Self {
            k1k2: 0.0,
            k2: 0.0,
            gain: 1.0,
        }
    }

    /// Derive coefficients from a centre frequency and a peak level.
    pub fn new(freq_hz: f32, level_db: f32, sample_rate: f32) -> Self {
        let gain = db_to_gain(level_db);
        let omega = 2.0 * PI * nyquist_safe(freq_hz, sample_rate) / sample_rate;
        let t = omega / gain.max(0.0).sqrt();
        let k1 = -omega.cos();
        let k2 = (1.0 - t) / (1.0 + t);
        Self {
            k1k2: k1 * (1.0 + k2),
            k2,
            gain,
        }
    }

    /// Linear gain at the centre frequency.
    pub fn peak_gain(&self) -> f32 {
        self.gain
    }
}

impl Default for PeakingCoefficients {
    fn default() -> Self {
        Self::flat()
    }
}

/// One Regalia–Mitra peaking section with its two-sample allpass history.
#[derive(Debug, Clone, Default)]
pub struct PeakingEq {
    coefficients: PeakingCoefficients,
    /// Allpass state `w[n-1]`, `w[n-2]` (direct form II).
    w1: f32,
    w2: f32,
}

impl PeakingEq {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_coefficients(&mut self, coefficients: PeakingCoefficients) {
        self.coefficients = coefficients;
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let PeakingCoefficients { k1k2, k2, gain } = self.coefficients;

        let w = input - k1k2 * self.w1 - k2 * self.w2;
        let allpass = k2 * w + k1k2 * self.w1 + self.w2;
        self.w2 = self.w1;
        self.w1 = w;

        0.5 * (input + allpass) + 0.5 * gain * (input - allpass)
    }

    pub fn reset(&mut self) {
        self.w1 = 0.0;
        self.w2 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sine_gain(eq: &mut PeakingEq, freq: f32, sr: f32) -> f32 {
        let settle = (sr * 0.3) as usize;
        let measure = (sr * 0.5) as usize;
        let (mut energy_in, mut energy_out) = (0.0_f64, 0.0_f64);
        for n in 0..settle + measure {
            let phase = 2.0 * std::f64::consts::PI * freq as f64 * n as f64 / sr as f64;
            let x = phase.sin() as f32;
            let y = eq.process(x);
            if n >= settle {
                energy_in += (x as f64).powi(2);
                energy_out += (y as f64).powi(2);
            }
        }
        (energy_out / energy_in).sqrt() as f32
    }

    /// At 0 dB the section is an exact passthrough, sample for sample.
    #[test]
    fn test_zero_db_is_identity() {
        let mut eq = PeakingEq::new();
        eq.set_coefficients(PeakingCoefficients::new(315.0, 0.0, 44_100.0));

        for n in 0..1000 {
            let x = ((n * 7919) % 200) as f32 / 100.0 - 1.0;
            let y = eq.process(x);
            assert_relative_eq!(y, x, epsilon = 1e-5);
        }
    }

    /// A +12 dB boost reaches ~4x at the centre frequency.
    #[test]
    fn test_boost_at_centre() {
        let sr = 44_100.0;
        let mut eq = PeakingEq::new();
        let coefficients = PeakingCoefficients::new(1_500.0, 12.0, sr);
        eq.set_coefficients(coefficients);

        let gain = sine_gain(&mut eq, 1_500.0, sr);
        assert_relative_eq!(gain, coefficients.peak_gain(), max_relative = 0.03);
    }

    /// A cut attenuates at the centre but leaves distant frequencies alone.
    #[test]
    fn test_cut_is_local() {
        let sr = 44_100.0;
        let mut eq = PeakingEq::new();
        eq.set_coefficients(PeakingCoefficients::new(1_000.0, -12.0, sr));

        let at_centre = sine_gain(&mut eq, 1_000.0, sr);
        eq.reset();
        let far_away = sine_gain(&mut eq, 12_000.0, sr);

        assert!(at_centre < 0.3, "centre gain {at_centre}");
        assert!((far_away - 1.0).abs() < 0.1, "distant gain {far_away}");
    }

    /// Extreme documented levels still give a stable section.
    #[test]
    fn test_extreme_levels_are_stable() {
        for level in [-90.0, 45.0] {
            for freq in [20.0, 20_000.0] {
                let c = PeakingCoefficients::new(freq, level, 44_100.0);
                assert!(c.k2.abs() < 1.0, "k2 = {} at {level} dB, {freq} Hz", c.k2);
            }
        }
    }
}
