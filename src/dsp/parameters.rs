//! # Engine Parameter Sets
//!
//! Each engine reads a small record of named `f32` fields at the start of
//! every block. The engines never validate or clamp these values; that job
//! belongs to whoever writes them. [`ParameterSet::sanitized`] and
//! [`HasParameters::ensure_valid_parameters`] are the validation routine
//! callers are expected to run on untrusted values: non-finite values fall
//! back to the field default, everything else is clamped to the documented
//! range.
//!
//! ## Holders
//!
//! Plain records and the engines themselves both carry a parameter set.
//! [`HasParameters`] lets generic code copy parameters between any two
//! holders of the same family, or validate them in place, without caring
//! which concrete type it is looking at:
//!
//! ```
//! use loveless_space::dsp::parameters::{HasParameters, ReverbParameters};
//! use loveless_space::dsp::{ReverbEngine, SampleRate};
//!
//! let bathroom = ReverbParameters {
//!     in_delay: 5.0,
//!     rt60_low: 1.49,
//!     rt60_mid: 1.3,
//!     mix: 0.7,
//!     ..ReverbParameters::default()
//! };
//!
//! let mut reverb = ReverbEngine::new(SampleRate::default());
//! reverb.copy_parameters_from(&bathroom).ensure_valid_parameters();
//! assert_eq!(reverb.params.rt60_low, 1.49);
//! ```

/// Metadata for one parameter field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Display name.
    pub name: &'static str,
    /// Unit suffix, empty for plain ratios.
    pub unit: &'static str,
    pub default: f32,
    pub min: f32,
    pub max: f32,
}

impl ParamSpec {
    /// Clamp `value` into `[min, max]`. NaN falls back to the default;
    /// infinities clamp to the nearest bound.
    pub fn sanitize(&self, value: f32) -> f32 {
        let clamped = value.clamp(self.min, self.max);
        if clamped.is_finite() {
            clamped
        } else {
            self.default
        }
    }

    /// Whether `value` is finite and inside the documented range.
    pub fn accepts(&self, value: f32) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// A record of named, bounded engine parameters.
pub trait ParameterSet: Copy + Default {
    /// One entry per field, in field order.
    const SPECS: &'static [ParamSpec];

    /// Mutable access to the field at `index` (see [`Self::SPECS`]).
    fn field_mut(&mut self, index: usize) -> Option<&mut f32>;

    /// Read the field at `index`.
    fn field(&self, index: usize) -> Option<f32> {
        let mut copy = *self;
        copy.field_mut(index).map(|v| *v)
    }

    /// Look a field up by its display name.
    fn spec(name: &str) -> Option<(usize, &'static ParamSpec)> {
        Self::SPECS
            .iter()
            .enumerate()
            .find(|(_, spec)| spec.name == name)
    }

    /// A copy with every field sanitized against its spec.
    fn sanitized(mut self) -> Self {
        for (index, spec) in Self::SPECS.iter().enumerate() {
            if let Some(value) = self.field_mut(index) {
                *value = spec.sanitize(*value);
            }
        }
        self
    }

    /// Whether every field is finite and inside its range.
    fn is_valid(&self) -> bool {
        Self::SPECS
            .iter()
            .enumerate()
            .all(|(index, spec)| self.field(index).is_some_and(|v| spec.accepts(v)))
    }
}

/// Anything that carries a parameter set: the plain records and the
/// engines.
pub trait HasParameters {
    type Params: ParameterSet;

    fn parameters(&self) -> &Self::Params;
    fn parameters_mut(&mut self) -> &mut Self::Params;

    /// Copy every field from another holder of the same family.
    fn copy_parameters_from<O>(&mut self, other: &O) -> &mut Self
    where
        O: HasParameters<Params = Self::Params> + ?Sized,
    {
        *self.parameters_mut() = *other.parameters();
        self
    }

    /// Replace non-finite values with defaults and clamp the rest into
    /// range.
    fn ensure_valid_parameters(&mut self) -> &mut Self {
        let sanitized = self.parameters().sanitized();
        *self.parameters_mut() = sanitized;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────
// Reverb
// ─────────────────────────────────────────────────────────────────────

/// Parameters of the [`ReverbEngine`](super::ReverbEngine).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParameters {
    /// Pre-delay before the signal enters the reverb network (ms).
    pub in_delay: f32,
    /// Frequency separating the low and mid decay bands (Hz).
    pub crossover: f32,
    /// Time for low frequencies to decay by 60 dB (s).
    pub rt60_low: f32,
    /// Time for mid frequencies to decay by 60 dB (s).
    pub rt60_mid: f32,
    /// Frequency at which the decay time is half the mid-band decay (Hz).
    pub high_frequency_damping: f32,
    /// Centre of the first output peaking EQ (Hz).
    pub eq1_frequency: f32,
    /// Peak level of the first output EQ (dB).
    pub eq1_level: f32,
    /// Centre of the second output peaking EQ (Hz).
    pub eq2_frequency: f32,
    /// Peak level of the second output EQ (dB).
    pub eq2_level: f32,
    /// Dry/wet balance: 0 is dry only, 1 is reverb only.
    pub mix: f32,
    /// Output gain (dB).
    pub level: f32,
}

impl ReverbParameters {
    pub const IN_DELAY: ParamSpec = ParamSpec {
        name: "InDelay",
        unit: "ms",
        default: 60.0,
        min: 0.0,
        max: 900.0,
    };
    pub const CROSSOVER: ParamSpec = ParamSpec {
        name: "Crossover",
        unit: "Hz",
        default: 200.0,
        min: 20.0,
        max: 20_000.0,
    };
    pub const RT60_LOW: ParamSpec = ParamSpec {
        name: "RT60Low",
        unit: "s",
        default: 3.0,
        min: 0.05,
        max: 40.0,
    };
    pub const RT60_MID: ParamSpec = ParamSpec {
        name: "RT60Mid",
        unit: "s",
        default: 2.0,
        min: 0.05,
        max: 40.0,
    };
    pub const HIGH_FREQUENCY_DAMPING: ParamSpec = ParamSpec {
        name: "HighFrequencyDamping",
        unit: "Hz",
        default: 6_000.0,
        min: 20.0,
        max: 20_000.0,
    };
    pub const EQ1_FREQUENCY: ParamSpec = ParamSpec {
        name: "EQ1Frequency",
        unit: "Hz",
        default: 315.0,
        min: 20.0,
        max: 20_000.0,
    };
    pub const EQ1_LEVEL: ParamSpec = ParamSpec {
        name: "EQ1Level",
        unit: "dB",
        default: 0.0,
        min: -90.0,
        max: 45.0,
    };
    pub const EQ2_FREQUENCY: ParamSpec = ParamSpec {
        name: "EQ2Frequency",
        unit: "Hz",
        default: 1_500.0,
        min: 20.0,
        max: 20_000.0,
    };
    pub const EQ2_LEVEL: ParamSpec = ParamSpec {
        name: "EQ2Level",
        unit: "dB",
        default: 0.0,
        min: -90.0,
        max: 45.0,
    };
    pub const MIX: ParamSpec = ParamSpec {
        name: "Mix",
        unit: "",
        default: 1.0,
        min: 0.0,
        max: 1.0,
    };
    pub const LEVEL: ParamSpec = ParamSpec {
        name: "Level",
        unit: "dB",
        default: -20.0,
        min: -90.0,
        max: 45.0,
    };
}

impl Default for ReverbParameters {
    fn default() -> Self {
        Self {
            in_delay: Self::IN_DELAY.default,
            crossover: Self::CROSSOVER.default,
            rt60_low: Self::RT60_LOW.default,
            rt60_mid: Self::RT60_MID.default,
            high_frequency_damping: Self::HIGH_FREQUENCY_DAMPING.default,
            eq1_frequency: Self::EQ1_FREQUENCY.default,
            eq1_level: Self::EQ1_LEVEL.default,
            eq2_frequency: Self::EQ2_FREQUENCY.default,
            eq2_level: Self::EQ2_LEVEL.default,
            mix: Self::MIX.default,
            level: Self::LEVEL.default,
        }
    }
}

impl ParameterSet for ReverbParameters {
    const SPECS: &'static [ParamSpec] = &[
        Self::IN_DELAY,
        Self::CROSSOVER,
        Self::RT60_LOW,
        Self::RT60_MID,
        Self::HIGH_FREQUENCY_DAMPING,
        Self::EQ1_FREQUENCY,
        Self::EQ1_LEVEL,
        Self::EQ2_FREQUENCY,
        Self::EQ2_LEVEL,
        Self::MIX,
        Self::LEVEL,
    ];

    fn field_mut(&mut self, index: usize) -> Option<&mut f32> {
        Some(match index {
            0 => &mut self.in_delay,
            1 => &mut self.crossover,
            2 => &mut self.rt60_low,
            3 => &mut self.rt60_mid,
            4 => &mut self.high_frequency_damping,
            5 => &mut self.eq1_frequency,
            6 => &mut self.eq1_level,
            7 => &mut self.eq2_frequency,
            8 => &mut self.eq2_level,
            9 => &mut self.mix,
            10 => &mut self.level,
            _ => return None,
        })
    }
}

impl HasParameters for ReverbParameters {
    type Params = Self;

    fn parameters(&self) -> &Self {
        self
    }

    fn parameters_mut(&mut self) -> &mut Self {
        self
    }
}

// ─────────────────────────────────────────────────────────────────────
// Pitch shift
// ─────────────────────────────────────────────────────────────────────

/// Parameters of the [`PitchShiftEngine`](super::PitchShiftEngine).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchShiftParameters {
    /// Semitones to shift the signal by.
    pub semitone_shift: f32,
    /// Length of one grain, in samples.
    pub window_size: f32,
    /// Samples spent fading between grains. Short fades click; long fades
    /// make the level pump.
    pub crossfade_samples: f32,
}

impl PitchShiftParameters {
    pub const SEMITONE_SHIFT: ParamSpec = ParamSpec {
        name: "SemitoneShift",
        unit: "st",
        default: 0.0,
        min: -12.0,
        max: 12.0,
    };
    pub const WINDOW_SIZE: ParamSpec = ParamSpec {
        name: "WindowSize",
        unit: "samples",
        default: 512.0,
        min: 50.0,
        max: 10_000.0,
    };
    pub const CROSSFADE_SAMPLES: ParamSpec = ParamSpec {
        name: "CrossfadeSamples",
        unit: "samples",
        default: 64.0,
        min: 1.0,
        max: 10_000.0,
    };
}

impl Default for PitchShiftParameters {
    fn default() -> Self {
        Self {
            semitone_shift: Self::SEMITONE_SHIFT.default,
            window_size: Self::WINDOW_SIZE.default,
            crossfade_samples: Self::CROSSFADE_SAMPLES.default,
        }
    }
}

impl ParameterSet for PitchShiftParameters {
    const SPECS: &'static [ParamSpec] = &[
        Self::SEMITONE_SHIFT,
        Self::WINDOW_SIZE,
        Self::CROSSFADE_SAMPLES,
    ];

    fn field_mut(&mut self, index: usize) -> Option<&mut f32> {
        Some(match index {
            0 => &mut self.semitone_shift,
            1 => &mut self.window_size,
            2 => &mut self.crossfade_samples,
            _ => return None,
        })
    }
}

impl HasParameters for PitchShiftParameters {
    type Params = Self;

    fn parameters(&self) -> &Self {
        self
    }

    fn parameters_mut(&mut self) -> &mut Self {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ReverbParameters::default().is_valid());
        assert!(PitchShiftParameters::default().is_valid());
    }

    #[test]
    fn test_specs_match_field_order() {
        let p = ReverbParameters::default();
        for (index, spec) in ReverbParameters::SPECS.iter().enumerate() {
            assert_eq!(p.field(index), Some(spec.default), "{}", spec.name);
        }
        assert_eq!(p.field(ReverbParameters::SPECS.len()), None);
    }

    #[test]
    fn test_sanitize_clamps_and_replaces_non_finite() {
        let dirty = ReverbParameters {
            in_delay: -5.0,
            crossover: f32::NAN,
            rt60_low: 0.0,
            rt60_mid: f32::INFINITY,
            mix: 1.5,
            level: f32::NEG_INFINITY,
            ..ReverbParameters::default()
        };
        assert!(!dirty.is_valid());

        let clean = dirty.sanitized();
        assert!(clean.is_valid());
        assert_eq!(clean.in_delay, 0.0);
        assert_eq!(clean.crossover, ReverbParameters::CROSSOVER.default);
        assert_eq!(clean.rt60_low, ReverbParameters::RT60_LOW.min);
        assert_eq!(clean.rt60_mid, ReverbParameters::RT60_MID.max);
        assert_eq!(clean.mix, 1.0);
        assert_eq!(clean.level, ReverbParameters::LEVEL.min);
    }

    #[test]
    fn test_pitch_shift_crossfade_never_zero() {
        let clean = PitchShiftParameters {
            crossfade_samples: 0.0,
            window_size: 1e9,
            semitone_shift: f32::NAN,
        }
        .sanitized();

        assert_eq!(clean.crossfade_samples, 1.0);
        assert_eq!(clean.window_size, 10_000.0);
        assert_eq!(clean.semitone_shift, 0.0);
    }

    #[test]
    fn test_lookup_by_name() {
        let (index, spec) = ReverbParameters::spec("RT60Mid").unwrap();
        assert_eq!(index, 3);
        assert_eq!(spec.default, 2.0);
        assert!(PitchShiftParameters::spec("Mix").is_none());
    }

    #[test]
    fn test_copy_between_records() {
        let source = PitchShiftParameters {
            semitone_shift: 7.0,
            window_size: 1_000.0,
            crossfade_samples: 10.0,
        };
        let mut target = PitchShiftParameters::default();
        target.copy_parameters_from(&source);
        assert_eq!(target, source);
    }
}
