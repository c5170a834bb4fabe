//! # Plugin Parameters
//!
//! Parameters are the knobs and sliders the user sees in the DAW. Each
//! parameter has:
//!
//! - A **unique string ID** (`#[id = "..."]`) that the host uses to
//!   save and recall presets. Once published, never change these IDs
//!   or existing presets will break.
//! - A **human-readable name** shown in the DAW's UI.
//! - A **range** (min, max, and optional skew).
//! - A **default value**.
//!
//! Defaults and bounds all come from the engine parameter tables
//! ([`ReverbParameters`] and [`PitchShiftParameters`]), so the host can
//! never send a value the engines weren't designed for.
//!
//! ## No Host-Side Smoothing
//!
//! The engines read their parameters once per block. The reverb glides
//! Mix and Level on its own, sample by sample; everything else is a
//! coefficient that only changes at block boundaries anyway. Smoothing on
//! top of that in nih-plug would only add latency to knob moves, so these
//! parameters use the default `SmoothingStyle::None`.

use nih_plug::prelude::*;

use crate::dsp::{ParameterSet, PitchShiftParameters, ReverbParameters};

/// Skew for frequency knobs. Human pitch perception is roughly
/// logarithmic: 200 → 400 Hz is a big move, 19 800 → 20 000 Hz is not.
const FREQUENCY_SKEW: f32 = -2.0;

/// Skew for time knobs: most of the travel goes to short times.
const TIME_SKEW: f32 = -1.0;

/// All user-facing parameters of the Loveless Reverb plugin.
#[derive(Params)]
pub struct ReverbPluginParams {
    /// **Pre-Delay** — silence between the dry sound and the start of the
    /// reverb. Longer pre-delays separate the source from the room.
    #[id = "indly"]
    pub in_delay: FloatParam,

    /// **Crossover** — where "low" ends and "mid" begins for the two decay
    /// times.
    #[id = "xover"]
    pub crossover: FloatParam,

    /// **Low Decay** — RT60 below the crossover. Big halls and churches
    /// hold their low end longer than their mids.
    #[id = "rtlow"]
    pub rt60_low: FloatParam,

    /// **Mid Decay** — RT60 above the crossover.
    #[id = "rtmid"]
    pub rt60_mid: FloatParam,

    /// **HF Damping** — above this frequency the tail dies out in about
    /// half the mid decay time, the way air and soft surfaces swallow
    /// treble.
    #[id = "hfdmp"]
    pub high_frequency_damping: FloatParam,

    #[id = "eq1f"]
    pub eq1_frequency: FloatParam,

    #[id = "eq1l"]
    pub eq1_level: FloatParam,

    #[id = "eq2f"]
    pub eq2_frequency: FloatParam,

    #[id = "eq2l"]
    pub eq2_level: FloatParam,

    /// **Mix** — 0% is the dry signal only, 100% is the reverb only. Use
    /// 100% on a send bus.
    #[id = "mix"]
    pub mix: FloatParam,

    /// **Level** — output gain applied after the mix.
    #[id = "level"]
    pub level: FloatParam,
}

impl ReverbPluginParams {
    /// Snapshot the current host values as an engine parameter record.
    pub fn to_parameters(&self) -> ReverbParameters {
        ReverbParameters {
            in_delay: self.in_delay.value(),
            crossover: self.crossover.value(),
            rt60_low: self.rt60_low.value(),
            rt60_mid: self.rt60_mid.value(),
            high_frequency_damping: self.high_frequency_damping.value(),
            eq1_frequency: self.eq1_frequency.value(),
            eq1_level: self.eq1_level.value(),
            eq2_frequency: self.eq2_frequency.value(),
            eq2_level: self.eq2_level.value(),
            mix: self.mix.value(),
            level: self.level.value(),
        }
        .sanitized()
    }
}

impl Default for ReverbPluginParams {
    fn default() -> Self {
        type P = ReverbParameters;

        Self {
            in_delay: FloatParam::new(
                "Pre-Delay",
                P::IN_DELAY.default,
                FloatRange::Skewed {
                    min: P::IN_DELAY.min,
                    max: P::IN_DELAY.max,
                    factor: FloatRange::skew_factor(TIME_SKEW),
                },
            )
            .with_unit(" ms")
            .with_step_size(0.1),

            crossover: frequency_param("Crossover", P::CROSSOVER.default),

            rt60_low: decay_param("Low Decay", P::RT60_LOW.default),
            rt60_mid: decay_param("Mid Decay", P::RT60_MID.default),

            high_frequency_damping: frequency_param(
                "HF Damping",
                P::HIGH_FREQUENCY_DAMPING.default,
            ),

            eq1_frequency: frequency_param("EQ1 Freq", P::EQ1_FREQUENCY.default),
            eq1_level: level_param("EQ1 Level", P::EQ1_LEVEL.default),
            eq2_frequency: frequency_param("EQ2 Freq", P::EQ2_FREQUENCY.default),
            eq2_level: level_param("EQ2 Level", P::EQ2_LEVEL.default),

            mix: FloatParam::new(
                "Mix",
                P::MIX.default,
                FloatRange::Linear {
                    min: P::MIX.min,
                    max: P::MIX.max,
                },
            )
            .with_unit("%")
            // Display as percentage: 0.40 → "40.0%"
            .with_value_to_string(formatters::v2s_f32_percentage(1))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            level: level_param("Level", P::LEVEL.default),
        }
    }
}

/// Every reverb frequency knob shares the same 20 Hz – 20 kHz range.
fn frequency_param(name: &'static str, default: f32) -> FloatParam {
    let spec = ReverbParameters::CROSSOVER;
    FloatParam::new(
        name,
        default,
        FloatRange::Skewed {
            min: spec.min,
            max: spec.max,
            factor: FloatRange::skew_factor(FREQUENCY_SKEW),
        },
    )
    .with_value_to_string(formatters::v2s_f32_hz_then_khz(1))
    .with_string_to_value(formatters::s2v_f32_hz_then_khz())
}

fn decay_param(name: &'static str, default: f32) -> FloatParam {
    let spec = ReverbParameters::RT60_LOW;
    FloatParam::new(
        name,
        default,
        FloatRange::Skewed {
            min: spec.min,
            max: spec.max,
            factor: FloatRange::skew_factor(TIME_SKEW),
        },
    )
    .with_unit(" s")
    .with_step_size(0.01)
}

/// Linear dB knob over the -90 .. +45 dB range shared by EQ and Level.
fn level_param(name: &'static str, default: f32) -> FloatParam {
    let spec = ReverbParameters::LEVEL;
    FloatParam::new(
        name,
        default,
        FloatRange::Linear {
            min: spec.min,
            max: spec.max,
        },
    )
    .with_unit(" dB")
    .with_step_size(0.1)
}

/// All user-facing parameters of the Loveless Shift plugin.
#[derive(Params)]
pub struct ShiftPluginParams {
    /// **Shift** — transposition in semitones. ±12 is one octave.
    #[id = "semis"]
    pub semitone_shift: FloatParam,

    /// **Window** — grain length. Long windows smear transients, short
    /// ones make low notes buzz.
    #[id = "window"]
    pub window_size: FloatParam,

    /// **Crossfade** — how long two grains overlap at each boundary.
    #[id = "xfade"]
    pub crossfade_samples: FloatParam,
}

impl ShiftPluginParams {
    pub fn to_parameters(&self) -> PitchShiftParameters {
        PitchShiftParameters {
            semitone_shift: self.semitone_shift.value(),
            window_size: self.window_size.value(),
            crossfade_samples: self.crossfade_samples.value(),
        }
        .sanitized()
    }
}

impl Default for ShiftPluginParams {
    fn default() -> Self {
        type P = PitchShiftParameters;

        Self {
            semitone_shift: FloatParam::new(
                "Shift",
                P::SEMITONE_SHIFT.default,
                FloatRange::Linear {
                    min: P::SEMITONE_SHIFT.min,
                    max: P::SEMITONE_SHIFT.max,
                },
            )
            .with_unit(" st")
            .with_step_size(0.01),

            window_size: FloatParam::new(
                "Window",
                P::WINDOW_SIZE.default,
                FloatRange::Skewed {
                    min: P::WINDOW_SIZE.min,
                    max: P::WINDOW_SIZE.max,
                    factor: FloatRange::skew_factor(TIME_SKEW),
                },
            )
            .with_unit(" smp")
            .with_step_size(1.0),

            crossfade_samples: FloatParam::new(
                "Crossfade",
                P::CROSSFADE_SAMPLES.default,
                FloatRange::Skewed {
                    min: P::CROSSFADE_SAMPLES.min,
                    max: P::CROSSFADE_SAMPLES.max,
                    factor: FloatRange::skew_factor(FREQUENCY_SKEW),
                },
            )
            .with_unit(" smp")
            .with_step_size(1.0),
        }
    }
}
