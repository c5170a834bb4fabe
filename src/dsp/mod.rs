//! # DSP (Digital Signal Processing) Engines
//!
//! Everything in here is plain Rust with no host involved, so the engines
//! can be driven from a plugin, a command-line tool or a test alike:
//!
//! - **`reverb`**: the stereo feedback-delay-network reverberator.
//! - **`pitch_shift`**: the mono dual-tap crossfade pitch shifter.
//!
//! And the building blocks they share:
//!
//! - **`delay_line`**: a power-of-two ring buffer with masked indexing.
//!   Every delay in both engines is one of these.
//! - **`filter`**: one-pole lowpass/smoother and the bilinear crossover.
//! - **`eq`**: the Regalia–Mitra peaking section on the reverb's output.
//! - **`parameters`**: the parameter records, their ranges, and the traits
//!   for copying and validating them.
//! - **`sample_rate`**: the validated rate an engine is bound to.
//! - **`block`**: splits long buffers into per-block processing calls.

pub mod block;
pub mod delay_line;
pub mod eq;
pub mod filter;
pub mod parameters;
pub mod pitch_shift;
pub mod reverb;
pub mod sample_rate;

pub use block::BlockSlicer;
pub use parameters::{HasParameters, ParamSpec, ParameterSet, PitchShiftParameters, ReverbParameters};
pub use pitch_shift::PitchShiftEngine;
pub use reverb::ReverbEngine;
pub use sample_rate::SampleRate;
