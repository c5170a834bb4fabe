//! # Loveless Space — A Reverb and a Pitch Shifter (AU/VST3/CLAP)
//!
//! Two streaming effects built with [nih-plug](https://github.com/robbert-vdh/nih-plug):
//!
//! - **Loveless Reverb**: a stereo feedback-delay-network reverberator with
//!   separate low and mid decay times, high-frequency damping and a
//!   two-band output EQ.
//! - **Loveless Shift**: a time-domain pitch shifter that reads its input
//!   back at a different speed through two crossfaded taps.
//!
//! Both ship as AUv2, VST3 and CLAP from this one library. The engines in
//! [`dsp`] know nothing about plugin hosts and can be used as an ordinary
//! Rust library: build one for a sample rate, set its parameters, push
//! blocks of samples through it.
//!
//! ## Reverb Signal Flow
//!
//! ```text
//! Input ──┬──────────────────────────────────────────── × (1 - mix) ───┐
//!         │                                                            │
//!         │    ┌───────────────────────────────────────────────┐       │
//!         │    │           8-LINE FEEDBACK NETWORK             │       │
//!         │    │                                               │       │
//!         └──► [Pre-Delay] ──►(+)──► [Allpass] ──► [Hadamard]  │       │
//!              │               ▲                       │       │       │
//!              │               │                       ▼       │       │
//!              │        [Delay] ◄── [Decay Filter] ◄───┤       │       │
//!              │                                       │       │       │
//!              └───────────────────────────────────────│───────┘       │
//!                                                      ▼               │
//!                                    [EQ1] ──► [EQ2] ──► × mix ──────►(+)──► × level ──► Output
//! ```
//!
//! ## Pitch Shifter Signal Flow
//!
//! ```text
//! Input ──► [History Buffer] ──┬──► primary tap (phase)       ──► × fade ─────────┐
//!                              │                                                  ▼
//!                              └──► secondary tap (phase + W) ──► × (1 - fade) ──(+)──► Output
//! ```
//!
//! ## Using the Engines Directly
//!
//! ```
//! use std::num::NonZeroUsize;
//! use loveless_space::dsp::{PitchShiftEngine, SampleRate};
//!
//! let mut shifter = PitchShiftEngine::new(SampleRate::new(48_000.0)?);
//! shifter.params.semitone_shift = 7.0;
//!
//! let input = vec![0.25_f32; 4096];
//! let mut output = vec![0.0; 4096];
//! shifter.process(&input, &mut output, NonZeroUsize::new(256).unwrap())?;
//! # Ok::<(), loveless_space::FxError>(())
//! ```

pub mod dsp;
pub mod error;
mod params;
mod plugins;

use nih_plug::prelude::*;

pub use error::{FxError, FxResult};
pub use plugins::{LovelessReverb, LovelessShift};

// ─────────────────────────────────────────────────────────────────────
// Export macros
// ─────────────────────────────────────────────────────────────────────
//
// These macros generate the C-compatible entry points that the host
// DAW uses to discover and load the plugins. Without these, the compiled
// library would have no externally visible symbols and the host wouldn't
// know it holds any plugins.
//
// nih_export_clap! exports the `clap_entry` symbol for CLAP hosts.
// nih_export_vst3! exports `GetPluginFactory` for VST3 hosts.
// Both take every plugin the library provides.

nih_export_clap!(LovelessReverb, LovelessShift);
nih_export_vst3!(LovelessReverb, LovelessShift);

// Wrap the CLAP plugins into AUv2 format for Logic Pro.
// This generates a `GetPluginFactoryAUV2` entry point that macOS uses
// to discover the plugins as Audio Unit components.
clap_wrapper::export_auv2!();
