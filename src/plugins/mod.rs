//! # Plugin Front-Ends
//!
//! Thin nih-plug wrappers around the engines. Each plugin owns its engine
//! state on the audio thread, snapshots the host parameters into the
//! engine at the top of every `process()` call, and hands the host buffer
//! straight to the engine.

mod reverb;
mod shift;

pub use reverb::LovelessReverb;
pub use shift::LovelessShift;
