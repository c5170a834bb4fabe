//! # Dual-Tap Crossfade Pitch Shifter
//!
//! Pitch shifting without changing duration, done entirely in the time
//! domain. The input is written into a history buffer at normal speed and
//! read back by a tap that slides relative to the write head:
//!
//! - reading **faster** than we write raises the pitch,
//! - reading **slower** lowers it.
//!
//! A tap that reads faster than the writer would eventually overtake it, so
//! the tap's distance from the write head (the *phase*) is kept inside one
//! window and wraps around when it reaches either end. That wrap is a jump
//! in the read position and would click. A second tap, always exactly one
//! window further back, sits where the first one is about to land, and the
//! output fades from one to the other as the wrap approaches:
//!
//! ```text
//!             write head
//!                 ▼
//! history: ───────┤
//!         ◄── W + phase ──┤◄── phase ──┤
//!          secondary tap    primary tap
//!
//! phase' = (phase + 1 - rate) mod W        rate = 2^(semitones / 12)
//! fade   = min(phase / crossfade, 1)
//! out    = fade · primary + (1 - fade) · secondary
//! ```
//!
//! When the phase is at least one crossfade away from zero, only the
//! primary tap is heard. As it closes in on zero the secondary tap takes
//! over, and the jump then happens while the primary is silent. At zero
//! semitones `rate` is exactly 1, the phase never moves, and the output is
//! the input delayed by one window.

use std::num::NonZeroUsize;

use nih_plug::nih_debug_assert;

use super::block::BlockSlicer;
use super::delay_line::DelayLine;
use super::parameters::{HasParameters, PitchShiftParameters};
use super::sample_rate::SampleRate;
use crate::error::FxResult;

/// Cells in the history buffer.
pub const HISTORY_CAPACITY: usize = 131_072;

/// Largest distance, in samples, either tap may sit behind the write head.
/// Windows longer than half of this get their secondary tap pinned here.
pub const MAX_TAP_OFFSET: f32 = 65_537.0;

/// Mono time-domain pitch shifter.
///
/// Like the reverb, the engine trusts its [`params`](Self::params); run
/// [`HasParameters::ensure_valid_parameters`] on untrusted values. The
/// sample rate only matters to callers, since every parameter is in
/// samples or semitones.
#[derive(Debug, Clone)]
pub struct PitchShiftEngine {
    /// Parameters read at the start of every block.
    pub params: PitchShiftParameters,

    sample_rate: SampleRate,
    history: DelayLine,
    /// Primary tap's distance behind the write head, in `[0, window)`.
    phase: f32,

    // Block-scoped values, refreshed by `prepare_block()`.
    rate: f32,
    window: f32,
    crossfade: f32,
}

impl PitchShiftEngine {
    /// Create an engine with silent history and default parameters.
    pub fn new(sample_rate: SampleRate) -> Self {
        Self {
            params: PitchShiftParameters::default(),
            sample_rate,
            history: DelayLine::new(HISTORY),
            phase: 0.0,
            rate: 1.0,
            window: PitchShiftParameters::WINDOW_SIZE.default,
            crossfade: PitchShiftParameters::CROSSFADE_SAMPLES.default,
        }
    }

    /// Create an engine with the given parameters.
    pub fn with_params(sample_rate: SampleRate, params: PitchShiftParameters) -> Self {
        let mut engine = Self::new(sample_rate);
        engine.params = params;
        engine
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Playback rate of the primary tap: `2^(semitones / 12)`.
    pub fn playback_rate(&self) -> f32 {
        (self.params.semitone_shift / 12.0).exp2()
    }

    /// Silence the history and rewind the phase. Parameters are left alone.
    pub fn reset(&mut self) {
        self.history.clear();
        self.phase = 0.0;
    }

    /// Process a single sample, deriving the block values for it alone.
    pub fn compute_sample(&mut self, input: f32) -> f32 {
        self.prepare_block();
        self.tick(input)
    }

    /// Process one block of mono samples.
    pub fn process_block(&mut self, input: &[f32], output: &mut [f32]) -> FxResult<()> {
        BlockSlicer::new(NonZeroUsize::MIN, NonZeroUsize::MAX).check(input.len(), output.len())?;
        self.run_block(input, output);
        Ok(())
    }

    /// Process one block of mono samples in place.
    ///
    /// Mono buffers have no partial frames, so this never fails.
    pub fn process_block_in_place(&mut self, buffer: &mut [f32]) -> FxResult<()> {
        self.run_block_in_place(buffer);
        Ok(())
    }

    /// Process a mono buffer of any length, re-reading parameters every
    /// `chunk_frames` samples.
    ///
    /// Fails without processing anything if `input` is longer than
    /// `output`.
    pub fn process(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        chunk_frames: NonZeroUsize,
    ) -> FxResult<()> {
        BlockSlicer::new(NonZeroUsize::MIN, chunk_frames).run(input, output, |block_in, block_out| {
            self.run_block(block_in, block_out)
        })
    }

    /// In-place counterpart of [`process()`](Self::process).
    pub fn process_in_place(
        &mut self,
        buffer: &mut [f32],
        chunk_frames: NonZeroUsize,
    ) -> FxResult<()> {
        BlockSlicer::new(NonZeroUsize::MIN, chunk_frames)
            .run_in_place(buffer, |block| self.run_block_in_place(block))
    }

    fn run_block(&mut self, input: &[f32], output: &mut [f32]) {
        self.prepare_block();
        for (&x, y) in input.iter().zip(output.iter_mut()) {
            *y = self.tick(x);
        }
        self.debug_check_output(output);
    }

    fn run_block_in_place(&mut self, buffer: &mut [f32]) {
        self.prepare_block();
        for sample in buffer.iter_mut() {
            *sample = self.tick(*sample);
        }
        self.debug_check_output(buffer);
    }

    fn prepare_block(&mut self) {
        let p = self.params;

        nih_debug_assert!(
            p.window_size > 0.0 && p.crossfade_samples > 0.0,
            "window ({}) and crossfade ({}) must be positive",
            p.window_size,
            p.crossfade_samples
        );

        self.rate = self.playback_rate();
        self.window = p.window_size;
        self.crossfade = p.crossfade_samples;
    }

    #[inline]
    fn tick(&mut self, input: f32) -> f32 {
        self.phase = (self.window + self.phase + 1.0 - self.rate) % self.window;
        let fade = (self.phase / self.crossfade).min(1.0);

        self.history.write(input);
        let primary = self.tap(self.phase);
        let secondary = self.tap(self.window + self.phase);
        self.history.advance();

        fade * primary + (1.0 - fade) * secondary
    }

    #[inline]
    fn tap(&self, delay: f32) -> f32 {
        self.history
            .tap_interpolated(delay.clamp(0.0, MAX_TAP_OFFSET - 1.0))
    }

    fn debug_check_output(&self, output: &[f32]) {
        nih_debug_assert!(
            output.last().map_or(true, |s| s.is_finite()),
            "pitch shifter output went non-finite; parameters out of range?"
        );
    }
}

const HISTORY: NonZeroUsize = match NonZeroUsize::new(HISTORY_CAPACITY) {
    Some(n) => n,
    None => unreachable!(),
};

impl HasParameters for PitchShiftEngine {
    type Params = PitchShiftParameters;

    fn parameters(&self) -> &PitchShiftParameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut PitchShiftParameters {
        &mut self.params
    }
}
