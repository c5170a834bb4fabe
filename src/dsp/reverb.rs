//! # Feedback Delay Network Reverb
//!
//! Eight delay lines feed back into each other through an orthogonal
//! mixing matrix. Each line has its own length, its own allpass diffuser
//! and its own decay filter, so the echoes pile up into a dense, smooth
//! tail instead of the metallic ringing of a bank of parallel combs.
//!
//! ## Signal Flow
//!
//! ```text
//!  L ─► [pre-delay] ─┐                 ┌──────────── feedback ◄──────────────┐
//!  R ─► [pre-delay] ─┤                 │                                     │
//!                    ▼                 ▼                                     │
//!        L, R, -L, -R, L, R, -L, -R ─►(+)─► [allpass comb 0] ─► ┌────────┐   │
//!                                      ⋮          ⋮             │Hadamard│─┬─┘
//!                                     (+)─► [allpass comb 7] ─► │  8x8   │ │  y[i] ─► [decay i] ─► [delay i]
//!                                                               └────────┘ │
//!                                                                          ▼
//!                                            left  = 0.37·(y1 + y2) ─► [EQ1] ─► [EQ2] ─┐
//!                                            right = 0.37·(y1 - y2) ─► [EQ1] ─► [EQ2] ─┤
//!                                                                                      ▼
//!  out = Level · ((1 - Mix)·dry + Mix·wet)                                 Mix / Level ◄
//! ```
//!
//! ## Decay Law
//!
//! A line of `T` samples is traversed `sample_rate / T` times per second.
//! To lose 60 dB in `RT60` seconds, every trip must multiply the signal by
//!
//! ```text
//! g = exp(-ln(1000) · T / (RT60 · sample_rate))
//! ```
//!
//! Two such gains are derived per line: `g0` from RT60 Low and `gM` from
//! RT60 Mid. The decay filter applies `g0` below the crossover, `gM` above
//! it, and a one-pole lowpass on top whose gain at the damping frequency is
//! `gM` again, so at and above that frequency the tail dies out in about
//! half the mid-band time. Because `T` differs per line, each line gets its
//! own coefficients even though they share the formula, and every line ends
//! up decaying at the same rate per *second*.
//!
//! ## Blocks
//!
//! All coefficients are derived once at the top of each processing call
//! from the current [`ReverbParameters`]. Mix and Level are the exception:
//! their targets are read per block, but the values actually applied glide
//! toward the targets sample by sample.

use std::f32::consts::FRAC_1_SQRT_2;
use std::num::NonZeroUsize;

use nih_plug::nih_debug_assert;
use nih_plug::util::db_to_gain;

use super::block::BlockSlicer;
use super::delay_line::DelayLine;
use super::eq::{PeakingCoefficients, PeakingEq};
use super::filter::{CrossoverLowpass, LowpassCoefficients, OnePoleFilter};
use super::parameters::{HasParameters, ReverbParameters};
use super::sample_rate::{capacity_for, SampleRate};
use crate::error::{FxError, FxResult};

/// Number of delay lines in the network.
pub const LINE_COUNT: usize = 8;

/// Total loop length of each line, in seconds.
const LINE_SECONDS: [f32; LINE_COUNT] = [
    0.153129, 0.210389, 0.127837, 0.256891, 0.174713, 0.192303, 0.125000, 0.219991,
];

/// Length of each line's allpass diffuser, in seconds.
const ALLPASS_SECONDS: [f32; LINE_COUNT] = [
    0.020346, 0.024421, 0.031604, 0.027333, 0.022904, 0.029291, 0.013458, 0.019123,
];

/// Allpass coefficient magnitude; the sign alternates between lines.
const ALLPASS_GAIN: f32 = 0.6;

/// Gain from the two tapped network outputs to each stereo channel.
const OUTPUT_GAIN: f32 = 0.37;

/// `1 / sqrt(8)`: normalizes the unscaled Hadamard butterflies.
const MATRIX_NORM: f32 = FRAC_1_SQRT_2 * 0.5;

/// Keeps recirculating signals well below audibility but off denormals.
const ANTI_DENORMAL: f32 = 1e-20;

/// `ln(1000)`: 60 dB expressed as a natural-log amplitude ratio.
const LN_1000: f32 = 6.907_755;

/// Longest supported pre-delay, in seconds.
const MAX_PRE_DELAY_SECONDS: f32 = ReverbParameters::IN_DELAY.max * 0.001;

/// Schroeder allpass comb:
///
/// ```text
/// s[n] = x[n] - a·s[n-N]
/// y[n] = s[n-N] + a·s[n]
/// ```
#[derive(Debug, Clone)]
struct AllpassComb {
    line: DelayLine,
    delay: usize,
    gain: f32,
}

impl AllpassComb {
    fn new(seconds: f32, gain: f32, sample_rate: SampleRate) -> Self {
        let line = DelayLine::new(capacity(seconds));
        let delay = sample_rate.seconds_to_samples(seconds).clamp(1, line.max_delay());
        Self { line, delay, gain }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let delayed = self.line.tap(self.delay);
        let s = input - self.gain * delayed;
        self.line.write(s);
        self.line.advance();
        delayed + self.gain * s
    }

    fn reset(&mut self) {
        self.line.clear();
    }
}

/// Per-line frequency-dependent loop gain.
///
/// ```text
/// shelf = x + (g0/gM - 1) · lowpass(x)           g0/gM below crossover, 1 above
/// out   = gM · damping(shelf) / sqrt(8) + 1e-20  gain gM at the damping frequency
/// ```
///
/// `gM` is applied after the damping stage. Short decay times put that
/// stage's pole a hair below 1.0, so whatever it still holds from earlier
/// settings has to come out scaled by the new `gM`.
#[derive(Debug, Clone, Default)]
struct DecayFilter {
    crossover: CrossoverLowpass,
    damping: OnePoleFilter,
    mid_gain: f32,
    low_shelf: f32,
}

impl DecayFilter {
    fn set_coefficients(
        &mut self,
        crossover: LowpassCoefficients,
        low_gain: f32,
        mid_gain: f32,
        damping_hz: f32,
        sample_rate: f32,
    ) {
        self.crossover.set_coefficients(crossover);
        self.damping.set_gain_at(mid_gain, damping_hz, sample_rate);
        self.mid_gain = mid_gain;
        self.low_shelf = low_gain / mid_gain - 1.0;
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let low = self.crossover.process(input);
        let shelved = input + self.low_shelf * low;
        self.mid_gain * self.damping.process(shelved) * MATRIX_NORM + ANTI_DENORMAL
    }

    fn reset(&mut self) {
        self.crossover.reset();
        self.damping.reset();
    }
}

/// One of the eight network branches.
#[derive(Debug, Clone)]
struct FdnLine {
    allpass: AllpassComb,
    feedback: DelayLine,
    feedback_delay: usize,
    decay: DecayFilter,
    /// Full loop length in samples (allpass + feedback), used by the decay
    /// law.
    loop_samples: f32,
}

impl FdnLine {
    fn new(index: usize, sample_rate: SampleRate) -> Self {
        let gain = if index % 2 == 0 {
            ALLPASS_GAIN
        } else {
            -ALLPASS_GAIN
        };
        let allpass = AllpassComb::new(ALLPASS_SECONDS[index], gain, sample_rate);
        let feedback = DelayLine::new(capacity(LINE_SECONDS[index]));

        let total = sample_rate.seconds_to_samples(LINE_SECONDS[index]);
        let feedback_delay = total
            .saturating_sub(allpass.delay)
            .clamp(1, feedback.max_delay());

        Self {
            loop_samples: (allpass.delay + feedback_delay) as f32,
            allpass,
            feedback,
            feedback_delay,
            decay: DecayFilter::default(),
        }
    }

    /// Sum the input with the delayed feedback and diffuse it.
    #[inline]
    fn diffuse(&mut self, input: f32) -> f32 {
        let recirculated = self.feedback.tap(self.feedback_delay);
        self.allpass.process(input + recirculated)
    }

    /// Damp a mixed network output and store it for its next trip.
    #[inline]
    fn recirculate(&mut self, mixed: f32) {
        let damped = self.decay.process(mixed);
        self.feedback.write(damped);
        self.feedback.advance();
    }

    fn reset(&mut self) {
        self.allpass.reset();
        self.feedback.clear();
        self.decay.reset();
    }
}

fn capacity(seconds: f32) -> NonZeroUsize {
    NonZeroUsize::new(capacity_for(seconds)).unwrap_or(NonZeroUsize::MIN)
}

/// Unnormalized 8-point Hadamard transform, built from recursive
/// butterflies: the first half of each group gets sums, the second half
/// differences.
#[inline]
fn hadamard(x: &mut [f32; LINE_COUNT]) {
    let mut half = LINE_COUNT / 2;
    while half > 0 {
        for start in (0..LINE_COUNT).step_by(2 * half) {
            for i in start..start + half {
                let (a, b) = (x[i], x[i + half]);
                x[i] = a + b;
                x[i + half] = a - b;
            }
        }
        half /= 2;
    }
}

/// Per-trip gain of a loop of `loop_samples` for a given RT60.
fn loop_gain(loop_samples: f32, rt60: f32, sample_rate: f32) -> f32 {
    (-LN_1000 * loop_samples / (rt60 * sample_rate)).exp()
}

/// Stereo feedback-delay-network reverberator.
///
/// Write [`params`](Self::params) between calls; values are picked up at
/// the start of the next block. The engine performs no validation of its
/// own. Run [`HasParameters::ensure_valid_parameters`] on untrusted values.
#[derive(Debug, Clone)]
pub struct ReverbEngine {
    /// Parameters read at the start of every block.
    pub params: ReverbParameters,

    sample_rate: SampleRate,
    pre_delay: [DelayLine; 2],
    lines: [FdnLine; LINE_COUNT],
    eq1: [PeakingEq; 2],
    eq2: [PeakingEq; 2],
    mix: OnePoleFilter,
    level: OnePoleFilter,

    // Block-scoped values, refreshed by `prepare_block()`.
    pre_delay_samples: usize,
    mix_target: f32,
    level_target: f32,
}

impl ReverbEngine {
    /// Create an engine with silent state and default parameters.
    pub fn new(sample_rate: SampleRate) -> Self {
        let pre_delay_capacity = capacity(MAX_PRE_DELAY_SECONDS);
        let mut mix = OnePoleFilter::new();
        mix.set_smoothing(sample_rate.hz());
        let level = mix.clone();

        Self {
            params: ReverbParameters::default(),
            sample_rate,
            pre_delay: [
                DelayLine::new(pre_delay_capacity),
                DelayLine::new(pre_delay_capacity),
            ],
            lines: std::array::from_fn(|index| FdnLine::new(index, sample_rate)),
            eq1: Default::default(),
            eq2: Default::default(),
            mix,
            level,
            pre_delay_samples: 0,
            mix_target: 0.0,
            level_target: 0.0,
        }
    }

    /// Create an engine with the given parameters.
    pub fn with_params(sample_rate: SampleRate, params: ReverbParameters) -> Self {
        let mut engine = Self::new(sample_rate);
        engine.params = params;
        engine
    }

    /// The sample rate this engine was built for.
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// How long the output keeps ringing after the input stops, in
    /// seconds: the longer decay time plus the pre-delay.
    pub fn tail_seconds(&self) -> f32 {
        self.params.rt60_low.max(self.params.rt60_mid) + self.params.in_delay * 0.001
    }

    /// Loop length of each line in samples, in line order.
    pub fn loop_lengths(&self) -> [usize; LINE_COUNT] {
        std::array::from_fn(|i| self.lines[i].loop_samples as usize)
    }

    /// Silence every register and buffer. Parameters are left alone.
    pub fn reset(&mut self) {
        for line in &mut self.pre_delay {
            line.clear();
        }
        for line in &mut self.lines {
            line.reset();
        }
        for eq in self.eq1.iter_mut().chain(self.eq2.iter_mut()) {
            eq.reset();
        }
        self.mix.reset();
        self.level.reset();
    }

    /// Process a single stereo frame, deriving coefficients for it alone.
    pub fn compute_frame(&mut self, left: f32, right: f32) -> (f32, f32) {
        self.prepare_block();
        self.tick(left, right)
    }

    /// Process one block of interleaved stereo (`L R L R ...`).
    ///
    /// Coefficients are derived once for the whole block.
    pub fn process_block(&mut self, input: &[f32], output: &mut [f32]) -> FxResult<()> {
        BlockSlicer::new(STEREO, NonZeroUsize::MAX).check(input.len(), output.len())?;
        self.run_block(input, output);
        Ok(())
    }

    /// Process one block of interleaved stereo in place.
    pub fn process_block_in_place(&mut self, buffer: &mut [f32]) -> FxResult<()> {
        BlockSlicer::new(STEREO, NonZeroUsize::MAX).check(buffer.len(), buffer.len())?;
        self.run_block_in_place(buffer);
        Ok(())
    }

    /// Process one block held as two separate channel buffers, in place.
    pub fn process_channels(&mut self, left: &mut [f32], right: &mut [f32]) -> FxResult<()> {
        if left.len() != right.len() {
            return Err(FxError::ChannelMismatch {
                left: left.len(),
                right: right.len(),
            });
        }

        self.prepare_block();
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.tick(*l, *r);
        }
        self.debug_check_output(left);

        Ok(())
    }

    /// Process an interleaved stereo buffer of any length, re-deriving
    /// coefficients every `chunk_frames` frames.
    ///
    /// Fails without processing anything if `input` is longer than
    /// `output`.
    pub fn process(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        chunk_frames: NonZeroUsize,
    ) -> FxResult<()> {
        BlockSlicer::new(STEREO, chunk_frames).run(input, output, |block_in, block_out| {
            self.run_block(block_in, block_out)
        })
    }

    /// In-place counterpart of [`process()`](Self::process).
    pub fn process_in_place(
        &mut self,
        buffer: &mut [f32],
        chunk_frames: NonZeroUsize,
    ) -> FxResult<()> {
        BlockSlicer::new(STEREO, chunk_frames)
            .run_in_place(buffer, |block| self.run_block_in_place(block))
    }

    /// One block of whole frames whose lengths have already been checked.
    fn run_block(&mut self, input: &[f32], output: &mut [f32]) {
        self.prepare_block();
        for (frame_in, frame_out) in input.chunks_exact(2).zip(output.chunks_exact_mut(2)) {
            let (l, r) = self.tick(frame_in[0], frame_in[1]);
            frame_out[0] = l;
            frame_out[1] = r;
        }
        self.debug_check_output(output);
    }

    fn run_block_in_place(&mut self, buffer: &mut [f32]) {
        self.prepare_block();
        for frame in buffer.chunks_exact_mut(2) {
            let (l, r) = self.tick(frame[0], frame[1]);
            frame[0] = l;
            frame[1] = r;
        }
        self.debug_check_output(buffer);
    }

    /// Derive every block-scoped coefficient from the current parameters.
    fn prepare_block(&mut self) {
        let p = self.params;
        let sr = self.sample_rate.hz();

        nih_debug_assert!(
            p.rt60_low > 0.0 && p.rt60_mid > 0.0,
            "RT60 must be positive, got low {} / mid {}",
            p.rt60_low,
            p.rt60_mid
        );

        let crossover = LowpassCoefficients::bilinear(p.crossover, sr);
        for line in &mut self.lines {
            let low_gain = loop_gain(line.loop_samples, p.rt60_low, sr);
            let mid_gain = loop_gain(line.loop_samples, p.rt60_mid, sr);
            line.decay
                .set_coefficients(crossover, low_gain, mid_gain, p.high_frequency_damping, sr);
        }

        let eq1 = PeakingCoefficients::new(p.eq1_frequency, p.eq1_level, sr);
        let eq2 = PeakingCoefficients::new(p.eq2_frequency, p.eq2_level, sr);
        for eq in &mut self.eq1 {
            eq.set_coefficients(eq1);
        }
        for eq in &mut self.eq2 {
            eq.set_coefficients(eq2);
        }

        self.pre_delay_samples = self
            .sample_rate
            .ms_to_samples(p.in_delay)
            .min(self.pre_delay[0].max_delay());
        self.mix_target = p.mix;
        self.level_target = db_to_gain(p.level);
    }

    /// Advance the whole network by one stereo frame.
    #[inline]
    fn tick(&mut self, left: f32, right: f32) -> (f32, f32) {
        let [pre_l, pre_r] = &mut self.pre_delay;
        pre_l.write(left);
        pre_r.write(right);
        let l = pre_l.tap(self.pre_delay_samples);
        let r = pre_r.tap(self.pre_delay_samples);
        pre_l.advance();
        pre_r.advance();

        let inputs = [l, r, -l, -r, l, r, -l, -r];
        let mut mixed = [0.0; LINE_COUNT];
        for ((out, line), input) in mixed.iter_mut().zip(&mut self.lines).zip(inputs) {
            *out = line.diffuse(input);
        }

        hadamard(&mut mixed);

        for (line, &y) in self.lines.iter_mut().zip(&mixed) {
            line.recirculate(y);
        }

        let wet_l = OUTPUT_GAIN * (mixed[1] + mixed[2]);
        let wet_r = OUTPUT_GAIN * (mixed[1] - mixed[2]);
        let wet_l = self.eq2[0].process(self.eq1[0].process(wet_l));
        let wet_r = self.eq2[1].process(self.eq1[1].process(wet_r));

        let wet = self.mix.process(self.mix_target);
        let dry = 1.0 - wet;
        let gain = self.level.process(self.level_target);

        (
            gain * (dry * left + wet * wet_l),
            gain * (dry * right + wet * wet_r),
        )
    }

    fn debug_check_output(&self, output: &[f32]) {
        nih_debug_assert!(
            output.last().map_or(true, |s| s.is_finite()),
            "reverb output went non-finite; parameters out of range?"
        );
    }
}

const STEREO: NonZeroUsize = match NonZeroUsize::new(2) {
    Some(n) => n,
    None => unreachable!(),
};

impl HasParameters for ReverbEngine {
    type Params = ReverbParameters;

    fn parameters(&self) -> &ReverbParameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut ReverbParameters {
        &mut self.params
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
