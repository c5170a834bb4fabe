//! Property-based stability tests for both engines using proptest.
//!
//! Any parameter set inside the documented ranges, fed any bounded finite
//! input, must only ever produce finite output. Parameters that come in
//! dirty (NaN, infinities, out of range) must be made safe by the
//! validation routine before they reach an engine.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test stability
//! ```

use std::num::NonZeroUsize;

use proptest::prelude::*;

use loveless_space::dsp::{
    HasParameters, ParameterSet, PitchShiftEngine, PitchShiftParameters, ReverbEngine,
    ReverbParameters, SampleRate,
};

// ============================================================================
// Strategies
// ============================================================================

/// A parameter record with every field drawn uniformly from its range.
fn in_range<P: ParameterSet + std::fmt::Debug>() -> impl Strategy<Value = P> {
    prop::collection::vec(0.0_f32..=1.0, P::SPECS.len()).prop_map(|positions| {
        let mut params = P::default();
        for (index, (spec, t)) in P::SPECS.iter().zip(positions).enumerate() {
            if let Some(field) = params.field_mut(index) {
                *field = (spec.min + t * (spec.max - spec.min)).clamp(spec.min, spec.max);
            }
        }
        params
    })
}

/// Any `f32` at all, weighted toward the values validation must catch.
fn dirty_value() -> impl Strategy<Value = f32> {
    prop_oneof![
        Just(f32::NAN),
        Just(f32::INFINITY),
        Just(f32::NEG_INFINITY),
        Just(0.0),
        -1e9_f32..1e9_f32,
        any::<f32>(),
    ]
}

fn dirty<P: ParameterSet + std::fmt::Debug>() -> impl Strategy<Value = P> {
    prop::collection::vec(dirty_value(), P::SPECS.len()).prop_map(|values| {
        let mut params = P::default();
        for (index, value) in values.into_iter().enumerate() {
            if let Some(field) = params.field_mut(index) {
                *field = value;
            }
        }
        params
    })
}

fn sample_rate() -> impl Strategy<Value = SampleRate> {
    prop_oneof![Just(44_100.0_f32), Just(48_000.0), Just(96_000.0)]
        .prop_map(|hz| SampleRate::new(hz).expect("supported rate"))
}

fn signal(len: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-1.0_f32..=1.0, len)
}

fn chunk() -> impl Strategy<Value = NonZeroUsize> {
    (1_usize..=512).prop_map(|n| NonZeroUsize::new(n).expect("non-zero"))
}

// ============================================================================
// 1. Reverb
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// In-range parameters and bounded input never produce NaN/Infinity,
    /// including over a long stretch of ringing tail.
    #[test]
    fn reverb_output_stays_finite(
        params in in_range::<ReverbParameters>(),
        sr in sample_rate(),
        input in signal(2 * 2048),
        chunk in chunk(),
    ) {
        let mut reverb = ReverbEngine::with_params(sr, params);
        let mut output = vec![0.0; input.len()];
        reverb.process(&input, &mut output, chunk).unwrap();
        prop_assert!(output.iter().all(|s| s.is_finite()));

        let mut tail = vec![0.0; 2 * 16_384];
        reverb.process_in_place(&mut tail, chunk).unwrap();
        prop_assert!(tail.iter().all(|s| s.is_finite()), "{:?}", params);
    }

    /// Validation turns any record into one the reverb can run.
    #[test]
    fn reverb_validation_makes_any_record_safe(
        params in dirty::<ReverbParameters>(),
        input in signal(2 * 1024),
    ) {
        let mut reverb = ReverbEngine::new(SampleRate::default());
        reverb.copy_parameters_from(&params).ensure_valid_parameters();
        prop_assert!(reverb.params.is_valid(), "{:?}", reverb.params);

        let mut output = vec![0.0; input.len()];
        reverb.process_block(&input, &mut output).unwrap();
        prop_assert!(output.iter().all(|s| s.is_finite()));
    }

    /// Sanitizing is idempotent and leaves valid records untouched.
    #[test]
    fn reverb_sanitize_keeps_valid_records(params in in_range::<ReverbParameters>()) {
        prop_assert!(params.is_valid());
        prop_assert_eq!(params.sanitized(), params);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Switching from one in-range record to another mid-stream, including
    /// down to the shortest decay times, keeps the output finite and lets
    /// the tail die away instead of stalling.
    #[test]
    fn reverb_tail_decays_after_parameter_switch(
        before in in_range::<ReverbParameters>(),
        after in in_range::<ReverbParameters>(),
        rt60_low in 0.05_f32..=1.0,
        rt60_mid in 0.05_f32..=1.0,
        sr in sample_rate(),
        input in signal(2 * 4096),
        chunk in chunk(),
    ) {
        let mut reverb = ReverbEngine::with_params(sr, before);
        let mut output = vec![0.0; input.len()];
        reverb.process(&input, &mut output, chunk).unwrap();

        let after = ReverbParameters { rt60_low, rt60_mid, mix: after.mix.max(0.1), ..after };
        reverb.params = after;
        let mut tail = vec![0.0; 2 * (3.0 * sr.hz()) as usize];
        reverb.process_in_place(&mut tail, chunk).unwrap();
        prop_assert!(tail.iter().all(|s| s.is_finite()), "{:?} -> {:?}", before, after);

        let window = 2 * (0.1 * sr.hz()) as usize;
        let peak = |samples: &[f32]| samples.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        let early = peak(&tail[..window]);
        let late = peak(&tail[tail.len() - window..]);
        prop_assert!(
            late <= 1e-3 * early + 1e-12,
            "tail went from {} to {} with {:?} -> {:?}",
            early,
            late,
            before,
            after
        );
    }
}

// ============================================================================
// 2. Pitch shifter
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// The output is a blend of two interpolated history cells, so it can
    /// never leave the range of the input.
    #[test]
    fn pitch_shift_output_is_bounded_by_input(
        params in in_range::<PitchShiftParameters>(),
        sr in sample_rate(),
        input in signal(8192),
        chunk in chunk(),
    ) {
        let mut shifter = PitchShiftEngine::with_params(sr, params);
        let mut output = vec![0.0; input.len()];
        shifter.process(&input, &mut output, chunk).unwrap();

        for &s in &output {
            prop_assert!(s.is_finite());
            prop_assert!(s.abs() <= 1.0 + 1e-5, "{} with {:?}", s, params);
        }
    }

    /// Changing shift, window and crossfade between blocks keeps the taps
    /// inside the history and the output inside the input's range.
    #[test]
    fn pitch_shift_survives_parameter_switch(
        before in in_range::<PitchShiftParameters>(),
        after in in_range::<PitchShiftParameters>(),
        sr in sample_rate(),
        input in signal(8192),
        chunk in chunk(),
    ) {
        let mut shifter = PitchShiftEngine::with_params(sr, before);
        let mut output = vec![0.0; input.len()];
        let (first, second) = input.split_at(input.len() / 2);
        let (out_first, out_second) = output.split_at_mut(first.len());

        shifter.process(first, out_first, chunk).unwrap();
        shifter.params = after;
        shifter.process(second, out_second, chunk).unwrap();

        for &s in &output {
            prop_assert!(s.is_finite());
            prop_assert!(s.abs() <= 1.0 + 1e-5, "{} with {:?} -> {:?}", s, before, after);
        }
    }

    #[test]
    fn pitch_shift_validation_makes_any_record_safe(
        params in dirty::<PitchShiftParameters>(),
        input in signal(4096),
    ) {
        let mut shifter = PitchShiftEngine::new(SampleRate::default());
        shifter.copy_parameters_from(&params).ensure_valid_parameters();
        prop_assert!(shifter.params.is_valid(), "{:?}", shifter.params);

        let mut output = input.clone();
        shifter.process_block_in_place(&mut output).unwrap();
        prop_assert!(output.iter().all(|s| s.is_finite()));
    }
}
