//! The Loveless Reverb plugin: a stereo [`ReverbEngine`] behind nih-plug.

use std::num::NonZeroU32;
use std::sync::Arc;

use nih_plug::prelude::*;

use crate::dsp::{ReverbEngine, SampleRate};
use crate::params::ReverbPluginParams;

/// The main plugin struct.
///
/// Parameters (`ReverbPluginParams`) are shared with the host via `Arc`
/// and can be read from any thread. The engine is owned by the audio
/// thread and only touched in `initialize()`, `reset()` and `process()`.
pub struct LovelessReverb {
    params: Arc<ReverbPluginParams>,

    /// `None` until the host tells us the sample rate in `initialize()`.
    /// The engine's ring buffers are sized for the fastest supported rate,
    /// so building it is the only allocation this plugin ever makes.
    engine: Option<ReverbEngine>,

    sample_rate: f32,
}

impl Default for LovelessReverb {
    fn default() -> Self {
        Self {
            params: Arc::new(ReverbPluginParams::default()),
            engine: None,
            sample_rate: 44_100.0,
        }
    }
}

impl Plugin for LovelessReverb {
    const NAME: &'static str = "Loveless Reverb";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // The network takes two inputs and produces a decorrelated stereo
    // pair, so stereo is the only layout.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[AudioIOLayout {
        main_input_channels: NonZeroU32::new(2),
        main_output_channels: NonZeroU32::new(2),
        aux_input_ports: &[],
        aux_output_ports: &[],
        names: PortNames::const_default(),
    }];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Build the engine for the host's sample rate. Returning `false`
    /// tells the host we can't run at this rate.
    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let sample_rate = match SampleRate::try_from(buffer_config.sample_rate) {
            Ok(rate) => rate,
            Err(err) => {
                nih_error!("Loveless Reverb can't initialize: {err}");
                return false;
            }
        };

        let mut engine = ReverbEngine::new(sample_rate);
        engine.params = self.params.to_parameters();
        nih_log!(
            "Loveless Reverb initialized at {} Hz, line lengths {:?}",
            sample_rate.hz(),
            engine.loop_lengths()
        );

        self.sample_rate = sample_rate.hz();
        self.engine = Some(engine);
        true
    }

    /// Called when playback stops or the plugin is bypassed. A stale tail
    /// must not ring into the next playback.
    fn reset(&mut self) {
        if let Some(engine) = &mut self.engine {
            engine.reset();
        }
    }

    /// Snapshot the host parameters into the engine, then let it process
    /// the host's block in place. One host block is one engine block, so
    /// coefficients follow automation at the host's block rate.
    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let Some(engine) = self.engine.as_mut() else {
            return ProcessStatus::Normal;
        };
        engine.params = self.params.to_parameters();

        if let [left, right] = buffer.as_slice() {
            let result = engine.process_channels(left, right);
            nih_debug_assert!(result.is_ok(), "host handed out uneven channels");
        }

        // Tell the host how long the reverb keeps ringing so it keeps
        // calling process() after the input goes silent.
        ProcessStatus::Tail((engine.tail_seconds() * self.sample_rate) as u32)
    }
}

impl ClapPlugin for LovelessReverb {
    const CLAP_ID: &'static str = "com.loveless-audio.loveless-reverb";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A feedback-delay-network reverb with two-band decay and output EQ");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Reverb,
    ];
}

impl Vst3Plugin for LovelessReverb {
    // `*b"..."` turns a 16-character ASCII literal into a `[u8; 16]`.
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssReverb_v001";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Reverb];
}
