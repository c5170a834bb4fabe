//! The Loveless Shift plugin: one [`PitchShiftEngine`] per channel.

use std::num::NonZeroU32;
use std::sync::Arc;

use nih_plug::prelude::*;

use crate::dsp::{PitchShiftEngine, SampleRate};
use crate::params::ShiftPluginParams;

pub struct LovelessShift {
    params: Arc<ShiftPluginParams>,

    /// One engine per audio channel. Each channel is shifted on its own,
    /// so stereo imaging is preserved.
    engines: Vec<PitchShiftEngine>,
}

impl Default for LovelessShift {
    fn default() -> Self {
        Self {
            params: Arc::new(ShiftPluginParams::default()),
            // Populated in initialize() when we know the channel count.
            engines: Vec::new(),
        }
    }
}

impl Plugin for LovelessShift {
    const NAME: &'static str = "Loveless Shift";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo first since most DAW tracks are stereo, mono as fallback.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let sample_rate = match SampleRate::try_from(buffer_config.sample_rate) {
            Ok(rate) => rate,
            Err(err) => {
                nih_error!("Loveless Shift can't initialize: {err}");
                return false;
            }
        };

        let num_channels = audio_io_layout
            .main_input_channels
            .map(|c| c.get() as usize)
            .unwrap_or(2);

        let params = self.params.to_parameters();
        self.engines = (0..num_channels)
            .map(|_| PitchShiftEngine::with_params(sample_rate, params))
            .collect();

        nih_log!(
            "Loveless Shift initialized at {} Hz with {num_channels} channel(s)",
            sample_rate.hz()
        );
        true
    }

    fn reset(&mut self) {
        for engine in &mut self.engines {
            engine.reset();
        }
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let params = self.params.to_parameters();

        for (engine, channel) in self.engines.iter_mut().zip(buffer.as_slice().iter_mut()) {
            engine.params = params;
            let result = engine.process_block_in_place(channel);
            nih_debug_assert!(result.is_ok());
        }

        ProcessStatus::Normal
    }
}

impl ClapPlugin for LovelessShift {
    const CLAP_ID: &'static str = "com.loveless-audio.loveless-shift";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A time-domain pitch shifter with crossfaded grains");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::PitchShifter,
    ];
}

impl Vst3Plugin for LovelessShift {
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssShift__v001";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::PitchShift];
}
