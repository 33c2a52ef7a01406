pub mod analyzer;
pub mod audio;
pub mod editor;
pub mod params;
pub mod state;
pub mod ui;

use analyzer::{AnalyzerConfig, DisplayOutput, RefreshTask, RefreshTaskSlot};
use atomic_float::AtomicF32;
use audio::constants::{FIFO_CAPACITY, MAX_BLOCK_SIZE};
use audio::processor::EqProcessor;
use audio::sample_fifo::sample_fifo;
use editor::EqEditor;
use nih_plug::prelude::*;
use nih_plug::wrapper::state::PluginState;
use params::{ChainSettings, SimpleEqParams};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Sample rate the display side assumes until the host initializes the plugin
const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

pub struct SimpleEq {
    params: Arc<SimpleEqParams>,
    processor: EqProcessor,

    /// Display side state, handed to the refresh thread while an editor is open
    refresh_task: RefreshTaskSlot,
    frames: DisplayOutput,
    analyzer_config: AnalyzerConfig,

    /// Raised whenever the response curve needs a redesign
    curve_dirty: Arc<AtomicBool>,
    sample_rate: Arc<AtomicF32>,
}

impl Default for SimpleEq {
    fn default() -> Self {
        let params = Arc::new(SimpleEqParams::default());
        let analyzer_config = AnalyzerConfig::default();
        let curve_dirty = Arc::new(AtomicBool::new(true));
        let sample_rate = Arc::new(AtomicF32::new(DEFAULT_SAMPLE_RATE));

        let (left_producer, left_consumer) = sample_fifo(FIFO_CAPACITY, MAX_BLOCK_SIZE);
        let (right_producer, right_consumer) = sample_fifo(FIFO_CAPACITY, MAX_BLOCK_SIZE);

        let (refresh_task, frames) = RefreshTask::new(
            params.clone(),
            sample_rate.clone(),
            left_consumer,
            right_consumer,
            curve_dirty.clone(),
            &analyzer_config,
        );

        Self {
            params,
            processor: EqProcessor::new(left_producer, right_producer),
            refresh_task: Arc::new(Mutex::new(Some(refresh_task))),
            frames,
            analyzer_config,
            curve_dirty,
            sample_rate,
        }
    }
}

impl Plugin for SimpleEq {
    const NAME: &'static str = "Simple EQ";
    const VENDOR: &'static str = "Cmdv";
    const URL: &'static str = env!("CARGO_PKG_HOMEPAGE");
    const EMAIL: &'static str = "info@cmdv.me";

    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // The first audio IO layout is used as the default
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
    const MIDI_OUTPUT: MidiConfig = MidiConfig::None;

    // Settings are read once per block
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn editor(&mut self, _async_executor: AsyncExecutor<Self>) -> Option<Box<dyn Editor>> {
        nih_log!("Editor requested");

        Some(Box::new(EqEditor::new(
            self.refresh_task.clone(),
            self.frames.clone(),
            self.curve_dirty.clone(),
            self.analyzer_config.refresh_interval(),
        )))
    }

    fn filter_state(state: &mut PluginState) {
        crate::state::filter_state(state);
    }

    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        nih_log!(
            "Plugin initialize called, sample_rate: {}, buffer_size: {}",
            buffer_config.sample_rate,
            buffer_config.max_buffer_size
        );

        let max_block_size = (buffer_config.max_buffer_size as usize).min(MAX_BLOCK_SIZE);
        self.processor.prepare(buffer_config.sample_rate, max_block_size);
        self.processor.update_filters(&ChainSettings::from_params(&self.params));

        self.sample_rate.store(buffer_config.sample_rate, Ordering::Relaxed);
        self.curve_dirty.store(true, Ordering::Release);

        true
    }

    fn reset(&mut self) {
        // Called from audio thread - NO ALLOCATIONS!
        self.processor.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        // One snapshot per block, both chains are designed from it before any sample is touched
        self.processor.update_filters(&ChainSettings::from_params(&self.params));
        self.processor.process(buffer.as_slice());

        ProcessStatus::Normal
    }
}

impl ClapPlugin for SimpleEq {
    const CLAP_ID: &'static str = "me.cmdv.simple-eq";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Three band equalizer with a live spectrum analyser");
    const CLAP_MANUAL_URL: Option<&'static str> = Some(Self::URL);
    const CLAP_SUPPORT_URL: Option<&'static str> = None;

    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Equalizer,
        ClapFeature::Stereo,
        ClapFeature::Mono,
    ];
}

impl Vst3Plugin for SimpleEq {
    const VST3_CLASS_ID: [u8; 16] = *b"CmdvSimpleEqPlug";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Eq];
}

nih_export_clap!(SimpleEq);
nih_export_vst3!(SimpleEq);
