use crate::audio::filter_chain::FilterChain;
use crate::audio::sample_fifo::SampleFifoProducer;
use crate::params::ChainSettings;

/// Everything the audio callback touches: one filter chain per channel and the producer end of
/// each channel's analyser FIFO.
pub struct EqProcessor {
    // Left and right never share delay memory, only the settings snapshot
    left_chain: FilterChain,
    right_chain: FilterChain,

    // Post-EQ samples for the analyser
    left_fifo: SampleFifoProducer,
    right_fifo: SampleFifoProducer,

    // Snapshot the chains were last designed from, `None` forces a redesign
    last_settings: Option<ChainSettings>,
}

impl EqProcessor {
    pub fn new(left_fifo: SampleFifoProducer, right_fifo: SampleFifoProducer) -> Self {
        Self {
            left_chain: FilterChain::default(),
            right_chain: FilterChain::default(),
            left_fifo,
            right_fifo,
            last_settings: None,
        }
    }

    /// Clears filter memory, adopts the new sample rate and sizes the analyser blocks
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        self.left_chain.prepare(sample_rate, max_block_size);
        self.right_chain.prepare(sample_rate, max_block_size);
        self.left_fifo.prepare(max_block_size);
        self.right_fifo.prepare(max_block_size);
        self.last_settings = None;
    }

    /// Redesigns both chains from `settings`. Skipped when nothing changed since the last call.
    // Called from audio thread - NO ALLOCATIONS!
    pub fn update_filters(&mut self, settings: &ChainSettings) {
        if self.last_settings.as_ref() == Some(settings) {
            return;
        }

        self.left_chain.apply_settings(settings);
        self.right_chain.apply_settings(settings);
        self.last_settings = Some(*settings);
    }

    /// Filters each channel in place, then hands it to the analyser. Channel 0 runs through the
    /// left chain and channel 1 through the right chain; further channels pass untouched.
    // Called from audio thread - NO ALLOCATIONS!
    pub fn process(&mut self, channels: &mut [&mut [f32]]) {
        let mut channels = channels.iter_mut();

        if let Some(left) = channels.next() {
            self.left_chain.process(left);
            self.left_fifo.push(left);
        }
        if let Some(right) = channels.next() {
            self.right_chain.process(right);
            self.right_fifo.push(right);
        }
    }

    /// Drops filter history without touching coefficients
    pub fn reset(&mut self) {
        self.left_chain.reset();
        self.right_chain.reset();
    }

    pub fn left_chain(&self) -> &FilterChain {
        &self.left_chain
    }

    pub fn right_chain(&self) -> &FilterChain {
        &self.right_chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::sample_fifo::{sample_fifo, SampleFifoConsumer};
    use std::f32::consts::PI;

    fn processor() -> (EqProcessor, SampleFifoConsumer, SampleFifoConsumer) {
        let (left_producer, left_consumer) = sample_fifo(8, 1024);
        let (right_producer, right_consumer) = sample_fifo(8, 1024);
        let mut processor = EqProcessor::new(left_producer, right_producer);
        processor.prepare(48000.0, 256);
        (processor, left_consumer, right_consumer)
    }

    fn sine(frequency: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * frequency * i as f32 / 48000.0).sin())
            .collect()
    }

    #[test]
    fn both_channels_get_identical_response() {
        let (mut processor, _, _) = processor();
        processor.update_filters(&ChainSettings {
            low_cut_freq: 120.0,
            peak_gain_db: -9.0,
            peak_freq: 2000.0,
            ..ChainSettings::default()
        });

        let mut left = sine(1000.0, 256);
        let mut right = left.clone();
        processor.process(&mut [&mut left[..], &mut right[..]]);

        assert_eq!(left, right);
        for freq in [50.0, 2000.0, 15000.0] {
            assert_eq!(
                processor.left_chain().magnitude_for_frequency(freq),
                processor.right_chain().magnitude_for_frequency(freq)
            );
        }
    }

    #[test]
    fn channels_keep_independent_history() {
        let (mut processor, _, _) = processor();
        processor.update_filters(&ChainSettings {
            peak_gain_db: 12.0,
            ..ChainSettings::default()
        });

        // Excite only the left chain, then feed silence to both
        let mut left = sine(750.0, 256);
        let mut right = vec![0.0; 256];
        processor.process(&mut [&mut left[..], &mut right[..]]);

        let mut left = vec![0.0; 256];
        let mut right = vec![0.0; 256];
        processor.process(&mut [&mut left[..], &mut right[..]]);

        assert!(left.iter().any(|s| *s != 0.0));
        assert!(right.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn processed_output_reaches_the_fifos() {
        let (mut processor, mut left_fifo, mut right_fifo) = processor();
        processor.update_filters(&ChainSettings::default());

        let mut left = vec![0.25; 256];
        let mut right = vec![-0.25; 256];
        processor.process(&mut [&mut left[..], &mut right[..]]);

        assert_eq!(left_fifo.pop_complete_buffer(), Some(left));
        assert_eq!(right_fifo.pop_complete_buffer(), Some(right));
    }

    #[test]
    fn mono_layout_only_feeds_the_left_side() {
        let (mut processor, mut left_fifo, mut right_fifo) = processor();
        processor.update_filters(&ChainSettings::default());

        let mut mono = sine(440.0, 256);
        processor.process(&mut [&mut mono[..]]);

        assert!(left_fifo.pop_complete_buffer().is_some());
        assert!(right_fifo.pop_complete_buffer().is_none());
    }

    #[test]
    fn prepare_forces_a_redesign_at_the_new_rate() {
        let (mut processor, _, _) = processor();
        let settings = ChainSettings {
            peak_gain_db: 6.0,
            peak_freq: 1000.0,
            ..ChainSettings::default()
        };
        processor.update_filters(&settings);
        let at_48k = *processor.left_chain().peak().coefficients();

        processor.prepare(96000.0, 256);
        processor.update_filters(&settings);
        let at_96k = *processor.left_chain().peak().coefficients();

        assert_ne!(at_48k, at_96k);
        let gain_db = 20.0 * processor.left_chain().magnitude_for_frequency(1000.0).log10();
        assert!((gain_db - 6.0).abs() < 0.05);
    }
}
