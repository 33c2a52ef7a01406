//! The per-channel filter cascade: low cut (up to four sections), one peak section, high cut
//! (up to four sections). One [`FilterChain`] per audio channel; chains never share delay
//! memory, only the settings snapshot they are configured from.

use crate::audio::coefficients::{
    make_high_cut_filter, make_low_cut_filter, make_peak_filter, Coefficients, CutCoefficients,
};
use crate::audio::constants::MAX_CUT_SECTIONS;
use crate::params::ChainSettings;

/// Position of a stage inside the cascade, in processing order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPosition {
    LowCut,
    Peak,
    HighCut,
}

impl ChainPosition {
    pub const ALL: [ChainPosition; 3] = [Self::LowCut, Self::Peak, Self::HighCut];

    fn index(self) -> usize {
        match self {
            Self::LowCut => 0,
            Self::Peak => 1,
            Self::HighCut => 2,
        }
    }
}

/// A replacement coefficient set for one stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageCoefficients {
    LowCut(CutCoefficients),
    Peak(Coefficients),
    HighCut(CutCoefficients),
}

impl StageCoefficients {
    pub fn position(&self) -> ChainPosition {
        match self {
            Self::LowCut(_) => ChainPosition::LowCut,
            Self::Peak(_) => ChainPosition::Peak,
            Self::HighCut(_) => ChainPosition::HighCut,
        }
    }
}

/// Second order section in transposed direct form II
#[derive(Debug, Clone, Copy, Default)]
pub struct Biquad {
    coefficients: Coefficients,
    z1: f32,
    z2: f32,
}

impl Biquad {
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let c = &self.coefficients;
        let output = c.b0 * input + self.z1;
        self.z1 = c.b1 * input - c.a1 * output + self.z2;
        self.z2 = c.b2 * input - c.a2 * output;
        output
    }

    pub fn process_block(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Swaps in a new coefficient set. The delay memory is kept.
    pub fn set_coefficients(&mut self, coefficients: Coefficients) {
        self.coefficients = coefficients;
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

/// Up to four cascaded sections. Sections beyond the selected slope are bypassed, not removed,
/// so their memory survives a later slope change.
#[derive(Debug, Clone, Copy)]
pub struct CutFilter {
    sections: [Biquad; MAX_CUT_SECTIONS],
    bypassed: [bool; MAX_CUT_SECTIONS],
}

impl Default for CutFilter {
    fn default() -> Self {
        Self {
            sections: [Biquad::default(); MAX_CUT_SECTIONS],
            bypassed: [true; MAX_CUT_SECTIONS],
        }
    }
}

impl CutFilter {
    pub fn update(&mut self, coefficients: &CutCoefficients) {
        for (index, (section, bypassed)) in self
            .sections
            .iter_mut()
            .zip(self.bypassed.iter_mut())
            .enumerate()
        {
            match coefficients.get(index) {
                Some(c) => {
                    section.set_coefficients(*c);
                    *bypassed = false;
                }
                None => *bypassed = true,
            }
        }
    }

    pub fn is_section_bypassed(&self, section: usize) -> bool {
        self.bypassed.get(section).copied().unwrap_or(true)
    }

    pub fn active_sections(&self) -> usize {
        self.bypassed.iter().filter(|bypassed| !**bypassed).count()
    }

    pub fn process(&mut self, samples: &mut [f32]) {
        for (section, bypassed) in self.sections.iter_mut().zip(self.bypassed.iter()) {
            if !bypassed {
                section.process_block(samples);
            }
        }
    }

    pub fn magnitude_for_frequency(&self, frequency: f64, sample_rate: f64) -> f64 {
        self.sections
            .iter()
            .zip(self.bypassed.iter())
            .filter(|(_, bypassed)| !**bypassed)
            .map(|(section, _)| {
                section
                    .coefficients()
                    .magnitude_for_frequency(frequency, sample_rate)
            })
            .product()
    }

    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }
}

/// Mono cascade LowCut -> Peak -> HighCut.
///
/// Coefficient updates happen between calls to [`FilterChain::process`], once per processing
/// callback, so a block is always filtered by a single consistent coefficient set.
#[derive(Debug, Clone)]
pub struct FilterChain {
    low_cut: CutFilter,
    peak: Biquad,
    high_cut: CutFilter,
    bypassed: [bool; 3],
    sample_rate: f32,
    max_block_size: usize,
}

impl Default for FilterChain {
    fn default() -> Self {
        Self {
            low_cut: CutFilter::default(),
            peak: Biquad::default(),
            high_cut: CutFilter::default(),
            bypassed: [false; 3],
            sample_rate: 44100.0,
            max_block_size: 0,
        }
    }
}

impl FilterChain {
    /// Clears all delay memory. This is the only place besides [`FilterChain::reset`] where the
    /// history is dropped.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.reset();
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Filters one channel's block in place
    pub fn process(&mut self, samples: &mut [f32]) {
        if !self.is_bypassed(ChainPosition::LowCut) {
            self.low_cut.process(samples);
        }
        if !self.is_bypassed(ChainPosition::Peak) {
            self.peak.process_block(samples);
        }
        if !self.is_bypassed(ChainPosition::HighCut) {
            self.high_cut.process(samples);
        }
    }

    pub fn set_bypassed(&mut self, position: ChainPosition, bypassed: bool) {
        self.bypassed[position.index()] = bypassed;
    }

    pub fn is_bypassed(&self, position: ChainPosition) -> bool {
        self.bypassed[position.index()]
    }

    pub fn update_stage_coefficients(&mut self, coefficients: StageCoefficients) {
        match coefficients {
            StageCoefficients::LowCut(cut) => self.low_cut.update(&cut),
            StageCoefficients::Peak(peak) => self.peak.set_coefficients(peak),
            StageCoefficients::HighCut(cut) => self.high_cut.update(&cut),
        }
    }

    /// Designs every stage from `settings` at the prepared sample rate and applies the bypass
    /// flags. Allocation free, safe on the audio thread.
    pub fn apply_settings(&mut self, settings: &ChainSettings) {
        let sample_rate = self.sample_rate as f64;

        self.set_bypassed(ChainPosition::LowCut, settings.low_cut_bypassed);
        self.set_bypassed(ChainPosition::Peak, settings.peak_bypassed);
        self.set_bypassed(ChainPosition::HighCut, settings.high_cut_bypassed);

        self.update_stage_coefficients(StageCoefficients::LowCut(make_low_cut_filter(
            settings,
            sample_rate,
        )));
        self.update_stage_coefficients(StageCoefficients::Peak(make_peak_filter(
            settings,
            sample_rate,
        )));
        self.update_stage_coefficients(StageCoefficients::HighCut(make_high_cut_filter(
            settings,
            sample_rate,
        )));
    }

    pub fn low_cut(&self) -> &CutFilter {
        &self.low_cut
    }

    pub fn high_cut(&self) -> &CutFilter {
        &self.high_cut
    }

    pub fn peak(&self) -> &Biquad {
        &self.peak
    }

    /// Combined linear magnitude of all non-bypassed stages and sections
    pub fn magnitude_for_frequency(&self, frequency: f64) -> f64 {
        let sample_rate = self.sample_rate as f64;
        let mut magnitude = 1.0;

        if !self.is_bypassed(ChainPosition::LowCut) {
            magnitude *= self.low_cut.magnitude_for_frequency(frequency, sample_rate);
        }
        if !self.is_bypassed(ChainPosition::Peak) {
            magnitude *= self
                .peak
                .coefficients()
                .magnitude_for_frequency(frequency, sample_rate);
        }
        if !self.is_bypassed(ChainPosition::HighCut) {
            magnitude *= self.high_cut.magnitude_for_frequency(frequency, sample_rate);
        }

        magnitude
    }

    pub fn reset(&mut self) {
        self.low_cut.reset();
        self.peak.reset();
        self.high_cut.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Slope;
    use nih_plug::prelude::Enum;
    use std::f32::consts::PI;

    fn prepared_chain(settings: &ChainSettings) -> FilterChain {
        let mut chain = FilterChain::default();
        chain.prepare(48000.0, 512);
        chain.apply_settings(settings);
        chain
    }

    fn sine(frequency: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * frequency * i as f32 / 48000.0).sin())
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn slope_level_activates_matching_sections() {
        for index in 0..4 {
            let settings = ChainSettings {
                low_cut_slope: Slope::from_index(index),
                high_cut_slope: Slope::from_index(3 - index),
                ..ChainSettings::default()
            };
            let chain = prepared_chain(&settings);

            assert_eq!(chain.low_cut().active_sections(), index + 1);
            assert_eq!(chain.high_cut().active_sections(), 4 - index);
            for section in 0..MAX_CUT_SECTIONS {
                assert_eq!(chain.low_cut().is_section_bypassed(section), section > index);
            }
        }
    }

    #[test]
    fn bypassed_stage_contributes_unity() {
        let settings = ChainSettings {
            low_cut_freq: 200.0,
            high_cut_freq: 5000.0,
            peak_gain_db: 12.0,
            ..ChainSettings::default()
        };
        let bypassed = ChainSettings {
            low_cut_bypassed: true,
            peak_bypassed: true,
            high_cut_bypassed: true,
            ..settings
        };

        let chain = prepared_chain(&bypassed);
        for freq in [20.0, 100.0, 750.0, 5000.0, 20000.0] {
            assert_eq!(chain.magnitude_for_frequency(freq), 1.0);
        }

        // Only the peak bypassed: response equals low cut times high cut
        let active = prepared_chain(&settings);
        let peak_off = prepared_chain(&ChainSettings {
            peak_bypassed: true,
            ..settings
        });
        let sr = 48000.0;
        for freq in [50.0, 750.0, 3000.0] {
            let expected = active.low_cut().magnitude_for_frequency(freq, sr)
                * active.high_cut().magnitude_for_frequency(freq, sr);
            assert!((peak_off.magnitude_for_frequency(freq) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn fully_bypassed_chain_passes_audio_unchanged() {
        let mut chain = prepared_chain(&ChainSettings {
            low_cut_bypassed: true,
            peak_bypassed: true,
            high_cut_bypassed: true,
            peak_gain_db: 24.0,
            ..ChainSettings::default()
        });

        let input = sine(440.0, 256);
        let mut output = input.clone();
        chain.process(&mut output);
        assert_eq!(input, output);
    }

    #[test]
    fn low_cut_removes_low_frequencies() {
        let mut chain = prepared_chain(&ChainSettings {
            low_cut_freq: 1000.0,
            low_cut_slope: Slope::Slope48,
            ..ChainSettings::default()
        });

        let mut samples = sine(100.0, 48000);
        chain.process(&mut samples);
        // Skip the transient, then the 100Hz tone should be gone
        assert!(rms(&samples[24000..]) < 1e-3);
    }

    #[test]
    fn memory_persists_across_blocks() {
        let settings = ChainSettings {
            peak_gain_db: 9.0,
            peak_freq: 500.0,
            ..ChainSettings::default()
        };
        let input = sine(500.0, 1024);

        let mut whole = input.clone();
        prepared_chain(&settings).process(&mut whole);

        let mut chain = prepared_chain(&settings);
        let mut split = input;
        let (first, second) = split.split_at_mut(300);
        chain.process(first);
        chain.apply_settings(&settings);
        chain.process(second);

        assert_eq!(whole, split);
    }

    #[test]
    fn prepare_clears_history() {
        let settings = ChainSettings {
            peak_gain_db: 6.0,
            ..ChainSettings::default()
        };
        let mut chain = prepared_chain(&settings);
        let mut noise = sine(750.0, 512);
        chain.process(&mut noise);

        chain.prepare(48000.0, 512);
        let mut silence = vec![0.0; 64];
        chain.process(&mut silence);
        assert!(silence.iter().all(|s| *s == 0.0));
    }
}
