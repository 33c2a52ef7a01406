use crate::audio::constants::{
    GAIN_MAX_DB, GAIN_MIN_DB, MAX_FREQUENCY, MIN_FREQUENCY, QUALITY_MAX, QUALITY_MIN,
};
use nih_plug::prelude::*;

/// Skew 0.25 spreads the audible range evenly across a knob's travel
pub const FREQUENCY_RANGE: FloatRange = FloatRange::Skewed {
    min: MIN_FREQUENCY,
    max: MAX_FREQUENCY,
    factor: 0.25,
};

pub const GAIN_RANGE: FloatRange = FloatRange::Linear {
    min: GAIN_MIN_DB,
    max: GAIN_MAX_DB,
};

pub const QUALITY_RANGE: FloatRange = FloatRange::Linear {
    min: QUALITY_MIN,
    max: QUALITY_MAX,
};

/// Steepness of a cut band. Each step adds one cascaded second order section.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slope {
    #[id = "slope-12"]
    #[name = "12 dB/Oct"]
    Slope12,
    #[id = "slope-24"]
    #[name = "24 dB/Oct"]
    Slope24,
    #[id = "slope-36"]
    #[name = "36 dB/Oct"]
    Slope36,
    #[id = "slope-48"]
    #[name = "48 dB/Oct"]
    Slope48,
}

impl Slope {
    /// Number of active second order sections, 1..=4
    pub fn sections(self) -> usize {
        self.to_index() + 1
    }

    /// Butterworth filter order realised by the active sections
    pub fn order(self) -> usize {
        self.sections() * 2
    }

    pub fn db_per_octave(self) -> f32 {
        12.0 * self.sections() as f32
    }

    /// Display name, e.g. "24 dB/Oct"
    pub fn name(self) -> &'static str {
        Self::variants()[self.to_index()]
    }

    /// Position on a knob's travel, 0.0 for the gentlest slope
    pub fn normalized(self) -> f32 {
        self.to_index() as f32 / (Self::variants().len() - 1) as f32
    }
}

#[derive(Params)]
pub struct SimpleEqParams {
    /// The parameter's ID is used to identify the parameter in the wrapped plugin API. As long as
    /// these IDs remain constant, you can rename and reorder these fields as you wish. The
    /// parameters are exposed to the host in the same order they were defined.
    #[id = "lowcut_freq"]
    pub low_cut_freq: FloatParam,
    #[id = "highcut_freq"]
    pub high_cut_freq: FloatParam,
    #[id = "peak_freq"]
    pub peak_freq: FloatParam,
    /// Stored in decibels, converted to a linear gain only when designing the peak filter
    #[id = "peak_gain"]
    pub peak_gain: FloatParam,
    #[id = "peak_quality"]
    pub peak_quality: FloatParam,

    #[id = "lowcut_slope"]
    pub low_cut_slope: EnumParam<Slope>,
    #[id = "highcut_slope"]
    pub high_cut_slope: EnumParam<Slope>,

    #[id = "lowcut_bypassed"]
    pub low_cut_bypassed: BoolParam,
    #[id = "peak_bypassed"]
    pub peak_bypassed: BoolParam,
    #[id = "highcut_bypassed"]
    pub high_cut_bypassed: BoolParam,

    /// Only affects the display side, the audio path ignores it
    #[id = "analyzer_enabled"]
    pub analyzer_enabled: BoolParam,
}

fn frequency_param(name: &str, default: f32) -> FloatParam {
    FloatParam::new(name, default, FREQUENCY_RANGE)
        .with_step_size(1.0)
        .with_value_to_string(formatters::v2s_f32_hz_then_khz(2))
        .with_string_to_value(formatters::s2v_f32_hz_then_khz())
}

impl Default for SimpleEqParams {
    fn default() -> Self {
        let defaults = ChainSettings::default();

        Self {
            low_cut_freq: frequency_param("LowCut Freq", defaults.low_cut_freq),
            high_cut_freq: frequency_param("HighCut Freq", defaults.high_cut_freq),
            peak_freq: frequency_param("Peak Freq", defaults.peak_freq),
            peak_gain: FloatParam::new("Peak Gain", defaults.peak_gain_db, GAIN_RANGE)
                .with_step_size(0.5)
                .with_unit(" dB")
                .with_value_to_string(formatters::v2s_f32_rounded(1)),
            peak_quality: FloatParam::new("Peak Quality", defaults.peak_quality, QUALITY_RANGE)
                .with_step_size(0.05)
                .with_value_to_string(formatters::v2s_f32_rounded(2)),

            low_cut_slope: EnumParam::new("LowCut Slope", defaults.low_cut_slope),
            high_cut_slope: EnumParam::new("HighCut Slope", defaults.high_cut_slope),

            low_cut_bypassed: BoolParam::new("LowCut Bypassed", defaults.low_cut_bypassed),
            peak_bypassed: BoolParam::new("Peak Bypassed", defaults.peak_bypassed),
            high_cut_bypassed: BoolParam::new("HighCut Bypassed", defaults.high_cut_bypassed),

            analyzer_enabled: BoolParam::new("Analyzer Enabled", true),
        }
    }
}

/// Value snapshot of everything the filter chain depends on.
///
/// Taken once per processing callback on the audio thread and once per dirty refresh tick on
/// the display side. Both sides design their coefficients from the same snapshot type, so the
/// drawn response always matches what the audio thread runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSettings {
    pub low_cut_freq: f32,
    pub high_cut_freq: f32,
    pub peak_freq: f32,
    pub peak_gain_db: f32,
    pub peak_quality: f32,
    pub low_cut_slope: Slope,
    pub high_cut_slope: Slope,
    pub low_cut_bypassed: bool,
    pub peak_bypassed: bool,
    pub high_cut_bypassed: bool,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            low_cut_freq: MIN_FREQUENCY,
            high_cut_freq: MAX_FREQUENCY,
            peak_freq: 750.0,
            peak_gain_db: 0.0,
            peak_quality: 1.0,
            low_cut_slope: Slope::Slope12,
            high_cut_slope: Slope::Slope12,
            low_cut_bypassed: false,
            peak_bypassed: false,
            high_cut_bypassed: false,
        }
    }
}

impl ChainSettings {
    /// Atomic loads only, safe to call from the audio thread
    pub fn from_params(params: &SimpleEqParams) -> Self {
        Self {
            low_cut_freq: params.low_cut_freq.value(),
            high_cut_freq: params.high_cut_freq.value(),
            peak_freq: params.peak_freq.value(),
            peak_gain_db: params.peak_gain.value(),
            peak_quality: params.peak_quality.value(),
            low_cut_slope: params.low_cut_slope.value(),
            high_cut_slope: params.high_cut_slope.value(),
            low_cut_bypassed: params.low_cut_bypassed.value(),
            peak_bypassed: params.peak_bypassed.value(),
            high_cut_bypassed: params.high_cut_bypassed.value(),
        }
        .clamped()
    }

    /// Keeps every design input inside the parameter ranges
    pub fn clamped(mut self) -> Self {
        self.low_cut_freq = self.low_cut_freq.clamp(MIN_FREQUENCY, MAX_FREQUENCY);
        self.high_cut_freq = self.high_cut_freq.clamp(MIN_FREQUENCY, MAX_FREQUENCY);
        self.peak_freq = self.peak_freq.clamp(MIN_FREQUENCY, MAX_FREQUENCY);
        self.peak_gain_db = self.peak_gain_db.clamp(GAIN_MIN_DB, GAIN_MAX_DB);
        self.peak_quality = self.peak_quality.clamp(QUALITY_MIN, QUALITY_MAX);
        self
    }
}
