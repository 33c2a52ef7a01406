//! Filter design. Pure functions from a [`ChainSettings`] snapshot and a sample rate to
//! biquad coefficient sets, plus the analytic magnitude response used by the response curve.

use crate::audio::constants::{db_to_gain, MAX_CUT_SECTIONS};
use crate::params::{ChainSettings, Slope};
use std::f64::consts::PI;

/// Design frequencies are kept below this fraction of the sample rate so the bilinear
/// transform stays well defined at low sample rates.
const NYQUIST_GUARD: f64 = 0.49;

/// One normalized second order section: `a0` is folded into the other taps.
///
/// Coefficient sets are immutable values. A stage is updated by replacing the whole set
/// between blocks, never by patching individual taps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl Default for Coefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Coefficients {
    /// Passes the signal through unchanged
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    fn normalized(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        let inv_a0 = 1.0 / a0;
        Self {
            b0: (b0 * inv_a0) as f32,
            b1: (b1 * inv_a0) as f32,
            b2: (b2 * inv_a0) as f32,
            a1: (a1 * inv_a0) as f32,
            a2: (a2 * inv_a0) as f32,
        }
    }

    /// Bell filter around `frequency`. `gain_factor` is linear, not decibels.
    pub fn peak(sample_rate: f64, frequency: f64, quality: f64, gain_factor: f64) -> Self {
        let a = gain_factor.max(0.0).sqrt();
        let omega = angular_frequency(sample_rate, frequency);
        let alpha = omega.sin() / (2.0 * quality);
        let c2 = -2.0 * omega.cos();
        let alpha_times_a = alpha * a;
        let alpha_over_a = alpha / a;

        Self::normalized(
            1.0 + alpha_times_a,
            c2,
            1.0 - alpha_times_a,
            1.0 + alpha_over_a,
            c2,
            1.0 - alpha_over_a,
        )
    }

    /// Second order high pass section
    pub fn high_pass(sample_rate: f64, frequency: f64, quality: f64) -> Self {
        let omega = angular_frequency(sample_rate, frequency);
        let cos_w = omega.cos();
        let alpha = omega.sin() / (2.0 * quality);

        Self::normalized(
            (1.0 + cos_w) / 2.0,
            -(1.0 + cos_w),
            (1.0 + cos_w) / 2.0,
            1.0 + alpha,
            -2.0 * cos_w,
            1.0 - alpha,
        )
    }

    /// Second order low pass section
    pub fn low_pass(sample_rate: f64, frequency: f64, quality: f64) -> Self {
        let omega = angular_frequency(sample_rate, frequency);
        let cos_w = omega.cos();
        let alpha = omega.sin() / (2.0 * quality);

        Self::normalized(
            (1.0 - cos_w) / 2.0,
            1.0 - cos_w,
            (1.0 - cos_w) / 2.0,
            1.0 + alpha,
            -2.0 * cos_w,
            1.0 - alpha,
        )
    }

    /// |H(e^jw)| at `frequency`
    ///
    /// Evaluates H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
    /// at z = e^(jw) where w = 2*pi*f/fs
    pub fn magnitude_for_frequency(&self, frequency: f64, sample_rate: f64) -> f64 {
        let omega = 2.0 * PI * frequency / sample_rate;
        let (sin_w, cos_w) = omega.sin_cos();
        let (sin_2w, cos_2w) = (2.0 * omega).sin_cos();

        let (b0, b1, b2) = (self.b0 as f64, self.b1 as f64, self.b2 as f64);
        let (a1, a2) = (self.a1 as f64, self.a2 as f64);

        let num_re = b0 + b1 * cos_w + b2 * cos_2w;
        let num_im = -b1 * sin_w - b2 * sin_2w;
        let den_re = 1.0 + a1 * cos_w + a2 * cos_2w;
        let den_im = -a1 * sin_w - a2 * sin_2w;

        ((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im)).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        [self.b0, self.b1, self.b2, self.a1, self.a2]
            .iter()
            .all(|tap| tap.is_finite())
    }
}

fn angular_frequency(sample_rate: f64, frequency: f64) -> f64 {
    let frequency = frequency.clamp(f64::EPSILON, sample_rate * NYQUIST_GUARD);
    2.0 * PI * frequency / sample_rate
}

/// Q of section `index` in an even order Butterworth cascade
fn butterworth_quality(order: usize, index: usize) -> f64 {
    let angle = (2 * index + 1) as f64 * PI / (2 * order) as f64;
    1.0 / (2.0 * angle.cos())
}

/// The sections designed for one cut band. Always carries storage for four sections; only the
/// first `active` are meaningful, the rest stay at identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutCoefficients {
    sections: [Coefficients; MAX_CUT_SECTIONS],
    active: usize,
}

impl CutCoefficients {
    fn design(slope: Slope, design_section: impl Fn(f64) -> Coefficients) -> Self {
        let order = slope.order();
        let mut sections = [Coefficients::IDENTITY; MAX_CUT_SECTIONS];
        for (index, section) in sections.iter_mut().take(slope.sections()).enumerate() {
            *section = design_section(butterworth_quality(order, index));
        }

        Self {
            sections,
            active: slope.sections(),
        }
    }

    pub fn active_sections(&self) -> &[Coefficients] {
        &self.sections[..self.active]
    }

    pub fn len(&self) -> usize {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Coefficients for `section`, `None` when the slope leaves it unused
    pub fn get(&self, section: usize) -> Option<&Coefficients> {
        self.active_sections().get(section)
    }
}

pub fn make_peak_filter(settings: &ChainSettings, sample_rate: f64) -> Coefficients {
    Coefficients::peak(
        sample_rate,
        settings.peak_freq as f64,
        settings.peak_quality as f64,
        db_to_gain(settings.peak_gain_db as f64),
    )
}

/// Butterworth high pass cascade at the low cut frequency
pub fn make_low_cut_filter(settings: &ChainSettings, sample_rate: f64) -> CutCoefficients {
    let frequency = settings.low_cut_freq as f64;
    CutCoefficients::design(settings.low_cut_slope, |quality| {
        Coefficients::high_pass(sample_rate, frequency, quality)
    })
}

/// Butterworth low pass cascade at the high cut frequency
pub fn make_high_cut_filter(settings: &ChainSettings, sample_rate: f64) -> CutCoefficients {
    let frequency = settings.high_cut_freq as f64;
    CutCoefficients::design(settings.high_cut_slope, |quality| {
        Coefficients::low_pass(sample_rate, frequency, quality)
    })
}
