/// Window functions for FFT spectral analysis
///
/// Windows shape the rolling sample window before the transform to reduce spectral leakage.
/// Coefficients are computed once when the transform generator is built, never on the
/// refresh path.
use apodize::{blackman_iter, hanning_iter};
use core::f32::consts::PI;
use libm::cosf;

/// Pre-computed window function data
pub struct WindowData {
    /// Window values [0.0..1.0] that multiply with audio samples, one per transform point
    pub coefficients: Vec<f32>,

    /// Average window value. Windows reduce signal energy (most values < 1.0); dividing by
    /// this restores the amplitude of a bin-centred sine.
    pub coherent_gain: f32,
}

impl WindowData {
    pub fn new(window_type: WindowType, window_size: usize) -> Self {
        let coefficients = window_type.generate(window_size);
        let coherent_gain = coherent_gain(&coefficients);

        Self {
            coefficients,
            coherent_gain,
        }
    }

    /// Multiplies `samples` by the window in place
    pub fn apply(&self, samples: &mut [f32]) {
        for (sample, &coeff) in samples.iter_mut().zip(self.coefficients.iter()) {
            *sample *= coeff;
        }
    }
}

/// Window function types for FFT analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowType {
    /// Good general-purpose balance, -31dB sidelobes
    Hann,
    /// -58dB sidelobes, wider main lobe
    Blackman,
    /// Four term Blackman-Harris, -92dB sidelobes. Keeps quiet bins clean on a -48dB display.
    #[default]
    BlackmanHarris,
}

impl WindowType {
    /// Generate window coefficients for this window type
    pub fn generate(self, window_size: usize) -> Vec<f32> {
        match self {
            Self::Hann => hanning_iter(window_size).map(|w| w as f32).collect(),
            Self::Blackman => blackman_iter(window_size).map(|w| w as f32).collect(),
            Self::BlackmanHarris => generate_blackman_harris_window(window_size),
        }
    }
}

/// Mean of the window coefficients
pub fn coherent_gain(coefficients: &[f32]) -> f32 {
    if coefficients.is_empty() {
        return 1.0;
    }
    coefficients.iter().sum::<f32>() / coefficients.len() as f32
}

/// Generates four term Blackman-Harris coefficients
///
/// w[n] = a0 - a1*cos(2πn/N) + a2*cos(4πn/N) - a3*cos(6πn/N)
/// with a0..a3 = 0.35875, 0.48829, 0.14128, 0.01168
pub fn generate_blackman_harris_window(window_size: usize) -> Vec<f32> {
    const A0: f32 = 0.35875;
    const A1: f32 = 0.48829;
    const A2: f32 = 0.14128;
    const A3: f32 = 0.01168;

    let denominator = window_size.saturating_sub(1).max(1) as f32;

    (0..window_size)
        .map(|i| {
            let position = i as f32 / denominator;
            A0 - A1 * cosf(2.0 * PI * position) + A2 * cosf(4.0 * PI * position)
                - A3 * cosf(6.0 * PI * position)
        })
        .collect()
}
