use crate::audio::constants::{ANALYZER_FLOOR_DB, FFT_QUEUE_CAPACITY, FFT_SIZE, REFRESH_RATE_HZ};
use crate::audio::window_functions::WindowType;
use std::time::Duration;

/// Knobs of the display side pipeline. The plugin always runs with [`Default`]; tests build
/// smaller pipelines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerConfig {
    pub fft_size: usize,
    pub window: WindowType,
    /// Magnitude blocks and paths kept before the oldest is dropped
    pub queue_capacity: usize,
    /// Bottom of the analyser display
    pub floor_db: f32,
    pub refresh_rate_hz: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: FFT_SIZE,
            window: WindowType::default(),
            queue_capacity: FFT_QUEUE_CAPACITY,
            floor_db: ANALYZER_FLOOR_DB,
            refresh_rate_hz: REFRESH_RATE_HZ,
        }
    }
}

impl AnalyzerConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.refresh_rate_hz.max(1) as f64)
    }
}
