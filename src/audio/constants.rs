/// Audio processing constants and helper functions
/// Separated from the visual theme for better organization

/// Frequency range constants, shared by every frequency parameter and both displays
pub const MIN_FREQUENCY: f32 = 20.0;
pub const MAX_FREQUENCY: f32 = 20000.0;

/// Peak band gain range
pub const GAIN_MIN_DB: f32 = -24.0;
pub const GAIN_MAX_DB: f32 = 24.0;

/// Peak band quality range
pub const QUALITY_MIN: f32 = 0.1;
pub const QUALITY_MAX: f32 = 10.0;

/// Response curve display range (dB), bottom to top
pub const RESPONSE_MIN_DB: f64 = -24.0;
pub const RESPONSE_MAX_DB: f64 = 24.0;

/// Bottom of the analyser display, treated as minus infinity
pub const ANALYZER_FLOOR_DB: f32 = -48.0;

/// Floor used when converting a gain of zero to decibels
pub const MINUS_INFINITY_DB: f64 = -100.0;

/// 2^11 = 2048 point transform, ~23.4Hz bins at 48kHz
pub const FFT_ORDER: usize = 11;
pub const FFT_SIZE: usize = 1 << FFT_ORDER;

/// Number of complete blocks a channel FIFO holds before dropping the oldest
pub const FIFO_CAPACITY: usize = 30;

/// Number of magnitude blocks the transform generator keeps queued
pub const FFT_QUEUE_CAPACITY: usize = 30;

/// Largest block a channel FIFO slot can carry
pub const MAX_BLOCK_SIZE: usize = 8192;

/// Display refresh rate of the analyser task
pub const REFRESH_RATE_HZ: u32 = 60;

/// Every other bin is plotted on the analyser trace
pub const PATH_RESOLUTION: usize = 2;

/// Default editor size, width x height
pub const EDITOR_WIDTH: u32 = 600;
pub const EDITOR_HEIGHT: u32 = 500;

/// Number of cascaded second order sections in a cut band
pub const MAX_CUT_SECTIONS: usize = 4;

// === HELPER FUNCTIONS ===

/// Convert frequency to logarithmic position (0.0 at 20Hz, 1.0 at 20kHz)
pub fn freq_to_log_position(freq: f32) -> f32 {
    (freq / MIN_FREQUENCY).log10() / (MAX_FREQUENCY / MIN_FREQUENCY).log10()
}

/// Inverse of [`freq_to_log_position`]
pub fn log_position_to_freq(position: f32) -> f32 {
    MIN_FREQUENCY * (MAX_FREQUENCY / MIN_FREQUENCY).powf(position)
}

/// Linear gain to decibels, with `minus_infinity_db` for silence
pub fn gain_to_db(gain: f64, minus_infinity_db: f64) -> f64 {
    if gain > 0.0 {
        (20.0 * gain.log10()).max(minus_infinity_db)
    } else {
        minus_infinity_db
    }
}

/// Decibels to linear gain
pub fn db_to_gain(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Map `value` from `[source_min, source_max]` onto `[target_min, target_max]`
pub fn map_range(
    value: f64,
    source_min: f64,
    source_max: f64,
    target_min: f64,
    target_max: f64,
) -> f64 {
    target_min + (value - source_min) / (source_max - source_min) * (target_max - target_min)
}

/// Frequency grid for the response area
pub const FREQUENCY_MARKERS: &[f32] = &[
    20.0, 50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0, 20000.0,
];

/// Gain grid for the response area
pub const GAIN_MARKERS: &[f32] = &[-24.0, -12.0, 0.0, 12.0, 24.0];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_position_covers_the_audible_range() {
        assert!(freq_to_log_position(MIN_FREQUENCY).abs() < 1e-6);
        assert!((freq_to_log_position(MAX_FREQUENCY) - 1.0).abs() < 1e-6);

        let freq = log_position_to_freq(freq_to_log_position(1000.0));
        assert!((freq - 1000.0).abs() < 0.1);
    }

    #[test]
    fn silence_converts_to_the_floor() {
        assert_eq!(gain_to_db(0.0, MINUS_INFINITY_DB), MINUS_INFINITY_DB);
        assert_eq!(gain_to_db(1e-12, -48.0), -48.0);
        assert!((gain_to_db(db_to_gain(6.0), MINUS_INFINITY_DB) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn map_range_inverts_for_screen_coordinates() {
        // -24dB at the bottom (y = 100), +24dB at the top (y = 0)
        assert_eq!(map_range(-24.0, -24.0, 24.0, 100.0, 0.0), 100.0);
        assert_eq!(map_range(24.0, -24.0, 24.0, 100.0, 0.0), 0.0);
        assert_eq!(map_range(0.0, -24.0, 24.0, 100.0, 0.0), 50.0);
    }
}
