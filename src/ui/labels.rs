//! Text shown around the response area and inside the knobs.

use crate::analyzer::path::{Point, Rect};
use crate::analyzer::path_generator::{db_to_y, frequency_to_x};
use crate::audio::constants::{
    FREQUENCY_MARKERS, GAIN_MARKERS, RESPONSE_MAX_DB, RESPONSE_MIN_DB,
};

/// Offset between the response scale and the analyser scale drawn on the opposite side
const ANALYZER_SCALE_OFFSET_DB: f32 = 24.0;

/// Grid label for a frequency marker: "20Hz", "500Hz", "1kHz", "20kHz"
pub fn frequency_label(frequency: f32) -> String {
    if frequency >= 1000.0 {
        format!("{}kHz", frequency / 1000.0)
    } else {
        format!("{frequency}Hz")
    }
}

/// Response scale label, positive values carry a sign: "+12", "0", "-24"
pub fn gain_label(gain_db: f32) -> String {
    if gain_db > 0.0 {
        format!("+{gain_db}")
    } else {
        format!("{gain_db}")
    }
}

/// Analyser scale label for the gridline at `gain_db` on the response scale
pub fn analyzer_label(gain_db: f32) -> String {
    format!("{}", gain_db - ANALYZER_SCALE_OFFSET_DB)
}

/// Text inside a knob. Values from 1000 up are shown in thousands with two decimals and a
/// "k" prefix on the unit. Smaller values keep up to `max_decimals` digits, trailing zeros are
/// dropped.
pub fn value_display_string(value: f32, max_decimals: usize, suffix: &str) -> String {
    let mut text = if value >= 1000.0 {
        format!("{:.2}", value / 1000.0)
    } else {
        trimmed_decimal(value, max_decimals)
    };

    if !suffix.is_empty() {
        text.push(' ');
        if value >= 1000.0 {
            text.push('k');
        }
        text.push_str(suffix);
    }
    text
}

/// "6.50" -> "6.5", "2.00" -> "2", "-0.0" -> "0"
fn trimmed_decimal(value: f32, max_decimals: usize) -> String {
    let mut text = format!("{value:.max_decimals$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text.remove(0);
    }
    text
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAnchor {
    /// Above the response area, centred on a frequency gridline
    Top,
    /// Right of the response area, response scale
    Right,
    /// Left of the response area, analyser scale
    Left,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub text: String,
    /// Centre of the text
    pub position: Point,
    pub anchor: LabelAnchor,
    /// The 0dB label is highlighted like its gridline
    pub emphasized: bool,
}

/// Every axis label for a response component with outer bounds `component` and analysis area
/// `analysis`
pub fn axis_labels(component: Rect, analysis: Rect, font_size: f32) -> Vec<AxisLabel> {
    let mut labels = Vec::with_capacity(FREQUENCY_MARKERS.len() + GAIN_MARKERS.len() * 2);
    let top_y = component.y + 1.0 + font_size * 0.5;

    labels.extend(FREQUENCY_MARKERS.iter().map(|&frequency| AxisLabel {
        text: frequency_label(frequency),
        position: Point::new(frequency_to_x(frequency, analysis), top_y),
        anchor: LabelAnchor::Top,
        emphasized: false,
    }));

    for &gain_db in GAIN_MARKERS {
        let y = db_to_y(gain_db as f64, RESPONSE_MIN_DB, RESPONSE_MAX_DB, analysis);
        labels.push(AxisLabel {
            text: gain_label(gain_db),
            position: Point::new(component.right() - font_size, y),
            anchor: LabelAnchor::Right,
            emphasized: gain_db == 0.0,
        });
        labels.push(AxisLabel {
            text: analyzer_label(gain_db),
            position: Point::new(component.x + font_size, y),
            anchor: LabelAnchor::Left,
            emphasized: false,
        });
    }

    labels
}
