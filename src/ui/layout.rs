use crate::analyzer::path::{Point, Rect};
use crate::analyzer::path_generator::{db_to_y, frequency_to_x};
use crate::audio::constants::{
    FREQUENCY_MARKERS, GAIN_MARKERS, RESPONSE_MAX_DB, RESPONSE_MIN_DB,
};

/// Height of the strip holding the analyser toggle, and of every bypass toggle
const TOGGLE_HEIGHT: f32 = 25.0;
const ANALYZER_TOGGLE_WIDTH: f32 = 100.0;
const ANALYZER_TOGGLE_X: f32 = 5.0;
const SPACING: f32 = 5.0;
/// Share of the remaining height given to the response area
const RESPONSE_HEIGHT_RATIO: f32 = 0.25;

/// Room for the labels around the framed render area
const RENDER_TRIM_TOP: f32 = 12.0;
const RENDER_TRIM_BOTTOM: f32 = 5.0;
const RENDER_TRIM_SIDES: f32 = 20.0;
/// Gap between the frame and the plotted area
const ANALYSIS_TRIM: f32 = 4.0;

/// Bounds of one band's controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutBandLayout {
    pub bypass: Rect,
    pub frequency: Rect,
    pub slope: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakBandLayout {
    pub bypass: Rect,
    pub frequency: Rect,
    pub gain: Rect,
    pub quality: Rect,
}

/// Where everything sits in the editor window.
///
/// Top to bottom: analyser toggle strip, response area (a quarter of what is left), then three
/// columns of controls: low cut (a third), peak, high cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorLayout {
    pub bounds: Rect,
    pub analyzer_toggle: Rect,
    pub response: Rect,
    pub low_cut: CutBandLayout,
    pub peak: PeakBandLayout,
    pub high_cut: CutBandLayout,
}

impl EditorLayout {
    pub fn new(width: f32, height: f32) -> Self {
        let bounds = Rect::new(0.0, 0.0, width, height);
        let mut remaining = bounds;

        let mut analyzer_toggle = remaining.remove_from_top(TOGGLE_HEIGHT);
        analyzer_toggle.x = ANALYZER_TOGGLE_X;
        analyzer_toggle.width = ANALYZER_TOGGLE_WIDTH.min(width);
        analyzer_toggle.remove_from_top(2.0);
        remaining.remove_from_top(SPACING);

        let response = remaining.remove_from_top(remaining.height * RESPONSE_HEIGHT_RATIO);
        remaining.remove_from_top(SPACING);

        let mut low_cut_area = remaining.remove_from_left(remaining.width * 0.33);
        let mut high_cut_area = remaining.remove_from_right(remaining.width * 0.5);
        let mut peak_area = remaining;

        let low_cut = CutBandLayout {
            bypass: low_cut_area.remove_from_top(TOGGLE_HEIGHT),
            frequency: low_cut_area.remove_from_top(low_cut_area.height * 0.5),
            slope: low_cut_area,
        };
        let high_cut = CutBandLayout {
            bypass: high_cut_area.remove_from_top(TOGGLE_HEIGHT),
            frequency: high_cut_area.remove_from_top(high_cut_area.height * 0.5),
            slope: high_cut_area,
        };
        let peak = PeakBandLayout {
            bypass: peak_area.remove_from_top(TOGGLE_HEIGHT),
            frequency: peak_area.remove_from_top(peak_area.height * 0.33),
            gain: peak_area.remove_from_top(peak_area.height * 0.5),
            quality: peak_area,
        };

        Self {
            bounds,
            analyzer_toggle,
            response,
            low_cut,
            peak,
            high_cut,
        }
    }

    /// Framed part of the response area
    pub fn render_area(&self) -> Rect {
        render_area(self.response)
    }

    /// Where the response curve and the analyser traces are plotted
    pub fn analysis_area(&self) -> Rect {
        analysis_area(self.response)
    }
}

pub fn render_area(response: Rect) -> Rect {
    response.trimmed(
        RENDER_TRIM_TOP,
        RENDER_TRIM_BOTTOM,
        RENDER_TRIM_SIDES,
        RENDER_TRIM_SIDES,
    )
}

pub fn analysis_area(response: Rect) -> Rect {
    render_area(response).trimmed(ANALYSIS_TRIM, ANALYSIS_TRIM, 0.0, 0.0)
}

/// Grid line data for the response area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub start: Point,
    pub end: Point,
    pub kind: GridLineKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLineKind {
    Frequency,
    Gain,
    /// The 0dB line
    ZeroGain,
}

/// Vertical lines at the frequency markers and horizontal lines at the gain markers
pub fn generate_grid_lines(analysis: Rect) -> Vec<GridLine> {
    let vertical = FREQUENCY_MARKERS.iter().map(|&frequency| {
        let x = frequency_to_x(frequency, analysis);
        GridLine {
            start: Point::new(x, analysis.y),
            end: Point::new(x, analysis.bottom()),
            kind: GridLineKind::Frequency,
        }
    });

    let horizontal = GAIN_MARKERS.iter().map(|&gain_db| {
        let y = db_to_y(gain_db as f64, RESPONSE_MIN_DB, RESPONSE_MAX_DB, analysis);
        GridLine {
            start: Point::new(analysis.x, y),
            end: Point::new(analysis.right(), y),
            kind: if gain_db == 0.0 {
                GridLineKind::ZeroGain
            } else {
                GridLineKind::Gain
            },
        }
    });

    vertical.chain(horizontal).collect()
}
