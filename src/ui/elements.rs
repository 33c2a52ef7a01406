//! Render descriptors.
//!
//! Every visual element is plain data tagged with its kind. [`render`] is the only place that
//! looks at the kind; it turns an element plus a [`Theme`] into backend independent drawing
//! primitives. Drawing those primitives is left to whichever GUI backend hosts the editor.

use crate::analyzer::path::{Path, Point, Rect};
use crate::params::{ChainSettings, Slope, FREQUENCY_RANGE, GAIN_RANGE, QUALITY_RANGE};
use crate::ui::labels::{axis_labels, value_display_string};
use crate::ui::layout::{
    analysis_area, generate_grid_lines, render_area, EditorLayout, GridLineKind,
};
use crate::ui::style::{Color, Theme};
use std::f32::consts::PI;

/// Knob travel, clockwise from 12 o'clock: about 7:30 to 4:30
pub const KNOB_START_ANGLE: f32 = PI * 1.25;
pub const KNOB_END_ANGLE: f32 = PI * 0.75 + 2.0 * PI;

/// Gap at the top of the power symbol's arc
const POWER_ARC_GAP: f32 = 40.0 * PI / 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleStyle {
    /// Band bypass. Toggled means bypassed.
    Power,
    /// Analyser on/off. Toggled means enabled.
    Analyzer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Knob {
    pub name: &'static str,
    /// Position on the knob's travel, 0.0..=1.0
    pub normalized: f32,
    pub value_text: String,
    /// Labels at the start and end of the travel
    pub range_labels: [&'static str; 2],
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Toggle {
    pub style: ToggleStyle,
    pub toggled: bool,
}

/// The response area: grid, labels, analyser traces and the response curve
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseCurveView {
    pub response: Path,
    /// `None` while the analyser is disabled
    pub left_trace: Option<Path>,
    pub right_trace: Option<Path>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Knob(Knob),
    Toggle(Toggle),
    ResponseCurve(ResponseCurveView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Id of the parameter the element controls, or "response_curve"
    pub id: &'static str,
    pub bounds: Rect,
    pub kind: ElementKind,
}

/// Plain values the controls display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    pub settings: ChainSettings,
    pub analyzer_enabled: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            settings: ChainSettings::default(),
            analyzer_enabled: true,
        }
    }
}

fn frequency_knob(name: &'static str, frequency: f32, enabled: bool) -> Knob {
    Knob {
        name,
        normalized: FREQUENCY_RANGE.normalize(frequency),
        value_text: value_display_string(frequency, 0, "Hz"),
        range_labels: ["20Hz", "20kHz"],
        enabled,
    }
}

fn slope_knob(name: &'static str, slope: Slope, enabled: bool) -> Knob {
    Knob {
        name,
        normalized: slope.normalized(),
        value_text: slope.name().to_string(),
        range_labels: ["12", "48"],
        enabled,
    }
}

fn power_toggle(bypassed: bool) -> ElementKind {
    ElementKind::Toggle(Toggle {
        style: ToggleStyle::Power,
        toggled: bypassed,
    })
}

/// Describes the whole editor. Controls of a bypassed band are disabled.
pub fn build_elements(
    layout: &EditorLayout,
    controls: &ControlState,
    response: ResponseCurveView,
) -> Vec<Element> {
    let settings = &controls.settings;
    let low_cut_enabled = !settings.low_cut_bypassed;
    let peak_enabled = !settings.peak_bypassed;
    let high_cut_enabled = !settings.high_cut_bypassed;

    vec![
        Element {
            id: "analyzer_enabled",
            bounds: layout.analyzer_toggle,
            kind: ElementKind::Toggle(Toggle {
                style: ToggleStyle::Analyzer,
                toggled: controls.analyzer_enabled,
            }),
        },
        Element {
            id: "response_curve",
            bounds: layout.response,
            kind: ElementKind::ResponseCurve(response),
        },
        Element {
            id: "lowcut_bypassed",
            bounds: layout.low_cut.bypass,
            kind: power_toggle(settings.low_cut_bypassed),
        },
        Element {
            id: "lowcut_freq",
            bounds: layout.low_cut.frequency,
            kind: ElementKind::Knob(frequency_knob(
                "LowCut Freq",
                settings.low_cut_freq,
                low_cut_enabled,
            )),
        },
        Element {
            id: "lowcut_slope",
            bounds: layout.low_cut.slope,
            kind: ElementKind::Knob(slope_knob(
                "LowCut Slope",
                settings.low_cut_slope,
                low_cut_enabled,
            )),
        },
        Element {
            id: "peak_bypassed",
            bounds: layout.peak.bypass,
            kind: power_toggle(settings.peak_bypassed),
        },
        Element {
            id: "peak_freq",
            bounds: layout.peak.frequency,
            kind: ElementKind::Knob(frequency_knob("Peak Freq", settings.peak_freq, peak_enabled)),
        },
        Element {
            id: "peak_gain",
            bounds: layout.peak.gain,
            kind: ElementKind::Knob(Knob {
                name: "Peak Gain",
                normalized: GAIN_RANGE.normalize(settings.peak_gain_db),
                value_text: value_display_string(settings.peak_gain_db, 1, "dB"),
                range_labels: ["-24dB", "+24dB"],
                enabled: peak_enabled,
            }),
        },
        Element {
            id: "peak_quality",
            bounds: layout.peak.quality,
            kind: ElementKind::Knob(Knob {
                name: "Peak Quality",
                normalized: QUALITY_RANGE.normalize(settings.peak_quality),
                value_text: value_display_string(settings.peak_quality, 2, ""),
                range_labels: ["0.1", "10.0"],
                enabled: peak_enabled,
            }),
        },
        Element {
            id: "highcut_bypassed",
            bounds: layout.high_cut.bypass,
            kind: power_toggle(settings.high_cut_bypassed),
        },
        Element {
            id: "highcut_freq",
            bounds: layout.high_cut.frequency,
            kind: ElementKind::Knob(frequency_knob(
                "HighCut Freq",
                settings.high_cut_freq,
                high_cut_enabled,
            )),
        },
        Element {
            id: "highcut_slope",
            bounds: layout.high_cut.slope,
            kind: ElementKind::Knob(slope_knob(
                "HighCut Slope",
                settings.high_cut_slope,
                high_cut_enabled,
            )),
        },
    ]
}

/// Backend independent drawing commands. Angles are clockwise from 12 o'clock.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        corner_radius: f32,
        color: Color,
        width: f32,
    },
    FillEllipse {
        bounds: Rect,
        color: Color,
    },
    StrokeEllipse {
        bounds: Rect,
        color: Color,
        width: f32,
    },
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f32,
    },
    Arc {
        center: Point,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        color: Color,
        width: f32,
    },
    StrokePath {
        path: Path,
        color: Color,
        width: f32,
    },
    /// `position` is the centre of the text
    Text {
        text: String,
        position: Point,
        size: f32,
        color: Color,
    },
}

/// Renders every element in order
pub fn render_all(elements: &[Element], theme: &Theme) -> Vec<Primitive> {
    elements
        .iter()
        .flat_map(|element| render(element, theme))
        .collect()
}

/// The single dispatcher from element kind to primitives
pub fn render(element: &Element, theme: &Theme) -> Vec<Primitive> {
    match &element.kind {
        ElementKind::Knob(knob) => render_knob(knob, element.bounds, theme),
        ElementKind::Toggle(toggle) => match toggle.style {
            ToggleStyle::Power => render_power_toggle(toggle.toggled, element.bounds, theme),
            ToggleStyle::Analyzer => render_analyzer_toggle(toggle.toggled, element.bounds, theme),
        },
        ElementKind::ResponseCurve(view) => render_response_curve(view, element.bounds, theme),
    }
}

fn point_on_circumference(center: Point, radius: f32, angle: f32) -> Point {
    Point::new(
        center.x + radius * angle.sin(),
        center.y - radius * angle.cos(),
    )
}

fn knob_angle(normalized: f32) -> f32 {
    KNOB_START_ANGLE + normalized.clamp(0.0, 1.0) * (KNOB_END_ANGLE - KNOB_START_ANGLE)
}

/// Dial area of a knob: a square under the top edge, leaving room for the range labels
pub fn knob_dial_bounds(bounds: Rect, text_height: f32) -> Rect {
    let size = (bounds.width.min(bounds.height) - text_height * 2.0).max(0.0);
    Rect::new(
        bounds.x + (bounds.width - size) * 0.5,
        bounds.y + 2.0,
        size,
        size,
    )
}

fn render_knob(knob: &Knob, bounds: Rect, theme: &Theme) -> Vec<Primitive> {
    let text_height = theme.font_size;
    let dial = knob_dial_bounds(bounds, text_height);
    let center = dial.center();
    let radius = dial.width * 0.5;

    let (fill, outline, text) = if knob.enabled {
        (theme.knob_fill, theme.knob_outline, theme.knob_text)
    } else {
        (theme.disabled_fill, theme.disabled_outline, theme.disabled_outline)
    };

    let angle = knob_angle(knob.normalized);
    // Pointer runs from the rim to just outside the value text
    let pointer_inner = (text_height * 1.5).min(radius);

    let mut primitives = vec![
        Primitive::FillEllipse { bounds: dial, color: fill },
        Primitive::StrokeEllipse {
            bounds: dial,
            color: outline,
            width: theme.knob_outline_width,
        },
        Primitive::Line {
            from: point_on_circumference(center, pointer_inner, angle),
            to: point_on_circumference(center, radius, angle),
            color: outline,
            width: 4.0,
        },
        Primitive::Text {
            text: knob.value_text.clone(),
            position: center,
            size: text_height,
            color: text,
        },
    ];

    let label_radius = radius + text_height * 0.5 + 1.0;
    for (label, position) in knob.range_labels.iter().zip([0.0, 1.0]) {
        let anchor = point_on_circumference(center, label_radius, knob_angle(position));
        primitives.push(Primitive::Text {
            text: (*label).to_string(),
            position: Point::new(anchor.x, anchor.y + text_height),
            size: text_height,
            color: theme.knob_range_label,
        });
    }

    primitives.push(Primitive::Text {
        text: knob.name.to_string(),
        position: Point::new(center.x, bounds.bottom() - text_height * 0.5),
        size: text_height * 0.65,
        color: theme.knob_fill,
    });

    primitives
}

fn render_power_toggle(bypassed: bool, bounds: Rect, theme: &Theme) -> Vec<Primitive> {
    let size = bounds.width.min(bounds.height) - 7.0;
    let symbol = bounds.centered_square(size);
    let center = symbol.center();
    let arc_radius = ((size - 8.0) * 0.5).max(0.0);

    let color = if bypassed {
        theme.power_bypassed
    } else {
        theme.power_on
    };
    let width = theme.toggle_stroke_width;

    vec![
        Primitive::Arc {
            center,
            radius: arc_radius,
            start_angle: POWER_ARC_GAP,
            end_angle: 2.0 * PI - POWER_ARC_GAP,
            color,
            width,
        },
        Primitive::Line {
            from: Point::new(center.x, symbol.y),
            to: center,
            color,
            width,
        },
        Primitive::StrokeEllipse {
            bounds: symbol,
            color,
            width,
        },
    ]
}

/// Decorative squiggle drawn inside the analyser toggle
fn analyzer_glyph(bounds: Rect) -> Path {
    let inner = bounds.trimmed(4.0, 4.0, 4.0, 4.0);
    let mut path = Path::new();
    if inner.is_empty() {
        return path;
    }

    let half_height = inner.height * 0.5;
    let mid = inner.y + half_height;
    let steps = inner.width.floor() as usize;
    for step in 0..=steps {
        let x = inner.x + step as f32;
        let t = step as f32;
        let wave = (0.6 * (t * 0.35).sin() + 0.4 * (t * 0.9).cos()).clamp(-1.0, 1.0);
        let y = mid + half_height * wave;
        path.line_to(Point::new(x, y));
    }
    path
}

fn render_analyzer_toggle(enabled: bool, bounds: Rect, theme: &Theme) -> Vec<Primitive> {
    let color = if enabled {
        theme.analyzer_on
    } else {
        theme.analyzer_off
    };

    vec![
        Primitive::StrokeRect {
            rect: bounds,
            corner_radius: 0.0,
            color,
            width: 1.0,
        },
        Primitive::StrokePath {
            path: analyzer_glyph(bounds),
            color,
            width: 1.0,
        },
    ]
}

fn render_response_curve(view: &ResponseCurveView, bounds: Rect, theme: &Theme) -> Vec<Primitive> {
    let analysis = analysis_area(bounds);
    let mut primitives = vec![Primitive::FillRect {
        rect: bounds,
        color: theme.background,
    }];

    primitives.extend(generate_grid_lines(analysis).into_iter().map(|line| {
        let color = match line.kind {
            GridLineKind::Frequency => theme.grid_line,
            GridLineKind::Gain => theme.gain_line,
            GridLineKind::ZeroGain => theme.zero_db_line,
        };
        Primitive::Line {
            from: line.start,
            to: line.end,
            color,
            width: 1.0,
        }
    }));

    primitives.extend(
        axis_labels(bounds, analysis, theme.grid_font_size)
            .into_iter()
            .map(|label| Primitive::Text {
                color: if label.emphasized {
                    theme.zero_db_line
                } else {
                    theme.grid_label
                },
                text: label.text,
                position: label.position,
                size: theme.grid_font_size,
            }),
    );

    for (trace, color) in [
        (&view.left_trace, theme.left_trace),
        (&view.right_trace, theme.right_trace),
    ] {
        if let Some(path) = trace {
            primitives.push(Primitive::StrokePath {
                path: path.clone(),
                color,
                width: theme.trace_width,
            });
        }
    }

    primitives.push(Primitive::StrokeRect {
        rect: render_area(bounds),
        corner_radius: theme.frame_corner_radius,
        color: theme.frame,
        width: 1.0,
    });
    primitives.push(Primitive::StrokePath {
        path: view.response.clone(),
        color: theme.response_curve,
        width: theme.response_curve_width,
    });

    primitives
}
