/// RGBA colour, components in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

/// Colours and stroke sizes for every element.
///
/// A theme is a plain value handed to each render call; nothing reads a global style. The
/// [`Default`] theme is the stock look.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Color,

    // Response area
    pub frame: Color,
    pub frame_corner_radius: f32,
    pub grid_line: Color,
    pub gain_line: Color,
    pub zero_db_line: Color,
    pub grid_label: Color,
    pub response_curve: Color,
    pub response_curve_width: f32,
    pub left_trace: Color,
    pub right_trace: Color,
    pub trace_width: f32,

    // Knobs
    pub knob_fill: Color,
    pub knob_outline: Color,
    pub knob_text: Color,
    pub knob_range_label: Color,
    pub knob_outline_width: f32,
    pub disabled_fill: Color,
    pub disabled_outline: Color,

    // Toggles
    pub power_on: Color,
    pub power_bypassed: Color,
    pub analyzer_on: Color,
    pub analyzer_off: Color,
    pub toggle_stroke_width: f32,

    pub font_size: f32,
    pub grid_font_size: f32,
}

impl Default for Theme {
    fn default() -> Self {
        let orange = Color::from_rgb8(255, 155, 64);
        let sand = Color::from_rgb8(232, 194, 159);
        let red_orange = Color::from_rgb8(232, 92, 26);
        let dim_grey = Color::from_rgb8(105, 105, 105);
        let dark_grey = Color::from_rgb8(169, 169, 169);
        let grey = Color::from_rgb8(128, 128, 128);
        let light_grey = Color::from_rgb8(211, 211, 211);

        Self {
            background: Color::from_rgb(0.0, 0.0, 0.0),

            frame: orange,
            frame_corner_radius: 4.0,
            grid_line: dim_grey,
            gain_line: dark_grey,
            zero_db_line: sand,
            grid_label: light_grey,
            response_curve: Color::from_rgb(1.0, 1.0, 1.0),
            response_curve_width: 2.0,
            left_trace: Color::from_rgb8(240, 128, 128),
            right_trace: Color::from_rgb8(255, 255, 224),
            trace_width: 1.0,

            knob_fill: sand,
            knob_outline: orange,
            knob_text: red_orange,
            knob_range_label: orange,
            knob_outline_width: 3.0,
            disabled_fill: dark_grey,
            disabled_outline: grey,

            power_on: red_orange,
            power_bypassed: dim_grey,
            analyzer_on: sand,
            analyzer_off: dim_grey,
            toggle_stroke_width: 2.0,

            font_size: 14.0,
            grid_font_size: 10.0,
        }
    }
}
