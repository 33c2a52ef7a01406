use crate::analyzer::path::{Path, Point, Rect};
use crate::audio::constants::{
    freq_to_log_position, map_range, MAX_FREQUENCY, MIN_FREQUENCY, PATH_RESOLUTION,
};
use std::collections::VecDeque;

/// Horizontal position of `frequency` inside `bounds`, log scaled over 20Hz..20kHz.
/// Shared by the analyser trace, the response curve and the grid so they overlay exactly.
pub fn frequency_to_x(frequency: f32, bounds: Rect) -> f32 {
    bounds.x + bounds.width * freq_to_log_position(frequency)
}

/// Vertical position of `db` when `[min_db, max_db]` spans the height of `bounds`
pub fn db_to_y(db: f64, min_db: f64, max_db: f64, bounds: Rect) -> f32 {
    map_range(db, min_db, max_db, bounds.bottom() as f64, bounds.y as f64) as f32
}

/// Turns magnitude blocks into analyser traces.
///
/// Generated paths are queued with the same bounded, drop-oldest policy as the transform
/// generator; the display only ever draws the newest one.
pub struct AnalyzerPathGenerator {
    paths: VecDeque<Path>,
    capacity: usize,
}

impl AnalyzerPathGenerator {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            paths: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Builds one trace from `render_data` (dB per bin) and queues it.
    ///
    /// `floor_db` lands on the bottom edge of `bounds` and 0dB on the top edge. Every
    /// `PATH_RESOLUTION`th bin from bin 1 is plotted; bins outside 20Hz..20kHz and non finite
    /// magnitudes are skipped.
    pub fn generate_path(
        &mut self,
        render_data: &[f32],
        bounds: Rect,
        fft_size: usize,
        bin_width: f32,
        floor_db: f32,
    ) {
        let num_bins = (fft_size / 2).min(render_data.len());
        if num_bins == 0 {
            return;
        }

        let map_y = |db: f32| db_to_y(db as f64, floor_db as f64, 0.0, bounds);

        let mut path = Path::with_capacity(num_bins / PATH_RESOLUTION + 1);

        let start_y = map_y(render_data[0]);
        path.move_to(Point::new(
            bounds.x,
            if start_y.is_finite() { start_y } else { bounds.bottom() },
        ));

        for bin in (1..num_bins).step_by(PATH_RESOLUTION) {
            let bin_freq = bin as f32 * bin_width;
            if !(MIN_FREQUENCY..=MAX_FREQUENCY).contains(&bin_freq) {
                continue;
            }

            let y = map_y(render_data[bin]);
            if !y.is_finite() {
                continue;
            }

            path.line_to(Point::new(frequency_to_x(bin_freq, bounds).floor(), y));
        }

        if self.paths.len() >= self.capacity {
            self.paths.pop_front();
        }
        self.paths.push_back(path);
    }

    pub fn num_paths_available(&self) -> usize {
        self.paths.len()
    }

    /// Oldest queued path
    pub fn get_path(&mut self) -> Option<Path> {
        self.paths.pop_front()
    }

    /// Newest queued path; everything older is discarded
    pub fn take_latest(&mut self) -> Option<Path> {
        let latest = self.paths.pop_back();
        self.paths.clear();
        latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR: f32 = -48.0;

    #[test]
    fn audible_range_spans_the_full_width() {
        for width in [1.0, 300.0, 555.0, 4096.0] {
            let bounds = Rect::new(20.0, 16.0, width, 100.0);
            assert!((frequency_to_x(20.0, bounds) - bounds.x).abs() < 1e-3);
            assert!((frequency_to_x(20000.0, bounds) - bounds.right()).abs() < 1e-3 * width);
        }
    }

    #[test]
    fn floor_maps_to_bottom_and_zero_db_to_top() {
        let bounds = Rect::new(0.0, 10.0, 200.0, 100.0);
        let mut generator = AnalyzerPathGenerator::new(2);

        let mut data = vec![FLOOR; 1024];
        data[85] = 0.0;
        generator.generate_path(&data, bounds, 2048, 48000.0 / 2048.0, FLOOR);

        let path = generator.get_path().unwrap();
        let ys: Vec<f32> = path.points().map(|p| p.y).collect();
        assert!(ys.iter().all(|y| (10.0..=110.0).contains(y)));
        assert!(ys.contains(&10.0));
        assert!(ys.contains(&110.0));
    }

    #[test]
    fn plotted_bins_stay_inside_the_bounds_horizontally() {
        let bounds = Rect::new(20.0, 0.0, 560.0, 100.0);
        let mut generator = AnalyzerPathGenerator::new(1);
        let data = vec![-12.0; 1024];

        generator.generate_path(&data, bounds, 2048, 44100.0 / 2048.0, FLOOR);
        let path = generator.take_latest().unwrap();

        // Start point plus every other bin between 20Hz and 20kHz
        assert!(path.len() > 400);
        let xs: Vec<f32> = path.points().map(|p| p.x).collect();
        assert!(xs.iter().all(|x| *x >= bounds.x && *x <= bounds.right()));
        assert!(xs.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn non_finite_magnitudes_are_skipped() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut generator = AnalyzerPathGenerator::new(1);

        let clean = vec![-20.0; 64];
        let mut dirty = clean.clone();
        dirty[5] = f32::NAN;
        dirty[0] = f32::NEG_INFINITY;

        generator.generate_path(&clean, bounds, 128, 400.0, FLOOR);
        let clean_len = generator.take_latest().unwrap().len();
        generator.generate_path(&dirty, bounds, 128, 400.0, FLOOR);
        let dirty_path = generator.take_latest().unwrap();

        assert_eq!(dirty_path.len(), clean_len - 1);
        assert_eq!(dirty_path.elements()[0].point().y, bounds.bottom());
    }

    #[test]
    fn only_newest_paths_are_kept() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut generator = AnalyzerPathGenerator::new(2);

        for level in [-40.0, -30.0, -20.0] {
            generator.generate_path(&vec![level; 64], bounds, 128, 400.0, FLOOR);
        }
        assert_eq!(generator.num_paths_available(), 2);

        let newest = generator.take_latest().unwrap();
        let expected_y = db_to_y(-20.0, FLOOR as f64, 0.0, bounds);
        assert!(newest.points().skip(1).all(|p| p.y == expected_y));
        assert_eq!(generator.num_paths_available(), 0);
    }
}
