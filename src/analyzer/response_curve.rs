use crate::analyzer::path::{Path, Point, Rect};
use crate::analyzer::path_generator::db_to_y;
use crate::audio::constants::{
    gain_to_db, log_position_to_freq, MINUS_INFINITY_DB, RESPONSE_MAX_DB, RESPONSE_MIN_DB,
};
use crate::audio::filter_chain::FilterChain;
use crate::params::ChainSettings;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Display side copy of the filter chain, used only to evaluate the analytic response.
///
/// Parameter listeners raise the shared dirty flag; [`ResponseCurve::refresh_if_dirty`] clears it
/// with a compare-and-set and redesigns the chain, so a burst of parameter changes between two
/// refresh ticks costs one redesign.
pub struct ResponseCurve {
    chain: FilterChain,
    settings: ChainSettings,
    dirty: Arc<AtomicBool>,
}

impl ResponseCurve {
    pub fn new(dirty: Arc<AtomicBool>) -> Self {
        let mut curve = Self {
            chain: FilterChain::default(),
            settings: ChainSettings::default(),
            dirty,
        };
        let sample_rate = curve.chain.sample_rate();
        curve.update_chain(&ChainSettings::default(), sample_rate);
        curve
    }

    pub fn dirty_flag(&self) -> Arc<AtomicBool> {
        self.dirty.clone()
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Redesigns the chain from `settings` at `sample_rate`
    pub fn update_chain(&mut self, settings: &ChainSettings, sample_rate: f32) {
        if sample_rate != self.chain.sample_rate() {
            self.chain.prepare(sample_rate, 0);
        }
        self.chain.apply_settings(settings);
        self.settings = *settings;
    }

    /// Clears the dirty flag and redesigns from a fresh snapshot. Returns whether anything was
    /// done; `settings` is only read when the flag was set.
    pub fn refresh_if_dirty(
        &mut self,
        settings: impl FnOnce() -> ChainSettings,
        sample_rate: f32,
    ) -> bool {
        if self
            .dirty
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return false;
        }

        self.update_chain(&settings(), sample_rate);
        true
    }

    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    pub fn chain(&self) -> &FilterChain {
        &self.chain
    }

    /// Combined response at `frequency` in dB. The product of all non-bypassed stages is
    /// converted once, silence reads as -100dB.
    pub fn magnitude_db(&self, frequency: f64) -> f64 {
        gain_to_db(
            self.chain.magnitude_for_frequency(frequency),
            MINUS_INFINITY_DB,
        )
    }

    /// One response value per pixel column of `bounds`, log spaced so the first column is 20Hz
    /// and the last 20kHz
    pub fn magnitudes_db(&self, bounds: Rect) -> Vec<f64> {
        column_positions(bounds)
            .map(|position| self.magnitude_db(log_position_to_freq(position) as f64))
            .collect()
    }

    /// Response curve mapped so -24dB sits on the bottom edge and +24dB on the top edge
    pub fn build_path(&self, bounds: Rect) -> Path {
        let mut path = Path::new();
        for (position, db) in column_positions(bounds).zip(self.magnitudes_db(bounds)) {
            let x = bounds.x + bounds.width * position;
            path.line_to(Point::new(
                x,
                db_to_y(db, RESPONSE_MIN_DB, RESPONSE_MAX_DB, bounds),
            ));
        }
        path
    }
}

/// Normalized log positions of every pixel column, both ends included
fn column_positions(bounds: Rect) -> impl Iterator<Item = f32> {
    let columns = bounds.width.max(0.0).floor() as usize;
    let last = columns.saturating_sub(1).max(1) as f32;
    (0..columns).map(move |column| column as f32 / last)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48000.0;

    fn curve_with(settings: ChainSettings) -> ResponseCurve {
        let mut curve = ResponseCurve::new(Arc::new(AtomicBool::new(false)));
        curve.update_chain(&settings, SAMPLE_RATE);
        curve
    }

    fn boosted_peak() -> ChainSettings {
        ChainSettings {
            peak_freq: 750.0,
            peak_gain_db: 6.0,
            peak_quality: 1.0,
            ..ChainSettings::default()
        }
    }

    #[test]
    fn peak_boost_shows_near_six_db_and_flat_ends() {
        let curve = curve_with(boosted_peak());
        let bounds = Rect::new(0.0, 0.0, 1000.0, 200.0);
        let magnitudes = curve.magnitudes_db(bounds);
        assert_eq!(magnitudes.len(), 1000);

        let (max_column, max_db) = magnitudes
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, db)| if db > best.1 { (i, db) } else { best });
        let max_freq = log_position_to_freq(max_column as f32 / 999.0);

        assert!((max_db - 6.0).abs() < 0.1, "{max_db}");
        assert!((max_freq - 750.0).abs() < 750.0 * 0.02, "{max_freq}");
        assert!((curve.magnitude_db(750.0) - 6.0).abs() < 0.05);

        // Cut bands sit at the very edges of the range, so the ends are within their -3dB point
        for db in [magnitudes[0], magnitudes[999]] {
            assert!(db > -3.5 && db < 0.5, "{db}");
        }
    }

    #[test]
    fn peak_bypass_flattens_only_the_peak_band() {
        let shaped = ChainSettings {
            low_cut_freq: 80.0,
            high_cut_freq: 8000.0,
            ..boosted_peak()
        };
        let active = curve_with(shaped);
        let bypassed = curve_with(ChainSettings {
            peak_bypassed: true,
            ..shaped
        });

        let sr = SAMPLE_RATE as f64;
        for freq in [40.0, 80.0, 300.0, 750.0, 2000.0, 8000.0, 16000.0] {
            let cuts = active.chain().low_cut().magnitude_for_frequency(freq, sr)
                * active.chain().high_cut().magnitude_for_frequency(freq, sr);
            let expected = gain_to_db(cuts, MINUS_INFINITY_DB);
            assert!((bypassed.magnitude_db(freq) - expected).abs() < 1e-9);
        }
        assert!(bypassed.magnitude_db(750.0).abs() < 0.1);
        assert!(active.magnitude_db(750.0) > 5.5);
    }

    #[test]
    fn path_spans_bounds_and_maps_zero_db_to_the_middle() {
        let curve = curve_with(ChainSettings {
            low_cut_bypassed: true,
            high_cut_bypassed: true,
            ..ChainSettings::default()
        });
        let bounds = Rect::new(20.0, 16.0, 560.0, 96.0);
        let path = curve.build_path(bounds);

        assert_eq!(path.len(), 560);
        let points: Vec<Point> = path.points().collect();
        assert_eq!(points[0].x, bounds.x);
        assert!((points[559].x - bounds.right()).abs() < 1e-3);

        let middle = bounds.y + bounds.height * 0.5;
        assert!(points.iter().all(|p| (p.y - middle).abs() < 1e-3));
    }

    #[test]
    fn dirty_flag_triggers_exactly_one_redesign() {
        let dirty = Arc::new(AtomicBool::new(false));
        let mut curve = ResponseCurve::new(dirty.clone());

        assert!(!curve.refresh_if_dirty(boosted_peak, SAMPLE_RATE));
        assert_eq!(curve.settings(), &ChainSettings::default());

        dirty.store(true, Ordering::Release);
        assert!(curve.refresh_if_dirty(boosted_peak, SAMPLE_RATE));
        assert_eq!(curve.settings(), &boosted_peak());
        assert!(!dirty.load(Ordering::Acquire));

        assert!(!curve.refresh_if_dirty(ChainSettings::default, SAMPLE_RATE));
        assert_eq!(curve.settings(), &boosted_peak());
    }

    #[test]
    fn empty_bounds_give_an_empty_path() {
        let curve = curve_with(ChainSettings::default());
        assert!(curve.build_path(Rect::new(0.0, 0.0, 0.0, 100.0)).is_empty());
    }
}
