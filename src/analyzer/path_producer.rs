use crate::analyzer::config::AnalyzerConfig;
use crate::analyzer::path::{Path, Rect};
use crate::analyzer::path_generator::AnalyzerPathGenerator;
use crate::audio::fft_data_generator::FftDataGenerator;
use crate::audio::sample_fifo::SampleFifoConsumer;

/// One channel's analyser pipeline: FIFO -> transform generator -> path generator.
///
/// Owns the consumer end of the channel FIFO, so there is exactly one of these per channel.
pub struct PathProducer {
    fifo: SampleFifoConsumer,
    fft_data_generator: FftDataGenerator,
    path_generator: AnalyzerPathGenerator,
    floor_db: f32,

    // Reused for every popped block
    incoming: Vec<f32>,
    path: Path,
}

impl PathProducer {
    pub fn new(fifo: SampleFifoConsumer, config: &AnalyzerConfig) -> Self {
        Self {
            fifo,
            fft_data_generator: FftDataGenerator::new(
                config.fft_size,
                config.window,
                config.queue_capacity,
            ),
            path_generator: AnalyzerPathGenerator::new(config.queue_capacity),
            floor_db: config.floor_db,
            incoming: Vec::new(),
            path: Path::new(),
        }
    }

    /// Drains every complete block from the FIFO in order, transforms them and keeps the trace
    /// of the newest spectrum. Never blocks; with no new audio the previous trace stays.
    pub fn process(&mut self, bounds: Rect, sample_rate: f32) {
        while self.fifo.pop_into(&mut self.incoming) {
            self.fft_data_generator
                .push_samples(&self.incoming, self.floor_db);
        }

        let fft_size = self.fft_data_generator.fft_size();
        let bin_width = self.fft_data_generator.bin_width(sample_rate);
        for fft_data in self.fft_data_generator.drain_fft_data() {
            self.path_generator
                .generate_path(&fft_data, bounds, fft_size, bin_width, self.floor_db);
        }

        if let Some(path) = self.path_generator.take_latest() {
            self.path = path;
        }
    }

    /// Latest analyser trace, empty until the first block arrived
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forgets the current trace and rolling window, e.g. when the analyser is switched off
    pub fn clear(&mut self) {
        self.fft_data_generator.reset();
        self.path.clear();
    }

    pub fn dropped_blocks(&self) -> usize {
        self.fifo.dropped()
    }
}
