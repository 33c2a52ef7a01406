use crate::audio::window_functions::{WindowData, WindowType};
use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};
use std::collections::VecDeque;
use std::sync::Arc;

/// Magnitudes in dB for bins `0..fft_size / 2`
pub type FftDataBlock = Vec<f32>;

/// Turns a stream of channel samples into magnitude spectra.
///
/// Keeps a rolling window of the last `fft_size` samples. Every call to
/// [`FftDataGenerator::push_samples`] shifts the window by the new samples, windows it, runs the
/// forward transform and queues one [`FftDataBlock`]. The queue is bounded; when full the oldest
/// block is dropped since only the newest spectrum matters for display.
pub struct FftDataGenerator {
    // FFT instance
    fft: Arc<dyn RealToComplex<f32>>,
    fft_size: usize,

    // Window function (precomputed for efficiency)
    window: WindowData,

    // Rolling window of the most recent samples, oldest first
    sample_window: Vec<f32>,

    // Buffers
    time_domain_buffer: Vec<f32>,
    frequency_domain_buffer: Vec<Complex32>,
    scratch: Vec<Complex32>,

    queue: VecDeque<FftDataBlock>,
    queue_capacity: usize,
    dropped: usize,
}

impl FftDataGenerator {
    pub fn new(fft_size: usize, window_type: WindowType, queue_capacity: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);
        let frequency_domain_buffer = fft.make_output_vec();
        let scratch = fft.make_scratch_vec();

        Self {
            fft,
            fft_size,
            window: WindowData::new(window_type, fft_size),
            sample_window: vec![0.0; fft_size],
            time_domain_buffer: vec![0.0; fft_size],
            frequency_domain_buffer,
            scratch,
            queue: VecDeque::with_capacity(queue_capacity.max(1)),
            queue_capacity: queue_capacity.max(1),
            dropped: 0,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of values in every produced block
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2
    }

    /// Frequency resolution of one bin
    pub fn bin_width(&self, sample_rate: f32) -> f32 {
        sample_rate / self.fft_size as f32
    }

    /// Discards the oldest `samples.len()` samples of the rolling window, appends `samples`
    /// and produces one block from the updated window.
    pub fn push_samples(&mut self, samples: &[f32], floor_db: f32) {
        if samples.is_empty() {
            return;
        }

        let incoming = &samples[samples.len().saturating_sub(self.fft_size)..];
        let keep = self.fft_size - incoming.len();
        self.sample_window.copy_within(incoming.len().., 0);
        self.sample_window[keep..].copy_from_slice(incoming);

        self.produce_fft_data_for_rendering(floor_db);
    }

    /// Transforms the current rolling window and queues the result
    pub fn produce_fft_data_for_rendering(&mut self, floor_db: f32) {
        self.time_domain_buffer.copy_from_slice(&self.sample_window);
        self.window.apply(&mut self.time_domain_buffer);

        // Skip this block if the transform fails, the next one will catch up
        if self
            .fft
            .process_with_scratch(
                &mut self.time_domain_buffer,
                &mut self.frequency_domain_buffer,
                &mut self.scratch,
            )
            .is_err()
        {
            return;
        }

        let block = compute_magnitude_spectrum(
            &self.frequency_domain_buffer[..self.num_bins()],
            self.fft_size,
            self.window.coherent_gain,
            floor_db,
        );

        if self.queue.len() >= self.queue_capacity {
            self.queue.pop_front();
            self.dropped += 1;
        }
        self.queue.push_back(block);
    }

    pub fn num_available_fft_data_blocks(&self) -> usize {
        self.queue.len()
    }

    /// Oldest queued block
    pub fn get_fft_data(&mut self) -> Option<FftDataBlock> {
        self.queue.pop_front()
    }

    /// Every block queued so far, oldest first. Blocks produced later are not part of this
    /// sequence.
    pub fn drain_fft_data(&mut self) -> impl Iterator<Item = FftDataBlock> + '_ {
        self.queue.drain(..)
    }

    /// Blocks dropped because the queue was full
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn reset(&mut self) {
        self.sample_window.fill(0.0);
        self.queue.clear();
    }
}

/// Converts complex bins to single-sided amplitude in dB.
///
/// Scaling is 2/N for every bin but DC (1/N), divided by the window's coherent gain, so a
/// full scale sine centred on a bin reads 0dB. Values below `floor_db` (including silence) are
/// reported as `floor_db`.
pub fn compute_magnitude_spectrum(
    frequency_bins: &[Complex32],
    fft_size: usize,
    window_coherent_gain: f32,
    floor_db: f32,
) -> FftDataBlock {
    frequency_bins
        .iter()
        .enumerate()
        .map(|(bin_idx, bin)| {
            let scaling = if bin_idx == 0 {
                1.0 / fft_size as f32
            } else {
                2.0 / fft_size as f32
            };
            let amplitude = bin.norm() * scaling / window_coherent_gain;

            if amplitude > 0.0 {
                (20.0 * amplitude.log10()).max(floor_db)
            } else {
                floor_db
            }
        })
        .collect()
}
