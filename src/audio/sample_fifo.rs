//! Lock-free hand-off of raw channel audio from the audio thread to the analyser.
//!
//! The audio thread accumulates samples into fixed size blocks and publishes each complete
//! block into a ring of slots. The consumer drains complete blocks in production order. When
//! the consumer falls behind, the producer keeps going and overwrites the oldest slots; the
//! consumer notices through the per-slot sequence number and skips what was lost.
//!
//! Exactly one producer and one consumer exist per FIFO, enforced by [`sample_fifo`] handing out
//! one non-cloneable end each.

use std::sync::atomic::{fence, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

/// One published block. `sequence` is odd while the producer writes block `n` into the slot
/// (`2n + 1`) and even once it is complete (`2n + 2`).
struct BlockSlot {
    sequence: AtomicUsize,
    len: AtomicUsize,
    samples: Box<[AtomicU32]>,
}

impl BlockSlot {
    fn new(max_block_size: usize) -> Self {
        Self {
            sequence: AtomicUsize::new(0),
            len: AtomicUsize::new(0),
            samples: (0..max_block_size).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    fn write(&self, block_number: usize, block: &[f32]) {
        self.sequence.store(2 * block_number + 1, Ordering::Relaxed);
        fence(Ordering::Release);

        for (slot, sample) in self.samples.iter().zip(block) {
            slot.store(sample.to_bits(), Ordering::Relaxed);
        }
        self.len.store(block.len(), Ordering::Relaxed);

        self.sequence.store(2 * block_number + 2, Ordering::Release);
    }

    /// Copies block `block_number` into `out`. Returns false when the slot has already been
    /// reused for a newer block, in which case `out` holds garbage.
    fn read_into(&self, block_number: usize, out: &mut Vec<f32>) -> bool {
        let expected = 2 * block_number + 2;
        if self.sequence.load(Ordering::Acquire) != expected {
            return false;
        }

        let len = self.len.load(Ordering::Relaxed).min(self.samples.len());
        out.clear();
        out.extend(
            self.samples[..len]
                .iter()
                .map(|sample| f32::from_bits(sample.load(Ordering::Relaxed))),
        );

        fence(Ordering::Acquire);
        self.sequence.load(Ordering::Relaxed) == expected
    }
}

struct BlockRing {
    slots: Box<[BlockSlot]>,
    /// Total number of blocks ever published
    published: AtomicUsize,
}

impl BlockRing {
    fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Creates a connected producer/consumer pair holding up to `capacity` complete blocks of at
/// most `max_block_size` samples each. All memory is allocated here, up front.
pub fn sample_fifo(
    capacity: usize,
    max_block_size: usize,
) -> (SampleFifoProducer, SampleFifoConsumer) {
    let capacity = capacity.max(1);
    let max_block_size = max_block_size.max(1);

    let ring = Arc::new(BlockRing {
        slots: (0..capacity).map(|_| BlockSlot::new(max_block_size)).collect(),
        published: AtomicUsize::new(0),
    });

    let producer = SampleFifoProducer {
        ring: ring.clone(),
        block: vec![0.0; max_block_size],
        fill: 0,
        block_size: max_block_size,
        prepared: false,
    };
    let consumer = SampleFifoConsumer {
        ring,
        next_block: 0,
        dropped: 0,
    };

    (producer, consumer)
}

/// Audio thread end
pub struct SampleFifoProducer {
    ring: Arc<BlockRing>,
    /// Block being accumulated (audio thread only)
    block: Vec<f32>,
    /// Position in `block`
    fill: usize,
    block_size: usize,
    prepared: bool,
}

impl SampleFifoProducer {
    /// Sets the size of the blocks handed to the consumer and drops any partial block.
    /// Sizes are clamped to the slot size chosen in [`sample_fifo`].
    pub fn prepare(&mut self, block_size: usize) {
        self.block_size = block_size.clamp(1, self.block.len());
        self.fill = 0;
        self.prepared = true;
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    // Called from audio thread - NO ALLOCATIONS, NO LOCKS!
    pub fn push(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.block[self.fill] = sample;
            self.fill += 1;

            if self.fill >= self.block_size {
                self.publish();
                self.fill = 0;
            }
        }
    }

    fn publish(&mut self) {
        let block_number = self.ring.published.load(Ordering::Relaxed);
        let slot = &self.ring.slots[block_number % self.ring.capacity()];
        slot.write(block_number, &self.block[..self.block_size]);
        self.ring
            .published
            .store(block_number.wrapping_add(1), Ordering::Release);
    }
}

/// Analyser end
pub struct SampleFifoConsumer {
    ring: Arc<BlockRing>,
    next_block: usize,
    dropped: usize,
}

impl SampleFifoConsumer {
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Complete blocks that can still be retrieved
    pub fn num_complete_buffers_available(&self) -> usize {
        let published = self.ring.published.load(Ordering::Acquire);
        published.wrapping_sub(self.next_block).min(self.capacity())
    }

    /// Blocks that were overwritten before they could be read
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Copies the oldest retrievable block into `out`. Non-blocking; returns false when
    /// nothing is available.
    pub fn pop_into(&mut self, out: &mut Vec<f32>) -> bool {
        loop {
            let published = self.ring.published.load(Ordering::Acquire);
            let pending = published.wrapping_sub(self.next_block);
            if pending == 0 {
                return false;
            }

            if pending > self.capacity() {
                let lost = pending - self.capacity();
                self.dropped += lost;
                self.next_block = self.next_block.wrapping_add(lost);
            }

            let block_number = self.next_block;
            self.next_block = self.next_block.wrapping_add(1);

            let slot = &self.ring.slots[block_number % self.capacity()];
            if slot.read_into(block_number, out) {
                return true;
            }

            // Overwritten while we were looking at it
            self.dropped += 1;
        }
    }

    pub fn pop_complete_buffer(&mut self) -> Option<Vec<f32>> {
        let mut block = Vec::new();
        self.pop_into(&mut block).then_some(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn block(value: f32, len: usize) -> Vec<f32> {
        vec![value; len]
    }

    #[test]
    fn partial_blocks_are_not_delivered() {
        let (mut producer, mut consumer) = sample_fifo(4, 16);
        producer.prepare(8);

        producer.push(&block(1.0, 7));
        assert_eq!(consumer.num_complete_buffers_available(), 0);
        assert!(consumer.pop_complete_buffer().is_none());

        producer.push(&block(1.0, 1));
        assert_eq!(consumer.num_complete_buffers_available(), 1);
        assert_eq!(consumer.pop_complete_buffer(), Some(block(1.0, 8)));
    }

    #[test]
    fn buffers_arrive_in_production_order() {
        let (mut producer, mut consumer) = sample_fifo(4, 8);
        producer.prepare(4);

        producer.push(&block(1.0, 4));
        producer.push(&block(2.0, 4));
        producer.push(&block(3.0, 4));

        assert_eq!(consumer.pop_complete_buffer(), Some(block(1.0, 4)));
        assert_eq!(consumer.pop_complete_buffer(), Some(block(2.0, 4)));
        assert_eq!(consumer.pop_complete_buffer(), Some(block(3.0, 4)));
        assert_eq!(consumer.pop_complete_buffer(), None);
        assert_eq!(consumer.dropped(), 0);
    }

    #[test]
    fn overflow_drops_the_oldest_buffer() {
        let capacity = 5;
        let (mut producer, mut consumer) = sample_fifo(capacity, 8);
        producer.prepare(4);

        for i in 0..=capacity {
            producer.push(&block(i as f32, 4));
        }
        assert_eq!(consumer.num_complete_buffers_available(), capacity);

        let mut received = Vec::new();
        while let Some(buffer) = consumer.pop_complete_buffer() {
            received.push(buffer[0]);
        }

        assert_eq!(received, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(consumer.dropped(), 1);
    }

    #[test]
    fn host_blocks_are_rechunked() {
        let (mut producer, mut consumer) = sample_fifo(8, 16);
        producer.prepare(4);

        let samples: Vec<f32> = (0..10).map(|i| i as f32).collect();
        producer.push(&samples);

        assert_eq!(consumer.pop_complete_buffer(), Some(vec![0.0, 1.0, 2.0, 3.0]));
        assert_eq!(consumer.pop_complete_buffer(), Some(vec![4.0, 5.0, 6.0, 7.0]));
        assert_eq!(consumer.pop_complete_buffer(), None);
    }

    #[test]
    fn prepare_clamps_block_size_to_slot_size() {
        let (mut producer, _consumer) = sample_fifo(2, 16);
        assert!(!producer.is_prepared());
        producer.prepare(4096);
        assert!(producer.is_prepared());
        assert_eq!(producer.block_size(), 16);
    }

    /// Streams `blocks` constant blocks through a concurrent producer and checks every
    /// delivered block is whole and newer than the previous one
    fn stream_concurrently(capacity: usize, block_len: usize, blocks: usize) {
        let (mut producer, mut consumer) = sample_fifo(capacity, block_len);
        producer.prepare(block_len);

        let writer = thread::spawn(move || {
            for i in 0..blocks {
                producer.push(&block(i as f32, block_len));
            }
        });

        let mut last = -1.0;
        let mut out = Vec::new();
        let mut received = 0;
        loop {
            if consumer.pop_into(&mut out) {
                assert_eq!(out.len(), block_len);
                assert!(out.iter().all(|s| *s == out[0]), "torn block");
                assert!(out[0] > last, "out of order");
                last = out[0];
                received += 1;
            } else if writer.is_finished() && consumer.num_complete_buffers_available() == 0 {
                break;
            }
        }

        writer.join().unwrap();
        assert_eq!(received + consumer.dropped(), blocks);
        assert_eq!(last, (blocks - 1) as f32);
    }

    #[test]
    fn concurrent_consumer_sees_ordered_untorn_blocks() {
        stream_concurrently(4, 64, 5000);
    }

    #[test]
    fn single_slot_ring_never_tears_under_contention() {
        stream_concurrently(1, 16, 20_000);
    }
}
