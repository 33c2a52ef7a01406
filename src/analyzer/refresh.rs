//! The display side refresh loop.
//!
//! [`RefreshTask::tick`] does one bounded unit of display work: drain both channel FIFOs into
//! analyser traces, redesign the response curve when parameters changed, and publish a
//! [`DisplayFrame`] for the render layer through a triple buffer. [`RefreshThread`] calls it at a
//! fixed rate for as long as an editor is open.

use crate::analyzer::config::AnalyzerConfig;
use crate::analyzer::path_producer::PathProducer;
use crate::analyzer::response_curve::ResponseCurve;
use crate::audio::constants::{EDITOR_HEIGHT, EDITOR_WIDTH};
use crate::audio::sample_fifo::SampleFifoConsumer;
use crate::params::{ChainSettings, SimpleEqParams};
use crate::ui::elements::{build_elements, ControlState, Element, ElementKind, ResponseCurveView};
use crate::ui::layout::EditorLayout;
use atomic_float::AtomicF32;
use nih_plug::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use triple_buffer::TripleBuffer;

/// Where the refresh task reads the current control values from
pub trait ControlSource: Send + Sync {
    fn control_state(&self) -> ControlState;
}

impl ControlSource for SimpleEqParams {
    fn control_state(&self) -> ControlState {
        ControlState {
            settings: ChainSettings::from_params(self),
            analyzer_enabled: self.analyzer_enabled.value(),
        }
    }
}

/// Everything the render layer needs for one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayFrame {
    pub elements: Vec<Element>,
    pub sample_rate: f32,
    /// Increments with every published frame, 0 before the first tick
    pub frame_number: u64,
}

impl DisplayFrame {
    pub fn response_curve(&self) -> Option<&ResponseCurveView> {
        self.elements.iter().find_map(|element| match &element.kind {
            ElementKind::ResponseCurve(view) => Some(view),
            _ => None,
        })
    }
}

/// Cloneable read end for published frames (UI thread reads from this).
/// Uses an `Arc<Mutex<>>` wrapper so every editor session can hold a copy.
#[derive(Clone)]
pub struct DisplayOutput {
    output: Arc<Mutex<triple_buffer::Output<DisplayFrame>>>,
}

impl DisplayOutput {
    /// Latest published frame. `None` only if another reader holds the lock right now.
    pub fn latest(&self) -> Option<DisplayFrame> {
        let mut output = self.output.try_lock().ok()?;
        Some(output.read().clone())
    }
}

pub struct RefreshTask {
    controls: Arc<dyn ControlSource>,
    sample_rate: Arc<AtomicF32>,
    layout: EditorLayout,

    left: PathProducer,
    right: PathProducer,
    response_curve: ResponseCurve,
    analyzer_was_enabled: bool,

    frames: triple_buffer::Input<DisplayFrame>,
    frame_number: u64,
}

impl RefreshTask {
    /// Builds the task around the consumer ends of both channel FIFOs. The response curve
    /// starts dirty so the first tick designs it from the current parameters.
    pub fn new(
        controls: Arc<dyn ControlSource>,
        sample_rate: Arc<AtomicF32>,
        left_fifo: SampleFifoConsumer,
        right_fifo: SampleFifoConsumer,
        dirty: Arc<AtomicBool>,
        config: &AnalyzerConfig,
    ) -> (Self, DisplayOutput) {
        let (frames, output) = TripleBuffer::new(&DisplayFrame::default()).split();

        let response_curve = ResponseCurve::new(dirty);
        response_curve.mark_dirty();

        let task = Self {
            controls,
            sample_rate,
            layout: EditorLayout::new(EDITOR_WIDTH as f32, EDITOR_HEIGHT as f32),
            left: PathProducer::new(left_fifo, config),
            right: PathProducer::new(right_fifo, config),
            response_curve,
            analyzer_was_enabled: true,
            frames,
            frame_number: 0,
        };
        let output = DisplayOutput {
            output: Arc::new(Mutex::new(output)),
        };

        (task, output)
    }

    /// Lays the editor out for a new window size
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.layout = EditorLayout::new(width, height);
    }

    pub fn layout(&self) -> &EditorLayout {
        &self.layout
    }

    /// One refresh. Never blocks: FIFO pops are non-blocking and all work is bounded by what
    /// was queued when the tick started.
    pub fn tick(&mut self) {
        let sample_rate = self.sample_rate.load(Ordering::Relaxed);
        let analysis = self.layout.analysis_area();
        let controls = self.controls.control_state();

        if controls.analyzer_enabled {
            self.left.process(analysis, sample_rate);
            self.right.process(analysis, sample_rate);
        } else if self.analyzer_was_enabled {
            self.left.clear();
            self.right.clear();
        }
        self.analyzer_was_enabled = controls.analyzer_enabled;

        let source = &self.controls;
        self.response_curve
            .refresh_if_dirty(|| source.control_state().settings, sample_rate);

        let view = ResponseCurveView {
            response: self.response_curve.build_path(analysis),
            left_trace: controls.analyzer_enabled.then(|| self.left.path().clone()),
            right_trace: controls.analyzer_enabled.then(|| self.right.path().clone()),
        };

        self.frame_number += 1;
        self.frames.write(DisplayFrame {
            elements: build_elements(&self.layout, &controls, view),
            sample_rate,
            frame_number: self.frame_number,
        });
    }

    /// Blocks dropped on each channel because the display fell behind
    pub fn dropped_blocks(&self) -> (usize, usize) {
        (self.left.dropped_blocks(), self.right.dropped_blocks())
    }
}

/// Home of the single [`RefreshTask`] between editor sessions
pub type RefreshTaskSlot = Arc<Mutex<Option<RefreshTask>>>;

/// Runs [`RefreshTask::tick`] on a dedicated thread at a fixed rate.
///
/// The thread takes the task out of its slot when it starts and puts it back when it stops,
/// so the FIFO consumers inside survive editor sessions and there is never more than one
/// reader per FIFO. Dropping the handle stops and joins the thread.
pub struct RefreshThread {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshThread {
    pub fn spawn(slot: RefreshTaskSlot, interval: Duration) -> Option<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();

        let spawned = thread::Builder::new()
            .name(String::from("simple-eq-refresh"))
            .spawn(move || run_refresh_loop(&slot, &thread_stop, interval));

        match spawned {
            Ok(handle) => Some(Self {
                stop,
                handle: Some(handle),
            }),
            Err(err) => {
                nih_error!("Could not start the display refresh thread: {err}");
                None
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for RefreshThread {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                nih_error!("Display refresh thread panicked");
            }
        }
    }
}

fn run_refresh_loop(slot: &RefreshTaskSlot, stop: &AtomicBool, interval: Duration) {
    let task = match slot.lock() {
        Ok(mut slot) => slot.take(),
        Err(_) => None,
    };
    let Some(mut task) = task else {
        nih_warn!("Display refresh task is already running, not starting another one");
        return;
    };
    nih_log!("Display refresh started");

    let mut deadline = Instant::now();
    while !stop.load(Ordering::Acquire) {
        task.tick();

        // Fixed deadlines, missed ticks are skipped rather than caught up
        deadline += interval;
        let now = Instant::now();
        if deadline > now {
            thread::park_timeout(deadline - now);
        } else {
            deadline = now;
        }
    }

    if let Ok(mut slot) = slot.lock() {
        *slot = Some(task);
    }
    nih_log!("Display refresh stopped");
}
