use crate::analyzer::refresh::{DisplayFrame, DisplayOutput, RefreshTaskSlot, RefreshThread};
use crate::audio::constants::{EDITOR_HEIGHT, EDITOR_WIDTH};
use nih_plug::prelude::*;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// The host facing editor. It owns no drawing code: it listens for parameter changes and runs
/// the display refresh while a window is open. The render layer reads frames from the handle
/// returned by [`Editor::spawn`].
pub struct EqEditor {
    refresh_task: RefreshTaskSlot,
    frames: DisplayOutput,
    dirty: Arc<AtomicBool>,
    refresh_interval: Duration,
}

impl EqEditor {
    pub fn new(
        refresh_task: RefreshTaskSlot,
        frames: DisplayOutput,
        dirty: Arc<AtomicBool>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            refresh_task,
            frames,
            dirty,
            refresh_interval,
        }
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }
}

/// Lives as long as the editor window. Dropping it stops the refresh thread.
pub struct EditorHandle {
    // Declared first so the thread stops before anything else goes away
    _refresh: Option<RefreshThread>,
    frames: DisplayOutput,
    _context: Arc<dyn GuiContext>,
}

impl EditorHandle {
    pub fn latest_frame(&self) -> Option<DisplayFrame> {
        self.frames.latest()
    }
}

impl Editor for EqEditor {
    fn spawn(
        &self,
        _parent: ParentWindowHandle,
        context: Arc<dyn GuiContext>,
    ) -> Box<dyn Any + Send> {
        nih_log!("Editor opened");
        self.mark_dirty();

        // Without a thread the window stays inert, the plugin keeps working
        let refresh = RefreshThread::spawn(self.refresh_task.clone(), self.refresh_interval);

        Box::new(EditorHandle {
            _refresh: refresh,
            frames: self.frames.clone(),
            _context: context,
        })
    }

    fn size(&self) -> (u32, u32) {
        (EDITOR_WIDTH, EDITOR_HEIGHT)
    }

    fn set_scale_factor(&self, _factor: f32) -> bool {
        false
    }

    fn param_value_changed(&self, _id: &str, _normalized_value: f32) {
        self.mark_dirty();
    }

    fn param_modulation_changed(&self, _id: &str, _modulation_offset: f32) {
        self.mark_dirty();
    }

    fn param_values_changed(&self) {
        self.mark_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::config::AnalyzerConfig;
    use crate::analyzer::refresh::RefreshTask;
    use crate::audio::sample_fifo::sample_fifo;
    use crate::params::SimpleEqParams;
    use atomic_float::AtomicF32;
    use std::sync::Mutex;

    fn editor() -> (EqEditor, Arc<AtomicBool>) {
        let (_, left) = sample_fifo(2, 64);
        let (_, right) = sample_fifo(2, 64);
        let dirty = Arc::new(AtomicBool::new(false));
        let (task, frames) = RefreshTask::new(
            Arc::new(SimpleEqParams::default()),
            Arc::new(AtomicF32::new(44100.0)),
            left,
            right,
            dirty.clone(),
            &AnalyzerConfig::default(),
        );
        // Building the task marks the curve dirty
        dirty.store(false, Ordering::Release);

        let editor = EqEditor::new(
            Arc::new(Mutex::new(Some(task))),
            frames,
            dirty.clone(),
            Duration::from_millis(16),
        );
        (editor, dirty)
    }

    #[test]
    fn parameter_changes_mark_the_curve_dirty() {
        let (editor, dirty) = editor();

        editor.param_value_changed("peak_gain", 0.75);
        assert!(dirty.swap(false, Ordering::AcqRel));

        editor.param_values_changed();
        assert!(dirty.swap(false, Ordering::AcqRel));

        editor.param_modulation_changed("peak_freq", 0.1);
        assert!(dirty.load(Ordering::Acquire));
    }

    #[test]
    fn reports_the_fixed_editor_size() {
        let (editor, _) = editor();
        assert_eq!(editor.size(), (600, 500));
        assert!(!editor.set_scale_factor(2.0));
    }
}
