//! Editing session that ties the canvas surface to history, filters and tools.
//!
//! Snapshot rules: every user-visible commit (image load, reset, finished
//! stroke, confirmed filter) pushes exactly one history entry. Filter
//! previews, undo, redo and revert only paint.

pub mod tools;

use image::RgbaImage;

use crate::canvas::{acquire_pixels, fit_image, CanvasSurface, FitMode, ImageLayout, RetryPolicy};
use crate::filter::{FilterKind, FilterOptions, FilterSession, FilterStatus};
use crate::geometry::{CanvasPoint, Color};
use crate::history::{EditHistory, HistoryInfo, DEFAULT_MAX_HISTORY_SIZE};

pub use tools::{BrushOptions, EditorTools, ToolError, ToolKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorHistoryAction {
    Undo,
    Redo,
}

impl EditorHistoryAction {
    pub const fn applied_message(self) -> &'static str {
        match self {
            Self::Undo => "undo applied",
            Self::Redo => "redo applied",
        }
    }

    pub const fn empty_message(self) -> &'static str {
        match self {
            Self::Undo => "undo stack empty",
            Self::Redo => "redo stack empty",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorOptions {
    pub max_history_size: usize,
    pub filter: FilterOptions,
    pub brush: BrushOptions,
    pub acquire_retry: RetryPolicy,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
            filter: FilterOptions::default(),
            brush: BrushOptions::default(),
            acquire_retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug)]
struct LoadedImage {
    image: RgbaImage,
    layout: ImageLayout,
}

#[derive(Debug)]
pub struct CanvasEditor<S: CanvasSurface> {
    surface: S,
    history: EditHistory,
    filters: FilterSession,
    tools: EditorTools,
    source: Option<LoadedImage>,
    acquire_retry: RetryPolicy,
    preview_on_screen: bool,
    status_message: Option<&'static str>,
}

impl<S: CanvasSurface> CanvasEditor<S> {
    pub fn new(surface: S) -> Self {
        Self::with_options(surface, EditorOptions::default())
    }

    pub fn with_options(surface: S, options: EditorOptions) -> Self {
        Self {
            surface,
            history: EditHistory::with_max_size(options.max_history_size),
            filters: FilterSession::with_options(options.filter),
            tools: EditorTools::with_brush_options(options.brush),
            source: None,
            acquire_retry: options.acquire_retry,
            preview_on_screen: false,
            status_message: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn tools(&self) -> &EditorTools {
        &self.tools
    }

    pub fn history_info(&self) -> HistoryInfo {
        self.history.info()
    }

    pub fn filter_status(&self) -> FilterStatus {
        self.filters.status()
    }

    pub fn status_message(&self) -> Option<&'static str> {
        self.status_message
    }

    /// Draws `image` aspect-filled onto a cleared canvas and starts a fresh
    /// history with it as the initial state.
    pub fn load_image(&mut self, image: RgbaImage) -> bool {
        let (canvas_width, canvas_height) = self.surface.size();
        let Some(layout) = fit_image(
            image.width(),
            image.height(),
            canvas_width,
            canvas_height,
            FitMode::Cover,
        ) else {
            tracing::warn!(
                image_width = image.width(),
                image_height = image.height(),
                canvas_width,
                canvas_height,
                "cannot lay out image on canvas"
            );
            return false;
        };

        self.tools.cancel_stroke();
        self.filters.cleanup();
        self.preview_on_screen = false;
        self.source = Some(LoadedImage { image, layout });
        self.redraw_source_as_initial_state()
    }

    /// Throws away every edit and starts over from the loaded image.
    pub fn reset(&mut self) -> bool {
        if self.source.is_none() {
            tracing::debug!("reset ignored: no image loaded");
            return false;
        }
        self.tools.cancel_stroke();
        self.filters.deactivate();
        self.preview_on_screen = false;
        self.redraw_source_as_initial_state()
    }

    /// Shows the oldest retained snapshot without discarding redo entries.
    pub fn revert_to_initial(&mut self) -> bool {
        self.abandon_stroke();
        self.filters.deactivate();
        self.preview_on_screen = false;
        match self.history.reset_to_initial() {
            Some(initial) => {
                self.surface.paint(&initial);
                true
            }
            None => false,
        }
    }

    /// An unfinished stroke is committed before the switch.
    pub fn select_tool(&mut self, tool: ToolKind) {
        self.settle_stroke();
        self.discard_filter();
        self.tools.select_tool(tool);
    }

    pub fn set_brush_size(&mut self, size: i32) {
        self.tools.set_brush_size(size);
    }

    pub fn set_brush_color(&mut self, color: Color) {
        self.tools.set_brush_color(color);
    }

    pub fn begin_stroke(&mut self, point: CanvasPoint) -> bool {
        self.discard_filter();
        match self.tools.begin_stroke(point) {
            Ok(style) => {
                self.surface.stroke_segment(point, point, &style);
                true
            }
            Err(err) => {
                tracing::debug!(?err, "stroke start refused");
                false
            }
        }
    }

    pub fn continue_stroke(&mut self, point: CanvasPoint) -> bool {
        match self.tools.append_point(point) {
            Ok((from, to, style)) => {
                self.surface.stroke_segment(from, to, &style);
                true
            }
            Err(err) => {
                tracing::debug!(?err, "stroke point ignored");
                false
            }
        }
    }

    pub fn end_stroke(&mut self) -> bool {
        match self.tools.finish_stroke() {
            Ok(stroke) => {
                tracing::debug!(
                    tool = self.tools.active_tool().name(),
                    points = stroke.points.len(),
                    "stroke finished"
                );
                self.record_or_restore()
            }
            Err(err) => {
                tracing::debug!(?err, "stroke end ignored");
                false
            }
        }
    }

    /// Installs the current canvas as the filter baseline and activates
    /// `kind` at full strength. An unfinished stroke is committed first so it
    /// keeps its own history entry.
    pub fn select_filter(&mut self, kind: FilterKind) -> bool {
        self.settle_stroke();
        if self.preview_on_screen {
            self.repaint_committed_state();
        }
        let Some(pixels) = acquire_pixels(&self.surface, self.acquire_retry) else {
            tracing::warn!(filter = %kind, "filter selection failed: canvas pixels unavailable");
            return false;
        };
        if !self.filters.set_original(&pixels) {
            return false;
        }
        self.filters.activate(kind)
    }

    /// Live slider drag: paints a preview computed from the baseline.
    pub fn adjust_filter(&mut self, intensity: i32) -> bool {
        if !self.filters.set_intensity(intensity) {
            return false;
        }
        match self.filters.preview(intensity) {
            Some(preview) => {
                self.surface.paint(&preview);
                self.preview_on_screen = true;
                true
            }
            None => false,
        }
    }

    /// Slider release: the painted preview stays until confirm or cancel.
    pub fn finish_adjustment(&mut self, intensity: i32) -> bool {
        if !self.filters.set_intensity(intensity) {
            return false;
        }
        self.filters.exit_preview();
        true
    }

    pub fn confirm_filter(&mut self) -> bool {
        let Some(intensity) = self.filters.intensity() else {
            tracing::debug!("confirm ignored: no active filter");
            return false;
        };
        let Some(result) = self.filters.commit(i32::from(intensity)) else {
            return false;
        };

        self.filters.set_original(&result);
        self.surface.paint(&result);
        self.preview_on_screen = false;
        let recorded = self.record_or_restore();
        self.filters.deactivate();
        recorded
    }

    pub fn cancel_filter(&mut self) -> bool {
        if self.filters.active_filter().is_none() {
            return false;
        }
        self.discard_filter();
        true
    }

    pub fn undo(&mut self) -> bool {
        self.step_history(EditorHistoryAction::Undo)
    }

    pub fn redo(&mut self) -> bool {
        self.step_history(EditorHistoryAction::Redo)
    }

    pub fn teardown(&mut self) {
        self.tools.cancel_stroke();
        self.history.clear();
        self.filters.cleanup();
        self.source = None;
        self.preview_on_screen = false;
        self.status_message = None;
    }

    fn step_history(&mut self, action: EditorHistoryAction) -> bool {
        self.abandon_stroke();
        self.filters.deactivate();

        let snapshot = match action {
            EditorHistoryAction::Undo => self.history.undo(),
            EditorHistoryAction::Redo => self.history.redo(),
        };
        match snapshot {
            Some(snapshot) => {
                self.surface.paint(&snapshot);
                self.preview_on_screen = false;
                self.status_message = Some(action.applied_message());
                tracing::info!(message = action.applied_message(), "history");
                true
            }
            None => {
                if self.preview_on_screen {
                    self.repaint_committed_state();
                }
                self.status_message = Some(action.empty_message());
                tracing::info!(message = action.empty_message(), "history");
                false
            }
        }
    }

    fn redraw_source_as_initial_state(&mut self) -> bool {
        let Some(source) = self.source.as_ref() else {
            return false;
        };
        self.surface.clear();
        self.surface.draw_image(&source.image, &source.layout);
        self.history.clear();
        self.record_snapshot()
    }

    fn record_snapshot(&mut self) -> bool {
        match acquire_pixels(&self.surface, self.acquire_retry) {
            Some(pixels) => self.history.push(&pixels),
            None => {
                tracing::warn!("history snapshot skipped: canvas pixels unavailable");
                false
            }
        }
    }

    /// Pushes the canvas as a commit. If the snapshot cannot be taken the
    /// canvas is put back to the last committed state.
    fn record_or_restore(&mut self) -> bool {
        if self.record_snapshot() {
            return true;
        }
        self.repaint_committed_state();
        false
    }

    fn settle_stroke(&mut self) {
        if self.tools.is_stroking() {
            self.end_stroke();
        }
    }

    fn abandon_stroke(&mut self) {
        if self.tools.cancel_stroke() {
            tracing::debug!("unfinished stroke abandoned");
            self.repaint_committed_state();
        }
    }

    fn discard_filter(&mut self) {
        if self.filters.active_filter().is_some() {
            self.filters.deactivate();
        }
        if self.preview_on_screen {
            self.repaint_committed_state();
        }
    }

    fn repaint_committed_state(&mut self) {
        if let Some(committed) = self.history.current_state() {
            self.surface.paint(&committed);
        }
        self.preview_on_screen = false;
    }

    #[cfg(test)]
    fn committed_pixels(&self) -> Option<crate::pixel::PixelBuffer> {
        self.history.current_state()
    }
}
