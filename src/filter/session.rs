//! Stateful wrapper that previews and commits one filter at a time.
//!
//! The session keeps its own copy of the baseline ("original") buffer. Every
//! preview is recomputed from that baseline, so dragging a slider back and
//! forth never compounds rounding. Committing hands the result back to the
//! caller, which is responsible for installing it as the new baseline and for
//! recording history.

use crate::pixel::PixelBuffer;
use crate::state::{FilterEvent, FilterPhase, StateMachine};

use super::{apply_filter_with, clamp_intensity, FilterKind, FilterOptions, FilterSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterStatus {
    pub has_original: bool,
    pub is_preview_mode: bool,
    pub active_filter: Option<FilterKind>,
    pub intensity: Option<u8>,
}

#[derive(Debug, Default)]
pub struct FilterSession {
    original: Option<PixelBuffer>,
    active: Option<FilterSpec>,
    preview: Option<PixelBuffer>,
    machine: StateMachine,
    options: FilterOptions,
}

impl FilterSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FilterOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> FilterOptions {
        self.options
    }

    pub fn set_original(&mut self, buffer: &PixelBuffer) -> bool {
        if let Err(err) = buffer.validate() {
            tracing::warn!(%err, "rejected filter baseline");
            return false;
        }

        self.original = Some(buffer.clone());
        self.active = None;
        self.preview = None;
        self.fire(FilterEvent::Reset);
        tracing::debug!(
            width = buffer.width,
            height = buffer.height,
            "filter baseline installed"
        );
        true
    }

    pub fn activate(&mut self, kind: FilterKind) -> bool {
        if let Some(previous) = self.active.filter(|spec| spec.kind != kind) {
            tracing::debug!(previous = %previous.kind, next = %kind, "switching active filter");
        }
        self.active = Some(FilterSpec::full(kind));
        self.preview = None;
        self.fire(FilterEvent::Activate);
        true
    }

    pub fn activate_named(&mut self, name: &str) -> bool {
        match name.parse::<FilterKind>() {
            Ok(kind) => self.activate(kind),
            Err(err) => {
                tracing::debug!(%err, "filter activation refused");
                false
            }
        }
    }

    pub fn deactivate(&mut self) {
        self.active = None;
        self.preview = None;
        self.fire(FilterEvent::Deactivate);
    }

    pub fn set_intensity(&mut self, value: i32) -> bool {
        match self.active.as_mut() {
            Some(spec) => {
                spec.intensity = clamp_intensity(value);
                true
            }
            None => false,
        }
    }

    pub fn intensity(&self) -> Option<u8> {
        self.active.map(|spec| spec.intensity)
    }

    pub fn active_filter(&self) -> Option<FilterSpec> {
        self.active
    }

    pub fn original(&self) -> Option<&PixelBuffer> {
        self.original.as_ref()
    }

    pub fn preview_buffer(&self) -> Option<&PixelBuffer> {
        self.preview.as_ref()
    }

    pub fn is_preview_mode(&self) -> bool {
        self.machine.state() == FilterPhase::Previewing
    }

    pub fn phase(&self) -> FilterPhase {
        self.machine.state()
    }

    pub fn preview(&mut self, intensity: i32) -> Option<PixelBuffer> {
        let result = self.render(intensity)?;
        self.preview = Some(result.clone());
        self.fire(FilterEvent::Preview);
        Some(result)
    }

    /// Produces the committed buffer; the baseline stays untouched until the
    /// caller passes the result to [`FilterSession::set_original`].
    pub fn commit(&mut self, intensity: i32) -> Option<PixelBuffer> {
        let result = self.render(intensity)?;
        if let Some(spec) = self.active.as_mut() {
            spec.intensity = clamp_intensity(intensity);
        }
        self.preview = None;
        self.fire(FilterEvent::Commit);
        Some(result)
    }

    pub fn apply_current(&mut self) -> Option<PixelBuffer> {
        let intensity = self.intensity()?;
        self.commit(i32::from(intensity))
    }

    pub fn exit_preview(&mut self) {
        self.preview = None;
        if self.machine.can_transition(FilterEvent::ExitPreview) {
            self.fire(FilterEvent::ExitPreview);
        }
    }

    pub fn status(&self) -> FilterStatus {
        FilterStatus {
            has_original: self.original.is_some(),
            is_preview_mode: self.is_preview_mode(),
            active_filter: self.active.map(|spec| spec.kind),
            intensity: self.intensity(),
        }
    }

    pub fn cleanup(&mut self) {
        self.original = None;
        self.active = None;
        self.preview = None;
        self.fire(FilterEvent::Reset);
    }

    fn render(&self, intensity: i32) -> Option<PixelBuffer> {
        let Some(original) = self.original.as_ref() else {
            tracing::debug!("filter render skipped: no baseline");
            return None;
        };
        let Some(active) = self.active else {
            tracing::debug!("filter render skipped: no active filter");
            return None;
        };

        let spec = FilterSpec::new(active.kind, intensity);
        match apply_filter_with(original, spec, &self.options) {
            Ok(buffer) => Some(buffer),
            Err(err) => {
                tracing::warn!(%err, filter = %spec.kind, "filter render failed");
                None
            }
        }
    }

    fn fire(&mut self, event: FilterEvent) {
        if let Err(err) = self.machine.transition(event) {
            tracing::debug!(%err, "filter session transition ignored");
        }
    }
}
