//! JSON edit scripts replayed against a [`CanvasEditor`].
//!
//! A script is what a headless host records instead of pointer and slider
//! events:
//!
//! ```json
//! { "steps": [
//!     { "op": "brush", "size": 12, "color": "#FF6B6B", "points": [[10, 10], [80, 40]] },
//!     { "op": "filter", "kind": "grayscale", "drag": [20, 60, 90], "intensity": 80 },
//!     { "op": "undo" }
//! ] }
//! ```

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::canvas::CanvasSurface;
use crate::editor::{CanvasEditor, ToolKind};
use crate::filter::{FilterKind, MAX_INTENSITY};
use crate::geometry::{CanvasPoint, Color};
use crate::history::HistoryInfo;
use crate::input::{ParamDebouncer, DEFAULT_PARAM_DEBOUNCE};

/// Spacing between simulated slider events, roughly one display frame.
const DRAG_EVENT_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EditScript {
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ScriptStep {
    Brush {
        #[serde(default)]
        size: Option<i32>,
        #[serde(default)]
        color: Option<Color>,
        points: Vec<CanvasPoint>,
    },
    Eraser {
        #[serde(default)]
        size: Option<i32>,
        points: Vec<CanvasPoint>,
    },
    Filter {
        kind: FilterKind,
        #[serde(default)]
        drag: Vec<i32>,
        #[serde(default)]
        intensity: Option<i32>,
        #[serde(default = "default_confirm")]
        confirm: bool,
    },
    Undo,
    Redo,
    Reset,
    Revert,
}

fn default_confirm() -> bool {
    true
}

impl ScriptStep {
    pub const fn op(&self) -> &'static str {
        match self {
            Self::Brush { .. } => "brush",
            Self::Eraser { .. } => "eraser",
            Self::Filter { .. } => "filter",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Reset => "reset",
            Self::Revert => "revert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedStep {
    pub index: usize,
    pub op: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptReport {
    pub applied: usize,
    pub rejected: Vec<RejectedStep>,
    pub previews_painted: usize,
    pub history: HistoryInfo,
    pub status_message: Option<&'static str>,
}

pub fn parse_script(contents: &str) -> serde_json::Result<EditScript> {
    serde_json::from_str(contents)
}

pub fn run_script<S: CanvasSurface>(
    editor: &mut CanvasEditor<S>,
    script: &EditScript,
) -> ScriptReport {
    run_script_with_debounce(editor, script, DEFAULT_PARAM_DEBOUNCE)
}

/// Replays every step in order. A rejected step is logged and recorded in
/// the report; later steps still run.
pub fn run_script_with_debounce<S: CanvasSurface>(
    editor: &mut CanvasEditor<S>,
    script: &EditScript,
    debounce: Duration,
) -> ScriptReport {
    let mut replay = Replay {
        debouncer: ParamDebouncer::new(debounce),
        clock: Instant::now(),
        previews_painted: 0,
    };
    let mut applied = 0;
    let mut rejected = Vec::new();

    for (index, step) in script.steps.iter().enumerate() {
        if replay.apply(editor, step) {
            applied += 1;
            tracing::debug!(index, op = step.op(), "script step applied");
        } else {
            tracing::warn!(index, op = step.op(), "script step rejected");
            rejected.push(RejectedStep {
                index,
                op: step.op(),
            });
        }
    }

    ScriptReport {
        applied,
        rejected,
        previews_painted: replay.previews_painted,
        history: editor.history_info(),
        status_message: editor.status_message(),
    }
}

struct Replay {
    debouncer: ParamDebouncer<i32>,
    clock: Instant,
    previews_painted: usize,
}

impl Replay {
    fn apply<S: CanvasSurface>(&mut self, editor: &mut CanvasEditor<S>, step: &ScriptStep) -> bool {
        match step {
            ScriptStep::Brush {
                size,
                color,
                points,
            } => {
                editor.select_tool(ToolKind::Brush);
                if let Some(color) = color {
                    editor.set_brush_color(*color);
                }
                stroke(editor, *size, points)
            }
            ScriptStep::Eraser { size, points } => {
                editor.select_tool(ToolKind::Eraser);
                stroke(editor, *size, points)
            }
            ScriptStep::Filter {
                kind,
                drag,
                intensity,
                confirm,
            } => self.filter(editor, *kind, drag, *intensity, *confirm),
            ScriptStep::Undo => editor.undo(),
            ScriptStep::Redo => editor.redo(),
            ScriptStep::Reset => editor.reset(),
            ScriptStep::Revert => editor.revert_to_initial(),
        }
    }

    fn filter<S: CanvasSurface>(
        &mut self,
        editor: &mut CanvasEditor<S>,
        kind: FilterKind,
        drag: &[i32],
        intensity: Option<i32>,
        confirm: bool,
    ) -> bool {
        if !editor.select_filter(kind) {
            return false;
        }

        self.debouncer.cancel();
        for value in drag {
            self.clock += DRAG_EVENT_INTERVAL;
            if let Some(ready) = self.debouncer.poll(self.clock) {
                self.preview(editor, ready);
            }
            self.debouncer.submit(*value, self.clock);
        }
        if let Some(last) = self.debouncer.flush() {
            self.preview(editor, last);
        }

        let released = intensity
            .or_else(|| drag.last().copied())
            .unwrap_or(i32::from(MAX_INTENSITY));
        if !editor.finish_adjustment(released) {
            return false;
        }

        if confirm {
            editor.confirm_filter()
        } else {
            editor.cancel_filter()
        }
    }

    fn preview<S: CanvasSurface>(&mut self, editor: &mut CanvasEditor<S>, value: i32) {
        if editor.adjust_filter(value) {
            self.previews_painted += 1;
        }
    }
}

fn stroke<S: CanvasSurface>(
    editor: &mut CanvasEditor<S>,
    size: Option<i32>,
    points: &[CanvasPoint],
) -> bool {
    let Some((first, rest)) = points.split_first() else {
        return false;
    };
    if let Some(size) = size {
        editor.set_brush_size(size);
    }
    if !editor.begin_stroke(*first) {
        return false;
    }
    for point in rest {
        editor.continue_stroke(*point);
    }
    editor.end_stroke()
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::canvas::{RasterCanvas, RetryPolicy};
    use crate::editor::EditorOptions;

    fn editor() -> CanvasEditor<RasterCanvas> {
        let options = EditorOptions {
            acquire_retry: RetryPolicy::single_attempt(),
            ..EditorOptions::default()
        };
        let mut editor = CanvasEditor::with_options(RasterCanvas::new(16, 16), options);
        assert!(editor.load_image(RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 255]))));
        editor
    }

    #[test]
    fn parses_every_step_kind() {
        let script = parse_script(
            r##"{ "steps": [
                { "op": "brush", "size": 12, "color": "#00FF00", "points": [[1, 2], [3.5, 4]] },
                { "op": "eraser", "points": [[0, 0]] },
                { "op": "filter", "kind": "opacity", "drag": [10, 20], "intensity": 30, "confirm": false },
                { "op": "filter", "kind": "grayscale" },
                { "op": "undo" }, { "op": "redo" }, { "op": "reset" }, { "op": "revert" }
            ] }"##,
        )
        .expect("script should parse");

        assert_eq!(script.steps.len(), 8);
        assert_eq!(
            script.steps[0],
            ScriptStep::Brush {
                size: Some(12),
                color: Some(Color::new(0, 255, 0)),
                points: vec![CanvasPoint::new(1.0, 2.0), CanvasPoint::new(3.5, 4.0)],
            }
        );
        assert_eq!(
            script.steps[3],
            ScriptStep::Filter {
                kind: FilterKind::Grayscale,
                drag: Vec::new(),
                intensity: None,
                confirm: true,
            }
        );
        let ops = script.steps.iter().map(ScriptStep::op).collect::<Vec<_>>();
        assert_eq!(
            ops,
            vec!["brush", "eraser", "filter", "filter", "undo", "redo", "reset", "revert"]
        );
    }

    #[test]
    fn unknown_op_fails_to_parse() {
        assert!(parse_script(r#"{ "steps": [{ "op": "sepia" }] }"#).is_err());
        assert!(parse_script(r#"{ "steps": [{ "op": "filter", "kind": "blur" }] }"#).is_err());
    }

    #[test]
    fn replay_records_one_snapshot_per_committed_step() {
        let script = parse_script(
            r##"{ "steps": [
                { "op": "brush", "size": 6, "color": "#0000FF", "points": [[0, 8], [16, 8]] },
                { "op": "filter", "kind": "grayscale", "drag": [10, 30, 60, 90], "intensity": 100 },
                { "op": "filter", "kind": "opacity", "drag": [40], "confirm": false }
            ] }"##,
        )
        .expect("script should parse");

        let mut editor = editor();
        let report = run_script(&mut editor, &script);

        assert_eq!(report.applied, 3);
        assert!(report.rejected.is_empty());
        assert_eq!(report.history.total_count, 3);
        assert!(report.previews_painted >= 2);

        let pixels = editor.surface().current_pixels().expect("pixels");
        assert_eq!(pixels.pixel(0, 0), Some([76, 76, 76, 255]));
    }

    #[test]
    fn rejected_steps_are_reported_and_replay_continues() {
        let script = parse_script(
            r#"{ "steps": [
                { "op": "redo" },
                { "op": "brush", "points": [] },
                { "op": "brush", "points": [[4, 4]] },
                { "op": "undo" },
                { "op": "undo" }
            ] }"#,
        )
        .expect("script should parse");

        let mut editor = editor();
        let report = run_script(&mut editor, &script);

        assert_eq!(report.applied, 2);
        assert_eq!(
            report.rejected,
            vec![
                RejectedStep { index: 0, op: "redo" },
                RejectedStep { index: 1, op: "brush" },
                RejectedStep { index: 4, op: "undo" },
            ]
        );
        assert_eq!(report.status_message, Some("undo stack empty"));
        assert_eq!(report.history.current_index, Some(0));
    }

    #[test]
    fn slow_drag_paints_every_value() {
        let script = EditScript {
            steps: vec![ScriptStep::Filter {
                kind: FilterKind::Opacity,
                drag: vec![10, 20, 40],
                intensity: None,
                confirm: true,
            }],
        };
        let mut editor = editor();
        let report = run_script_with_debounce(&mut editor, &script, Duration::ZERO);

        assert_eq!(report.previews_painted, 3);
        let pixels = editor.surface().current_pixels().expect("pixels");
        assert_eq!(pixels.pixel(0, 0), Some([255, 0, 0, 102]));
    }
}
