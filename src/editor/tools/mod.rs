mod brush;

use serde::Deserialize;

use crate::canvas::StrokeStyle;
pub use crate::geometry::{CanvasPoint, Color};
pub use brush::{
    clamp_brush_size, BrushOptions, BrushStroke, DEFAULT_BRUSH_COLOR, DEFAULT_BRUSH_SIZE,
    MAX_BRUSH_SIZE, MIN_BRUSH_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Brush,
    Eraser,
}

impl ToolKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Brush => "brush",
            Self::Eraser => "eraser",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolError {
    StrokeAlreadyActive,
    NoActiveStroke,
}

#[derive(Debug, Clone, Default)]
pub struct EditorTools {
    active_tool: ToolKind,
    brush_options: BrushOptions,
    active_stroke: Option<BrushStroke>,
}

impl EditorTools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_brush_options(brush_options: BrushOptions) -> Self {
        Self {
            brush_options,
            ..Self::default()
        }
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    /// Switching tools abandons an unfinished stroke.
    pub fn select_tool(&mut self, tool: ToolKind) {
        if self.active_stroke.take().is_some() {
            tracing::debug!(tool = tool.name(), "tool switch dropped active stroke");
        }
        self.active_tool = tool;
    }

    pub fn brush_options(&self) -> BrushOptions {
        self.brush_options
    }

    pub fn set_brush_size(&mut self, size: i32) {
        self.brush_options.set_size(size);
    }

    pub fn set_brush_color(&mut self, color: Color) {
        self.brush_options.set_color(color);
    }

    pub fn stroke_style(&self) -> StrokeStyle {
        let width = f32::from(self.brush_options.size);
        match self.active_tool {
            ToolKind::Brush => StrokeStyle::paint(width, self.brush_options.color),
            ToolKind::Eraser => StrokeStyle::erase(width),
        }
    }

    pub fn is_stroking(&self) -> bool {
        self.active_stroke.is_some()
    }

    pub fn begin_stroke(&mut self, start: CanvasPoint) -> Result<StrokeStyle, ToolError> {
        if self.active_stroke.is_some() {
            return Err(ToolError::StrokeAlreadyActive);
        }
        let style = self.stroke_style();
        self.active_stroke = Some(BrushStroke::new(start, style));
        Ok(style)
    }

    /// Returns the segment to rasterise: previous point, new point, style.
    pub fn append_point(
        &mut self,
        point: CanvasPoint,
    ) -> Result<(CanvasPoint, CanvasPoint, StrokeStyle), ToolError> {
        let stroke = self.active_stroke.as_mut().ok_or(ToolError::NoActiveStroke)?;
        let previous = stroke.last_point().unwrap_or(point);
        stroke.append_point(point);
        Ok((previous, point, stroke.style))
    }

    pub fn finish_stroke(&mut self) -> Result<BrushStroke, ToolError> {
        let mut stroke = self.active_stroke.take().ok_or(ToolError::NoActiveStroke)?;
        stroke.finalize();
        Ok(stroke)
    }

    pub fn cancel_stroke(&mut self) -> bool {
        self.active_stroke.take().is_some()
    }
}
