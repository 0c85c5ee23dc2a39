use crate::canvas::StrokeStyle;
use crate::geometry::{CanvasPoint, Color};

pub const MIN_BRUSH_SIZE: u8 = 5;
pub const MAX_BRUSH_SIZE: u8 = 50;
pub const DEFAULT_BRUSH_SIZE: u8 = 20;
pub const DEFAULT_BRUSH_COLOR: Color = Color::new(0xFF, 0x6B, 0x6B);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushOptions {
    pub color: Color,
    pub size: u8,
}

impl Default for BrushOptions {
    fn default() -> Self {
        Self {
            color: DEFAULT_BRUSH_COLOR,
            size: DEFAULT_BRUSH_SIZE,
        }
    }
}

impl BrushOptions {
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_size(&mut self, size: i32) {
        self.size = clamp_brush_size(size);
    }
}

pub fn clamp_brush_size(size: i32) -> u8 {
    size.clamp(i32::from(MIN_BRUSH_SIZE), i32::from(MAX_BRUSH_SIZE)) as u8
}

/// Points of one pointer-down..pointer-up gesture. The style is fixed when the
/// stroke begins so option changes mid-gesture do not affect it.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushStroke {
    pub points: Vec<CanvasPoint>,
    pub style: StrokeStyle,
    pub finalized: bool,
}

impl BrushStroke {
    pub fn new(start: CanvasPoint, style: StrokeStyle) -> Self {
        Self {
            points: vec![start],
            style,
            finalized: false,
        }
    }

    pub fn last_point(&self) -> Option<CanvasPoint> {
        self.points.last().copied()
    }

    pub fn append_point(&mut self, point: CanvasPoint) {
        self.points.push(point);
    }

    pub fn finalize(&mut self) {
        self.finalized = true;
    }
}
