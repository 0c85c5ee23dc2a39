//! Drawing surface abstraction and the in-memory raster canvas used by the
//! command-line host and tests.

pub mod acquire;
pub mod layout;

use image::{imageops, Rgba, RgbaImage};

use crate::geometry::{CanvasPoint, Color};
use crate::pixel::PixelBuffer;

pub use acquire::{acquire_pixels, retry_until_some, RetryPolicy};
pub use layout::{clamp_canvas_size, fit_image, FitMode, ImageLayout, VisibleRegion};

pub const DEFAULT_MAX_SNAPSHOT_PIXELS: u64 = 4096 * 4096;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeMode {
    Paint(Color),
    Erase,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub mode: StrokeMode,
}

impl StrokeStyle {
    pub fn paint(width: f32, color: Color) -> Self {
        Self {
            width,
            mode: StrokeMode::Paint(color),
        }
    }

    pub fn erase(width: f32) -> Self {
        Self {
            width,
            mode: StrokeMode::Erase,
        }
    }
}

/// Host drawing surface the editor renders into.
///
/// `current_pixels` may fail transiently (surface not laid out yet, snapshot
/// too large); callers treat `None` as "skip this snapshot".
pub trait CanvasSurface {
    fn size(&self) -> (u32, u32);
    fn current_pixels(&self) -> Option<PixelBuffer>;
    /// Writes `buffer` at the origin, replacing what is there.
    fn paint(&mut self, buffer: &PixelBuffer);
    fn clear(&mut self);
    fn draw_image(&mut self, image: &RgbaImage, layout: &ImageLayout);
    /// Round-capped line segment.
    fn stroke_segment(&mut self, from: CanvasPoint, to: CanvasPoint, style: &StrokeStyle);
}

#[derive(Debug, Clone)]
pub struct RasterCanvas {
    image: RgbaImage,
    max_snapshot_pixels: u64,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            max_snapshot_pixels: DEFAULT_MAX_SNAPSHOT_PIXELS,
        }
    }

    pub fn with_snapshot_limit(mut self, max_snapshot_pixels: u64) -> Self {
        self.max_snapshot_pixels = max_snapshot_pixels;
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    fn pixel_area(&self) -> u64 {
        u64::from(self.image.width()) * u64::from(self.image.height())
    }
}

impl CanvasSurface for RasterCanvas {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn current_pixels(&self) -> Option<PixelBuffer> {
        let area = self.pixel_area();
        if area == 0 {
            return None;
        }
        if area > self.max_snapshot_pixels {
            tracing::warn!(
                area,
                limit = self.max_snapshot_pixels,
                "canvas too large to snapshot"
            );
            return None;
        }
        PixelBuffer::from_rgba_image(&self.image).ok()
    }

    fn paint(&mut self, buffer: &PixelBuffer) {
        if let Err(err) = buffer.validate() {
            tracing::warn!(%err, "ignoring malformed paint buffer");
            return;
        }

        let (width, height) = self.image.dimensions();
        if buffer.dimensions() == (width, height) {
            self.image.copy_from_slice(&buffer.pixels);
            return;
        }

        tracing::debug!(
            buffer_width = buffer.width,
            buffer_height = buffer.height,
            width,
            height,
            "painting clipped buffer"
        );
        let copy_width = buffer.width.min(width) as usize * 4;
        let src_stride = buffer.width as usize * 4;
        let dst_stride = width as usize * 4;
        let rows = buffer.height.min(height) as usize;
        let target: &mut [u8] = &mut self.image;
        for row in 0..rows {
            let src = &buffer.pixels[row * src_stride..row * src_stride + copy_width];
            target[row * dst_stride..row * dst_stride + copy_width].copy_from_slice(src);
        }
    }

    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = TRANSPARENT;
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, layout: &ImageLayout) {
        if image.width() == 0 || image.height() == 0 {
            return;
        }
        let (canvas_width, canvas_height) = self.image.dimensions();
        let Some(region) =
            layout.visible_region(image.width(), image.height(), canvas_width, canvas_height)
        else {
            tracing::debug!("image layout lies outside the canvas");
            return;
        };

        let visible = imageops::crop_imm(
            image,
            region.source_x,
            region.source_y,
            region.source_width,
            region.source_height,
        )
        .to_image();
        let target = (region.target_width, region.target_height);
        let resized = if visible.dimensions() == target {
            visible
        } else {
            imageops::resize(&visible, target.0, target.1, imageops::FilterType::Triangle)
        };
        imageops::overlay(
            &mut self.image,
            &resized,
            i64::from(region.target_x),
            i64::from(region.target_y),
        );
    }

    fn stroke_segment(&mut self, from: CanvasPoint, to: CanvasPoint, style: &StrokeStyle) {
        let (width, height) = self.image.dimensions();
        if width == 0 || height == 0 {
            return;
        }
        let radius = (style.width / 2.0).max(0.5);
        let ink = match style.mode {
            StrokeMode::Paint(color) => Rgba(color.rgba()),
            StrokeMode::Erase => TRANSPARENT,
        };

        let left = (from.x.min(to.x) - radius).floor().max(0.0) as u32;
        let top = (from.y.min(to.y) - radius).floor().max(0.0) as u32;
        let right = (from.x.max(to.x) + radius).ceil().min(width as f32) as u32;
        let bottom = (from.y.max(to.y) + radius).ceil().min(height as f32) as u32;

        for py in top..bottom {
            for px in left..right {
                let distance = distance_to_segment(px as f32 + 0.5, py as f32 + 0.5, from, to);
                if distance <= radius {
                    self.image.put_pixel(px, py, ink);
                }
            }
        }
    }
}

fn distance_to_segment(px: f32, py: f32, a: CanvasPoint, b: CanvasPoint) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq <= f32::EPSILON {
        0.0
    } else {
        (((px - a.x) * dx + (py - a.y) * dy) / length_sq).clamp(0.0, 1.0)
    };
    let cx = a.x + t * dx;
    let cy = a.y + t * dy;
    ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::new(255, 0, 0);

    fn filled_canvas(width: u32, height: u32, rgba: [u8; 4]) -> RasterCanvas {
        let mut canvas = RasterCanvas::new(width, height);
        canvas.paint(&PixelBuffer::filled(width, height, rgba).expect("filled"));
        canvas
    }

    #[test]
    fn current_pixels_round_trips_painted_buffer() {
        let buffer = PixelBuffer::filled(3, 2, [10, 20, 30, 40]).expect("filled");
        let mut canvas = RasterCanvas::new(3, 2);
        canvas.paint(&buffer);
        assert_eq!(canvas.current_pixels(), Some(buffer));
    }

    #[test]
    fn current_pixels_respects_snapshot_limit() {
        let canvas = RasterCanvas::new(10, 10).with_snapshot_limit(99);
        assert!(canvas.current_pixels().is_none());
        let canvas = RasterCanvas::new(10, 10).with_snapshot_limit(100);
        assert!(canvas.current_pixels().is_some());
    }

    #[test]
    fn zero_sized_canvas_has_no_pixels() {
        assert!(RasterCanvas::new(0, 5).current_pixels().is_none());
    }

    #[test]
    fn paint_clips_mismatched_buffer_at_origin() {
        let mut canvas = filled_canvas(3, 3, [1, 1, 1, 1]);
        canvas.paint(&PixelBuffer::filled(2, 4, [9, 9, 9, 9]).expect("filled"));
        let image = canvas.image();
        assert_eq!(image.get_pixel(0, 0).0, [9, 9, 9, 9]);
        assert_eq!(image.get_pixel(1, 2).0, [9, 9, 9, 9]);
        assert_eq!(image.get_pixel(2, 0).0, [1, 1, 1, 1]);
        assert_eq!(image.get_pixel(2, 2).0, [1, 1, 1, 1]);
    }

    #[test]
    fn paint_ignores_malformed_buffer() {
        let mut canvas = filled_canvas(2, 2, [5, 5, 5, 5]);
        canvas.paint(&PixelBuffer {
            width: 2,
            height: 2,
            pixels: vec![0; 7],
        });
        assert_eq!(canvas.image().get_pixel(0, 0).0, [5, 5, 5, 5]);
    }

    #[test]
    fn clear_makes_every_pixel_transparent() {
        let mut canvas = filled_canvas(2, 2, [5, 5, 5, 5]);
        canvas.clear();
        assert!(canvas.image().pixels().all(|pixel| pixel.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn draw_image_covers_canvas_with_scaled_source() {
        let source = RgbaImage::from_pixel(2, 1, Rgba([0, 200, 0, 255]));
        let mut canvas = RasterCanvas::new(4, 4);
        let layout = fit_image(2, 1, 4, 4, FitMode::Cover).expect("layout");
        canvas.draw_image(&source, &layout);
        assert!(canvas
            .image()
            .pixels()
            .all(|pixel| pixel.0[3] == 255 && pixel.0[1].abs_diff(200) <= 1));
    }

    #[test]
    fn draw_image_only_scales_the_visible_part_of_a_tall_source() {
        let mut source = RgbaImage::from_pixel(1, 20_000, Rgba([255, 0, 0, 255]));
        for y in 10_000..20_000 {
            source.put_pixel(0, y, Rgba([0, 0, 255, 255]));
        }
        let mut canvas = RasterCanvas::new(30, 30);
        let layout = fit_image(1, 20_000, 30, 30, FitMode::Cover).expect("layout");
        canvas.draw_image(&source, &layout);

        let image = canvas.image();
        assert!(image.pixels().all(|pixel| pixel.0[3] == 255));
        let top = image.get_pixel(15, 0).0;
        let bottom = image.get_pixel(15, 29).0;
        assert!(top[0] > top[2], "top keeps the red half: {top:?}");
        assert!(bottom[2] > bottom[0], "bottom keeps the blue half: {bottom:?}");
    }

    #[test]
    fn draw_image_keeps_letterbox_transparent() {
        let source = RgbaImage::from_pixel(4, 2, Rgba([0, 200, 0, 255]));
        let mut canvas = RasterCanvas::new(4, 4);
        let layout = fit_image(4, 2, 4, 4, FitMode::Contain).expect("layout");
        canvas.draw_image(&source, &layout);
        let image = canvas.image();
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(image.get_pixel(2, 2).0, [0, 200, 0, 255]);
        assert_eq!(image.get_pixel(3, 3).0, [0, 0, 0, 0]);
    }

    #[test]
    fn brush_stroke_paints_opaque_color_along_segment() {
        let mut canvas = RasterCanvas::new(20, 20);
        canvas.stroke_segment(
            CanvasPoint::new(2.0, 10.0),
            CanvasPoint::new(18.0, 10.0),
            &StrokeStyle::paint(4.0, RED),
        );
        let image = canvas.image();
        assert_eq!(image.get_pixel(10, 10).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(10, 9).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(10, 0).0, [0, 0, 0, 0]);
        assert_eq!(image.get_pixel(10, 19).0, [0, 0, 0, 0]);
    }

    #[test]
    fn zero_length_segment_draws_a_dot() {
        let mut canvas = RasterCanvas::new(10, 10);
        let point = CanvasPoint::new(5.0, 5.0);
        canvas.stroke_segment(point, point, &StrokeStyle::paint(4.0, RED));
        let image = canvas.image();
        assert_eq!(image.get_pixel(5, 5).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn eraser_stroke_clears_pixels() {
        let mut canvas = filled_canvas(10, 10, [40, 50, 60, 255]);
        canvas.stroke_segment(
            CanvasPoint::new(5.0, 0.0),
            CanvasPoint::new(5.0, 10.0),
            &StrokeStyle::erase(2.0),
        );
        let image = canvas.image();
        assert_eq!(image.get_pixel(5, 5).0, [0, 0, 0, 0]);
        assert_eq!(image.get_pixel(0, 5).0, [40, 50, 60, 255]);
    }

    #[test]
    fn stroke_outside_canvas_is_clipped() {
        let mut canvas = RasterCanvas::new(4, 4);
        canvas.stroke_segment(
            CanvasPoint::new(-50.0, -50.0),
            CanvasPoint::new(-40.0, -40.0),
            &StrokeStyle::paint(2.0, RED),
        );
        assert!(canvas.image().pixels().all(|pixel| pixel.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn distance_to_segment_clamps_to_endpoints() {
        let a = CanvasPoint::new(0.0, 0.0);
        let b = CanvasPoint::new(10.0, 0.0);
        assert_eq!(distance_to_segment(5.0, 3.0, a, b), 3.0);
        assert_eq!(distance_to_segment(13.0, 4.0, a, b), 5.0);
        assert_eq!(distance_to_segment(3.0, 4.0, a, a), 5.0);
    }
}
