//! Placement of a source image on the canvas and backing-store sizing.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Whole image visible, letterboxed.
    Contain,
    /// Canvas fully covered, image may overflow and is centred (aspect fill).
    #[default]
    Cover,
    /// Stretched to the canvas, aspect ratio ignored.
    Fill,
}

/// Where and how large the source image is drawn, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

impl ImageLayout {
    /// Integer draw rectangle `(x, y, width, height)`; width and height are at
    /// least one pixel.
    pub fn pixel_rect(&self) -> (i64, i64, u32, u32) {
        let width = self.width.round().max(1.0) as u32;
        let height = self.height.round().max(1.0) as u32;
        (self.x.round() as i64, self.y.round() as i64, width, height)
    }

    /// The part of an `image_width x image_height` source that lands inside
    /// the canvas, and where it lands. `None` when nothing is visible.
    pub fn visible_region(
        &self,
        image_width: u32,
        image_height: u32,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Option<VisibleRegion> {
        let (x, y, width, height) = self.pixel_rect();
        let (source_x, source_width, target_x, target_width) =
            visible_span(x, width, image_width, canvas_width)?;
        let (source_y, source_height, target_y, target_height) =
            visible_span(y, height, image_height, canvas_height)?;
        Some(VisibleRegion {
            source_x,
            source_y,
            source_width,
            source_height,
            target_x,
            target_y,
            target_width,
            target_height,
        })
    }
}

/// Source crop and canvas target for drawing a laid-out image. The target
/// never extends past the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRegion {
    pub source_x: u32,
    pub source_y: u32,
    pub source_width: u32,
    pub source_height: u32,
    pub target_x: u32,
    pub target_y: u32,
    pub target_width: u32,
    pub target_height: u32,
}

/// One axis of [`ImageLayout::visible_region`]: `(source_start, source_len,
/// target_start, target_len)`.
fn visible_span(
    offset: i64,
    extent: u32,
    image_len: u32,
    canvas_len: u32,
) -> Option<(u32, u32, u32, u32)> {
    if extent == 0 || image_len == 0 {
        return None;
    }
    let target_start = offset.max(0);
    let target_end = (offset + i64::from(extent)).min(i64::from(canvas_len));
    if target_end <= target_start {
        return None;
    }

    let extent = i128::from(extent);
    let image_len = i128::from(image_len);
    let scaled_start = i128::from(target_start - offset) * image_len;
    let scaled_end = i128::from(target_end - offset) * image_len;
    let source_start = (scaled_start / extent).clamp(0, image_len - 1);
    let source_end = ((scaled_end + extent - 1) / extent).clamp(source_start + 1, image_len);

    Some((
        u32::try_from(source_start).ok()?,
        u32::try_from(source_end - source_start).ok()?,
        u32::try_from(target_start).ok()?,
        u32::try_from(target_end - target_start).ok()?,
    ))
}

pub fn fit_image(
    image_width: u32,
    image_height: u32,
    canvas_width: u32,
    canvas_height: u32,
    mode: FitMode,
) -> Option<ImageLayout> {
    if image_width == 0 || image_height == 0 || canvas_width == 0 || canvas_height == 0 {
        return None;
    }

    let image_w = image_width as f32;
    let image_h = image_height as f32;
    let canvas_w = canvas_width as f32;
    let canvas_h = canvas_height as f32;
    let scale_x = canvas_w / image_w;
    let scale_y = canvas_h / image_h;

    let layout = match mode {
        FitMode::Fill => ImageLayout {
            x: 0.0,
            y: 0.0,
            width: canvas_w,
            height: canvas_h,
            scale: scale_x.max(scale_y),
        },
        FitMode::Contain | FitMode::Cover => {
            let scale = if mode == FitMode::Cover {
                scale_x.max(scale_y)
            } else {
                scale_x.min(scale_y)
            };
            let width = image_w * scale;
            let height = image_h * scale;
            ImageLayout {
                x: (canvas_w - width) / 2.0,
                y: (canvas_h - height) / 2.0,
                width,
                height,
                scale,
            }
        }
    };
    Some(layout)
}

/// Backing-store size for a canvas displayed at `css_width x css_height` on a
/// display with `device_pixel_ratio`, shrunk proportionally so neither side
/// exceeds `max_size`.
pub fn clamp_canvas_size(
    css_width: f32,
    css_height: f32,
    device_pixel_ratio: f32,
    max_size: u32,
) -> Option<(u32, u32)> {
    let ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    let mut width = css_width * ratio;
    let mut height = css_height * ratio;
    if !(width.is_finite() && height.is_finite()) || width < 1.0 || height < 1.0 {
        return None;
    }

    let max = max_size.max(1) as f32;
    if width > max || height > max {
        let scale = (max / width).min(max / height);
        width = (width * scale).floor();
        height = (height * scale).floor();
        tracing::debug!(scale, width, height, "canvas backing store shrunk");
    }

    Some((width.max(1.0) as u32, height.max(1.0) as u32))
}
