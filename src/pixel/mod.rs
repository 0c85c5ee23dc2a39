//! Owned RGBA pixel buffers shared by filters, history and the canvas.

use image::RgbaImage;
use thiserror::Error;

pub const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PixelBufferError {
    #[error("pixel buffer has zero dimension: {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    #[error("pixel data length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("pixel buffer too large: {width}x{height}")]
    TooLarge { width: u32, height: u32 },
}

pub type PixelResult<T> = std::result::Result<T, PixelBufferError>;

/// One bitmap snapshot: `width * height` RGBA pixels, row-major.
///
/// Fields are public because hosts hand over data they read from a platform
/// canvas; every core entry point re-checks [`PixelBuffer::validate`] before
/// trusting it. Cloning always copies the byte vector, so two buffers never
/// share storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> PixelResult<Self> {
        let buffer = Self {
            width,
            height,
            pixels,
        };
        buffer.validate()?;
        Ok(buffer)
    }

    /// Fully transparent buffer.
    pub fn blank(width: u32, height: u32) -> PixelResult<Self> {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> PixelResult<Self> {
        let len = expected_len(width, height)?;
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(len)
            .collect::<Vec<_>>();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn validate(&self) -> PixelResult<()> {
        let expected = expected_len(self.width, self.height)?;
        if self.pixels.len() != expected {
            return Err(PixelBufferError::LengthMismatch {
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len() / BYTES_PER_PIXEL
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let offset = self.offset_of(x, y)?;
        let bytes = self.pixels.get(offset..offset + BYTES_PER_PIXEL)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) -> bool {
        let Some(offset) = self.offset_of(x, y) else {
            return false;
        };
        match self.pixels.get_mut(offset..offset + BYTES_PER_PIXEL) {
            Some(slot) => {
                slot.copy_from_slice(&rgba);
                true
            }
            None => false,
        }
    }

    fn offset_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let row = usize::try_from(y).ok()?.checked_mul(usize::try_from(self.width).ok()?)?;
        row.checked_add(usize::try_from(x).ok()?)?
            .checked_mul(BYTES_PER_PIXEL)
    }

    pub fn from_rgba_image(image: &RgbaImage) -> PixelResult<Self> {
        Self::new(image.width(), image.height(), image.as_raw().clone())
    }

    pub fn to_rgba_image(&self) -> PixelResult<RgbaImage> {
        self.validate()?;
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or(
            PixelBufferError::LengthMismatch {
                expected: expected_len(self.width, self.height)?,
                actual: self.pixels.len(),
            },
        )
    }
}

/// Byte length a `width x height` RGBA buffer must have.
pub fn expected_len(width: u32, height: u32) -> PixelResult<usize> {
    if width == 0 || height == 0 {
        return Err(PixelBufferError::ZeroDimension { width, height });
    }
    let too_large = PixelBufferError::TooLarge { width, height };
    let width_px = usize::try_from(width).map_err(|_| too_large)?;
    let height_px = usize::try_from(height).map_err(|_| too_large)?;
    width_px
        .checked_mul(height_px)
        .and_then(|count| count.checked_mul(BYTES_PER_PIXEL))
        .ok_or(too_large)
}
