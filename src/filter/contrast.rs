//! Grayscale with an S-curve contrast step.
//!
//! Unlike the linear filter, the full effect is computed first and then
//! blended with the source, so its rounding path differs. It only runs when a
//! session is configured with [`GrayscaleAlgorithm::Contrast`].
//!
//! [`GrayscaleAlgorithm::Contrast`]: super::GrayscaleAlgorithm::Contrast

use crate::pixel::PixelBuffer;

use super::{luma, round_channel, MAX_INTENSITY, MIN_INTENSITY};

pub const DEFAULT_CONTRAST_BOOST: f64 = 1.2;
pub const MIN_CONTRAST_BOOST: f64 = 1.0;
pub const MAX_CONTRAST_BOOST: f64 = 2.0;

const S_CURVE_STRENGTH: f64 = 1.5;

pub fn clamp_contrast_boost(boost: f64) -> f64 {
    if boost.is_nan() {
        return DEFAULT_CONTRAST_BOOST;
    }
    boost.clamp(MIN_CONTRAST_BOOST, MAX_CONTRAST_BOOST)
}

/// Caller validates `buffer`.
pub fn apply_contrast_grayscale(buffer: &PixelBuffer, intensity: u8, boost: f64) -> PixelBuffer {
    let mut output = buffer.clone();
    let intensity = intensity.min(MAX_INTENSITY);
    if intensity == MIN_INTENSITY {
        return output;
    }

    let boost = clamp_contrast_boost(boost);
    let factor = f64::from(intensity) / 100.0;
    for pixel in output.pixels.chunks_exact_mut(4) {
        let gray = f64::from(enhance_contrast(luma(pixel[0], pixel[1], pixel[2]), boost));
        for channel in &mut pixel[..3] {
            *channel = blend(*channel, gray, factor);
        }
    }
    output
}

fn enhance_contrast(gray: f64, boost: f64) -> u8 {
    let normalized = (gray / 255.0) * 2.0 - 1.0;
    let curved = s_curve(normalized * boost);
    round_channel((curved + 1.0) * 127.5)
}

fn s_curve(x: f64) -> f64 {
    let x = x.clamp(-1.0, 1.0);
    (x * S_CURVE_STRENGTH).tanh() / S_CURVE_STRENGTH.tanh()
}

fn blend(original: u8, filtered: f64, factor: f64) -> u8 {
    if factor >= 1.0 {
        return round_channel(filtered);
    }
    round_channel(f64::from(original) * (1.0 - factor) + filtered * factor)
}
