//! Pure grayscale and opacity filters over [`PixelBuffer`]s.
//!
//! Every function here borrows its input and returns a freshly allocated
//! buffer; nothing mutates the source pixels.

pub mod contrast;
pub mod session;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pixel::{PixelBuffer, PixelResult};

pub use contrast::{apply_contrast_grayscale, DEFAULT_CONTRAST_BOOST};
pub use session::{FilterSession, FilterStatus};

pub const MIN_INTENSITY: u8 = 0;
pub const MAX_INTENSITY: u8 = 100;

const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Grayscale,
    Opacity,
}

impl FilterKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Opacity => "opacity",
        }
    }

    /// Intensity at which the filter leaves pixels unchanged.
    pub const fn identity_intensity(self) -> u8 {
        match self {
            Self::Grayscale => MIN_INTENSITY,
            Self::Opacity => MAX_INTENSITY,
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown filter kind: {0}")]
pub struct UnknownFilterKind(pub String);

impl FromStr for FilterKind {
    type Err = UnknownFilterKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "grayscale" => Ok(Self::Grayscale),
            "opacity" => Ok(Self::Opacity),
            other => Err(UnknownFilterKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub intensity: u8,
}

impl FilterSpec {
    pub fn new(kind: FilterKind, intensity: i32) -> Self {
        Self {
            kind,
            intensity: clamp_intensity(intensity),
        }
    }

    pub const fn full(kind: FilterKind) -> Self {
        Self {
            kind,
            intensity: MAX_INTENSITY,
        }
    }
}

pub fn clamp_intensity(value: i32) -> u8 {
    let clamped = value.clamp(i32::from(MIN_INTENSITY), i32::from(MAX_INTENSITY));
    u8::try_from(clamped).unwrap_or(MAX_INTENSITY)
}

/// Which grayscale algorithm a session runs. `Linear` is the editor's
/// default; `Contrast` adds the S-curve step and has to be chosen explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GrayscaleAlgorithm {
    #[default]
    Linear,
    Contrast {
        boost: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterOptions {
    pub grayscale: GrayscaleAlgorithm,
}

pub fn apply_filter(buffer: &PixelBuffer, spec: FilterSpec) -> PixelResult<PixelBuffer> {
    apply_filter_with(buffer, spec, &FilterOptions::default())
}

pub fn apply_filter_with(
    buffer: &PixelBuffer,
    spec: FilterSpec,
    options: &FilterOptions,
) -> PixelResult<PixelBuffer> {
    buffer.validate()?;
    let intensity = spec.intensity.min(MAX_INTENSITY);
    let output = match (spec.kind, options.grayscale) {
        (FilterKind::Grayscale, GrayscaleAlgorithm::Linear) => grayscale(buffer, intensity),
        (FilterKind::Grayscale, GrayscaleAlgorithm::Contrast { boost }) => {
            apply_contrast_grayscale(buffer, intensity, boost)
        }
        (FilterKind::Opacity, _) => opacity(buffer, intensity),
    };
    tracing::trace!(
        filter = %spec.kind,
        intensity,
        width = buffer.width,
        height = buffer.height,
        "filter applied"
    );
    Ok(output)
}

pub(crate) fn luma(r: u8, g: u8, b: u8) -> f64 {
    (LUMA_R * f64::from(r) + LUMA_G * f64::from(g) + LUMA_B * f64::from(b)).round()
}

pub(crate) fn round_channel(value: f64) -> u8 {
    let rounded = value.round().clamp(0.0, 255.0);
    rounded as u8
}

fn grayscale(buffer: &PixelBuffer, intensity: u8) -> PixelBuffer {
    let mut output = buffer.clone();
    if intensity == MIN_INTENSITY {
        return output;
    }

    let factor = f64::from(intensity) / 100.0;
    for pixel in output.pixels.chunks_exact_mut(4) {
        let gray = luma(pixel[0], pixel[1], pixel[2]);
        for channel in &mut pixel[..3] {
            let original = f64::from(*channel);
            *channel = round_channel(original + (gray - original) * factor);
        }
    }
    output
}

fn opacity(buffer: &PixelBuffer, intensity: u8) -> PixelBuffer {
    let mut output = buffer.clone();
    if intensity == MAX_INTENSITY {
        return output;
    }

    let factor = f64::from(intensity) / 100.0;
    for pixel in output.pixels.chunks_exact_mut(4) {
        pixel[3] = round_channel(f64::from(pixel[3]) * factor);
    }
    output
}
