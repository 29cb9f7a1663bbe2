//! Output encoding.
//! JPEG at quality 100 is the default; PNG is available when exact pixels matter.

use crate::error::{ConfigError, EncodeError};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder, RgbaImage};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

pub const DEFAULT_JPEG_QUALITY: u8 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg { quality: u8 },
    Png,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl OutputFormat {
    /// JPEG with an explicit quality, 1..=100.
    pub fn jpeg(quality: u8) -> Result<Self, ConfigError> {
        if !(1..=100).contains(&quality) {
            return Err(ConfigError::BadQuality(quality));
        }
        Ok(OutputFormat::Jpeg { quality })
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg { .. } => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Jpeg { quality } => write!(f, "jpeg (quality {})", quality),
            OutputFormat::Png => write!(f, "png"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    /// Accepts `jpeg`, `jpg` or `png`; JPEG gets the default quality.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::default()),
            "png" => Ok(OutputFormat::Png),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// Encodes `img` into `writer`.
pub fn encode<W: Write>(img: &RgbaImage, format: OutputFormat, writer: W) -> Result<(), EncodeError> {
    let (width, height) = img.dimensions();
    match format {
        OutputFormat::Jpeg { quality } => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
            JpegEncoder::new_with_quality(writer, quality).write_image(
                rgb.as_raw(),
                width,
                height,
                image::ExtendedColorType::Rgb8,
            )?;
        }
        OutputFormat::Png => {
            PngEncoder::new(writer).write_image(
                img.as_raw(),
                width,
                height,
                image::ExtendedColorType::Rgba8,
            )?;
        }
    }
    Ok(())
}

pub fn encode_to_vec(img: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    encode(img, format, &mut buf)?;
    Ok(buf)
}
