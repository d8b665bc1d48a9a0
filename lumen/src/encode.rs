//! Writing decoded bitmaps back out: JPEG, PNG

use anyhow::{Context, Result};
use imageproc::image::codecs::jpeg::JpegEncoder;
use imageproc::image::codecs::png::{CompressionType, FilterType, PngEncoder};
use imageproc::image::{ColorType, DynamicImage, ImageEncoder};

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ImageFormat {
    Jpeg { quality: u8 },
    Png { compression: PngCompression },
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg { .. } => "jpg",
            ImageFormat::Png { .. } => "png",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum PngCompression {
    Fast,
    Default,
    Best,
}

pub fn encode<W>(img: &DynamicImage, format: ImageFormat, writer: &mut W) -> Result<()>
where
    W: std::io::Write,
{
    match format {
        ImageFormat::Jpeg { quality } => {
            // JPEG has no alpha channel
            let img = match img.color() {
                ColorType::L8 | ColorType::Rgb8 => img.clone(),
                _ => DynamicImage::ImageRgb8(img.to_rgb8()),
            };
            JpegEncoder::new_with_quality(writer, quality.clamp(1, 100))
                .write_image(
                    img.as_bytes(),
                    img.width(),
                    img.height(),
                    img.color().into(),
                )
                .context("Failed to encode image as JPEG")?;
        }
        ImageFormat::Png { compression } => {
            let compression_type = match compression {
                PngCompression::Fast => CompressionType::Fast,
                PngCompression::Default => CompressionType::Default,
                PngCompression::Best => CompressionType::Best,
            };
            let is_grayscale = matches!(img.color(), ColorType::L8 | ColorType::La8);
            let filter = if is_grayscale {
                FilterType::NoFilter
            } else {
                FilterType::Adaptive
            };

            PngEncoder::new_with_quality(writer, compression_type, filter)
                .write_image(
                    img.as_bytes(),
                    img.width(),
                    img.height(),
                    img.color().into(),
                )
                .context("Failed to encode image as PNG")?;
        }
    }

    Ok(())
}
