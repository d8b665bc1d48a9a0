//! Target-size policy for decoded bitmaps

use std::io;

use fast_image_resize as fr;
use fr::images::Image as FrImage;
use imageproc::image::{DynamicImage, RgbaImage};

use crate::decoder::SIZE_ORIGINAL;

/// How a decoded bitmap is fitted to the requested size. Never upscales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Downsampler {
    /// Smallest size where both sides are still at least the target
    AtLeast,
    /// Largest size that fits inside the target
    #[default]
    AtMost,
    /// Keep the decoded size
    None,
}

impl Downsampler {
    pub fn id(&self) -> &'static str {
        match self {
            Downsampler::AtLeast => "AT_LEAST.lumen.bitmap",
            Downsampler::AtMost => "AT_MOST.lumen.bitmap",
            Downsampler::None => "NONE.lumen.bitmap",
        }
    }

    /// Output dimensions for a `source` sized bitmap asked to fit
    /// `width` x `height`. `0` and [`SIZE_ORIGINAL`] leave an axis free.
    pub fn target_dimensions(&self, source: (u32, u32), width: u32, height: u32) -> (u32, u32) {
        let (src_width, src_height) = source;
        if src_width == 0 || src_height == 0 {
            return source;
        }

        let axis_ratio = |target: u32, src: u32| {
            if target == 0 || target == SIZE_ORIGINAL {
                None
            } else {
                Some(target as f64 / src as f64)
            }
        };
        let width_ratio = axis_ratio(width, src_width);
        let height_ratio = axis_ratio(height, src_height);

        let ratio = match (self, width_ratio, height_ratio) {
            (Downsampler::None, _, _) | (_, None, None) => return source,
            (_, Some(r), None) | (_, None, Some(r)) => r,
            (Downsampler::AtMost, Some(w), Some(h)) => w.min(h),
            (Downsampler::AtLeast, Some(w), Some(h)) => w.max(h),
        };

        if ratio >= 1.0 {
            return source;
        }

        let scale = |src: u32| ((src as f64 * ratio).round() as u32).max(1);
        (scale(src_width), scale(src_height))
    }
}

/// Resize to exactly `dimensions`. Lanczos3, since this only ever shrinks.
pub fn resize(img: &DynamicImage, dimensions: (u32, u32)) -> io::Result<DynamicImage> {
    let (new_width, new_height) = dimensions;
    if (img.width(), img.height()) == dimensions {
        return Ok(img.clone());
    }

    let src = img.to_rgba8();
    let (width, height) = src.dimensions();
    let src_image = FrImage::from_vec_u8(width, height, src.into_raw(), fr::PixelType::U8x4)
        .map_err(io::Error::other)?;

    let mut dst_buffer = vec![0u8; new_width as usize * new_height as usize * 4];
    let mut dst_image =
        FrImage::from_slice_u8(new_width, new_height, &mut dst_buffer, fr::PixelType::U8x4)
            .map_err(io::Error::other)?;

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(
            &src_image,
            &mut dst_image,
            Some(
                &fr::ResizeOptions::new()
                    .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3)),
            ),
        )
        .map_err(io::Error::other)?;

    let resized = RgbaImage::from_raw(new_width, new_height, dst_buffer).ok_or_else(|| {
        io::Error::other(format!(
            "resized buffer does not fit {new_width}x{new_height}"
        ))
    })?;

    log::trace!("Resized {width}x{height} -> {new_width}x{new_height}");
    Ok(DynamicImage::ImageRgba8(resized))
}
