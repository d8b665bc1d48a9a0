//! Bitmap decoding for [`ImageVideoWrapper`] sources

use std::io::{self, BufReader, Read};

use imageproc::image::{load_from_memory, ImageError};

use crate::decoder::ResourceDecoder;
use crate::downsample::{self, Downsampler};
use crate::model::ImageVideoWrapper;
use crate::resource::BitmapResource;

/// Decodes the stream of a wrapped source into a [`BitmapResource`], falling
/// back to the file handle when no stream is present.
///
/// Format detection is left to the `image` crate.
#[derive(Debug, Clone)]
pub struct ImageVideoBitmapDecoder {
    downsampler: Downsampler,
    id: String,
}

impl ImageVideoBitmapDecoder {
    pub fn new(downsampler: Downsampler) -> Self {
        Self {
            downsampler,
            id: format!(
                "ImageVideoBitmapDecoder.lumen.resource.bitmap/{}",
                downsampler.id()
            ),
        }
    }

    pub fn downsampler(&self) -> Downsampler {
        self.downsampler
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn decode_bytes(&self, data: &[u8], width: u32, height: u32) -> io::Result<BitmapResource> {
        let img = load_from_memory(data).map_err(into_io_error)?;
        let source = (img.width(), img.height());
        let target = self.downsampler.target_dimensions(source, width, height);

        log::debug!(
            "Decoded {}x{} bitmap, target {}x{} ({:?})",
            source.0,
            source.1,
            target.0,
            target.1,
            self.downsampler
        );

        let img = if target == source {
            img
        } else {
            downsample::resize(&img, target)?
        };

        Ok(BitmapResource::new(img))
    }
}

impl Default for ImageVideoBitmapDecoder {
    fn default() -> Self {
        Self::new(Downsampler::default())
    }
}

impl<R: Read> ResourceDecoder<ImageVideoWrapper<R>> for ImageVideoBitmapDecoder {
    type Output = BitmapResource;

    fn decode(
        &self,
        source: ImageVideoWrapper<R>,
        width: u32,
        height: u32,
    ) -> io::Result<BitmapResource> {
        let mut data = Vec::new();
        match source.into_parts() {
            (Some(stream), _) => {
                BufReader::new(stream).read_to_end(&mut data)?;
            }
            (None, Some(file)) => {
                log::trace!("No stream, decoding from file handle");
                BufReader::new(file).read_to_end(&mut data)?;
            }
            (None, None) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "wrapped source has neither a stream nor a file handle",
                ));
            }
        }

        self.decode_bytes(&data, width, height)
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Read failures surface as themselves; anything the codec rejects is
/// `InvalidData`.
fn into_io_error(err: ImageError) -> io::Error {
    match err {
        ImageError::IoError(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}
