//! Cache keys for decoded resources

use std::fmt;

use crate::decoder::ResourceDecoder;

/// Everything that changes the output of a decode besides the source itself
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DecodeKey {
    pub decoder_id: String,
    pub width: u32,
    pub height: u32,
}

impl DecodeKey {
    pub fn new(decoder_id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            decoder_id: decoder_id.into(),
            width,
            height,
        }
    }

    /// Key for `decoder` producing a `width` x `height` output. The source
    /// identity is left to the caller's cache.
    pub fn for_decoder<S, D>(decoder: &D, width: u32, height: u32) -> Self
    where
        D: ResourceDecoder<S> + ?Sized,
    {
        Self::new(decoder.id(), width, height)
    }
}

impl fmt::Display for DecodeKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}x{}", self.decoder_id, self.width, self.height)
    }
}

#[test]
fn key_changes_with_size_and_decoder() {
    let key = DecodeKey::new("ImageVideoStreamDecoder.lumen.resource.drawable", 100, 50);
    assert_eq!(
        key.to_string(),
        "ImageVideoStreamDecoder.lumen.resource.drawable/100x50"
    );
    assert_ne!(key, DecodeKey::new(key.decoder_id.clone(), 50, 100));
    assert_ne!(key, DecodeKey::new("other", 100, 50));
}

#[test]
fn key_follows_the_decoder_id() {
    use crate::bitmap::ImageVideoBitmapDecoder;
    use crate::downsample::Downsampler;
    use crate::model::ImageVideoWrapper;
    use std::io::Cursor;

    type Source = ImageVideoWrapper<Cursor<Vec<u8>>>;

    let at_most = ImageVideoBitmapDecoder::new(Downsampler::AtMost);
    let at_least = ImageVideoBitmapDecoder::new(Downsampler::AtLeast);

    let key = DecodeKey::for_decoder::<Source, _>(&at_most, 100, 100);
    assert_eq!(key.decoder_id, at_most.id());
    assert_eq!((key.width, key.height), (100, 100));
    assert_ne!(key, DecodeKey::for_decoder::<Source, _>(&at_least, 100, 100));
    assert_eq!(
        key,
        DecodeKey::for_decoder::<Source, _>(&ImageVideoBitmapDecoder::default(), 100, 100)
    );
}
