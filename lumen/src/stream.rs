//! Stream decoding on top of an [`ImageVideoWrapper`] decoder

use std::io::{self, Read};

use crate::decoder::ResourceDecoder;
use crate::model::ImageVideoWrapper;

const ID: &str = "ImageVideoStreamDecoder.lumen.resource.drawable";

/// Decodes a bare byte stream by wrapping it (with no file handle) and
/// handing it to a decoder that understands [`ImageVideoWrapper`].
///
/// The result and any error come back from the wrapped decoder untouched.
#[derive(Debug, Clone)]
pub struct StreamDecoder<D> {
    wrapper_decoder: D,
}

impl<D> StreamDecoder<D> {
    pub fn new(wrapper_decoder: D) -> Self {
        Self { wrapper_decoder }
    }

    pub fn wrapper_decoder(&self) -> &D {
        &self.wrapper_decoder
    }

    /// Constant, independent of the wrapped decoder
    pub fn id(&self) -> &'static str {
        ID
    }
}

impl<R, D> ResourceDecoder<R> for StreamDecoder<D>
where
    R: Read,
    D: ResourceDecoder<ImageVideoWrapper<R>>,
{
    type Output = D::Output;

    fn decode(&self, source: R, width: u32, height: u32) -> io::Result<D::Output> {
        self.wrapper_decoder
            .decode(ImageVideoWrapper::from_stream(source), width, height)
    }

    fn id(&self) -> &str {
        ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Mutex;

    /// What the wrapped decoder saw on one call
    #[derive(Debug, Clone, PartialEq)]
    struct Seen {
        bytes: Vec<u8>,
        had_file_descriptor: bool,
        width: u32,
        height: u32,
    }

    /// Reads the whole stream and reports what it got
    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<Seen>>,
    }

    impl<R: Read> ResourceDecoder<ImageVideoWrapper<R>> for Recording {
        type Output = Seen;

        fn decode(
            &self,
            source: ImageVideoWrapper<R>,
            width: u32,
            height: u32,
        ) -> io::Result<Seen> {
            let had_file_descriptor = source.file_descriptor().is_some();
            let (stream, _) = source.into_parts();
            let mut bytes = Vec::new();
            if let Some(mut stream) = stream {
                stream.read_to_end(&mut bytes)?;
            }
            let seen = Seen {
                bytes,
                had_file_descriptor,
                width,
                height,
            };
            self.calls.lock().unwrap().push(seen.clone());
            Ok(seen)
        }

        fn id(&self) -> &str {
            "Recording"
        }
    }

    /// Returns the same value whatever it is given
    struct Placeholder(&'static str);

    impl<R> ResourceDecoder<ImageVideoWrapper<R>> for Placeholder {
        type Output = &'static str;

        fn decode(&self, _: ImageVideoWrapper<R>, _: u32, _: u32) -> io::Result<&'static str> {
            Ok(self.0)
        }

        fn id(&self) -> &str {
            "Placeholder"
        }
    }

    struct BrokenStream;

    impl Read for BrokenStream {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "stream went away"))
        }
    }

    #[test]
    fn decode_matches_wrapping_by_hand() {
        let adapter = StreamDecoder::new(Recording::default());
        let data = b"not really an image".to_vec();

        for (width, height) in [(0, 0), (1, 1), (100, 250), (u32::MAX, 7)] {
            let via_adapter = adapter
                .decode(Cursor::new(data.clone()), width, height)
                .unwrap();
            let direct = adapter
                .wrapper_decoder()
                .decode(
                    ImageVideoWrapper::from_stream(Cursor::new(data.clone())),
                    width,
                    height,
                )
                .unwrap();
            assert_eq!(via_adapter, direct);
        }
    }

    #[test]
    fn one_wrapped_call_per_decode_without_file_descriptor() {
        let adapter = StreamDecoder::new(Recording::default());

        adapter.decode(Cursor::new(vec![9u8; 16]), 30, 40).unwrap();

        let calls = adapter.wrapper_decoder().calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            Seen {
                bytes: vec![9; 16],
                had_file_descriptor: false,
                width: 30,
                height: 40,
            }
        );
    }

    #[test]
    fn placeholder_result_is_returned_as_is() {
        let adapter = StreamDecoder::new(Placeholder("placeholder"));
        let result = adapter.decode(Cursor::new(b"anything"), 100, 100).unwrap();
        assert_eq!(result, "placeholder");
    }

    #[test]
    fn read_errors_come_back_unchanged() {
        let adapter = StreamDecoder::new(Recording::default());

        let err = adapter.decode(BrokenStream, 50, 50).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(err.to_string(), "stream went away");
        assert!(adapter.wrapper_decoder().calls.lock().unwrap().is_empty());
    }

    #[test]
    fn id_is_constant() {
        let adapter = StreamDecoder::new(Placeholder("a"));
        let other = StreamDecoder::new(Recording::default());

        let first = adapter.id();
        adapter.decode(Cursor::new(b""), 1, 1).unwrap();
        assert_eq!(first, adapter.id());
        assert_eq!(first, other.id());
        assert_eq!(
            ResourceDecoder::<Cursor<Vec<u8>>>::id(&adapter),
            adapter.id()
        );
    }

    #[test]
    fn concurrent_decodes_do_not_interfere() {
        let adapter = StreamDecoder::new(Recording::default());

        std::thread::scope(|scope| {
            for i in 0..8u8 {
                let adapter = &adapter;
                scope.spawn(move || {
                    let seen = adapter
                        .decode(Cursor::new(vec![i; i as usize + 1]), i as u32, 0)
                        .unwrap();
                    assert_eq!(seen.bytes, vec![i; i as usize + 1]);
                    assert_eq!(seen.width, i as u32);
                });
            }
        });

        assert_eq!(adapter.wrapper_decoder().calls.lock().unwrap().len(), 8);
    }
}
