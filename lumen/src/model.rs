//! Source values handed to decoders

use std::fs::File;

/// A source that is either a byte stream, an open file, or both.
///
/// Lets a single decoder accept a plain stream (images) and a seekable file
/// handle (video frames) through one input type. Built fresh for each decode
/// call and consumed by it.
#[derive(Debug)]
pub struct ImageVideoWrapper<R> {
    stream: Option<R>,
    file_descriptor: Option<File>,
}

impl<R> ImageVideoWrapper<R> {
    pub fn new(stream: Option<R>, file_descriptor: Option<File>) -> Self {
        Self {
            stream,
            file_descriptor,
        }
    }

    /// Stream only, no file handle
    pub fn from_stream(stream: R) -> Self {
        Self::new(Some(stream), None)
    }

    pub fn from_file(file: File) -> Self {
        Self::new(None, Some(file))
    }

    pub fn stream(&self) -> Option<&R> {
        self.stream.as_ref()
    }

    pub fn file_descriptor(&self) -> Option<&File> {
        self.file_descriptor.as_ref()
    }

    pub fn into_parts(self) -> (Option<R>, Option<File>) {
        (self.stream, self.file_descriptor)
    }
}
