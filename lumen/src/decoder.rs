//! The decoding seam every loader stage plugs into

use std::io;
use std::rc::Rc;
use std::sync::Arc;

/// Requested dimension meaning "keep the source size along this axis"
pub const SIZE_ORIGINAL: u32 = u32::MAX;

/// Decodes a source of type `S` into a managed resource.
///
/// `width` and `height` are the size the caller wants to display at. How a
/// decoder interprets them (including `0` and [`SIZE_ORIGINAL`]) is up to the
/// decoder.
pub trait ResourceDecoder<S> {
    type Output;

    fn decode(&self, source: S, width: u32, height: u32) -> io::Result<Self::Output>;

    /// Stable identifier folded into cache keys. Two decoders producing
    /// different output for the same input must not share an id.
    fn id(&self) -> &str;
}

impl<S, D> ResourceDecoder<S> for &D
where
    D: ResourceDecoder<S> + ?Sized,
{
    type Output = D::Output;

    fn decode(&self, source: S, width: u32, height: u32) -> io::Result<Self::Output> {
        (**self).decode(source, width, height)
    }

    fn id(&self) -> &str {
        (**self).id()
    }
}

impl<S, D> ResourceDecoder<S> for Box<D>
where
    D: ResourceDecoder<S> + ?Sized,
{
    type Output = D::Output;

    fn decode(&self, source: S, width: u32, height: u32) -> io::Result<Self::Output> {
        (**self).decode(source, width, height)
    }

    fn id(&self) -> &str {
        (**self).id()
    }
}

impl<S, D> ResourceDecoder<S> for Arc<D>
where
    D: ResourceDecoder<S> + ?Sized,
{
    type Output = D::Output;

    fn decode(&self, source: S, width: u32, height: u32) -> io::Result<Self::Output> {
        (**self).decode(source, width, height)
    }

    fn id(&self) -> &str {
        (**self).id()
    }
}

impl<S, D> ResourceDecoder<S> for Rc<D>
where
    D: ResourceDecoder<S> + ?Sized,
{
    type Output = D::Output;

    fn decode(&self, source: S, width: u32, height: u32) -> io::Result<Self::Output> {
        (**self).decode(source, width, height)
    }

    fn id(&self) -> &str {
        (**self).id()
    }
}
