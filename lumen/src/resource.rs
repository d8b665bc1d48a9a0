//! Managed handles returned by decoders

use imageproc::image::DynamicImage;

/// A decoded value plus the bookkeeping a resource manager needs.
pub trait Resource<T> {
    fn get(&self) -> &T;

    /// Approximate memory held, in bytes
    fn size(&self) -> usize;

    /// Release whatever can be released. Calling it twice is a no-op.
    fn recycle(&mut self);
}

/// Wraps a plain value that has nothing to release
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleResource<T>(T);

impl<T> SimpleResource<T> {
    pub fn new(value: T) -> Self {
        SimpleResource(value)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Resource<T> for SimpleResource<T> {
    fn get(&self) -> &T {
        &self.0
    }

    fn size(&self) -> usize {
        std::mem::size_of::<T>()
    }

    fn recycle(&mut self) {}
}

/// A decoded bitmap
#[derive(Debug, Clone)]
pub struct BitmapResource {
    image: DynamicImage,
    recycled: bool,
}

impl BitmapResource {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image,
            recycled: false,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn is_recycled(&self) -> bool {
        self.recycled
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }
}

impl Resource<DynamicImage> for BitmapResource {
    fn get(&self) -> &DynamicImage {
        &self.image
    }

    fn size(&self) -> usize {
        self.image.as_bytes().len()
    }

    fn recycle(&mut self) {
        if self.recycled {
            return;
        }
        log::trace!("Recycling {}x{} bitmap", self.image.width(), self.image.height());
        // swap in an empty buffer so the pixel data is freed now, not when the handle drops
        self.image = DynamicImage::new_rgba8(0, 0);
        self.recycled = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_size_tracks_pixel_buffer() {
        let resource = BitmapResource::new(DynamicImage::new_rgba8(10, 4));
        assert_eq!(resource.size(), 10 * 4 * 4);
        assert_eq!(resource.dimensions(), (10, 4));
    }

    #[test]
    fn recycle_releases_pixels_once() {
        let mut resource = BitmapResource::new(DynamicImage::new_luma8(8, 8));
        resource.recycle();
        assert!(resource.is_recycled());
        assert_eq!(resource.size(), 0);
        assert_eq!(resource.dimensions(), (0, 0));

        resource.recycle();
        assert!(resource.is_recycled());
    }

    #[test]
    fn simple_resource_is_a_plain_box() {
        let mut resource = SimpleResource::new(42u64);
        assert_eq!(*resource.get(), 42);
        assert_eq!(resource.size(), 8);
        resource.recycle();
        assert_eq!(resource.into_inner(), 42);
    }
}
