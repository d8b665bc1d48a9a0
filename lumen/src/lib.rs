pub mod batch;
pub mod bitmap;
pub mod config;
pub mod decoder;
pub mod downsample;
pub mod encode;
pub mod key;
pub mod model;
pub mod resource;
pub mod stream;

// Re-export commonly used types
pub use bitmap::ImageVideoBitmapDecoder;
pub use config::DecodeConfig;
pub use decoder::{ResourceDecoder, SIZE_ORIGINAL};
pub use downsample::Downsampler;
pub use encode::{ImageFormat, PngCompression};
pub use key::DecodeKey;
pub use model::ImageVideoWrapper;
pub use resource::{BitmapResource, Resource, SimpleResource};
pub use stream::StreamDecoder;
