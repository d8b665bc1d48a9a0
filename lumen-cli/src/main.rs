use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use lumen::batch::{self, DecodedFile};
use lumen::{
    BitmapResource, DecodeConfig, DecodeKey, Downsampler, ImageFormat, ImageVideoBitmapDecoder,
    ImageVideoWrapper, PngCompression, Resource, StreamDecoder,
};

const DEFAULT_QUALITY: u8 = 85;

#[derive(Parser)]
#[command(name = "lumen-cli")]
#[command(about = "Decode images (optionally downsampled) and write them back out", long_about = None)]
#[command(version)]
struct Args {
    /// Input images or directories of images
    #[arg(value_name = "INPUT", required = true)]
    input: Vec<PathBuf>,

    /// Target width in pixels, 0 keeps the original width
    #[arg(long, value_name = "PIXELS")]
    width: Option<u32>,

    /// Target height in pixels, 0 keeps the original height
    #[arg(long, value_name = "PIXELS")]
    height: Option<u32>,

    /// How decoded images are fitted to the target size
    #[arg(long, value_enum)]
    downsampler: Option<DownsamplerArg>,

    /// Write the decoded images to this directory
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Image format for written images
    #[arg(long, value_enum)]
    image_format: Option<ImageFormatArg>,

    /// JPEG quality (1-100)
    #[arg(long, value_name = "QUALITY")]
    quality: Option<u8>,

    /// PNG compression level
    #[arg(long, value_enum)]
    png_compression: Option<PngCompressionArg>,

    /// Log the cache key for this run. It covers decoder and size, the
    /// file itself is identified by its path.
    #[arg(long, default_value_t)]
    print_key: bool,

    /// Save the effective size/format settings as the new defaults
    #[arg(long, default_value_t)]
    save_config: bool,

    /// Verbose output
    #[arg(short, long, default_value_t)]
    verbose: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, default_value_t)]
    quiet: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum DownsamplerArg {
    AtLeast,
    AtMost,
    None,
}

impl From<DownsamplerArg> for Downsampler {
    fn from(arg: DownsamplerArg) -> Self {
        match arg {
            DownsamplerArg::AtLeast => Downsampler::AtLeast,
            DownsamplerArg::AtMost => Downsampler::AtMost,
            DownsamplerArg::None => Downsampler::None,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ImageFormatArg {
    Jpeg,
    Png,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PngCompressionArg {
    Fast,
    Default,
    Best,
}

impl From<PngCompressionArg> for PngCompression {
    fn from(arg: PngCompressionArg) -> Self {
        match arg {
            PngCompressionArg::Fast => PngCompression::Fast,
            PngCompressionArg::Default => PngCompression::Default,
            PngCompressionArg::Best => PngCompression::Best,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose, args.quiet);

    let config = build_config(&args, DecodeConfig::load().unwrap_or_default())?;
    if args.save_config {
        match config.save() {
            Some(()) => log::info!("Saved defaults"),
            None => log::warn!("Could not save defaults"),
        }
    }

    let files = batch::find_images(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No images found in the given inputs");
    }

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir).context("Failed to create output directory")?;
    }

    let decoder = StreamDecoder::new(ImageVideoBitmapDecoder::new(config.downsampler));

    if args.print_key {
        // the stream wrapper doesn't change the output, so the bitmap decoder's id is the one that matters
        let key = DecodeKey::for_decoder::<ImageVideoWrapper<File>, _>(
            decoder.wrapper_decoder(),
            config.width,
            config.height,
        );
        log::info!("Cache key: {key}");
    }

    if !args.quiet {
        log::info!("Decoding {} images...", files.len());
    }

    let decoded = batch::decode_files(&files, &decoder, config.width, config.height);

    let mut names = OutputNames::default();
    for DecodedFile { path, resource } in &decoded {
        let (width, height) = resource.dimensions();
        log::info!(
            "{}: {width}x{height} ({} bytes)",
            path.display(),
            resource.size()
        );

        if let Some(dir) = &args.output_dir {
            let name = names.next(path, config.image_format);
            let output = write_image(&dir.join(name), resource, config.image_format)?;
            log::debug!("Wrote {}", output.display());
        }
    }

    let failed = files.len() - decoded.len();
    if failed > 0 {
        log::warn!("{failed} of {} images could not be decoded", files.len());
    }

    if !args.quiet {
        log::info!("Done: {} images decoded", decoded.len());
    }

    Ok(())
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Flags win over `saved`. Quality and compression flags without
/// `--image-format` adjust the saved format when they apply to it.
fn build_config(args: &Args, saved: DecodeConfig) -> Result<DecodeConfig> {
    if let Some(quality) = args.quality {
        if quality == 0 || quality > 100 {
            anyhow::bail!("Quality must be between 1 and 100");
        }
    }

    let saved_quality = match saved.image_format {
        ImageFormat::Jpeg { quality } => quality,
        ImageFormat::Png { .. } => DEFAULT_QUALITY,
    };
    let saved_compression = match saved.image_format {
        ImageFormat::Png { compression } => compression,
        ImageFormat::Jpeg { .. } => PngCompression::Default,
    };
    let quality = args.quality.unwrap_or(saved_quality);
    let compression = args
        .png_compression
        .map(Into::into)
        .unwrap_or(saved_compression);

    let format = args.image_format.unwrap_or(match saved.image_format {
        ImageFormat::Jpeg { .. } => ImageFormatArg::Jpeg,
        ImageFormat::Png { .. } => ImageFormatArg::Png,
    });
    let image_format = match format {
        ImageFormatArg::Jpeg => {
            if args.png_compression.is_some() {
                log::warn!("--png-compression has no effect on JPEG output");
            }
            ImageFormat::Jpeg { quality }
        }
        ImageFormatArg::Png => {
            if args.quality.is_some() {
                log::warn!("--quality has no effect on PNG output");
            }
            ImageFormat::Png { compression }
        }
    };

    Ok(DecodeConfig {
        width: args.width.unwrap_or(saved.width),
        height: args.height.unwrap_or(saved.height),
        downsampler: args.downsampler.map(Into::into).unwrap_or(saved.downsampler),
        image_format,
    })
}

/// Hands out output file names, numbering repeats of the same stem
#[derive(Default)]
struct OutputNames {
    used: HashSet<String>,
}

impl OutputNames {
    fn next(&mut self, source: &Path, format: ImageFormat) -> String {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        let extension = format.extension();

        let mut name = format!("{stem}.{extension}");
        let mut n = 1;
        while !self.used.insert(name.clone()) {
            name = format!("{stem}_{n:03}.{extension}");
            n += 1;
        }
        name
    }
}

fn write_image(output: &Path, resource: &BitmapResource, format: ImageFormat) -> Result<PathBuf> {
    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    lumen::encode::encode(resource.get(), format, &mut writer)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    writer.flush()?;

    Ok(output.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::image::DynamicImage;

    fn parse(flags: &[&str]) -> Args {
        let mut argv = vec!["lumen-cli", "in.png"];
        argv.extend_from_slice(flags);
        Args::try_parse_from(argv).unwrap()
    }

    fn saved() -> DecodeConfig {
        DecodeConfig {
            width: 640,
            height: 480,
            downsampler: Downsampler::AtLeast,
            image_format: ImageFormat::Png {
                compression: PngCompression::Best,
            },
        }
    }

    #[test]
    fn saved_values_fill_missing_flags() {
        let config = build_config(&parse(&[]), saved()).unwrap();
        assert_eq!(config, saved());
    }

    #[test]
    fn flags_override_saved_values() {
        let args = parse(&[
            "--width",
            "100",
            "--height",
            "0",
            "--downsampler",
            "none",
            "--image-format",
            "jpeg",
            "--quality",
            "60",
        ]);

        let config = build_config(&args, saved()).unwrap();

        assert_eq!(config.width, 100);
        assert_eq!(config.height, 0);
        assert_eq!(config.downsampler, Downsampler::None);
        assert_eq!(config.image_format, ImageFormat::Jpeg { quality: 60 });
    }

    #[test]
    fn format_options_apply_to_saved_format() {
        let png = build_config(&parse(&["--png-compression", "fast"]), saved()).unwrap();
        assert_eq!(
            png.image_format,
            ImageFormat::Png {
                compression: PngCompression::Fast
            }
        );

        let saved_jpeg = DecodeConfig {
            image_format: ImageFormat::Jpeg { quality: 70 },
            ..saved()
        };
        let jpeg = build_config(&parse(&["--quality", "40"]), saved_jpeg.clone()).unwrap();
        assert_eq!(jpeg.image_format, ImageFormat::Jpeg { quality: 40 });

        let unchanged = build_config(&parse(&[]), saved_jpeg).unwrap();
        assert_eq!(unchanged.image_format, ImageFormat::Jpeg { quality: 70 });
    }

    #[test]
    fn switching_to_jpeg_uses_default_quality() {
        let config = build_config(&parse(&["--image-format", "jpeg"]), saved()).unwrap();
        assert_eq!(
            config.image_format,
            ImageFormat::Jpeg {
                quality: DEFAULT_QUALITY
            }
        );
    }

    #[test]
    fn quality_out_of_range_is_rejected() {
        assert!(build_config(&parse(&["--quality", "0"]), saved()).is_err());
        assert!(build_config(&parse(&["--quality", "101"]), saved()).is_err());
    }

    #[test]
    fn repeated_stems_get_distinct_names() {
        let mut names = OutputNames::default();
        let png = ImageFormat::Png {
            compression: PngCompression::Fast,
        };

        let first = names.next(Path::new("a/x.png"), png);
        let second = names.next(Path::new("b/x.jpg"), png);
        let third = names.next(Path::new("c/x.gif"), png);
        let other = names.next(Path::new("a/y.png"), png);

        assert_eq!(first, "x.png");
        assert_eq!(second, "x_001.png");
        assert_eq!(third, "x_002.png");
        assert_eq!(other, "y.png");
    }

    #[test]
    fn written_images_do_not_overwrite_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let format = ImageFormat::Png {
            compression: PngCompression::Fast,
        };
        let small = BitmapResource::new(DynamicImage::new_rgb8(2, 2));
        let large = BitmapResource::new(DynamicImage::new_rgb8(5, 3));

        let mut names = OutputNames::default();
        let first = write_image(
            &dir.path().join(names.next(Path::new("a/x.png"), format)),
            &small,
            format,
        )
        .unwrap();
        let second = write_image(
            &dir.path().join(names.next(Path::new("b/x.jpg"), format)),
            &large,
            format,
        )
        .unwrap();

        assert_ne!(first, second);
        let first = imageproc::image::open(&first).unwrap();
        let second = imageproc::image::open(&second).unwrap();
        assert_eq!((first.width(), first.height()), (2, 2));
        assert_eq!((second.width(), second.height()), (5, 3));
    }
}
