//! Decoding many files at once

use anyhow::Result;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::instrument;
use walkdir::WalkDir;

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::decoder::ResourceDecoder;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff"];

#[derive(Debug)]
pub struct DecodedFile<T> {
    pub path: PathBuf,
    pub resource: T,
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Expand directories (recursively) and keep files with an image extension.
/// Explicitly named files are kept whatever their extension.
#[instrument(skip(inputs), fields(num_inputs = inputs.len()))]
pub fn find_images(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in inputs {
        if path.is_dir() {
            for entry in WalkDir::new(path).follow_links(true) {
                match entry {
                    Ok(entry) if entry.file_type().is_file() && is_image(entry.path()) => {
                        files.push(entry.into_path());
                    }
                    Ok(_) => {}
                    Err(e) => log::warn!("Skipping unreadable entry: {}", e),
                }
            }
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            anyhow::bail!("Input does not exist: {}", path.display());
        }
    }

    // the same file can be reached through more than one input
    files.sort();
    files.dedup();
    files.sort_by_key(|path| {
        path.file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_lowercase()
    });

    log::debug!("Found {} image files", files.len());
    Ok(files)
}

/// Decode every file in parallel, one stream per file. Files that fail to
/// open or decode are logged and left out.
#[instrument(skip(paths, decoder), fields(num_files = paths.len()))]
pub fn decode_files<D>(
    paths: &[PathBuf],
    decoder: &D,
    width: u32,
    height: u32,
) -> Vec<DecodedFile<D::Output>>
where
    D: ResourceDecoder<File> + Sync,
    D::Output: Send,
{
    log::info!(
        "Decoding {} files at {}x{} with {}",
        paths.len(),
        width,
        height,
        decoder.id()
    );

    let mut decoded: Vec<_> = paths
        .par_iter()
        .filter_map(|path| {
            let file = File::open(path)
                .map_err(|e| log::warn!("Failed to open {}: {}", path.display(), e))
                .ok()?;
            let resource = decoder
                .decode(file, width, height)
                .map_err(|e| log::warn!("Failed to decode {}: {}", path.display(), e))
                .ok()?;
            log::trace!("Decoded {}", path.display());
            Some(DecodedFile {
                path: path.clone(),
                resource,
            })
        })
        .collect();

    decoded.sort_unstable_by(|a, b| a.path.cmp(&b.path));
    decoded
}
