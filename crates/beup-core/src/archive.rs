//! Zip packaging of the build-environment directories.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{info, warn};
use walkdir::WalkDir;
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

use crate::{errors::Error, Result};

/// Create one deflate-compressed zip under `dest_dir` holding the recursive
/// contents of every existing source path.
///
/// Missing source paths are skipped with a warning; any IO or zip failure
/// while writing entries aborts the whole archive. Entry names are relative
/// to the source directory's parent (so `~/.gradle/caches` lands in the
/// archive as `.gradle/caches/...`), or to the common ancestor of all
/// requested paths when a source is a single file.
pub fn create_archive(
    dest_dir: &Path,
    base_name: &str,
    source_paths: &[PathBuf],
) -> Result<PathBuf> {
    fs::create_dir_all(dest_dir)?;
    let archive_path = dest_dir.join(format!("{base_name}.zip"));

    let file = fs::File::create(&archive_path)?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);

    let common_root = common_ancestor(source_paths);

    for source in source_paths {
        if !source.exists() {
            warn!("source path not found, skipping: {}", source.display());
            continue;
        }

        let base = if source.is_dir() {
            source.parent().map(Path::to_path_buf)
        } else {
            common_root.clone()
        };

        for entry in WalkDir::new(source) {
            let entry = entry.map_err(|e| {
                Error::Archive(format!("walk failed under {}: {e}", source.display()))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let file_path = entry.path();
            let rel = match &base {
                Some(b) => file_path.strip_prefix(b).map_err(|_| {
                    Error::Archive(format!(
                        "entry {} is not under {}",
                        file_path.display(),
                        b.display()
                    ))
                })?,
                None => file_path,
            };
            // Entry names must be relative; without a usable base the raw
            // path stands in, minus any leading separator.
            let entry_name = rel
                .to_string_lossy()
                .replace('\\', "/")
                .trim_start_matches('/')
                .to_string();

            writer.start_file(entry_name, options).map_err(|e| {
                Error::Archive(format!("zip entry failed for {}: {e}", file_path.display()))
            })?;
            let mut f = fs::File::open(file_path)?;
            io::copy(&mut f, &mut writer)?;
        }
        info!("added {} to archive", source.display());
    }

    writer
        .finish()
        .map_err(|e| Error::Archive(format!("failed to finalize archive: {e}")))?;
    info!("created archive: {}", archive_path.display());

    Ok(archive_path)
}

/// Longest shared path prefix of the requested sources.
pub fn common_ancestor(paths: &[PathBuf]) -> Option<PathBuf> {
    let mut iter = paths.iter();
    let mut prefix = iter.next()?.clone();
    for p in iter {
        while !p.starts_with(&prefix) {
            if !prefix.pop() {
                return None;
            }
        }
    }
    Some(prefix)
}
