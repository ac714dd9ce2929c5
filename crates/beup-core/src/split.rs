//! Size-bounded splitting of the packaged archive.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{errors::Error, exec::CommandRunner, Result};

const SPLIT_TOOL: &str = "zip";

/// Split `archive_path` into `<chunk_mb>m` segments when it exceeds the
/// threshold, otherwise pass it through untouched.
///
/// `zip -s` writes segments as `<base>_part.z01`, `<base>_part.z02`, ... with
/// the final segment keeping the `.zip` extension, so a lexicographic sort of
/// the collected paths is also the reassembly order. The unsplit archive is
/// deleted after a successful split.
pub async fn split_if_needed(
    runner: &dyn CommandRunner,
    archive_path: &Path,
    chunk_mb: u64,
) -> Result<Vec<PathBuf>> {
    let threshold = chunk_mb * 1024 * 1024;
    let size = fs::metadata(archive_path)?.len();
    info!("archive size: {:.2} MB", size as f64 / (1024.0 * 1024.0));

    if size <= threshold {
        info!("archive is within the size limit, no splitting needed");
        return Ok(vec![archive_path.to_path_buf()]);
    }

    let dir = archive_path.parent().ok_or_else(|| {
        Error::Archive(format!(
            "archive path has no parent directory: {}",
            archive_path.display()
        ))
    })?;
    let stem = archive_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            Error::Archive(format!(
                "archive path has no usable stem: {}",
                archive_path.display()
            ))
        })?;
    let part_base = format!("{stem}_part");

    info!("archive is larger than {chunk_mb} MB, splitting");
    let args = vec![
        "-s".to_string(),
        format!("{chunk_mb}m"),
        dir.join(format!("{part_base}.zip"))
            .to_string_lossy()
            .into_owned(),
        archive_path.to_string_lossy().into_owned(),
    ];
    let out = runner.run(SPLIT_TOOL, &args, dir).await?;
    if !out.success() {
        return Err(Error::SplitTool {
            status: out.status,
            stderr: out.stderr,
        });
    }

    fs::remove_file(archive_path)?;

    let prefix = format!("{part_base}.z");
    let mut parts: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&prefix))
        })
        .collect();
    parts.sort();

    info!("created {} split parts", parts.len());
    Ok(parts)
}
