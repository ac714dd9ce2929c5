//! End-to-end packaging run: status → archive → split → upload → status →
//! cleanup.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::{archive, config::Config, exec::CommandRunner, notify::Notifier, split, Result};

const MSG_START: &str = "Starting packaging and upload of build environment files...";
const MSG_PACKAGING_FAILED: &str = "Failed to package and split build environment files.";
const MSG_UPLOADING: &str = "Uploading packaged build environment in parts...";
const MSG_ALL_UPLOADED: &str = "Successfully uploaded all packaged build environment files.";
const MSG_PARTIAL_FAILURE: &str = "WARNING: Some packaged build environment files failed to upload.";

/// Terminal state of one packaging run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    /// At least one part failed to upload; reported, not a crash.
    PartialUpload,
    /// No uploadable parts were produced.
    PackagingFailed,
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::PackagingFailed => 1,
            _ => 0,
        }
    }
}

/// Run the whole pipeline. The temp dir is removed on every outcome; only
/// notifier transport failures propagate as errors.
pub async fn run(
    cfg: &Config,
    notifier: &dyn Notifier,
    runner: &dyn CommandRunner,
) -> Result<RunOutcome> {
    let outcome = run_stages(cfg, notifier, runner).await;
    cleanup(&cfg.temp_dir);
    outcome
}

async fn run_stages(
    cfg: &Config,
    notifier: &dyn Notifier,
    runner: &dyn CommandRunner,
) -> Result<RunOutcome> {
    notifier.send_message(MSG_START).await?;

    let parts = match package(cfg, runner).await {
        Ok(parts) => parts,
        Err(e) => {
            warn!("packaging failed: {e}");
            notifier.send_message(MSG_PACKAGING_FAILED).await?;
            return Ok(RunOutcome::PackagingFailed);
        }
    };

    // An empty part list means there is nothing to upload; treat it the
    // same as a packaging failure rather than reporting success.
    if parts.is_empty() {
        warn!("packaging produced no uploadable parts");
        notifier.send_message(MSG_PACKAGING_FAILED).await?;
        return Ok(RunOutcome::PackagingFailed);
    }

    notifier.send_message(MSG_UPLOADING).await?;

    let total = parts.len();
    let mut all_ok = true;
    for (idx, part) in parts.iter().enumerate() {
        let filename = part
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let caption = format!(
            "Build Env ({}) Part {}/{}: {}",
            cfg.run_id,
            idx + 1,
            total,
            filename
        );

        let delivered = match notifier.send_document(part, &caption).await {
            Ok(ok) => ok,
            Err(e) => {
                warn!("upload failed for {}: {e}", part.display());
                false
            }
        };
        if !delivered {
            all_ok = false;
            break; // remaining parts are not attempted
        }
    }

    if all_ok {
        notifier.send_message(MSG_ALL_UPLOADED).await?;
        Ok(RunOutcome::Success)
    } else {
        notifier.send_message(MSG_PARTIAL_FAILURE).await?;
        Ok(RunOutcome::PartialUpload)
    }
}

async fn package(cfg: &Config, runner: &dyn CommandRunner) -> Result<Vec<PathBuf>> {
    let archive_path =
        archive::create_archive(&cfg.temp_dir, &cfg.archive_base_name(), &cfg.source_paths)?;
    split::split_if_needed(runner, &archive_path, cfg.chunk_mb).await
}

fn cleanup(temp_dir: &Path) {
    info!("cleaning up temporary files");
    if let Err(e) = fs::remove_dir_all(temp_dir) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!("failed to remove {}: {e}", temp_dir.display());
        }
    }
}
