use std::path::Path;

use async_trait::async_trait;

use crate::Result;

/// Status channel for the pipeline.
///
/// Telegram is the production implementation; tests substitute a recorder.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a plain-text status update. An error here is fatal to the run:
    /// losing status visibility is worse than losing the artifact upload.
    async fn send_message(&self, text: &str) -> Result<()>;

    /// Upload one part file with its caption. `Ok(false)` means the part was
    /// not delivered (missing file, transport failure, or the remote API
    /// rejecting it); the caller decides how to proceed.
    async fn send_document(&self, path: &Path, caption: &str) -> Result<bool>;
}
