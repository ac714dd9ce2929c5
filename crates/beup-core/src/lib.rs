//! Core logic for the build-environment packager.
//!
//! This crate is intentionally framework-agnostic. Telegram and the external
//! split tool live behind ports (`notify::Notifier`, `exec::CommandRunner`)
//! implemented by the adapter crate and the binary.

pub mod archive;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod notify;
pub mod pipeline;
pub mod split;

pub use errors::{Error, Result};
