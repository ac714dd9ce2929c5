use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org/bot";

const DEFAULT_CHUNK_MB: u64 = 49;
const DEFAULT_TEMP_DIR: &str = "telegram_package_temp";

/// Typed configuration for one packaging run.
///
/// Read from the environment once at startup and passed by reference into
/// each stage; no stage performs hidden environment lookups of its own.
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    pub chat_id: String,
    pub run_id: String,
    pub workspace_dir: PathBuf,

    /// Ordered list of directories to package. Missing entries are skipped
    /// with a warning at archive time.
    pub source_paths: Vec<PathBuf>,

    pub api_base_url: String,
    pub chunk_mb: u64,
    pub temp_dir: PathBuf,

    /// Short timeout for plain-text status messages.
    pub message_timeout: Duration,
    /// Long timeout for document uploads, sized for large parts.
    pub upload_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Tests inject a map here
    /// instead of mutating the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
            })?;
        let chat_id = lookup("TELEGRAM_CHAT_ID")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("TELEGRAM_CHAT_ID environment variable is required".to_string())
            })?;

        let run_id = lookup("GITHUB_RUN_NUMBER")
            .and_then(non_empty)
            .unwrap_or_else(|| "local".to_string());
        let workspace_dir = lookup("GITHUB_WORKSPACE")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let home = lookup("HOME")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let source_paths = vec![
            home.join(".pub-cache"),
            home.join(".gradle/caches"),
            home.join(".gradle/wrapper"),
            workspace_dir.join("android"),
        ];

        let api_base_url = lookup("TELEGRAM_API_BASE_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let chunk_mb = lookup("MAX_CHUNK_MB")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|mb| *mb > 0)
            .unwrap_or(DEFAULT_CHUNK_MB);

        Ok(Self {
            bot_token,
            chat_id,
            run_id,
            workspace_dir,
            source_paths,
            api_base_url,
            chunk_mb,
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
            message_timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(300),
        })
    }

    /// Maximum single-part size in bytes; anything above it gets split.
    pub fn chunk_bytes(&self) -> u64 {
        self.chunk_mb * 1024 * 1024
    }

    pub fn archive_base_name(&self) -> String {
        format!("full_build_env_{}", self.run_id)
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_bot_token_is_a_config_error() {
        let err = Config::from_lookup(lookup_from(&[("TELEGRAM_CHAT_ID", "42")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn missing_chat_id_is_a_config_error() {
        let err = Config::from_lookup(lookup_from(&[("TELEGRAM_BOT_TOKEN", "t0k")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("TELEGRAM_CHAT_ID"));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let err = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "   "),
            ("TELEGRAM_CHAT_ID", "42"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_absent() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t0k"),
            ("TELEGRAM_CHAT_ID", "42"),
        ]))
        .unwrap();

        assert_eq!(cfg.run_id, "local");
        assert_eq!(cfg.chunk_mb, 49);
        assert_eq!(cfg.chunk_bytes(), 49 * 1024 * 1024);
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(cfg.archive_base_name(), "full_build_env_local");
    }

    #[test]
    fn source_paths_follow_home_and_workspace() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t0k"),
            ("TELEGRAM_CHAT_ID", "42"),
            ("HOME", "/home/runner"),
            ("GITHUB_WORKSPACE", "/work/app"),
            ("GITHUB_RUN_NUMBER", "317"),
        ]))
        .unwrap();

        assert_eq!(
            cfg.source_paths,
            vec![
                PathBuf::from("/home/runner/.pub-cache"),
                PathBuf::from("/home/runner/.gradle/caches"),
                PathBuf::from("/home/runner/.gradle/wrapper"),
                PathBuf::from("/work/app/android"),
            ]
        );
        assert_eq!(cfg.archive_base_name(), "full_build_env_317");
    }

    #[test]
    fn chunk_size_override_ignores_zero() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t0k"),
            ("TELEGRAM_CHAT_ID", "42"),
            ("MAX_CHUNK_MB", "0"),
        ]))
        .unwrap();
        assert_eq!(cfg.chunk_mb, 49);

        let cfg = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t0k"),
            ("TELEGRAM_CHAT_ID", "42"),
            ("MAX_CHUNK_MB", "20"),
        ]))
        .unwrap();
        assert_eq!(cfg.chunk_mb, 20);
    }
}
