use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.json";
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_confirm_prompt() -> String {
    "Remove this subject from the curriculum?".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Unset means requests never time out.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default = "default_confirm_prompt")]
    pub confirm_prompt: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
            confirm_prompt: default_confirm_prompt(),
        }
    }
}

pub fn config_dir() -> PathBuf {
    if let Ok(home) = std::env::var("CURRICULUM_CORE_HOME") {
        if !home.trim().is_empty() {
            return PathBuf::from(home);
        }
    }
    if let Ok(local) = std::env::var("LOCALAPPDATA") {
        return PathBuf::from(local).join("CurriculumCore");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("CurriculumCore")
}

/// Loads the config from the default location, then applies the
/// `CURRICULUM_BASE_URL` override.
pub fn load() -> ClientConfig {
    let mut cfg = load_from(&config_dir());

    if let Ok(url) = std::env::var("CURRICULUM_BASE_URL") {
        if !url.trim().is_empty() {
            cfg.base_url = url.trim().to_string();
        }
    }

    cfg
}

pub fn load_from(dir: &Path) -> ClientConfig {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return ClientConfig::default();
    }

    let data = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[config] failed to read {}: {e}", path.display());
            return ClientConfig::default();
        }
    };

    match serde_json::from_str::<ClientConfig>(&data) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("[config] failed to parse {}: {e}", path.display());
            ClientConfig::default()
        }
    }
}

pub fn save(cfg: ClientConfig) -> anyhow::Result<ClientConfig> {
    save_to(&config_dir(), cfg)
}

pub fn save_to(dir: &Path, mut cfg: ClientConfig) -> anyhow::Result<ClientConfig> {
    let trimmed = cfg.base_url.trim().trim_end_matches('/').to_string();
    cfg.base_url = if trimmed.is_empty() {
        default_base_url()
    } else {
        trimmed
    };

    if cfg.confirm_prompt.trim().is_empty() {
        cfg.confirm_prompt = default_confirm_prompt();
    }

    let json = serde_json::to_string_pretty(&cfg).context("failed to serialize config")?;
    write_atomic(&dir.join(CONFIG_FILE), json.as_bytes())?;

    Ok(cfg)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let tmp = path.with_extension("json.tmp");

    if let Some(parent) = tmp.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    fs::write(&tmp, bytes).with_context(|| format!("failed to write {}", tmp.display()))?;

    // rename already replaces the target elsewhere; Windows refuses an existing one.
    if cfg!(windows) && path.exists() {
        fs::remove_file(path).with_context(|| format!("failed to replace {}", path.display()))?;
    }

    fs::rename(&tmp, path).with_context(|| format!("failed to move {}", tmp.display()))?;

    Ok(())
}
