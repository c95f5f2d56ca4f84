//! Cross-Platform Path Utilities
//!
//! Resolves the Noviq data directory (~/.noviq/) and the files in it.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the Noviq directory (~/.noviq/)
pub fn noviq_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".noviq"))
}

/// Get the config file path (~/.noviq/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(noviq_dir()?.join("config.json"))
}

/// Get the default workflow session file (~/.noviq/workflow_session.json)
pub fn session_path() -> AppResult<PathBuf> {
    Ok(noviq_dir()?.join("workflow_session.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Ensure the parent directory of `file` exists
pub fn ensure_parent(file: &Path) -> AppResult<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}
