use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$STMTOCR_HOME`, or `~/.stmtocr`.
pub fn stmtocr_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("STMTOCR_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".stmtocr"))
}

pub fn ensure_stmtocr_home() -> Result<PathBuf> {
    let dir = stmtocr_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
