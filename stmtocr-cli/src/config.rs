use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use stmtocr_extract::ExtractionConfig;
use stmtocr_extract::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

use crate::state::ensure_stmtocr_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmSection,
    pub export: ExportSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,

    /// Lowest-precedence credential; env vars and `--api-key` win.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Where `<name>_converted.csv` files go (default: current directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            api_key: None,
        }
    }
}

impl Config {
    /// Extraction settings with the credential resolved by the caller.
    pub fn extraction(&self, api_key: Option<String>) -> ExtractionConfig {
        ExtractionConfig {
            api_key,
            model: self.llm.model.clone(),
            base_url: self.llm.base_url.clone(),
            temperature: self.llm.temperature,
        }
    }

    /// Same config with the key replaced by a mask, for display.
    pub fn redacted(&self) -> Self {
        let mut c = self.clone();
        c.llm.api_key = c.llm.api_key.as_deref().map(mask_key);
        c
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_stmtocr_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<PathBuf> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let p = save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

/// First non-blank of: `--api-key`/`GEMINI_API_KEY` (clap), `API_KEY`, config file.
pub fn resolve_api_key(flag: Option<String>, cfg: &Config) -> Option<String> {
    pick_api_key([flag, std::env::var("API_KEY").ok(), cfg.llm.api_key.clone()])
}

fn pick_api_key<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|k| k.trim().to_string())
        .find(|k| !k.is_empty())
}

fn mask_key(key: &str) -> String {
    let n = key.chars().count();
    if n <= 8 {
        return "****".to_string();
    }
    let tail: String = key.chars().skip(n - 4).collect();
    format!("****{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg: Config = toml::from_str("[llm]\nmodel = \"gemini-2.5-pro\"\n").unwrap();
        assert_eq!(cfg.llm.model, "gemini-2.5-pro");
        assert_eq!(cfg.llm.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.llm.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(cfg.llm.api_key, None);
        assert_eq!(cfg.export.out_dir, None);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg.llm.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[llm]\napi_key = \"abc\"\n\n[export]\nout_dir = \"/tmp/csv\"\n").unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.llm.api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.export.out_dir, Some(PathBuf::from("/tmp/csv")));

        let extraction = cfg.extraction(Some("from-flag".to_string()));
        assert_eq!(extraction.api_key.as_deref(), Some("from-flag"));
        assert_eq!(extraction.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_pick_api_key_precedence() {
        assert_eq!(
            pick_api_key([None, Some("env".to_string()), Some("file".to_string())]),
            Some("env".to_string())
        );
        assert_eq!(
            pick_api_key([Some("  ".to_string()), None, Some("file".to_string())]),
            Some("file".to_string())
        );
        assert_eq!(pick_api_key::<2>([None, None]), None);
    }

    #[test]
    fn test_redacted() {
        let mut cfg = Config::default();
        cfg.llm.api_key = Some("AIzaSyExampleKey1234".to_string());
        assert_eq!(cfg.redacted().llm.api_key.as_deref(), Some("****1234"));

        cfg.llm.api_key = Some("short".to_string());
        assert_eq!(cfg.redacted().llm.api_key.as_deref(), Some("****"));
    }
}
