use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use kontoauszug_core::EngineConfig;
use kontoauszug_export::Format;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{app_home, ensure_app_home};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned for statements when no files are given.
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    /// Documents converted concurrently.
    pub jobs: usize,
    /// Per-document limit; unset means no limit.
    pub timeout_secs: Option<u64>,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl From<OutputFormat> for Format {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Csv => Format::Csv,
            OutputFormat::Json => Format::Json,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("pdf"),
            output_dir: PathBuf::from("csv"),
            format: OutputFormat::Csv,
            jobs: 4,
            timeout_secs: None,
            engine: EngineConfig::default(),
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(app_home()?.join("config.toml"))
}

/// Load the config file. An explicitly given path must exist; the default one may not.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let p = match explicit {
        Some(p) => {
            if !p.exists() {
                bail!("config not found: {}", p.display());
            }
            p.to_path_buf()
        }
        None => {
            let p = default_config_path()?;
            if !p.exists() {
                return Ok(Config::default());
            }
            p
        }
    };
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s)?;
    cfg.engine.validate()?;
    Ok(cfg)
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    let p = match explicit {
        Some(p) => p.to_path_buf(),
        None => ensure_app_home()?.join("config.toml"),
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_full_config() {
        let cfg = parse_config(
            r#"
input_dir = "auszuege"
output_dir = "export"
format = "json"
jobs = 2
timeout_secs = 30

[engine.layout]
row_tolerance = 2.5

[engine.normalize]
noise_years = []
reference_prefix = "2021"
"#,
        )
        .unwrap();

        assert_eq!(cfg.input_dir, PathBuf::from("auszuege"));
        assert_eq!(cfg.format, OutputFormat::Json);
        assert_eq!(cfg.jobs, 2);
        assert_eq!(cfg.timeout_secs, Some(30));
        assert_eq!(cfg.engine.layout.row_tolerance, 2.5);
        assert!(cfg.engine.normalize.noise_years.is_empty());
        assert_eq!(cfg.engine.normalize.reference_prefix, "2021");
        assert_eq!(cfg.engine.normalize.reference_min_digits, 10);
    }

    #[test]
    fn test_invalid_engine_settings_rejected() {
        assert!(parse_config("[engine.layout]\nrow_tolerance = -1.0\n").is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.timeout_secs = Some(90);
        cfg.engine.normalize.noise_years = vec![2024, 2025];

        save_config(&path, &cfg).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), cfg);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
