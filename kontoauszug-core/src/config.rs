//! Engine configuration: layout tolerance and description noise rules.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub normalize: NormalizeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical distance (page units) within which tokens share a row bucket.
    pub row_tolerance: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { row_tolerance: 2.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Statement-period years removed from descriptions when they stand alone.
    /// Empty disables year removal.
    pub noise_years: Vec<u16>,
    /// Leading digits of bank reference numbers stripped from descriptions.
    pub reference_prefix: String,
    /// Minimum number of digits following the prefix.
    pub reference_min_digits: usize,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            noise_years: vec![2025],
            reference_prefix: "2020".to_string(),
            reference_min_digits: 10,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        let tol = self.layout.row_tolerance;
        if !tol.is_finite() || tol <= 0.0 {
            bail!("layout.row_tolerance must be a positive number, got {tol}");
        }

        let prefix = &self.normalize.reference_prefix;
        if !prefix.chars().all(|c| c.is_ascii_digit()) {
            bail!("normalize.reference_prefix must contain only digits, got '{prefix}'");
        }

        Ok(())
    }
}
