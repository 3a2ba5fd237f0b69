//! JSON token dumps: pages of positioned words saved to disk.
//!
//! Format:
//!   {"pages": [[{"text": "01.03.", "x": 40.1, "y": 220.5}, ...], ...]}
//!
//! `x0` / `top` are accepted in place of `x` / `y`, so word lists exported by other
//! extraction tools load without conversion.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use kontoauszug_core::{PageBuffer, Token};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenDump {
    pub pages: Vec<Vec<Token>>,
}

impl TokenDump {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&s).with_context(|| format!("parse token dump {}", path.display()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn into_source(self) -> PageBuffer {
        PageBuffer::new(self.pages)
    }
}

impl From<PageBuffer> for TokenDump {
    fn from(buf: PageBuffer) -> Self {
        Self {
            pages: buf.into_pages(),
        }
    }
}
