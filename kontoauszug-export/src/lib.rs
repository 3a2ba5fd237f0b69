//! kontoauszug-export: write assembled statement records as CSV or JSON.

pub mod csv_writer;
pub mod json;

pub use csv_writer::{write_csv, write_csv_file};
pub use json::{write_json, write_json_file};

use std::path::Path;

use anyhow::Result;
use kontoauszug_core::TransactionRecord;

/// Output file format for converted statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Csv,
    Json,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
        }
    }

    pub fn write_file(&self, path: impl AsRef<Path>, records: &[TransactionRecord]) -> Result<()> {
        match self {
            Format::Csv => write_csv_file(path, records),
            Format::Json => write_json_file(path, records),
        }
    }
}
