use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use kontoauszug_core::TransactionRecord;

/// Pretty JSON array of records with camelCase keys.
pub fn write_json<W: Write>(mut writer: W, records: &[TransactionRecord]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn write_json_file(path: impl AsRef<Path>, records: &[TransactionRecord]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_json(BufWriter::new(file), records).with_context(|| format!("write {}", path.display()))
}
