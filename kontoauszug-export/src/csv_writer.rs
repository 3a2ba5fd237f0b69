//! Semicolon-separated export with the statement's German column header.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use kontoauszug_core::{TransactionRecord, CSV_HEADER};

pub fn write_csv<W: Write>(writer: W, records: &[TransactionRecord]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.write_record(record.fields())?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv_file(path: impl AsRef<Path>, records: &[TransactionRecord]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_csv(file, records).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kontoauszug_core::Side;

    fn records() -> Vec<TransactionRecord> {
        vec![
            TransactionRecord::new("01.03.", "01.03.", "Miete Wohnung", Side::Debit, "650,00"),
            TransactionRecord::new("03.03.", "04.03.", "Gehalt; Maerz", Side::Credit, "2.100,00"),
        ]
    }

    #[test]
    fn test_csv_layout() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &records()).unwrap();
        let out = String::from_utf8(buf).unwrap();

        assert_eq!(
            out,
            "Buchungsdatum;Valutadatum;Buchungstext;Soll;Haben\n\
             01.03.;01.03.;Miete Wohnung;650,00;\n\
             03.03.;04.03.;\"Gehalt; Maerz\";;2.100,00\n"
        );
    }

    #[test]
    fn test_header_only_when_empty() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Buchungsdatum;Valutadatum;Buchungstext;Soll;Haben\n");
    }

    #[test]
    fn test_write_file_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auszug.csv");
        let recs = vec![TransactionRecord::new("05.03.", "05.03.", "Bäckerei Müller", Side::Debit, "4,20")];

        write_csv_file(&path, &recs).unwrap();
        let out = std::fs::read_to_string(&path).unwrap();
        assert!(out.ends_with("05.03.;05.03.;Bäckerei Müller;4,20;\n"));
    }
}
