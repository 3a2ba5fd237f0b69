use anyhow::{bail, Context, Result};
use kontoauszug_core::Token;
use kontoauszug_ingest::{group_rows, Engine, PdfTokens, RowRole, TokenDump};
use std::path::{Path, PathBuf};

use crate::convert::open_source;

/// One line per reconstructed row: bucket key, role, tokens.
pub fn describe_rows(engine: &Engine, tokens: Vec<Token>) -> Vec<String> {
    group_rows(tokens, engine.row_tolerance())
        .iter()
        .map(|row| {
            let texts = row.texts();
            let role = match engine.classifier().classify(&texts) {
                RowRole::HeaderFooter => "header",
                RowRole::Start(_) => "start",
                RowRole::Other => "text",
            };
            format!("{:>8.1}  {:<6}  {}", row.top, role, texts.join(" | "))
        })
        .collect()
}

pub fn run_inspect(engine: &Engine, path: &Path, page: Option<usize>) -> Result<()> {
    let pages = open_source(path)?.into_pages();
    if let Some(n) = page {
        if n == 0 || n > pages.len() {
            bail!("{} has {} page(s), no page {n}", path.display(), pages.len());
        }
    }

    for (i, tokens) in pages.into_iter().enumerate() {
        let number = i + 1;
        if page.is_some_and(|n| n != number) {
            continue;
        }
        println!("== page {number} ({} tokens)", tokens.len());
        for line in describe_rows(engine, tokens) {
            println!("{line}");
        }
        println!();
    }
    Ok(())
}

pub fn default_dump_path(pdf: &Path) -> PathBuf {
    let mut name = pdf.file_stem().unwrap_or(pdf.as_os_str()).to_os_string();
    name.push(".tokens.json");
    pdf.with_file_name(name)
}

pub fn run_dump_tokens(pdf: &Path, out: Option<PathBuf>) -> Result<()> {
    let pages = PdfTokens::open(pdf)?.into_pages();
    let out = out.unwrap_or_else(|| default_dump_path(pdf));
    let dump = TokenDump { pages };
    dump.save(&out).with_context(|| format!("dump tokens of {}", pdf.display()))?;
    println!(
        "Wrote {} ({} pages, {} tokens)",
        out.display(),
        dump.pages.len(),
        dump.pages.iter().map(Vec::len).sum::<usize>()
    );
    Ok(())
}
