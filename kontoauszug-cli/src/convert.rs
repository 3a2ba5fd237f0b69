//! Batch conversion: statements in, one CSV/JSON file per statement out.

use anyhow::{anyhow, bail, Context, Result};
use kontoauszug_core::{PageBuffer, TransactionRecord};
use kontoauszug_export::Format;
use kontoauszug_ingest::{AssemblyStats, Engine, Extraction, PdfTokens, TokenDump};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub format: Format,
    pub jobs: usize,
    pub timeout: Option<Duration>,
    /// Stop at the first failing statement instead of converting the rest.
    pub fail_fast: bool,
}

#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub records: usize,
    pub debit_cents: i64,
    pub credit_cents: i64,
    pub stats: AssemblyStats,
}

/// Statements in `dir` (PDFs and token dumps), sorted by file name.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("input directory not found: {} (pass files or --input-dir)", dir.display());
    }

    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && is_supported(&path) {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

fn extension_lower(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase())
}

fn is_supported(path: &Path) -> bool {
    matches!(extension_lower(path).as_deref(), Some("pdf" | "json"))
}

pub fn output_path(output_dir: &Path, input: &Path, format: Format) -> PathBuf {
    let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
    name.push(".");
    name.push(format.extension());
    output_dir.join(name)
}

fn same_file_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// Output file for every input, in input order.
///
/// Fails when two statements would write the same file (names compared
/// case-insensitively) or when an output would replace one of the inputs.
pub fn plan_outputs(inputs: &[PathBuf], output_dir: &Path, format: Format) -> Result<Vec<PathBuf>> {
    let dir = fs::canonicalize(output_dir).unwrap_or_else(|_| output_dir.to_path_buf());
    let resolved_inputs: HashMap<String, &PathBuf> = inputs
        .iter()
        .map(|input| {
            let resolved = fs::canonicalize(input).unwrap_or_else(|_| input.clone());
            (same_file_key(&resolved), input)
        })
        .collect();

    let mut claimed: HashMap<String, &PathBuf> = HashMap::new();
    let mut outputs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let output = output_path(output_dir, input, format);
        let key = match output.file_name() {
            Some(name) => same_file_key(&dir.join(name)),
            None => same_file_key(&output),
        };
        if let Some(source) = resolved_inputs.get(&key) {
            bail!(
                "{} would overwrite the input {}; choose another --output-dir or --format",
                output.display(),
                source.display()
            );
        }
        if let Some(first) = claimed.insert(key, input) {
            bail!(
                "{} and {} would both be written to {}; rename one of them",
                first.display(),
                input.display(),
                output.display()
            );
        }
        outputs.push(output);
    }
    Ok(outputs)
}

/// Load every page of a statement: PDFs are extracted, `.json` files are token dumps.
pub fn open_source(path: &Path) -> Result<PageBuffer> {
    match extension_lower(path).as_deref() {
        Some("pdf") => Ok(PdfTokens::open(path)?.into_buffer()),
        Some("json") => Ok(TokenDump::load(path)?.into_source()),
        _ => bail!("unsupported statement type: {}", path.display()),
    }
}

fn summarize(input: PathBuf, output: PathBuf, records: &[TransactionRecord], stats: AssemblyStats) -> DocumentReport {
    let mut debit_cents = 0;
    let mut credit_cents = 0;
    for r in records {
        match r.amount_cents() {
            Ok(c) if c < 0 => debit_cents += -c,
            Ok(c) => credit_cents += c,
            Err(e) => warn!(input = %input.display(), "amount left out of totals: {e:#}"),
        }
    }
    DocumentReport {
        input,
        output,
        records: records.len(),
        debit_cents,
        credit_cents,
        stats,
    }
}

/// Run `work` on the blocking pool, giving up after `timeout`.
///
/// The permit travels into the worker, so an abandoned worker keeps its slot
/// until it returns and `jobs` stays an upper bound on running extractions.
async fn run_blocking<T, F>(
    permit: OwnedSemaphorePermit,
    label: &str,
    timeout: Option<Duration>,
    work: F,
) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        work()
    });
    let joined = match timeout {
        Some(limit) => tokio::time::timeout(limit, handle)
            .await
            .map_err(|_| anyhow!("{label}: timed out after {}s", limit.as_secs_f64()))?,
        None => handle.await,
    };
    joined
        .with_context(|| format!("{label}: worker failed"))?
        .with_context(|| format!("{label}: conversion failed"))
}

async fn convert_one(
    engine: Arc<Engine>,
    permits: Arc<Semaphore>,
    input: PathBuf,
    output: PathBuf,
    format: Format,
    timeout: Option<Duration>,
) -> Result<DocumentReport> {
    let permit = permits.acquire_owned().await.context("worker pool closed")?;
    let label = input.display().to_string();

    let source = input.clone();
    let extraction = run_blocking(permit, &label, timeout, move || -> Result<Extraction> {
        let pages = open_source(&source)?;
        engine.extract(pages)
    })
    .await?;

    // Written only once extraction finished in time, so a timed-out statement leaves no file.
    let records = extraction.records;
    let target = output.clone();
    let records = tokio::task::spawn_blocking(move || -> Result<Vec<TransactionRecord>> {
        format.write_file(&target, &records)?;
        Ok(records)
    })
    .await
    .with_context(|| format!("{label}: writer failed"))??;

    info!(input = %label, records = records.len(), "statement converted");
    Ok(summarize(input, output, &records, extraction.stats))
}

/// Convert all inputs, up to `jobs` at a time. Every failure is reported by name.
pub async fn run_convert(engine: Engine, opts: ConvertOptions) -> Result<()> {
    if opts.inputs.is_empty() {
        println!("No statements found.");
        return Ok(());
    }
    fs::create_dir_all(&opts.output_dir).with_context(|| format!("create {}", opts.output_dir.display()))?;
    let outputs = plan_outputs(&opts.inputs, &opts.output_dir, opts.format)?;

    let engine = Arc::new(engine);
    let permits = Arc::new(Semaphore::new(opts.jobs.max(1)));
    let mut set = JoinSet::new();

    for (idx, (input, output)) in opts.inputs.iter().cloned().zip(outputs).enumerate() {
        let fut = convert_one(
            Arc::clone(&engine),
            Arc::clone(&permits),
            input,
            output,
            opts.format,
            opts.timeout,
        );
        set.spawn(async move { (idx, fut.await) });
    }

    let mut results: Vec<Option<Result<DocumentReport>>> = opts.inputs.iter().map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        let (idx, result) = joined.context("conversion task panicked")?;
        match result {
            Err(e) if opts.fail_fast => {
                set.abort_all();
                return Err(e);
            }
            result => results[idx] = Some(result),
        }
    }

    let mut failed = 0usize;
    let mut total_records = 0usize;
    for (input, result) in opts.inputs.iter().zip(results) {
        match result {
            Some(Ok(report)) => {
                total_records += report.records;
                println!(
                    "Fertig: {} -> {} ({} records, debit {}, credit {})",
                    report.input.display(),
                    report.output.display(),
                    report.records,
                    format_cents(report.debit_cents),
                    format_cents(report.credit_cents)
                );
            }
            Some(Err(e)) => {
                failed += 1;
                eprintln!("Failed: {e:#}");
            }
            None => {
                failed += 1;
                eprintln!("Failed: {}: no result", input.display());
            }
        }
    }

    println!(
        "\nConverted {} of {} statements ({} records)",
        opts.inputs.len() - failed,
        opts.inputs.len(),
        total_records
    );

    if failed > 0 {
        bail!("{failed} statement(s) failed");
    }
    Ok(())
}

/// Render cents in the statement's notation, e.g. `1.234,56`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let digits = (cents / 100).to_string();

    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped},{:02}", cents % 100)
}
