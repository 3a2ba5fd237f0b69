//! Transaction assembly: drive row grouping and classification over a document and
//! stitch multi-line descriptions into finished records.

use anyhow::Result;
use kontoauszug_core::{EngineConfig, Token, TokenSource, TransactionRecord};
use serde::Serialize;
use tracing::{debug, trace};

use crate::classify::{RowClassifier, RowRole, TransactionStart};
use crate::normalize::Normalizer;
use crate::rows::group_rows;

/// Compiled patterns and layout settings, shared by every document.
#[derive(Debug, Clone)]
pub struct Engine {
    classifier: RowClassifier,
    normalizer: Normalizer,
    row_tolerance: f64,
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classifier: RowClassifier::new()?,
            normalizer: Normalizer::new(&config.normalize)?,
            row_tolerance: config.layout.row_tolerance,
        })
    }

    pub fn classifier(&self) -> &RowClassifier {
        &self.classifier
    }

    pub fn row_tolerance(&self) -> f64 {
        self.row_tolerance
    }

    /// Fresh per-document state.
    pub fn assembler(&self) -> TransactionAssembler<'_> {
        TransactionAssembler {
            engine: self,
            open: None,
            sealed: Vec::new(),
            stats: AssemblyStats::default(),
        }
    }

    /// Run every page of one document through a new assembler.
    ///
    /// Extraction errors are returned as-is; nothing is emitted for a failed document.
    pub fn extract<S: TokenSource>(&self, mut source: S) -> Result<Extraction> {
        let mut assembler = self.assembler();
        while let Some(tokens) = source.next_page()? {
            assembler.push_page(tokens);
        }
        let extraction = assembler.finish();
        debug!(
            pages = extraction.stats.pages,
            rows = extraction.stats.rows,
            records = extraction.records.len(),
            discarded = extraction.stats.discarded_rows,
            "document assembled"
        );
        Ok(extraction)
    }
}

/// Row counters for one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyStats {
    pub pages: usize,
    pub rows: usize,
    pub header_footer_rows: usize,
    pub transaction_starts: usize,
    pub continuation_rows: usize,
    /// Rows seen while no record was open.
    pub discarded_rows: usize,
}

/// Finished records of one document, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub records: Vec<TransactionRecord>,
    pub stats: AssemblyStats,
}

/// Per-document state machine holding at most one open record.
///
/// The open record survives page boundaries: a description that wraps from the last row of
/// one page onto the next page ends up in the same record.
#[derive(Debug)]
pub struct TransactionAssembler<'e> {
    engine: &'e Engine,
    open: Option<TransactionRecord>,
    sealed: Vec<TransactionRecord>,
    stats: AssemblyStats,
}

impl TransactionAssembler<'_> {
    pub fn push_page(&mut self, tokens: Vec<Token>) {
        self.stats.pages += 1;
        for row in group_rows(tokens, self.engine.row_tolerance) {
            self.push_row(&row.texts());
        }
    }

    pub fn push_row(&mut self, texts: &[&str]) {
        self.stats.rows += 1;

        match self.engine.classifier.classify(texts) {
            RowRole::HeaderFooter => {
                trace!(?texts, "header/footer row skipped");
                self.stats.header_footer_rows += 1;
            }
            RowRole::Start(start) => {
                self.stats.transaction_starts += 1;
                let record = self.open_record(texts, start);
                trace!(booking_date = %record.booking_date, "transaction start");
                if let Some(prev) = self.open.replace(record) {
                    self.sealed.push(prev);
                }
            }
            RowRole::Other => match self.open.as_mut() {
                Some(record) => {
                    self.stats.continuation_rows += 1;
                    let text = self.engine.normalizer.clean(&texts.join(" "), "", "");
                    record.extend_description(&text);
                }
                None => {
                    debug!(?texts, "row outside any transaction discarded");
                    self.stats.discarded_rows += 1;
                }
            },
        }
    }

    pub fn has_open_record(&self) -> bool {
        self.open.is_some()
    }

    pub fn stats(&self) -> AssemblyStats {
        self.stats
    }

    /// Seal the open record, if any, and hand back everything in document order.
    pub fn finish(mut self) -> Extraction {
        if let Some(last) = self.open.take() {
            self.sealed.push(last);
        }
        Extraction {
            records: self.sealed,
            stats: self.stats,
        }
    }

    fn open_record(&self, texts: &[&str], start: TransactionStart) -> TransactionRecord {
        let description: Vec<&str> = texts
            .iter()
            .enumerate()
            .skip(2)
            .filter(|(i, _)| *i != start.amount_index)
            .map(|(_, t)| *t)
            .collect();
        let description = self.engine.normalizer.clean(
            &description.join(" "),
            &start.booking_date,
            &start.value_date,
        );

        TransactionRecord::new(
            start.booking_date,
            start.value_date,
            description,
            start.side,
            start.amount,
        )
    }
}
