//! Row classification for the date-date-description-amount statement layout.
//!
//! Expected rows after grouping:
//!   01.03.   01.03.   SEPA Lastschrift Miete Wohnung        -650,00
//!                     Verwendungszweck Maerz
//!   03.03.   03.03.   Gehalt                                +2.100,00

use anyhow::Result;
use kontoauszug_core::Side;
use regex::Regex;

/// What a grouped row means to the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRole {
    /// Page header or footer; ignored without touching the open record.
    HeaderFooter,
    /// First line of a new transaction.
    Start(TransactionStart),
    /// Anything else: a continuation if a record is open, otherwise noise.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStart {
    pub booking_date: String,
    pub value_date: String,
    /// Index of the amount token within the row.
    pub amount_index: usize,
    pub side: Side,
    /// Amount text with the sign removed.
    pub amount: String,
}

#[derive(Debug, Clone)]
pub struct RowClassifier {
    date_re: Regex,
    amount_re: Regex,
}

impl RowClassifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            // Day and month only; the statement prints no year in the table.
            date_re: Regex::new(r"^\d{2}\.\d{2}\.$")?,
            // Anchored at the start only, like a prefix match.
            amount_re: Regex::new(r"^[-+]?\d{1,3}(?:\.\d{3})*,\d{2}")?,
        })
    }

    pub fn is_date(&self, text: &str) -> bool {
        self.date_re.is_match(text)
    }

    pub fn is_amount(&self, text: &str) -> bool {
        self.amount_re.is_match(text)
    }

    pub fn classify(&self, texts: &[&str]) -> RowRole {
        if is_header_footer(texts) {
            return RowRole::HeaderFooter;
        }

        if texts.len() < 2 || !self.is_date(texts[0]) || !self.is_date(texts[1]) {
            return RowRole::Other;
        }

        // First match wins; later amounts (e.g. a balance column) are ignored.
        let Some(amount_index) = texts.iter().position(|t| self.is_amount(t)) else {
            return RowRole::Other;
        };
        let (side, amount) = split_amount(texts[amount_index]);

        RowRole::Start(TransactionStart {
            booking_date: texts[0].to_string(),
            value_date: texts[1].to_string(),
            amount_index,
            side,
            amount,
        })
    }
}

fn is_header_footer(texts: &[&str]) -> bool {
    let has = |needle: &str| texts.iter().any(|t| *t == needle);
    has("Auszug") || (has("IBAN") && has("Buchung"))
}

/// Apply the sign rule: any `-` makes a debit, otherwise a credit.
pub fn split_amount(raw: &str) -> (Side, String) {
    if raw.contains('-') {
        (Side::Debit, raw.replace('-', ""))
    } else {
        (Side::Credit, raw.replace('+', ""))
    }
}
