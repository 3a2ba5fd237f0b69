//! Transaction records produced by the assembler.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Column header of the exported statement table.
pub const CSV_HEADER: [&str; 5] = ["Buchungsdatum", "Valutadatum", "Buchungstext", "Soll", "Haben"];

/// Which amount column a transaction is booked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Soll: outgoing money.
    Debit,
    /// Haben: incoming money.
    Credit,
}

/// One statement line item, possibly spanning several source rows.
///
/// Exactly one of `debit` / `credit` is non-empty. Amounts keep the statement's
/// notation (`1.234,56`) without sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub booking_date: String,
    pub value_date: String,
    pub description: String,
    pub debit: String,
    pub credit: String,
}

impl TransactionRecord {
    pub fn new(
        booking_date: impl Into<String>,
        value_date: impl Into<String>,
        description: impl Into<String>,
        side: Side,
        amount: impl Into<String>,
    ) -> Self {
        let amount = amount.into();
        let (debit, credit) = match side {
            Side::Debit => (amount, String::new()),
            Side::Credit => (String::new(), amount),
        };
        Self {
            booking_date: booking_date.into(),
            value_date: value_date.into(),
            description: description.into(),
            debit,
            credit,
        }
    }

    pub fn side(&self) -> Side {
        if self.debit.is_empty() {
            Side::Credit
        } else {
            Side::Debit
        }
    }

    /// The unsigned amount text, whichever column it is in.
    pub fn amount(&self) -> &str {
        match self.side() {
            Side::Debit => &self.debit,
            Side::Credit => &self.credit,
        }
    }

    /// Append one more line of description text, space separated.
    pub fn extend_description(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.description.is_empty() {
            self.description.push(' ');
        }
        self.description.push_str(text);
    }

    /// Signed amount in cents; debits are negative.
    ///
    /// Parses the German notation: `.` groups thousands, `,` separates the cents.
    pub fn amount_cents(&self) -> Result<i64> {
        let raw = self.amount();
        let cents = parse_german_cents(raw).with_context(|| format!("invalid amount '{raw}'"))?;
        Ok(match self.side() {
            Side::Debit => -cents,
            Side::Credit => cents,
        })
    }

    /// Fields in export column order.
    pub fn fields(&self) -> [&str; 5] {
        [
            self.booking_date.as_str(),
            self.value_date.as_str(),
            self.description.as_str(),
            self.debit.as_str(),
            self.credit.as_str(),
        ]
    }
}

fn parse_german_cents(raw: &str) -> Result<i64> {
    let digits = raw.trim().trim_start_matches(['+', '-']).replace('.', "");
    let Some((int_part, frac_part)) = digits.split_once(',') else {
        bail!("missing decimal comma");
    };
    if int_part.is_empty() || frac_part.len() != 2 {
        bail!("expected digits before and two digits after the comma");
    }
    if !int_part.chars().all(|c| c.is_ascii_digit()) || !frac_part.chars().all(|c| c.is_ascii_digit()) {
        bail!("unexpected characters");
    }
    let int_val: i64 = int_part.parse().context("integer part out of range")?;
    let frac_val: i64 = frac_part.parse()?;
    int_val
        .checked_mul(100)
        .and_then(|v| v.checked_add(frac_val))
        .context("amount out of range")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fills_exactly_one_column() {
        let debit = TransactionRecord::new("01.03.", "01.03.", "Miete", Side::Debit, "650,00");
        assert_eq!(debit.debit, "650,00");
        assert!(debit.credit.is_empty());
        assert_eq!(debit.side(), Side::Debit);

        let credit = TransactionRecord::new("02.03.", "02.03.", "Gehalt", Side::Credit, "2.100,00");
        assert!(credit.debit.is_empty());
        assert_eq!(credit.amount(), "2.100,00");
    }

    #[test]
    fn test_extend_description() {
        let mut r = TransactionRecord::new("01.03.", "01.03.", "Miete", Side::Debit, "650,00");
        r.extend_description("weitere Info");
        r.extend_description("");
        assert_eq!(r.description, "Miete weitere Info");

        let mut empty = TransactionRecord::new("01.03.", "01.03.", "", Side::Credit, "1,00");
        empty.extend_description("SEPA Gutschrift");
        assert_eq!(empty.description, "SEPA Gutschrift");
    }

    #[test]
    fn test_amount_cents() {
        let r = TransactionRecord::new("01.03.", "01.03.", "", Side::Debit, "1.234,56");
        assert_eq!(r.amount_cents().unwrap(), -123456);

        let r = TransactionRecord::new("01.03.", "01.03.", "", Side::Credit, "45,00");
        assert_eq!(r.amount_cents().unwrap(), 4500);

        let r = TransactionRecord::new("01.03.", "01.03.", "", Side::Credit, "45,00EUR");
        assert!(r.amount_cents().is_err());
    }

    #[test]
    fn test_serializes_camel_case() {
        let r = TransactionRecord::new("01.03.", "02.03.", "Miete", Side::Debit, "650,00");
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(
            json,
            r#"{"bookingDate":"01.03.","valueDate":"02.03.","description":"Miete","debit":"650,00","credit":""}"#
        );
    }
}
