//! Row grouping: cluster a page's tokens into visual table lines.

use std::collections::BTreeMap;

use kontoauszug_core::Token;

/// One reconstructed table line, tokens ordered left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Bucket key: the shared vertical position, rounded to a multiple of the tolerance.
    pub top: f64,
    pub tokens: Vec<Token>,
}

impl Row {
    pub fn texts(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }
}

/// Group tokens into rows, top to bottom.
///
/// Each token lands in the bucket `round(y / tolerance) * tolerance`. Neighbouring buckets
/// are never merged, so tokens exactly one tolerance apart may split into two rows.
pub fn group_rows(tokens: Vec<Token>, tolerance: f64) -> Vec<Row> {
    let mut buckets: BTreeMap<i64, Vec<Token>> = BTreeMap::new();

    for token in tokens {
        let key = (token.y / tolerance).round() as i64;
        buckets.entry(key).or_default().push(token);
    }

    buckets
        .into_iter()
        .map(|(key, mut tokens)| {
            // Stable: tokens at the same x keep extraction order.
            tokens.sort_by(|a, b| a.x.total_cmp(&b.x));
            Row {
                top: key as f64 * tolerance,
                tokens,
            }
        })
        .collect()
}
