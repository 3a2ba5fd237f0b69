//! Positioned text tokens as delivered by a page extractor.

use serde::{Deserialize, Serialize};

/// One word of extracted text and where it sits on its page.
///
/// `x` grows to the right, `y` grows downwards (distance from the top of the page).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    #[serde(alias = "x0")]
    pub x: f64,
    #[serde(alias = "top")]
    pub y: f64,
}

impl Token {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }
}
