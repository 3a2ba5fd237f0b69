//! Boundary to the text extraction facility: pages of positioned tokens.

use std::collections::VecDeque;

use anyhow::Result;

use crate::token::Token;

/// Yields the tokens of a document one page at a time, in page order.
///
/// Token order within a page is not significant.
pub trait TokenSource {
    /// Tokens of the next page, or `None` once every page has been consumed.
    fn next_page(&mut self) -> Result<Option<Vec<Token>>>;
}

impl<S: TokenSource + ?Sized> TokenSource for &mut S {
    fn next_page(&mut self) -> Result<Option<Vec<Token>>> {
        (**self).next_page()
    }
}

/// Pages already held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageBuffer {
    pages: VecDeque<Vec<Token>>,
}

impl PageBuffer {
    pub fn new(pages: Vec<Vec<Token>>) -> Self {
        Self {
            pages: pages.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.pages.len()
    }

    pub fn into_pages(self) -> Vec<Vec<Token>> {
        self.pages.into()
    }
}

impl From<Vec<Vec<Token>>> for PageBuffer {
    fn from(pages: Vec<Vec<Token>>) -> Self {
        Self::new(pages)
    }
}

impl TokenSource for PageBuffer {
    fn next_page(&mut self) -> Result<Option<Vec<Token>>> {
        Ok(self.pages.pop_front())
    }
}
