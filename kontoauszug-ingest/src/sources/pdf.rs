//! PDF token source: positioned words reconstructed from `pdf-extract` glyph callbacks.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use kontoauszug_core::{PageBuffer, Token, TokenSource};
use lopdf::Document;
use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};
use tracing::debug;

/// Horizontal gap (page units) beyond which two glyphs belong to different words.
const WORD_GAP: f64 = 3.0;
/// Baseline shift (page units) beyond which two glyphs belong to different lines.
const LINE_SHIFT: f64 = 3.0;

/// Word tokens of every page of a PDF, extracted eagerly.
///
/// The parsed document is dropped inside [`PdfTokens::open`], so no file handle or
/// document state outlives the call, whether extraction succeeds or not.
#[derive(Debug, Clone)]
pub struct PdfTokens {
    pages: PageBuffer,
}

impl PdfTokens {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let doc = Document::load(path).with_context(|| format!("open PDF {}", path.display()))?;
        Self::from_document(&doc).with_context(|| format!("extract words from {}", path.display()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).context("parse PDF from memory")?;
        Self::from_document(&doc)
    }

    fn from_document(doc: &Document) -> Result<Self> {
        if doc.is_encrypted() {
            bail!("encrypted PDFs are not supported");
        }

        let mut collector = WordCollector::default();
        pdf_extract::output_doc(doc, &mut collector).map_err(|e| anyhow!("pdf text extraction failed: {e:?}"))?;
        let pages = collector.finish();

        debug!(
            pages = pages.len(),
            words = pages.iter().map(Vec::len).sum::<usize>(),
            "pdf words extracted"
        );
        Ok(Self {
            pages: PageBuffer::new(pages),
        })
    }

    pub fn into_pages(self) -> Vec<Vec<Token>> {
        self.pages.into_pages()
    }

    pub fn into_buffer(self) -> PageBuffer {
        self.pages
    }
}

impl TokenSource for PdfTokens {
    fn next_page(&mut self) -> Result<Option<Vec<Token>>> {
        self.pages.next_page()
    }
}

#[derive(Debug)]
struct PendingWord {
    text: String,
    x: f64,
    top: f64,
    baseline: f64,
    /// Right edge of the last glyph.
    end: f64,
}

/// Collects glyphs into words, one token list per page.
#[derive(Debug, Default)]
struct WordCollector {
    pages: Vec<Vec<Token>>,
    current: Vec<Token>,
    word: Option<PendingWord>,
    /// Page box origin: left edge and top edge in PDF space.
    left: f64,
    top: f64,
}

impl WordCollector {
    fn flush_word(&mut self) {
        if let Some(word) = self.word.take() {
            self.current.push(Token::new(word.text, word.x, word.top));
        }
    }

    fn finish(mut self) -> Vec<Vec<Token>> {
        // Tolerate a missing end_page callback on the last page.
        self.flush_word();
        if !self.current.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
        self.pages
    }
}

impl OutputDev for WordCollector {
    fn begin_page(
        &mut self,
        _page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> Result<(), OutputError> {
        self.flush_word();
        self.current.clear();
        self.left = media_box.llx;
        self.top = media_box.ury;
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), OutputError> {
        self.flush_word();
        self.pages.push(std::mem::take(&mut self.current));
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> Result<(), OutputError> {
        if char.trim().is_empty() {
            self.flush_word();
            return Ok(());
        }

        // Effective glyph size: side of the square with the area of the transformed em box.
        let sx = font_size * (trm.m11 + trm.m21);
        let sy = font_size * (trm.m12 + trm.m22);
        let size = (sx * sy).abs().sqrt();

        let x = trm.m31 - self.left;
        let baseline = self.top - trm.m32;
        let end = x + width * size;

        if let Some(word) = &self.word {
            let same_line = (baseline - word.baseline).abs() <= LINE_SHIFT;
            let adjacent = x <= word.end + WORD_GAP && x + WORD_GAP >= word.end;
            if !same_line || !adjacent {
                self.flush_word();
            }
        }

        match self.word.as_mut() {
            Some(word) => {
                word.text.push_str(char);
                word.end = end;
            }
            None => {
                self.word = Some(PendingWord {
                    text: char.to_string(),
                    x,
                    top: baseline - size,
                    baseline,
                    end,
                });
            }
        }
        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}
