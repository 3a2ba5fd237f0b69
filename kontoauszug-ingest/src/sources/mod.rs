//! Concrete token sources: PDF documents and JSON token dumps.

pub mod dump;
pub mod pdf;

pub use dump::TokenDump;
pub use pdf::PdfTokens;
