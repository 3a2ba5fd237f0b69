//! kontoauszug-ingest: layout reconstruction and transaction segmentation for
//! date-date-description-amount bank statements, plus concrete token sources.

pub mod assemble;
pub mod classify;
pub mod normalize;
pub mod rows;
pub mod sources;

pub use assemble::{AssemblyStats, Engine, Extraction, TransactionAssembler};
pub use classify::{RowClassifier, RowRole, TransactionStart};
pub use normalize::Normalizer;
pub use rows::{group_rows, Row};
pub use sources::{PdfTokens, TokenDump};
