//! kontoauszug-core: data model, engine configuration and the token extractor boundary
//! shared by the statement ingestion and export crates.

pub mod config;
pub mod record;
pub mod source;
pub mod token;

pub use config::{EngineConfig, LayoutConfig, NormalizeConfig};
pub use record::{Side, TransactionRecord, CSV_HEADER};
pub use source::{PageBuffer, TokenSource};
pub use token::Token;
