//! Census ingestion.
//!
//! Parses uploaded census files (`.csv`, `.xls`, `.xlsx`) into a
//! [`CensusTable`]: the distinct headers from the header row plus 1-indexed
//! data rows. Several census uploads are read independently and then
//! concatenated into one logical table with [`CensusTable::concat`].

pub mod error;
pub mod export;
pub mod reader;
pub mod table;
mod workbook;

pub use error::IngestError;
pub use export::write_standardized_csv;
pub use reader::{SourceFormat, read_census};
pub use table::{CensusRow, CensusTable};
