//! CSV codec for prompt backups.
//!
//! The tokenizer is deliberately permissive so files edited by hand or
//! round-tripped through a spreadsheet still load. The writer always quotes
//! text cells so its output re-imports unchanged.

mod tokenizer;
mod writer;

pub use tokenizer::{parse, Row};
pub use writer::{escape_cell, export_filename, export_prompts_to_csv, format_timestamp, ExportKind, HEADERS};
