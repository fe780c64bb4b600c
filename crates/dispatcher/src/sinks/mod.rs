//! Sink implementations
//!
//! Contains TextSink, TableSink and RecordFile.

mod record;
mod table;
mod table_reader;
mod text;

pub use self::record::RecordFile;
pub use self::table::{keyed_path, Column, ColumnType, TableSink, Value};
pub use self::table_reader::{parse_tables, read_tables, Table};
pub use self::text::{RotatingTextFiles, TextSink};
