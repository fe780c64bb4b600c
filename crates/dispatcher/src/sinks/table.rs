//! TableSink - named, typed, multi-table record files
//!
//! On-disk layout:
//!
//! ```text
//! %datalib 1
//! %table Positions
//! %columns Timestep:int x:float y:float z:float
//! 1	0.5	0	2.25
//! %end Positions
//! ```
//!
//! Cells are tab separated. Tables are written one after the other; each
//! name may be declared once per file.

use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DispatchError;
use crate::sinks::text::create_file;

pub(crate) const FORMAT_HEADER: &str = "%datalib 1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Float,
    Str,
    Bool,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Str => "string",
            ColumnType::Bool => "bool",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "int" => Some(ColumnType::Int),
            "float" => Some(ColumnType::Float),
            "string" => Some(ColumnType::Str),
            "bool" => Some(ColumnType::Bool),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Float)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Str)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Bool)
    }
}

/// One cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Int(i64),
    Float(f64),
    Str(Cow<'a, str>),
    Bool(bool),
}

impl Value<'_> {
    pub fn ty(&self) -> ColumnType {
        match self {
            Value::Int(_) => ColumnType::Int,
            Value::Float(_) => ColumnType::Float,
            Value::Str(_) => ColumnType::Str,
            Value::Bool(_) => ColumnType::Bool,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
            Value::Bool(v) => f.write_str(if *v { "1" } else { "0" }),
        }
    }
}

impl From<i64> for Value<'_> {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl TryFrom<u64> for Value<'_> {
    type Error = DispatchError;

    fn try_from(v: u64) -> Result<Self, Self::Error> {
        i64::try_from(v)
            .map(Value::Int)
            .map_err(|_| DispatchError::IntOutOfRange { value: v })
    }
}

impl From<f64> for Value<'_> {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value<'_> {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<bool> for Value<'_> {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Value::Str(Cow::Borrowed(v))
    }
}

impl From<String> for Value<'_> {
    fn from(v: String) -> Self {
        Value::Str(Cow::Owned(v))
    }
}

struct OpenTable {
    name: String,
    columns: Vec<Column>,
}

/// Tabular sink over any writer (a file by default)
pub struct TableSink<W: Write = BufWriter<File>> {
    label: String,
    writer: Option<W>,
    declared: Vec<String>,
    current: Option<OpenTable>,
    rows: u64,
}

impl TableSink {
    /// Create (truncate) a table file at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self, DispatchError> {
        let path = path.as_ref();
        let file = create_file("table", path)?;
        let sink = Self::from_writer(path.display().to_string(), BufWriter::new(file))
            .map_err(|e| match e {
                DispatchError::Io(io) => DispatchError::sink_open("table", path, io),
                other => other,
            })?;
        debug!(path = %path.display(), "TableSink opened");
        Ok(sink)
    }

    /// Create a file holding a single table declared up front
    pub fn create_with_table(
        path: impl AsRef<Path>,
        table: &str,
        columns: Vec<Column>,
    ) -> Result<Self, DispatchError> {
        let mut sink = Self::create(path)?;
        sink.begin_table(table, columns)?;
        Ok(sink)
    }
}

impl<W: Write> TableSink<W> {
    /// Wrap `writer`; the format header is written immediately
    pub fn from_writer(label: impl Into<String>, mut writer: W) -> Result<Self, DispatchError> {
        writeln!(writer, "{FORMAT_HEADER}")?;
        Ok(Self {
            label: label.into(),
            writer: Some(writer),
            declared: Vec::new(),
            current: None,
            rows: 0,
        })
    }

    /// Declare a table and make it current; ends the previous table
    pub fn begin_table(&mut self, name: &str, columns: Vec<Column>) -> Result<(), DispatchError> {
        validate_token(name).map_err(|m| DispatchError::schema(name, m))?;
        if columns.is_empty() {
            return Err(DispatchError::schema(name, "table needs at least one column"));
        }
        for (i, column) in columns.iter().enumerate() {
            validate_token(&column.name).map_err(|m| DispatchError::schema(name, m))?;
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(DispatchError::schema(
                    name,
                    format!("duplicate column '{}'", column.name),
                ));
            }
        }
        if self.declared.iter().any(|d| d == name) {
            return Err(DispatchError::schema(name, "table already declared"));
        }

        self.end_table()?;
        let writer = self.writer_mut()?;
        writeln!(writer, "%table {name}")?;
        write!(writer, "%columns")?;
        for column in &columns {
            write!(writer, " {}:{}", column.name, column.ty)?;
        }
        writeln!(writer)?;

        self.declared.push(name.to_string());
        self.current = Some(OpenTable {
            name: name.to_string(),
            columns,
        });
        Ok(())
    }

    /// Append a row to the current table; types are checked per column
    pub fn add_row(&mut self, values: &[Value<'_>]) -> Result<(), DispatchError> {
        let table = self
            .current
            .as_ref()
            .ok_or_else(|| DispatchError::schema(self.label.as_str(), "no table declared"))?;

        if values.len() != table.columns.len() {
            return Err(DispatchError::schema(
                table.name.as_str(),
                format!(
                    "expected {} values, got {}",
                    table.columns.len(),
                    values.len()
                ),
            ));
        }
        for (column, value) in table.columns.iter().zip(values) {
            if column.ty != value.ty() {
                return Err(DispatchError::schema(
                    table.name.as_str(),
                    format!(
                        "column '{}' is {}, got {}",
                        column.name,
                        column.ty,
                        value.ty()
                    ),
                ));
            }
            if let Value::Str(s) = value {
                validate_cell(s).map_err(|m| DispatchError::schema(table.name.as_str(), m))?;
            }
        }

        let writer = self.writer.as_mut().ok_or_else(|| DispatchError::SinkClosed {
            name: self.label.clone(),
        })?;
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                writer.write_all(b"\t")?;
            }
            write!(writer, "{value}")?;
        }
        writer.write_all(b"\n")?;
        self.rows += 1;
        Ok(())
    }

    /// Close the current table, if any
    pub fn end_table(&mut self) -> Result<(), DispatchError> {
        if let Some(table) = self.current.take() {
            writeln!(self.writer_mut()?, "%end {}", table.name)?;
        }
        Ok(())
    }

    pub fn current_table(&self) -> Option<&str> {
        self.current.as_ref().map(|t| t.name.as_str())
    }

    /// Rows written across all tables
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    pub fn flush(&mut self) -> Result<(), DispatchError> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// End the current table, flush and release the writer. Idempotent.
    pub fn close(&mut self) -> Result<(), DispatchError> {
        if self.writer.is_none() {
            return Ok(());
        }
        self.end_table()?;
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        debug!(sink = %self.label, rows = self.rows, "TableSink closed");
        Ok(())
    }

    /// Close and hand back the underlying writer
    pub fn into_inner(mut self) -> Result<W, DispatchError> {
        self.end_table()?;
        let mut writer = self.writer.take().ok_or_else(|| DispatchError::SinkClosed {
            name: self.label.clone(),
        })?;
        writer.flush()?;
        Ok(writer)
    }

    fn writer_mut(&mut self) -> Result<&mut W, DispatchError> {
        self.writer.as_mut().ok_or_else(|| DispatchError::SinkClosed {
            name: self.label.clone(),
        })
    }
}

/// Table and column names: non-empty, no whitespace, no ':' or '%'
fn validate_token(token: &str) -> Result<(), String> {
    if token.is_empty() {
        return Err("empty name".to_string());
    }
    if token
        .chars()
        .any(|c| c.is_whitespace() || c == ':' || c == '%')
    {
        return Err(format!("invalid name '{token}'"));
    }
    Ok(())
}

/// String cells: no tabs or line breaks, must not start with '%'
fn validate_cell(cell: &str) -> Result<(), String> {
    if cell.contains(['\t', '\n', '\r']) || cell.starts_with('%') {
        return Err(format!("string cell {cell:?} cannot be stored"));
    }
    Ok(())
}

impl<W: Write> fmt::Debug for TableSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSink")
            .field("label", &self.label)
            .field("tables", &self.declared)
            .field("rows", &self.rows)
            .finish()
    }
}

/// Path helper for loggers writing one table file per key
pub fn keyed_path(dir: &Path, prefix: &str, key: impl fmt::Display) -> PathBuf {
    dir.join(format!("{prefix}{key}.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_sink() -> TableSink<Vec<u8>> {
        TableSink::from_writer("memory", Vec::new()).unwrap()
    }

    #[test]
    fn test_single_table_layout() {
        let mut sink = memory_sink();
        sink.begin_table(
            "Positions",
            vec![Column::int("Timestep"), Column::float("x"), Column::string("Tag")],
        )
        .unwrap();
        sink.add_row(&[Value::Int(1), Value::Float(0.5), "a".into()])
            .unwrap();
        sink.add_row(&[Value::Int(2), Value::Float(1.0), "b".into()])
            .unwrap();

        let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            "%datalib 1\n%table Positions\n%columns Timestep:int x:float Tag:string\n1\t0.5\ta\n2\t1\tb\n%end Positions\n"
        );
    }

    #[test]
    fn test_multiple_tables() {
        let mut sink = memory_sink();
        sink.begin_table("A", vec![Column::int("v")]).unwrap();
        sink.add_row(&[Value::Int(1)]).unwrap();
        sink.begin_table("B", vec![Column::bool("flag")]).unwrap();
        sink.add_row(&[Value::Bool(true)]).unwrap();
        assert_eq!(sink.current_table(), Some("B"));
        assert_eq!(sink.rows_written(), 2);

        let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert!(out.contains("%end A\n%table B\n"));
        assert!(out.ends_with("1\n%end B\n"));
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let mut sink = memory_sink();
        sink.begin_table("T", vec![Column::int("Agent")]).unwrap();
        let err = sink.add_row(&[Value::Float(1.0)]).unwrap_err();
        assert!(err.to_string().contains("column 'Agent' is int"));
        assert_eq!(sink.rows_written(), 0);
    }

    #[test]
    fn test_arity_mismatch_rejected() {
        let mut sink = memory_sink();
        sink.begin_table("T", vec![Column::int("a"), Column::int("b")])
            .unwrap();
        assert!(sink.add_row(&[Value::Int(1)]).is_err());
    }

    #[test]
    fn test_row_without_table_rejected() {
        let mut sink = memory_sink();
        assert!(sink.add_row(&[Value::Int(1)]).is_err());
    }

    #[test]
    fn test_redeclaration_rejected() {
        let mut sink = memory_sink();
        sink.begin_table("T", vec![Column::int("a")]).unwrap();
        sink.begin_table("U", vec![Column::int("a")]).unwrap();
        assert!(sink.begin_table("T", vec![Column::int("a")]).is_err());
    }

    #[test]
    fn test_bad_names_and_cells_rejected() {
        let mut sink = memory_sink();
        assert!(sink.begin_table("has space", vec![Column::int("a")]).is_err());
        assert!(sink
            .begin_table("T", vec![Column::int("a"), Column::int("a")])
            .is_err());
        sink.begin_table("T", vec![Column::string("s")]).unwrap();
        assert!(sink.add_row(&["tab\there".into()]).is_err());
        assert!(sink.add_row(&["%end".into()]).is_err());
        assert!(sink.add_row(&["fine".into()]).is_ok());
    }

    #[test]
    fn test_unsigned_beyond_i64_rejected() {
        assert_eq!(Value::try_from(i64::MAX as u64).unwrap(), Value::Int(i64::MAX));
        assert!(matches!(
            Value::try_from(u64::MAX),
            Err(DispatchError::IntOutOfRange { value: u64::MAX })
        ));
        assert!(Value::try_from(1u64 << 63).is_err());
    }

    #[test]
    fn test_close_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.txt");
        let mut sink = TableSink::create_with_table(&path, "T", vec![Column::int("a")]).unwrap();
        sink.add_row(&[Value::Int(7)]).unwrap();
        sink.close().unwrap();
        sink.close().unwrap();
        assert!(matches!(
            sink.add_row(&[Value::Int(8)]),
            Err(DispatchError::SinkClosed { .. })
        ));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("7\n%end T\n"));
    }
}
