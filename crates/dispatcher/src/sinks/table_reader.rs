//! Reader for files produced by `TableSink`
//!
//! Any deviation from the layout (missing header, rows outside a table,
//! wrong arity, unparsable cells, unterminated table) is a hard error.

use std::borrow::Cow;
use std::io::BufRead;
use std::path::Path;

use contracts::ContractError;

use crate::sinks::record::RecordFile;
use crate::sinks::table::{Column, ColumnType, Value, FORMAT_HEADER};

/// A fully parsed table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value<'static>>>,
}

impl Table {
    /// Index of the column called `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// All values of one column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<&Value<'static>>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }
}

/// Read every table of a (plain or gzip) table file
pub fn read_tables(path: &Path) -> Result<Vec<Table>, ContractError> {
    let reader = RecordFile::open_read(path)?;
    parse_tables(&path.display().to_string(), reader)
}

/// Parse tables from any buffered reader; `label` is used in errors
pub fn parse_tables(label: &str, reader: impl BufRead) -> Result<Vec<Table>, ContractError> {
    let mut tables = Vec::new();
    let mut current: Option<Table> = None;
    let mut saw_header = false;

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line?;
        let malformed = |message: String| ContractError::malformed(label, line_no, message);

        if !saw_header {
            if line != FORMAT_HEADER {
                return Err(malformed(format!("expected '{FORMAT_HEADER}'")));
            }
            saw_header = true;
            continue;
        }

        if let Some(name) = line.strip_prefix("%table ") {
            if current.is_some() {
                return Err(malformed("nested %table".to_string()));
            }
            current = Some(Table {
                name: name.to_string(),
                columns: Vec::new(),
                rows: Vec::new(),
            });
        } else if let Some(decls) = line.strip_prefix("%columns") {
            let table = current
                .as_mut()
                .ok_or_else(|| malformed("%columns outside a table".to_string()))?;
            if !table.columns.is_empty() {
                return Err(malformed("duplicate %columns".to_string()));
            }
            for token in decls.split_whitespace() {
                let (name, ty) = token
                    .split_once(':')
                    .ok_or_else(|| malformed(format!("bad column '{token}'")))?;
                let ty = ColumnType::parse(ty)
                    .ok_or_else(|| malformed(format!("unknown column type '{ty}'")))?;
                table.columns.push(Column::new(name, ty));
            }
            if table.columns.is_empty() {
                return Err(malformed("empty %columns".to_string()));
            }
        } else if let Some(name) = line.strip_prefix("%end ") {
            let table = current
                .take()
                .ok_or_else(|| malformed("%end outside a table".to_string()))?;
            if table.name != name {
                return Err(malformed(format!(
                    "%end {name} closes table '{}'",
                    table.name
                )));
            }
            tables.push(table);
        } else if line.starts_with('%') {
            return Err(malformed(format!("unknown directive '{line}'")));
        } else {
            let table = current
                .as_mut()
                .ok_or_else(|| malformed("row outside a table".to_string()))?;
            if table.columns.is_empty() {
                return Err(malformed("row before %columns".to_string()));
            }
            let row = parse_row(&line, &table.columns).map_err(malformed)?;
            table.rows.push(row);
        }
    }

    if !saw_header {
        return Err(ContractError::malformed(label, 0, "empty file"));
    }
    if let Some(table) = current {
        return Err(ContractError::malformed(
            label,
            0,
            format!("table '{}' is not terminated", table.name),
        ));
    }
    Ok(tables)
}

fn parse_row(line: &str, columns: &[Column]) -> Result<Vec<Value<'static>>, String> {
    let cells: Vec<&str> = line.split('\t').collect();
    if cells.len() != columns.len() {
        return Err(format!(
            "expected {} cells, got {}",
            columns.len(),
            cells.len()
        ));
    }
    columns
        .iter()
        .zip(cells)
        .map(|(column, cell)| parse_cell(column, cell))
        .collect()
}

fn parse_cell(column: &Column, cell: &str) -> Result<Value<'static>, String> {
    let bad = || format!("column '{}': cannot parse {cell:?} as {}", column.name, column.ty);
    match column.ty {
        ColumnType::Int => cell.parse().map(Value::Int).map_err(|_| bad()),
        ColumnType::Float => cell.parse().map(Value::Float).map_err(|_| bad()),
        ColumnType::Str => Ok(Value::Str(Cow::Owned(cell.to_string()))),
        ColumnType::Bool => match cell {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            _ => Err(bad()),
        },
    }
}
