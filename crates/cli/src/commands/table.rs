//! `table` command implementation.

use anyhow::{Context, Result};
use dispatcher::sinks::read_tables;
use dispatcher::{Table, Value};
use serde_json::{json, Map};
use tracing::info;

use crate::cli::TableArgs;
use crate::error::CliError;

/// Execute the `table` command
pub fn run_table(args: &TableArgs) -> Result<()> {
    let tables = read_tables(&args.path)
        .with_context(|| format!("Failed to read tables from {}", args.path.display()))?;
    info!(path = %args.path.display(), tables = tables.len(), "Tables loaded");

    let selected: Vec<&Table> = match &args.name {
        Some(name) => {
            let table = tables
                .iter()
                .find(|t| &t.name == name)
                .ok_or_else(|| CliError::TableNotFound {
                    name: name.clone(),
                    path: args.path.display().to_string(),
                })?;
            vec![table]
        }
        None => tables.iter().collect(),
    };

    if args.json {
        let json: Vec<serde_json::Value> = selected.iter().map(|t| table_to_json(t)).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json).context("Failed to serialize tables")?
        );
    } else {
        for table in selected {
            print_table(table);
        }
    }
    Ok(())
}

fn value_to_json(value: &Value<'_>) -> serde_json::Value {
    match value {
        Value::Int(v) => json!(v),
        Value::Float(v) => json!(v),
        Value::Str(v) => json!(v),
        Value::Bool(v) => json!(v),
    }
}

fn table_to_json(table: &Table) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = table
        .rows
        .iter()
        .map(|row| {
            let object: Map<String, serde_json::Value> = table
                .columns
                .iter()
                .zip(row)
                .map(|(column, value)| (column.name.clone(), value_to_json(value)))
                .collect();
            serde_json::Value::Object(object)
        })
        .collect();

    json!({
        "name": table.name,
        "columns": table
            .columns
            .iter()
            .map(|c| json!({ "name": c.name, "type": c.ty.as_str() }))
            .collect::<Vec<_>>(),
        "rows": rows,
    })
}

fn print_table(table: &Table) {
    println!("📋 {} ({} rows)", table.name, table.rows.len());
    let header: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("{}:{}", c.name, c.ty))
        .collect();
    println!("   {}", header.join("\t"));
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
        println!("   {}", cells.join("\t"));
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatcher::Column;
    use std::borrow::Cow;

    #[test]
    fn test_table_to_json() {
        let table = Table {
            name: "Carry".to_string(),
            columns: vec![Column::int("Agent"), Column::string("Action")],
            rows: vec![vec![Value::Int(3), Value::Str(Cow::Owned("PICKUP".to_string()))]],
        };
        let json = table_to_json(&table);
        assert_eq!(json["name"], "Carry");
        assert_eq!(json["columns"][1]["type"], "string");
        assert_eq!(json["rows"][0]["Agent"], 3);
        assert_eq!(json["rows"][0]["Action"], "PICKUP");
    }
}
