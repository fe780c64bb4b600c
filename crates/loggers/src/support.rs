//! Helpers shared by the table-backed loggers.

use contracts::SimContext;
use dispatcher::{Column, DispatchError, TableSink};

/// Open `{run_dir}/{rel_path}` with one table declared
pub(crate) fn open_table(
    sim: &SimContext,
    rel_path: &str,
    table: &str,
    columns: Vec<Column>,
) -> Result<TableSink, DispatchError> {
    TableSink::create_with_table(sim.run_dir.join(rel_path), table, columns)
}

/// The open sink, or `SinkClosed` if init never opened it
pub(crate) fn open_sink<'s, S>(
    slot: &'s mut Option<S>,
    name: &str,
) -> Result<&'s mut S, DispatchError> {
    slot.as_mut().ok_or_else(|| DispatchError::SinkClosed {
        name: name.to_string(),
    })
}

pub(crate) fn close_table(slot: &mut Option<TableSink>) -> Result<(), DispatchError> {
    match slot.as_mut() {
        Some(sink) => sink.close(),
        None => Ok(()),
    }
}
