//! CarryLog - pickups and drops of carried objects

use contracts::{Event, EventKind, EventKinds, LogsConfig, SimContext};
use dispatcher::{Activation, Column, DispatchError, Logger, TableSink, Value};

use crate::support::{close_table, open_sink, open_table};

pub const FILE_PATH: &str = "events/carry.txt";
pub const TABLE: &str = "Carry";

#[derive(Default)]
pub struct CarryLog {
    sink: Option<TableSink>,
}

impl CarryLog {
    const HANDLES: EventKinds = EventKinds::of(&[EventKind::Carry]);

    pub fn new() -> Self {
        Self::default()
    }
}

impl Logger for CarryLog {
    fn name(&self) -> &'static str {
        "CarryLog"
    }

    fn handles(&self) -> EventKinds {
        Self::HANDLES
    }

    fn init(&mut self, sim: &SimContext, config: &LogsConfig) -> Result<Activation, DispatchError> {
        match &config.carry {
            Some(section) if section.enabled => {
                self.sink = Some(open_table(
                    sim,
                    FILE_PATH,
                    TABLE,
                    vec![
                        Column::int("Timestep"),
                        Column::int("Agent"),
                        Column::string("Action"),
                        Column::string("ObjectType"),
                        Column::int("ObjectNumber"),
                    ],
                )?);
                Ok(Activation::Enabled)
            }
            _ => Ok(Activation::Disabled),
        }
    }

    fn handle(&mut self, event: &Event<'_>) -> Result<(), DispatchError> {
        let Event::Carry(e) = event else {
            return Err(DispatchError::unexpected_kind(self.name(), event.kind()));
        };
        open_sink(&mut self.sink, TABLE)?.add_row(&[
            Value::try_from(e.timestep)?,
            Value::try_from(e.agent)?,
            e.action.as_str().into(),
            e.object_type.as_str().into(),
            Value::try_from(e.object_number)?,
        ])
    }

    fn close(&mut self) -> Result<(), DispatchError> {
        close_table(&mut self.sink)
    }
}
