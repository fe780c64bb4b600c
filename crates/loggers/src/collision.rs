//! CollisionLog - agent collisions with world objects

use contracts::{Event, EventKind, EventKinds, LogsConfig, SimContext};
use dispatcher::{Activation, Column, DispatchError, Logger, TableSink, Value};

use crate::support::{close_table, open_sink, open_table};

pub const FILE_PATH: &str = "events/collision.txt";
pub const TABLE: &str = "Collisions";

#[derive(Default)]
pub struct CollisionLog {
    sink: Option<TableSink>,
}

impl CollisionLog {
    const HANDLES: EventKinds = EventKinds::of(&[EventKind::Collision]);

    pub fn new() -> Self {
        Self::default()
    }
}

impl Logger for CollisionLog {
    fn name(&self) -> &'static str {
        "CollisionLog"
    }

    fn handles(&self) -> EventKinds {
        Self::HANDLES
    }

    fn init(&mut self, sim: &SimContext, config: &LogsConfig) -> Result<Activation, DispatchError> {
        match &config.collision {
            Some(section) if section.enabled => {
                self.sink = Some(open_table(
                    sim,
                    FILE_PATH,
                    TABLE,
                    vec![
                        Column::int("Timestep"),
                        Column::int("Agent"),
                        Column::string("ObjectType"),
                    ],
                )?);
                Ok(Activation::Enabled)
            }
            _ => Ok(Activation::Disabled),
        }
    }

    fn handle(&mut self, event: &Event<'_>) -> Result<(), DispatchError> {
        let Event::Collision(e) = event else {
            return Err(DispatchError::unexpected_kind(self.name(), event.kind()));
        };
        open_sink(&mut self.sink, TABLE)?.add_row(&[
            Value::try_from(e.timestep)?,
            Value::try_from(e.agent)?,
            e.object_type.as_str().into(),
        ])
    }

    fn close(&mut self) -> Result<(), DispatchError> {
        close_table(&mut self.sink)
    }
}
