//! LifeSpanLog - birth and death summary, one row per dead agent

use contracts::{Event, EventKind, EventKinds, LogsConfig, SimContext};
use dispatcher::{Activation, Column, DispatchError, Logger, TableSink, Value};

use crate::support::{close_table, open_sink, open_table};

pub const FILE_PATH: &str = "lifespans.txt";
pub const TABLE: &str = "LifeSpans";

#[derive(Default)]
pub struct LifeSpanLog {
    sink: Option<TableSink>,
}

impl LifeSpanLog {
    const HANDLES: EventKinds = EventKinds::of(&[EventKind::AgentDeath]);

    pub fn new() -> Self {
        Self::default()
    }
}

impl Logger for LifeSpanLog {
    fn name(&self) -> &'static str {
        "LifeSpanLog"
    }

    fn handles(&self) -> EventKinds {
        Self::HANDLES
    }

    fn init(&mut self, sim: &SimContext, config: &LogsConfig) -> Result<Activation, DispatchError> {
        match &config.lifespan {
            Some(section) if section.enabled => {
                self.sink = Some(open_table(
                    sim,
                    FILE_PATH,
                    TABLE,
                    vec![
                        Column::int("Agent"),
                        Column::int("BirthStep"),
                        Column::string("BirthReason"),
                        Column::int("DeathStep"),
                        Column::string("DeathReason"),
                    ],
                )?);
                Ok(Activation::Enabled)
            }
            _ => Ok(Activation::Disabled),
        }
    }

    fn handle(&mut self, event: &Event<'_>) -> Result<(), DispatchError> {
        let Event::AgentDeath(e) = event else {
            return Err(DispatchError::unexpected_kind(self.name(), event.kind()));
        };
        open_sink(&mut self.sink, TABLE)?.add_row(&[
            Value::try_from(e.agent)?,
            Value::try_from(e.birth_timestep)?,
            e.birth_kind.as_str().into(),
            Value::try_from(e.timestep)?,
            e.cause.as_str().into(),
        ])
    }

    fn close(&mut self) -> Result<(), DispatchError> {
        close_table(&mut self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{AgentDeath, BirthKind, DeathCause, SectionConfig};
    use dispatcher::sinks::read_tables;

    #[test]
    fn test_lifespan_row() {
        let dir = tempfile::tempdir().unwrap();
        let sim = SimContext::new(dir.path(), 4, 1);
        let config = LogsConfig {
            lifespan: Some(SectionConfig::default()),
            ..Default::default()
        };
        let mut log = LifeSpanLog::new();
        log.init(&sim, &config).unwrap();
        log.handle(&Event::AgentDeath(AgentDeath {
            timestep: 120,
            agent: 11,
            cause: DeathCause::Natural,
            birth_timestep: 20,
            birth_kind: BirthKind::Create,
        }))
        .unwrap();
        log.close().unwrap();

        let table = &read_tables(&dir.path().join(FILE_PATH)).unwrap()[0];
        let row = &table.rows[0];
        assert_eq!(row[0], Value::Int(11));
        assert_eq!(row[1], Value::Int(20));
        assert_eq!(row[2].as_str(), Some("CREATION"));
        assert_eq!(row[3], Value::Int(120));
        assert_eq!(row[4].as_str(), Some("NATURAL"));
    }
}
