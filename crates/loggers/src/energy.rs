//! EnergyLog - energy transfers between agents and from food
//!
//! One row per event; identical events produce identical rows, never merged.
//! The trailing `Energy<i>` columns hold one delta per energy type of the run.

use contracts::{Event, EventKind, EventKinds, LogsConfig, SimContext};
use dispatcher::{Activation, Column, DispatchError, Logger, TableSink, Value};

use crate::support::{close_table, open_sink, open_table};

pub const FILE_PATH: &str = "events/energy.txt";
pub const TABLE: &str = "Energy";

#[derive(Default)]
pub struct EnergyLog {
    sink: Option<TableSink>,
    energy_types: usize,
    row: Vec<Value<'static>>,
}

impl EnergyLog {
    const HANDLES: EventKinds = EventKinds::of(&[EventKind::Energy]);

    pub fn new() -> Self {
        Self::default()
    }

    fn columns(energy_types: usize) -> Vec<Column> {
        let mut columns = vec![
            Column::int("Timestep"),
            Column::int("Agent"),
            Column::string("Action"),
            Column::int("Other"),
            Column::float("NeuralActivation"),
        ];
        columns.extend((0..energy_types).map(|i| Column::float(format!("Energy{i}"))));
        columns
    }
}

impl Logger for EnergyLog {
    fn name(&self) -> &'static str {
        "EnergyLog"
    }

    fn handles(&self) -> EventKinds {
        Self::HANDLES
    }

    fn init(&mut self, sim: &SimContext, config: &LogsConfig) -> Result<Activation, DispatchError> {
        match &config.energy {
            Some(section) if section.enabled => {
                self.energy_types = sim.energy_types;
                self.sink = Some(open_table(sim, FILE_PATH, TABLE, Self::columns(sim.energy_types))?);
                Ok(Activation::Enabled)
            }
            _ => Ok(Activation::Disabled),
        }
    }

    fn handle(&mut self, event: &Event<'_>) -> Result<(), DispatchError> {
        let Event::Energy(e) = event else {
            return Err(DispatchError::unexpected_kind(self.name(), event.kind()));
        };
        if e.energy.len() != self.energy_types {
            return Err(DispatchError::schema(
                TABLE,
                format!(
                    "agent {} reported {} energy types, run has {}",
                    e.agent,
                    e.energy.len(),
                    self.energy_types
                ),
            ));
        }

        self.row.clear();
        self.row.extend([
            Value::try_from(e.timestep)?,
            Value::try_from(e.agent)?,
            e.action.as_str().into(),
            Value::try_from(e.other)?,
            e.neural_activation.into(),
        ]);
        self.row.extend(e.energy.iter().map(|&v| Value::from(v)));
        open_sink(&mut self.sink, TABLE)?.add_row(&self.row)
    }

    fn close(&mut self) -> Result<(), DispatchError> {
        close_table(&mut self.sink)
    }
}
