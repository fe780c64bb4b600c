//! PositionLog - per-agent position trace
//!
//! Each agent gets its own table file from birth to death. Files are closed
//! as soon as the agent dies so the number of open handles follows the
//! living population.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use contracts::{AgentId, Event, EventKind, EventKinds, LogsConfig, Position, SimContext};
use dispatcher::sinks::keyed_path;
use dispatcher::{Activation, Column, DispatchError, Logger, TableSink, Value};
use tracing::{debug, instrument};

pub const DIR: &str = "motion/position/agents";
pub const FILE_PREFIX: &str = "position_";
pub const TABLE: &str = "Positions";

#[derive(Default)]
pub struct PositionLog {
    dir: Option<PathBuf>,
    agents: BTreeMap<AgentId, TableSink>,
}

impl PositionLog {
    const HANDLES: EventKinds = EventKinds::of(&[
        EventKind::AgentBirth,
        EventKind::AgentBodyUpdated,
        EventKind::AgentDeath,
    ]);

    pub fn new() -> Self {
        Self::default()
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::int("Timestep"),
            Column::float("x"),
            Column::float("y"),
            Column::float("z"),
        ]
    }

    /// Path of `agent`'s position file under `run_dir`
    pub fn path_for(run_dir: &Path, agent: AgentId) -> PathBuf {
        keyed_path(&run_dir.join(DIR), FILE_PREFIX, agent)
    }

    /// Number of agents with an open file
    pub fn open_files(&self) -> usize {
        self.agents.len()
    }

    fn open(&mut self, agent: AgentId) -> Result<&mut TableSink, DispatchError> {
        let dir = self.dir.as_ref().ok_or_else(|| DispatchError::SinkClosed {
            name: TABLE.to_string(),
        })?;
        let sink =
            TableSink::create_with_table(keyed_path(dir, FILE_PREFIX, agent), TABLE, Self::columns())?;
        match self.agents.entry(agent) {
            Entry::Occupied(mut slot) => {
                debug!(agent, "Agent born twice, position file restarted");
                slot.insert(sink);
                Ok(slot.into_mut())
            }
            Entry::Vacant(slot) => Ok(slot.insert(sink)),
        }
    }

    fn sink(&mut self, agent: AgentId) -> Result<&mut TableSink, DispatchError> {
        self.agents
            .get_mut(&agent)
            .ok_or_else(|| DispatchError::schema(TABLE, format!("no position file for agent {agent}")))
    }
}

fn write_position(sink: &mut TableSink, timestep: u64, p: Position) -> Result<(), DispatchError> {
    sink.add_row(&[
        Value::try_from(timestep)?,
        p.x.into(),
        p.y.into(),
        p.z.into(),
    ])
}

impl Logger for PositionLog {
    fn name(&self) -> &'static str {
        "PositionLog"
    }

    fn handles(&self) -> EventKinds {
        Self::HANDLES
    }

    #[instrument(name = "position_log_init", skip_all)]
    fn init(&mut self, sim: &SimContext, config: &LogsConfig) -> Result<Activation, DispatchError> {
        match &config.position {
            Some(section) if section.enabled => {
                self.dir = Some(sim.run_dir.join(DIR));
                Ok(Activation::Enabled)
            }
            _ => Ok(Activation::Disabled),
        }
    }

    fn handle(&mut self, event: &Event<'_>) -> Result<(), DispatchError> {
        match event {
            Event::AgentBirth(e) => write_position(self.open(e.agent)?, e.timestep, e.position),
            Event::AgentBodyUpdated(e) => {
                write_position(self.sink(e.agent)?, e.timestep, e.position)
            }
            Event::AgentDeath(e) => match self.agents.remove(&e.agent) {
                Some(mut sink) => sink.close(),
                None => Ok(()),
            },
            _ => Err(DispatchError::unexpected_kind(self.name(), event.kind())),
        }
    }

    fn close(&mut self) -> Result<(), DispatchError> {
        let mut first_err = None;
        for (_, mut sink) in std::mem::take(&mut self.agents) {
            if let Err(e) = sink.close() {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
