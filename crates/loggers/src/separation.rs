//! SeparationLog - genetic separation between agent pairs
//!
//! Rows are buffered during a step and written at `StepEnd`:
//!
//! - `ContactOnly`: one row per `AgentContactBegin` of the step
//! - `AllPairs`: every agent born during the step paired with every other
//!   living agent, each pair once
//!
//! Genomes are copied at birth, since event payloads only live for the
//! duration of the call.

use std::collections::{BTreeMap, HashSet};

use contracts::{
    AgentId, Event, EventKind, EventKinds, LogsConfig, SeparationMode, SimContext,
};
use dispatcher::{Activation, Column, DispatchError, Logger, TableSink, Value};
use tracing::{debug, instrument};

use crate::genetics::separation;
use crate::support::{close_table, open_sink, open_table};

pub const FILE_PATH: &str = "genome/separations.txt";
pub const TABLE: &str = "Separations";

/// Per-step accumulator, keyed by agent id
#[derive(Debug, Default)]
pub struct SeparationBuffer {
    /// Genome of every living agent
    genomes: BTreeMap<AgentId, Vec<u8>>,
    /// Agents born since the last flush, in birth order
    births: Vec<AgentId>,
    /// Contact pairs since the last flush with their separation
    pending: Vec<(AgentId, AgentId, f64)>,
}

impl SeparationBuffer {
    pub fn birth(&mut self, agent: AgentId, genome: &[u8], track_birth: bool) {
        self.genomes.insert(agent, genome.to_vec());
        if track_birth {
            self.births.push(agent);
        }
    }

    pub fn death(&mut self, agent: AgentId) {
        self.genomes.remove(&agent);
        self.births.retain(|&a| a != agent);
    }

    /// Record a contact pair, measured now
    pub fn contact(&mut self, a: AgentId, b: AgentId) -> Result<(), DispatchError> {
        let genome = |id: AgentId| {
            self.genomes.get(&id).ok_or_else(|| {
                DispatchError::schema(TABLE, format!("contact with unknown agent {id}"))
            })
        };
        let sep = separation(genome(a)?, genome(b)?);
        self.pending.push((a, b, sep));
        Ok(())
    }

    /// Rows for the step that just ended; the per-step state is cleared
    pub fn drain(&mut self, mode: SeparationMode) -> Vec<(AgentId, AgentId, f64)> {
        match mode {
            SeparationMode::ContactOnly => std::mem::take(&mut self.pending),
            SeparationMode::AllPairs => {
                let mut rows = Vec::new();
                let mut done = HashSet::new();
                for newborn in std::mem::take(&mut self.births) {
                    let Some(genome) = self.genomes.get(&newborn) else {
                        continue;
                    };
                    for (&other, other_genome) in &self.genomes {
                        if other == newborn || done.contains(&other) {
                            continue;
                        }
                        rows.push((newborn, other, separation(genome, other_genome)));
                    }
                    done.insert(newborn);
                }
                rows
            }
        }
    }

    /// Number of genomes held
    pub fn living(&self) -> usize {
        self.genomes.len()
    }
}

#[derive(Default)]
pub struct SeparationLog {
    mode: SeparationMode,
    buffer: SeparationBuffer,
    sink: Option<TableSink>,
}

impl SeparationLog {
    const HANDLES: EventKinds = EventKinds::of(&[
        EventKind::AgentBirth,
        EventKind::AgentContactBegin,
        EventKind::AgentDeath,
        EventKind::StepEnd,
    ]);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SeparationMode {
        self.mode
    }

    pub fn buffer(&self) -> &SeparationBuffer {
        &self.buffer
    }
}

impl Logger for SeparationLog {
    fn name(&self) -> &'static str {
        "SeparationLog"
    }

    fn handles(&self) -> EventKinds {
        Self::HANDLES
    }

    #[instrument(name = "separation_log_init", skip_all)]
    fn init(&mut self, sim: &SimContext, config: &LogsConfig) -> Result<Activation, DispatchError> {
        match &config.separation {
            Some(section) if section.enabled => {
                self.mode = section.mode;
                self.sink = Some(open_table(
                    sim,
                    FILE_PATH,
                    TABLE,
                    vec![
                        Column::int("Timestep"),
                        Column::int("Agent1"),
                        Column::int("Agent2"),
                        Column::float("Separation"),
                    ],
                )?);
                debug!(mode = ?self.mode, "Separation tracking enabled");
                Ok(Activation::Enabled)
            }
            _ => Ok(Activation::Disabled),
        }
    }

    fn handle(&mut self, event: &Event<'_>) -> Result<(), DispatchError> {
        match event {
            Event::AgentBirth(e) => {
                let track = self.mode == SeparationMode::AllPairs;
                self.buffer.birth(e.agent, e.genome, track);
                Ok(())
            }
            Event::AgentDeath(e) => {
                self.buffer.death(e.agent);
                Ok(())
            }
            Event::AgentContactBegin(e) => match self.mode {
                SeparationMode::ContactOnly => self.buffer.contact(e.a, e.b),
                // every pair is already covered at birth
                SeparationMode::AllPairs => Ok(()),
            },
            Event::StepEnd(e) => {
                let rows = self.buffer.drain(self.mode);
                let sink = open_sink(&mut self.sink, TABLE)?;
                for (a, b, sep) in rows {
                    sink.add_row(&[
                        Value::try_from(e.timestep)?,
                        Value::try_from(a)?,
                        Value::try_from(b)?,
                        sep.into(),
                    ])?;
                }
                Ok(())
            }
            _ => Err(DispatchError::unexpected_kind(self.name(), event.kind())),
        }
    }

    fn close(&mut self) -> Result<(), DispatchError> {
        close_table(&mut self.sink)
    }
}
