//! Event scripts - recorded engine output replayed through the loggers
//!
//! One JSON object per line, tagged by `kind`:
//!
//! ```text
//! {"kind":"agent_birth","timestep":0,"agent":1,"birth_kind":"sim_init","genome":[1,2,3]}
//! {"kind":"agent_contact_begin","timestep":1,"a":1,"b":2}
//! {"kind":"step_end","timestep":1}
//! ```
//!
//! The replayer plays the engine's part: it keeps the living population so
//! `step_end` carries it and `agent_death` knows each agent's birth.

use std::collections::BTreeMap;
use std::io::BufRead;

use contracts::{
    AgentBirth, AgentBodyUpdated, AgentContactBegin, AgentContactEnd, AgentDeath, AgentId,
    AgentView, BirthKind, Carry, CarryAction, Collision, ContactInfo, DeathCause, Energy,
    EnergyAction, Event, ObjectType, Position, StepEnd,
};
use serde::Deserialize;

use crate::error::CliError;

/// One line of an event script
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptEvent {
    StepEnd {
        timestep: u64,
    },
    AgentBirth {
        timestep: u64,
        agent: AgentId,
        birth_kind: BirthKind,
        #[serde(default)]
        parents: Option<(AgentId, AgentId)>,
        #[serde(default)]
        position: Position,
        genome: Vec<u8>,
    },
    AgentBodyUpdated {
        timestep: u64,
        agent: AgentId,
        position: Position,
    },
    AgentDeath {
        timestep: u64,
        agent: AgentId,
        cause: DeathCause,
    },
    Carry {
        timestep: u64,
        agent: AgentId,
        action: CarryAction,
        object_type: ObjectType,
        object_number: u64,
    },
    Collision {
        timestep: u64,
        agent: AgentId,
        object_type: ObjectType,
    },
    AgentContactBegin {
        timestep: u64,
        a: AgentId,
        b: AgentId,
    },
    AgentContactEnd {
        timestep: u64,
        a: ContactInfo,
        b: ContactInfo,
    },
    Energy {
        timestep: u64,
        agent: AgentId,
        other: u64,
        action: EnergyAction,
        #[serde(default)]
        neural_activation: f32,
        energy: Vec<f32>,
    },
}

/// Parse every non-blank, non-`#` line of a script
pub fn parse_script(label: &str, reader: impl BufRead) -> Result<Vec<(usize, ScriptEvent)>, CliError> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(trimmed)
            .map_err(|e| CliError::script_parse(label, index + 1, e.to_string()))?;
        events.push((index + 1, event));
    }
    Ok(events)
}

struct Living {
    birth_timestep: u64,
    birth_kind: BirthKind,
    genome: Vec<u8>,
}

/// Passive engine driver: turns script events into borrowed `Event`s
#[derive(Default)]
pub struct Replayer {
    living: BTreeMap<AgentId, Living>,
    events_in_step: u64,
}

impl Replayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of agents alive
    pub fn population(&self) -> usize {
        self.living.len()
    }

    /// Build the `Event` for `script` and hand it to `post`
    ///
    /// Returns the number of events posted in the step when `script` ends
    /// one.
    pub fn play<E>(
        &mut self,
        label: &str,
        line: usize,
        script: &ScriptEvent,
        mut post: impl FnMut(&Event<'_>) -> Result<(), E>,
    ) -> Result<Option<u64>, ReplayError<E>> {
        let unknown = |agent: AgentId| -> ReplayError<E> {
            ReplayError::Script(CliError::UnknownAgent {
                path: label.to_string(),
                line,
                agent,
            })
        };
        self.events_in_step += 1;

        let posted = match script {
            ScriptEvent::StepEnd { timestep } => {
                let population: Vec<AgentView<'_>> = self
                    .living
                    .iter()
                    .map(|(&id, a)| AgentView {
                        id,
                        genome: &a.genome,
                    })
                    .collect();
                post(&Event::StepEnd(StepEnd {
                    timestep: *timestep,
                    population: &population,
                }))
                .map_err(ReplayError::Post)?;
                return Ok(Some(std::mem::take(&mut self.events_in_step)));
            }
            ScriptEvent::AgentBirth {
                timestep,
                agent,
                birth_kind,
                parents,
                position,
                genome,
            } => {
                self.living.insert(
                    *agent,
                    Living {
                        birth_timestep: *timestep,
                        birth_kind: *birth_kind,
                        genome: genome.clone(),
                    },
                );
                post(&Event::AgentBirth(AgentBirth {
                    timestep: *timestep,
                    agent: *agent,
                    kind: *birth_kind,
                    parents: *parents,
                    position: *position,
                    genome: genome.as_slice(),
                }))
            }
            ScriptEvent::AgentBodyUpdated {
                timestep,
                agent,
                position,
            } => post(&Event::AgentBodyUpdated(AgentBodyUpdated {
                timestep: *timestep,
                agent: *agent,
                position: *position,
            })),
            ScriptEvent::AgentDeath {
                timestep,
                agent,
                cause,
            } => {
                let born = self.living.remove(agent).ok_or_else(|| unknown(*agent))?;
                post(&Event::AgentDeath(AgentDeath {
                    timestep: *timestep,
                    agent: *agent,
                    cause: *cause,
                    birth_timestep: born.birth_timestep,
                    birth_kind: born.birth_kind,
                }))
            }
            ScriptEvent::Carry {
                timestep,
                agent,
                action,
                object_type,
                object_number,
            } => post(&Event::Carry(Carry {
                timestep: *timestep,
                agent: *agent,
                action: *action,
                object_type: *object_type,
                object_number: *object_number,
            })),
            ScriptEvent::Collision {
                timestep,
                agent,
                object_type,
            } => post(&Event::Collision(Collision {
                timestep: *timestep,
                agent: *agent,
                object_type: *object_type,
            })),
            ScriptEvent::AgentContactBegin { timestep, a, b } => {
                post(&Event::AgentContactBegin(AgentContactBegin {
                    timestep: *timestep,
                    a: *a,
                    b: *b,
                }))
            }
            ScriptEvent::AgentContactEnd { timestep, a, b } => {
                post(&Event::AgentContactEnd(AgentContactEnd {
                    timestep: *timestep,
                    a: *a,
                    b: *b,
                }))
            }
            ScriptEvent::Energy {
                timestep,
                agent,
                other,
                action,
                neural_activation,
                energy,
            } => post(&Event::Energy(Energy {
                timestep: *timestep,
                agent: *agent,
                other: *other,
                action: *action,
                neural_activation: *neural_activation,
                energy: energy.as_slice(),
            })),
        };
        posted.map_err(ReplayError::Post)?;
        Ok(None)
    }
}

/// Failure while replaying one line
#[derive(Debug)]
pub enum ReplayError<E> {
    /// The script itself is inconsistent
    Script(CliError),
    /// A logger failed on the event
    Post(E),
}
