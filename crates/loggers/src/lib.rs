//! # Loggers
//!
//! The concrete recorders and the `Logs` container that owns them.
//!
//! | Logger | Kinds | Output |
//! |---|---|---|
//! | ComplexityLog | StepEnd | `complexity/` text, rotated |
//! | PositionLog | AgentBirth, AgentBodyUpdated, AgentDeath | one table per agent |
//! | BirthsDeathsLog | AgentBirth, AgentDeath | `BirthsDeaths.log` |
//! | CarryLog | Carry | `events/carry.txt` |
//! | CollisionLog | Collision | `events/collision.txt` |
//! | ContactLog | AgentContactEnd | `events/contacts.txt` |
//! | EnergyLog | Energy | `events/energy.txt` |
//! | GenomeLog | AgentBirth | one record file per agent |
//! | GenomeSubsetLog | AgentBirth | `genome/subset.txt` |
//! | LifeSpanLog | AgentDeath | `lifespans.txt` |
//! | SeparationLog | AgentBirth, AgentContactBegin, AgentDeath, StepEnd | `genome/separations.txt` |

pub mod births_deaths;
pub mod carry;
pub mod collision;
pub mod complexity;
pub mod contact;
pub mod energy;
pub mod genetics;
pub mod genome;
pub mod genome_subset;
pub mod lifespan;
pub mod position;
pub mod separation;
mod support;

use contracts::{Event, LogsConfig, SimContext};
use dispatcher::{DispatchError, Dispatcher, Logger};
use tracing::{info, instrument};

pub use births_deaths::BirthsDeathsLog;
pub use carry::CarryLog;
pub use collision::CollisionLog;
pub use complexity::ComplexityLog;
pub use contact::ContactLog;
pub use energy::EnergyLog;
pub use genome::GenomeLog;
pub use genome_subset::GenomeSubsetLog;
pub use lifespan::LifeSpanLog;
pub use position::PositionLog;
pub use separation::{SeparationBuffer, SeparationLog};

/// Every logger, in installation (and so delivery) order
pub fn default_loggers() -> Vec<Box<dyn Logger>> {
    vec![
        Box::new(ComplexityLog::new()),
        Box::new(PositionLog::new()),
        Box::new(BirthsDeathsLog::new()),
        Box::new(CarryLog::new()),
        Box::new(CollisionLog::new()),
        Box::new(ContactLog::new()),
        Box::new(EnergyLog::new()),
        Box::new(GenomeLog::new()),
        Box::new(GenomeSubsetLog::new()),
        Box::new(LifeSpanLog::new()),
        Box::new(SeparationLog::new()),
    ]
}

/// Owner of all loggers of a run
///
/// Built once at simulation start; afterwards the engine only calls
/// `post_event` and finally `close`.
pub struct Logs {
    dispatcher: Dispatcher,
}

impl Logs {
    /// Install the default loggers, initialize them and close registration
    pub fn new(sim: &SimContext, config: &LogsConfig) -> Result<Self, DispatchError> {
        Self::with_loggers(sim, config, default_loggers())
    }

    /// Same as `new` with a caller-chosen logger set
    #[instrument(name = "logs_init", skip_all, fields(run_dir = %sim.run_dir.display()))]
    pub fn with_loggers(
        sim: &SimContext,
        config: &LogsConfig,
        loggers: Vec<Box<dyn Logger>>,
    ) -> Result<Self, DispatchError> {
        let mut dispatcher = Dispatcher::new();
        for logger in loggers {
            dispatcher.install(logger)?;
        }
        dispatcher.init_all(sim, config)?;
        dispatcher.seal();

        info!(
            installed = dispatcher.installed_count(),
            enabled = dispatcher.enabled_count(),
            "Logs started"
        );
        Ok(Self { dispatcher })
    }

    #[inline]
    pub fn post_event(&mut self, event: &Event<'_>) -> Result<(), DispatchError> {
        self.dispatcher.post_event(event)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Flush and close every sink
    pub fn close(mut self) -> Result<(), DispatchError> {
        let result = self.dispatcher.close();
        info!(metrics = ?self.dispatcher.metrics(), "Logs closed");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        AgentBirth, AgentBodyUpdated, AgentContactBegin, AgentContactEnd, AgentDeath, AgentView,
        BirthKind, Carry, CarryAction, Collision, ComplexityLogConfig, ContactInfo, DeathCause,
        Energy, EnergyAction, EventKind, EventKinds, GenomeSubsetLogConfig, ObjectType, Position,
        SectionConfig, SeparationLogConfig, StepEnd,
    };
    use dispatcher::{Activation, LoggerState};

    fn all_enabled() -> LogsConfig {
        LogsConfig {
            complexity: Some(ComplexityLogConfig {
                frequency: 1,
                ..Default::default()
            }),
            position: Some(SectionConfig::default()),
            births_deaths: Some(SectionConfig::default()),
            carry: Some(SectionConfig::default()),
            collision: Some(SectionConfig::default()),
            contact: Some(SectionConfig::default()),
            energy: Some(SectionConfig::default()),
            genome: Some(SectionConfig::default()),
            genome_subset: Some(GenomeSubsetLogConfig {
                enabled: true,
                gene_indexes: vec![1, 0],
            }),
            lifespan: Some(SectionConfig::default()),
            separation: Some(SeparationLogConfig::default()),
            ..Default::default()
        }
    }

    #[test]
    fn test_every_declared_kind_has_a_handler() {
        let dir = tempfile::tempdir().unwrap();
        let sim = SimContext::new(dir.path(), 2, 1);
        let config = all_enabled();

        let g1 = [0u8, 1];
        let g2 = [3u8, 4];
        let population = [
            AgentView { id: 1, genome: &g1 },
            AgentView { id: 2, genome: &g2 },
        ];
        let energy = [1.5f32];
        fn birth(agent: u64, genome: &[u8]) -> Event<'_> {
            Event::AgentBirth(AgentBirth {
                timestep: 1,
                agent,
                kind: BirthKind::SimInit,
                parents: None,
                position: Position::default(),
                genome,
            })
        }
        // one sample per kind, in an order every logger accepts
        let samples = [
            birth(1, &g1),
            birth(2, &g2),
            Event::AgentBodyUpdated(AgentBodyUpdated {
                timestep: 1,
                agent: 1,
                position: Position::new(1.0, 0.0, 1.0),
            }),
            Event::Carry(Carry {
                timestep: 1,
                agent: 1,
                action: CarryAction::Pickup,
                object_type: ObjectType::Food,
                object_number: 9,
            }),
            Event::Collision(Collision {
                timestep: 1,
                agent: 2,
                object_type: ObjectType::Edge,
            }),
            Event::AgentContactBegin(AgentContactBegin {
                timestep: 1,
                a: 1,
                b: 2,
            }),
            Event::AgentContactEnd(AgentContactEnd {
                timestep: 1,
                a: ContactInfo {
                    agent: 1,
                    ..Default::default()
                },
                b: ContactInfo {
                    agent: 2,
                    ..Default::default()
                },
            }),
            Event::Energy(Energy {
                timestep: 1,
                agent: 1,
                other: 2,
                action: EnergyAction::Give,
                neural_activation: 0.5,
                energy: &energy,
            }),
            Event::StepEnd(StepEnd {
                timestep: 1,
                population: &population,
            }),
            Event::AgentDeath(AgentDeath {
                timestep: 2,
                agent: 2,
                cause: DeathCause::Natural,
                birth_timestep: 1,
                birth_kind: BirthKind::SimInit,
            }),
        ];
        let covered = samples.iter().fold(EventKinds::NONE, |mask, e| mask | e.kind());
        assert_eq!(covered, EventKinds::of(&EventKind::ALL));

        for mut logger in default_loggers() {
            assert_eq!(logger.init(&sim, &config).unwrap(), Activation::Enabled);
            let mut handled = EventKinds::NONE;
            for event in &samples {
                let kind = event.kind();
                let result = logger.handle(event);
                if logger.handles().contains(kind) {
                    assert!(result.is_ok(), "{} failed on {kind}: {result:?}", logger.name());
                    handled |= kind.into();
                } else {
                    assert!(
                        matches!(result, Err(DispatchError::UnexpectedKind { .. })),
                        "{} accepted undeclared {kind}",
                        logger.name()
                    );
                }
            }
            assert_eq!(handled, logger.handles(), "{}", logger.name());
            logger.close().unwrap();
        }
    }

    #[test]
    fn test_default_order() {
        let names: Vec<&str> = default_loggers().iter().map(|l| l.name()).collect();
        assert_eq!(
            names,
            [
                "ComplexityLog",
                "PositionLog",
                "BirthsDeathsLog",
                "CarryLog",
                "CollisionLog",
                "ContactLog",
                "EnergyLog",
                "GenomeLog",
                "GenomeSubsetLog",
                "LifeSpanLog",
                "SeparationLog",
            ]
        );
    }

    #[test]
    fn test_empty_config_enables_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sim = SimContext::new(dir.path(), 4, 1);
        let logs = Logs::new(&sim, &LogsConfig::default()).unwrap();
        assert_eq!(logs.dispatcher().installed_count(), 11);
        assert_eq!(logs.dispatcher().enabled_count(), 0);
        assert!(logs.dispatcher().registered_kinds().is_empty());
        assert!(logs
            .dispatcher()
            .installed()
            .all(|(_, _, state)| state == LoggerState::Disabled));
        logs.close().unwrap();
    }

    #[test]
    fn test_shared_kind_delivered_in_installation_order() {
        let dir = tempfile::tempdir().unwrap();
        let sim = SimContext::new(dir.path(), 4, 1);
        let config = LogsConfig {
            position: Some(SectionConfig::default()),
            births_deaths: Some(SectionConfig::default()),
            lifespan: Some(SectionConfig::default()),
            ..Default::default()
        };
        let logs = Logs::new(&sim, &config).unwrap();
        let d = logs.dispatcher();
        let births: Vec<&str> = d
            .subscribers(EventKind::AgentBirth)
            .iter()
            .filter_map(|&id| d.logger_name(id))
            .collect();
        assert_eq!(births, ["PositionLog", "BirthsDeathsLog"]);
        let deaths: Vec<&str> = d
            .subscribers(EventKind::AgentDeath)
            .iter()
            .filter_map(|&id| d.logger_name(id))
            .collect();
        assert_eq!(deaths, ["PositionLog", "BirthsDeathsLog", "LifeSpanLog"]);
        assert!(!d.registered_kinds().contains(EventKind::Energy));
        logs.close().unwrap();
    }
}
