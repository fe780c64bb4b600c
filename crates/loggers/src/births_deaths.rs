//! BirthsDeathsLog - one text line per birth or death
//!
//! ```text
//! 3 BIRTH 7 2 5
//! 4 CREATION 8
//! 50 DEATH 7 STARVED
//! ```

use contracts::{BirthKind, Event, EventKind, EventKinds, LogsConfig, SimContext};
use dispatcher::{Activation, DispatchError, Logger, TextSink};
use tracing::instrument;

pub const FILE_NAME: &str = "BirthsDeaths.log";

#[derive(Default)]
pub struct BirthsDeathsLog {
    sink: Option<TextSink>,
}

impl BirthsDeathsLog {
    const HANDLES: EventKinds = EventKinds::of(&[EventKind::AgentBirth, EventKind::AgentDeath]);

    pub fn new() -> Self {
        Self::default()
    }

    fn sink(&mut self) -> Result<&mut TextSink, DispatchError> {
        self.sink.as_mut().ok_or_else(|| DispatchError::SinkClosed {
            name: FILE_NAME.to_string(),
        })
    }
}

impl Logger for BirthsDeathsLog {
    fn name(&self) -> &'static str {
        "BirthsDeathsLog"
    }

    fn handles(&self) -> EventKinds {
        Self::HANDLES
    }

    #[instrument(name = "births_deaths_log_init", skip_all)]
    fn init(&mut self, sim: &SimContext, config: &LogsConfig) -> Result<Activation, DispatchError> {
        match &config.births_deaths {
            Some(section) if section.enabled => {
                self.sink = Some(TextSink::create(sim.run_dir.join(FILE_NAME))?);
                Ok(Activation::Enabled)
            }
            _ => Ok(Activation::Disabled),
        }
    }

    fn handle(&mut self, event: &Event<'_>) -> Result<(), DispatchError> {
        match event {
            Event::AgentBirth(e) => match (e.kind, e.parents) {
                (BirthKind::Birth, Some((p1, p2))) => self.sink()?.write_line(format_args!(
                    "{} {} {} {} {}",
                    e.timestep, e.kind, e.agent, p1, p2
                )),
                _ => self
                    .sink()?
                    .write_line(format_args!("{} {} {}", e.timestep, e.kind, e.agent)),
            },
            Event::AgentDeath(e) => self
                .sink()?
                .write_line(format_args!("{} DEATH {} {}", e.timestep, e.agent, e.cause)),
            _ => Err(DispatchError::unexpected_kind(self.name(), event.kind())),
        }
    }

    fn close(&mut self) -> Result<(), DispatchError> {
        match self.sink.as_mut() {
            Some(sink) => sink.close(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{AgentBirth, AgentDeath, DeathCause, Position, SectionConfig};
    use tempfile::tempdir;

    #[test]
    fn test_disabled_without_section() {
        let dir = tempdir().unwrap();
        let mut log = BirthsDeathsLog::new();
        let sim = SimContext::new(dir.path(), 4, 1);
        let activation = log.init(&sim, &LogsConfig::default()).unwrap();
        assert_eq!(activation, Activation::Disabled);
        assert!(!dir.path().join(FILE_NAME).exists());
    }

    #[test]
    fn test_line_formats() {
        let dir = tempdir().unwrap();
        let sim = SimContext::new(dir.path(), 4, 1);
        let config = LogsConfig {
            births_deaths: Some(SectionConfig::default()),
            ..Default::default()
        };
        let mut log = BirthsDeathsLog::new();
        assert_eq!(log.init(&sim, &config).unwrap(), Activation::Enabled);

        let genome = [0u8; 4];
        log.handle(&Event::AgentBirth(AgentBirth {
            timestep: 0,
            agent: 1,
            kind: BirthKind::SimInit,
            parents: None,
            position: Position::default(),
            genome: &genome,
        }))
        .unwrap();
        log.handle(&Event::AgentBirth(AgentBirth {
            timestep: 3,
            agent: 7,
            kind: BirthKind::Birth,
            parents: Some((1, 2)),
            position: Position::default(),
            genome: &genome,
        }))
        .unwrap();
        log.handle(&Event::AgentDeath(AgentDeath {
            timestep: 50,
            agent: 7,
            cause: DeathCause::Fight,
            birth_timestep: 3,
            birth_kind: BirthKind::Birth,
        }))
        .unwrap();
        log.close().unwrap();

        let content = std::fs::read_to_string(dir.path().join(FILE_NAME)).unwrap();
        assert_eq!(content, "0 SIMINIT 1\n3 BIRTH 7 1 2\n50 DEATH 7 FIGHT\n");
    }
}
