//! GenomeLog - full genome dump per agent, one gene value per line
//!
//! Written through [`RecordFile`], so the run-wide `recordFileType` decides
//! whether dumps are gzip compressed.

use std::io::Write;
use std::path::{Path, PathBuf};

use contracts::{AgentId, Event, EventKind, EventKinds, LogsConfig, RecordFileType, SimContext};
use dispatcher::{Activation, DispatchError, Logger, RecordFile};
use tracing::{debug, instrument};

pub const DIR: &str = "genome/agents";

#[derive(Default)]
pub struct GenomeLog {
    dir: Option<PathBuf>,
    file_type: RecordFileType,
}

impl GenomeLog {
    const HANDLES: EventKinds = EventKinds::of(&[EventKind::AgentBirth]);

    pub fn new() -> Self {
        Self::default()
    }

    /// Path of `agent`'s dump before the record file suffix is appended
    pub fn path_for(run_dir: &Path, agent: AgentId) -> PathBuf {
        run_dir.join(DIR).join(format!("genome_{agent}.txt"))
    }

    fn dump(&self, dir: &Path, agent: AgentId, genome: &[u8]) -> Result<(), DispatchError> {
        let mut file = RecordFile::create(dir.join(format!("genome_{agent}.txt")), self.file_type)?;
        for gene in genome {
            writeln!(file, "{gene}")?;
        }
        file.finish()
    }
}

impl Logger for GenomeLog {
    fn name(&self) -> &'static str {
        "GenomeLog"
    }

    fn handles(&self) -> EventKinds {
        Self::HANDLES
    }

    #[instrument(name = "genome_log_init", skip_all)]
    fn init(&mut self, sim: &SimContext, config: &LogsConfig) -> Result<Activation, DispatchError> {
        match &config.genome {
            Some(section) if section.enabled => {
                self.dir = Some(sim.run_dir.join(DIR));
                self.file_type = config.record_file_type;
                debug!(file_type = ?self.file_type, "Genome dumps enabled");
                Ok(Activation::Enabled)
            }
            _ => Ok(Activation::Disabled),
        }
    }

    fn handle(&mut self, event: &Event<'_>) -> Result<(), DispatchError> {
        let Event::AgentBirth(e) = event else {
            return Err(DispatchError::unexpected_kind(self.name(), event.kind()));
        };
        let dir = self.dir.as_deref().ok_or_else(|| DispatchError::SinkClosed {
            name: DIR.to_string(),
        })?;
        self.dump(dir, e.agent, e.genome)
    }

    fn close(&mut self) -> Result<(), DispatchError> {
        self.dir = None;
        Ok(())
    }
}
