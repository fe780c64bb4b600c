//! ComplexityLog - periodic population complexity samples
//!
//! Every `frequency` steps the living population's genomes are measured. One
//! summary line per sample goes to `AdamiComplexity-summary.txt`:
//!
//! ```text
//! <timestep> <complexity 1-bit> <complexity 2-bit> <complexity 4-bit>
//! ```
//!
//! and the per-gene 1-bit information of the sample is written to its own
//! `AdamiComplexity_<timestep>.txt`, of which only the newest
//! `maxOutputFiles` are kept.

use contracts::{Event, EventKind, EventKinds, LogsConfig, SimContext, StepEnd};
use dispatcher::{Activation, DispatchError, Logger, RotatingTextFiles, TextSink};
use tracing::{debug, instrument};

use crate::genetics::{complexity, information_per_gene};
use crate::support::open_sink;

pub const DIR: &str = "complexity";
pub const SUMMARY_FILE: &str = "AdamiComplexity-summary.txt";
pub const SAMPLE_PREFIX: &str = "AdamiComplexity_";

pub struct ComplexityLog {
    frequency: u64,
    summary: Option<TextSink>,
    samples: Option<RotatingTextFiles>,
}

impl Default for ComplexityLog {
    fn default() -> Self {
        Self {
            frequency: contracts::DEFAULT_COMPLEXITY_FREQUENCY,
            summary: None,
            samples: None,
        }
    }
}

impl ComplexityLog {
    const HANDLES: EventKinds = EventKinds::of(&[EventKind::StepEnd]);

    pub fn new() -> Self {
        Self::default()
    }

    fn sample(&mut self, e: &StepEnd<'_>) -> Result<(), DispatchError> {
        if e.population.is_empty() {
            debug!(timestep = e.timestep, "Empty population, sample skipped");
            return Ok(());
        }
        let genomes: Vec<&[u8]> = e.population.iter().map(|a| a.genome).collect();

        open_sink(&mut self.summary, SUMMARY_FILE)?.write_line(format_args!(
            "{} {} {} {}",
            e.timestep,
            complexity(&genomes, 1),
            complexity(&genomes, 2),
            complexity(&genomes, 4),
        ))?;

        let mut detail = open_sink(&mut self.samples, SAMPLE_PREFIX)?.open_next(e.timestep)?;
        for (gene, info) in information_per_gene(&genomes, 1).iter().enumerate() {
            detail.write_line(format_args!("{gene} {info}"))?;
        }
        detail.close()
    }
}

impl Logger for ComplexityLog {
    fn name(&self) -> &'static str {
        "ComplexityLog"
    }

    fn handles(&self) -> EventKinds {
        Self::HANDLES
    }

    #[instrument(name = "complexity_log_init", skip_all)]
    fn init(&mut self, sim: &SimContext, config: &LogsConfig) -> Result<Activation, DispatchError> {
        let Some(section) = config.complexity.as_ref().filter(|s| s.enabled) else {
            return Ok(Activation::Disabled);
        };
        if section.frequency == 0 {
            return Err(DispatchError::init(self.name(), "frequency must be positive"));
        }

        let dir = sim.run_dir.join(DIR);
        self.frequency = section.frequency;
        self.summary = Some(TextSink::create(dir.join(SUMMARY_FILE))?);
        self.samples = Some(RotatingTextFiles::new(
            dir,
            SAMPLE_PREFIX,
            ".txt",
            section.max_output_files,
        )?);
        debug!(frequency = self.frequency, "Complexity sampling enabled");
        Ok(Activation::Enabled)
    }

    fn handle(&mut self, event: &Event<'_>) -> Result<(), DispatchError> {
        match event {
            Event::StepEnd(e) if e.timestep % self.frequency == 0 => self.sample(e),
            Event::StepEnd(_) => Ok(()),
            _ => Err(DispatchError::unexpected_kind(self.name(), event.kind())),
        }
    }

    fn max_output_files(&self) -> usize {
        self.samples.as_ref().map_or(1, RotatingTextFiles::max_files)
    }

    fn close(&mut self) -> Result<(), DispatchError> {
        match self.summary.as_mut() {
            Some(sink) => sink.close(),
            None => Ok(()),
        }
    }
}
