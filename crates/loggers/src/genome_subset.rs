//! GenomeSubsetLog - selected genes of every newborn
//!
//! One `Gene<i>` column per configured index, in the configured order, one
//! row per birth. Genome length beyond the selected genes is ignored.

use contracts::{Event, EventKind, EventKinds, LogsConfig, SimContext};
use dispatcher::{Activation, Column, DispatchError, Logger, TableSink, Value};
use tracing::instrument;

use crate::support::{close_table, open_sink, open_table};

pub const FILE_PATH: &str = "genome/subset.txt";
pub const TABLE: &str = "GenomeSubset";

#[derive(Default)]
pub struct GenomeSubsetLog {
    sink: Option<TableSink>,
    gene_indexes: Vec<usize>,
    row: Vec<Value<'static>>,
}

impl GenomeSubsetLog {
    const HANDLES: EventKinds = EventKinds::of(&[EventKind::AgentBirth]);

    pub fn new() -> Self {
        Self::default()
    }

    /// Selected indexes, in output order
    pub fn gene_indexes(&self) -> &[usize] {
        &self.gene_indexes
    }
}

impl Logger for GenomeSubsetLog {
    fn name(&self) -> &'static str {
        "GenomeSubsetLog"
    }

    fn handles(&self) -> EventKinds {
        Self::HANDLES
    }

    #[instrument(name = "genome_subset_log_init", skip_all)]
    fn init(&mut self, sim: &SimContext, config: &LogsConfig) -> Result<Activation, DispatchError> {
        let Some(section) = config.genome_subset.as_ref().filter(|s| s.enabled) else {
            return Ok(Activation::Disabled);
        };
        if section.gene_indexes.is_empty() {
            return Err(DispatchError::init(self.name(), "geneIndexes is empty"));
        }
        if let Some(&index) = section.gene_indexes.iter().find(|&&i| i >= sim.genome_len) {
            return Err(DispatchError::init(
                self.name(),
                format!("gene index {index} out of range for genome length {}", sim.genome_len),
            ));
        }

        let columns = section
            .gene_indexes
            .iter()
            .map(|i| Column::int(format!("Gene{i}")))
            .collect();
        self.sink = Some(open_table(sim, FILE_PATH, TABLE, columns)?);
        self.gene_indexes = section.gene_indexes.clone();
        Ok(Activation::Enabled)
    }

    fn handle(&mut self, event: &Event<'_>) -> Result<(), DispatchError> {
        let Event::AgentBirth(e) = event else {
            return Err(DispatchError::unexpected_kind(self.name(), event.kind()));
        };

        self.row.clear();
        for &index in &self.gene_indexes {
            let gene = e.genome.get(index).ok_or_else(|| {
                DispatchError::schema(
                    TABLE,
                    format!(
                        "agent {} genome has {} genes, index {index} requested",
                        e.agent,
                        e.genome.len()
                    ),
                )
            })?;
            self.row.push(Value::Int(i64::from(*gene)));
        }
        open_sink(&mut self.sink, TABLE)?.add_row(&self.row)
    }

    fn close(&mut self) -> Result<(), DispatchError> {
        close_table(&mut self.sink)
    }
}
