//! LogsConfig - Config Loader output
//!
//! One optional section per logger. An absent section disables that logger.

use serde::{Deserialize, Serialize};

/// Physical encoding of record files, process-wide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFileType {
    #[default]
    Plain,
    Gzip,
}

impl RecordFileType {
    /// File name suffix appended to record paths
    pub fn extension(self) -> &'static str {
        match self {
            RecordFileType::Plain => "",
            RecordFileType::Gzip => ".gz",
        }
    }
}

/// Complete logging configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsConfig {
    #[serde(default)]
    pub record_file_type: RecordFileType,

    #[serde(rename = "ComplexityLog", default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<ComplexityLogConfig>,

    #[serde(rename = "PositionLog", default, skip_serializing_if = "Option::is_none")]
    pub position: Option<SectionConfig>,

    #[serde(rename = "BirthsDeathsLog", default, skip_serializing_if = "Option::is_none")]
    pub births_deaths: Option<SectionConfig>,

    #[serde(rename = "CarryLog", default, skip_serializing_if = "Option::is_none")]
    pub carry: Option<SectionConfig>,

    #[serde(rename = "CollisionLog", default, skip_serializing_if = "Option::is_none")]
    pub collision: Option<SectionConfig>,

    #[serde(rename = "ContactLog", default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<SectionConfig>,

    #[serde(rename = "EnergyLog", default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<SectionConfig>,

    #[serde(rename = "GenomeLog", default, skip_serializing_if = "Option::is_none")]
    pub genome: Option<SectionConfig>,

    #[serde(rename = "GenomeSubsetLog", default, skip_serializing_if = "Option::is_none")]
    pub genome_subset: Option<GenomeSubsetLogConfig>,

    #[serde(rename = "LifeSpanLog", default, skip_serializing_if = "Option::is_none")]
    pub lifespan: Option<SectionConfig>,

    #[serde(rename = "SeparationLog", default, skip_serializing_if = "Option::is_none")]
    pub separation: Option<SeparationLogConfig>,
}

fn default_enabled() -> bool {
    true
}

/// Section for loggers without options of their own
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Sampling interval used when `frequency` is absent
pub const DEFAULT_COMPLEXITY_FREQUENCY: u64 = 1000;

fn default_frequency() -> u64 {
    DEFAULT_COMPLEXITY_FREQUENCY
}

fn default_max_output_files() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityLogConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Sample every `frequency` steps
    #[serde(default = "default_frequency")]
    pub frequency: u64,

    /// Number of per-sample detail files kept on disk
    #[serde(default = "default_max_output_files")]
    pub max_output_files: usize,
}

impl Default for ComplexityLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency: DEFAULT_COMPLEXITY_FREQUENCY,
            max_output_files: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenomeSubsetLogConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Gene indexes to record, in output order
    pub gene_indexes: Vec<usize>,
}

/// Which agent pairs SeparationLog reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeparationMode {
    /// Only pairs that came into contact
    #[default]
    ContactOnly,
    /// Every newborn against every living agent
    AllPairs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeparationLogConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub mode: SeparationMode,
}

impl Default for SeparationLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: SeparationMode::default(),
        }
    }
}
