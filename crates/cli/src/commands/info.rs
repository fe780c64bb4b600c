//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{EventKinds, LogsConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Per-logger section summary
#[derive(Serialize)]
pub(crate) struct SectionInfo {
    pub name: &'static str,
    pub configured: bool,
    pub enabled: bool,
    pub kinds: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    record_file_type: String,
    loggers: Vec<SectionInfo>,
    registered_kinds: String,
}

/// One entry per logger, in installation order
pub(crate) fn sections(config: &LogsConfig) -> Vec<SectionInfo> {
    loggers::default_loggers()
        .iter()
        .map(|logger| {
            let name = logger.name();
            let (configured, enabled, options) = match name {
                "ComplexityLog" => match &config.complexity {
                    Some(s) => (
                        true,
                        s.enabled,
                        Some(format!(
                            "frequency={} maxOutputFiles={}",
                            s.frequency, s.max_output_files
                        )),
                    ),
                    None => (false, false, None),
                },
                "GenomeSubsetLog" => match &config.genome_subset {
                    Some(s) => (true, s.enabled, Some(format!("geneIndexes={:?}", s.gene_indexes))),
                    None => (false, false, None),
                },
                "SeparationLog" => match &config.separation {
                    Some(s) => (true, s.enabled, Some(format!("mode={:?}", s.mode))),
                    None => (false, false, None),
                },
                _ => {
                    let section = match name {
                        "PositionLog" => &config.position,
                        "BirthsDeathsLog" => &config.births_deaths,
                        "CarryLog" => &config.carry,
                        "CollisionLog" => &config.collision,
                        "ContactLog" => &config.contact,
                        "EnergyLog" => &config.energy,
                        "GenomeLog" => &config.genome,
                        _ => &config.lifespan,
                    };
                    (section.is_some(), section.as_ref().is_some_and(|s| s.enabled), None)
                }
            };
            SectionInfo {
                name,
                configured,
                enabled,
                kinds: logger.handles().to_string(),
                options,
            }
        })
        .collect()
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let loggers = sections(&config);
    let registered = loggers::default_loggers()
        .iter()
        .zip(&loggers)
        .filter(|(_, s)| s.enabled)
        .fold(EventKinds::NONE, |mask, (l, _)| mask | l.handles());

    if args.json {
        let info = ConfigInfo {
            record_file_type: format!("{:?}", config.record_file_type),
            loggers,
            registered_kinds: registered.to_string(),
        };
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, &loggers, registered);
    }

    Ok(())
}

fn print_config_info(config: &LogsConfig, loggers: &[SectionInfo], registered: EventKinds) {
    println!("📁 Record files: {:?}", config.record_file_type);
    println!("\n📝 Loggers ({} enabled)", loggers.iter().filter(|s| s.enabled).count());
    for (i, section) in loggers.iter().enumerate() {
        let prefix = if i == loggers.len() - 1 { "└─" } else { "├─" };
        let mark = if section.enabled { "✓" } else { "·" };
        print!("   {} {} {} [{}]", prefix, mark, section.name, section.kinds);
        match &section.options {
            Some(options) => println!(" {}", options),
            None => println!(),
        }
    }
    println!("\n⚙️  Registered kinds: {}", registered);
    println!();
}
