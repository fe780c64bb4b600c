//! `replay` command implementation.

use std::fs::File;
use std::io::BufReader;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{LogsConfig, SimContext};
use dispatcher::{DispatchError, LoggerState};
use loggers::Logs;
use observability::{
    record_dispatch_summary, record_logger_enabled, record_step_events, MetricsSummary,
    RunMetricsAggregator,
};
use tracing::{info, warn};

use crate::cli::ReplayArgs;
use crate::error::CliError;
use crate::script::{parse_script, ReplayError, Replayer, ScriptEvent};

/// Execute the `replay` command
pub fn run_replay(args: &ReplayArgs) -> Result<()> {
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }
    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.metrics_port != 0 {
        observability::install_prometheus(args.metrics_port)?;
    }

    let label = args.events.display().to_string();
    let file = File::open(&args.events).with_context(|| format!("Failed to open {label}"))?;
    let script = parse_script(&label, BufReader::new(file))?;
    info!(events = script.len(), script = %label, "Event script loaded");

    let sim = SimContext::new(&args.run_dir, args.genome_len, args.energy_types);
    let summary = replay(&sim, &config, &label, &script, args.fail_fast)?;
    print!("{summary}");
    println!("Artifacts written to {}", args.run_dir.display());
    Ok(())
}

/// Drive `Logs` through a parsed script and close it
fn replay(
    sim: &SimContext,
    config: &LogsConfig,
    label: &str,
    script: &[(usize, ScriptEvent)],
    fail_fast: bool,
) -> Result<MetricsSummary> {
    let mut logs = Logs::new(sim, config).context("Failed to start loggers")?;
    for (_, name, state) in logs.dispatcher().installed() {
        record_logger_enabled(name, state == LoggerState::Enabled);
    }

    let started = Instant::now();
    let mut replayer = Replayer::new();
    let mut aggregator = RunMetricsAggregator::new();
    let mut last = logs.dispatcher().metrics();
    let mut failures = 0u64;

    for (line, event) in script {
        match replayer.play(label, *line, event, |e| logs.post_event(e)) {
            Ok(Some(events)) => {
                aggregator.end_step(events);
                record_step_events(events);
            }
            Ok(None) => {}
            Err(ReplayError::Script(e)) => return Err(e.into()),
            Err(ReplayError::Post(e)) => {
                failures += 1;
                if fail_fast {
                    return Err(post_failed(label, *line, e));
                }
                warn!(line, error = %e, "Logger failed, continuing");
            }
        }

        let current = logs.dispatcher().metrics();
        record_dispatch_summary(&last, &current);
        last = current;
    }

    aggregator.update(last);
    logs.close().context("Failed to close loggers")?;
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        failures,
        population = replayer.population(),
        "Replay finished"
    );
    Ok(aggregator.summary())
}

fn post_failed(label: &str, line: usize, e: DispatchError) -> anyhow::Error {
    anyhow::Error::new(e).context(format!("{label}:{line}: logger failed"))
}
