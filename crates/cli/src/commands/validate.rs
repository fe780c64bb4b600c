//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{LogsConfig, SeparationMode};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    record_file_type: String,
    sections: usize,
    enabled: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            let sections = super::info::sections(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    record_file_type: format!("{:?}", config.record_file_type),
                    sections: sections.iter().filter(|s| s.configured).count(),
                    enabled: sections.iter().filter(|s| s.enabled).count(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &LogsConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    let sections = super::info::sections(config);
    if sections.iter().all(|s| !s.enabled) {
        warnings.push("No logger enabled - events will be dropped".to_string());
    }
    for section in sections.iter().filter(|s| s.configured && !s.enabled) {
        warnings.push(format!("{} is configured but disabled", section.name));
    }

    if let Some(separation) = &config.separation {
        if separation.enabled && separation.mode == SeparationMode::AllPairs {
            warnings.push(
                "SeparationLog.mode = AllPairs writes one row per newborn and living agent"
                    .to_string(),
            );
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Record files: {}", summary.record_file_type);
            println!("  Sections: {}", summary.sections);
            println!("  Enabled loggers: {}", summary.enabled);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SectionConfig, SeparationLogConfig};

    #[test]
    fn test_warnings() {
        assert_eq!(
            collect_warnings(&LogsConfig::default()),
            vec!["No logger enabled - events will be dropped".to_string()]
        );

        let config = LogsConfig {
            carry: Some(SectionConfig { enabled: false }),
            separation: Some(SeparationLogConfig {
                enabled: true,
                mode: SeparationMode::AllPairs,
            }),
            ..Default::default()
        };
        let warnings = collect_warnings(&config);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("CarryLog"));
    }
}
