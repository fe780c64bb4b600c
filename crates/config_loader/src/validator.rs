//! 配置校验模块
//!
//! 校验规则：
//! - ComplexityLog.frequency > 0
//! - ComplexityLog.maxOutputFiles > 0
//! - GenomeSubsetLog.geneIndexes 非空且不重复

use std::collections::HashSet;

use contracts::{ContractError, LogsConfig};

/// 校验 LogsConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &LogsConfig) -> Result<(), ContractError> {
    validate_complexity(config)?;
    validate_genome_subset(config)?;
    Ok(())
}

/// 校验采样频率与轮转文件数
fn validate_complexity(config: &LogsConfig) -> Result<(), ContractError> {
    let Some(complexity) = &config.complexity else {
        return Ok(());
    };

    if complexity.frequency == 0 {
        return Err(ContractError::config_validation(
            "ComplexityLog.frequency",
            "frequency must be > 0",
        ));
    }

    if complexity.max_output_files == 0 {
        return Err(ContractError::config_validation(
            "ComplexityLog.maxOutputFiles",
            "maxOutputFiles must be > 0",
        ));
    }

    Ok(())
}

/// 校验基因下标列表
fn validate_genome_subset(config: &LogsConfig) -> Result<(), ContractError> {
    let Some(subset) = &config.genome_subset else {
        return Ok(());
    };

    if subset.gene_indexes.is_empty() {
        return Err(ContractError::config_validation(
            "GenomeSubsetLog.geneIndexes",
            "geneIndexes cannot be empty",
        ));
    }

    let mut seen = HashSet::new();
    for index in &subset.gene_indexes {
        if !seen.insert(index) {
            return Err(ContractError::config_validation(
                format!("GenomeSubsetLog.geneIndexes[{index}]"),
                "duplicate gene index",
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ComplexityLogConfig, GenomeSubsetLogConfig};

    #[test]
    fn test_empty_config_is_valid() {
        assert!(validate(&LogsConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_frequency_rejected() {
        let config = LogsConfig {
            complexity: Some(ComplexityLogConfig {
                frequency: 0,
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("frequency"));
    }

    #[test]
    fn test_zero_max_output_files_rejected() {
        let config = LogsConfig {
            complexity: Some(ComplexityLogConfig {
                max_output_files: 0,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_duplicate_gene_index_rejected() {
        let config = LogsConfig {
            genome_subset: Some(GenomeSubsetLogConfig {
                enabled: true,
                gene_indexes: vec![3, 1, 3],
            }),
            ..Default::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_empty_gene_indexes_rejected() {
        let config = LogsConfig {
            genome_subset: Some(GenomeSubsetLogConfig {
                enabled: true,
                gene_indexes: vec![],
            }),
            ..Default::default()
        };
        assert!(validate(&config).is_err());
    }
}
