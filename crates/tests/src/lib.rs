//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置文档 → Logs → 产物 的端到端场景
//! - 分发属性 (过滤、顺序、禁用)
//! - 产物格式回读 (表格 / 压缩 record 文件)

#[cfg(test)]
mod support {
    use std::path::Path;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        AgentBirth, AgentDeath, BirthKind, DeathCause, Event, LogsConfig, Position, SimContext,
    };
    use loggers::Logs;

    pub fn config(toml: &str) -> LogsConfig {
        ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap()
    }

    pub fn start(dir: &Path, genome_len: usize, toml: &str) -> Logs {
        let sim = SimContext::new(dir, genome_len, 2);
        Logs::new(&sim, &config(toml)).unwrap()
    }

    pub fn birth(timestep: u64, agent: u64, genome: &[u8]) -> Event<'_> {
        Event::AgentBirth(AgentBirth {
            timestep,
            agent,
            kind: BirthKind::Create,
            parents: None,
            position: Position::new(1.0, 0.0, 2.0),
            genome,
        })
    }

    pub fn death(timestep: u64, agent: u64, cause: DeathCause) -> Event<'static> {
        Event::AgentDeath(AgentDeath {
            timestep,
            agent,
            cause,
            birth_timestep: 0,
            birth_kind: BirthKind::Create,
        })
    }

    /// Every file below `dir`, relative, sorted
    pub fn artifacts(dir: &Path) -> Vec<String> {
        fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
            for entry in std::fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    walk(root, &path, out);
                } else {
                    let rel = path.strip_prefix(root).unwrap();
                    out.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        let mut out = Vec::new();
        walk(dir, dir, &mut out);
        out.sort();
        out
    }
}

#[cfg(test)]
mod scenario_tests {
    use contracts::{
        AgentContactBegin, DeathCause, Energy, EnergyAction, Event, StepEnd,
    };
    use dispatcher::sinks::read_tables;
    use dispatcher::Value;
    use tempfile::tempdir;

    use crate::support::{artifacts, birth, death, start};

    /// Scenario A: BirthsDeathsLog alone writes two ordered lines
    #[test]
    fn test_births_deaths_only() {
        let dir = tempdir().unwrap();
        let mut logs = start(dir.path(), 4, "[BirthsDeathsLog]\n");

        logs.post_event(&birth(3, 7, &[1, 2, 3, 4])).unwrap();
        logs.post_event(&death(50, 7, DeathCause::Starved)).unwrap();
        logs.close().unwrap();

        let content = std::fs::read_to_string(dir.path().join("BirthsDeaths.log")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, ["3 CREATION 7", "50 DEATH 7 STARVED"]);
        assert_eq!(artifacts(dir.path()), ["BirthsDeaths.log"]);
    }

    /// Scenario B: subset row follows configured order, genome length is irrelevant
    #[test]
    fn test_genome_subset_order() {
        let dir = tempdir().unwrap();
        let mut logs = start(dir.path(), 20, "[GenomeSubsetLog]\ngeneIndexes = [0, 2, 5]\n");

        let genome: Vec<u8> = (100..120).collect();
        logs.post_event(&birth(1, 9, &genome)).unwrap();
        logs.close().unwrap();

        let table = &read_tables(&dir.path().join("genome/subset.txt")).unwrap()[0];
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].len(), 3);
        assert_eq!(
            table.rows[0],
            [Value::Int(100), Value::Int(102), Value::Int(105)]
        );
    }

    /// Scenario C: identical energy events are never merged
    #[test]
    fn test_energy_not_deduplicated() {
        let dir = tempdir().unwrap();
        let mut logs = start(dir.path(), 4, "[EnergyLog]\n");

        let deltas = [0.5f32, 0.25];
        let event = Event::Energy(Energy {
            timestep: 12,
            agent: 3,
            other: 4,
            action: EnergyAction::Give,
            neural_activation: 1.0,
            energy: &deltas,
        });
        logs.post_event(&event).unwrap();
        logs.post_event(&event).unwrap();
        logs.close().unwrap();

        let table = &read_tables(&dir.path().join("events/energy.txt")).unwrap()[0];
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], table.rows[1]);
    }

    /// Scenario D: contact pairs are flushed at step end only
    #[test]
    fn test_separation_contact_only() {
        let dir = tempdir().unwrap();
        let mut logs = start(dir.path(), 2, "[SeparationLog]\nmode = \"ContactOnly\"\n");

        let step_end = |timestep| {
            Event::StepEnd(StepEnd {
                timestep,
                population: &[],
            })
        };
        logs.post_event(&birth(1, 1, &[0, 0])).unwrap();
        logs.post_event(&birth(1, 2, &[0, 255])).unwrap();
        logs.post_event(&step_end(1)).unwrap();
        logs.post_event(&Event::AgentContactBegin(AgentContactBegin {
            timestep: 2,
            a: 1,
            b: 2,
        }))
        .unwrap();
        logs.post_event(&step_end(2)).unwrap();
        logs.close().unwrap();

        let table = &read_tables(&dir.path().join("genome/separations.txt")).unwrap()[0];
        assert_eq!(table.rows.len(), 1);
        let row = &table.rows[0];
        assert_eq!(
            (row[0].as_int(), row[1].as_int(), row[2].as_int()),
            (Some(2), Some(1), Some(2))
        );
        assert_eq!(row[3].as_float(), Some(0.5));
    }
}

#[cfg(test)]
mod dispatch_tests {
    use contracts::{Carry, CarryAction, Collision, EventKind, EventKinds, ObjectType};
    use contracts::Event;
    use dispatcher::LoggerState;
    use tempfile::tempdir;

    use crate::support::{birth, start};

    const SEVERAL: &str = r#"
[PositionLog]
[BirthsDeathsLog]
[GenomeLog]
[CarryLog]
enabled = false
"#;

    #[test]
    fn test_aggregate_mask_is_union_of_enabled() {
        let dir = tempdir().unwrap();
        let logs = start(dir.path(), 4, SEVERAL);
        let d = logs.dispatcher();

        let expected = EventKinds::of(&[
            EventKind::AgentBirth,
            EventKind::AgentBodyUpdated,
            EventKind::AgentDeath,
        ]);
        assert_eq!(d.registered_kinds(), expected);
        assert!(d.subscribers(EventKind::Carry).is_empty());

        let carry = d
            .installed()
            .find(|(_, name, _)| *name == "CarryLog")
            .map(|(_, _, state)| state);
        assert_eq!(carry, Some(LoggerState::Disabled));
        logs.close().unwrap();
    }

    #[test]
    fn test_unwanted_kinds_skip_lookup() {
        let dir = tempdir().unwrap();
        let mut logs = start(dir.path(), 4, SEVERAL);

        for i in 0..1000 {
            logs.post_event(&Event::Collision(Collision {
                timestep: i,
                agent: 1,
                object_type: ObjectType::Food,
            }))
            .unwrap();
            logs.post_event(&Event::Carry(Carry {
                timestep: i,
                agent: 1,
                action: CarryAction::Pickup,
                object_type: ObjectType::Food,
                object_number: 3,
            }))
            .unwrap();
        }
        let metrics = logs.dispatcher().metrics();
        assert_eq!(metrics.posted_count, 2000);
        assert_eq!(metrics.filtered_count, 2000);
        assert_eq!(metrics.lookup_count, 0);
        assert_eq!(metrics.delivered_count, 0);
        assert!(!dir.path().join("events/carry.txt").exists());
        logs.close().unwrap();
    }

    #[test]
    fn test_birth_fans_out_in_installation_order() {
        let dir = tempdir().unwrap();
        let mut logs = start(dir.path(), 4, SEVERAL);
        let d = logs.dispatcher();
        let order: Vec<&str> = d
            .subscribers(EventKind::AgentBirth)
            .iter()
            .filter_map(|&id| d.logger_name(id))
            .collect();
        assert_eq!(order, ["PositionLog", "BirthsDeathsLog", "GenomeLog"]);

        logs.post_event(&birth(0, 5, &[1, 2, 3, 4])).unwrap();
        let metrics = logs.dispatcher().metrics();
        assert_eq!(metrics.lookup_count, 1);
        assert_eq!(metrics.delivered_count, 3);
        logs.close().unwrap();
    }
}

#[cfg(test)]
mod artifact_tests {
    use contracts::{
        AgentBodyUpdated, AgentContactEnd, ContactInfo, ContactOutcome, DeathCause, Event,
        Position,
    };
    use dispatcher::sinks::read_tables;
    use dispatcher::{DispatchError, RecordFile};
    use loggers::Logs;
    use tempfile::tempdir;

    use crate::support::{artifacts, birth, config, death, start};

    #[test]
    fn test_gzip_genome_and_position_trace() {
        let dir = tempdir().unwrap();
        let mut logs = start(
            dir.path(),
            3,
            "recordFileType = \"gzip\"\n[GenomeLog]\n[PositionLog]\n[LifeSpanLog]\n",
        );

        logs.post_event(&birth(0, 4, &[7, 8, 9])).unwrap();
        logs.post_event(&Event::AgentBodyUpdated(AgentBodyUpdated {
            timestep: 1,
            agent: 4,
            position: Position::new(2.0, 0.0, 3.0),
        }))
        .unwrap();
        logs.post_event(&death(2, 4, DeathCause::Eaten)).unwrap();
        logs.close().unwrap();

        assert_eq!(
            artifacts(dir.path()),
            [
                "genome/agents/genome_4.txt.gz",
                "lifespans.txt",
                "motion/position/agents/position_4.txt",
            ]
        );

        let genome =
            RecordFile::read_to_string(dir.path().join("genome/agents/genome_4.txt.gz")).unwrap();
        assert_eq!(genome, "7\n8\n9\n");

        let positions =
            &read_tables(&dir.path().join("motion/position/agents/position_4.txt")).unwrap()[0];
        assert_eq!(positions.rows.len(), 2);
        let lifespans = &read_tables(&dir.path().join("lifespans.txt")).unwrap()[0];
        assert_eq!(lifespans.rows[0][4].as_str(), Some("EATEN"));
    }

    #[test]
    fn test_contact_events_column() {
        let dir = tempdir().unwrap();
        let mut logs = start(dir.path(), 3, "[ContactLog]\n");
        logs.post_event(&Event::AgentContactEnd(AgentContactEnd {
            timestep: 8,
            a: ContactInfo {
                agent: 1,
                collided: true,
                mate: ContactOutcome::Prevented('E'),
                ..Default::default()
            },
            b: ContactInfo {
                agent: 2,
                collided: true,
                give: ContactOutcome::Succeeded,
                ..Default::default()
            },
        }))
        .unwrap();
        logs.close().unwrap();

        let table = &read_tables(&dir.path().join("events/contacts.txt")).unwrap()[0];
        assert_eq!(table.rows[0][3].as_str(), Some("1CmE2CG"));
    }

    #[test]
    fn test_subset_index_beyond_genome_aborts_startup() {
        let dir = tempdir().unwrap();
        let sim = contracts::SimContext::new(dir.path(), 4, 1);
        let result = Logs::new(&sim, &config("[GenomeSubsetLog]\ngeneIndexes = [1, 9]\n"));
        assert!(matches!(result, Err(DispatchError::Init { .. })));
    }

    #[test]
    fn test_unwritable_run_dir_aborts_startup() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();
        let sim = contracts::SimContext::new(&blocker, 4, 1);
        let result = Logs::new(&sim, &config("[CarryLog]\n"));
        assert!(matches!(result, Err(DispatchError::SinkOpen { .. })));
    }

    #[test]
    fn test_truncated_table_is_hard_error() {
        let dir = tempdir().unwrap();
        let mut logs = start(dir.path(), 3, "[CollisionLog]\n");
        logs.post_event(&Event::Collision(contracts::Collision {
            timestep: 1,
            agent: 1,
            object_type: contracts::ObjectType::Barrier,
        }))
        .unwrap();
        logs.close().unwrap();

        let path = dir.path().join("events/collision.txt");
        let content = std::fs::read_to_string(&path).unwrap();
        let cut = content.rfind("%end").unwrap();
        std::fs::write(&path, &content[..cut]).unwrap();
        assert!(read_tables(&path).is_err());
    }
}
