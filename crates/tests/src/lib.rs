//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试（序列化名称、配置默认值）
//! - CSV → 对齐 → 输出的 e2e 测试（使用临时目录）

#[cfg(test)]
mod contract_tests {
    use std::collections::HashMap;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        AlignmentConfig, AlignmentStrategy, ConfigVersion, ExtrapolationPolicy, FrameScaling,
        PressureProvenance, SessionBlueprint, SessionConfig, SinkConfig, SinkType,
    };

    #[test]
    fn test_blueprint_toml_round_trip() {
        let mut session = SessionConfig::new("subject7", "inference/subject7/diameter_data.csv");
        session.pressure_path = Some("logs/subject7.csv".into());
        session.total_video_frames = Some(240);

        let blueprint = SessionBlueprint {
            version: ConfigVersion::V1,
            alignment: AlignmentConfig {
                tolerance_seconds: 0.04,
                extrapolation: ExtrapolationPolicy::Omit,
                normalize_origin: false,
                ..Default::default()
            },
            columns: Default::default(),
            sessions: vec![session, SessionConfig::new("subject8", "d8.csv")],
            sinks: vec![SinkConfig {
                name: "csv_out".to_string(),
                sink_type: SinkType::Csv,
                queue_capacity: 4,
                params: HashMap::from([("base_path".to_string(), "./output".to_string())]),
            }],
        };

        let toml = ConfigLoader::to_toml(&blueprint).unwrap();
        let loaded = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();

        assert_eq!(loaded.version, blueprint.version);
        assert_eq!(loaded.alignment, blueprint.alignment);
        assert_eq!(loaded.columns, blueprint.columns);
        assert_eq!(loaded.sessions, blueprint.sessions);
        assert_eq!(loaded.sessions[1].pressure_path, None);
        assert_eq!(loaded.sinks.len(), 1);
        assert_eq!(loaded.sinks[0].sink_type, SinkType::Csv);
        assert_eq!(loaded.sinks[0].queue_capacity, 4);
        assert_eq!(loaded.sinks[0].params, blueprint.sinks[0].params);
    }

    #[test]
    fn test_strategy_wire_names() {
        let names: Vec<String> = [
            AlignmentStrategy::Direct,
            AlignmentStrategy::Interpolated,
            AlignmentStrategy::FallbackScaled,
            AlignmentStrategy::FrameIndex,
            AlignmentStrategy::Embedded,
            AlignmentStrategy::DiameterOnly,
        ]
        .iter()
        .map(|s| {
            let json = serde_json::to_string(s).unwrap();
            assert_eq!(json.trim_matches('"'), s.as_str());
            s.to_string()
        })
        .collect();
        assert_eq!(
            names,
            [
                "direct",
                "interpolated",
                "fallback_scaled",
                "frame_index",
                "embedded",
                "diameter_only"
            ]
        );
    }

    #[test]
    fn test_provenance_wire_names() {
        for p in [
            PressureProvenance::Direct,
            PressureProvenance::Interpolated,
            PressureProvenance::Fallback,
            PressureProvenance::Embedded,
            PressureProvenance::Missing,
        ] {
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{}\"", p.as_str()));
        }
    }

    #[test]
    fn test_alignment_defaults_snapshot() {
        let config = AlignmentConfig::default();
        assert_eq!(config.tolerance_seconds, 0.1);
        assert_eq!(config.direct_coverage_threshold, 0.5);
        assert_eq!(config.extrapolation, ExtrapolationPolicy::Clamp);
        assert!(config.normalize_origin);
        assert_eq!(FrameScaling::default(), FrameScaling::Unchanged);
        assert_eq!(serde_json::to_string(&SinkType::Json).unwrap(), "\"json\"");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        AlignmentInput, AlignmentStrategy, DiameterRecord, ElasticityInput, FrameScaling,
        PressureProvenance, RawPressureRow, SessionOutcome,
    };
    use dispatcher::create_dispatcher;
    use ingestion::{CsvSeriesSource, SessionInputs};
    use observability::CoverageAggregator;
    use sync_engine::{compute_elasticity, AlignmentWorker, SyncEngine};
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    fn write(dir: &Path, name: &str, body: String) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    /// 30 帧，每帧 100ms；压力每 50ms 一个样本，值 1.0 + 0.01·i
    fn write_session(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
        let mut diameter = String::from("frame,diameter_mm\n");
        let mut stamps = String::from("Frame Number,Timestamp\n");
        for k in 0..30 {
            diameter.push_str(&format!("{k},{:.2}\n", 5.0 - 0.05 * k as f64));
            let ms = k * 100;
            stamps.push_str(&format!("{k},12:00:{:02}.{:03}\n", ms / 1000, ms % 1000));
        }
        let mut pressure = String::from("time,value\n");
        for i in 0..70 {
            let ms = i * 50;
            pressure.push_str(&format!(
                "12-00-{:02}-{:03},{}\n",
                ms / 1000,
                ms % 1000,
                1.0 + 0.01 * i as f64
            ));
        }
        (
            write(dir, "diameter_data.csv", diameter),
            write(dir, "subject1.csv", pressure),
            write(dir, "timestamps.csv", stamps),
        )
    }

    fn blueprint_toml(dir: &Path, out: &Path) -> String {
        format!(
            r#"
[alignment]
tolerance_seconds = 0.04

[[sessions]]
id = "subject1"
diameter_path = "{}"
pressure_path = "{}"
timestamps_path = "{}"
total_video_frames = 30

[[sinks]]
name = "csv_out"
sink_type = "csv"
params = {{ base_path = "{}" }}

[[sinks]]
name = "json_out"
sink_type = "json"
params = {{ base_path = "{}" }}

[[sinks]]
name = "log_out"
sink_type = "log"
"#,
            dir.join("diameter_data.csv").display(),
            dir.join("subject1.csv").display(),
            dir.join("timestamps.csv").display(),
            out.display(),
            out.display(),
        )
    }

    /// Config → CSV 读取 → 对齐 → csv/json/log 输出
    #[tokio::test]
    async fn test_e2e_csv_pipeline() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        write_session(dir.path());

        let blueprint =
            ConfigLoader::load_from_str(&blueprint_toml(dir.path(), &out), ConfigFormat::Toml)
                .unwrap();
        let session = blueprint.session("subject1").unwrap();
        let source = CsvSeriesSource::from_session(session, &blueprint.columns);
        let loaded = SessionInputs::load(&source, session.total_video_frames).unwrap();
        assert_eq!(loaded.report.total_skipped(), 0);

        let outcome = SyncEngine::run(blueprint.alignment.clone(), loaded.input).unwrap();
        assert_eq!(outcome.coverage.strategy, AlignmentStrategy::Direct);
        assert_eq!(outcome.coverage.frame_scaling, FrameScaling::Unchanged);
        assert_eq!(outcome.coverage.matched_directly, 30);
        assert!(!outcome.coverage.is_degraded());
        for record in &outcome.records {
            assert_eq!(record.provenance, PressureProvenance::Direct);
            let expected = 1.0 + 0.02 * record.frame_index as f64;
            assert!((record.pressure.unwrap() - expected).abs() < 1e-9);
            assert_eq!(record.video_frame, Some(record.frame_index));
        }

        let mut aggregator = CoverageAggregator::new();
        aggregator.update(&outcome.coverage);
        assert_eq!(aggregator.summary().matched_records, 30);

        let (tx, rx) = mpsc::channel(4);
        let dispatcher = create_dispatcher(blueprint.sinks.clone(), rx).await.unwrap();
        let handle = dispatcher.spawn();
        tx.send(SessionOutcome {
            session_id: "subject1".into(),
            outcome,
        })
        .await
        .unwrap();
        drop(tx);

        let metrics = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("dispatcher timed out")
            .unwrap();
        assert_eq!(metrics.len(), 3);
        for (name, snapshot) in &metrics {
            assert_eq!(snapshot.write_count, 1, "sink {name}");
            assert_eq!(snapshot.record_count, 30, "sink {name}");
        }

        let synced = fs::read_to_string(out.join("subject1_synced.csv")).unwrap();
        assert!(synced.lines().next().unwrap().contains("provenance"));
        assert_eq!(synced.lines().count(), 31);
        let coverage = fs::read_to_string(out.join("subject1_coverage.csv")).unwrap();
        assert!(coverage.contains("strategy,direct"));

        let doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("subject1.json")).unwrap()).unwrap();
        assert_eq!(doc["session_id"], "subject1");
        assert_eq!(doc["records"].as_array().unwrap().len(), 30);
    }

    /// 压力日志时间戳全部无法解析 → 按帧位置映射
    #[tokio::test]
    async fn test_unparsable_pressure_clock_maps_by_position() {
        let dir = TempDir::new().unwrap();
        let diameter = write(
            dir.path(),
            "d.csv",
            (0..5).fold(String::from("Frame,Diameter\n"), |mut s, k| {
                s.push_str(&format!("{k},4.0\n"));
                s
            }),
        );
        let pressure = write(
            dir.path(),
            "p.csv",
            "ts,value\nnoon,1.0\nlater,2.0\nlast,3.0\n".to_string(),
        );
        let source = CsvSeriesSource::new("s1", diameter).with_pressure(pressure);
        let loaded = SessionInputs::load(&source, None).unwrap();

        let worker = AlignmentWorker::new(Default::default());
        let outcome = worker.submit(loaded.input).wait().await.unwrap().unwrap();

        assert_eq!(outcome.coverage.strategy, AlignmentStrategy::FrameIndex);
        assert_eq!(outcome.coverage.malformed_pressure_rows, 3);
        assert_eq!(outcome.coverage.matched_by_fallback, 5);
        assert_eq!(outcome.records[0].pressure, Some(1.0));
        assert_eq!(outcome.records[2].pressure, Some(2.0));
        assert_eq!(outcome.records[4].pressure, Some(3.0));
        assert!(outcome.overlap.is_none());
    }

    #[test]
    fn test_missing_pressure_file_yields_diameter_only() {
        let dir = TempDir::new().unwrap();
        let diameter = write(dir.path(), "d.csv", "diameter\n4.0\n4.1\n4.2\n".to_string());
        let source = CsvSeriesSource::new("s2", diameter).with_pressure(dir.path().join("gone.csv"));
        let loaded = SessionInputs::load(&source, Some(3)).unwrap();

        let outcome = SyncEngine::run(Default::default(), loaded.input).unwrap();
        assert_eq!(outcome.coverage.strategy, AlignmentStrategy::DiameterOnly);
        assert!(outcome.coverage.pressure_missing);
        assert_eq!(outcome.coverage.unmatched, 3);
        assert!(outcome.records.iter().all(|r| r.pressure.is_none()));
    }

    #[test]
    fn test_logger_counter_frames_shift_into_video() {
        let rows: Vec<DiameterRecord> = (1000..1100).map(|f| DiameterRecord::new(f, 4.0)).collect();
        let input = AlignmentInput::new(rows).with_total_video_frames(100);
        let outcome = SyncEngine::run(Default::default(), input).unwrap();

        assert_eq!(outcome.coverage.frame_scaling, FrameScaling::Offset { offset: 1000 });
        assert_eq!(outcome.record_at_video_frame(0).unwrap().frame_index, 1000);
        assert_eq!(outcome.record_at_video_frame(99).unwrap().frame_index, 1099);
        assert_eq!(outcome.coverage.frames_out_of_video_range, 0);
    }

    #[test]
    fn test_elasticity_from_aligned_session() {
        let dir = TempDir::new().unwrap();
        let (diameter, pressure, stamps) = write_session(dir.path());
        let source = CsvSeriesSource::new("subject1", diameter)
            .with_pressure(pressure)
            .with_timestamps(stamps);
        let loaded = SessionInputs::load(&source, Some(30)).unwrap();
        let outcome = SyncEngine::run(Default::default(), loaded.input).unwrap();

        let input = ElasticityInput::from_outcome(&outcome, 0, 20, 1.0).unwrap();
        assert!((input.baseline.diameter_mm - 5.0).abs() < 1e-9);
        assert!((input.compressed.diameter_mm - 4.0).abs() < 1e-9);

        let metrics = compute_elasticity(&input).unwrap();
        assert!((metrics.strain + 0.2).abs() < 1e-9);
        assert!(metrics.delta_pressure_pa > 0.0);
        assert!(metrics.pem_mmhg.is_some());
        assert!(metrics.beta.is_some());

        assert!(ElasticityInput::from_outcome(&outcome, 0, 500, 1.0).is_err());
    }

    #[test]
    fn test_embedded_pressure_wins_over_log() {
        let rows = vec![
            DiameterRecord::new(0, 4.0).with_embedded_pressure(2.0),
            DiameterRecord::new(1, 4.1),
            DiameterRecord::new(2, 4.2).with_embedded_pressure(4.0),
        ];
        let input = AlignmentInput::new(rows)
            .with_pressure(vec![RawPressureRow::new("00-00-00-000", 9.0)]);
        let outcome = SyncEngine::run(Default::default(), input).unwrap();

        assert_eq!(outcome.coverage.strategy, AlignmentStrategy::Embedded);
        assert_eq!(outcome.records[0].provenance, PressureProvenance::Embedded);
        assert_eq!(outcome.records[1].provenance, PressureProvenance::Fallback);
        assert_eq!(outcome.records[1].pressure, Some(3.0));
    }
}
