//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 端到端复制链路测试（producer -> deliver -> capture）
//! - 取消与关闭行为

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::DeliverMode;
    use deliver::DeliverConfig;

    /// Loaded plan flows into the runtime deliver configuration
    #[test]
    fn test_plan_to_deliver_config() {
        let plan = ConfigLoader::load_from_str(
            r#"
[target]
addr = "127.0.0.1:9000"
long_lived = false

[delivery]
concurrency = 6
clone = 2
queue_capacity = 32
"#,
            ConfigFormat::Toml,
        )
        .unwrap();

        let config = DeliverConfig::from_plan(&plan);
        assert_eq!(config.remote_addr, "127.0.0.1:9000");
        assert!(!config.long_lived);
        assert_eq!(config.concurrency, 6);
        assert_eq!(config.clone, 2);
        assert_eq!(config.queue_capacity, 32);
        assert_eq!(config.mode, DeliverMode::Request);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{DeliverMode, Payload, ProtocolKind};
    use deliver::{Deliver, DeliverConfig};
    use producer::{
        encoder, CaptureConfig, CaptureSource, PayloadSource, ProducerMetrics, SyntheticConfig,
        SyntheticSource,
    };
    use tokio::time::{sleep, timeout};
    use tokio_util::sync::CancellationToken;

    fn fallback_config(dir: &Path, concurrency: usize, clone: usize) -> DeliverConfig {
        DeliverConfig {
            // Hostname target: every client selects the capture fallback
            remote_addr: "replay-target:9999".to_string(),
            long_lived: true,
            concurrency,
            clone,
            queue_capacity: 64,
            mode: DeliverMode::Request,
            fallback_dir: dir.to_path_buf(),
        }
    }

    /// Total bytes captured across all per-client files
    fn captured_bytes(dir: &Path) -> u64 {
        std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .filter_map(|entry| entry.metadata().ok())
                    .map(|meta| meta.len())
                    .sum()
            })
            .unwrap_or(0)
    }

    async fn wait_for_bytes(dir: &Path, expected: u64) {
        for _ in 0..300 {
            if captured_bytes(dir) >= expected {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "expected {} captured bytes, saw {}",
            expected,
            captured_bytes(dir)
        );
    }

    /// End-to-end: SyntheticSource -> Deliver -> capture files
    ///
    /// 验证完整的数据流：
    /// 1. SyntheticSource 生成定长帧
    /// 2. Deliver 按 clone+1 复制并随机路由
    /// 3. 回退 sender 将每份拷贝追加到本地 capture 文件
    #[tokio::test]
    async fn test_e2e_synthetic_to_capture() {
        let dir = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();

        let deliver =
            Deliver::new(token.clone(), fallback_config(dir.path(), 2, 1)).unwrap();
        let ingress = deliver.ingress();
        let stat = deliver.stat();
        let run = tokio::spawn(deliver.run());

        let source = SyntheticSource::new(SyntheticConfig {
            rate_hz: 0.0,
            payload_size: 64,
            protocol: ProtocolKind::Binary,
            max_payloads: Some(20),
            ..Default::default()
        });
        let metrics = Arc::new(ProducerMetrics::new());
        source.start(ingress, metrics.clone());

        // 20 payloads, clone=1: 40 copies of 68 framed bytes each
        let expected = 40 * (4 + 64);
        wait_for_bytes(dir.path(), expected).await;

        token.cancel();
        let report = timeout(Duration::from_secs(2), run)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        assert_eq!(report.pool_size, 2);
        assert_eq!(report.stat.total_requests, 40);
        assert_eq!(stat.total(), 40);
        assert_eq!(metrics.snapshot().payloads_produced, 20);
        assert_eq!(captured_bytes(dir.path()), expected);

        // The reporting path sees the same totals
        let mut aggregator = observability::ThroughputAggregator::new();
        aggregator.update(&report.stat);
        assert_eq!(aggregator.summary().total_requests, 40);
    }

    /// Capture round-trip: record with the encoder, replay byte-for-byte
    #[tokio::test]
    async fn test_e2e_capture_replay_round_trip() {
        use std::io::Write;

        let bodies: [&[u8]; 3] = [b"GET /a", b"GET /b", b"GET /c"];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for body in bodies {
            file.write_all(&encoder::frame(ProtocolKind::Compact, body))
                .unwrap();
        }
        file.flush().unwrap();

        let mut config = CaptureConfig::new(file.path());
        config.protocol = ProtocolKind::Compact;
        let source = CaptureSource::new(config);

        let (tx, mut rx) = tokio::sync::mpsc::channel::<Payload>(10);
        source.start(tx, Arc::new(ProducerMetrics::new()));

        for body in bodies {
            let payload = rx.recv().await.unwrap();
            assert_eq!(payload.data, encoder::frame(ProtocolKind::Compact, body));
        }
        assert!(rx.recv().await.is_none());
    }

    /// Cancellation stops a parked session promptly
    #[tokio::test]
    async fn test_e2e_cancellation_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();

        let deliver =
            Deliver::new(token.clone(), fallback_config(dir.path(), 3, 0)).unwrap();
        let _ingress = deliver.ingress();
        let run = tokio::spawn(deliver.run());

        sleep(Duration::from_millis(100)).await;
        token.cancel();

        let report = timeout(Duration::from_secs(2), run)
            .await
            .expect("deliver did not stop after cancellation")
            .unwrap()
            .unwrap();
        assert_eq!(report.pool_size, 3);
        assert_eq!(report.stat.total_requests, 0);
    }

    /// Raw mode: pool built by the driver, sends go through random_sender
    #[tokio::test]
    async fn test_e2e_raw_mode_driver() {
        let dir = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();

        let mut config = fallback_config(dir.path(), 2, 0);
        config.mode = DeliverMode::Raw;

        let mut deliver = Deliver::new(token.clone(), config).unwrap();

        // No pool yet: random access fails explicitly
        assert!(deliver.random_sender().is_err());

        deliver.build_pool().await;
        assert_eq!(deliver.pool_size(), 2);

        let sender = deliver.random_sender().unwrap();
        let run = tokio::spawn(deliver.run());

        let framed = encoder::frame(ProtocolKind::Binary, b"raw-payload");
        sender.send(Payload::new(1, framed.clone())).await.unwrap();

        wait_for_bytes(dir.path(), framed.len() as u64).await;

        token.cancel();
        let report = timeout(Duration::from_secs(2), run)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(report.pool_size, 2);
    }
}
