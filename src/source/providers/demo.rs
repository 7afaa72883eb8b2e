//! Synthetic data source.
//!
//! Emits `"<target>: <LEVEL> line <n>"` at a fixed pace so the UI can be
//! exercised without a backend. Connection failures can be simulated with
//! `[demo] fail_connects` to walk through the retry flow.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use log::{debug, info};

use crate::core::cancel::CancelToken;
use crate::core::config::{
    DEFAULT_CONNECT_DELAY, DEFAULT_LINE_INTERVAL, ResolvedConfig, TargetEntry,
};
use crate::source::provider::{
    ConnectionError, Connected, Credentials, DataSource, FetchError, Target,
};

const LEVELS: [&str; 6] = ["INFO", "DEBUG", "INFO", "WARN", "INFO", "ERR"];

fn default_targets() -> Vec<Target> {
    vec![
        Target::new("billing", "Billing service consumer"),
        Target::new("inventory", "Inventory sync worker"),
        Target::new("search-indexer", "Search index pipeline"),
        Target::new("notifications", "Outbound notification fan-out"),
    ]
}

/// The synthetic line for ordinal `n` of `target`.
pub fn demo_line(target: &str, n: u64) -> String {
    let level = LEVELS[(n as usize) % LEVELS.len()];
    format!("{target}: {level} line {n}")
}

pub struct DemoSource {
    targets: Vec<Target>,
    line_interval: Duration,
    connect_delay: Duration,
    fail_connects: u32,
    attempts: AtomicU32,
}

impl DemoSource {
    pub fn new(targets: Vec<Target>, line_interval: Duration) -> Self {
        Self {
            targets,
            line_interval,
            connect_delay: DEFAULT_CONNECT_DELAY,
            fail_connects: 0,
            attempts: AtomicU32::new(0),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        let targets = if config.demo_targets.is_empty() {
            default_targets()
        } else {
            config.demo_targets.iter().map(target_from_entry).collect()
        };
        Self::new(targets, config.demo_line_interval)
            .with_connect_delay(config.demo_connect_delay)
            .with_failed_connects(config.demo_fail_connects)
    }

    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    /// Fail the first `count` connection attempts.
    pub fn with_failed_connects(mut self, count: u32) -> Self {
        self.fail_connects = count;
        self
    }
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new(default_targets(), DEFAULT_LINE_INTERVAL)
    }
}

fn target_from_entry(entry: &TargetEntry) -> Target {
    Target::new(
        entry.id.clone(),
        entry.description.clone().unwrap_or_default(),
    )
}

#[async_trait]
impl DataSource for DemoSource {
    fn name(&self) -> &str {
        "demo"
    }

    async fn connect(
        &self,
        cancel: &CancelToken,
        address: &str,
        _credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Connected, ConnectionError> {
        // Give the user a chance to see the "connecting" message
        if self.connect_delay > timeout {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {}
            }
            return Err(ConnectionError::Timeout(timeout));
        }
        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(ConnectionError::Refused("connect cancelled".to_string()));
            }
            _ = tokio::time::sleep(self.connect_delay) => {}
        }

        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.fail_connects {
            debug!("Demo connect attempt {attempt} failing on purpose");
            return Err(ConnectionError::Refused(format!(
                "{address} is not answering (simulated failure {attempt}/{})",
                self.fail_connects
            )));
        }

        info!("Demo source connected to {address} after {attempt} attempt(s)");
        Ok(Connected {
            address: address.to_string(),
        })
    }

    async fn list_targets(&self, cancel: &CancelToken) -> Result<Vec<Target>, FetchError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(FetchError::Unavailable("fetch cancelled".to_string())),
            _ = tokio::time::sleep(self.line_interval) => Ok(self.targets.clone()),
        }
    }

    fn stream_lines(&self, cancel: CancelToken, target: &str) -> BoxStream<'static, String> {
        let target = target.to_string();
        let interval = self.line_interval;
        futures::stream::unfold(1u64, move |n| {
            let target = target.clone();
            let cancel = cancel.clone();
            async move {
                tokio::select! {
                    _ = cancel.cancelled() => None,
                    _ = tokio::time::sleep(interval) => Some((demo_line(&target, n), n + 1)),
                }
            }
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_source() -> DemoSource {
        DemoSource::new(vec![Target::new("a", "first")], Duration::from_millis(10))
            .with_connect_delay(Duration::from_millis(5))
    }

    #[test]
    fn test_demo_line_format() {
        assert_eq!(demo_line("billing", 1), "billing: DEBUG line 1");
        assert_eq!(demo_line("billing", 5), "billing: ERR line 5");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_configured_attempts_then_connects() {
        let source = fast_source().with_failed_connects(2);
        let cancel = CancelToken::new();
        let creds = Credentials::default();
        let timeout = Duration::from_secs(1);

        for _ in 0..2 {
            let err = source.connect(&cancel, "host", &creds, timeout).await.unwrap_err();
            assert!(matches!(err, ConnectionError::Refused(_)));
        }
        let ok = source.connect(&cancel, "host", &creds, timeout).await.unwrap();
        assert_eq!(ok.address, "host");
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_times_out_when_delay_exceeds_deadline() {
        let source = fast_source().with_connect_delay(Duration::from_secs(10));
        let err = source
            .connect(
                &CancelToken::new(),
                "host",
                &Credentials::default(),
                Duration::from_secs(1),
            )
            .await
            .unwrap_err();
        assert_eq!(err, ConnectionError::Timeout(Duration::from_secs(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_emits_in_order_and_stops_on_cancel() {
        let source = fast_source();
        let cancel = CancelToken::new();
        let mut stream = source.stream_lines(cancel.clone(), "a");

        assert_eq!(stream.next().await.as_deref(), Some("a: DEBUG line 1"));
        assert_eq!(stream.next().await.as_deref(), Some("a: INFO line 2"));

        cancel.cancel();
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_targets_returns_configured_order() {
        let source = DemoSource::default();
        let targets = source.list_targets(&CancelToken::new()).await.unwrap();
        let ids: Vec<_> = targets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["billing", "inventory", "search-indexer", "notifications"]);
    }

    #[test]
    fn test_from_config_uses_configured_targets() {
        let config = ResolvedConfig {
            demo_targets: vec![TargetEntry {
                id: "x".to_string(),
                description: None,
            }],
            ..Default::default()
        };
        let source = DemoSource::from_config(&config);
        assert_eq!(source.targets, vec![Target::new("x", "")]);
    }
}
