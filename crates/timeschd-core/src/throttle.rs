//! Per-host request spacing for polite crawling.
//!
//! A crawl alternates between the schedule host and the catalog host.
//! [`ThrottledFetcher`] hands out one start slot per request and host, each
//! slot at least [`ThrottleConfig::delay`] after the previous one. Callers
//! sleep until their slot without holding the slot table, so a wait on one
//! host never stalls another.

use std::collections::HashMap;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use url::Url;

use crate::error::AppError;
use crate::traits::Fetcher;

/// Spacing between requests to one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Minimum gap between two request starts on the same host.
    pub delay: Duration,

    /// Upper bound of a random extra gap added to `delay`.
    /// `Duration::ZERO` disables it.
    pub jitter: Duration,
}

impl ThrottleConfig {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            jitter: Duration::ZERO,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Gap to leave after a slot: `delay` plus a random share of `jitter`.
    fn gap(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.delay;
        }
        self.delay + Duration::from_millis(random_u64() % jitter_ms)
    }
}

impl Default for ThrottleConfig {
    /// 250ms between requests to one host, no jitter.
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

/// A [`Fetcher`] wrapper that spaces out requests per host.
#[derive(Clone)]
pub struct ThrottledFetcher<F> {
    inner: F,
    config: ThrottleConfig,
    /// Earliest instant the next request to each host may start.
    next_slot: Arc<Mutex<HashMap<String, Instant>>>,
}

impl<F: Fetcher> ThrottledFetcher<F> {
    pub fn new(inner: F, config: ThrottleConfig) -> Self {
        Self {
            inner,
            config,
            next_slot: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// `scheme://host:port` of a URL, `None` when it cannot be parsed.
    fn host_key(raw: &str) -> Option<String> {
        let url = Url::parse(raw).ok()?;
        let host = url.host_str()?;
        let port = url.port_or_known_default()?;
        Some(format!("{}://{host}:{port}", url.scheme()))
    }

    /// Reserve the next start slot for `host` and return it.
    async fn claim_slot(&self, host: &str) -> Instant {
        let now = Instant::now();
        let mut slots = self.next_slot.lock().await;
        let start = slots
            .get(host)
            .copied()
            .filter(|slot| *slot > now)
            .unwrap_or(now);
        slots.insert(host.to_string(), start + self.config.gap());
        start
    }

    async fn wait_turn(&self, host: &str) {
        let start = self.claim_slot(host).await;
        let pause = start.saturating_duration_since(Instant::now());
        if !pause.is_zero() {
            tracing::debug!(%host, pause_ms = %pause.as_millis(), "Throttling request");
            tokio::time::sleep(pause).await;
        }
    }
}

impl<F: Fetcher> Fetcher for ThrottledFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        if let Some(host) = Self::host_key(url) {
            self.wait_turn(&host).await;
        }
        self.inner.fetch(url).await
    }
}

/// The clock hashed under a fresh random key.
fn random_u64() -> u64 {
    let mut hasher = RandomState::new().build_hasher();
    hasher.write_u128(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos(),
    );
    hasher.finish()
}
