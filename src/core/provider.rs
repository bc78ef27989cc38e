/// Variant providers — the rewrite step behind the engine.
///
/// The engine only depends on [`VariantProvider`]. A mock, a local template
/// expander and a remote chat-completion client all plug in the same way.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

use crate::schema::node::Node;
use crate::schema::request::VariantCount;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider is not configured: {0}")]
    NotConfigured(&'static str),
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Produces rewrites for one node.
///
/// Implementations should return exactly `count` non-empty variants and must
/// report failure as `Err`, never as an empty list. The engine does not
/// enforce the count; a short or long list changes the number of assembled
/// scripts accordingly.
#[async_trait]
pub trait VariantProvider: Send + Sync {
    async fn provide(
        &self,
        node: &Node,
        instruction: &str,
        count: VariantCount,
    ) -> Result<Vec<String>, ProviderError>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

/// Offline provider producing labelled placeholder rewrites.
///
/// Output is deterministic: `({instruction}) -> "{node}" rewrite #{i}` for
/// `i` in `1..=count`. Latency can be simulated with a fixed delay plus
/// seeded random jitter, which makes it useful for exercising cancellation.
#[derive(Debug)]
pub struct SimulatedProvider {
    delay: Duration,
    jitter: Duration,
    rng: Mutex<StdRng>,
}

impl SimulatedProvider {
    pub fn new() -> Self {
        Self {
            delay: Duration::ZERO,
            jitter: Duration::ZERO,
            rng: Mutex::new(StdRng::seed_from_u64(0)),
        }
    }

    /// Sleep `delay` plus up to `jitter` before answering each node.
    pub fn with_latency(mut self, delay: Duration, jitter: Duration) -> Self {
        self.delay = delay;
        self.jitter = jitter;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// The text a simulated rewrite carries.
    pub fn rewrite(node: &Node, instruction: &str, index: u32) -> String {
        format!("({}) -> \"{}\" rewrite #{}", instruction, node, index)
    }

    fn next_latency(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.delay;
        }
        let max = self.jitter.as_millis() as u64;
        let extra = match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..=max),
            Err(_) => 0,
        };
        self.delay + Duration::from_millis(extra)
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VariantProvider for SimulatedProvider {
    async fn provide(
        &self,
        node: &Node,
        instruction: &str,
        count: VariantCount,
    ) -> Result<Vec<String>, ProviderError> {
        let latency = self.next_latency();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        Ok((1..=count.get())
            .map(|i| Self::rewrite(node, instruction, i))
            .collect())
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
