/// The generation pipeline: reference text → nodes → variants → scripts.
///
/// Wires together segmentation, the variant provider and the combiner.

use futures::stream::{self, StreamExt, TryStreamExt};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::combiner::combine;
use crate::core::export::{to_records, ExportRecord};
use crate::core::provider::{ProviderError, VariantProvider};
use crate::core::segmenter::segment;
use crate::schema::node::{Node, VariantSet};
use crate::schema::request::{GenerationRequest, VariantCount};

/// Default number of nodes rewritten at the same time.
pub const DEFAULT_CONCURRENCY: usize = 4;
/// Default ceiling on assembled scripts per request.
pub const DEFAULT_MAX_COMBINATIONS: usize = 10_000;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no variant provider configured")]
    NoProvider,
    #[error("provider '{provider}' failed on node {node_index}: {source}")]
    Provider {
        provider: String,
        node_index: usize,
        #[source]
        source: ProviderError,
    },
    #[error("{nodes} nodes with {per_node} variants each exceed the limit of {limit} scripts")]
    TooManyCombinations {
        nodes: usize,
        per_node: u32,
        limit: usize,
    },
}

/// How a successful generation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GenerationOutcome {
    /// Every node got variants and scripts were assembled.
    Complete,
    /// The reference text had no non-blank lines.
    NothingToGenerate,
    /// The provider returned no variants for these nodes, so no script could
    /// be assembled.
    Degenerate { node_indices: Vec<usize> },
}

/// Everything one generation run produced.
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub nodes: Vec<Node>,
    pub variant_sets: Vec<VariantSet>,
    pub combinations: Vec<String>,
    pub outcome: GenerationOutcome,
}

impl Generation {
    fn nothing() -> Self {
        Self {
            nodes: Vec::new(),
            variant_sets: Vec::new(),
            combinations: Vec::new(),
            outcome: GenerationOutcome::NothingToGenerate,
        }
    }

    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    /// Export rows for the assembled scripts.
    pub fn records(&self) -> Vec<ExportRecord> {
        to_records(&self.combinations)
    }
}

/// The script generation engine. Built via `ScriptEngine::builder()`.
///
/// Cheap to clone; clones share the provider. Each call to
/// [`ScriptEngine::generate`] is independent and keeps no state between
/// runs.
#[derive(Clone)]
pub struct ScriptEngine {
    provider: Arc<dyn VariantProvider>,
    concurrency: usize,
    max_combinations: Option<usize>,
}

/// Builder for constructing a `ScriptEngine`.
pub struct ScriptEngineBuilder {
    provider: Option<Arc<dyn VariantProvider>>,
    concurrency: usize,
    max_combinations: Option<usize>,
}

impl ScriptEngine {
    pub fn builder() -> ScriptEngineBuilder {
        ScriptEngineBuilder {
            provider: None,
            concurrency: DEFAULT_CONCURRENCY,
            max_combinations: Some(DEFAULT_MAX_COMBINATIONS),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Run one generation request end to end.
    ///
    /// Nodes are rewritten concurrently and collected in node order. The
    /// first provider failure fails the whole request and drops the calls
    /// still in flight. Dropping the returned future aborts everything.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Generation, PipelineError> {
        let nodes = segment(&request.reference_text);
        if nodes.is_empty() {
            info!("reference text has no non-blank lines, nothing to generate");
            return Ok(Generation::nothing());
        }

        self.check_budget(nodes.len(), request.variant_count)?;

        info!(
            nodes = nodes.len(),
            variants_per_node = request.variant_count.get(),
            provider = self.provider.name(),
            "generating variants"
        );
        let variant_sets = self
            .collect_variants(&nodes, &request.instruction, request.variant_count)
            .await?;

        let degenerate: Vec<usize> = variant_sets
            .iter()
            .enumerate()
            .filter(|(_, set)| set.is_empty())
            .map(|(i, _)| i)
            .collect();

        let outcome = if degenerate.is_empty() {
            GenerationOutcome::Complete
        } else {
            warn!(
                nodes = ?degenerate,
                "provider returned no variants, no scripts can be assembled"
            );
            GenerationOutcome::Degenerate {
                node_indices: degenerate,
            }
        };

        let combinations = combine(&variant_sets);
        info!(combinations = combinations.len(), "generation finished");

        Ok(Generation {
            nodes,
            variant_sets,
            combinations,
            outcome,
        })
    }

    async fn collect_variants(
        &self,
        nodes: &[Node],
        instruction: &str,
        count: VariantCount,
    ) -> Result<Vec<VariantSet>, PipelineError> {
        let provider = self.provider.as_ref();
        stream::iter(nodes.iter().cloned().enumerate())
            .map(|(node_index, node)| async move {
                match provider.provide(&node, instruction, count).await {
                    Ok(variants) => Ok(inspect_variants(node_index, count, variants)),
                    Err(source) => {
                        warn!(node_index, error = %source, "variant provider failed");
                        Err(PipelineError::Provider {
                            provider: provider.name().to_string(),
                            node_index,
                            source,
                        })
                    }
                }
            })
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    fn check_budget(&self, nodes: usize, count: VariantCount) -> Result<(), PipelineError> {
        let Some(limit) = self.max_combinations else {
            return Ok(());
        };
        let projected = u32::try_from(nodes)
            .ok()
            .and_then(|n| count.as_usize().checked_pow(n));
        match projected {
            Some(total) if total <= limit => Ok(()),
            _ => Err(PipelineError::TooManyCombinations {
                nodes,
                per_node: count.get(),
                limit,
            }),
        }
    }
}

impl fmt::Debug for ScriptEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptEngine")
            .field("provider", &self.provider.name())
            .field("concurrency", &self.concurrency)
            .field("max_combinations", &self.max_combinations)
            .finish()
    }
}

impl ScriptEngineBuilder {
    pub fn provider<P: VariantProvider + 'static>(mut self, provider: P) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    pub fn shared_provider(mut self, provider: Arc<dyn VariantProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Maximum number of nodes rewritten at once. Values below 1 become 1.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Refuse requests whose projected script count exceeds `limit`.
    /// `None` disables the check.
    pub fn max_combinations(mut self, limit: Option<usize>) -> Self {
        self.max_combinations = limit;
        self
    }

    pub fn build(self) -> Result<ScriptEngine, PipelineError> {
        let provider = self.provider.ok_or(PipelineError::NoProvider)?;
        Ok(ScriptEngine {
            provider,
            concurrency: self.concurrency,
            max_combinations: self.max_combinations,
        })
    }
}

/// Log anything unusual about a node's variants; never alters them.
fn inspect_variants(node_index: usize, count: VariantCount, variants: Vec<String>) -> VariantSet {
    if variants.len() != count.as_usize() {
        warn!(
            node_index,
            expected = count.get(),
            received = variants.len(),
            "provider returned an unexpected number of variants"
        );
    }
    let distinct: FxHashSet<&str> = variants.iter().map(String::as_str).collect();
    if distinct.len() < variants.len() {
        debug!(
            node_index,
            duplicates = variants.len() - distinct.len(),
            "provider returned duplicate variants"
        );
    }
    VariantSet::new(variants)
}
