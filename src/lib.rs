//! Script Engine — line-by-line rewriting and combinatorial assembly of
//! scripts.
//!
//! Splits a reference script into lines, asks a variant provider for several
//! rewrites of each line, and assembles every script that picks one rewrite
//! per line, keeping the original line order.

pub mod core;
pub mod schema;

pub use crate::core::pipeline::{Generation, GenerationOutcome, PipelineError, ScriptEngine};
pub use crate::core::provider::{ProviderError, SimulatedProvider, VariantProvider};
pub use crate::schema::request::{GenerationRequest, VariantCount};
