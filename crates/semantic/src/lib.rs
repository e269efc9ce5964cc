//! # Semantic Entailment Boundary (`semantic`)
//!
//! The semantic fallback of the compliance engine is a capability
//! boundary: given a premise (a document sentence) and a hypothesis (a
//! rule signal's requirement text), some external model returns an
//! entailment confidence in `[0, 1]`. This crate defines that boundary
//! as the [`EntailmentScorer`] trait plus two implementations:
//!
//! - [`StubScorer`] — deterministic and offline, for tests and
//!   deployments without a model.
//! - [`ApiScorer`] — remote HTTP NLI endpoint with a per-request
//!   timeout, batched so many pairs amortize one model invocation.
//!
//! Scorers are `Send + Sync`; a single instance can serve concurrent
//! evaluations. The trait is intentionally batch-first: semantic
//! inference is the only high-latency call in the pipeline and callers
//! must be able to submit every unresolved signal/sentence pair of a
//! document in one call.
//!
//! Out-of-range model output is clamped here (with a `tracing` warning),
//! never propagated into aggregation.

mod api;
mod config;
mod error;
mod stub;

use serde::{Deserialize, Serialize};

pub use crate::api::ApiScorer;
pub use crate::config::ScorerConfig;
pub use crate::error::SemanticError;
pub use crate::stub::StubScorer;

/// One premise/hypothesis pair submitted for entailment scoring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntailmentPair {
    /// Document sentence (the evidence).
    pub premise: String,
    /// Requirement text derived from a rule signal.
    pub hypothesis: String,
}

/// Black-box entailment capability.
///
/// Implementations must be safe for concurrent read-only use and must
/// return exactly one confidence per submitted pair, in order.
pub trait EntailmentScorer: Send + Sync {
    fn score_batch(&self, pairs: &[EntailmentPair]) -> Result<Vec<f32>, SemanticError>;
}

/// Clamp a scorer confidence into `[0, 1]`, mapping NaN to 0.
pub fn clamp_confidence(raw: f32) -> f32 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 1.0)
    }
}

/// Build a scorer from configuration.
///
/// `"stub"` always succeeds; `"api"` requires `api_url`. Unknown modes
/// are rejected rather than silently falling back, so a typo in config
/// cannot quietly disable real inference.
pub fn build_scorer(cfg: &ScorerConfig) -> Result<Box<dyn EntailmentScorer>, SemanticError> {
    match cfg.mode.as_str() {
        "stub" => Ok(Box::new(StubScorer)),
        "api" => Ok(Box::new(ApiScorer::from_config(cfg)?)),
        other => Err(SemanticError::InvalidConfig(format!(
            "unknown scorer mode: {other}"
        ))),
    }
}
