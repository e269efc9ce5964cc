//! # Compliance Evaluator (`evaluator`)
//!
//! ## Purpose
//!
//! `evaluator` sits on top of the rulebook model (`rulebook`), the text
//! normalizer (`normalize`), and the entailment boundary (`semantic`).
//! It answers one question per document: does the document contain
//! evidence — exact or semantically equivalent — for each required
//! signal, and does that evidence satisfy each block's
//! mandatory/optional composition rules?
//!
//! The pipeline per document:
//!
//! 1. **Exact pass** — token-overlap ratio between every signal and
//!    every sentence; the best sentence wins, ties to the earliest.
//!    Ratio >= the exact threshold (0.60) settles the signal.
//! 2. **Semantic fallback** — unresolved signals are batched into one
//!    entailment call. Confidence >= the gate (0.85) counts, but the
//!    applied score is capped (0.49) so paraphrase alone can never
//!    reach full compliance.
//! 3. **Aggregation** — weighted means roll signals into blocks and
//!    blocks into archetypes; the mandatory safeguard and the
//!    configured status cutoffs turn scores into verdicts.
//!
//! ## Core Types
//!
//! - [`Evaluator`]: the engine; shares a read-only rulebook and scorer
//!   across concurrent calls.
//! - [`EvalOptions`]: per-run thresholds, semantic budget, trace toggle.
//! - [`MatchResult`] / [`BlockResult`] / [`ArchetypeResult`] /
//!   [`EvaluationResult`]: immutable computed values, serializable for
//!   downstream report and suggestion collaborators.
//! - [`TraceEntry`]: human-auditable decision log, never read by scoring.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use evaluator::{EvalOptions, Evaluator};
//! use normalize::{Document, NormalizeConfig};
//! use rulebook::{Archetype, Block, Rulebook, Signal};
//!
//! let rulebook = Arc::new(
//!     Rulebook::new(vec![Archetype::new(
//!         "POLICY_PROCEDURE",
//!         vec![Block::new(
//!             "roles",
//!             vec![Signal::new("roles-defined", "roles defined").mandatory()],
//!         )
//!         .mandatory()],
//!     )])
//!     .unwrap(),
//! );
//!
//! let document = Document::from_text(
//!     "doc-1",
//!     "Procurement committee roles are clearly defined in writing.",
//!     rulebook.normalize_config(),
//! );
//!
//! let evaluator = Evaluator::new(rulebook, None);
//! let result = evaluator.evaluate(&document, &EvalOptions::default()).unwrap();
//! assert_eq!(result.archetypes.len(), 1);
//! ```

mod engine;
mod exact;
pub mod metrics;
mod trace;
mod types;

pub use crate::engine::Evaluator;
pub use crate::exact::exact_overlap;
pub use crate::metrics::{set_eval_metrics, EvalMetrics};
pub use crate::trace::TraceEntry;
pub use crate::types::{
    ArchetypeResult, BlockResult, ComplianceStatus, EvalError, EvalOptions, EvaluationResult,
    MatchMethod, MatchResult,
};
