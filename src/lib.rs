//! # rulescore
//!
//! Hybrid compliance scoring for policy documents. A [`Rulebook`]
//! describes what evidence each archetype of document must contain;
//! [`evaluate`] checks one document against it, first by exact token
//! overlap, then by a capped semantic-entailment fallback for signals
//! the lexical pass could not settle.
//!
//! The crate is an umbrella over four member crates:
//!
//! - `normalize`: Unicode normalization, sentence splitting,
//!   tokenization and stemming.
//! - `rulebook`: archetype / block / signal model plus validation.
//! - `semantic`: the [`EntailmentScorer`] boundary and its stub and
//!   HTTP implementations.
//! - `evaluator`: the scoring engine and result types.
//!
//! ## Quick start
//!
//! ```
//! use std::sync::Arc;
//! use rulescore::{
//!     Archetype, Block, Document, EvalOptions, Rulebook, Signal, evaluate,
//! };
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
//! let result = evaluate(rulebook, &document, &EvalOptions::default(), None).unwrap();
//! assert_eq!(result.doc_id, "doc-1");
//! ```
//!
//! For multi-document workloads, [`evaluate_batch`] fans documents out
//! over a bounded rayon pool with per-document fault isolation: one
//! document panicking or failing never poisons its neighbours.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use tracing::warn;

pub use evaluator::{
    exact_overlap, set_eval_metrics, ArchetypeResult, BlockResult, ComplianceStatus, EvalError,
    EvalMetrics, EvalOptions, EvaluationResult, Evaluator, MatchMethod, MatchResult, TraceEntry,
};
pub use normalize::{
    is_stop_token, normalize_text, split_sentences, tokenize_and_stem, Document, NormalizeConfig,
    Sentence,
};
pub use rulebook::{
    Archetype, Block, ConfigurationError, Rulebook, Signal, StatusThresholds,
};
pub use semantic::{
    build_scorer, clamp_confidence, ApiScorer, EntailmentPair, EntailmentScorer, ScorerConfig,
    SemanticError, StubScorer,
};

/// Evaluate a single document against a rulebook.
///
/// Convenience wrapper over [`Evaluator`] for callers that do not keep
/// an engine around between calls.
pub fn evaluate(
    rulebook: Arc<Rulebook>,
    document: &Document,
    options: &EvalOptions,
    scorer: Option<Arc<dyn EntailmentScorer>>,
) -> Result<EvaluationResult, EvalError> {
    Evaluator::new(rulebook, scorer).evaluate(document, options)
}

/// Outcome of one document inside a batch run.
///
/// Batches are fault-isolated: the `outcome` carries either the
/// evaluation result or the error that stopped this one document.
#[derive(Debug, Serialize)]
pub struct DocumentOutcome {
    pub doc_id: String,
    pub outcome: Result<EvaluationResult, EvalError>,
}

/// Evaluate many documents with at most `workers` evaluations in flight.
///
/// Results come back in input order. A failure (or panic) while scoring
/// one document is captured in its [`DocumentOutcome`]; the remaining
/// documents still run. `workers` of 0 or 1 evaluates sequentially.
pub fn evaluate_batch(
    rulebook: Arc<Rulebook>,
    documents: &[Document],
    options: &EvalOptions,
    scorer: Option<Arc<dyn EntailmentScorer>>,
    workers: usize,
) -> Vec<DocumentOutcome> {
    let engine = Evaluator::new(rulebook, scorer);

    if workers <= 1 {
        return documents
            .iter()
            .map(|document| run_isolated(&engine, document, options))
            .collect();
    }

    match ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(|| {
            documents
                .par_iter()
                .map(|document| run_isolated(&engine, document, options))
                .collect()
        }),
        Err(err) => {
            warn!(error = %err, "batch pool unavailable, evaluating sequentially");
            documents
                .iter()
                .map(|document| run_isolated(&engine, document, options))
                .collect()
        }
    }
}

fn run_isolated(
    engine: &Evaluator,
    document: &Document,
    options: &EvalOptions,
) -> DocumentOutcome {
    let outcome = catch_unwind(AssertUnwindSafe(|| engine.evaluate(document, options)))
        .unwrap_or_else(|_| Err(EvalError::Internal("evaluation panicked".into())));
    DocumentOutcome {
        doc_id: document.doc_id.clone(),
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rulebook() -> Arc<Rulebook> {
        Arc::new(
            Rulebook::new(vec![Archetype::new(
                "POLICY_PROCEDURE",
                vec![Block::new(
                    "roles",
                    vec![Signal::new("roles-defined", "roles defined").mandatory()],
                )
                .mandatory()],
            )])
            .unwrap(),
        )
    }

    fn doc(id: &str, text: &str, rb: &Rulebook) -> Document {
        Document::from_text(id, text, rb.normalize_config())
    }

    #[test]
    fn single_document_convenience() {
        let rb = rulebook();
        let d = doc("d1", "Committee roles are clearly defined.", &rb);
        let result = evaluate(rb, &d, &EvalOptions::default(), None).unwrap();
        assert_eq!(result.doc_id, "d1");
        assert_eq!(result.archetypes[0].status, ComplianceStatus::Compliant);
    }

    #[test]
    fn batch_preserves_input_order() {
        let rb = rulebook();
        let docs: Vec<Document> = (0..8)
            .map(|i| doc(&format!("d{i}"), "roles are defined", &rb))
            .collect();
        let outcomes = evaluate_batch(rb, &docs, &EvalOptions::default(), None, 4);
        let ids: Vec<&str> = outcomes.iter().map(|o| o.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["d0", "d1", "d2", "d3", "d4", "d5", "d6", "d7"]);
        assert!(outcomes.iter().all(|o| o.outcome.is_ok()));
    }

    #[test]
    fn batch_sequential_when_single_worker() {
        let rb = rulebook();
        let docs = vec![doc("a", "roles defined", &rb), doc("b", "", &rb)];
        let outcomes = evaluate_batch(rb, &docs, &EvalOptions::default(), None, 1);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].outcome.is_ok());
        assert!(outcomes[1].outcome.is_ok());
    }

    #[test]
    fn batch_isolates_invalid_options_per_document() {
        let rb = rulebook();
        let docs = vec![doc("a", "roles defined", &rb)];
        let bad = EvalOptions {
            exact_threshold: 1.5,
            ..EvalOptions::default()
        };
        let outcomes = evaluate_batch(rb, &docs, &bad, None, 2);
        assert!(matches!(
            outcomes[0].outcome,
            Err(EvalError::InvalidOptions(_))
        ));
    }
}
