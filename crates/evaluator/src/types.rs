use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use thiserror::Error;

use crate::trace::TraceEntry;

/// How a signal's best evidence was found.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchMethod {
    /// Token-overlap ratio met the exact threshold.
    Exact,
    /// Exact matching failed; an entailment confidence met the semantic gate.
    Semantic,
    /// Neither layer produced acceptable evidence.
    None,
}

/// Final compliance verdict for an archetype.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Compliant,
    Partial,
    NonCompliant,
}

/// Outcome of matching one signal against a document.
///
/// Invariants maintained by the engine:
/// - `method == Semantic` implies `applied_score <= semantic_cap` (0.49 by default)
/// - `method == None` implies `applied_score == 0.0`
/// - `raw_score` and `applied_score` always lie in `[0, 1]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    pub signal_id: String,
    /// Best matching sentence, if any candidate was found. Populated even
    /// for sub-threshold exact candidates so traces stay auditable.
    pub sentence_index: Option<usize>,
    pub method: MatchMethod,
    /// Unmodified match confidence (overlap ratio or entailment score).
    pub raw_score: f32,
    /// Score after threshold/cap policy.
    pub applied_score: f32,
}

/// Aggregate result for one block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockResult {
    pub block_id: String,
    pub mandatory: bool,
    /// For mandatory blocks: whether the exact-evidence safeguard passed.
    /// Always `true` for optional blocks.
    pub mandatory_satisfied: bool,
    /// Weighted mean of signal applied scores.
    pub score: f32,
    pub signals: Vec<MatchResult>,
}

/// Aggregate result for one archetype.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchetypeResult {
    pub archetype_id: String,
    /// Requirement title from the rulebook, for report rendering.
    #[serde(default)]
    pub title: String,
    /// Requirement intent from the rulebook, surfaced to the suggestion
    /// collaborator alongside the scores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    pub status: ComplianceStatus,
    /// Weighted mean of block scores.
    pub score: f32,
    pub blocks: Vec<BlockResult>,
}

/// The complete, serializable outcome of evaluating one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationResult {
    pub doc_id: String,
    /// Mean of archetype scores.
    pub overall_score: f32,
    pub archetypes: Vec<ArchetypeResult>,
    /// Present only when tracing was enabled; never read by scoring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<TraceEntry>>,
}

impl EvaluationResult {
    /// Nested mapping representation consumed by the report writer and
    /// suggestion generator: archetype → block → signal →
    /// `{method, matched_sentence, raw_score, applied_score}`.
    pub fn to_report_value(&self) -> JsonValue {
        let archetypes: serde_json::Map<String, JsonValue> = self
            .archetypes
            .iter()
            .map(|a| {
                let blocks: serde_json::Map<String, JsonValue> = a
                    .blocks
                    .iter()
                    .map(|b| {
                        let signals: serde_json::Map<String, JsonValue> = b
                            .signals
                            .iter()
                            .map(|s| {
                                (
                                    s.signal_id.clone(),
                                    json!({
                                        "method": s.method,
                                        "matched_sentence": s.sentence_index,
                                        "raw_score": s.raw_score,
                                        "applied_score": s.applied_score,
                                    }),
                                )
                            })
                            .collect();
                        (
                            b.block_id.clone(),
                            json!({
                                "score": b.score,
                                "mandatory": b.mandatory,
                                "mandatory_satisfied": b.mandatory_satisfied,
                                "signals": signals,
                            }),
                        )
                    })
                    .collect();
                (
                    a.archetype_id.clone(),
                    json!({
                        "title": a.title,
                        "intent": a.intent,
                        "status": a.status,
                        "score": a.score,
                        "blocks": blocks,
                    }),
                )
            })
            .collect();

        json!({
            "doc_id": self.doc_id,
            "overall_score": self.overall_score,
            "archetypes": archetypes,
        })
    }
}

/// Per-run tuning knobs for the hybrid matching engine.
///
/// Cheap to clone and serde-friendly so callers can persist the exact
/// options a verdict was produced under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvalOptions {
    /// Minimum token-overlap ratio for an exact match.
    #[serde(default = "EvalOptions::default_exact_threshold")]
    pub exact_threshold: f32,
    /// Minimum entailment confidence for a semantic match to count at all.
    #[serde(default = "EvalOptions::default_semantic_gate")]
    pub semantic_gate: f32,
    /// Hard ceiling on the applied score of any semantic match. Keeps
    /// paraphrase-only documents from reaching full compliance.
    #[serde(default = "EvalOptions::default_semantic_cap")]
    pub semantic_cap: f32,
    /// Whether the semantic fallback stage runs at all.
    #[serde(default = "EvalOptions::default_semantic_enabled")]
    pub semantic_enabled: bool,
    /// Wall-clock budget in milliseconds, measured from the start of the
    /// evaluation. Checked before and after the batched scorer call:
    /// once exhausted the run degrades to exact-only results, and scores
    /// arriving past the deadline are discarded. The in-flight call
    /// itself is bounded only by the scorer's own timeout.
    #[serde(default)]
    pub semantic_budget_millis: Option<u64>,
    /// Only submit signal/sentence pairs that share at least one
    /// normalized token. Cuts scorer load dramatically, at the cost of
    /// missing paraphrases with zero lexical overlap; off by default.
    #[serde(default)]
    pub lexical_prefilter: bool,
    /// Collect a per-signal decision trace on the result.
    #[serde(default)]
    pub trace: bool,
}

impl EvalOptions {
    pub(crate) fn default_exact_threshold() -> f32 {
        0.60
    }

    pub(crate) fn default_semantic_gate() -> f32 {
        0.85
    }

    pub(crate) fn default_semantic_cap() -> f32 {
        0.49
    }

    pub(crate) fn default_semantic_enabled() -> bool {
        true
    }

    /// Validate the options for a single run.
    pub fn validate(&self) -> Result<(), EvalError> {
        let unit = |name: &str, v: f32| -> Result<(), EvalError> {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(EvalError::InvalidOptions(format!(
                    "{name} must lie in [0, 1], got {v}"
                )));
            }
            Ok(())
        };
        unit("exact_threshold", self.exact_threshold)?;
        unit("semantic_gate", self.semantic_gate)?;
        unit("semantic_cap", self.semantic_cap)?;
        if self.semantic_cap >= 1.0 {
            return Err(EvalError::InvalidOptions(
                "semantic_cap must be below 1.0: semantic evidence must never equal exact evidence"
                    .into(),
            ));
        }
        Ok(())
    }
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            exact_threshold: Self::default_exact_threshold(),
            semantic_gate: Self::default_semantic_gate(),
            semantic_cap: Self::default_semantic_cap(),
            semantic_enabled: Self::default_semantic_enabled(),
            semantic_budget_millis: None,
            lexical_prefilter: false,
            trace: false,
        }
    }
}

/// Errors produced by the evaluation layer.
#[derive(Debug, Error, Serialize)]
pub enum EvalError {
    /// Per-run options failed validation.
    #[error("invalid evaluation options: {0}")]
    InvalidOptions(String),
    /// An isolated internal fault (used by batch evaluation to report a
    /// single document's failure without aborting its siblings).
    #[error("evaluation failed: {0}")]
    Internal(String),
}
