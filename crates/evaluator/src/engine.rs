use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn, Level};

use normalize::{Document, Sentence};
use rulebook::{Block, Rulebook, Signal};
use semantic::{clamp_confidence, EntailmentPair, EntailmentScorer};

use crate::exact::best_exact_candidate;
use crate::metrics::metrics_recorder;
use crate::trace::{TraceEntry, TraceRecorder};
use crate::types::{
    ArchetypeResult, BlockResult, ComplianceStatus, EvalError, EvalOptions, EvaluationResult,
    MatchMethod, MatchResult,
};


/// Hybrid matching and archetype-evaluation engine.
///
/// Holds a shared, read-only [`Rulebook`] and an optional entailment
/// scorer. A single `Evaluator` can serve many documents concurrently:
/// each call to [`evaluate`](Evaluator::evaluate) owns its own working
/// state and produces a fresh, immutable [`EvaluationResult`].
pub struct Evaluator {
    rulebook: Arc<Rulebook>,
    scorer: Option<Arc<dyn EntailmentScorer>>,
}

/// Coordinates of one signal inside the result skeleton.
#[derive(Debug, Clone, Copy)]
struct SignalCoord {
    archetype: usize,
    block: usize,
    signal: usize,
}

impl Evaluator {
    /// Construct an evaluator over a validated rulebook.
    ///
    /// Without a scorer the semantic stage is skipped entirely and every
    /// verdict rests on exact lexical evidence alone.
    pub fn new(rulebook: Arc<Rulebook>, scorer: Option<Arc<dyn EntailmentScorer>>) -> Self {
        Self { rulebook, scorer }
    }

    pub fn rulebook(&self) -> &Rulebook {
        &self.rulebook
    }

    /// Score `document` against the rulebook and derive per-archetype
    /// compliance statuses.
    ///
    /// The run is sequential per document: an exact pass over all
    /// signals, one batched semantic call for the unresolved remainder,
    /// then aggregation. Scorer failures and budget exhaustion degrade
    /// to exact-only results; they never abort the run.
    pub fn evaluate(
        &self,
        document: &Document,
        options: &EvalOptions,
    ) -> Result<EvaluationResult, EvalError> {
        options.validate()?;

        let start = Instant::now();
        // The semantic budget counts from here, so time spent in the
        // exact pass already draws it down.
        let deadline = options
            .semantic_budget_millis
            .map(|ms| start + Duration::from_millis(ms));
        let span = tracing::span!(Level::INFO, "evaluate", doc_id = %document.doc_id);
        let _guard = span.enter();

        let mut trace = TraceRecorder::new(options.trace);

        // Exact pass over every signal, recording sub-threshold best
        // candidates so the fallback and the trace both see them.
        let mut matches: Vec<Vec<Vec<MatchResult>>> = Vec::new();
        let mut unresolved: Vec<SignalCoord> = Vec::new();
        for (a_idx, archetype) in self.rulebook.archetypes().iter().enumerate() {
            let mut block_matches = Vec::with_capacity(archetype.blocks.len());
            for (b_idx, block) in archetype.blocks.iter().enumerate() {
                let mut signal_matches = Vec::with_capacity(block.signals.len());
                for (s_idx, signal) in block.signals.iter().enumerate() {
                    let candidate = best_exact_candidate(&signal.tokens, &document.sentences);
                    let result = match candidate {
                        Some(c) if c.ratio >= options.exact_threshold => {
                            trace.push(TraceEntry {
                                archetype_id: archetype.id.clone(),
                                block_id: block.id.clone(),
                                signal_id: signal.id.clone(),
                                sentence_index: Some(c.sentence_index),
                                method: MatchMethod::Exact,
                                raw_score: c.ratio,
                                applied_score: c.ratio,
                                note: format!(
                                    "token overlap {:.4} >= exact threshold {:.2}",
                                    c.ratio, options.exact_threshold
                                ),
                            });
                            MatchResult {
                                signal_id: signal.id.clone(),
                                sentence_index: Some(c.sentence_index),
                                method: MatchMethod::Exact,
                                raw_score: c.ratio,
                                applied_score: c.ratio,
                            }
                        }
                        candidate => {
                            unresolved.push(SignalCoord {
                                archetype: a_idx,
                                block: b_idx,
                                signal: s_idx,
                            });
                            let (sentence_index, ratio) = candidate
                                .filter(|c| c.ratio > 0.0)
                                .map(|c| (Some(c.sentence_index), c.ratio))
                                .unwrap_or((None, 0.0));
                            MatchResult {
                                signal_id: signal.id.clone(),
                                sentence_index,
                                method: MatchMethod::None,
                                raw_score: ratio,
                                applied_score: 0.0,
                            }
                        }
                    };
                    signal_matches.push(result);
                }
                block_matches.push(signal_matches);
            }
            matches.push(block_matches);
        }

        // Semantic fallback for whatever the exact layer left behind.
        if !unresolved.is_empty() {
            self.run_semantic_stage(
                document,
                options,
                deadline,
                &unresolved,
                &mut matches,
                &mut trace,
            );
        }

        // Aggregation. The two load-bearing invariants (semantic scores
        // are capped, mandatory blocks demand exact evidence) are guard
        // clauses here, not side effects of stage ordering.
        let mut archetype_results = Vec::with_capacity(self.rulebook.archetypes().len());
        for (a_idx, archetype) in self.rulebook.archetypes().iter().enumerate() {
            let mut block_results = Vec::with_capacity(archetype.blocks.len());
            for (b_idx, block) in archetype.blocks.iter().enumerate() {
                let signals = std::mem::take(&mut matches[a_idx][b_idx]);
                block_results.push(aggregate_block(block, signals));
            }
            let score = weighted_mean(
                block_results
                    .iter()
                    .zip(&archetype.blocks)
                    .map(|(r, b)| (r.score, b.weight)),
            );
            let status = derive_status(&block_results, score, &archetype.thresholds);
            archetype_results.push(ArchetypeResult {
                archetype_id: archetype.id.clone(),
                title: archetype.title.clone(),
                intent: archetype.intent.clone(),
                status,
                score,
                blocks: block_results,
            });
        }

        let overall_score = if archetype_results.is_empty() {
            0.0
        } else {
            archetype_results.iter().map(|a| a.score).sum::<f32>() / archetype_results.len() as f32
        };

        let latency = start.elapsed();
        info!(
            doc_id = %document.doc_id,
            overall_score,
            archetypes = archetype_results.len(),
            elapsed_micros = latency.as_micros() as u64,
            "evaluation_complete"
        );
        if let Some(recorder) = metrics_recorder() {
            recorder.record_evaluation(&document.doc_id, latency, archetype_results.len());
        }

        Ok(EvaluationResult {
            doc_id: document.doc_id.clone(),
            overall_score,
            archetypes: archetype_results,
            trace: trace.into_entries(),
        })
    }

    /// Batched semantic pass: one scorer invocation covers every
    /// unresolved signal/sentence pair of the document.
    fn run_semantic_stage(
        &self,
        document: &Document,
        options: &EvalOptions,
        deadline: Option<Instant>,
        unresolved: &[SignalCoord],
        matches: &mut [Vec<Vec<MatchResult>>],
        trace: &mut TraceRecorder,
    ) {
        if !options.semantic_enabled {
            self.note_unresolved(unresolved, matches, trace, "semantic stage disabled");
            return;
        }
        if document.is_empty() {
            self.note_unresolved(unresolved, matches, trace, "document has no sentences");
            return;
        }
        let Some(scorer) = self.scorer.as_deref() else {
            self.note_unresolved(unresolved, matches, trace, "no entailment scorer configured");
            return;
        };

        // Flat pair list; `owners[i]` maps the i-th pair back to its signal.
        let mut pairs: Vec<EntailmentPair> = Vec::new();
        let mut owners: Vec<(SignalCoord, usize)> = Vec::new();
        for &coord in unresolved {
            let signal = self.signal_at(coord);
            for sentence in &document.sentences {
                if options.lexical_prefilter && !shares_token(signal, sentence) {
                    continue;
                }
                pairs.push(EntailmentPair {
                    premise: sentence.raw.clone(),
                    hypothesis: signal.pattern.clone(),
                });
                owners.push((coord, sentence.index));
            }
        }
        if pairs.is_empty() {
            self.note_unresolved(
                unresolved,
                matches,
                trace,
                "no sentence passed the lexical pre-filter",
            );
            return;
        }

        // Last check before committing to the high-latency call; the
        // call itself is bounded only by the scorer's own timeout.
        if deadline.is_some_and(|d| Instant::now() >= d) {
            self.record_degraded(document, unresolved, matches, trace, "semantic budget exhausted");
            return;
        }

        debug!(pairs = pairs.len(), signals = unresolved.len(), "semantic_batch");
        let scores = match scorer.score_batch(&pairs) {
            Ok(scores) if scores.len() == pairs.len() => scores,
            Ok(scores) => {
                warn!(
                    expected = pairs.len(),
                    got = scores.len(),
                    "scorer returned wrong arity; skipping semantic stage"
                );
                self.record_degraded(document, unresolved, matches, trace, "scorer arity mismatch");
                return;
            }
            Err(err) => {
                warn!(error = %err, "scorer failed; skipping semantic stage");
                self.record_degraded(
                    document,
                    unresolved,
                    matches,
                    trace,
                    &format!("scorer error: {err}"),
                );
                return;
            }
        };

        // Scores that arrive past the deadline are discarded, so one
        // slow inference degrades this document instead of stalling it.
        if deadline.is_some_and(|d| Instant::now() >= d) {
            self.record_degraded(document, unresolved, matches, trace, "semantic budget exhausted");
            return;
        }

        for &coord in unresolved {
            let signal = self.signal_at(coord);
            // Best confidence wins; strict comparison keeps the earliest
            // sentence on ties, matching the exact layer's rule.
            let mut best: Option<(usize, f32)> = None;
            for ((owner, sentence_index), &raw) in owners.iter().zip(&scores) {
                if owner.archetype != coord.archetype
                    || owner.block != coord.block
                    || owner.signal != coord.signal
                {
                    continue;
                }
                let confidence = clamp_confidence(raw);
                if confidence != raw {
                    warn!(raw, confidence, signal_id = %signal.id, "clamped scorer confidence");
                }
                if best.map_or(true, |(_, b)| confidence > b) {
                    best = Some((*sentence_index, confidence));
                }
            }

            let (archetype_id, block_id) = self.ids_at(coord);
            let slot = &mut matches[coord.archetype][coord.block][coord.signal];
            match best {
                Some((sentence_index, confidence)) if confidence >= options.semantic_gate => {
                    // Cap guard: paraphrase evidence never counts as full
                    // documentary evidence.
                    let applied = confidence.min(options.semantic_cap);
                    trace.push(TraceEntry {
                        archetype_id,
                        block_id,
                        signal_id: signal.id.clone(),
                        sentence_index: Some(sentence_index),
                        method: MatchMethod::Semantic,
                        raw_score: confidence,
                        applied_score: applied,
                        note: format!(
                            "entailment {:.4} >= gate {:.2}; applied capped at {:.2}",
                            confidence, options.semantic_gate, options.semantic_cap
                        ),
                    });
                    *slot = MatchResult {
                        signal_id: signal.id.clone(),
                        sentence_index: Some(sentence_index),
                        method: MatchMethod::Semantic,
                        raw_score: confidence,
                        applied_score: applied,
                    };
                }
                best => {
                    let note = match best {
                        Some((_, confidence)) => format!(
                            "best entailment {:.4} below gate {:.2}",
                            confidence, options.semantic_gate
                        ),
                        None => "no candidate sentences for semantic scoring".to_string(),
                    };
                    trace.push(TraceEntry {
                        archetype_id,
                        block_id,
                        signal_id: signal.id.clone(),
                        sentence_index: slot.sentence_index,
                        method: MatchMethod::None,
                        raw_score: slot.raw_score,
                        applied_score: 0.0,
                        note,
                    });
                }
            }
        }
    }

    fn record_degraded(
        &self,
        document: &Document,
        unresolved: &[SignalCoord],
        matches: &mut [Vec<Vec<MatchResult>>],
        trace: &mut TraceRecorder,
        reason: &str,
    ) {
        if let Some(recorder) = metrics_recorder() {
            recorder.record_semantic_degraded(&document.doc_id, reason);
        }
        let note = format!("semantic stage skipped ({reason}); exact-only result");
        self.note_unresolved(unresolved, matches, trace, &note);
    }

    /// Trace-only bookkeeping for signals the semantic stage left as-is.
    fn note_unresolved(
        &self,
        unresolved: &[SignalCoord],
        matches: &mut [Vec<Vec<MatchResult>>],
        trace: &mut TraceRecorder,
        note: &str,
    ) {
        for &coord in unresolved {
            let signal = self.signal_at(coord);
            let (archetype_id, block_id) = self.ids_at(coord);
            let slot = &matches[coord.archetype][coord.block][coord.signal];
            trace.push(TraceEntry {
                archetype_id,
                block_id,
                signal_id: signal.id.clone(),
                sentence_index: slot.sentence_index,
                method: MatchMethod::None,
                raw_score: slot.raw_score,
                applied_score: 0.0,
                note: note.to_string(),
            });
        }
    }

    fn signal_at(&self, coord: SignalCoord) -> &Signal {
        &self.rulebook.archetypes()[coord.archetype].blocks[coord.block].signals[coord.signal]
    }

    fn ids_at(&self, coord: SignalCoord) -> (String, String) {
        let archetype = &self.rulebook.archetypes()[coord.archetype];
        (archetype.id.clone(), archetype.blocks[coord.block].id.clone())
    }
}

fn shares_token(signal: &Signal, sentence: &Sentence) -> bool {
    signal.tokens.iter().any(|t| sentence.tokens.contains(t))
}

fn weighted_mean(values: impl Iterator<Item = (f32, f32)>) -> f32 {
    let mut weighted_sum = 0.0f32;
    let mut weight_total = 0.0f32;
    for (value, weight) in values {
        weighted_sum += value * weight;
        weight_total += weight;
    }
    if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        0.0
    }
}

fn aggregate_block(block: &Block, signals: Vec<MatchResult>) -> BlockResult {
    let score = weighted_mean(
        signals
            .iter()
            .zip(&block.signals)
            .map(|(r, s)| (r.applied_score, s.weight)),
    );

    // Mandatory safeguard: semantic evidence can raise the score but
    // never flips a mandatory block's pass/fail boolean.
    let mandatory_satisfied = if !block.mandatory {
        true
    } else {
        let mut mandatory_seen = false;
        let mut all_mandatory_exact = true;
        let mut any_exact = false;
        for (result, signal) in signals.iter().zip(&block.signals) {
            let exact = result.method == MatchMethod::Exact;
            any_exact |= exact;
            if signal.mandatory {
                mandatory_seen = true;
                all_mandatory_exact &= exact;
            }
        }
        // A mandatory block with no per-signal flags still demands at
        // least one piece of exact evidence.
        if mandatory_seen {
            all_mandatory_exact
        } else {
            any_exact
        }
    };

    BlockResult {
        block_id: block.id.clone(),
        mandatory: block.mandatory,
        mandatory_satisfied,
        score,
        signals,
    }
}

fn derive_status(
    blocks: &[BlockResult],
    archetype_score: f32,
    thresholds: &rulebook::StatusThresholds,
) -> ComplianceStatus {
    let starved_mandatory = blocks
        .iter()
        .any(|b| b.mandatory && !b.mandatory_satisfied && b.score < thresholds.low_evidence_max);
    if starved_mandatory || archetype_score < thresholds.low_evidence_max {
        return ComplianceStatus::NonCompliant;
    }

    let all_mandatory_ok = blocks
        .iter()
        .filter(|b| b.mandatory)
        .all(|b| b.mandatory_satisfied);
    if all_mandatory_ok && archetype_score >= thresholds.compliant_min {
        return ComplianceStatus::Compliant;
    }

    ComplianceStatus::Partial
}
