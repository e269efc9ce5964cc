//! Exact lexical matching: token-set overlap between a signal and each
//! candidate sentence.

use std::collections::HashSet;

use normalize::Sentence;

/// Best exact candidate for one signal across a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ExactCandidate {
    pub sentence_index: usize,
    pub ratio: f32,
}

/// Overlap ratio between a signal's tokens and a sentence's tokens.
///
/// The denominator is the signal's distinct token count, never the
/// sentence's, so long sentences cannot dilute the score. Duplicates
/// count once; order never matters. Returns a value in `[0, 1]`; an
/// empty signal yields 0 (the rulebook rejects those at load time, but
/// the function stays total).
pub fn exact_overlap(signal_tokens: &[String], sentence_tokens: &[String]) -> f32 {
    let signal: HashSet<&str> = signal_tokens.iter().map(String::as_str).collect();
    if signal.is_empty() {
        return 0.0;
    }
    let sentence: HashSet<&str> = sentence_tokens.iter().map(String::as_str).collect();
    let overlap = signal.intersection(&sentence).count();
    overlap as f32 / signal.len() as f32
}

/// Scan every sentence and return the best-overlap candidate, ties broken
/// by earliest sentence index. `None` only for empty documents.
pub(crate) fn best_exact_candidate(
    signal_tokens: &[String],
    sentences: &[Sentence],
) -> Option<ExactCandidate> {
    let mut best: Option<ExactCandidate> = None;
    for sentence in sentences {
        let ratio = exact_overlap(signal_tokens, &sentence.tokens);
        // Strict comparison keeps the earliest sentence on ties.
        if best.map_or(true, |b| ratio > b.ratio) {
            best = Some(ExactCandidate {
                sentence_index: sentence.index,
                ratio,
            });
        }
    }
    best
}
