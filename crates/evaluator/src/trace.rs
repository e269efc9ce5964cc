//! Debug trace emitter.
//!
//! A trace is a read-only projection over the match decisions of one
//! evaluation run. It exists purely for human auditing: the engine
//! appends entries as it decides, and nothing downstream of scoring ever
//! reads them back. Disabling tracing must not change a single score.

use serde::{Deserialize, Serialize};

use crate::types::MatchMethod;

/// One decision record for a signal (or a stage-level note).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceEntry {
    pub archetype_id: String,
    pub block_id: String,
    pub signal_id: String,
    /// Sentence the decision refers to, when one was in play.
    pub sentence_index: Option<usize>,
    pub method: MatchMethod,
    pub raw_score: f32,
    pub applied_score: f32,
    /// Human-readable accept/reject rationale.
    pub note: String,
}

/// Collects trace entries when enabled; a disabled recorder is free.
#[derive(Debug, Default)]
pub(crate) struct TraceRecorder {
    enabled: bool,
    entries: Vec<TraceEntry>,
}

impl TraceRecorder {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, entry: TraceEntry) {
        if self.enabled {
            self.entries.push(entry);
        }
    }

    pub(crate) fn into_entries(self) -> Option<Vec<TraceEntry>> {
        if self.enabled {
            Some(self.entries)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(note: &str) -> TraceEntry {
        TraceEntry {
            archetype_id: "a".into(),
            block_id: "b".into(),
            signal_id: "s".into(),
            sentence_index: Some(0),
            method: MatchMethod::Exact,
            raw_score: 1.0,
            applied_score: 1.0,
            note: note.into(),
        }
    }

    #[test]
    fn disabled_recorder_collects_nothing() {
        let mut recorder = TraceRecorder::new(false);
        recorder.push(entry("ignored"));
        assert!(recorder.into_entries().is_none());
    }

    #[test]
    fn enabled_recorder_preserves_order() {
        let mut recorder = TraceRecorder::new(true);
        recorder.push(entry("first"));
        recorder.push(entry("second"));
        let entries = recorder.into_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].note, "first");
        assert_eq!(entries[1].note, "second");
    }
}
