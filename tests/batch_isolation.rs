//! Batch evaluation: fault isolation, degraded semantic mode, and the
//! report mapping consumed downstream.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rulescore::{
    evaluate, evaluate_batch, Archetype, Block, ComplianceStatus, Document, EntailmentPair,
    EntailmentScorer, EvalOptions, MatchMethod, Rulebook, SemanticError, Signal,
};

struct FailScorer;

impl EntailmentScorer for FailScorer {
    fn score_batch(&self, _pairs: &[EntailmentPair]) -> Result<Vec<f32>, SemanticError> {
        Err(SemanticError::Http("endpoint unreachable".into()))
    }
}

/// Panics on the n-th invocation, succeeds otherwise.
struct FlakyScorer {
    calls: AtomicUsize,
    panic_on: usize,
}

impl EntailmentScorer for FlakyScorer {
    fn score_batch(&self, pairs: &[EntailmentPair]) -> Result<Vec<f32>, SemanticError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == self.panic_on {
            panic!("scorer crashed");
        }
        Ok(vec![0.9; pairs.len()])
    }
}

fn rulebook() -> Arc<Rulebook> {
    Arc::new(
        Rulebook::new(vec![Archetype::new(
            "POLICY_PROCEDURE",
            vec![Block::new(
                "governance",
                vec![Signal::new("roles-defined", "roles defined").mandatory()],
            )
            .mandatory()],
        )])
        .unwrap(),
    )
}

#[test]
fn scorer_outage_degrades_instead_of_failing_the_document() {
    let rb = rulebook();
    let document = Document::from_text(
        "doc-1",
        "Unrelated wording with no lexical overlap at all.",
        rb.normalize_config(),
    );
    let options = EvalOptions {
        trace: true,
        ..Default::default()
    };

    let result = evaluate(rb, &document, &options, Some(Arc::new(FailScorer))).unwrap();

    let m = &result.archetypes[0].blocks[0].signals[0];
    assert_eq!(m.method, MatchMethod::None);
    assert_eq!(m.applied_score, 0.0);
    assert_eq!(result.archetypes[0].status, ComplianceStatus::NonCompliant);
    assert!(result
        .trace
        .unwrap()
        .iter()
        .any(|e| e.note.contains("scorer error")));
}

#[test]
fn one_panicking_document_does_not_poison_the_batch() {
    let rb = rulebook();
    // Only the middle document lacks exact evidence, so only it reaches
    // the scorer; that single call panics.
    let documents = vec![
        Document::from_text("doc-0", "Roles are defined.", rb.normalize_config()),
        Document::from_text("doc-1", "Nothing relevant here.", rb.normalize_config()),
        Document::from_text("doc-2", "Roles are defined.", rb.normalize_config()),
    ];
    let scorer = Arc::new(FlakyScorer {
        calls: AtomicUsize::new(0),
        panic_on: 0,
    });

    let outcomes = evaluate_batch(rb, &documents, &EvalOptions::default(), Some(scorer), 1);

    assert!(outcomes[0].outcome.is_ok());
    assert!(outcomes[1].outcome.is_err());
    assert!(outcomes[2].outcome.is_ok());
    assert_eq!(outcomes[1].doc_id, "doc-1");
}

#[test]
fn batch_runs_every_document_under_parallel_workers() {
    let rb = rulebook();
    let documents: Vec<Document> = (0..32)
        .map(|i| {
            Document::from_text(
                &format!("doc-{i}"),
                "Roles are defined in the procurement manual.",
                rb.normalize_config(),
            )
        })
        .collect();

    let outcomes = evaluate_batch(rb, &documents, &EvalOptions::default(), None, 8);

    assert_eq!(outcomes.len(), 32);
    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.doc_id, format!("doc-{i}"));
        let result = outcome.outcome.as_ref().unwrap();
        assert_eq!(result.archetypes[0].status, ComplianceStatus::Compliant);
    }
}

#[test]
fn report_value_nests_archetype_block_signal() {
    let rb = rulebook();
    let document = Document::from_text(
        "doc-report",
        "Procurement committee roles are clearly defined.",
        rb.normalize_config(),
    );

    let result = evaluate(rb, &document, &EvalOptions::default(), None).unwrap();
    let report = result.to_report_value();

    assert_eq!(report["doc_id"], "doc-report");
    let signal =
        &report["archetypes"]["POLICY_PROCEDURE"]["blocks"]["governance"]["signals"]["roles-defined"];
    assert_eq!(signal["method"], "EXACT");
    assert_eq!(signal["matched_sentence"], 0);
    assert!(signal["raw_score"].as_f64().unwrap() >= 0.60);

    // Trace is opt-in and absent from serialized results by default.
    let serialized = serde_json::to_value(&result).unwrap();
    assert!(serialized.get("trace").is_none());
}
