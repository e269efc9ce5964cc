//! Optional metrics hook for evaluation runs.
//!
//! Install a recorder once at service startup; every
//! [`Evaluator`](crate::Evaluator) call then reports through it. No
//! recorder installed means no overhead beyond a lock read.

use std::sync::{Arc, OnceLock, RwLock};
use std::time::Duration;

/// Metrics observer for the evaluation pipeline.
pub trait EvalMetrics: Send + Sync {
    /// Called once per evaluated document.
    fn record_evaluation(&self, doc_id: &str, latency: Duration, archetypes: usize);
    /// Called when a semantic stage degrades (scorer error or budget).
    fn record_semantic_degraded(&self, doc_id: &str, reason: &str);
}

/// Install or clear the global metrics recorder.
pub fn set_eval_metrics(recorder: Option<Arc<dyn EvalMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn EvalMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn EvalMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn EvalMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}
