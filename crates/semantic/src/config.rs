use serde::{Deserialize, Serialize};

/// Runtime configuration selecting and tuning an entailment scorer.
///
/// # Example
/// ```
/// use semantic::{build_scorer, ScorerConfig};
///
/// let cfg = ScorerConfig {
///     mode: "stub".into(),
///     ..Default::default()
/// };
/// let scorer = build_scorer(&cfg).expect("stub scorer always builds");
/// drop(scorer);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScorerConfig {
    /// Scorer selector: `"stub"` (deterministic, offline) or `"api"`
    /// (remote HTTP NLI endpoint).
    pub mode: String,
    /// Friendly model label forwarded to the endpoint and recorded in traces.
    pub model_name: String,
    /// Inference endpoint when [`mode`](Self::mode) is `"api"`.
    pub api_url: Option<String>,
    /// Authorization header value (e.g., `"Bearer hf_xxx"`).
    pub api_auth_header: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            mode: "stub".into(),
            model_name: "nli-deberta-v3-small".into(),
            api_url: None,
            api_auth_header: None,
            timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let cfg = ScorerConfig::default();
        assert_eq!(cfg.mode, "stub");
        assert_eq!(cfg.model_name, "nli-deberta-v3-small");
        assert!(cfg.api_url.is_none());
        assert!(cfg.api_auth_header.is_none());
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = ScorerConfig {
            mode: "api".into(),
            api_url: Some("https://nli.example.com/score".into()),
            api_auth_header: Some("Bearer token".into()),
            timeout_secs: 5,
            ..Default::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ScorerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
