use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ScorerConfig;
use crate::{clamp_confidence, EntailmentPair, EntailmentScorer, SemanticError};

/// Request body for the remote NLI endpoint: one entry per pair, scored
/// in order.
#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    model: &'a str,
    pairs: &'a [EntailmentPair],
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    /// Entailment confidence per submitted pair, same order.
    scores: Vec<f32>,
}

/// HTTP client for a remote entailment (NLI cross-encoder) service.
///
/// One POST per batch; the endpoint returns an entailment confidence per
/// pair. Out-of-range confidences are clamped into `[0, 1]` here so
/// invalid model output never reaches aggregation.
pub struct ApiScorer {
    agent: ureq::Agent,
    url: String,
    auth_header: Option<String>,
    model_name: String,
}

impl ApiScorer {
    pub fn from_config(cfg: &ScorerConfig) -> Result<Self, SemanticError> {
        let url = cfg
            .api_url
            .clone()
            .ok_or_else(|| SemanticError::InvalidConfig("api mode requires api_url".into()))?;
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build();
        Ok(Self {
            agent,
            url,
            auth_header: cfg.api_auth_header.clone(),
            model_name: cfg.model_name.clone(),
        })
    }
}

impl EntailmentScorer for ApiScorer {
    fn score_batch(&self, pairs: &[EntailmentPair]) -> Result<Vec<f32>, SemanticError> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let body = ScoreRequest {
            model: &self.model_name,
            pairs,
        };
        let mut request = self.agent.post(&self.url);
        if let Some(auth) = &self.auth_header {
            request = request.set("Authorization", auth);
        }

        let response = request
            .send_json(&body)
            .map_err(|e| SemanticError::Http(e.to_string()))?;
        let parsed: ScoreResponse = response
            .into_json()
            .map_err(|e| SemanticError::BadResponse(e.to_string()))?;

        if parsed.scores.len() != pairs.len() {
            return Err(SemanticError::BadResponse(format!(
                "expected {} scores, got {}",
                pairs.len(),
                parsed.scores.len()
            )));
        }

        Ok(parsed
            .scores
            .into_iter()
            .map(|raw| {
                let clamped = clamp_confidence(raw);
                if clamped != raw {
                    warn!(raw, clamped, "out_of_range_confidence_clamped");
                }
                clamped
            })
            .collect())
    }
}
