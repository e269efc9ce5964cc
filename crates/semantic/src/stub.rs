use fxhash::hash64;

use crate::{EntailmentPair, EntailmentScorer, SemanticError};

/// Deterministic stub used when mode is `"stub"` or no real endpoint is
/// configured. Derives a confidence from a hash of the pair text so runs
/// are reproducible with zero model cost. Useful for tests, demos, and
/// air-gapped deployments where semantic matching is effectively off.
#[derive(Debug, Default, Clone)]
pub struct StubScorer;

impl StubScorer {
    fn confidence(pair: &EntailmentPair) -> f32 {
        let mut seed = Vec::with_capacity(pair.premise.len() + pair.hypothesis.len() + 1);
        seed.extend_from_slice(pair.premise.as_bytes());
        seed.push(0);
        seed.extend_from_slice(pair.hypothesis.as_bytes());
        let h = hash64(&seed);
        (h % 10_000) as f32 / 10_000.0
    }
}

impl EntailmentScorer for StubScorer {
    fn score_batch(&self, pairs: &[EntailmentPair]) -> Result<Vec<f32>, SemanticError> {
        Ok(pairs.iter().map(Self::confidence).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(premise: &str, hypothesis: &str) -> EntailmentPair {
        EntailmentPair {
            premise: premise.into(),
            hypothesis: hypothesis.into(),
        }
    }

    #[test]
    fn stub_is_deterministic() {
        let scorer = StubScorer;
        let pairs = vec![pair("a sentence", "a requirement")];
        let a = scorer.score_batch(&pairs).unwrap();
        let b = scorer.score_batch(&pairs).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn stub_scores_are_in_unit_interval() {
        let scorer = StubScorer;
        let pairs: Vec<EntailmentPair> = (0..64)
            .map(|i| pair(&format!("sentence {i}"), "requirement"))
            .collect();
        for score in scorer.score_batch(&pairs).unwrap() {
            assert!((0.0..=1.0).contains(&score), "score {score} out of range");
        }
    }

    #[test]
    fn stub_distinguishes_premise_hypothesis_boundary() {
        // "ab" + "c" must not collide with "a" + "bc".
        let scorer = StubScorer;
        let scores = scorer
            .score_batch(&[pair("ab", "c"), pair("a", "bc")])
            .unwrap();
        assert_ne!(scores[0], scores[1]);
    }

    #[test]
    fn stub_batch_preserves_arity_and_order() {
        let scorer = StubScorer;
        let pairs = vec![pair("one", "x"), pair("two", "x"), pair("three", "x")];
        let scores = scorer.score_batch(&pairs).unwrap();
        assert_eq!(scores.len(), 3);
        let singles: Vec<f32> = pairs
            .iter()
            .map(|p| scorer.score_batch(std::slice::from_ref(p)).unwrap()[0])
            .collect();
        assert_eq!(scores, singles);
    }
}
