use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Fixed stop-token set applied before stemming.
///
/// Purely grammatical words only. Domain words that carry compliance
/// meaning ("procedure", "documented", "plan") are deliberately *not*
/// listed here: a rule signal may consist entirely of such words, and
/// stripping them would make the signal pattern normalize to nothing.
static STOP_TOKENS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "but", "because", "what", "when", "where", "how", "who", "which", "this",
        "that", "these", "those", "then", "just", "than", "such", "both", "through", "about",
        "for", "while", "during", "with", "are", "was", "were", "been", "being", "have", "has",
        "had", "will", "shall", "should", "would", "could", "may", "might", "must", "can", "not",
        "nor", "any", "all", "each", "its", "their", "there", "here", "into", "onto", "upon",
        "from", "also",
    ]
    .into_iter()
    .collect()
});

/// Whether a lowercased, unstemmed token is in the fixed stop set.
pub fn is_stop_token(token: &str) -> bool {
    STOP_TOKENS.contains(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammatical_words_are_stopped() {
        assert!(is_stop_token("the"));
        assert!(is_stop_token("through"));
        assert!(is_stop_token("should"));
    }

    #[test]
    fn domain_words_are_kept() {
        assert!(!is_stop_token("procedure"));
        assert!(!is_stop_token("documented"));
        assert!(!is_stop_token("committee"));
        assert!(!is_stop_token("plan"));
    }
}
