use once_cell::sync::Lazy;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::NormalizeConfig;
use crate::stopwords::is_stop_token;

static STEMMER: Lazy<Stemmer> = Lazy::new(|| Stemmer::create(Algorithm::English));

/// Lowercase, map hyphens and non-alphanumeric characters to spaces.
///
/// This is the character-level half of the normalization contract; it
/// does not tokenize, filter, or stem. NFKC and lowercasing honor the
/// config flags so callers that need byte-faithful text can opt out.
pub fn normalize_text(text: &str, cfg: &NormalizeConfig) -> String {
    if text.is_empty() {
        return String::new();
    }

    let nfkc: String;
    let source: &str = if cfg.normalize_unicode {
        nfkc = text.nfkc().collect();
        &nfkc
    } else {
        text
    };

    let mut out = String::with_capacity(source.len());
    for ch in source.chars() {
        if ch.is_alphanumeric() {
            if cfg.lowercase {
                for lower in ch.to_lowercase() {
                    out.push(lower);
                }
            } else {
                out.push(ch);
            }
        } else {
            // Hyphens, punctuation, and all other noise become spaces so
            // "well-defined" splits into two tokens.
            out.push(' ');
        }
    }
    out
}

/// Normalize text into the stemmed token sequence used for overlap
/// matching. Empty or all-noise input yields an empty vector.
pub fn tokenize_and_stem(text: &str, cfg: &NormalizeConfig) -> Vec<String> {
    let normalized = normalize_text(text, cfg);
    normalized
        .unicode_words()
        .filter(|t| t.chars().count() >= cfg.min_token_len)
        .filter(|t| !cfg.filter_stop_tokens || !is_stop_token(t))
        .map(|t| {
            if cfg.stem {
                STEMMER.stem(t).into_owned()
            } else {
                t.to_string()
            }
        })
        .collect()
}

/// Split raw text into sentences on period and newline boundaries,
/// preserving original casing. Empty fragments are dropped.
pub fn split_sentences(raw_text: &str) -> Vec<String> {
    raw_text
        .split(['.', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> NormalizeConfig {
        NormalizeConfig::default()
    }

    #[test]
    fn normalize_lowercases_and_strips_punctuation() {
        let out = normalize_text("Well-Defined Roles!", &cfg());
        assert_eq!(out, "well defined roles ");
    }

    #[test]
    fn normalize_empty_input() {
        assert_eq!(normalize_text("", &cfg()), "");
    }

    #[test]
    fn nfkc_folds_equivalent_forms() {
        let composed = normalize_text("Caf\u{00E9}", &cfg());
        let decomposed = normalize_text("Cafe\u{0301}", &cfg());
        assert_eq!(composed, decomposed);
    }

    #[test]
    fn tokenize_drops_short_and_stop_tokens() {
        let tokens = tokenize_and_stem("the roles of a committee", &cfg());
        // "the" is a stop token, "of" and "a" are below min_token_len.
        assert_eq!(tokens, vec!["role", "committe"]);
    }

    #[test]
    fn morphological_variants_share_stems() {
        let a = tokenize_and_stem("roles defined", &cfg());
        let b = tokenize_and_stem("clearly defining the role", &cfg());
        for stem in &a {
            assert!(b.contains(stem), "missing stem {stem} in {b:?}");
        }
    }

    #[test]
    fn tokenize_empty_input_is_empty_not_error() {
        assert!(tokenize_and_stem("", &cfg()).is_empty());
        assert!(tokenize_and_stem("  \t \n ", &cfg()).is_empty());
        assert!(tokenize_and_stem("a of is", &cfg()).is_empty());
    }

    #[test]
    fn stemming_can_be_disabled() {
        let cfg = NormalizeConfig {
            stem: false,
            ..Default::default()
        };
        let tokens = tokenize_and_stem("roles defined", &cfg);
        assert_eq!(tokens, vec!["roles", "defined"]);
    }

    #[test]
    fn split_sentences_on_periods_and_newlines() {
        let sentences = split_sentences("First rule. Second rule\nThird rule.");
        assert_eq!(sentences, vec!["First rule", "Second rule", "Third rule"]);
    }

    #[test]
    fn split_sentences_drops_empty_fragments() {
        let sentences = split_sentences("...\n\n One sentence ..\n");
        assert_eq!(sentences, vec!["One sentence"]);
    }

    #[test]
    fn split_sentences_empty_text() {
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn tokenization_is_deterministic() {
        let a = tokenize_and_stem("Procurement committee roles are clearly defined", &cfg());
        let b = tokenize_and_stem("Procurement committee roles are clearly defined", &cfg());
        assert_eq!(a, b);
    }
}
