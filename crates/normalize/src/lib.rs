//! # Compliance Normalizer (`normalize`)
//!
//! Canonicalizes raw document text and rule-signal text into comparable
//! stemmed token sequences. The exact-match layer in `evaluator` compares
//! token sets, so both sides of every comparison **must** go through the
//! same [`tokenize_and_stem`] call with the same [`NormalizeConfig`] —
//! any divergence breaks the overlap contract.
//!
//! The pipeline is:
//!
//! 1. Unicode NFKC normalization (optional, on by default)
//! 2. Lowercasing
//! 3. Hyphens and non-alphanumeric characters become spaces
//! 4. Whitespace tokenization
//! 5. Short-token and stop-token filtering
//! 6. Snowball (Porter-style) suffix stripping
//!
//! So `"Procurement committee roles are clearly defined"` and the signal
//! pattern `"roles defined"` land on overlapping stems (`role`, `defin`)
//! regardless of word order or morphology.
//!
//! Empty input is not an error: it normalizes to an empty token sequence.

mod config;
mod document;
mod stopwords;
mod text;

pub use crate::config::NormalizeConfig;
pub use crate::document::{Document, Sentence};
pub use crate::stopwords::is_stop_token;
pub use crate::text::{normalize_text, split_sentences, tokenize_and_stem};
