//! Configuration for the normalization pipeline.
//!
//! The `version` field exists for the same reason it does in any
//! deterministic text pipeline: any behavior change (including bug fixes
//! to the stop list or stemmer choice) must bump it, so that results
//! produced under different normalization rules are never compared as if
//! they were equivalent.

use serde::{Deserialize, Serialize};

/// Controls how raw text is turned into stemmed tokens.
///
/// Designed to be cheap to clone and serde-friendly so it can be embedded
/// in higher-level evaluation configs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizeConfig {
    /// Semantic version of the normalization behavior. Must be >= 1.
    pub version: u32,
    /// Apply Unicode NFKC normalization before any other transform.
    pub normalize_unicode: bool,
    /// Apply locale-free lowercasing.
    pub lowercase: bool,
    /// Drop tokens shorter than this many characters. The reference value
    /// of 3 removes most grammatical noise ("a", "of", "is") cheaply.
    pub min_token_len: usize,
    /// Drop tokens present in the fixed stop-token set.
    pub filter_stop_tokens: bool,
    /// Apply Snowball English suffix stripping after filtering.
    pub stem: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            normalize_unicode: true,
            lowercase: true,
            min_token_len: 3,
            filter_stop_tokens: true,
            stem: true,
        }
    }
}
