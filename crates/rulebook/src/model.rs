use serde::{Deserialize, Serialize};

use normalize::{tokenize_and_stem, NormalizeConfig};

use crate::error::ConfigurationError;

/// An atomic piece of expected textual evidence.
///
/// `tokens` is the normalized form of `pattern` and is populated during
/// [`Rulebook::new`]; loaders deserializing from JSON may leave it empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Signal {
    pub id: String,
    /// Human-authored phrase the document is expected to evidence.
    pub pattern: String,
    /// Normalized token form of `pattern`, computed at validation time.
    #[serde(default)]
    pub tokens: Vec<String>,
    /// Whether this signal participates in the mandatory safeguard of its block.
    #[serde(default)]
    pub mandatory: bool,
    /// Relative weight within the block's aggregate score.
    #[serde(default = "default_weight")]
    pub weight: f32,
}

impl Signal {
    pub fn new(id: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pattern: pattern.into(),
            tokens: Vec::new(),
            mandatory: false,
            weight: 1.0,
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }
}

/// A logical group of related signals within an archetype.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    pub id: String,
    /// Mandatory blocks are subject to the exact-evidence safeguard.
    #[serde(default)]
    pub mandatory: bool,
    /// Relative weight within the archetype's aggregate score.
    #[serde(default = "default_weight")]
    pub weight: f32,
    pub signals: Vec<Signal>,
}

impl Block {
    pub fn new(id: impl Into<String>, signals: Vec<Signal>) -> Self {
        Self {
            id: id.into(),
            mandatory: false,
            weight: 1.0,
            signals,
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    /// Signals flagged mandatory within this block.
    pub fn mandatory_signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter().filter(|s| s.mandatory)
    }
}

/// Score cutoffs separating the three compliance statuses.
///
/// These are configuration, not logic: the evaluator reads them off the
/// archetype rather than hardcoding a single scheme.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StatusThresholds {
    /// Minimum aggregate score for COMPLIANT when every mandatory block
    /// is satisfied.
    #[serde(default = "StatusThresholds::default_compliant_min")]
    pub compliant_min: f32,
    /// Scores below this are treated as "no meaningful evidence" and
    /// force NON_COMPLIANT.
    #[serde(default = "StatusThresholds::default_low_evidence_max")]
    pub low_evidence_max: f32,
}

impl StatusThresholds {
    fn default_compliant_min() -> f32 {
        0.70
    }

    fn default_low_evidence_max() -> f32 {
        0.10
    }
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            compliant_min: Self::default_compliant_min(),
            low_evidence_max: Self::default_low_evidence_max(),
        }
    }
}

/// A top-level compliance requirement category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Archetype {
    pub id: String,
    /// Human-readable requirement title for reports.
    #[serde(default)]
    pub title: String,
    /// Optional one-line statement of the requirement's intent, surfaced
    /// to downstream report and suggestion collaborators.
    #[serde(default)]
    pub intent: Option<String>,
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub thresholds: StatusThresholds,
}

impl Archetype {
    pub fn new(id: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            intent: None,
            blocks,
            thresholds: StatusThresholds::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn with_thresholds(mut self, thresholds: StatusThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

/// Immutable, validated rulebook: the single input the evaluator trusts.
///
/// Construction is the only place validation happens; once a `Rulebook`
/// exists, every signal is guaranteed to have at least one normalized
/// token and every block at least one signal. The value is safe to share
/// read-only across concurrent evaluations (e.g., behind an `Arc`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawRulebook")]
pub struct Rulebook {
    archetypes: Vec<Archetype>,
    normalize: NormalizeConfig,
}

/// Unvalidated mirror of [`Rulebook`] used only during deserialization.
/// Conversion runs the same validation as [`Rulebook::new`], so a
/// malformed serialized rulebook cannot sidestep it.
#[derive(Deserialize)]
struct RawRulebook {
    archetypes: Vec<Archetype>,
    #[serde(default)]
    normalize: NormalizeConfig,
}

impl TryFrom<RawRulebook> for Rulebook {
    type Error = ConfigurationError;

    fn try_from(raw: RawRulebook) -> Result<Self, Self::Error> {
        Rulebook::with_config(raw.archetypes, raw.normalize)
    }
}

impl Rulebook {
    /// Validate the archetype tree and normalize every signal pattern.
    pub fn new(archetypes: Vec<Archetype>) -> Result<Self, ConfigurationError> {
        Self::with_config(archetypes, NormalizeConfig::default())
    }

    /// As [`Rulebook::new`] but with an explicit normalization config.
    /// The same config must be used to build the documents being scored.
    pub fn with_config(
        mut archetypes: Vec<Archetype>,
        normalize: NormalizeConfig,
    ) -> Result<Self, ConfigurationError> {
        if archetypes.is_empty() {
            return Err(ConfigurationError::EmptyRulebook);
        }

        let mut seen = std::collections::HashSet::new();
        for archetype in &mut archetypes {
            check_id(&archetype.id)?;
            if !seen.insert(archetype.id.clone()) {
                return Err(ConfigurationError::DuplicateId(archetype.id.clone()));
            }
            check_thresholds(archetype)?;
            if archetype.blocks.is_empty() {
                return Err(ConfigurationError::EmptyArchetype(archetype.id.clone()));
            }
            for block in &mut archetype.blocks {
                check_id(&block.id)?;
                check_weight(&block.id, block.weight)?;
                if block.signals.is_empty() {
                    return Err(ConfigurationError::EmptyBlock {
                        archetype: archetype.id.clone(),
                        block: block.id.clone(),
                    });
                }
                for signal in &mut block.signals {
                    check_id(&signal.id)?;
                    check_weight(&signal.id, signal.weight)?;
                    signal.tokens = tokenize_and_stem(&signal.pattern, &normalize);
                    if signal.tokens.is_empty() {
                        return Err(ConfigurationError::UnmatchableSignal {
                            block: block.id.clone(),
                            signal: signal.id.clone(),
                            pattern: signal.pattern.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            archetypes,
            normalize,
        })
    }

    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    /// The normalization config signals were tokenized with. Documents
    /// evaluated against this rulebook must use the same config.
    pub fn normalize_config(&self) -> &NormalizeConfig {
        &self.normalize
    }
}

fn default_weight() -> f32 {
    1.0
}

fn check_id(id: &str) -> Result<(), ConfigurationError> {
    if id.trim().is_empty() {
        return Err(ConfigurationError::EmptyId);
    }
    Ok(())
}

fn check_weight(id: &str, weight: f32) -> Result<(), ConfigurationError> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(ConfigurationError::InvalidWeight {
            id: id.to_string(),
            weight,
        });
    }
    Ok(())
}

fn check_thresholds(archetype: &Archetype) -> Result<(), ConfigurationError> {
    let t = archetype.thresholds;
    let in_range = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
    if !in_range(t.compliant_min) || !in_range(t.low_evidence_max) {
        return Err(ConfigurationError::InvalidThresholds {
            archetype: archetype.id.clone(),
            reason: format!(
                "cutoffs must lie in [0, 1], got compliant_min={} low_evidence_max={}",
                t.compliant_min, t.low_evidence_max
            ),
        });
    }
    if t.low_evidence_max > t.compliant_min {
        return Err(ConfigurationError::InvalidThresholds {
            archetype: archetype.id.clone(),
            reason: "low_evidence_max must not exceed compliant_min".into(),
        });
    }
    Ok(())
}
