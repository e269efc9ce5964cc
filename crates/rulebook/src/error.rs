use thiserror::Error;

/// Validation failures raised while constructing a [`Rulebook`](crate::Rulebook).
///
/// A malformed rulebook never reaches the evaluator: every variant here is
/// a load-time rejection, not a runtime condition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("rulebook contains no archetypes")]
    EmptyRulebook,
    #[error("archetype '{0}' contains no blocks")]
    EmptyArchetype(String),
    #[error("block '{block}' in archetype '{archetype}' contains no signals")]
    EmptyBlock { archetype: String, block: String },
    #[error("signal '{signal}' in block '{block}' normalizes to zero tokens: {pattern:?}")]
    UnmatchableSignal {
        block: String,
        signal: String,
        pattern: String,
    },
    #[error("duplicate identifier '{0}'")]
    DuplicateId(String),
    #[error("invalid weight {weight} on '{id}': weights must be finite and positive")]
    InvalidWeight { id: String, weight: f32 },
    #[error("invalid status thresholds on archetype '{archetype}': {reason}")]
    InvalidThresholds { archetype: String, reason: String },
    #[error("identifier must not be empty")]
    EmptyId,
}
