//! # Compliance Rulebook (`rulebook`)
//!
//! Strongly-typed, immutable representation of a structured rulebook:
//! archetypes → blocks → signals, each with its thresholds, weights, and
//! mandatory flags.
//!
//! The on-disk rule definition is parsed by an external loader; this
//! crate only defines the loader's output type and the validation that
//! stands between raw data and the evaluator. Validation happens exactly
//! once, in [`Rulebook::new`] (or [`Rulebook::with_config`]), which also
//! normalizes every signal pattern into its token form so evaluation
//! never re-tokenizes rule text.
//!
//! ```
//! use rulebook::{Archetype, Block, Rulebook, Signal};
//!
//! let rulebook = Rulebook::new(vec![Archetype::new(
//!     "POLICY_PROCEDURE",
//!     vec![Block::new(
//!         "roles",
//!         vec![Signal::new("roles-defined", "roles defined").mandatory()],
//!     )
//!     .mandatory()],
//! )])
//! .expect("rulebook is well-formed");
//!
//! assert_eq!(rulebook.archetypes().len(), 1);
//! ```

mod error;
mod model;

pub use crate::error::ConfigurationError;
pub use crate::model::{Archetype, Block, Rulebook, Signal, StatusThresholds};
