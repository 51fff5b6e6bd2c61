//! # Landlord Engine
//!
//! Decides, for a stream of container software specifications, whether each one
//! can reuse an environment that was already built, should be merged into one,
//! or needs a brand-new build.
//!
//! ## Features
//!
//! - **Containment reuse** - an existing superset environment is always preferred
//! - **Similarity merge** - Jaccard distance over namespaced requirement tokens
//! - **Pin safety** - never merge two specs that pin one package to different versions
//! - **Running counters** - build/merge/reuse totals with periodic samples
//!
//! ## Architecture
//!
//! ```text
//! ContainerSpec (apt / pip / conda)
//!     │
//!     ├──> Tokenizer
//!     │      └─ tag each requirement with its namespace (a/p/c)
//!     │
//!     ├──> Consolidation Engine (scan known specs in insertion order)
//!     │      ├─ subset of an entry?        -> Reuse (stop)
//!     │      ├─ distance <= threshold
//!     │      │   and pins compatible?      -> best merge candidate
//!     │      └─ end of scan                -> Merge into best, or Build
//!     │
//!     └──> ConsolidationStats
//!            └─ processed / builds / merges / reuses + samples
//! ```
//!
//! The engine is single-writer: `decide` takes `&mut self` and runs the whole
//! scan plus mutation before returning.

mod config;
mod engine;
mod error;
mod normalize;
mod requirement;
mod spec;
mod stats;
mod token;

pub use config::{EngineConfig, Settings, DEFAULT_SAMPLE_EVERY, DEFAULT_SIMILARITY_THRESHOLD};
pub use engine::{ConsolidationEngine, Decision, DecisionKind};
pub use error::{EngineError, Result};
pub use normalize::{normalize_field, normalize_optional};
pub use requirement::{Requirement, PIN_SEPARATOR};
pub use spec::{ContainerSpec, Namespace};
pub use stats::{ConsolidationStats, Sample};
pub use token::{is_compatible, jaccard_distance, tokenize, Token, TokenSet};
