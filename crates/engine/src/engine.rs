use crate::config::EngineConfig;
use crate::spec::ContainerSpec;
use crate::stats::ConsolidationStats;
use crate::token::{is_compatible, jaccard_distance, tokenize, TokenSet};
use serde::Serialize;

/// Outcome of [`ConsolidationEngine::decide`]; `index` points into [`ConsolidationEngine::specs`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// An existing entry already contains every requirement
    Reuse { index: usize },

    /// The incoming spec was absorbed into an existing entry
    Merge { index: usize, distance: f64 },

    /// The incoming spec was appended as a new entry
    Build { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Reuse,
    Merge,
    Build,
}

impl Decision {
    pub fn kind(&self) -> DecisionKind {
        match self {
            Decision::Reuse { .. } => DecisionKind::Reuse,
            Decision::Merge { .. } => DecisionKind::Merge,
            Decision::Build { .. } => DecisionKind::Build,
        }
    }

    pub fn index(&self) -> usize {
        match *self {
            Decision::Reuse { index } | Decision::Merge { index, .. } | Decision::Build { index } => {
                index
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct MergeCandidate {
    index: usize,
    distance: f64,
}

/// Owns the known container specs and decides reuse/merge/build for each incoming one.
///
/// Entries are only ever appended (build) or merged into in place; their order is
/// insertion order and drives tie-breaking between equally good merge targets.
#[derive(Debug, Clone, Default)]
pub struct ConsolidationEngine {
    config: EngineConfig,
    specs: Vec<ContainerSpec>,
    /// Token view of `specs`, index-aligned
    tokens: Vec<TokenSet>,
}

impl ConsolidationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            specs: Vec::new(),
            tokens: Vec::new(),
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Known specs in insertion order
    pub fn specs(&self) -> &[ContainerSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn into_specs(self) -> Vec<ContainerSpec> {
        self.specs
    }

    /// Decide what to do with `incoming` and apply it.
    ///
    /// Containment wins over similarity: the first entry whose tokens are a superset
    /// of `incoming` is reused without a full scan. Otherwise the compatible entry
    /// with the strictly lowest distance within the threshold absorbs `incoming`;
    /// failing that, `incoming` becomes a new entry.
    pub fn decide(&mut self, incoming: ContainerSpec) -> Decision {
        let incoming_tokens = tokenize(&incoming);
        let mut best: Option<MergeCandidate> = None;

        for (index, entry_tokens) in self.tokens.iter().enumerate() {
            if incoming_tokens.is_subset(entry_tokens) {
                log::debug!("reuse entry {index}");
                return Decision::Reuse { index };
            }

            let distance = jaccard_distance(entry_tokens, &incoming_tokens);
            if !self.config.admits(distance) {
                continue;
            }
            if !is_compatible(entry_tokens, &incoming_tokens) {
                log::debug!("entry {index} within threshold ({distance:.3}) but pins conflict");
                continue;
            }
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(MergeCandidate { index, distance });
            }
        }

        match best {
            Some(MergeCandidate { index, distance }) => {
                self.specs[index].merge_spec(&incoming);
                self.tokens[index] = tokenize(&self.specs[index]);
                log::debug!("merge into entry {index} (distance {distance:.3})");
                Decision::Merge { index, distance }
            }
            None => {
                let index = self.specs.len();
                self.specs.push(incoming);
                self.tokens.push(incoming_tokens);
                log::debug!("build entry {index}");
                Decision::Build { index }
            }
        }
    }

    /// [`Self::decide`] and count the outcome in `stats`
    pub fn process(&mut self, incoming: ContainerSpec, stats: &mut ConsolidationStats) -> Decision {
        let decision = self.decide(incoming);
        stats.record(&decision);
        decision
    }
}
