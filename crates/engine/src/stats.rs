use crate::engine::{Decision, DecisionKind};
use serde::{Deserialize, Serialize};

/// Counter values captured at one sampling point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub requests: usize,
    pub builds: usize,
    pub merges: usize,
}

/// Running counters over a stream of decisions.
///
/// `builds + merges + reuses == processed` holds after every [`ConsolidationStats::record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationStats {
    pub processed: usize,
    pub builds: usize,
    pub merges: usize,
    pub reuses: usize,

    /// Number of processed specs between samples
    pub sample_every: usize,

    /// Sampled series, starting with the all-zero origin
    pub samples: Vec<Sample>,
}

impl ConsolidationStats {
    /// `sample_every` of zero disables sampling beyond the origin
    pub fn new(sample_every: usize) -> Self {
        Self {
            processed: 0,
            builds: 0,
            merges: 0,
            reuses: 0,
            sample_every,
            samples: vec![Sample {
                requests: 0,
                builds: 0,
                merges: 0,
            }],
        }
    }

    /// Count one decision. Returns the new sample when this record crossed a sampling point.
    pub fn record(&mut self, decision: &Decision) -> Option<Sample> {
        self.processed += 1;
        match decision.kind() {
            DecisionKind::Build => self.builds += 1,
            DecisionKind::Merge => self.merges += 1,
            DecisionKind::Reuse => self.reuses += 1,
        }

        if self.sample_every == 0 || self.processed % self.sample_every != 0 {
            return None;
        }
        let sample = self.snapshot();
        self.samples.push(sample);
        Some(sample)
    }

    pub fn snapshot(&self) -> Sample {
        Sample {
            requests: self.processed,
            builds: self.builds,
            merges: self.merges,
        }
    }
}

impl Default for ConsolidationStats {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SAMPLE_EVERY)
    }
}
