use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default merge-eligibility cutoff: candidates must be at least 70% alike.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.3;

/// Default number of processed specs between two counter samples.
pub const DEFAULT_SAMPLE_EVERY: usize = 100;

/// Policy knobs for [`crate::ConsolidationEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EngineConfig {
    similarity_threshold: f64,
}

impl EngineConfig {
    pub fn new(similarity_threshold: f64) -> Result<Self> {
        if !similarity_threshold.is_finite() || !(0.0..=1.0).contains(&similarity_threshold) {
            return Err(EngineError::InvalidThreshold(similarity_threshold));
        }
        Ok(Self {
            similarity_threshold,
        })
    }

    /// Maximum Jaccard distance for an entry to be considered as a merge target
    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    /// Whether an entry at `distance` may be merged into.
    ///
    /// Inclusive, with slack for rounding: `1.0 - 7.0 / 10.0` lands just above `0.3`.
    pub fn admits(&self, distance: f64) -> bool {
        distance <= self.similarity_threshold + DISTANCE_TOLERANCE
    }
}

/// Rounding slack when comparing a Jaccard distance against the threshold
const DISTANCE_TOLERANCE: f64 = 1e-9;

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// Engine policy plus stream sampling cadence
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Settings {
    pub engine: EngineConfig,
    pub sample_every: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            sample_every: DEFAULT_SAMPLE_EVERY,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    similarity_threshold: Option<f64>,
    sample_every: Option<usize>,
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let settings = Self::from_bytes(&bytes).map_err(|err| match err {
            EngineError::ConfigParse(msg) => {
                EngineError::ConfigParse(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;
        log::info!(
            "Loaded config from {} (similarity_threshold={}, sample_every={})",
            path.display(),
            settings.engine.similarity_threshold(),
            settings.sample_every
        );
        Ok(settings)
    }

    /// Parse a JSON or TOML document; missing keys fall back to defaults
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw = parse_raw(bytes)?;
        Self::default().overlay(raw)
    }

    fn overlay(self, raw: RawSettings) -> Result<Self> {
        let engine = match raw.similarity_threshold {
            Some(threshold) => EngineConfig::new(threshold)?,
            None => self.engine,
        };
        let sample_every = raw.sample_every.unwrap_or(self.sample_every);
        Self::validated(engine, sample_every)
    }

    pub fn with_threshold(self, similarity_threshold: f64) -> Result<Self> {
        Ok(Self {
            engine: EngineConfig::new(similarity_threshold)?,
            ..self
        })
    }

    pub fn with_sample_every(self, sample_every: usize) -> Result<Self> {
        Self::validated(self.engine, sample_every)
    }

    fn validated(engine: EngineConfig, sample_every: usize) -> Result<Self> {
        if sample_every == 0 {
            return Err(EngineError::InvalidSampleInterval);
        }
        Ok(Self {
            engine,
            sample_every,
        })
    }
}

fn parse_raw(bytes: &[u8]) -> Result<RawSettings> {
    match serde_json::from_slice::<RawSettings>(bytes) {
        Ok(raw) => Ok(raw),
        Err(json_err) => {
            let utf8 = std::str::from_utf8(bytes)
                .map_err(|err| EngineError::ConfigParse(format!("{json_err}; {err}")))?;
            toml::from_str::<RawSettings>(utf8).map_err(|toml_err| {
                EngineError::ConfigParse(format!(
                    "not valid JSON ({json_err}) or TOML ({toml_err})"
                ))
            })
        }
    }
}
