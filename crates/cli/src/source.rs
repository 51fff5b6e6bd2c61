use anyhow::{Context as AnyhowContext, Result};
use landlord_engine::{normalize_field, ContainerSpec};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

/// apt package names accepted when `--strict-apt` is on (repo2docker's rule)
static APT_PACKAGE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9.+-]+$").expect("valid apt package regex"));

/// A package-list field as stored upstream: either the raw encoded text or an already-split list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawField {
    Text(String),
    List(Vec<String>),
}

impl RawField {
    fn into_list(self) -> Vec<String> {
        match self {
            RawField::Text(text) => normalize_field(&text),
            RawField::List(items) => items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawRecord {
    #[serde(default)]
    apt: Option<RawField>,
    #[serde(default)]
    pip: Option<RawField>,
    #[serde(default)]
    conda: Option<RawField>,
}

impl RawRecord {
    fn into_spec(self) -> ContainerSpec {
        let list = |field: Option<RawField>| field.map(RawField::into_list).unwrap_or_default();
        ContainerSpec::new(list(self.apt), list(self.pip), list(self.conda))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ReadOptions {
    /// Pass specs with no requirements at all to the engine
    pub keep_empty: bool,
    /// Reject records whose apt names fail [`APT_PACKAGE_NAME`]
    pub strict_apt: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SkipReason {
    Malformed(String),
    Empty,
    InvalidAptName(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Parsed {
    Spec(ContainerSpec),
    Skipped(SkipReason),
}

/// Parse one JSON Lines record. Blank lines return `None`.
pub(crate) fn parse_line(line: &str, options: ReadOptions) -> Option<Parsed> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(err) => return Some(Parsed::Skipped(SkipReason::Malformed(err.to_string()))),
    };
    if !value.is_object() {
        return Some(Parsed::Skipped(SkipReason::Malformed(
            "record is not a JSON object".to_string(),
        )));
    }
    let raw: RawRecord = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(err) => return Some(Parsed::Skipped(SkipReason::Malformed(err.to_string()))),
    };
    let spec = raw.into_spec();

    if !options.keep_empty && spec.is_empty() {
        return Some(Parsed::Skipped(SkipReason::Empty));
    }
    if options.strict_apt {
        if let Some(bad) = spec.apt.iter().find(|name| !APT_PACKAGE_NAME.is_match(name)) {
            return Some(Parsed::Skipped(SkipReason::InvalidAptName(bad.clone())));
        }
    }
    Some(Parsed::Spec(spec))
}

/// Line-by-line reader over a JSON Lines stream of spec records
pub(crate) struct RecordReader<R> {
    lines: Lines<BufReader<R>>,
    line_no: usize,
    options: ReadOptions,
}

impl<R: AsyncRead + Unpin> RecordReader<R> {
    pub(crate) fn new(reader: R, options: ReadOptions) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            line_no: 0,
            options,
        }
    }

    /// Line number of the last record returned (1-based)
    pub(crate) fn line_no(&self) -> usize {
        self.line_no
    }

    pub(crate) async fn next_record(&mut self) -> Result<Option<Parsed>> {
        while let Some(line) = self
            .lines
            .next_line()
            .await
            .with_context(|| format!("Failed to read input after line {}", self.line_no))?
        {
            self.line_no += 1;
            if let Some(parsed) = parse_line(&line, self.options) {
                return Ok(Some(parsed));
            }
        }
        Ok(None)
    }
}

pub(crate) type DynReader = Box<dyn AsyncRead + Unpin + Send>;

/// Open `path`, or stdin when no path (or `-`) is given
pub(crate) async fn open_input(path: Option<&Path>) -> Result<DynReader> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            Ok(Box::new(file))
        }
        _ => Ok(Box::new(tokio::io::stdin())),
    }
}
