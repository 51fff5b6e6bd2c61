use crate::report::progress_line;
use crate::source::{Parsed, ReadOptions, RecordReader, SkipReason};
use anyhow::Result;
use landlord_engine::{ConsolidationEngine, ConsolidationStats, Settings};
use tokio::io::AsyncRead;

/// State left behind after replaying a stream
pub(crate) struct StreamOutcome {
    pub engine: ConsolidationEngine,
    pub stats: ConsolidationStats,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ReplayOptions {
    pub read: ReadOptions,
    /// Stop after this many specs reached the engine
    pub limit: Option<usize>,
}

/// Feed every record from `reader` to a fresh engine, strictly in arrival order.
pub(crate) async fn replay<R>(
    reader: R,
    settings: &Settings,
    options: ReplayOptions,
) -> Result<StreamOutcome>
where
    R: AsyncRead + Unpin,
{
    let mut engine = ConsolidationEngine::new(settings.engine);
    let mut stats = ConsolidationStats::new(settings.sample_every);
    let mut skipped = 0usize;
    let mut records = RecordReader::new(reader, options.read);

    while options.limit.map_or(true, |limit| stats.processed < limit) {
        let Some(parsed) = records.next_record().await? else {
            break;
        };
        let spec = match parsed {
            Parsed::Spec(spec) => spec,
            Parsed::Skipped(reason) => {
                skipped += 1;
                match reason {
                    SkipReason::Malformed(err) => {
                        log::warn!("Skipping malformed record at line {}: {err}", records.line_no())
                    }
                    SkipReason::InvalidAptName(name) => log::warn!(
                        "Skipping record at line {}: invalid apt package name {name:?}",
                        records.line_no()
                    ),
                    SkipReason::Empty => {
                        log::debug!("Skipping empty record at line {}", records.line_no())
                    }
                }
                continue;
            }
        };

        let decision = engine.decide(spec);
        if let Some(sample) = stats.record(&decision) {
            log::info!("{}", progress_line(&sample));
        }
    }

    log::info!(
        "Replayed {} specs: {} builds, {} merges, {} reuses ({} skipped, {} environments)",
        stats.processed,
        stats.builds,
        stats.merges,
        stats.reuses,
        skipped,
        engine.len()
    );

    Ok(StreamOutcome {
        engine,
        stats,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use landlord_engine::Decision;

    const STREAM: &str = r#"{"apt": "[git]", "pip": "[numpy==1.0]"}
{"apt": "[git]", "pip": "[numpy==1.0]"}
not json
{"apt": "None", "pip": "None", "conda": "None"}
{"pip": ["numpy==2.0"], "apt": ["git"]}
{"pip": ["numpy==1.0"]}
"#;

    #[tokio::test]
    async fn replays_reference_scenarios() {
        let outcome = replay(STREAM.as_bytes(), &Settings::default(), ReplayOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.stats.processed, 4);
        assert_eq!(outcome.stats.builds, 2);
        assert_eq!(outcome.stats.reuses, 2);
        assert_eq!(outcome.stats.merges, 0);
        assert_eq!(outcome.skipped, 2);
        assert_eq!(outcome.engine.len(), 2);
    }

    #[tokio::test]
    async fn limit_counts_processed_specs_only() {
        let options = ReplayOptions {
            limit: Some(3),
            ..Default::default()
        };
        let outcome = replay(STREAM.as_bytes(), &Settings::default(), options)
            .await
            .unwrap();

        assert_eq!(outcome.stats.processed, 3);
        assert_eq!(outcome.skipped, 2);
    }

    #[tokio::test]
    async fn merges_under_permissive_threshold() {
        let stream = "{\"pip\": [\"numpy==1.0\", \"pandas\"]}\n{\"pip\": [\"numpy==1.0\", \"scipy\"]}\n";
        let settings = Settings::default().with_threshold(0.7).unwrap();

        let outcome = replay(stream.as_bytes(), &settings, ReplayOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.stats.merges, 1);
        assert_eq!(outcome.engine.specs()[0].pip.len(), 3);
        let mut engine = outcome.engine;
        let again = engine.decide(landlord_engine::ContainerSpec::new(
            vec![],
            vec!["scipy".to_string()],
            vec![],
        ));
        assert_eq!(again, Decision::Reuse { index: 0 });
    }
}
