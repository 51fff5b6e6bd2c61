use landlord_engine::{ConsolidationStats, Sample, Settings};
use serde::Serialize;

/// Summary of one replayed stream
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RunReport {
    pub processed: usize,
    pub builds: usize,
    pub merges: usize,
    pub reuses: usize,
    pub skipped: usize,
    pub environments: usize,
    pub similarity_threshold: f64,
    pub sample_every: usize,
    pub series: Series,
}

/// Sampled counters as parallel columns, ready for plotting
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct Series {
    pub requests: Vec<usize>,
    pub builds: Vec<usize>,
    pub merges: Vec<usize>,
}

impl Series {
    fn from_samples(samples: &[Sample]) -> Self {
        let mut series = Series::default();
        for sample in samples {
            series.requests.push(sample.requests);
            series.builds.push(sample.builds);
            series.merges.push(sample.merges);
        }
        series
    }
}

impl RunReport {
    pub(crate) fn new(
        stats: &ConsolidationStats,
        skipped: usize,
        environments: usize,
        settings: &Settings,
    ) -> Self {
        Self {
            processed: stats.processed,
            builds: stats.builds,
            merges: stats.merges,
            reuses: stats.reuses,
            skipped,
            environments,
            similarity_threshold: settings.engine.similarity_threshold(),
            sample_every: settings.sample_every,
            series: Series::from_samples(&stats.samples),
        }
    }
}

pub(crate) fn progress_line(sample: &Sample) -> String {
    format!(
        "build {} times and merge {} times in {} requests",
        sample.builds, sample.merges, sample.requests
    )
}

pub(crate) fn render_text(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Processed:    {}\n", report.processed));
    out.push_str(&format!("Builds:       {}\n", report.builds));
    out.push_str(&format!("Merges:       {}\n", report.merges));
    out.push_str(&format!("Reuses:       {}\n", report.reuses));
    out.push_str(&format!("Skipped:      {}\n", report.skipped));
    out.push_str(&format!("Environments: {}\n", report.environments));
    out.push_str(&format!(
        "Threshold:    {:.3}\n",
        report.similarity_threshold
    ));
    if report.processed > 0 {
        let avoided = report.processed - report.builds;
        out.push_str(&format!(
            "Builds avoided: {} ({:.1}%)\n",
            avoided,
            avoided as f64 * 100.0 / report.processed as f64
        ));
    }
    out
}
