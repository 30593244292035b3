use crate::core::summary::Summary;
use crate::core::{Pipeline, RenderOutcome};
use crate::utils::error::{ReportError, Result};
use crate::utils::monitor::{Phase, PhaseMonitor, RunStats};
use serde::Serialize;

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: Summary,
    pub outcome: RenderOutcome,
    pub stats: RunStats,
}

impl RunReport {
    /// The summary as JSON. With `with_stats` the run statistics are nested
    /// next to it, which makes the output vary between runs.
    pub fn to_json(&self, with_stats: bool) -> Result<String> {
        if !with_stats {
            return self.summary.to_json();
        }

        #[derive(Serialize)]
        struct Monitored<'a> {
            summary: &'a Summary,
            run_stats: &'a RunStats,
        }

        Ok(serde_json::to_string_pretty(&Monitored {
            summary: &self.summary,
            run_stats: &self.stats,
        })?)
    }
}

pub struct ReportEngine<P: Pipeline> {
    pipeline: P,
    sample_memory: bool,
}

impl<P: Pipeline> ReportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            sample_memory: monitor_enabled,
        }
    }

    /// Runs load, aggregation and rendering once.
    ///
    /// Fails when the dataset cannot be loaded, or when every chart that was
    /// attempted failed. Individual chart failures are reported in the outcome.
    pub async fn run(&self) -> Result<RunReport> {
        let mut monitor = PhaseMonitor::start(self.sample_memory);

        tracing::info!("📊 Loading dataset...");
        let dataset = self.pipeline.extract().await?;
        tracing::info!("✅ Loaded {} job postings", dataset.len());
        monitor.finish_phase(Phase::Load);

        if dataset.is_empty() {
            tracing::warn!("⚠️ No postings to analyze, charts will not be rendered");
        }

        tracing::info!("🔧 Computing views...");
        let analysis = self.pipeline.transform(dataset).await?;
        monitor.finish_phase(Phase::Aggregate);

        tracing::info!("📊 Creating visualizations...");
        let outcome = self.pipeline.load(&analysis).await?;
        monitor.finish_phase(Phase::Render);
        let stats = monitor.finish();

        let attempted = outcome.attempted();
        if attempted > 0 && outcome.written.is_empty() {
            return Err(ReportError::NoChartsRendered { attempted });
        }
        if !outcome.failed.is_empty() {
            tracing::warn!(
                "⚠️ {} of {} charts failed to render",
                outcome.failed.len(),
                attempted
            );
        }

        Ok(RunReport {
            summary: analysis.summary,
            outcome,
            stats,
        })
    }
}
