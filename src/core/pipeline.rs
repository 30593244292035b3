use crate::chart::{render_chart, StylingConfig};
use crate::core::loader::{attach_archetypes, load_dataset, load_role_archetypes};
use crate::core::summary::Summary;
use crate::core::views::{build_views, View};
use crate::core::{Analysis, ConfigProvider, Dataset, Pipeline, RenderOutcome, Storage};
use crate::utils::error::{ReportError, Result};
use std::collections::HashMap;

/// Loads the postings CSV, aggregates it and writes one SVG per view.
pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    style: StylingConfig,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let style = config.styling();
        Self {
            storage,
            config,
            style,
        }
    }

    /// Renders one view and writes it, overwriting any previous file.
    pub async fn render_view(&self, view: &View) -> Result<String> {
        let file_name = view.kind.file_name();
        let svg = render_chart(&view.chart, view.kind.chart_kind(), &self.style)?;

        self.storage
            .write_file(file_name, svg.as_bytes())
            .await
            .map_err(|e| ReportError::render(file_name, e.to_string()))?;

        Ok(self.storage.location(file_name))
    }

    fn role_lookup(&self) -> Result<HashMap<String, String>> {
        let mut lookup = HashMap::new();
        // 後面的檔案覆蓋前面的對應
        for path in self.config.lookup_files() {
            let table = load_role_archetypes(path)?;
            tracing::debug!("Loaded {} role archetypes from {}", table.len(), path);
            lookup.extend(table);
        }
        Ok(lookup)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    async fn extract(&self) -> Result<Dataset> {
        tracing::debug!("Loading dataset from: {}", self.config.data_path());
        let mut dataset = load_dataset(self.config.data_path(), &self.config.load_options())?;

        let lookup = self.role_lookup()?;
        if !lookup.is_empty() {
            attach_archetypes(&mut dataset.postings, &lookup);
        }

        Ok(dataset)
    }

    async fn transform(&self, data: Dataset) -> Result<Analysis> {
        let options = self.config.view_options();
        let views = build_views(&data.postings, &options);
        let summary = Summary::build(&data, &options);

        tracing::debug!(
            "Built {} views ({} with data)",
            views.len(),
            views.iter().filter(|v| !v.is_empty()).count()
        );

        Ok(Analysis { summary, views })
    }

    async fn load(&self, analysis: &Analysis) -> Result<RenderOutcome> {
        let mut outcome = RenderOutcome::default();

        for view in &analysis.views {
            if view.is_empty() {
                tracing::warn!("⚠️ No data for {}, skipping chart", view.kind.file_name());
                outcome.skipped.push(view.kind);
                continue;
            }

            match self.render_view(view).await {
                Ok(path) => {
                    tracing::info!("✅ Saved: {}", path);
                    outcome.written.push(path);
                }
                Err(e) => {
                    tracing::warn!("⚠️ {}", e);
                    outcome.failed.push((view.kind, e.to_string()));
                }
            }
        }

        Ok(outcome)
    }
}
