use crate::chart::StylingConfig;
use crate::core::loader::LoadOptions;
use crate::core::views::ViewOptions;
use crate::domain::model::{Analysis, Dataset, RenderOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    /// Writes `data` under `name`, replacing any existing file.
    fn write_file(
        &self,
        name: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Human readable location of `name`, for logs and the run report.
    fn location(&self, name: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn data_path(&self) -> &str;
    fn lookup_files(&self) -> &[String];
    fn output_path(&self) -> &str;
    fn load_options(&self) -> LoadOptions;
    fn view_options(&self) -> ViewOptions;
    fn styling(&self) -> StylingConfig;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn transform(&self, data: Dataset) -> Result<Analysis>;
    async fn load(&self, analysis: &Analysis) -> Result<RenderOutcome>;
}
