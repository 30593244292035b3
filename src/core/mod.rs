pub mod aggregate;
pub mod engine;
pub mod loader;
pub mod pipeline;
pub mod summary;
pub mod views;

pub use crate::domain::model::{Analysis, Dataset, JobPosting, RenderOutcome};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
