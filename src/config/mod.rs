pub mod cli;
pub mod toml_config;

use crate::chart::StylingConfig;
use crate::core::loader::{current_year, LoadOptions, MalformedRowPolicy, DEFAULT_MIN_YEAR};
use crate::core::views::ViewOptions;
use crate::core::ConfigProvider;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_path, validate_positive_number, validate_range, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

/// Checks shared by every configuration source.
pub fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    validate_path("data_path", config.data_path())?;
    validate_file_extensions("data_path", &[config.data_path().to_string()], &["csv"])?;
    validate_file_extensions("lookup_files", config.lookup_files(), &["csv"])?;
    validate_path("output_path", config.output_path())?;

    let views = config.view_options();
    validate_positive_number("top_n", views.top_n, 1)?;
    validate_positive_number("min_title_postings", views.min_title_postings, 1)?;
    validate_positive_number("min_location_postings", views.min_location_postings, 1)?;

    let load = config.load_options();
    validate_range("min_year", load.min_year, 1990, 2100)?;
    validate_range("max_year", load.max_year, 1990, 2100)?;
    if load.min_year > load.max_year {
        return Err(ReportError::ConfigValidationError {
            field: "min_year".to_string(),
            message: format!(
                "min_year {} is after max_year {}",
                load.min_year, load.max_year
            ),
        });
    }

    config.styling().validate()
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "job-market-report")]
#[command(about = "Salary and demand report for a job postings dataset")]
pub struct CliConfig {
    #[arg(long, default_value = "data/job_postings.csv")]
    pub data_path: String,

    /// CSV files mapping job_title to role_archetype
    #[arg(long, value_delimiter = ',')]
    pub lookup_files: Vec<String>,

    #[arg(long, default_value = "./visualizations")]
    pub output_path: String,

    #[arg(long, default_value = "10")]
    pub top_n: usize,

    #[arg(long, default_value = "1")]
    pub min_title_postings: usize,

    #[arg(long, default_value = "1")]
    pub min_location_postings: usize,

    #[arg(long, value_enum, default_value_t = MalformedRowPolicy::Skip)]
    pub on_malformed_row: MalformedRowPolicy,

    #[arg(long, default_value_t = DEFAULT_MIN_YEAR)]
    pub min_year: i32,

    /// Defaults to the current year
    #[arg(long)]
    pub max_year: Option<i32>,

    #[arg(long, default_value = "neon-purple")]
    pub color_scheme: String,

    #[arg(long, default_value = "#000000")]
    pub background_color: String,

    /// Figure width in inches
    #[arg(long, default_value = "12")]
    pub figure_width: f64,

    /// Figure height in inches
    #[arg(long, default_value = "6")]
    pub figure_height: f64,

    #[arg(long, help = "Print the summary as JSON")]
    pub json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process statistics after each phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn data_path(&self) -> &str {
        &self.data_path
    }

    fn lookup_files(&self) -> &[String] {
        &self.lookup_files
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            on_malformed_row: self.on_malformed_row,
            min_year: self.min_year,
            max_year: self.max_year.unwrap_or_else(current_year),
        }
    }

    fn view_options(&self) -> ViewOptions {
        ViewOptions {
            top_n: self.top_n,
            min_title_postings: self.min_title_postings,
            min_location_postings: self.min_location_postings,
        }
    }

    fn styling(&self) -> StylingConfig {
        StylingConfig {
            color_scheme: self.color_scheme.clone(),
            background_color: self.background_color.clone(),
            figure_size: (self.figure_width, self.figure_height),
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
