use crate::chart::StylingConfig;
use crate::config::validate_provider;
use crate::core::loader::{current_year, LoadOptions, MalformedRowPolicy, DEFAULT_MIN_YEAR};
use crate::core::views::ViewOptions;
use crate::core::ConfigProvider;
use crate::utils::error::{ReportError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{validate_non_empty_string, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub report: ReportSection,
    pub source: SourceConfig,
    pub extract: Option<ExtractConfig>,
    pub transform: Option<TransformConfig>,
    pub load: LoadConfig,
    pub style: Option<StylingConfig>,
    pub monitoring: Option<MonitoringConfig>,
    pub error_handling: Option<ErrorHandlingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: String,
    #[serde(default)]
    pub lookup_files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    pub top_n: Option<usize>,
    pub min_title_postings: Option<usize>,
    pub min_location_postings: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorHandlingConfig {
    pub on_malformed_row: Option<MalformedRowPolicy>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_format(&self) -> LogFormat {
        self.monitoring
            .as_ref()
            .map(|m| m.log_format)
            .unwrap_or_default()
    }
}

impl ConfigProvider for TomlConfig {
    fn data_path(&self) -> &str {
        &self.source.path
    }

    fn lookup_files(&self) -> &[String] {
        &self.source.lookup_files
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn load_options(&self) -> LoadOptions {
        let extract = self.extract.as_ref();
        LoadOptions {
            on_malformed_row: self
                .error_handling
                .as_ref()
                .and_then(|e| e.on_malformed_row)
                .unwrap_or_default(),
            min_year: extract.and_then(|e| e.min_year).unwrap_or(DEFAULT_MIN_YEAR),
            max_year: extract
                .and_then(|e| e.max_year)
                .unwrap_or_else(current_year),
        }
    }

    fn view_options(&self) -> ViewOptions {
        let defaults = ViewOptions::default();
        let Some(transform) = &self.transform else {
            return defaults;
        };
        ViewOptions {
            top_n: transform.top_n.unwrap_or(defaults.top_n),
            min_title_postings: transform
                .min_title_postings
                .unwrap_or(defaults.min_title_postings),
            min_location_postings: transform
                .min_location_postings
                .unwrap_or(defaults.min_location_postings),
        }
    }

    fn styling(&self) -> StylingConfig {
        self.style.clone().unwrap_or_default()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("report.name", &self.report.name)?;
        validate_provider(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r##"
[report]
name = "ds-jobs"
description = "Data science job market"

[source]
path = "data/postings.csv"
lookup_files = ["data/roles.csv"]

[extract]
min_year = 2021
max_year = 2024

[transform]
top_n = 15
min_title_postings = 20
min_location_postings = 30

[load]
output_path = "./visualizations"

[style]
color_scheme = "ember"
background_color = "#101010"
figure_size = [10.0, 8.0]

[monitoring]
enabled = true
log_format = "json"

[error_handling]
on_malformed_row = "abort"
"##;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.report.name, "ds-jobs");
        assert_eq!(config.data_path(), "data/postings.csv");
        assert_eq!(config.lookup_files(), &["data/roles.csv".to_string()]);
        assert_eq!(config.view_options().top_n, 15);
        assert_eq!(config.view_options().min_location_postings, 30);
        assert_eq!(config.load_options().on_malformed_row, MalformedRowPolicy::Abort);
        assert_eq!(config.load_options().min_year, 2021);
        assert_eq!(config.styling().figure_size, (10.0, 8.0));
        assert!(config.monitoring_enabled());
        assert_eq!(config.log_format(), LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let toml_content = r#"
[report]
name = "minimal"

[source]
path = "postings.csv"

[load]
output_path = "./out"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.view_options(), ViewOptions::default());
        assert_eq!(config.styling(), StylingConfig::default());
        assert_eq!(config.load_options().on_malformed_row, MalformedRowPolicy::Skip);
        assert_eq!(config.load_options().max_year, current_year());
        assert!(!config.monitoring_enabled());
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_style_section() {
        let toml_content = r#"
[report]
name = "styled"

[source]
path = "postings.csv"

[load]
output_path = "./out"

[style]
color_scheme = "forest"
"#;

        let styling = TomlConfig::from_toml_str(toml_content).unwrap().styling();
        assert_eq!(styling.color_scheme, "forest");
        assert_eq!(styling.background_color, "#000000");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("JOB_REPORT_TEST_DATA_DIR", "/srv/data");

        let toml_content = r#"
[report]
name = "env"

[source]
path = "${JOB_REPORT_TEST_DATA_DIR}/postings.csv"

[load]
output_path = "${JOB_REPORT_TEST_UNSET_DIR}/out"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.path, "/srv/data/postings.csv");
        assert_eq!(config.load.output_path, "${JOB_REPORT_TEST_UNSET_DIR}/out");

        std::env::remove_var("JOB_REPORT_TEST_DATA_DIR");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[report]
name = "invalid"

[source]
path = "postings.csv"

[transform]
top_n = 0

[load]
output_path = "./out"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_policy_fails_to_parse() {
        let toml_content = r#"
[report]
name = "bad-policy"

[source]
path = "postings.csv"

[load]
output_path = "./out"

[error_handling]
on_malformed_row = "ignore"
"#;

        assert!(TomlConfig::from_toml_str(toml_content).is_err());
    }

    #[test]
    fn test_unknown_log_format_fails_to_parse() {
        let toml_content = r#"
[report]
name = "bad-logs"

[source]
path = "postings.csv"

[load]
output_path = "./out"

[monitoring]
enabled = true
log_format = "pretty"
"#;

        assert!(TomlConfig::from_toml_str(toml_content).is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[report]
name = "file-test"

[source]
path = "postings.csv"

[load]
output_path = "./out"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.report.name, "file-test");
    }
}
