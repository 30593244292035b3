use job_market_report::core::loader::MalformedRowPolicy;
use job_market_report::core::views::ViewKind;
use job_market_report::core::ConfigProvider;
use job_market_report::utils::validation::Validate;
use job_market_report::{
    CliConfig, LocalStorage, ReportEngine, ReportError, ReportPipeline, TomlConfig,
};
use std::path::Path;
use tempfile::TempDir;

const POSTINGS: &str = "\
job_title,salary_in_usd,company_location,experience_level,company_size,employment_type,year
Data Engineer,140000,United States,SE,L,FT,2023
Data Engineer,120000,US,MI,M,FT,2022
Data Scientist,150000,US,SE,M,FT,2024
Data Scientist,95000,GB,MI,S,FT,2021
ML Engineer,190000,US,EX,L,FT,2024
Data Analyst,65000,Germany,EN,S,PT,2021
Data Analyst,72000,DE,EN,M,Contract,2023
Data Analyst,not-a-number,DE,EN,M,FT,2023
";

fn write_dataset(dir: &Path, contents: &str) -> String {
    let path = dir.join("postings.csv");
    std::fs::write(&path, contents).unwrap();
    path.to_str().unwrap().to_string()
}

fn config(data_path: String, output_path: String) -> CliConfig {
    CliConfig {
        data_path,
        lookup_files: vec![],
        output_path,
        top_n: 10,
        min_title_postings: 1,
        min_location_postings: 1,
        on_malformed_row: MalformedRowPolicy::Skip,
        min_year: 2020,
        max_year: Some(2024),
        color_scheme: "neon-purple".to_string(),
        background_color: "#000000".to_string(),
        figure_width: 12.0,
        figure_height: 6.0,
        json: false,
        verbose: false,
        monitor: false,
    }
}

fn engine(config: CliConfig) -> ReportEngine<ReportPipeline<LocalStorage, CliConfig>> {
    let storage = LocalStorage::new(config.output_path.clone());
    ReportEngine::new(ReportPipeline::new(storage, config))
}

#[tokio::test]
async fn test_end_to_end_report() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = write_dataset(temp_dir.path(), POSTINGS);
    let output_dir = temp_dir.path().join("visualizations");

    let report = engine(config(data_path, output_dir.to_str().unwrap().to_string()))
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcome.written.len(), 6);
    assert!(report.outcome.failed.is_empty());
    for kind in ViewKind::ALL {
        let chart = output_dir.join(kind.file_name());
        assert!(chart.exists(), "missing {}", kind.file_name());
        let svg = std::fs::read_to_string(chart).unwrap();
        assert!(svg.starts_with("<svg"));
    }

    let summary = &report.summary;
    assert_eq!(summary.total_postings, 7);
    assert_eq!(summary.rejected_rows, 1);
    assert_eq!(summary.first_year, Some(2021));
    assert_eq!(summary.last_year, Some(2024));
    assert_eq!(summary.top_title(), Some("Data Analyst"));
    assert_eq!(summary.top_location(), Some("US"));

    // Σ(mean × count) over groups equals the total salary
    let total: f64 = [140000.0, 120000.0, 150000.0, 95000.0, 190000.0, 65000.0, 72000.0]
        .iter()
        .sum();
    let recombined: f64 = summary
        .salary_trend
        .iter()
        .map(|p| p.mean * p.count as f64)
        .sum();
    assert!((recombined - total).abs() < 1e-6);

    let experience = std::fs::read_to_string(output_dir.join("salary_by_experience.svg")).unwrap();
    let entry = experience.find(">Entry</text>").unwrap();
    let mid = experience.find(">Mid</text>").unwrap();
    let senior = experience.find(">Senior</text>").unwrap();
    let executive = experience.find(">Executive</text>").unwrap();
    assert!(entry < mid && mid < senior && senior < executive);
}

#[tokio::test]
async fn test_runs_are_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = write_dataset(temp_dir.path(), POSTINGS);
    let output_dir = temp_dir.path().join("out");
    let output = output_dir.to_str().unwrap().to_string();

    let first = engine(config(data_path.clone(), output.clone())).run().await.unwrap();
    let first_charts: Vec<Vec<u8>> = ViewKind::ALL
        .iter()
        .map(|k| std::fs::read(output_dir.join(k.file_name())).unwrap())
        .collect();

    let second = engine(config(data_path, output)).run().await.unwrap();
    let second_charts: Vec<Vec<u8>> = ViewKind::ALL
        .iter()
        .map(|k| std::fs::read(output_dir.join(k.file_name())).unwrap())
        .collect();

    assert_eq!(first.summary.render_text(), second.summary.render_text());
    assert_eq!(first.summary.to_json().unwrap(), second.summary.to_json().unwrap());
    assert_eq!(first_charts, second_charts);
}

#[tokio::test]
async fn test_single_record_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = write_dataset(
        temp_dir.path(),
        "job_title,salary_in_usd,company_location,experience_level,company_size,employment_type,year\n\
         Data Engineer,123456,US,SE,M,FT,2023\n",
    );
    let output = temp_dir.path().join("out").to_str().unwrap().to_string();

    let report = engine(config(data_path, output)).run().await.unwrap();
    let summary = &report.summary;

    assert_eq!(report.outcome.written.len(), 6);
    assert_eq!(summary.salary.unwrap().mean, 123456.0);
    assert_eq!(summary.highest_paying_roles[0].mean, 123456.0);
    assert_eq!(summary.highest_paying_locations[0].mean, 123456.0);
    assert_eq!(summary.salary_by_experience[0].mean, 123456.0);
    assert_eq!(summary.salary_trend[0].mean, 123456.0);
    assert_eq!(summary.top_titles[0].count, 1);
}

#[tokio::test]
async fn test_empty_dataset_renders_nothing_and_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = write_dataset(
        temp_dir.path(),
        "job_title,salary_in_usd,company_location,experience_level,company_size,employment_type,year\n",
    );
    let output_dir = temp_dir.path().join("out");

    let report = engine(config(data_path, output_dir.to_str().unwrap().to_string()))
        .run()
        .await
        .unwrap();

    assert_eq!(report.summary.total_postings, 0);
    assert_eq!(report.outcome.attempted(), 0);
    assert_eq!(report.outcome.skipped.len(), 6);
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_missing_dataset_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.csv").to_str().unwrap().to_string();
    let output = temp_dir.path().join("out").to_str().unwrap().to_string();

    let err = engine(config(missing, output)).run().await.unwrap_err();

    assert!(matches!(err, ReportError::DatasetNotFound { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_abort_policy_stops_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = write_dataset(temp_dir.path(), POSTINGS);
    let output_dir = temp_dir.path().join("out");

    let mut strict = config(data_path, output_dir.to_str().unwrap().to_string());
    strict.on_malformed_row = MalformedRowPolicy::Abort;

    let err = engine(strict).run().await.unwrap_err();

    match err {
        ReportError::MalformedRecord { line, .. } => assert_eq!(line, 9),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_unwritable_output_fails_every_chart() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = write_dataset(temp_dir.path(), POSTINGS);
    let blocker = temp_dir.path().join("occupied");
    std::fs::write(&blocker, "not a directory").unwrap();

    let err = engine(config(data_path, blocker.to_str().unwrap().to_string()))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, ReportError::NoChartsRendered { attempted: 6 }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_role_lookup_feeds_archetype_summary() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = write_dataset(temp_dir.path(), POSTINGS);
    let roles = temp_dir.path().join("roles.csv");
    std::fs::write(
        &roles,
        "job_title,role_archetype\nData Engineer,Engineering\nML Engineer,Engineering\nData Scientist,Science\n",
    )
    .unwrap();

    let mut with_roles = config(data_path, temp_dir.path().join("out").to_str().unwrap().to_string());
    with_roles.lookup_files = vec![roles.to_str().unwrap().to_string()];

    let report = engine(with_roles).run().await.unwrap();
    let archetypes: Vec<&str> = report
        .summary
        .salary_by_archetype
        .iter()
        .map(|g| g.key.as_str())
        .collect();

    assert_eq!(archetypes, vec!["Engineering", "Science", "Other"]);
    assert_eq!(report.summary.salary_by_archetype[2].count, 2);
}

#[tokio::test]
async fn test_toml_config_drives_a_run() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = write_dataset(temp_dir.path(), POSTINGS);
    let output_dir = temp_dir.path().join("toml-out");

    let toml_content = format!(
        r##"
[report]
name = "integration"

[source]
path = "{}"

[extract]
min_year = 2020
max_year = 2024

[transform]
top_n = 3
min_title_postings = 2

[load]
output_path = "{}"

[style]
color_scheme = "ocean"
background_color = "#ffffff"
"##,
        data_path,
        output_dir.to_str().unwrap()
    );

    let config = TomlConfig::from_toml_str(&toml_content).unwrap();
    assert!(config.validate().is_ok());

    let storage = LocalStorage::new(config.output_path().to_string());
    let report = ReportEngine::new(ReportPipeline::new(storage, config))
        .run()
        .await
        .unwrap();

    // ML Engineer 只有一筆，低於 min_title_postings
    assert!(report
        .summary
        .highest_paying_roles
        .iter()
        .all(|g| g.count >= 2));
    assert_eq!(report.summary.top_titles.len(), 3);
    assert_eq!(report.outcome.written.len(), 6);

    let roles = std::fs::read_to_string(output_dir.join("top_paying_roles.svg")).unwrap();
    assert!(roles.contains("(min 2 postings)"));
    assert!(!roles.contains("ML Engineer"));
}
