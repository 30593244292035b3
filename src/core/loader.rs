use crate::domain::model::{
    CompanySize, Dataset, EmploymentType, ExperienceLevel, JobPosting, RejectedRow,
};
use crate::utils::error::{ReportError, Result};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// What to do with a row that does not fit the posting schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum MalformedRowPolicy {
    /// Log a warning, record the rejection and keep going.
    #[default]
    Skip,
    /// Fail the whole run on the first bad row.
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub on_malformed_row: MalformedRowPolicy,
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            on_malformed_row: MalformedRowPolicy::Skip,
            min_year: DEFAULT_MIN_YEAR,
            max_year: current_year(),
        }
    }
}

pub const DEFAULT_MIN_YEAR: i32 = 2020;

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Canonical column name and the header spellings accepted for it.
const REQUIRED_COLUMNS: [(&str, &[&str]); 7] = [
    ("job_title", &["job_title", "title"]),
    ("salary_in_usd", &["salary_in_usd", "salary_usd"]),
    ("company_location", &["company_location", "location"]),
    ("experience_level", &["experience_level"]),
    ("company_size", &["company_size"]),
    ("employment_type", &["employment_type"]),
    ("year", &["year", "work_year"]),
];

const LOCATION_CODES: [(&str, &str); 5] = [
    ("United States", "US"),
    ("United Kingdom", "GB"),
    ("Canada", "CA"),
    ("Germany", "DE"),
    ("Spain", "ES"),
];

#[derive(Debug, Deserialize)]
struct CsvPosting {
    #[serde(alias = "title")]
    job_title: String,
    #[serde(alias = "salary_usd")]
    salary_in_usd: String,
    #[serde(alias = "location")]
    company_location: String,
    experience_level: String,
    company_size: String,
    employment_type: String,
    #[serde(alias = "work_year")]
    year: String,
}

impl CsvPosting {
    fn into_posting(self, options: &LoadOptions) -> std::result::Result<JobPosting, String> {
        let title = self.job_title.trim().to_string();
        if title.is_empty() {
            return Err("empty job title".to_string());
        }

        let salary_usd: f64 = self
            .salary_in_usd
            .trim()
            .parse()
            .map_err(|_| format!("salary '{}' is not a number", self.salary_in_usd))?;
        if !salary_usd.is_finite() || salary_usd < 0.0 {
            return Err(format!("salary '{}' must be a non-negative amount", self.salary_in_usd));
        }

        let year: i32 = self
            .year
            .trim()
            .parse()
            .map_err(|_| format!("year '{}' is not an integer", self.year))?;
        if year < options.min_year || year > options.max_year {
            return Err(format!(
                "year {} is outside the collection window {}-{}",
                year, options.min_year, options.max_year
            ));
        }

        let location = normalize_location(&self.company_location);
        if location.is_empty() {
            return Err("empty company location".to_string());
        }

        Ok(JobPosting {
            title,
            salary_usd,
            location,
            experience_level: self
                .experience_level
                .parse::<ExperienceLevel>()
                .map_err(|e| e.to_string())?,
            company_size: self
                .company_size
                .parse::<CompanySize>()
                .map_err(|e| e.to_string())?,
            employment_type: self
                .employment_type
                .parse::<EmploymentType>()
                .map_err(|e| e.to_string())?,
            year,
            role_archetype: None,
        })
    }
}

/// Maps the full country names used in some exports onto the two-letter codes
/// used by the rest of the dataset.
pub fn normalize_location(raw: &str) -> String {
    let trimmed = raw.trim();
    LOCATION_CODES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
        .map(|(_, code)| code.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

pub fn load_dataset(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Dataset> {
    let path = path.as_ref();
    let file = open_input(path)?;

    tracing::debug!("Reading postings from {}", path.display());
    let dataset = load_dataset_from_reader(file, options)?;

    if dataset.is_empty() {
        tracing::warn!("⚠️ Dataset at {} contains no usable postings", path.display());
    }
    Ok(dataset)
}

pub fn load_dataset_from_reader<R: Read>(input: R, options: &LoadOptions) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|(_, accepted)| !headers.iter().any(|h| accepted.contains(&h)))
        .map(|(canonical, _)| canonical.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ReportError::SchemaError { missing });
    }

    let mut dataset = Dataset::default();
    for result in reader.records() {
        let outcome = match result {
            Ok(record) => {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                record
                    .deserialize::<CsvPosting>(Some(&headers))
                    .map_err(|e| e.to_string())
                    .and_then(|raw| raw.into_posting(options))
                    .map_err(|reason| (line, reason))
            }
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                Err((line, e.to_string()))
            }
        };

        match outcome {
            Ok(posting) => dataset.postings.push(posting),
            Err((line, reason)) => match options.on_malformed_row {
                MalformedRowPolicy::Abort => {
                    return Err(ReportError::MalformedRecord { line, reason });
                }
                MalformedRowPolicy::Skip => {
                    tracing::warn!("⚠️ Skipping line {}: {}", line, reason);
                    dataset.rejected.push(RejectedRow { line, reason });
                }
            },
        }
    }

    tracing::info!(
        "Loaded {} postings ({} rejected)",
        dataset.postings.len(),
        dataset.rejected.len()
    );
    Ok(dataset)
}

/// Reads a `job_title,role_archetype` lookup table.
pub fn load_role_archetypes(path: impl AsRef<Path>) -> Result<HashMap<String, String>> {
    let path = path.as_ref();
    read_role_archetypes(open_input(path)?)
}

pub fn read_role_archetypes<R: Read>(input: R) -> Result<HashMap<String, String>> {
    #[derive(Deserialize)]
    struct RoleRow {
        job_title: String,
        role_archetype: String,
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut lookup = HashMap::new();
    for row in reader.deserialize::<RoleRow>() {
        let row = row?;
        if !row.role_archetype.is_empty() {
            lookup.insert(row.job_title, row.role_archetype);
        }
    }
    Ok(lookup)
}

/// Fills `role_archetype` from `lookup`; titles without an entry stay `None`.
pub fn attach_archetypes(postings: &mut [JobPosting], lookup: &HashMap<String, String>) {
    for posting in postings {
        posting.role_archetype = lookup.get(&posting.title).cloned();
    }
}

fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ReportError::DatasetNotFound {
            path: path.display().to_string(),
        },
        _ => ReportError::IoError(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str =
        "job_title,salary_in_usd,company_location,experience_level,company_size,employment_type,year";

    fn options() -> LoadOptions {
        LoadOptions {
            on_malformed_row: MalformedRowPolicy::Skip,
            min_year: 2020,
            max_year: 2024,
        }
    }

    #[test]
    fn test_parses_dataset_codes() {
        let csv = format!(
            "{}\nData Engineer,150000,United States,SE,M,FT,2023\nML Engineer,90000,DE,EN,S,Contract,2021\n",
            HEADER
        );
        let dataset = load_dataset_from_reader(csv.as_bytes(), &options()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert!(dataset.rejected.is_empty());

        let first = &dataset.postings[0];
        assert_eq!(first.title, "Data Engineer");
        assert_eq!(first.salary_usd, 150000.0);
        assert_eq!(first.location, "US");
        assert_eq!(first.experience_level, ExperienceLevel::Senior);
        assert_eq!(first.company_size, CompanySize::Medium);
        assert_eq!(first.employment_type, EmploymentType::FullTime);
        assert_eq!(first.year, 2023);
        assert_eq!(dataset.postings[1].employment_type, EmploymentType::Contract);
    }

    #[test]
    fn test_accepts_short_header_aliases() {
        let csv = "title,salary_usd,location,experience_level,company_size,employment_type,year,remote_ratio\n\
                   Analyst,70000,CA,Mid,Small,Part-time,2022,50\n";
        let dataset = load_dataset_from_reader(csv.as_bytes(), &options()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.postings[0].employment_type, EmploymentType::PartTime);
    }

    #[test]
    fn test_skip_policy_records_rejections() {
        let csv = format!(
            "{}\nData Engineer,abc,US,SE,M,FT,2023\nData Engineer,100000,US,SE,M,FT,2023\n\
             Data Engineer,-5,US,SE,M,FT,2023\nData Engineer,100000,US,Principal,M,FT,2023\n\
             Data Engineer,100000,US,SE,M,FT,2019\n",
            HEADER
        );
        let dataset = load_dataset_from_reader(csv.as_bytes(), &options()).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.rejected.len(), 4);
        assert_eq!(dataset.rejected[0].line, 2);
        assert!(dataset.rejected[0].reason.contains("not a number"));
        assert!(dataset.rejected[1].reason.contains("non-negative"));
        assert!(dataset.rejected[2].reason.contains("experience level"));
        assert!(dataset.rejected[3].reason.contains("collection window"));
    }

    #[test]
    fn test_abort_policy_fails_on_first_bad_row() {
        let csv = format!(
            "{}\nData Engineer,100000,US,SE,M,FT,2023\nData Engineer,100000,US,SE,XL,FT,2023\n",
            HEADER
        );
        let opts = LoadOptions {
            on_malformed_row: MalformedRowPolicy::Abort,
            ..options()
        };
        let err = load_dataset_from_reader(csv.as_bytes(), &opts).unwrap_err();
        match err {
            ReportError::MalformedRecord { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("company size"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_short_row_is_malformed() {
        let csv = format!("{}\nData Engineer,100000,US\n", HEADER);
        let dataset = load_dataset_from_reader(csv.as_bytes(), &options()).unwrap();
        assert!(dataset.is_empty());
        assert_eq!(dataset.rejected.len(), 1);
    }

    #[test]
    fn test_missing_columns_is_schema_error() {
        let csv = "job_title,salary_in_usd\nData Engineer,100000\n";
        let err = load_dataset_from_reader(csv.as_bytes(), &options()).unwrap_err();
        match err {
            ReportError::SchemaError { missing } => {
                assert_eq!(
                    missing,
                    vec![
                        "company_location",
                        "experience_level",
                        "company_size",
                        "employment_type",
                        "year"
                    ]
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_header_only_file_is_empty_dataset() {
        let dataset = load_dataset_from_reader(format!("{}\n", HEADER).as_bytes(), &options()).unwrap();
        assert!(dataset.is_empty());
        assert!(dataset.rejected.is_empty());
    }

    #[test]
    fn test_missing_file_is_dataset_not_found() {
        let err = load_dataset("/definitely/not/here.csv", &options()).unwrap_err();
        assert!(matches!(err, ReportError::DatasetNotFound { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        writeln!(file, "Data Scientist,130000,Spain,MI,L,FT,2024").unwrap();

        let dataset = load_dataset(file.path(), &options()).unwrap();
        assert_eq!(dataset.postings[0].location, "ES");
    }

    #[test]
    fn test_role_archetypes_lookup() {
        let lookup_csv = "job_title,role_archetype\nData Engineer,Engineering\nData Analyst,Analytics\nLegacy Role,\n";
        let lookup = read_role_archetypes(lookup_csv.as_bytes()).unwrap();
        assert_eq!(lookup.len(), 2);

        let csv = format!(
            "{}\nData Engineer,100000,US,SE,M,FT,2023\nResearch Scientist,160000,US,SE,L,FT,2023\n",
            HEADER
        );
        let mut dataset = load_dataset_from_reader(csv.as_bytes(), &options()).unwrap();
        attach_archetypes(&mut dataset.postings, &lookup);

        assert_eq!(dataset.postings[0].archetype(), "Engineering");
        assert_eq!(dataset.postings[1].archetype(), "Other");
    }

    #[test]
    fn test_normalize_location() {
        assert_eq!(normalize_location(" united kingdom "), "GB");
        assert_eq!(normalize_location("FR"), "FR");
    }
}
