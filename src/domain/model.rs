use crate::core::summary::Summary;
use crate::core::views::{View, ViewKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized {field} '{value}'")]
pub struct UnknownCategory {
    pub field: &'static str,
    pub value: String,
}

impl UnknownCategory {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

/// Lower-cases and collapses separators so `Full-Time`, `full time` and
/// `FULL_TIME` compare equal.
fn normalize_token(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '_' => '-',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Executive,
}

impl ExperienceLevel {
    /// Display order, most junior first.
    pub const ORDER: [ExperienceLevel; 4] = [
        ExperienceLevel::Entry,
        ExperienceLevel::Mid,
        ExperienceLevel::Senior,
        ExperienceLevel::Executive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "Entry",
            ExperienceLevel::Mid => "Mid",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::Executive => "Executive",
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "entry" | "en" | "entry-level" | "junior" => Ok(ExperienceLevel::Entry),
            "mid" | "mi" | "mid-level" | "intermediate" => Ok(ExperienceLevel::Mid),
            "senior" | "se" | "senior-level" => Ok(ExperienceLevel::Senior),
            "executive" | "ex" | "executive-level" => Ok(ExperienceLevel::Executive),
            _ => Err(UnknownCategory::new("experience level", s)),
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompanySize {
    Small,
    Medium,
    Large,
}

impl CompanySize {
    pub const ORDER: [CompanySize; 3] = [CompanySize::Small, CompanySize::Medium, CompanySize::Large];

    pub fn label(&self) -> &'static str {
        match self {
            CompanySize::Small => "Small",
            CompanySize::Medium => "Medium",
            CompanySize::Large => "Large",
        }
    }
}

impl FromStr for CompanySize {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "small" | "s" => Ok(CompanySize::Small),
            "medium" | "m" => Ok(CompanySize::Medium),
            "large" | "l" => Ok(CompanySize::Large),
            _ => Err(UnknownCategory::new("company size", s)),
        }
    }
}

impl fmt::Display for CompanySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
}

impl EmploymentType {
    pub fn label(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "Full-time",
            EmploymentType::PartTime => "Part-time",
            EmploymentType::Contract => "Contract",
        }
    }
}

impl FromStr for EmploymentType {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "full-time" | "fulltime" | "ft" => Ok(EmploymentType::FullTime),
            "part-time" | "parttime" | "pt" => Ok(EmploymentType::PartTime),
            "contract" | "ct" => Ok(EmploymentType::Contract),
            _ => Err(UnknownCategory::new("employment type", s)),
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One job listing. Built once by the loader and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPosting {
    pub title: String,
    pub salary_usd: f64,
    pub location: String,
    pub experience_level: ExperienceLevel,
    pub company_size: CompanySize,
    pub employment_type: EmploymentType,
    pub year: i32,
    pub role_archetype: Option<String>,
}

impl JobPosting {
    pub const DEFAULT_ARCHETYPE: &'static str = "Other";

    pub fn archetype(&self) -> &str {
        self.role_archetype
            .as_deref()
            .unwrap_or(Self::DEFAULT_ARCHETYPE)
    }
}

/// A row the loader dropped under the skip policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub line: u64,
    pub reason: String,
}

/// Loaded input for one run.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub postings: Vec<JobPosting>,
    pub rejected: Vec<RejectedRow>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

/// Output of the transform phase: the summary plus one view per chart.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub summary: Summary,
    pub views: Vec<View>,
}

/// What the load phase did with each view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOutcome {
    /// Paths of the chart files written.
    pub written: Vec<String>,
    pub failed: Vec<(ViewKind, String)>,
    /// Views with no data points; these are not rendered.
    pub skipped: Vec<ViewKind>,
}

impl RenderOutcome {
    pub fn attempted(&self) -> usize {
        self.written.len() + self.failed.len()
    }
}
