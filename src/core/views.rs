use crate::chart::{ChartData, ChartKind, ValueFormat};
use crate::core::aggregate::{
    at_least, average_by, count_by, order_by_rank, rank_descending, trend_by_year, GroupMean,
};
use crate::domain::model::{CompanySize, ExperienceLevel, JobPosting};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

const SALARY_AXIS: &str = "Average Salary (USD)";

/// The six report views, in the order they are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    SalaryTrend,
    TopPayingRoles,
    SalaryByExperience,
    TopLocations,
    SalaryByCompanySize,
    MostCommonJobs,
}

impl ViewKind {
    pub const ALL: [ViewKind; 6] = [
        ViewKind::SalaryTrend,
        ViewKind::TopPayingRoles,
        ViewKind::SalaryByExperience,
        ViewKind::TopLocations,
        ViewKind::SalaryByCompanySize,
        ViewKind::MostCommonJobs,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ViewKind::SalaryTrend => "salary_trends.svg",
            ViewKind::TopPayingRoles => "top_paying_roles.svg",
            ViewKind::SalaryByExperience => "salary_by_experience.svg",
            ViewKind::TopLocations => "top_locations.svg",
            ViewKind::SalaryByCompanySize => "salary_by_company_size.svg",
            ViewKind::MostCommonJobs => "most_common_jobs.svg",
        }
    }

    pub fn chart_kind(&self) -> ChartKind {
        match self {
            ViewKind::SalaryTrend => ChartKind::Line,
            _ => ChartKind::Bar,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    /// Cut-off for the ranked views.
    pub top_n: usize,
    pub min_title_postings: usize,
    pub min_location_postings: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            min_title_postings: 1,
            min_location_postings: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub kind: ViewKind,
    pub chart: ChartData,
}

impl View {
    pub fn is_empty(&self) -> bool {
        self.chart.is_empty()
    }
}

pub fn build_views(records: &[JobPosting], options: &ViewOptions) -> Vec<View> {
    ViewKind::ALL
        .iter()
        .map(|kind| View {
            kind: *kind,
            chart: build_chart(*kind, records, options),
        })
        .collect()
}

fn build_chart(kind: ViewKind, records: &[JobPosting], options: &ViewOptions) -> ChartData {
    match kind {
        ViewKind::SalaryTrend => {
            let trend = trend_by_year(records);
            let title = match (trend.first(), trend.last()) {
                (Some(first), Some(last)) if first.year != last.year => {
                    format!("Salary Trends ({}-{})", first.year, last.year)
                }
                (Some(only), _) => format!("Salary Trends ({})", only.year),
                _ => "Salary Trends".to_string(),
            };
            ChartData::single(
                title,
                trend.iter().map(|p| p.year.to_string()).collect(),
                trend.iter().map(|p| p.mean).collect(),
                ValueFormat::Currency,
            )
            .with_axes("Year", SALARY_AXIS)
        }
        ViewKind::TopPayingRoles => {
            let groups = rank_descending(
                at_least(average_by(records, |r| r.title.clone()), options.min_title_postings),
                |g| g.mean,
                options.top_n,
            );
            let title = with_minimum(
                format!("Top {} Highest Paying Roles", groups.len()),
                options.min_title_postings,
            );
            ranked_salary_chart(title, groups)
        }
        ViewKind::SalaryByExperience => {
            let groups = order_by_rank(average_by(records, |r| r.experience_level), &ExperienceLevel::ORDER);
            ordered_salary_chart("Salary by Experience Level", groups)
        }
        ViewKind::TopLocations => {
            let groups = rank_descending(
                at_least(average_by(records, |r| r.location.clone()), options.min_location_postings),
                |g| g.mean,
                options.top_n,
            );
            let title = with_minimum(
                format!("Top {} Highest Paying Locations", groups.len()),
                options.min_location_postings,
            );
            ranked_salary_chart(title, groups)
        }
        ViewKind::SalaryByCompanySize => {
            let groups = order_by_rank(average_by(records, |r| r.company_size), &CompanySize::ORDER);
            ordered_salary_chart("Salary by Company Size", groups)
        }
        ViewKind::MostCommonJobs => {
            let counts = rank_descending(count_by(records, |r| r.title.clone()), |c| c.count as f64, options.top_n);
            ChartData::single(
                format!("{} Most Common Job Titles", counts.len()),
                counts.iter().map(|c| c.key.clone()).collect(),
                counts.iter().map(|c| c.count as f64).collect(),
                ValueFormat::Count,
            )
            .with_axes("Number of Job Postings", "")
            .horizontal()
        }
    }
}

fn with_minimum(title: String, min_postings: usize) -> String {
    if min_postings > 1 {
        format!("{} (min {} postings)", title, min_postings)
    } else {
        title
    }
}

fn ranked_salary_chart(title: String, groups: Vec<GroupMean<String>>) -> ChartData {
    let annotations = groups.iter().map(|g| format!("n={}", g.count)).collect();
    ChartData::single(
        title,
        groups.iter().map(|g| g.key.clone()).collect(),
        groups.iter().map(|g| g.mean).collect(),
        ValueFormat::Currency,
    )
    .with_axes(SALARY_AXIS, "")
    .horizontal()
    .with_annotations(annotations)
}

fn ordered_salary_chart<K: Display>(title: &str, groups: Vec<GroupMean<K>>) -> ChartData {
    ChartData::single(
        title,
        groups.iter().map(|g| g.key.to_string()).collect(),
        groups.iter().map(|g| g.mean).collect(),
        ValueFormat::Currency,
    )
    .with_axes("", SALARY_AXIS)
    .with_value_labels()
}
