use crate::core::aggregate::{
    at_least, average_by, count_by, rank_descending, salary_stats, trend_by_year, GroupCount,
    GroupMean, SalaryStats, YearPoint,
};
use crate::core::views::ViewOptions;
use crate::domain::model::{Dataset, ExperienceLevel};
use crate::utils::error::Result;
use crate::utils::format::{thousands, usd};
use serde::Serialize;
use std::fmt::Display;

const RULE: &str = "======================================================================";

/// Textual key statistics printed after a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_postings: usize,
    pub rejected_rows: usize,
    pub salary: Option<SalaryStats>,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub distinct_locations: usize,
    pub top_titles: Vec<GroupCount<String>>,
    pub top_locations: Vec<GroupCount<String>>,
    pub experience_distribution: Vec<GroupCount<ExperienceLevel>>,
    pub salary_by_experience: Vec<GroupMean<ExperienceLevel>>,
    pub highest_paying_roles: Vec<GroupMean<String>>,
    pub highest_paying_locations: Vec<GroupMean<String>>,
    pub salary_by_archetype: Vec<GroupMean<String>>,
    pub salary_trend: Vec<YearPoint>,
}

impl Summary {
    pub fn build(dataset: &Dataset, options: &ViewOptions) -> Self {
        let records = &dataset.postings;
        let top_n = options.top_n;

        let trend = trend_by_year(records);
        let location_counts = count_by(records, |r| r.location.clone());
        let experience_counts = count_by(records, |r| r.experience_level);
        let experience_len = experience_counts.len();

        Self {
            total_postings: records.len(),
            rejected_rows: dataset.rejected.len(),
            salary: salary_stats(records),
            first_year: trend.first().map(|p| p.year),
            last_year: trend.last().map(|p| p.year),
            distinct_locations: location_counts.len(),
            top_titles: rank_descending(count_by(records, |r| r.title.clone()), |c| c.count as f64, top_n),
            top_locations: rank_descending(location_counts, |c| c.count as f64, top_n),
            experience_distribution: rank_descending(experience_counts, |c| c.count as f64, experience_len),
            salary_by_experience: {
                let groups = average_by(records, |r| r.experience_level);
                let len = groups.len();
                rank_descending(groups, |g| g.mean, len)
            },
            highest_paying_roles: rank_descending(
                at_least(average_by(records, |r| r.title.clone()), options.min_title_postings),
                |g| g.mean,
                top_n,
            ),
            highest_paying_locations: rank_descending(
                at_least(average_by(records, |r| r.location.clone()), options.min_location_postings),
                |g| g.mean,
                top_n,
            ),
            salary_by_archetype: {
                let groups = average_by(records, |r| r.archetype().to_string());
                let len = groups.len();
                rank_descending(groups, |g| g.mean, len)
            },
            salary_trend: trend,
        }
    }

    pub fn top_title(&self) -> Option<&str> {
        self.top_titles.first().map(|c| c.key.as_str())
    }

    pub fn top_location(&self) -> Option<&str> {
        self.top_locations.first().map(|c| c.key.as_str())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\nJOB MARKET SUMMARY\n{}\n\n", RULE, RULE));
        out.push_str(&format!("Total Job Postings: {}\n", thousands(self.total_postings as f64)));
        if self.rejected_rows > 0 {
            out.push_str(&format!("Rejected Rows: {}\n", thousands(self.rejected_rows as f64)));
        }

        let Some(salary) = &self.salary else {
            out.push_str("\nNo postings loaded.\n");
            return out;
        };

        out.push_str(&format!("Average Salary: {}\n", usd(salary.mean)));
        out.push_str(&format!("Median Salary: {}\n", usd(salary.median)));
        out.push_str(&format!("Salary Range: {} - {}\n", usd(salary.min), usd(salary.max)));
        if let (Some(first), Some(last)) = (self.first_year, self.last_year) {
            out.push_str(&format!("Years: {} - {}\n", first, last));
        }
        out.push_str(&format!("Locations: {}\n", self.distinct_locations));

        counts_section(&mut out, &format!("Top {} Job Titles", self.top_titles.len()), &self.top_titles);
        counts_section(&mut out, &format!("Top {} Locations", self.top_locations.len()), &self.top_locations);
        counts_section(&mut out, "Experience Level Distribution", &self.experience_distribution);

        out.push_str(&format!("\n{}\nSALARY ANALYSIS\n{}\n", RULE, RULE));
        means_section(&mut out, "Average Salary by Experience Level", &self.salary_by_experience);
        means_section(&mut out, "Highest Paying Roles", &self.highest_paying_roles);
        means_section(&mut out, "Highest Paying Locations", &self.highest_paying_locations);
        means_section(&mut out, "Average Salary by Role Archetype", &self.salary_by_archetype);

        out.push_str("\nAverage Salary by Year:\n");
        for point in &self.salary_trend {
            out.push_str(&format!(
                "   {:<40} {:>12}  n={}\n",
                point.year,
                usd(point.mean),
                point.count
            ));
        }

        out.push('\n');
        if let Some(title) = self.top_title() {
            out.push_str(&format!("Top Role: {}\n", title));
        }
        if let Some(location) = self.top_location() {
            out.push_str(&format!("Top Location: {}\n", location));
        }
        out
    }
}

fn counts_section<K: Display>(out: &mut String, heading: &str, rows: &[GroupCount<K>]) {
    out.push_str(&format!("\n{}:\n", heading));
    for row in rows {
        out.push_str(&format!("   {:<40} {:>12}\n", row.key.to_string(), thousands(row.count as f64)));
    }
}

fn means_section<K: Display>(out: &mut String, heading: &str, rows: &[GroupMean<K>]) {
    out.push_str(&format!("\n{}:\n", heading));
    if rows.is_empty() {
        out.push_str("   (no groups meet the minimum posting count)\n");
        return;
    }
    for row in rows {
        out.push_str(&format!(
            "   {:<40} {:>12}  n={}\n",
            row.key.to_string(),
            usd(row.mean),
            row.count
        ));
    }
}
