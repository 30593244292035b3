use crate::domain::model::JobPosting;
use serde::Serialize;
use std::collections::BTreeMap;

/// Mean salary of one group. Only built for groups with at least one posting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean<K> {
    pub key: K,
    pub mean: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount<K> {
    pub key: K,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearPoint {
    pub year: i32,
    pub mean: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalaryStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// Groups postings by `key_fn` and averages `salary_usd` per group.
///
/// Output is in ascending key order. A key only appears when at least one
/// posting maps to it, so no mean is ever taken over an empty group.
pub fn average_by<K, F>(records: &[JobPosting], key_fn: F) -> Vec<GroupMean<K>>
where
    K: Ord,
    F: Fn(&JobPosting) -> K,
{
    let mut groups: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(key_fn(record)).or_insert((0.0, 0));
        entry.0 += record.salary_usd;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(key, (sum, count))| GroupMean {
            key,
            mean: sum / count as f64,
            count,
        })
        .collect()
}

/// Frequency table in ascending key order.
pub fn count_by<K, F>(records: &[JobPosting], key_fn: F) -> Vec<GroupCount<K>>
where
    K: Ord,
    F: Fn(&JobPosting) -> K,
{
    let mut groups: BTreeMap<K, usize> = BTreeMap::new();
    for record in records {
        *groups.entry(key_fn(record)).or_insert(0) += 1;
    }

    groups
        .into_iter()
        .map(|(key, count)| GroupCount { key, count })
        .collect()
}

/// One point per year present in `records`, ascending by year.
pub fn trend_by_year(records: &[JobPosting]) -> Vec<YearPoint> {
    average_by(records, |r| r.year)
        .into_iter()
        .map(|g| YearPoint {
            year: g.key,
            mean: g.mean,
            count: g.count,
        })
        .collect()
}

/// Stable sort by `value` descending, then keep the first `top_n`.
///
/// Inputs come out of the grouping functions in key order, so ties keep
/// that order and the ranking is reproducible.
pub fn rank_descending<T, F>(mut items: Vec<T>, value: F, top_n: usize) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| value(b).total_cmp(&value(a)));
    items.truncate(top_n);
    items
}

/// Reorders groups to follow `order`. Keys that have no group are skipped.
pub fn order_by_rank<K: PartialEq>(groups: Vec<GroupMean<K>>, order: &[K]) -> Vec<GroupMean<K>> {
    let mut remaining: Vec<Option<GroupMean<K>>> = groups.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(remaining.len());
    for wanted in order {
        if let Some(slot) = remaining
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|g| &g.key == wanted))
        {
            if let Some(group) = slot.take() {
                ordered.push(group);
            }
        }
    }
    ordered
}

/// Drops groups backed by fewer than `min_count` postings.
pub fn at_least<K>(groups: Vec<GroupMean<K>>, min_count: usize) -> Vec<GroupMean<K>> {
    groups.into_iter().filter(|g| g.count >= min_count).collect()
}

pub fn salary_stats(records: &[JobPosting]) -> Option<SalaryStats> {
    if records.is_empty() {
        return None;
    }

    let mut salaries: Vec<f64> = records.iter().map(|r| r.salary_usd).collect();
    salaries.sort_by(f64::total_cmp);

    let count = salaries.len();
    let sum: f64 = salaries.iter().sum();
    let median = if count % 2 == 0 {
        (salaries[count / 2 - 1] + salaries[count / 2]) / 2.0
    } else {
        salaries[count / 2]
    };

    Some(SalaryStats {
        count,
        mean: sum / count as f64,
        median,
        min: salaries[0],
        max: salaries[count - 1],
    })
}
