use serde::Serialize;

use crate::models::{Model, Record};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub label: String,
    pub value: String,
}

impl Highlight {
    pub fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }

    /// `part` of `total` with one decimal, "0.0%" for an empty total.
    pub fn percent(part: usize, total: usize) -> String {
        if total == 0 {
            return "0.0%".to_string();
        }
        format!("{:.1}%", part as f64 * 100.0 / total as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
    pub share: String,
}

/// Counts per distinct value, in order of first appearance.
pub fn breakdown<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<Bucket> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(label, _)| *label == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let total: usize = counts.iter().map(|(_, count)| count).sum();
    counts
        .into_iter()
        .map(|(label, count)| Bucket {
            label: label.to_string(),
            count,
            share: Highlight::percent(count, total),
        })
        .collect()
}

/// Live aggregates for one entity type.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub label: &'static str,
    pub slug: &'static str,
    pub total: usize,
    pub category_field: &'static str,
    pub by_category: Vec<Bucket>,
    pub by_status: Vec<Bucket>,
    pub highlights: Vec<Highlight>,
}

pub fn summarize<M: Model>(records: &[Record<M>]) -> Summary {
    Summary {
        label: M::LABEL,
        slug: M::SLUG,
        total: records.len(),
        category_field: M::CATEGORY_FIELD,
        by_category: breakdown(records.iter().map(|r| r.fields.category())),
        by_status: breakdown(records.iter().filter_map(|r| r.fields.status())),
        highlights: M::highlights(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_keeps_first_seen_order() {
        let buckets = breakdown(["Night", "Morning", "Night", "Night"]);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].label, "Night");
        assert_eq!(buckets[0].count, 3);
        assert_eq!(buckets[0].share, "75.0%");
        assert_eq!(buckets[1].share, "25.0%");
    }

    #[test]
    fn percent_of_nothing_is_zero() {
        assert_eq!(Highlight::percent(0, 0), "0.0%");
        assert_eq!(Highlight::percent(1, 3), "33.3%");
    }
}
