use serde::Deserialize;

use crate::models::{Model, Record};

/// Category value meaning "no restriction".
pub const ALL: &str = "all";

/// Listing query string: `?search=..&category=..&tab=..`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tab: String,
}

impl ListQuery {
    pub fn category_or_all(&self) -> &str {
        if self.category.is_empty() {
            ALL
        } else {
            &self.category
        }
    }
}

/// Records whose search fields contain `term` (case-insensitive) and whose
/// category equals `category`, unless it is "all" or empty. Order is kept.
pub fn filter<'a, M: Model>(
    items: &'a [Record<M>],
    term: &str,
    category: &str,
) -> Vec<&'a Record<M>> {
    let needle = term.trim().to_lowercase();
    let any_category = category.is_empty() || category == ALL;

    items
        .iter()
        .filter(|item| any_category || item.fields.category() == category)
        .filter(|item| {
            needle.is_empty()
                || item
                    .fields
                    .search_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MaterialStatus, RawMaterial};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn material(id: i64, name: &str, supplier: &str, status: MaterialStatus) -> Record<RawMaterial> {
        Record {
            id,
            fields: RawMaterial {
                material_name: name.into(),
                material_code: format!("RM-{id:03}"),
                category: "Steel".into(),
                quantity: 10,
                unit: "kg".into(),
                minimum_stock: 5,
                maximum_stock: 25,
                supplier: supplier.into(),
                cost_per_unit: Decimal::new(450, 2),
                status,
            },
            created_at: Utc::now(),
        }
    }

    fn stock() -> Vec<Record<RawMaterial>> {
        vec![
            material(1, "Steel Rod", "Steel Works Ltd", MaterialStatus::Available),
            material(2, "Aluminum Sheet", "AluCorp", MaterialStatus::LowStock),
            material(3, "Titanium Bar", "Ti Metals", MaterialStatus::Available),
            material(4, "Stainless Plate", "Steel Works Ltd", MaterialStatus::OnOrder),
        ]
    }

    fn ids(records: &[&Record<RawMaterial>]) -> Vec<i64> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn empty_term_and_all_return_everything_in_order() {
        let items = stock();
        assert_eq!(ids(&filter(&items, "", ALL)), vec![1, 2, 3, 4]);
        assert_eq!(ids(&filter(&items, "", "")), vec![1, 2, 3, 4]);
    }

    #[test]
    fn match_is_case_insensitive() {
        let items = stock();
        assert_eq!(ids(&filter(&items, "STEEL", ALL)), vec![1, 4]);
    }

    #[test]
    fn any_search_field_matches() {
        let items = stock();
        assert_eq!(ids(&filter(&items, "rm-003", ALL)), vec![3]);
        assert_eq!(ids(&filter(&items, "alucorp", ALL)), vec![2]);
    }

    #[test]
    fn search_and_category_are_combined() {
        let items = stock();
        assert_eq!(ids(&filter(&items, "steel", "Available")), vec![1]);
        assert!(filter(&items, "steel", "Low Stock").is_empty());
    }

    #[test]
    fn filtering_twice_changes_nothing() {
        let items = stock();
        let once: Vec<Record<RawMaterial>> =
            filter(&items, "s", "Available").into_iter().cloned().collect();
        let twice = filter(&once, "s", "Available");
        assert_eq!(ids(&twice), once.iter().map(|r| r.id).collect::<Vec<_>>());
    }
}
