//! Category navigation assembled from configured and observed categories.

use std::collections::{BTreeSet, HashSet};

use crate::domain::entities::CategoryRecord;

/// Configured categories ordered by `sort_order`; ties keep their original order.
pub fn ordered_config(config: &[CategoryRecord]) -> Vec<CategoryRecord> {
    let mut ordered = config.to_vec();
    ordered.sort_by_key(|category| category.sort_order);
    ordered
}

/// Configured names first (by sort order), then any product categories the
/// configuration does not mention, sorted, without duplicates.
pub fn merge_categories(config: &[CategoryRecord], observed: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(config.len() + observed.len());

    for category in ordered_config(config) {
        if category.name.is_empty() {
            continue;
        }
        if seen.insert(category.name.clone()) {
            merged.push(category.name);
        }
    }

    let extras: BTreeSet<&str> = observed
        .iter()
        .map(String::as_str)
        .filter(|name| !name.is_empty() && !seen.contains(*name))
        .collect();
    merged.extend(extras.into_iter().map(str::to_string));

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, sort_order: i32) -> CategoryRecord {
        CategoryRecord {
            name: name.to_string(),
            sort_order,
        }
    }

    #[test]
    fn config_order_then_sorted_extras() {
        let config = [category("B", 2), category("A", 1)];
        let observed = ["A".to_string(), "C".to_string()];
        assert_eq!(merge_categories(&config, &observed), vec!["A", "B", "C"]);
    }

    #[test]
    fn extras_are_sorted_and_deduplicated() {
        let observed = ["Zeta", "alpha", "Beta", "Zeta", ""].map(String::from);
        assert_eq!(
            merge_categories(&[], &observed),
            vec!["Beta", "Zeta", "alpha"]
        );
    }

    #[test]
    fn duplicate_config_names_appear_once() {
        let config = [category("Games", 1), category("Games", 5), category("Keys", 3)];
        assert_eq!(merge_categories(&config, &[]), vec!["Games", "Keys"]);
    }

    #[test]
    fn ordered_config_is_stable_for_equal_sort_orders() {
        let config = [category("x", 1), category("y", 0), category("z", 1)];
        let names: Vec<_> = ordered_config(&config)
            .into_iter()
            .map(|category| category.name)
            .collect();
        assert_eq!(names, vec!["y", "x", "z"]);
    }
}
