use std::collections::BTreeMap;

/// Key holding the overall record count in a statistics map
pub const TOTAL_KEY: &str = "total";

/// Build the category statistics map from per-category counts
///
/// Blank categories are dropped. `total` is inserted last, so a category
/// literally named "total" never shadows the overall count.
pub fn build_statistics<I>(total: u64, per_category: I) -> BTreeMap<String, u64>
where
    I: IntoIterator<Item = (String, u64)>,
{
    let mut stats = BTreeMap::new();
    for (category, count) in per_category {
        if category.trim().is_empty() {
            continue;
        }
        *stats.entry(category).or_insert(0) += count;
    }
    stats.insert(TOTAL_KEY.to_string(), total);
    stats
}
