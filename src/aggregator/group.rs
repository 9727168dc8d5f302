//! Grouping records by a caller-supplied category

use std::collections::HashMap;
use std::hash::Hash;

use crate::types::*;

/// Group records by the key returned from `key_fn`
///
/// Records keep their input order inside each group. Categories without
/// records do not appear in the result.
pub fn group_by_category<'a, K, F>(
    records: &'a [ReconciliationRecord],
    key_fn: F,
) -> HashMap<K, Vec<&'a ReconciliationRecord>>
where
    K: Eq + Hash,
    F: Fn(&ReconciliationRecord) -> K,
{
    let mut groups: HashMap<K, Vec<&'a ReconciliationRecord>> = HashMap::new();
    for record in records {
        groups.entry(key_fn(record)).or_default().push(record);
    }
    groups
}

/// Group by the record's own `category`, using `fallback` for uncategorized records
pub fn group_by_record_category<'a>(
    records: &'a [ReconciliationRecord],
    fallback: &str,
) -> HashMap<String, Vec<&'a ReconciliationRecord>> {
    group_by_category(records, |r| {
        r.category.clone().unwrap_or_else(|| fallback.to_string())
    })
}
