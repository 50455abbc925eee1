//! Panel key uniqueness checks.

use crate::{EventStudyError, Result};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Fail if any key produced by `key` occurs more than once in `rows`.
///
/// The reported key is the first duplicated one in input order, so the
/// error is stable across runs.
///
/// # Arguments
///
/// * `table` - Name used in the error message
/// * `rows` - Rows to check
/// * `key` - Projection of a row onto its declared key tuple
pub fn ensure_unique<T, K, F>(table: &str, rows: &[T], key: F) -> Result<()>
where
    K: Eq + Hash + Debug,
    F: Fn(&T) -> K,
{
    let mut counts: HashMap<K, usize> = HashMap::with_capacity(rows.len());
    for row in rows {
        *counts.entry(key(row)).or_default() += 1;
    }

    if counts.len() == rows.len() {
        return Ok(());
    }

    let duplicate = rows
        .iter()
        .map(&key)
        .find_map(|k| counts.get(&k).filter(|&&n| n > 1).map(|&n| (k, n)));

    match duplicate {
        Some((k, occurrences)) => Err(EventStudyError::DuplicateKey {
            table: table.to_string(),
            key: format!("{k:?}"),
            occurrences,
        }),
        None => Ok(()),
    }
}
