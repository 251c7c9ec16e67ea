//! Bulk list helpers.

use std::collections::HashSet;
use std::hash::Hash;

/// Appends the rows of `extra` whose key is not already present in `base`.
///
/// Keys are taken from `base` before anything is appended, so rows of
/// `extra` sharing a key with each other are all kept.
pub fn union_no_dups<R, K, F>(mut base: Vec<R>, extra: impl IntoIterator<Item = R>, key: F) -> Vec<R>
where
    K: Eq + Hash,
    F: Fn(&R) -> K,
{
    let existing: HashSet<K> = base.iter().map(&key).collect();
    base.extend(extra.into_iter().filter(|row| !existing.contains(&key(row))));
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(raw: &[(&str, i32)]) -> Vec<(String, i32)> {
        raw.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[test]
    fn test_union_skips_existing_keys() {
        let base = rows(&[("B00A", 1), ("B00B", 2)]);
        let extra = rows(&[("B00B", 20), ("B00C", 30)]);
        let merged = union_no_dups(base, extra, |r| r.0.clone());
        assert_eq!(merged, rows(&[("B00A", 1), ("B00B", 2), ("B00C", 30)]));
    }

    #[test]
    fn test_union_keeps_duplicates_within_extra() {
        let merged = union_no_dups(
            rows(&[("B00A", 1)]),
            rows(&[("B00C", 3), ("B00C", 4)]),
            |r| r.0.clone(),
        );
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_union_with_empty_inputs() {
        let empty: Vec<(String, i32)> = Vec::new();
        assert_eq!(
            union_no_dups(empty.clone(), rows(&[("X", 1)]), |r| r.0.clone()),
            rows(&[("X", 1)])
        );
        assert_eq!(
            union_no_dups(rows(&[("X", 1)]), empty, |r| r.0.clone()),
            rows(&[("X", 1)])
        );
    }

    #[test]
    fn test_union_on_vec_rows() {
        let base = vec![vec!["a".to_string(), "1".to_string()]];
        let extra = vec![
            vec!["a".to_string(), "9".to_string()],
            vec!["b".to_string(), "2".to_string()],
        ];
        let merged = union_no_dups(base, extra, |r| r[0].clone());
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1][0], "b");
    }
}
