/// Combiner — cartesian product of per-node variant sets.

use crate::schema::node::VariantSet;

/// Separator placed between the lines of an assembled script.
pub const LINE_SEPARATOR: &str = "\n";

/// Assemble every script that picks one variant per set, in set order.
///
/// Output is in odometer order: the last set's variant index varies fastest.
/// An empty set anywhere collapses the result to nothing, as does an empty
/// `variant_sets` slice.
///
/// Time and space are `O(product of set sizes)`. Callers bound the product
/// before calling.
pub fn combine(variant_sets: &[VariantSet]) -> Vec<String> {
    let mut sets = variant_sets.iter();
    let Some(first) = sets.next() else {
        return Vec::new();
    };

    let mut acc: Vec<String> = first.iter().cloned().collect();
    for set in sets {
        if acc.is_empty() {
            break;
        }
        let mut next = Vec::with_capacity(acc.len().saturating_mul(set.len()));
        for partial in &acc {
            for variant in set.iter() {
                let mut line =
                    String::with_capacity(partial.len() + LINE_SEPARATOR.len() + variant.len());
                line.push_str(partial);
                line.push_str(LINE_SEPARATOR);
                line.push_str(variant);
                next.push(line);
            }
        }
        acc = next;
    }
    acc
}

/// Number of combinations `combine` would produce, or `None` on overflow.
pub fn combination_count(variant_sets: &[VariantSet]) -> Option<usize> {
    if variant_sets.is_empty() {
        return Some(0);
    }
    variant_sets
        .iter()
        .try_fold(1usize, |total, set| total.checked_mul(set.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets(raw: &[&[&str]]) -> Vec<VariantSet> {
        raw.iter()
            .map(|set| VariantSet::new(set.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn two_by_two_in_odometer_order() {
        let result = combine(&sets(&[&["a1", "a2"], &["b1", "b2"]]));
        assert_eq!(result, vec!["a1\nb1", "a1\nb2", "a2\nb1", "a2\nb2"]);
    }

    #[test]
    fn single_set_is_identity() {
        let result = combine(&sets(&[&["x", "y", "z"]]));
        assert_eq!(result, vec!["x", "y", "z"]);
    }

    #[test]
    fn no_sets_no_output() {
        assert!(combine(&[]).is_empty());
        assert_eq!(combination_count(&[]), Some(0));
    }

    #[test]
    fn empty_set_collapses_result() {
        assert!(combine(&sets(&[&["a"], &[], &["c1", "c2"]])).is_empty());
        assert!(combine(&sets(&[&[], &["b"]])).is_empty());
        assert!(combine(&sets(&[&["a", "b"], &[]])).is_empty());
    }

    #[test]
    fn uneven_sizes() {
        let result = combine(&sets(&[&["a"], &["b1", "b2", "b3"], &["c1", "c2"]]));
        assert_eq!(result.len(), 6);
        assert_eq!(result[0], "a\nb1\nc1");
        assert_eq!(result[1], "a\nb1\nc2");
        assert_eq!(result[5], "a\nb3\nc2");
    }

    #[test]
    fn duplicates_are_kept() {
        let result = combine(&sets(&[&["same", "same"], &["x"]]));
        assert_eq!(result, vec!["same\nx", "same\nx"]);
    }

    #[test]
    fn swapping_sets_changes_line_order() {
        let forward = combine(&sets(&[&["a1", "a2"], &["b1"]]));
        let backward = combine(&sets(&[&["b1"], &["a1", "a2"]]));
        assert_eq!(forward, vec!["a1\nb1", "a2\nb1"]);
        assert_eq!(backward, vec!["b1\na1", "b1\na2"]);
    }

    #[test]
    fn count_matches_product() {
        assert_eq!(combination_count(&sets(&[&["a", "b"], &["c", "d", "e"]])), Some(6));
        assert_eq!(combination_count(&sets(&[&["a"], &[]])), Some(0));
    }

    #[test]
    fn count_reports_overflow() {
        let wide = VariantSet::new(vec![String::new(); 1 << 16]);
        let many = vec![wide; 5];
        assert_eq!(combination_count(&many), None);
    }
}
