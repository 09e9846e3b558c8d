//! Property-based tests for subrepository sets and the manifest format.
//!
//! These tests use proptest to generate random sets and verify that the
//! reconciliation and serialization invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::manifest;
    use crate::subrepository::{Subrepositories, Subrepository};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    /// Sets with unique relative paths.
    fn unique_set() -> impl Strategy<Value = Subrepositories> {
        prop::collection::btree_map(
            "[a-z][a-z0-9/_-]{0,12}",
            ("[a-z]{1,8}://[a-z.]{1,10}/[a-z]{1,6}", "[a-z][a-z0-9/-]{0,8}"),
            0..12,
        )
        .prop_map(|map: BTreeMap<String, (String, String)>| {
            map.into_iter()
                .map(|(rel, (remote, branch))| Subrepository::new(&rel, &remote, &branch))
                .collect()
        })
    }

    /// Two sets whose keys do not overlap.
    fn disjoint_sets() -> impl Strategy<Value = (Subrepositories, Subrepositories)> {
        (unique_set(), unique_set()).prop_map(|(a, b)| {
            let b: Subrepositories = b
                .into_iter()
                .map(|s| Subrepository::new(&format!("other/{}", s.rel()), s.remote(), s.branch()))
                .collect();
            (a, b)
        })
    }

    proptest! {
        /// Property: a set never differs from itself
        #[test]
        fn diff_with_self_is_empty(set in unique_set()) {
            let (ins, del) = set.diff(&set);
            prop_assert!(ins.is_empty());
            prop_assert!(del.is_empty());
        }

        /// Property: Diff(A, A∪B) = (B, ∅) and Diff(A∪B, A) = (∅, B)
        #[test]
        fn diff_against_union((a, b) in disjoint_sets()) {
            let mut union = a.clone();
            union.add_all(&b);

            let (ins, del) = a.diff(&union);
            prop_assert_eq!(ins.sorted(), b.sorted());
            prop_assert!(del.is_empty());

            let (ins, del) = union.diff(&a);
            prop_assert!(ins.is_empty());
            prop_assert_eq!(del.sorted(), b.sorted());
        }

        /// Property: removing everything that was added leaves nothing
        #[test]
        fn remove_all_undoes_add_all(set in unique_set()) {
            let mut added = Subrepositories::new();
            added.add_all(&set);
            added.remove_all(&set);
            prop_assert!(added.is_empty());
        }

        /// Property: sorting is idempotent and keeps branch-major order
        #[test]
        fn sort_is_branch_major(set in unique_set()) {
            let sorted = set.sorted();
            prop_assert_eq!(sorted.sorted(), sorted.clone());
            let items: Vec<&Subrepository> = sorted.iter().collect();
            for pair in items.windows(2) {
                prop_assert!(
                    (pair[0].branch(), pair[0].rel()) <= (pair[1].branch(), pair[1].rel())
                );
            }
        }

        /// Property: write then read yields the same records, whatever the
        /// insertion order
        #[test]
        fn manifest_round_trip(set in unique_set(), reverse in any::<bool>()) {
            let input: Subrepositories = if reverse {
                let mut items: Vec<Subrepository> = set.clone().into_iter().collect();
                items.reverse();
                items.into()
            } else {
                set.clone()
            };

            let text = manifest::to_string(&input);
            let back = manifest::parse(&text).unwrap();

            prop_assert_eq!(back.sorted(), set.sorted());
        }
    }
}
