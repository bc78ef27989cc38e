/// Segmentation and combination properties.

use proptest::prelude::*;
use script_engine::core::combiner::{combination_count, combine};
use script_engine::core::segmenter::segment;
use script_engine::schema::node::VariantSet;

fn labelled_sets(sizes: &[usize]) -> Vec<VariantSet> {
    sizes
        .iter()
        .enumerate()
        .map(|(node, &size)| {
            VariantSet::new((0..size).map(|v| format!("n{}v{}", node, v)).collect())
        })
        .collect()
}

#[test]
fn two_nodes_two_variants_exact_output() {
    let sets = vec![VariantSet::from(["a1", "a2"]), VariantSet::from(["b1", "b2"])];
    assert_eq!(
        combine(&sets),
        vec!["a1\nb1", "a1\nb2", "a2\nb1", "a2\nb2"]
    );
}

#[test]
fn single_node_passes_through() {
    let sets = vec![VariantSet::from(["x", "y", "z"])];
    assert_eq!(combine(&sets), vec!["x", "y", "z"]);
}

#[test]
fn zero_nodes_zero_scripts() {
    let nodes = segment("\n  \n");
    assert!(nodes.is_empty());
    let sets: Vec<VariantSet> = nodes.iter().map(|_| VariantSet::from(["unused"])).collect();
    assert!(combine(&sets).is_empty());
}

#[test]
fn fixture_segments_into_three_nodes() {
    let text = std::fs::read_to_string("tests/fixtures/reference_script.txt").unwrap();
    let nodes = segment(&text);
    assert_eq!(nodes.len(), 3);
    assert!(nodes[0].as_str().starts_with("Hi, this is Wang"));
    assert!(nodes[2].as_str().ends_with("learn more."));
}

proptest! {
    #[test]
    fn segment_counts_non_blank_lines(lines in prop::collection::vec("[ a-z\t]{0,8}", 0..12)) {
        let text = lines.join("\n");
        let expected = lines.iter().filter(|l| !l.trim().is_empty()).count();
        prop_assert_eq!(segment(&text).len(), expected);
    }

    #[test]
    fn segment_preserves_order_and_content(lines in prop::collection::vec("[a-z]{1,6}", 1..10)) {
        let text = lines.join("\n\n");
        let nodes: Vec<String> = segment(&text).into_iter().map(|n| n.0).collect();
        prop_assert_eq!(nodes, lines);
    }

    #[test]
    fn combination_count_is_product(sizes in prop::collection::vec(0usize..4, 0..6)) {
        let sets = labelled_sets(&sizes);
        let expected = if sizes.is_empty() { 0 } else { sizes.iter().product::<usize>() };
        let result = combine(&sets);
        prop_assert_eq!(result.len(), expected);
        prop_assert_eq!(combination_count(&sets), Some(expected));
    }

    #[test]
    fn every_script_keeps_node_order(sizes in prop::collection::vec(1usize..4, 1..5)) {
        let sets = labelled_sets(&sizes);
        for script in combine(&sets) {
            let lines: Vec<&str> = script.split('\n').collect();
            prop_assert_eq!(lines.len(), sizes.len());
            for (node, line) in lines.iter().enumerate() {
                let prefix = format!("n{}v", node);
                prop_assert!(line.starts_with(&prefix));
            }
        }
    }

    #[test]
    fn output_is_odometer_ordered(sizes in prop::collection::vec(1usize..4, 1..5)) {
        let sets = labelled_sets(&sizes);
        let result = combine(&sets);
        for (position, script) in result.iter().enumerate() {
            // Decode the position as mixed-radix digits, last node fastest.
            let mut rest = position;
            let mut digits = vec![0usize; sizes.len()];
            for node in (0..sizes.len()).rev() {
                digits[node] = rest % sizes[node];
                rest /= sizes[node];
            }
            let expected: Vec<String> = digits
                .iter()
                .enumerate()
                .map(|(node, v)| format!("n{}v{}", node, v))
                .collect();
            prop_assert_eq!(script, &expected.join("\n"));
        }
    }
}
