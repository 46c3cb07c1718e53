//! Merge properties of the graph model over generated slices.

use std::collections::HashMap;

use code_graph_viewer::Graph;
use code_graph_viewer::query::GraphSlice;
use proptest::prelude::*;
use serde_json::json;

const LABELS: [&str; 4] = ["File", "Class", "Function", ""];

fn slice_strategy(link_ids: std::ops::Range<i64>) -> impl Strategy<Value = GraphSlice> {
	(
		prop::collection::vec((0i64..20, 0usize..LABELS.len()), 0..15),
		prop::collection::vec((link_ids, 0i64..25, 0i64..25), 0..30),
	)
		.prop_map(|(nodes, edges)| {
			let nodes: Vec<_> = nodes
				.into_iter()
				.map(|(id, label)| {
					json!({"id": id, "labels": [LABELS[label]], "properties": {"name": format!("n{id}")}})
				})
				.collect();
			let edges: Vec<_> = edges
				.into_iter()
				.map(|(id, src, dest)| {
					json!({"id": id, "src_node": src, "dest_node": dest, "relation": "CALLS"})
				})
				.collect();
			serde_json::from_value(json!({"nodes": nodes, "edges": edges})).unwrap()
		})
}

fn curves(graph: &Graph) -> HashMap<i64, f64> {
	graph.links().map(|l| (l.id, l.curve)).collect()
}

proptest! {
	#[test]
	fn merging_twice_adds_nothing(slice in slice_strategy(0..40)) {
		let mut graph = Graph::new("repo");
		graph.extend(&slice, false, None);
		let nodes = graph.node_count();
		let links = graph.link_count();
		let before = curves(&graph);

		let again = graph.extend(&slice, false, None);
		prop_assert!(again.is_empty());
		prop_assert_eq!(graph.node_count(), nodes);
		prop_assert_eq!(graph.link_count(), links);
		prop_assert_eq!(curves(&graph), before);
	}

	#[test]
	fn every_link_endpoint_exists(slice in slice_strategy(0..40)) {
		let mut graph = Graph::new("repo");
		graph.extend(&slice, false, None);
		for link in graph.links() {
			prop_assert!(graph.node(link.source).is_some());
			prop_assert!(graph.node(link.target).is_some());
		}
	}

	#[test]
	fn later_merges_keep_existing_curves(
		first in slice_strategy(0..40),
		second in slice_strategy(100..140),
	) {
		let mut graph = Graph::new("repo");
		graph.extend(&first, false, None);
		let before = curves(&graph);

		graph.extend(&second, true, None);
		let after = curves(&graph);
		for (id, curve) in &before {
			prop_assert_eq!(after[id], *curve);
		}
	}

	#[test]
	fn parallel_links_never_share_a_curve(slice in slice_strategy(0..40)) {
		let mut graph = Graph::new("repo");
		graph.extend(&slice, false, None);

		let mut by_pair: HashMap<(i64, i64), Vec<f64>> = HashMap::new();
		for link in graph.links() {
			let pair = (link.source.min(link.target), link.source.max(link.target));
			by_pair.entry(pair).or_default().push(link.curve);
		}
		for curves in by_pair.values() {
			for (i, a) in curves.iter().enumerate() {
				for b in &curves[i + 1..] {
					prop_assert!((a - b).abs() > 1e-9);
				}
			}
		}
	}
}
