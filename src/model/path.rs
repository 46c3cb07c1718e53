//! Path overlay: marking merged elements as part of a highlighted path.
//!
//! Path finding happens in the query service. The model only receives the
//! resulting sequences (node, edge, node, ..., node) and merges them with a
//! [`PathContext`] active.

use serde_json::Value;

use crate::query::{GraphSlice, LinkId, NodeId, RawEdge, RawNode};

/// One end of a requested path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathEndpoint {
	pub id: NodeId,
	pub name: String,
}

impl PathEndpoint {
	pub fn new(id: NodeId, name: impl Into<String>) -> Self {
		Self {
			id,
			name: name.into(),
		}
	}
}

/// Transient parameters active while merging path results.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathContext {
	pub start: Option<PathEndpoint>,
	pub end: Option<PathEndpoint>,
}

impl PathContext {
	pub fn new(start: PathEndpoint, end: PathEndpoint) -> Self {
		Self {
			start: Some(start),
			end: Some(end),
		}
	}

	/// Whether `id` is the start or end of the path.
	pub fn is_endpoint(&self, id: NodeId) -> bool {
		[&self.start, &self.end]
			.into_iter()
			.flatten()
			.any(|endpoint| endpoint.id == id)
	}
}

/// Ids of the elements making up one returned path, in path order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathSequence {
	pub nodes: Vec<NodeId>,
	pub links: Vec<LinkId>,
}

/// Splits an alternating path into its nodes (even positions) and edges (odd positions).
pub fn split_path(sequence: &[Value]) -> Result<(GraphSlice, PathSequence), serde_json::Error> {
	let mut slice = GraphSlice::default();
	let mut ids = PathSequence::default();
	for (position, element) in sequence.iter().enumerate() {
		if position % 2 == 0 {
			let node: RawNode = serde_json::from_value(element.clone())?;
			ids.nodes.push(node.id);
			slice.nodes.push(node);
		} else {
			let edge: RawEdge = serde_json::from_value(element.clone())?;
			ids.links.push(edge.id);
			slice.edges.push(edge);
		}
	}
	Ok((slice, ids))
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use serde_json::json;

	#[test]
	fn alternating_positions() {
		let sequence = vec![
			json!({"id": 1, "labels": ["Function"], "properties": {"name": "a"}}),
			json!({"id": 10, "src_node": 1, "dest_node": 2, "relation": "CALLS"}),
			json!({"id": 2, "labels": ["Function"], "properties": {"name": "b"}}),
		];
		let (slice, ids) = split_path(&sequence).unwrap();
		assert_eq!(ids, PathSequence {
			nodes: vec![1, 2],
			links: vec![10],
		});
		assert_eq!(slice.nodes.len(), 2);
		assert_eq!(slice.edges[0].dest_node, 2);
	}

	#[test]
	fn malformed_edge_is_an_error() {
		let sequence = vec![json!({"id": 1}), json!({"id": 10}), json!({"id": 2})];
		assert!(split_path(&sequence).is_err());
	}

	#[test]
	fn endpoints() {
		let ctx = PathContext::new(PathEndpoint::new(1, "a"), PathEndpoint::new(9, "z"));
		assert!(ctx.is_endpoint(1));
		assert!(ctx.is_endpoint(9));
		assert!(!ctx.is_endpoint(5));
		assert!(!PathContext::default().is_endpoint(1));
	}
}
