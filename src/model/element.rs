//! Node and link records held by the graph model.

use crate::query::{LinkId, NodeId, Properties};
use crate::theme::{Color, EDGE_COLOR, PATH_COLOR};

/// A code entity (module, class, function, ...).
///
/// Identity fields (`id`) never change. Layout state lives with the renderer,
/// keyed by `id`.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: NodeId,
	pub name: String,
	/// Category name; empty for placeholders.
	pub category: String,
	pub color: Color,
	pub visible: bool,
	/// Added implicitly (by expansion or as an edge endpoint) rather than requested.
	pub collapsed: bool,
	/// Its neighbors have been fetched and merged.
	pub expand: bool,
	pub is_path: bool,
	pub is_path_selected: bool,
	/// Synthesized for an edge endpoint before the node's own record arrived.
	pub placeholder: bool,
	pub properties: Properties,
}

/// A relation between two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	pub id: LinkId,
	pub source: NodeId,
	pub target: NodeId,
	/// Relation name.
	pub label: String,
	pub visible: bool,
	/// Bend factor separating parallel edges and self-loops. Fixed at insertion.
	pub curve: f64,
	pub is_path: bool,
	pub is_path_selected: bool,
	pub properties: Properties,
}

impl Link {
	pub fn is_self_loop(&self) -> bool {
		self.source == self.target
	}

	/// Whether this link joins the same two nodes as `(a, b)`, in either direction.
	pub fn joins(&self, a: NodeId, b: NodeId) -> bool {
		(self.source == a && self.target == b) || (self.source == b && self.target == a)
	}

	pub fn touches(&self, id: NodeId) -> bool {
		self.source == id || self.target == id
	}

	pub fn color(&self) -> Color {
		if self.is_path { PATH_COLOR } else { EDGE_COLOR }
	}
}

/// Curvature for the link at `ordinal` among links sharing its endpoint pair.
///
/// Successive parallel links alternate sides with growing magnitude; self-loops
/// start three steps out so they never collapse onto the node.
pub fn curvature(ordinal: usize, self_loop: bool) -> f64 {
	let i = ordinal as i64;
	let even = i % 2 == 0;
	let step = if even { -(i / 2) } else { (i + 1) / 2 };
	let step = match (self_loop, even) {
		(false, _) => step,
		(true, true) => step - 3,
		(true, false) => step + 2,
	};
	step as f64 * 0.1
}
