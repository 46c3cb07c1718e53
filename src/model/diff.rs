//! Applying commit transitions to the graph.

use log::info;

use super::graph::{Additions, Graph, Removed};
use crate::query::{CommitDiff, GraphSlice, LinkId, NodeId};

/// What a commit transition did to the graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffOutcome {
	pub added: Additions,
	pub removed: Removed,
	pub modified_nodes: Vec<NodeId>,
	pub modified_links: Vec<LinkId>,
}

impl DiffOutcome {
	/// Whether the renderer has to drop elements (and so rebuild its scene).
	pub fn removes_anything(&self) -> bool {
		!self.removed.is_empty()
	}
}

impl Graph {
	/// Moves the graph to another commit.
	///
	/// Order: explicit deletions, pruning of links left dangling, additions,
	/// then modifications. Modified records that are not in the graph yet are
	/// merged like additions.
	pub fn apply_diff(&mut self, diff: &CommitDiff) -> DiffOutcome {
		let mut outcome = DiffOutcome::default();

		let link_ids: Vec<LinkId> = diff.deletions.edges.iter().map(|r| r.id()).collect();
		let node_ids: Vec<NodeId> = diff.deletions.nodes.iter().map(|r| r.id()).collect();
		outcome.removed.links = self.remove_link_ids(&link_ids);
		outcome.removed.nodes = self.remove_nodes(&node_ids);
		outcome.removed.links.extend(self.remove_links());

		outcome.added = self.extend(&diff.additions, false, None);

		let mut unseen = GraphSlice::default();
		let mut moved = Vec::new();
		for raw in &diff.modifications.nodes {
			let category = self.category_color(raw.category());
			match self.node_mut(raw.id) {
				Some(node) => {
					node.name = raw.name();
					node.properties = raw.properties.clone();
					if let Some((color, visible)) = category {
						node.category = raw.category().to_string();
						node.color = color;
						node.placeholder = false;
						if node.visible != visible {
							node.visible = visible;
							moved.push(raw.id);
						}
					}
					outcome.modified_nodes.push(raw.id);
				}
				None => unseen.nodes.push(raw.clone()),
			}
		}
		for raw in &diff.modifications.edges {
			self.register_label(&raw.relation);
			match self.link_mut(raw.id) {
				Some(link) => {
					link.label = raw.relation.clone();
					link.properties = raw.properties.clone();
					outcome.modified_links.push(raw.id);
				}
				None => unseen.edges.push(raw.clone()),
			}
		}
		if !unseen.is_empty() {
			outcome.added.append(self.extend(&unseen, false, None));
		}
		if !moved.is_empty() {
			self.set_links_visible(false, Some(&moved));
			self.set_links_visible(true, Some(&moved));
		}

		info!(
			"graph {}: commit diff applied (+{} nodes, +{} links, -{} nodes, -{} links, ~{} modified)",
			self.id(),
			outcome.added.nodes.len(),
			outcome.added.links.len(),
			outcome.removed.nodes.len(),
			outcome.removed.links.len(),
			outcome.modified_nodes.len() + outcome.modified_links.len()
		);
		outcome
	}
}
