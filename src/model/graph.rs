//! The incremental graph model.
//!
//! A [`Graph`] accumulates partial results from the query service (initial
//! load, expansion, path queries, commit diffs) into one deduplicated set of
//! nodes and links. Merges report only what they added so the renderer can
//! grow its scene instead of rebuilding it.

use std::collections::{HashMap, HashSet};

use log::debug;
use serde_json::Value;

use super::category::{Category, CategoryRegistry, Label, LabelRegistry};
use super::element::{Link, Node, curvature};
use super::path::{PathContext, PathSequence, split_path};
use super::store::Store;
use crate::query::{GraphSlice, LinkId, NodeId, RawEdge, RawNode};
use crate::theme::PLACEHOLDER_COLOR;

/// Outcome of merging a single record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upsert {
	/// A new entity was stored.
	Created,
	/// A placeholder node received its authoritative record.
	Resolved,
	/// Already known; at most its path flags changed.
	Existing,
}

/// Elements introduced by one merge, in merge order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Additions {
	pub nodes: Vec<NodeId>,
	pub links: Vec<LinkId>,
	/// Placeholders that were filled in by this merge.
	pub resolved: Vec<NodeId>,
}

impl Additions {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.links.is_empty() && self.resolved.is_empty()
	}

	pub fn append(&mut self, other: Additions) {
		self.nodes.extend(other.nodes);
		self.links.extend(other.links);
		self.resolved.extend(other.resolved);
	}
}

/// Elements dropped by a removal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Removed {
	pub nodes: Vec<NodeId>,
	pub links: Vec<LinkId>,
}

impl Removed {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.links.is_empty()
	}
}

/// Client-side model of one repository's code graph.
///
/// `Graph::default()` is the empty state used before a repository is loaded
/// and when switching repositories.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	id: String,
	categories: CategoryRegistry,
	labels: LabelRegistry,
	nodes: Store<Node>,
	links: Store<Link>,
}

impl Graph {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Self::default()
		}
	}

	/// Repository (graph) name.
	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn categories(&self) -> impl Iterator<Item = &Category> {
		self.categories.iter()
	}

	pub fn category(&self, name: &str) -> Option<&Category> {
		self.categories.get(name)
	}

	pub fn labels(&self) -> impl Iterator<Item = &Label> {
		self.labels.iter()
	}

	/// Nodes in insertion order.
	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.nodes.iter()
	}

	/// Links in insertion order.
	pub fn links(&self) -> impl Iterator<Item = &Link> {
		self.links.iter()
	}

	pub fn node(&self, id: NodeId) -> Option<&Node> {
		self.nodes.get(id)
	}

	pub fn link(&self, id: LinkId) -> Option<&Link> {
		self.links.get(id)
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn link_count(&self) -> usize {
		self.links.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Merges a slice into the graph and reports what was new.
	///
	/// `collapsed` marks nodes created by this call as implicitly added (e.g.
	/// by expansion). With a `path` context, every element touched is flagged
	/// as being on the path.
	pub fn extend(
		&mut self,
		slice: &GraphSlice,
		collapsed: bool,
		path: Option<&PathContext>,
	) -> Additions {
		let mut added = Additions::default();

		for raw in &slice.nodes {
			match self.upsert_node(raw, collapsed, path) {
				Upsert::Created => added.nodes.push(raw.id),
				Upsert::Resolved => added.resolved.push(raw.id),
				Upsert::Existing => {}
			}
		}

		for raw in &slice.edges {
			let (outcome, placeholders) = self.upsert_link(raw, path);
			added.nodes.extend(placeholders);
			if outcome == Upsert::Created {
				added.links.push(raw.id);
			}
		}

		self.assign_curvature(&added.links);
		if !added.resolved.is_empty() {
			// A resolved placeholder may now sit in a hidden category.
			self.set_links_visible(false, Some(&added.resolved));
		}

		debug!(
			"graph {}: merged {} nodes / {} edges, {} new nodes, {} new links, {} resolved",
			self.id,
			slice.nodes.len(),
			slice.edges.len(),
			added.nodes.len(),
			added.links.len(),
			added.resolved.len()
		);
		added
	}

	/// Stores a node record, or updates path flags if it is already known.
	///
	/// Fields of a known node are never overwritten, except that a placeholder
	/// takes the name, category and properties of its first real record.
	pub fn upsert_node(
		&mut self,
		raw: &RawNode,
		collapsed: bool,
		path: Option<&PathContext>,
	) -> Upsert {
		let category = raw.category();
		let (color, visible) = if category.is_empty() {
			(PLACEHOLDER_COLOR, true)
		} else {
			let category = self.categories.get_or_create(category);
			(category.color(), category.visible)
		};

		if let Some(node) = self.nodes.get_mut(raw.id) {
			mark_node(node, path);
			if !node.placeholder {
				return Upsert::Existing;
			}
			node.name = raw.name();
			node.category = category.to_string();
			node.color = color;
			node.visible = visible;
			node.collapsed = collapsed;
			node.placeholder = false;
			node.properties = raw.properties.clone();
			return Upsert::Resolved;
		}

		let mut node = Node {
			id: raw.id,
			name: raw.name(),
			category: category.to_string(),
			color,
			visible,
			collapsed,
			expand: false,
			is_path: false,
			is_path_selected: false,
			placeholder: false,
			properties: raw.properties.clone(),
		};
		mark_node(&mut node, path);
		self.nodes.insert(raw.id, node);
		Upsert::Created
	}

	/// Stores an edge record, synthesizing placeholder endpoints as needed.
	///
	/// Returns the outcome for the link and the ids of any placeholders created.
	pub fn upsert_link(
		&mut self,
		raw: &RawEdge,
		path: Option<&PathContext>,
	) -> (Upsert, Vec<NodeId>) {
		self.labels.get_or_create(&raw.relation);

		if let Some(link) = self.links.get_mut(raw.id) {
			mark_link(link, path);
			return (Upsert::Existing, Vec::new());
		}

		let mut placeholders = Vec::new();
		for endpoint in [raw.src_node, raw.dest_node] {
			if self.ensure_endpoint(endpoint, path) {
				placeholders.push(endpoint);
			}
		}

		let visible = self.endpoints_visible(raw.src_node, raw.dest_node);
		let mut link = Link {
			id: raw.id,
			source: raw.src_node,
			target: raw.dest_node,
			label: raw.relation.clone(),
			visible,
			curve: 0.0,
			is_path: false,
			is_path_selected: false,
			properties: raw.properties.clone(),
		};
		mark_link(&mut link, path);
		self.links.insert(raw.id, link);
		(Upsert::Created, placeholders)
	}

	/// Creates a placeholder for `id` if no node exists yet. Returns whether one was created.
	fn ensure_endpoint(&mut self, id: NodeId, path: Option<&PathContext>) -> bool {
		if self.nodes.contains(id) {
			return false;
		}
		let mut node = Node {
			id,
			name: id.to_string(),
			category: String::new(),
			color: PLACEHOLDER_COLOR,
			visible: true,
			collapsed: true,
			expand: false,
			is_path: false,
			is_path_selected: false,
			placeholder: true,
			properties: Default::default(),
		};
		mark_node(&mut node, path);
		self.nodes.insert(id, node);
		true
	}

	fn endpoints_visible(&self, source: NodeId, target: NodeId) -> bool {
		let visible = |id| self.nodes.get(id).is_some_and(|n: &Node| n.visible);
		visible(source) && visible(target)
	}

	/// Gives each newly added link its curvature from its ordinal among all
	/// links joining the same pair. Links merged earlier keep theirs.
	fn assign_curvature(&mut self, fresh: &[LinkId]) {
		if fresh.is_empty() {
			return;
		}
		let fresh: HashSet<LinkId> = fresh.iter().copied().collect();
		let mut seen: HashMap<(NodeId, NodeId), usize> = HashMap::new();
		let mut curves = Vec::with_capacity(fresh.len());

		for link in self.links.iter() {
			let pair = (link.source.min(link.target), link.source.max(link.target));
			let ordinal = seen.entry(pair).or_insert(0);
			if fresh.contains(&link.id) {
				curves.push((link.id, curvature(*ordinal, link.is_self_loop())));
			}
			*ordinal += 1;
		}

		for (id, curve) in curves {
			if let Some(link) = self.links.get_mut(id) {
				link.curve = curve;
			}
		}
	}

	/// Removes the given nodes. Their links stay until [`Graph::remove_links`].
	pub fn remove_nodes(&mut self, ids: &[NodeId]) -> Vec<NodeId> {
		self.nodes.remove_all(ids)
	}

	/// Removes the given links by id.
	pub fn remove_link_ids(&mut self, ids: &[LinkId]) -> Vec<LinkId> {
		self.links.remove_all(ids)
	}

	/// Drops every link whose source or target is no longer in the graph.
	pub fn remove_links(&mut self) -> Vec<LinkId> {
		let nodes = &self.nodes;
		let removed = self
			.links
			.retain(|link| nodes.contains(link.source) && nodes.contains(link.target));
		if !removed.is_empty() {
			debug!("graph {}: pruned {} dangling links", self.id, removed.len());
		}
		removed
	}

	/// Recomputes link visibility from endpoint visibility.
	///
	/// With `visible = true` a link is shown only if both endpoints are
	/// visible; with `visible = false` it is hidden if either endpoint is
	/// hidden. `node_ids` restricts the pass to links touching those nodes.
	pub fn set_links_visible(&mut self, visible: bool, node_ids: Option<&[NodeId]>) {
		let scope: Option<HashSet<NodeId>> = node_ids.map(|ids| ids.iter().copied().collect());
		let nodes = &self.nodes;
		let shown = |id: NodeId| nodes.get(id).is_some_and(|n| n.visible);

		for link in self.links.values_mut() {
			if let Some(scope) = &scope
				&& !scope.contains(&link.source)
				&& !scope.contains(&link.target)
			{
				continue;
			}
			let both = shown(link.source) && shown(link.target);
			if visible && both {
				link.visible = true;
			} else if !visible && !both {
				link.visible = false;
			}
		}
	}

	/// Shows or hides a category along with its nodes and their links.
	///
	/// Returns `false` if the category is unknown.
	pub fn set_category_visible(&mut self, name: &str, visible: bool) -> bool {
		if !self.categories.set_visible(name, visible) {
			return false;
		}
		let mut members = Vec::new();
		for node in self.nodes.values_mut() {
			if node.category == name {
				node.visible = visible;
				members.push(node.id);
			}
		}
		self.set_links_visible(visible, Some(&members));
		true
	}

	/// Shows or hides a single node and recomputes its links.
	pub fn set_node_visible(&mut self, id: NodeId, visible: bool) -> bool {
		let Some(node) = self.nodes.get_mut(id) else {
			return false;
		};
		node.visible = visible;
		self.set_links_visible(visible, Some(&[id]));
		true
	}

	pub fn set_expanded(&mut self, id: NodeId, expand: bool) -> bool {
		match self.nodes.get_mut(id) {
			Some(node) => {
				node.expand = expand;
				true
			}
			None => false,
		}
	}

	/// Undoes expansion of `ids`.
	///
	/// Removes implicitly added (collapsed) nodes that are link targets of a
	/// collapsing node, continues through removed nodes that were themselves
	/// expanded, then prunes the links left dangling.
	pub fn collapse(&mut self, ids: &[NodeId]) -> Removed {
		let roots: HashSet<NodeId> = ids.iter().copied().collect();
		for &id in ids {
			self.set_expanded(id, false);
		}

		let mut removed = Removed::default();
		let mut frontier: HashSet<NodeId> = roots.clone();
		while !frontier.is_empty() {
			let children: HashSet<NodeId> = self
				.links
				.iter()
				.filter(|link| frontier.contains(&link.source))
				.map(|link| link.target)
				.collect();
			let doomed: Vec<(NodeId, bool)> = self
				.nodes
				.iter()
				.filter(|n| n.collapsed && children.contains(&n.id) && !roots.contains(&n.id))
				.map(|n| (n.id, n.expand))
				.collect();

			frontier = doomed.iter().filter(|(_, expand)| *expand).map(|(id, _)| *id).collect();
			let doomed: Vec<NodeId> = doomed.into_iter().map(|(id, _)| id).collect();
			removed.nodes.extend(self.remove_nodes(&doomed));
		}

		removed.links = self.remove_links();
		removed
	}

	/// Clears path flags on every node and link.
	pub fn clear_path(&mut self) {
		for node in self.nodes.values_mut() {
			node.is_path = false;
			node.is_path_selected = false;
		}
		for link in self.links.values_mut() {
			link.is_path = false;
			link.is_path_selected = false;
		}
	}

	/// Replaces the path overlay with the sequences returned by the query service.
	///
	/// Every sequence is decoded before anything is merged, so a malformed
	/// path leaves the graph (and the previous overlay) untouched.
	pub fn extend_paths(
		&mut self,
		paths: &[Vec<Value>],
		context: &PathContext,
	) -> Result<(Additions, Vec<PathSequence>), serde_json::Error> {
		let decoded = paths
			.iter()
			.map(|sequence| split_path(sequence))
			.collect::<Result<Vec<_>, _>>()?;

		self.clear_path();
		let mut added = Additions::default();
		let mut sequences = Vec::with_capacity(decoded.len());
		for (slice, ids) in decoded {
			added.append(self.extend(&slice, false, Some(context)));
			sequences.push(ids);
		}
		Ok((added, sequences))
	}

	/// Highlights one path among several: its elements become selected, all
	/// others are deselected.
	pub fn select_path(&mut self, sequence: &PathSequence) {
		let nodes: HashSet<NodeId> = sequence.nodes.iter().copied().collect();
		let links: HashSet<LinkId> = sequence.links.iter().copied().collect();
		for node in self.nodes.values_mut() {
			node.is_path_selected = nodes.contains(&node.id);
		}
		for link in self.links.values_mut() {
			link.is_path_selected = links.contains(&link.id);
		}
	}

	pub(super) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
		self.nodes.get_mut(id)
	}

	pub(super) fn link_mut(&mut self, id: LinkId) -> Option<&mut Link> {
		self.links.get_mut(id)
	}

	pub(super) fn category_color(&mut self, name: &str) -> Option<(crate::theme::Color, bool)> {
		if name.is_empty() {
			return None;
		}
		let category = self.categories.get_or_create(name);
		Some((category.color(), category.visible))
	}

	pub(super) fn register_label(&mut self, name: &str) {
		self.labels.get_or_create(name);
	}
}

fn mark_node(node: &mut Node, path: Option<&PathContext>) {
	if let Some(context) = path {
		node.is_path = true;
		if context.is_endpoint(node.id) {
			node.is_path_selected = true;
		}
	}
}

fn mark_link(link: &mut Link, path: Option<&PathContext>) {
	if path.is_some() {
		link.is_path = true;
	}
}
