//! Renderer-side scene state.
//!
//! Wraps the `force_graph` physics simulation with per-node display data taken
//! from the graph model, the view transform for pan/zoom, and interaction
//! state. Node positions live here, keyed by model node id; the model never
//! sees them.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::scale::{ScaleConfig, ScaledValues};
use crate::model::{Additions, Graph, Node};
use crate::query::{LinkId, NodeId};
use crate::theme::Color;
use crate::workspace::ViewUpdate;

/// Per-node display data attached to each simulation node.
#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub id: NodeId,
	pub label: String,
	pub color: Color,
	/// Size multiplier (1.0 = normal), grows with degree.
	pub size: f64,
	pub visible: bool,
	pub is_path: bool,
	pub is_path_selected: bool,
}

impl NodeInfo {
	fn from_model(node: &Node) -> Self {
		Self {
			id: node.id,
			label: node.name.clone(),
			color: node.color,
			size: 1.0,
			visible: node.visible,
			is_path: node.is_path,
			is_path_selected: node.is_path_selected,
		}
	}
}

/// Display data for one link, resolved to simulation indices.
#[derive(Clone, Debug)]
pub struct EdgeInfo {
	pub id: LinkId,
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub curve: f64,
	pub color: Color,
	pub visible: bool,
	pub is_path: bool,
	pub is_path_selected: bool,
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

fn simulation() -> ForceGraph<NodeInfo, ()> {
	ForceGraph::new(SimulationParameters {
		force_charge: 150.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	})
}

/// Scene built from the graph model and kept in step with it through view updates.
pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub edges: Vec<EdgeInfo>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hovered: Option<DefaultNodeIdx>,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	/// Some element is on a highlighted path; everything else is dimmed.
	pub path_active: bool,
	index: HashMap<NodeId, DefaultNodeIdx>,
}

impl ForceGraphState {
	pub fn new(model: &Graph, width: f64, height: f64) -> Self {
		let mut state = Self {
			graph: simulation(),
			edges: Vec::new(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hovered: None,
			width,
			height,
			animation_running: true,
			path_active: false,
			index: HashMap::new(),
		};
		state.rebuild(model);
		state.sync(model);
		state
	}

	/// Brings the scene in line with the model after `update`.
	pub fn apply(&mut self, model: &Graph, update: &ViewUpdate) {
		match update {
			ViewUpdate::Added(additions) => self.add(model, additions),
			ViewUpdate::Changed => {}
			ViewUpdate::Rebuild => self.rebuild(model),
		}
		self.sync(model);
		self.animation_running = true;
	}

	/// Current position of every node, by model id.
	pub fn positions(&self) -> HashMap<NodeId, (f32, f32)> {
		let mut positions = HashMap::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			positions.insert(node.data.user_data.id, (node.x(), node.y()));
		});
		positions
	}

	/// Places newly merged nodes next to a neighbor already on screen, or on a
	/// ring around the origin when they have none.
	fn add(&mut self, model: &Graph, additions: &Additions) {
		let mut positions = self.positions();
		let fresh = additions.nodes.len().max(1);

		for (i, &id) in additions.nodes.iter().enumerate() {
			let Some(node) = model.node(id) else {
				continue;
			};
			if self.index.contains_key(&id) {
				continue;
			}
			let anchor = model
				.links()
				.filter(|l| l.touches(id))
				.map(|l| if l.source == id { l.target } else { l.source })
				.find_map(|other| positions.get(&other).copied());
			let angle = (i as f64) * 2.0 * PI / fresh as f64;
			let (x, y) = match anchor {
				Some((ax, ay)) => (
					ax + (30.0 * angle.cos()) as f32,
					ay + (30.0 * angle.sin()) as f32,
				),
				None => ((100.0 * angle.cos()) as f32, (100.0 * angle.sin()) as f32),
			};
			self.insert_node(node, x, y);
			positions.insert(id, (x, y));
		}

		for &id in &additions.links {
			if let Some(link) = model.link(id) {
				self.insert_spring(link.source, link.target);
			}
		}
	}

	/// Recreates the simulation from the model, keeping known positions.
	fn rebuild(&mut self, model: &Graph) {
		let positions = self.positions();
		let total = model.node_count().max(1);
		self.graph = simulation();
		self.index.clear();
		self.hovered = None;
		self.drag = DragState::default();

		for (i, node) in model.nodes().enumerate() {
			let (x, y) = positions.get(&node.id).copied().unwrap_or_else(|| {
				let angle = (i as f64) * 2.0 * PI / total as f64;
				((100.0 * angle.cos()) as f32, (100.0 * angle.sin()) as f32)
			});
			self.insert_node(node, x, y);
		}
		for link in model.links() {
			self.insert_spring(link.source, link.target);
		}
	}

	fn insert_node(&mut self, node: &Node, x: f32, y: f32) {
		let idx = self.graph.add_node(NodeData {
			x,
			y,
			mass: 10.0,
			is_anchor: false,
			user_data: NodeInfo::from_model(node),
		});
		self.index.insert(node.id, idx);
	}

	fn insert_spring(&mut self, source: NodeId, target: NodeId) {
		// Self-loops carry no layout force.
		if source == target {
			return;
		}
		if let (Some(&src), Some(&tgt)) = (self.index.get(&source), self.index.get(&target)) {
			self.graph.add_edge(src, tgt, EdgeData::default());
		}
	}

	/// Refreshes display flags, sizes, and the edge list from the model.
	fn sync(&mut self, model: &Graph) {
		let mut degree: HashMap<NodeId, usize> = HashMap::new();
		for link in model.links() {
			*degree.entry(link.source).or_insert(0) += 1;
			*degree.entry(link.target).or_insert(0) += 1;
		}
		let max_degree = degree.values().copied().max().unwrap_or(1).max(1);

		self.graph.visit_nodes_mut(|node| {
			let info = &mut node.data.user_data;
			if let Some(current) = model.node(info.id) {
				let edge_factor = (degree.get(&info.id).copied().unwrap_or(0) as f64
					/ max_degree as f64)
					.sqrt();
				*info = NodeInfo {
					size: 0.8 + 0.7 * edge_factor,
					..NodeInfo::from_model(current)
				};
			}
		});

		let index = &self.index;
		self.edges = model
			.links()
			.filter_map(|link| {
				Some(EdgeInfo {
					id: link.id,
					source: *index.get(&link.source)?,
					target: *index.get(&link.target)?,
					curve: link.curve,
					color: link.color(),
					visible: link.visible,
					is_path: link.is_path,
					is_path_selected: link.is_path_selected,
				})
			})
			.collect();

		self.path_active =
			model.nodes().any(|n| n.is_path) || model.links().any(|l| l.is_path);
	}

	pub fn node_id(&self, idx: DefaultNodeIdx) -> Option<NodeId> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(node.data.user_data.id);
			}
		});
		found
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Visible node under the given screen position, if any.
	pub fn node_at_position(
		&self,
		sx: f64,
		sy: f64,
		config: &ScaleConfig,
	) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let scale = ScaledValues::new(config, self.transform.k);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if !node.data.user_data.visible {
				return;
			}
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			let node_hit_radius = scale.hit_radius * node.data.user_data.size;
			if (dx * dx + dy * dy).sqrt() < node_hit_radius {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		self.hovered = node;
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
