//! Wire shapes exchanged with the graph query service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend-assigned node identifier.
pub type NodeId = i64;
/// Backend-assigned edge identifier.
pub type LinkId = i64;
/// Arbitrary backend properties carried alongside a node or edge.
pub type Properties = serde_json::Map<String, Value>;

/// A node record as returned by the service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
	pub id: NodeId,
	/// Labels in backend order; the first one is the node's category.
	#[serde(default)]
	pub labels: Vec<String>,
	#[serde(default)]
	pub properties: Properties,
}

impl RawNode {
	/// The primary label, used as the node's category.
	pub fn category(&self) -> &str {
		self.labels.first().map(String::as_str).unwrap_or_default()
	}

	/// The `name` property, falling back to the stringified id.
	pub fn name(&self) -> String {
		match self.properties.get("name") {
			Some(Value::String(name)) => name.clone(),
			Some(other) if !other.is_null() => other.to_string(),
			_ => self.id.to_string(),
		}
	}
}

/// An edge record as returned by the service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEdge {
	pub id: LinkId,
	pub src_node: NodeId,
	pub dest_node: NodeId,
	#[serde(default)]
	pub relation: String,
	#[serde(default)]
	pub properties: Properties,
}

/// A partial graph: the unit merged into the model.
///
/// The service names the edge list either `edges` or `links`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSlice {
	#[serde(default)]
	pub nodes: Vec<RawNode>,
	#[serde(default, alias = "links")]
	pub edges: Vec<RawEdge>,
}

impl GraphSlice {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}
}

/// Response to a path query: each path alternates node, edge, node, ...
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PathsResponse {
	#[serde(default)]
	pub paths: Vec<Vec<Value>>,
}

/// Reference to an entity in a deletion list: a bare id or a record carrying one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
	Id(i64),
	Record { id: i64 },
}

impl EntityRef {
	pub fn id(self) -> i64 {
		match self {
			EntityRef::Id(id) | EntityRef::Record { id } => id,
		}
	}
}

/// Entities removed by a commit transition.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Deletions {
	#[serde(default)]
	pub nodes: Vec<EntityRef>,
	#[serde(default, alias = "links")]
	pub edges: Vec<EntityRef>,
}

/// How the graph changes between two commits.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CommitDiff {
	#[serde(default)]
	pub deletions: Deletions,
	#[serde(default)]
	pub additions: GraphSlice,
	#[serde(default)]
	pub modifications: GraphSlice,
}

/// A commit as listed by the service.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Commit {
	pub hash: String,
	#[serde(default)]
	pub date: i64,
	#[serde(default)]
	pub author: String,
	#[serde(default)]
	pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CommitsResponse {
	#[serde(default)]
	pub commits: Vec<Commit>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CompletionsResponse {
	#[serde(default)]
	pub completions: Vec<RawNode>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChatResponse {
	#[serde(default)]
	pub response: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RepositoriesResponse {
	#[serde(default)]
	pub repositories: Vec<String>,
}

/// Per-attribute statistics in a schema description.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AttributeSchema {
	#[serde(rename = "type", default)]
	pub kind: String,
	#[serde(default)]
	pub count: u64,
}

/// Schema of one node label.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct LabelSchema {
	#[serde(default)]
	pub node_count: u64,
	#[serde(default)]
	pub attributes: BTreeMap<String, AttributeSchema>,
}

/// Schema of one relation type.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RelationSchema {
	#[serde(default)]
	pub edge_count: u64,
	#[serde(default)]
	pub attributes: BTreeMap<String, AttributeSchema>,
	/// Labels this relation connects.
	#[serde(default)]
	pub connect: Vec<String>,
}

/// Result of schema introspection.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Schema {
	#[serde(default)]
	pub node_count: u64,
	#[serde(default)]
	pub edge_count: u64,
	#[serde(default)]
	pub labels: BTreeMap<String, LabelSchema>,
	#[serde(default)]
	pub relations: BTreeMap<String, RelationSchema>,
}
