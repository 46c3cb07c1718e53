//! Access to the backend graph query service.
//!
//! [`QueryService`] is the seam between the viewer and the backend. The
//! [`HttpQueryService`] implementation talks JSON over HTTP; tests substitute
//! an in-memory fake.

mod client;
pub mod types;

pub use client::HttpQueryService;
pub use types::{
	Commit, CommitDiff, EntityRef, GraphSlice, LinkId, NodeId, PathsResponse, Properties, RawEdge,
	RawNode, Schema,
};

use crate::error::Result;

/// Operations offered by the graph query service.
///
/// Implementations only fetch; they never touch the graph model.
#[allow(
	async_fn_in_trait,
	reason = "single-threaded wasm target, callers use static dispatch"
)]
pub trait QueryService {
	/// Initial graph slice for a repository.
	async fn graph(&self, repo: &str) -> Result<GraphSlice>;

	/// Neighbors of the given nodes, used for expansion.
	async fn neighbors(&self, repo: &str, node_ids: &[NodeId]) -> Result<GraphSlice>;

	/// Paths between two nodes, already computed by the service.
	async fn find_paths(&self, repo: &str, src: NodeId, dest: NodeId) -> Result<PathsResponse>;

	/// Label and relation statistics.
	async fn schema(&self, repo: &str) -> Result<Schema>;

	/// Commits known for the repository, newest first.
	async fn commits(&self, repo: &str) -> Result<Vec<Commit>>;

	/// Changes needed to move the graph to `commit`.
	async fn switch_commit(&self, repo: &str, commit: &str) -> Result<CommitDiff>;

	/// Nodes whose name starts with `prefix`.
	async fn auto_complete(&self, repo: &str, prefix: &str) -> Result<Vec<RawNode>>;

	/// Natural-language question about the repository.
	async fn chat(&self, repo: &str, message: &str) -> Result<String>;

	/// Repositories the service has indexed.
	async fn repositories(&self) -> Result<Vec<String>>;
}
