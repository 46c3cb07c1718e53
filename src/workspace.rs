//! A viewing session: one query service, one graph, and the state around it.
//!
//! The workspace fetches, then applies each response to the model in a single
//! synchronous step. No `RefCell` borrow is held across an `.await`, and a
//! failed fetch never touches the model.

use std::cell::{Ref, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use log::{info, warn};

use crate::chat::ChatHistory;
use crate::error::{Error, Result};
use crate::model::{Additions, DiffOutcome, Graph, PathContext, PathEndpoint, PathSequence, Removed};
use crate::query::{Commit, GraphSlice, NodeId, QueryService, Schema};
use crate::search::{SearchState, SearchTicket};

/// Change notification consumed by the renderer.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewUpdate {
	/// New elements were merged; existing ones may have changed flags.
	Added(Additions),
	/// Only flags (visibility, path, expansion) changed.
	Changed,
	/// Elements were removed or the graph was replaced.
	Rebuild,
}

/// Shared read access to the graph plus the queue of pending view updates.
#[derive(Clone, Debug, Default)]
pub struct ViewFeed {
	graph: Rc<RefCell<Graph>>,
	updates: Rc<RefCell<VecDeque<ViewUpdate>>>,
}

impl ViewFeed {
	pub fn graph(&self) -> Ref<'_, Graph> {
		self.graph.borrow()
	}

	/// Takes every update published since the last call.
	pub fn drain(&self) -> Vec<ViewUpdate> {
		self.updates.borrow_mut().drain(..).collect()
	}

	fn publish(&self, update: ViewUpdate) {
		self.updates.borrow_mut().push_back(update);
	}
}

/// Result of toggling expansion on a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expansion {
	Expanded(Additions),
	Collapsed(Removed),
}

/// One row of the category legend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegendEntry {
	pub name: String,
	pub color: String,
	pub visible: bool,
}

pub struct Workspace<Q> {
	query: Q,
	repo: RefCell<String>,
	feed: ViewFeed,
	chat: RefCell<ChatHistory>,
	search: RefCell<SearchState>,
}

impl<Q: QueryService> Workspace<Q> {
	pub fn new(query: Q, repo: impl Into<String>, search_debounce: Duration) -> Self {
		let repo = repo.into();
		Self {
			query,
			feed: ViewFeed {
				graph: Rc::new(RefCell::new(Graph::new(repo.clone()))),
				updates: Rc::default(),
			},
			repo: RefCell::new(repo),
			chat: RefCell::default(),
			search: RefCell::new(SearchState::new(search_debounce)),
		}
	}

	pub fn repo(&self) -> String {
		self.repo.borrow().clone()
	}

	pub fn graph(&self) -> Ref<'_, Graph> {
		self.feed.graph()
	}

	pub fn feed(&self) -> ViewFeed {
		self.feed.clone()
	}

	pub fn chat(&self) -> Ref<'_, ChatHistory> {
		self.chat.borrow()
	}

	pub fn search(&self) -> Ref<'_, SearchState> {
		self.search.borrow()
	}

	/// Replaces the graph with a fresh load of `repo`.
	pub async fn open_repo(&self, repo: &str) -> Result<Additions> {
		if repo.trim().is_empty() {
			return Err(Error::MissingParameter("repo"));
		}
		let slice = logged("load graph", self.query.graph(repo).await)?;

		let mut graph = Graph::new(repo);
		let added = graph.extend(&slice, false, None);
		*self.feed.graph.borrow_mut() = graph;
		*self.repo.borrow_mut() = repo.to_string();
		*self.chat.borrow_mut() = ChatHistory::default();
		self.feed.publish(ViewUpdate::Rebuild);
		info!(
			"opened {}: {} nodes, {} links",
			repo,
			added.nodes.len(),
			added.links.len()
		);
		Ok(added)
	}

	/// Opens the configured repository, or the first one the service knows.
	pub async fn load(&self) -> Result<Additions> {
		let mut repo = self.repo();
		if repo.is_empty() {
			let repos = logged("list repositories", self.query.repositories().await)?;
			repo = repos.into_iter().next().ok_or(Error::MissingParameter("repo"))?;
		}
		self.open_repo(&repo).await
	}

	/// Expands a node by merging its neighbors, or collapses it if already expanded.
	pub async fn toggle_expand(&self, id: NodeId) -> Result<Expansion> {
		let expanded = match self.graph().node(id) {
			Some(node) => node.expand,
			None => return Err(Error::MissingParameter("node")),
		};

		if expanded {
			let removed = self.feed.graph.borrow_mut().collapse(&[id]);
			self.feed.publish(ViewUpdate::Rebuild);
			return Ok(Expansion::Collapsed(removed));
		}

		let repo = self.repo();
		let slice = logged("expand node", self.query.neighbors(&repo, &[id]).await)?;
		let added = {
			let mut graph = self.feed.graph.borrow_mut();
			let added = graph.extend(&slice, true, None);
			graph.set_expanded(id, true);
			added
		};
		self.feed.publish(ViewUpdate::Added(added.clone()));
		Ok(Expansion::Expanded(added))
	}

	/// Asks the service for paths between two nodes and highlights them.
	pub async fn show_path(
		&self,
		start: Option<PathEndpoint>,
		end: Option<PathEndpoint>,
	) -> Result<Vec<PathSequence>> {
		let start = start.ok_or(Error::MissingParameter("src"))?;
		let end = end.ok_or(Error::MissingParameter("dest"))?;

		self.chat.borrow_mut().begin_path_query();
		let repo = self.repo();
		let (src, dest) = (start.id, end.id);
		let context = PathContext::new(start, end);
		let merged = logged("find paths", self.query.find_paths(&repo, src, dest).await)
			.and_then(|response| {
				let mut graph = self.feed.graph.borrow_mut();
				Ok(graph.extend_paths(&response.paths, &context)?)
			});
		let (added, sequences) = match merged {
			Ok(merged) => merged,
			Err(e) => {
				self.chat.borrow_mut().abandon_path_query();
				return Err(e);
			}
		};
		self.chat.borrow_mut().attach_paths(sequences.clone());
		self.feed.publish(ViewUpdate::Added(added));
		Ok(sequences)
	}

	/// Highlights one of the paths returned by the last path query.
	pub fn select_path(&self, sequence: &PathSequence) {
		self.feed.graph.borrow_mut().select_path(sequence);
		self.feed.publish(ViewUpdate::Changed);
	}

	/// Moves the graph to another commit.
	pub async fn switch_commit(&self, hash: &str) -> Result<DiffOutcome> {
		if hash.trim().is_empty() {
			return Err(Error::MissingParameter("commit"));
		}
		let repo = self.repo();
		let diff = logged("switch commit", self.query.switch_commit(&repo, hash).await)?;
		let outcome = self.feed.graph.borrow_mut().apply_diff(&diff);
		if outcome.removes_anything() {
			self.feed.publish(ViewUpdate::Rebuild);
		} else {
			self.feed.publish(ViewUpdate::Added(outcome.added.clone()));
		}
		Ok(outcome)
	}

	pub async fn commits(&self) -> Result<Vec<Commit>> {
		let repo = self.repo();
		logged("list commits", self.query.commits(&repo).await)
	}

	pub async fn schema(&self) -> Result<Schema> {
		let repo = self.repo();
		logged("schema", self.query.schema(&repo).await)
	}

	pub async fn repositories(&self) -> Result<Vec<String>> {
		logged("list repositories", self.query.repositories().await)
	}

	/// Sends a question to the service and records the exchange.
	pub async fn ask(&self, question: &str) -> Result<String> {
		if question.trim().is_empty() {
			return Err(Error::MissingParameter("msg"));
		}
		self.chat.borrow_mut().ask(question);
		let repo = self.repo();
		match logged("chat", self.query.chat(&repo, question).await) {
			Ok(answer) => {
				self.chat.borrow_mut().answer(answer.clone());
				Ok(answer)
			}
			Err(e) => {
				self.chat.borrow_mut().answer(e.notice());
				Err(e)
			}
		}
	}

	/// Records search input; returns a ticket if a fetch should follow.
	pub fn type_search(&self, text: &str) -> Option<SearchTicket> {
		self.search.borrow_mut().on_input(text)
	}

	pub fn search_is_current(&self, ticket: &SearchTicket) -> bool {
		self.search.borrow().is_current(ticket)
	}

	/// Fetches suggestions for `ticket` unless it has been superseded.
	///
	/// Returns whether the suggestions were applied.
	pub async fn complete(&self, ticket: &SearchTicket) -> Result<bool> {
		if !self.search_is_current(ticket) {
			return Ok(false);
		}
		let repo = self.repo();
		let suggestions = logged(
			"auto complete",
			self.query.auto_complete(&repo, ticket.prefix()).await,
		)?;
		Ok(self.search.borrow_mut().apply(ticket, suggestions))
	}

	/// Picks a suggestion and makes sure its node is in the graph.
	pub fn select_suggestion(&self, index: usize) -> Option<NodeId> {
		let chosen = self.search.borrow_mut().select(index)?;
		let id = chosen.id;
		let slice = GraphSlice {
			nodes: vec![chosen],
			edges: Vec::new(),
		};
		let added = self.feed.graph.borrow_mut().extend(&slice, false, None);
		self.feed.publish(ViewUpdate::Added(added));
		Some(id)
	}

	pub fn set_category_visible(&self, name: &str, visible: bool) -> bool {
		let changed = self.feed.graph.borrow_mut().set_category_visible(name, visible);
		if changed {
			self.feed.publish(ViewUpdate::Changed);
		}
		changed
	}

	pub fn legend(&self) -> Vec<LegendEntry> {
		self.graph()
			.categories()
			.map(|c| LegendEntry {
				name: c.name.clone(),
				color: c.color().to_css(),
				visible: c.visible,
			})
			.collect()
	}
}

fn logged<T>(operation: &str, result: Result<T>) -> Result<T> {
	if let Err(e) = &result {
		warn!("{} failed: {}", operation, e);
	}
	result
}
