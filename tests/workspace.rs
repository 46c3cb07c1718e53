//! Drives a `Workspace` through an in-memory query service.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use code_graph_viewer::chat::MessageKind;
use code_graph_viewer::error::{Error, Result};
use code_graph_viewer::model::PathEndpoint;
use code_graph_viewer::query::{
	Commit, CommitDiff, GraphSlice, NodeId, PathsResponse, QueryService, RawNode, Schema,
};
use code_graph_viewer::workspace::{Expansion, ViewUpdate, Workspace};
use futures::executor::block_on;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[derive(Default)]
struct Script {
	graph: GraphSlice,
	neighbors: HashMap<NodeId, GraphSlice>,
	paths: Vec<Vec<Value>>,
	diff: CommitDiff,
	completions: Vec<RawNode>,
	repositories: Vec<String>,
	answer: String,
	calls: RefCell<Vec<String>>,
	failure: RefCell<Option<(u16, String)>>,
}

#[derive(Clone, Default)]
struct FakeQuery(Rc<Script>);

impl FakeQuery {
	fn new(script: Script) -> Self {
		Self(Rc::new(script))
	}

	fn calls(&self) -> Vec<String> {
		self.0.calls.borrow().clone()
	}

	fn fail_with(&self, status: u16, body: &str) {
		*self.0.failure.borrow_mut() = Some((status, body.to_string()));
	}

	fn record(&self, call: String) -> Result<()> {
		self.0.calls.borrow_mut().push(call);
		match &*self.0.failure.borrow() {
			Some((status, body)) => Err(Error::upstream(*status, body.clone())),
			None => Ok(()),
		}
	}
}

impl QueryService for FakeQuery {
	async fn graph(&self, repo: &str) -> Result<GraphSlice> {
		self.record(format!("graph {repo}"))?;
		Ok(self.0.graph.clone())
	}

	async fn neighbors(&self, repo: &str, node_ids: &[NodeId]) -> Result<GraphSlice> {
		self.record(format!("neighbors {repo} {node_ids:?}"))?;
		Ok(node_ids
			.first()
			.and_then(|id| self.0.neighbors.get(id))
			.cloned()
			.unwrap_or_default())
	}

	async fn find_paths(&self, repo: &str, src: NodeId, dest: NodeId) -> Result<PathsResponse> {
		self.record(format!("find_paths {repo} {src} {dest}"))?;
		Ok(PathsResponse {
			paths: self.0.paths.clone(),
		})
	}

	async fn schema(&self, repo: &str) -> Result<Schema> {
		self.record(format!("schema {repo}"))?;
		Ok(Schema::default())
	}

	async fn commits(&self, repo: &str) -> Result<Vec<Commit>> {
		self.record(format!("commits {repo}"))?;
		Ok(Vec::new())
	}

	async fn switch_commit(&self, repo: &str, commit: &str) -> Result<CommitDiff> {
		self.record(format!("switch_commit {repo} {commit}"))?;
		Ok(self.0.diff.clone())
	}

	async fn auto_complete(&self, repo: &str, prefix: &str) -> Result<Vec<RawNode>> {
		self.record(format!("auto_complete {repo} {prefix}"))?;
		Ok(self.0.completions.clone())
	}

	async fn chat(&self, repo: &str, message: &str) -> Result<String> {
		self.record(format!("chat {repo} {message}"))?;
		Ok(self.0.answer.clone())
	}

	async fn repositories(&self) -> Result<Vec<String>> {
		self.record("repositories".to_string())?;
		Ok(self.0.repositories.clone())
	}
}

fn slice(value: Value) -> GraphSlice {
	serde_json::from_value(value).unwrap()
}

fn node(id: i64, label: &str, name: &str) -> Value {
	json!({"id": id, "labels": [label], "properties": {"name": name}})
}

fn edge(id: i64, src: i64, dest: i64, relation: &str) -> Value {
	json!({"id": id, "src_node": src, "dest_node": dest, "relation": relation, "properties": {}})
}

fn base_graph() -> GraphSlice {
	slice(json!({
		"nodes": [node(1, "File", "app.py"), node(2, "Function", "main")],
		"edges": [edge(10, 1, 2, "DEFINES")]
	}))
}

fn workspace(script: Script, repo: &str) -> (Workspace<FakeQuery>, FakeQuery) {
	let query = FakeQuery::new(script);
	let ws = Workspace::new(query.clone(), repo, Duration::from_millis(500));
	(ws, query)
}

fn loaded(script: Script) -> (Workspace<FakeQuery>, FakeQuery) {
	let (ws, query) = workspace(
		Script {
			graph: base_graph(),
			..script
		},
		"flask",
	);
	block_on(ws.open_repo("flask")).unwrap();
	ws.feed().drain();
	(ws, query)
}

#[test]
fn load_falls_back_to_the_first_repository() {
	let (ws, query) = workspace(
		Script {
			graph: base_graph(),
			repositories: vec!["flask".into(), "django".into()],
			..Script::default()
		},
		"",
	);

	let added = block_on(ws.load()).unwrap();
	assert_eq!(added.nodes, vec![1, 2]);
	assert_eq!(ws.repo(), "flask");
	assert_eq!(query.calls(), vec!["repositories", "graph flask"]);
	assert_eq!(ws.feed().drain(), vec![ViewUpdate::Rebuild]);
	assert_eq!(ws.graph().link_count(), 1);
}

#[test]
fn blank_repository_is_rejected_before_any_request() {
	let (ws, query) = workspace(Script::default(), "");
	let err = block_on(ws.open_repo("  ")).unwrap_err();
	assert!(matches!(err, Error::MissingParameter("repo")));
	assert!(query.calls().is_empty());
}

#[test]
fn expanding_twice_collapses() {
	let mut neighbors = HashMap::new();
	neighbors.insert(
		2,
		slice(json!({
			"nodes": [node(2, "Function", "main"), node(3, "Function", "helper"), node(4, "Function", "log")],
			"edges": [edge(11, 2, 3, "CALLS"), edge(12, 2, 4, "CALLS")]
		})),
	);
	let (ws, query) = loaded(Script {
		neighbors,
		..Script::default()
	});

	let Expansion::Expanded(added) = block_on(ws.toggle_expand(2)).unwrap() else {
		panic!("expected expansion");
	};
	assert_eq!(added.nodes, vec![3, 4]);
	assert_eq!(added.links, vec![11, 12]);
	assert!(ws.graph().node(2).unwrap().expand);
	assert!(ws.graph().node(3).unwrap().collapsed);
	assert!(!ws.graph().node(2).unwrap().collapsed);

	let Expansion::Collapsed(removed) = block_on(ws.toggle_expand(2)).unwrap() else {
		panic!("expected collapse");
	};
	let mut gone = removed.nodes.clone();
	gone.sort();
	assert_eq!(gone, vec![3, 4]);
	assert_eq!(ws.graph().node_count(), 2);
	assert_eq!(ws.graph().link_count(), 1);
	assert!(!ws.graph().node(2).unwrap().expand);

	// Collapsing needs no request.
	assert_eq!(query.calls(), vec!["graph flask", "neighbors flask [2]"]);
	assert_eq!(
		ws.feed().drain(),
		vec![ViewUpdate::Added(added), ViewUpdate::Rebuild]
	);
}

#[test]
fn expanding_an_unknown_node_fails_without_a_request() {
	let (ws, query) = loaded(Script::default());
	let err = block_on(ws.toggle_expand(99)).unwrap_err();
	assert!(matches!(err, Error::MissingParameter("node")));
	assert_eq!(query.calls(), vec!["graph flask"]);
}

#[test]
fn path_query_needs_both_endpoints() {
	let (ws, query) = loaded(Script::default());
	let before = ws.chat().clone();

	let err = block_on(ws.show_path(None, Some(PathEndpoint::new(2, "main")))).unwrap_err();
	assert!(matches!(err, Error::MissingParameter("src")));
	let err = block_on(ws.show_path(Some(PathEndpoint::new(1, "app.py")), None)).unwrap_err();
	assert!(matches!(err, Error::MissingParameter("dest")));

	assert_eq!(*ws.chat(), before);
	assert_eq!(query.calls(), vec!["graph flask"]);
	assert!(ws.feed().drain().is_empty());
}

#[test]
fn path_query_highlights_and_reports() {
	let (ws, query) = loaded(Script {
		paths: vec![vec![
			node(1, "File", "app.py"),
			edge(13, 1, 5, "DEFINES"),
			node(5, "Class", "App"),
		]],
		..Script::default()
	});

	let sequences = block_on(ws.show_path(
		Some(PathEndpoint::new(1, "app.py")),
		Some(PathEndpoint::new(5, "App")),
	))
	.unwrap();

	assert_eq!(sequences.len(), 1);
	assert_eq!(sequences[0].nodes, vec![1, 5]);
	assert_eq!(sequences[0].links, vec![13]);
	assert_eq!(query.calls().last().unwrap(), "find_paths flask 1 5");

	let graph = ws.graph();
	assert!(graph.node(1).unwrap().is_path);
	assert!(graph.node(5).unwrap().is_path);
	assert!(graph.link(13).unwrap().is_path);
	assert!(!graph.node(2).unwrap().is_path);
	drop(graph);

	let chat = ws.chat();
	let kinds: Vec<MessageKind> = chat.messages().iter().map(|m| m.kind).collect();
	assert_eq!(
		kinds,
		vec![MessageKind::Tip, MessageKind::Query, MessageKind::Response, MessageKind::Path]
	);
	assert_eq!(chat.messages()[3].text, "1 path found");
}

#[test]
fn failed_path_queries_leave_no_chat_entries() {
	let (ws, query) = loaded(Script {
		paths: vec![vec![node(1, "File", "app.py"), json!({"bogus": true}), node(2, "Function", "main")]],
		..Script::default()
	});
	let ends = || (Some(PathEndpoint::new(1, "app.py")), Some(PathEndpoint::new(2, "main")));

	let (start, end) = ends();
	assert!(matches!(block_on(ws.show_path(start, end)), Err(Error::Decode(_))));

	query.fail_with(500, "graph database unavailable");
	for _ in 0..3 {
		let (start, end) = ends();
		assert!(block_on(ws.show_path(start, end)).is_err());
	}

	let kinds: Vec<MessageKind> = ws.chat().messages().iter().map(|m| m.kind).collect();
	assert_eq!(kinds, vec![MessageKind::Tip]);
	assert!(ws.graph().nodes().all(|n| !n.is_path));
	assert!(ws.feed().drain().is_empty());
}

#[test]
fn failed_request_leaves_the_graph_untouched() {
	let mut neighbors = HashMap::new();
	neighbors.insert(2, slice(json!({"nodes": [node(3, "Function", "helper")]})));
	let (ws, query) = loaded(Script {
		neighbors,
		..Script::default()
	});
	query.fail_with(500, "graph database unavailable");

	let err = block_on(ws.toggle_expand(2)).unwrap_err();
	assert_eq!(err.notice(), "graph database unavailable");
	assert_eq!(ws.graph().node_count(), 2);
	assert!(!ws.graph().node(2).unwrap().expand);
	assert!(ws.feed().drain().is_empty());
}

#[test]
fn switching_commits_applies_the_diff() {
	let diff: CommitDiff = serde_json::from_value(json!({
		"deletions": {"nodes": [2]},
		"additions": {"nodes": [node(6, "Function", "run")], "edges": [edge(14, 1, 6, "DEFINES")]},
		"modifications": {"nodes": [node(1, "File", "application.py")]}
	}))
	.unwrap();
	let (ws, query) = loaded(Script {
		diff,
		..Script::default()
	});

	let outcome = block_on(ws.switch_commit("abc123")).unwrap();
	assert_eq!(outcome.removed.nodes, vec![2]);
	assert_eq!(outcome.removed.links, vec![10]);
	assert_eq!(outcome.added.nodes, vec![6]);
	assert_eq!(outcome.modified_nodes, vec![1]);
	assert_eq!(ws.graph().node(1).unwrap().name, "application.py");
	assert_eq!(query.calls().last().unwrap(), "switch_commit flask abc123");
	assert_eq!(ws.feed().drain(), vec![ViewUpdate::Rebuild]);
}

#[test]
fn blank_commit_is_rejected() {
	let (ws, query) = loaded(Script::default());
	assert!(matches!(
		block_on(ws.switch_commit("")),
		Err(Error::MissingParameter("commit"))
	));
	assert_eq!(query.calls(), vec!["graph flask"]);
}

#[test]
fn stale_search_tickets_skip_the_request() {
	let completions = vec![
		serde_json::from_value(node(7, "Function", "lower_items")).unwrap(),
	];
	let (ws, query) = loaded(Script {
		completions,
		..Script::default()
	});

	let first = ws.type_search("lo").unwrap();
	let second = ws.type_search("low").unwrap();
	assert!(!ws.search_is_current(&first));

	assert!(!block_on(ws.complete(&first)).unwrap());
	assert!(block_on(ws.complete(&second)).unwrap());
	assert_eq!(query.calls(), vec!["graph flask", "auto_complete flask low"]);
	assert_eq!(ws.search().suggestions().len(), 1);
	assert_eq!(ws.search().input(), "low");

	let id = ws.select_suggestion(0).unwrap();
	assert_eq!(id, 7);
	assert_eq!(ws.search().input(), "lower_items");
	assert_eq!(ws.graph().node(7).unwrap().name, "lower_items");
	assert!(matches!(ws.feed().drain().as_slice(), [ViewUpdate::Added(a)] if a.nodes == vec![7]));
}

#[test]
fn questions_and_answers_are_recorded() {
	let (ws, query) = loaded(Script {
		answer: "There are 3 classes.".into(),
		..Script::default()
	});

	assert_eq!(block_on(ws.ask("how many classes?")).unwrap(), "There are 3 classes.");
	query.fail_with(502, "model overloaded");
	assert!(block_on(ws.ask("and functions?")).is_err());

	let texts: Vec<(MessageKind, String)> = ws
		.chat()
		.messages()
		.iter()
		.map(|m| (m.kind, m.text.clone()))
		.collect();
	assert_eq!(
		texts[1..].to_vec(),
		vec![
			(MessageKind::Query, "how many classes?".to_string()),
			(MessageKind::Response, "There are 3 classes.".to_string()),
			(MessageKind::Query, "and functions?".to_string()),
			(MessageKind::Response, "model overloaded".to_string()),
		]
	);
	assert!(matches!(block_on(ws.ask(" ")), Err(Error::MissingParameter("msg"))));
}

#[test]
fn legend_toggles_category_visibility() {
	let (ws, _query) = loaded(Script::default());
	let legend = ws.legend();
	assert_eq!(
		legend.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
		vec!["File", "Function"]
	);
	assert_eq!(legend[0].color, "#7167f6");

	assert!(ws.set_category_visible("Function", false));
	assert!(!ws.graph().node(2).unwrap().visible);
	assert!(!ws.graph().link(10).unwrap().visible);
	assert!(!ws.set_category_visible("Module", false));
	assert_eq!(ws.feed().drain(), vec![ViewUpdate::Changed]);

	assert!(ws.set_category_visible("Function", true));
	assert!(ws.graph().link(10).unwrap().visible);
}
