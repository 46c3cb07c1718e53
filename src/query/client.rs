//! JSON-over-HTTP implementation of [`QueryService`].

use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::QueryService;
use super::types::{
	ChatResponse, Commit, CommitDiff, CommitsResponse, CompletionsResponse, GraphSlice, NodeId,
	PathsResponse, RawNode, RepositoriesResponse, Schema,
};
use crate::error::{Error, Result};

/// Talks to the query service at `base_url`, optionally with a bearer token.
#[derive(Clone, Debug)]
pub struct HttpQueryService {
	client: Client,
	base_url: String,
	token: Option<String>,
}

impl HttpQueryService {
	pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
		Self {
			client: Client::new(),
			base_url: base_url.into(),
			token: token.filter(|t| !t.is_empty()),
		}
	}

	fn endpoint(&self, path: &str) -> String {
		format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
	}

	fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
		let request = request.header(CONTENT_TYPE, "application/json");
		match &self.token {
			Some(token) => request.bearer_auth(token),
			None => request,
		}
	}

	async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
		debug!("GET {}", path);
		let request = self.authorize(self.client.get(self.endpoint(path)).query(query));
		Self::send(request).await
	}

	async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
		debug!("POST {}", path);
		let request = self.authorize(self.client.post(self.endpoint(path)).json(body));
		Self::send(request).await
	}

	async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
		let response = request.send().await?;
		let status = response.status().as_u16();
		let body = response.text().await?;
		decode_body(status, &body)
	}
}

/// Maps a response to either the decoded payload or an upstream error.
fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T> {
	if !(200..300).contains(&status) {
		return Err(Error::upstream(status, body));
	}
	Ok(serde_json::from_str(body)?)
}

fn require<'a>(value: &'a str, name: &'static str) -> Result<&'a str> {
	if value.trim().is_empty() {
		Err(Error::MissingParameter(name))
	} else {
		Ok(value)
	}
}

impl QueryService for HttpQueryService {
	async fn graph(&self, repo: &str) -> Result<GraphSlice> {
		let repo = require(repo, "repo")?;
		self.get("api/graph_entities", &[("repo", repo)]).await
	}

	async fn neighbors(&self, repo: &str, node_ids: &[NodeId]) -> Result<GraphSlice> {
		let repo = require(repo, "repo")?;
		if node_ids.is_empty() {
			return Err(Error::MissingParameter("node_ids"));
		}
		self.post("api/get_neighbors", &json!({ "repo": repo, "node_ids": node_ids }))
			.await
	}

	async fn find_paths(&self, repo: &str, src: NodeId, dest: NodeId) -> Result<PathsResponse> {
		let repo = require(repo, "repo")?;
		self.post("api/find_paths", &json!({ "repo": repo, "src": src, "dest": dest }))
			.await
	}

	async fn schema(&self, repo: &str) -> Result<Schema> {
		let repo = require(repo, "repo")?;
		self.post("api/repo_info", &json!({ "repo": repo })).await
	}

	async fn commits(&self, repo: &str) -> Result<Vec<Commit>> {
		let repo = require(repo, "repo")?;
		let response: CommitsResponse = self.post("api/list_commits", &json!({ "repo": repo })).await?;
		Ok(response.commits)
	}

	async fn switch_commit(&self, repo: &str, commit: &str) -> Result<CommitDiff> {
		let repo = require(repo, "repo")?;
		let commit = require(commit, "commit")?;
		self.post("api/switch_commit", &json!({ "repo": repo, "commit": commit }))
			.await
	}

	async fn auto_complete(&self, repo: &str, prefix: &str) -> Result<Vec<RawNode>> {
		let repo = require(repo, "repo")?;
		let prefix = require(prefix, "prefix")?;
		let response: CompletionsResponse = self
			.post("api/auto_complete", &json!({ "repo": repo, "prefix": prefix }))
			.await?;
		Ok(response.completions)
	}

	async fn chat(&self, repo: &str, message: &str) -> Result<String> {
		let repo = require(repo, "repo")?;
		let message = require(message, "msg")?;
		let response: ChatResponse = self.post("api/chat", &json!({ "repo": repo, "msg": message })).await?;
		Ok(response.response)
	}

	async fn repositories(&self) -> Result<Vec<String>> {
		let response: RepositoriesResponse = self.get("api/list_repos", &[]).await?;
		Ok(response.repositories)
	}
}
