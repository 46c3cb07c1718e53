//! Panels laid over the graph canvas: repository bar, search, legend, node
//! details, conversation and notices.
//!
//! The workspace keeps its state in plain `RefCell`s, so views subscribe to a
//! revision counter that is bumped after every workspace operation.

use std::future::Future;
use std::rc::Rc;

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::chat::MessageKind;
use crate::error::{Error, Result};
use crate::model::PathEndpoint;
use crate::query::{Commit, HttpQueryService, NodeId, Schema};
use crate::workspace::Workspace;

pub type AppWorkspace = Workspace<HttpQueryService>;

/// Handle to the workspace shared by every panel.
#[derive(Clone, Copy)]
pub struct Session {
	workspace: StoredValue<Rc<AppWorkspace>, LocalStorage>,
	revision: RwSignal<u64>,
	notice: RwSignal<Option<String>>,
}

impl Session {
	pub fn new(workspace: Rc<AppWorkspace>) -> Self {
		Self {
			workspace: StoredValue::new_local(workspace),
			revision: RwSignal::new(0),
			notice: RwSignal::new(None),
		}
	}

	pub fn workspace(&self) -> Rc<AppWorkspace> {
		self.workspace.get_value()
	}

	/// Reads workspace state and re-runs the calling view when it changes.
	pub fn read<T>(&self, f: impl FnOnce(&AppWorkspace) -> T) -> T {
		self.revision.track();
		self.workspace.with_value(|ws| f(ws))
	}

	/// Reads workspace state without subscribing.
	pub fn with<T>(&self, f: impl FnOnce(&AppWorkspace) -> T) -> T {
		self.workspace.with_value(|ws| f(ws))
	}

	pub fn changed(&self) {
		self.revision.update(|r| *r += 1);
	}

	pub fn fail(&self, error: &Error) {
		self.notice.set(Some(error.notice()));
	}

	/// Runs an async workspace operation; failures become a notice.
	pub fn run<F, Fut>(self, op: F)
	where
		F: FnOnce(Rc<AppWorkspace>) -> Fut + 'static,
		Fut: Future<Output = Result<()>> + 'static,
	{
		spawn_local(async move {
			if let Err(e) = op(self.workspace()).await {
				self.fail(&e);
			}
			self.changed();
		});
	}
}

/// Progress of picking the two endpoints of a path query.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PathPick {
	#[default]
	Idle,
	Start,
	End(PathEndpoint),
}

fn commit_title(commit: &Commit) -> String {
	let short = commit.hash.get(..7).unwrap_or(&commit.hash);
	match commit.message.lines().next() {
		Some(line) if !line.is_empty() => format!("{short} {line}"),
		_ => short.to_string(),
	}
}

#[component]
pub fn RepoBar(session: Session) -> impl IntoView {
	let repos = RwSignal::new(Vec::<String>::new());
	let commits = RwSignal::new(Vec::<Commit>::new());
	let schema = RwSignal::new(None::<Schema>);

	session.run(move |ws| async move {
		repos.set(ws.repositories().await?);
		Ok::<(), Error>(())
	});

	let open_repo = move |ev| {
		let repo = event_target_value(&ev);
		commits.set(Vec::new());
		schema.set(None);
		session.run(move |ws| async move { ws.open_repo(&repo).await.map(drop) });
	};
	let load_commits = move |_| {
		session.run(move |ws| async move {
			commits.set(ws.commits().await?);
			Ok::<(), Error>(())
		});
	};
	let switch_commit = move |ev| {
		let hash = event_target_value(&ev);
		session.run(move |ws| async move { ws.switch_commit(&hash).await.map(drop) });
	};
	let load_schema = move |_| {
		session.run(move |ws| async move {
			schema.set(Some(ws.schema().await?));
			Ok::<(), Error>(())
		});
	};

	view! {
		<div class="repo-bar">
			<h1>{move || session.read(|ws| ws.repo())}</h1>
			<select on:change=open_repo prop:value=move || session.read(|ws| ws.repo())>
				{move || {
					repos
						.get()
						.into_iter()
						.map(|repo| {
							let value = repo.clone();
							view! { <option value=value>{repo}</option> }
						})
						.collect_view()
				}}
			</select>
			<button on:click=load_commits>"Commits"</button>
			<button on:click=load_schema>"Info"</button>
			<Show when=move || commits.with(|c| !c.is_empty())>
				<select on:change=switch_commit>
					{move || {
						commits
							.get()
							.into_iter()
							.map(|commit| {
								let title = commit_title(&commit);
								view! { <option value=commit.hash>{title}</option> }
							})
							.collect_view()
					}}
				</select>
			</Show>
			{move || {
				schema
					.get()
					.map(|schema| {
						view! {
							<div class="schema">
								<p>{format!("{} nodes, {} edges", schema.node_count, schema.edge_count)}</p>
								<ul>
									{schema
										.labels
										.into_iter()
										.map(|(label, info)| {
											view! { <li>{format!("{label}: {}", info.node_count)}</li> }
										})
										.collect_view()}
								</ul>
							</div>
						}
					})
			}}
		</div>
	}
}

#[component]
pub fn SearchBox(session: Session, selected: RwSignal<Option<NodeId>>) -> impl IntoView {
	let on_input = move |ev| {
		let text = event_target_value(&ev);
		let ws = session.workspace();
		let ticket = ws.type_search(&text);
		let debounce = ws.search().debounce();
		session.changed();
		if let Some(ticket) = ticket {
			set_timeout(
				move || {
					session.run(move |ws| async move { ws.complete(&ticket).await.map(drop) })
				},
				debounce,
			);
		}
	};
	let pick = move |index: usize| {
		if let Some(id) = session.workspace().select_suggestion(index) {
			selected.set(Some(id));
		}
		session.changed();
	};

	view! {
		<div class="search">
			<input
				type="search"
				placeholder="Search for a node"
				prop:value=move || session.read(|ws| ws.search().input().to_string())
				on:input=on_input
			/>
			<Show when=move || session.read(|ws| ws.search().is_open())>
				<ul class="suggestions">
					{move || {
						session
							.read(|ws| {
								ws.search()
									.suggestions()
									.iter()
									.map(|node| (node.name(), node.category().to_string()))
									.collect::<Vec<_>>()
							})
							.into_iter()
							.enumerate()
							.map(|(index, (name, category))| {
								view! {
									<li on:click=move |_| pick(index)>
										<span class="category">{category}</span>
										{name}
									</li>
								}
							})
							.collect_view()
					}}
				</ul>
			</Show>
		</div>
	}
}

#[component]
pub fn Legend(session: Session) -> impl IntoView {
	view! {
		<ul class="legend">
			{move || {
				session
					.read(|ws| ws.legend())
					.into_iter()
					.map(|entry| {
						let name = entry.name.clone();
						let toggle = move |ev| {
							let visible = event_target_checked(&ev);
							session.workspace().set_category_visible(&name, visible);
							session.changed();
						};
						view! {
							<li>
								<label>
									<input type="checkbox" prop:checked=entry.visible on:change=toggle />
									<span class="swatch" style:background-color=entry.color></span>
									{entry.name}
								</label>
							</li>
						}
					})
					.collect_view()
			}}
		</ul>
	}
}

#[component]
pub fn NodeDetails(session: Session, selected: RwSignal<Option<NodeId>>) -> impl IntoView {
	move || {
		let id = selected.get()?;
		let (name, category, properties, expanded) = session.read(|ws| {
			ws.graph().node(id).map(|node| {
				(
					node.name.clone(),
					node.category.clone(),
					serde_json::to_string_pretty(&node.properties).unwrap_or_default(),
					node.expand,
				)
			})
		})?;
		let toggle = move |_| {
			session.run(move |ws| async move { ws.toggle_expand(id).await.map(drop) });
		};
		Some(view! {
			<div class="node-details">
				<h2>{name}</h2>
				<p class="category">{category}</p>
				<pre>{properties}</pre>
				<button on:click=toggle>{if expanded { "Collapse" } else { "Expand" }}</button>
			</div>
		})
	}
}

#[component]
pub fn ChatPanel(session: Session, picking: RwSignal<PathPick>) -> impl IntoView {
	let draft = RwSignal::new(String::new());
	let submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		let question = draft.get_untracked();
		if question.trim().is_empty() {
			return;
		}
		draft.set(String::new());
		session.run(move |ws| async move { ws.ask(&question).await.map(drop) });
	};
	let hint = move || match picking.get() {
		PathPick::Idle => None,
		PathPick::Start => Some("Click the starting node".to_string()),
		PathPick::End(start) => Some(format!("From {}: click the end node", start.name)),
	};

	view! {
		<div class="chat">
			<ul class="messages">
				{move || {
					session
						.read(|ws| ws.chat().messages().to_vec())
						.into_iter()
						.map(|message| {
							let class = match message.kind {
								MessageKind::Tip => "tip",
								MessageKind::Query => "query",
								MessageKind::Response => "response",
								MessageKind::Path => "path",
								MessageKind::Pending => "pending",
							};
							let paths = message
								.paths
								.into_iter()
								.enumerate()
								.map(|(index, sequence)| {
									let show = move |_| {
										session.workspace().select_path(&sequence);
										session.changed();
									};
									view! { <button on:click=show>{format!("Path {}", index + 1)}</button> }
								})
								.collect_view();
							view! { <li class=class>{message.text}{paths}</li> }
						})
						.collect_view()
				}}
			</ul>
			<p class="hint">{hint}</p>
			<button on:click=move |_| picking.set(PathPick::Start)>"Create a path"</button>
			<form on:submit=submit>
				<input
					type="text"
					placeholder="Ask about the code"
					prop:value=move || draft.get()
					on:input=move |ev| draft.set(event_target_value(&ev))
				/>
			</form>
		</div>
	}
}

#[component]
pub fn Notice(session: Session) -> impl IntoView {
	let notice = session.notice;
	move || {
		notice.get().map(|text| {
			view! {
				<div class="notice" on:click=move |_| notice.set(None)>
					{text}
				</div>
			}
		})
	}
}
