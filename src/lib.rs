//! code-graph-viewer: incremental, force-directed exploration of source-code
//! knowledge graphs.
//!
//! The crate is split into a pure graph model ([`model`]) that merges slices
//! returned by a graph query service, the session state around it
//! ([`workspace`], [`chat`], [`search`]), the HTTP client ([`query`]), and a
//! WASM canvas front end ([`components`]).

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod chat;
pub mod components;
pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod search;
pub mod theme;
pub mod workspace;

use components::force_graph::ForceGraphCanvas;
use components::panels::{ChatPanel, Legend, NodeDetails, Notice, PathPick, RepoBar, SearchBox, Session};
pub use config::ViewerConfig;
pub use error::{Error, Result};
pub use model::Graph;
use model::PathEndpoint;
use query::{HttpQueryService, NodeId};
pub use workspace::Workspace;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("code-graph-viewer: logging initialized");
}

fn config_text() -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("viewer-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load the viewer configuration from a script element with id="viewer-config".
/// A missing element or an invalid document falls back to defaults.
fn load_config() -> ViewerConfig {
	let Some(text) = config_text() else {
		info!("code-graph-viewer: no viewer-config element, using defaults");
		return ViewerConfig::default();
	};
	match ViewerConfig::from_json(&text) {
		Ok(config) => config,
		Err(e) => {
			warn!("code-graph-viewer: {}, using defaults", e);
			ViewerConfig::default()
		}
	}
}

/// Main application component.
/// Opens the configured repository and lays the panels over the graph canvas.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_config();
	let query = HttpQueryService::new(config.backend_url.clone(), config.token.clone());
	let workspace = Rc::new(Workspace::new(query, config.repo.clone(), config.search_debounce()));
	let feed = workspace.feed();
	let session = Session::new(workspace);
	let selected = RwSignal::new(None::<NodeId>);
	let picking = RwSignal::new(PathPick::Idle);

	session.run(|ws| async move { ws.load().await.map(drop) });

	let on_select: Rc<dyn Fn(Option<NodeId>)> = Rc::new(move |target| {
		let Some(id) = target else {
			selected.set(None);
			return;
		};
		let name = session
			.with(|ws| ws.graph().node(id).map(|n| n.name.clone()))
			.unwrap_or_default();
		let endpoint = PathEndpoint::new(id, name);
		match picking.get_untracked() {
			PathPick::Idle => selected.set(Some(id)),
			PathPick::Start => picking.set(PathPick::End(endpoint)),
			PathPick::End(start) => {
				picking.set(PathPick::Idle);
				session.run(move |ws| async move {
					ws.show_path(Some(start), Some(endpoint)).await.map(drop)
				});
			}
		}
	});
	let on_activate: Rc<dyn Fn(NodeId)> = Rc::new(move |id| {
		session.run(move |ws| async move { ws.toggle_expand(id).await.map(drop) });
	});

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Code Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<ForceGraphCanvas
				feed=feed
				on_select=on_select
				on_activate=on_activate
				fullscreen=config.fullscreen
			/>
			<div class="graph-overlay">
				<RepoBar session=session />
				<SearchBox session=session selected=selected />
				<Legend session=session />
				<NodeDetails session=session selected=selected />
				<p class="subtitle">"Double-click a node to expand it. Scroll to zoom. Drag background to pan."</p>
			</div>
			<ChatPanel session=session picking=picking />
			<Notice session=session />
		</div>
	}
}
