use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::backend::{DiaryRecord, GraphBackend, RelationshipRecord, TauriBackend};
use crate::components::force_graph::{CanvasHandle, ForceGraphCanvas, ForceGraphState};
use crate::config::GraphViewConfig;
use crate::graph::{
	ClickHit, GraphController, HostEvent, NodeKind, Phase, RelationshipType, Session, StatusLevel,
	ViewStatus,
};

type GraphSession = Session<CanvasHandle, TauriBackend>;

/// Side panel contents for the current plain selection.
#[derive(Clone, Debug, PartialEq)]
enum Detail {
	/// Nothing selected: every diary.
	AllDiaries(Vec<DiaryRecord>),
	Tagged { tag: String, diaries: Vec<DiaryRecord> },
	Relationships { diary: String, rows: Vec<RelationshipRecord> },
	Failed(String),
}

fn load_all_diaries(detail: RwSignal<Option<Detail>>) {
	spawn_local(async move {
		let next = match TauriBackend.list_diaries().await {
			Ok(diaries) => Detail::AllDiaries(diaries),
			Err(err) => Detail::Failed(err.to_string()),
		};
		detail.set(Some(next));
	});
}

/// Fill the side panel for a node picked outside authoring.
fn load_detail(label: String, id: String, kind: NodeKind, detail: RwSignal<Option<Detail>>) {
	spawn_local(async move {
		let next = match kind {
			NodeKind::Tag => match TauriBackend.diaries_with_tag(&label).await {
				Ok(diaries) => Detail::Tagged { tag: label, diaries },
				Err(err) => Detail::Failed(err.to_string()),
			},
			NodeKind::Diary => match TauriBackend.relationships_of(&id).await {
				Ok(rows) => Detail::Relationships { diary: id, rows },
				Err(err) => Detail::Failed(err.to_string()),
			},
			NodeKind::Unknown => return,
		};
		detail.set(Some(next));
	});
}

fn node_label(session: StoredValue<GraphSession, LocalStorage>, id: &str) -> String {
	session
		.with_value(|s| s.controller().mirror().node(id).map(|n| n.label.clone()))
		.unwrap_or_else(|| id.to_string())
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = GraphViewConfig::default();
	let canvas = CanvasHandle::new(ForceGraphState::new(
		&config,
		config.width.unwrap_or(800.0),
		config.height.unwrap_or(600.0),
	));

	let view_status = RwSignal::new(ViewStatus::default());
	let selected = RwSignal::new(Option::<(String, NodeKind)>::None);
	let detail = RwSignal::new(Option::<Detail>::None);

	let controller = GraphController::new(canvas.clone(), config.default_relationship);
	let session = Session::new(
		controller,
		TauriBackend,
		|task| spawn_local(task),
		move |event| match event {
			HostEvent::Changed(view) => view_status.set(view),
			HostEvent::NodeSelected { id, kind } => selected.set(Some((id, kind))),
			HostEvent::RelationshipCreated { id } | HostEvent::RelationshipDeleted { id } => {
				log::debug!("relationship {id} changed; clearing detail");
				selected.set(None);
			}
		},
	);
	let session = StoredValue::new_local(session);

	Effect::new(move |_| match selected.get() {
		Some((id, kind)) => load_detail(node_label(session, &id), id, kind, detail),
		None => load_all_diaries(detail),
	});

	{
		let s = session.get_value();
		spawn_local(async move { s.load_snapshot().await });
	}

	let on_click = move |hit: ClickHit| {
		let clears_node = hit.node.is_none();
		session.with_value(|s| s.click(hit));
		if clears_node && !view_status.get_untracked().selection.is_authoring() {
			selected.set(None);
		}
	};
	let toggle_authoring = move |_| {
		if view_status.get_untracked().selection.is_authoring() {
			session.with_value(|s| s.cancel_authoring());
		} else {
			session.with_value(|s| s.start_authoring());
		}
	};
	let change_relationship = move |ev: leptos::ev::Event| {
		match event_target_value(&ev).parse::<RelationshipType>() {
			Ok(relationship) => session.with_value(|s| s.set_relationship_type(relationship)),
			Err(err) => log::warn!("{err}"),
		}
	};
	let delete_edge = move |_| session.with_value(|s| s.delete_selected_edge());
	let refresh = move |_| {
		let s = session.get_value();
		spawn_local(async move { s.refresh().await });
	};
	let retry = move || {
		let s = session.get_value();
		spawn_local(async move { s.retry().await });
	};

	let authoring_label = move || match view_status.get().selection.phase {
		Phase::Idle => "Add relationship",
		Phase::AwaitingChild | Phase::AwaitingParent { .. } => "Done",
	};
	let phase_hint = move || match view_status.get().selection.phase {
		Phase::Idle => None,
		Phase::AwaitingChild => Some("Click the child diary".to_string()),
		Phase::AwaitingParent { child } => {
			Some(format!("Child: {}. Click the parent diary", node_label(session, &child)))
		}
	};
	let status_line = move || {
		view_status.get().status.map(|status| {
			let class = match status.level {
				StatusLevel::Info => "graph-status",
				StatusLevel::Error => "graph-status graph-status-error",
			};
			view! { <p class=class>{status.text}</p> }
		})
	};

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas state=canvas config=config.clone() on_click=on_click />

			<div class="graph-overlay">
				<h1>"Diary Graph"</h1>
				<div class="graph-toolbar">
					<button on:click=toggle_authoring>{authoring_label}</button>
					<select
						prop:value=move || view_status.get().relationship.as_str()
						on:change=change_relationship
					>
						{RelationshipType::ALL
							.iter()
							.map(|kind| view! { <option value=kind.as_str()>{kind.to_string()}</option> })
							.collect_view()}
					</select>
					<button
						on:click=delete_edge
						disabled=move || view_status.get().selection.selected_edge.is_none()
					>
						"Delete relationship"
					</button>
					<button on:click=refresh disabled=move || view_status.get().load.is_loading()>
						"Refresh"
					</button>
				</div>
				{move || phase_hint().map(|hint| view! { <p class="graph-hint">{hint}</p> })}
				{status_line}
				<p class="graph-counts">
					{move || {
						let view = view_status.get();
						format!("{} nodes, {} edges", view.node_count, view.edge_count)
					}}
				</p>
			</div>

			<Show when=move || view_status.get().load.is_loading()>
				<div class="graph-loading">"Loading graph..."</div>
			</Show>

			{move || {
				view_status
					.get()
					.load
					.error()
					.map(|err| {
						view! {
							<div class="graph-error">
								<p>{format!("Could not load the graph: {err}")}</p>
								<button on:click=move |_| retry()>"Retry"</button>
							</div>
						}
					})
			}}

			<aside class="graph-detail">{move || detail.get().map(render_detail)}</aside>
		</div>
	}
}

fn render_detail(detail: Detail) -> AnyView {
	match detail {
		Detail::AllDiaries(diaries) => {
			view! {
				<h2>"Diaries"</h2>
				{diary_list(diaries)}
			}
				.into_any()
		}
		Detail::Tagged { tag, diaries } => {
			view! {
				<h2>{format!("Tagged #{tag}")}</h2>
				{diary_list(diaries)}
			}
				.into_any()
		}
		Detail::Relationships { diary, rows } => {
			let rows = rows
				.into_iter()
				.map(|row| {
					let (direction, other) = if row.child_id == diary {
						("parent", row.parent_id)
					} else {
						("child", row.child_id)
					};
					view! { <li>{format!("{} ({direction}): {other}", row.relationship_type)}</li> }
				})
				.collect_view();
			view! {
				<h2>"Relationships"</h2>
				<ul>{rows}</ul>
			}
				.into_any()
		}
		Detail::Failed(err) => view! { <p class="graph-status-error">{err}</p> }.into_any(),
	}
}

fn diary_list(diaries: Vec<DiaryRecord>) -> impl IntoView {
	if diaries.is_empty() {
		return view! { <p>"No diaries"</p> }.into_any();
	}
	view! {
		<ul>
			{diaries
				.into_iter()
				.map(|diary| view! { <li title=diary.created_at.unwrap_or_default()>{diary.title}</li> })
				.collect_view()}
		</ul>
	}
		.into_any()
}
