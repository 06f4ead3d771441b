//! Two-click relationship authoring: pick the child diary, then the parent.
//!
//! Every transition is a pure function from the current [`SelectionState`]
//! to the next one plus a list of [`Effect`]s; the controller applies the
//! effects (optimistic insert, backend request, host notification).

use super::mirror::GraphMirror;
use super::types::{NodeKind, RelationshipType};

/// Authoring workflow position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Phase {
	/// Not authoring; clicks select.
	#[default]
	Idle,
	/// Waiting for the child diary.
	AwaitingChild,
	/// Child picked, waiting for the parent diary.
	AwaitingParent {
		/// Id of the pending child.
		child: String,
	},
}

/// Who is selected, and where the authoring workflow stands.
///
/// A pending child and a selected edge never coexist.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionState {
	/// Authoring position.
	pub phase: Phase,
	/// Edge picked for deletion.
	pub selected_edge: Option<String>,
	/// Plain (non-authoring) node selection.
	pub selected_node: Option<String>,
}

impl SelectionState {
	/// Anything but [`Phase::Idle`].
	pub fn is_authoring(&self) -> bool {
		self.phase != Phase::Idle
	}

	/// The child chosen by the first authoring click, if any.
	pub fn pending_child(&self) -> Option<&str> {
		match &self.phase {
			Phase::AwaitingParent { child } => Some(child),
			_ => None,
		}
	}
}

/// Severity of a [`StatusMessage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum StatusLevel {
	Info,
	Error,
}

/// One line of user-facing status text.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct StatusMessage {
	pub level: StatusLevel,
	pub text: String,
}

#[allow(missing_docs)]
impl StatusMessage {
	pub fn info(text: impl Into<String>) -> Self {
		Self {
			level: StatusLevel::Info,
			text: text.into(),
		}
	}

	pub fn error(text: impl Into<String>) -> Self {
		Self {
			level: StatusLevel::Error,
			text: text.into(),
		}
	}
}

/// A tag or unknown node was clicked while authoring.
pub const MSG_DIARY_ONLY: &str = "Only diary entries can be linked; tags are not eligible";
/// The parent click hit the pending child.
pub const MSG_SAME_NODE: &str = "Select a different node as the parent";
/// The mirror already holds this relationship.
pub const MSG_DUPLICATE: &str = "That relationship already exists";

/// Work a transition asks the controller to carry out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
	/// Replace the status line.
	Status(StatusMessage),
	/// Blank the status line.
	ClearStatus,
	/// Create `child -> parent`; the controller assigns the id.
	#[allow(missing_docs)]
	Commit {
		child: String,
		parent: String,
		relationship: RelationshipType,
	},
	/// A node was picked outside authoring.
	#[allow(missing_docs)]
	NodeSelected {
		id: String,
		kind: NodeKind,
	},
	/// An edge was picked.
	#[allow(missing_docs)]
	EdgeSelected {
		id: String,
	},
}

/// Read-only inputs a transition may consult.
#[derive(Clone, Copy)]
pub struct AuthoringContext<'a> {
	/// Current graph, for the duplicate check.
	pub mirror: &'a GraphMirror,
	/// Type a commit will carry.
	pub relationship: RelationshipType,
}

/// Next state and the effects to apply.
pub type Transition = (SelectionState, Vec<Effect>);

/// Enter authoring, dropping any edge or node selection.
pub fn start(state: SelectionState) -> Transition {
	log::debug!("authoring: start from {:?}", state.phase);
	let next = SelectionState {
		phase: Phase::AwaitingChild,
		selected_edge: None,
		selected_node: None,
	};
	(next, vec![Effect::ClearStatus])
}

/// Leave authoring and forget the pending child.
pub fn cancel(state: SelectionState) -> Transition {
	if let Some(child) = state.pending_child() {
		log::debug!("authoring: cancel, dropping pending child {child}");
	}
	(SelectionState::default(), Vec::new())
}

/// A node was clicked while authoring is active.
pub fn node_clicked(
	state: SelectionState,
	id: &str,
	kind: NodeKind,
	ctx: AuthoringContext<'_>,
) -> Transition {
	if kind != NodeKind::Diary {
		log::debug!("authoring: rejected {kind} node {id}");
		return (state, vec![Effect::Status(StatusMessage::error(MSG_DIARY_ONLY))]);
	}

	let child = match &state.phase {
		Phase::Idle => return (state, Vec::new()),
		Phase::AwaitingChild => {
			log::debug!("authoring: child {id} selected");
			let next = SelectionState {
				phase: Phase::AwaitingParent { child: id.to_string() },
				selected_edge: None,
				selected_node: None,
			};
			let prompt = StatusMessage::info("Child selected; now select the parent diary");
			return (next, vec![Effect::Status(prompt)]);
		}
		Phase::AwaitingParent { child } => child.clone(),
	};

	if child == id {
		return (state, vec![Effect::Status(StatusMessage::error(MSG_SAME_NODE))]);
	}
	if ctx.mirror.has_relationship(&child, id, ctx.relationship) {
		return (state, vec![Effect::Status(StatusMessage::error(MSG_DUPLICATE))]);
	}

	log::debug!("authoring: parent {id} selected for child {child}");
	let next = SelectionState {
		phase: Phase::AwaitingChild,
		selected_edge: None,
		selected_node: None,
	};
	let commit = Effect::Commit {
		child,
		parent: id.to_string(),
		relationship: ctx.relationship,
	};
	(next, vec![commit])
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backend::GraphSnapshot;
	use crate::graph::mirror::Reconciler;
	use crate::graph::mirror::tests::{RecordingSurface, edge, node};

	fn reconciler() -> Reconciler<RecordingSurface> {
		let mut rec = Reconciler::new(RecordingSurface::default());
		rec.replace_with(&GraphSnapshot {
			nodes: vec![node("d1", "diary"), node("d2", "diary"), node("t1", "tag")],
			edges: vec![edge("r1", "d2", "d1", "related_to")],
		});
		rec
	}

	fn ctx(mirror: &GraphMirror) -> AuthoringContext<'_> {
		AuthoringContext {
			mirror,
			relationship: RelationshipType::DependsOn,
		}
	}

	fn awaiting_parent(child: &str) -> SelectionState {
		SelectionState {
			phase: Phase::AwaitingParent { child: child.into() },
			..Default::default()
		}
	}

	#[test]
	fn start_clears_edge_selection() {
		let state = SelectionState {
			selected_edge: Some("r1".into()),
			..Default::default()
		};
		let (next, effects) = start(state);
		assert_eq!(next.phase, Phase::AwaitingChild);
		assert!(next.selected_edge.is_none());
		assert_eq!(effects, vec![Effect::ClearStatus]);
	}

	#[test]
	fn first_diary_click_becomes_pending_child() {
		let rec = reconciler();
		let (next, _) = start(SelectionState::default());
		let (next, _) = node_clicked(next, "d1", NodeKind::Diary, ctx(rec.mirror()));
		assert_eq!(next.pending_child(), Some("d1"));
	}

	#[test]
	fn tag_click_never_moves_the_machine() {
		let rec = reconciler();
		for state in [
			SelectionState {
				phase: Phase::AwaitingChild,
				..Default::default()
			},
			awaiting_parent("d1"),
		] {
			let (next, effects) = node_clicked(state.clone(), "t1", NodeKind::Tag, ctx(rec.mirror()));
			assert_eq!(next, state);
			assert!(!effects.iter().any(|e| matches!(e, Effect::Commit { .. })));
		}
	}

	#[test]
	fn unknown_type_is_rejected_like_tags() {
		let rec = reconciler();
		let state = awaiting_parent("d1");
		let (next, effects) = node_clicked(state.clone(), "x", NodeKind::Unknown, ctx(rec.mirror()));
		assert_eq!(next, state);
		assert_eq!(effects, vec![Effect::Status(StatusMessage::error(MSG_DIARY_ONLY))]);
	}

	#[test]
	fn same_node_twice_is_rejected() {
		let rec = reconciler();
		let state = awaiting_parent("d1");
		let (next, effects) = node_clicked(state.clone(), "d1", NodeKind::Diary, ctx(rec.mirror()));
		assert_eq!(next, state);
		assert_eq!(effects, vec![Effect::Status(StatusMessage::error(MSG_SAME_NODE))]);
	}

	#[test]
	fn second_distinct_diary_commits_and_rearms() {
		let rec = reconciler();
		let (next, effects) = node_clicked(awaiting_parent("d1"), "d2", NodeKind::Diary, ctx(rec.mirror()));
		assert_eq!(next.phase, Phase::AwaitingChild);
		assert_eq!(
			effects,
			vec![Effect::Commit {
				child: "d1".into(),
				parent: "d2".into(),
				relationship: RelationshipType::DependsOn,
			}]
		);
	}

	#[test]
	fn existing_relationship_is_not_committed_twice() {
		let rec = reconciler();
		let ctx = AuthoringContext {
			mirror: rec.mirror(),
			relationship: RelationshipType::RelatedTo,
		};
		let state = awaiting_parent("d2");
		let (next, effects) = node_clicked(state.clone(), "d1", NodeKind::Diary, ctx);
		assert_eq!(next, state);
		assert_eq!(effects, vec![Effect::Status(StatusMessage::error(MSG_DUPLICATE))]);

		// Same pair with another type is a different relationship.
		let ctx = AuthoringContext {
			relationship: RelationshipType::References,
			..ctx
		};
		let (_, effects) = node_clicked(state, "d1", NodeKind::Diary, ctx);
		assert!(matches!(effects.as_slice(), [Effect::Commit { .. }]));
	}

	#[test]
	fn cancel_returns_to_idle_from_any_phase() {
		let (next, effects) = cancel(awaiting_parent("d1"));
		assert_eq!(next, SelectionState::default());
		assert!(effects.is_empty());
	}
}
