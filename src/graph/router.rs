//! Routes raw click hits from the canvas to plain selection or authoring.

use super::authoring::{self, AuthoringContext, Effect, Phase, SelectionState, Transition};

/// What a pointer click landed on. Both fields empty means empty space.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClickHit {
	/// Node under the pointer.
	pub node: Option<String>,
	/// Edge under the pointer; only set when no node was hit.
	pub edge: Option<String>,
}

#[allow(missing_docs)]
impl ClickHit {
	pub fn node(id: impl Into<String>) -> Self {
		Self {
			node: Some(id.into()),
			edge: None,
		}
	}

	pub fn edge(id: impl Into<String>) -> Self {
		Self {
			node: None,
			edge: Some(id.into()),
		}
	}

	pub fn empty() -> Self {
		Self::default()
	}
}

/// Apply a click to the selection. An edge hit takes precedence, then empty
/// space, then the node.
pub fn route(state: SelectionState, hit: ClickHit, ctx: AuthoringContext<'_>) -> Transition {
	// Deletion is reachable in every mode.
	if let Some(edge) = hit.edge {
		let phase = match state.phase {
			Phase::Idle => Phase::Idle,
			_ => Phase::AwaitingChild,
		};
		let next = SelectionState {
			phase,
			selected_edge: Some(edge.clone()),
			selected_node: None,
		};
		return (next, vec![Effect::EdgeSelected { id: edge }]);
	}

	let Some(node_id) = hit.node else {
		// The pending child survives a stray click while authoring.
		let next = if state.is_authoring() {
			SelectionState {
				selected_edge: None,
				..state
			}
		} else {
			SelectionState::default()
		};
		return (next, Vec::new());
	};

	let Some(kind) = ctx.mirror.node(&node_id).map(|n| n.kind) else {
		log::debug!("click on node {node_id} that is no longer mirrored");
		return (state, Vec::new());
	};

	if state.is_authoring() {
		return authoring::node_clicked(state, &node_id, kind, ctx);
	}

	let next = SelectionState {
		phase: Phase::Idle,
		selected_edge: None,
		selected_node: Some(node_id.clone()),
	};
	(next, vec![Effect::NodeSelected { id: node_id, kind }])
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backend::GraphSnapshot;
	use crate::graph::mirror::Reconciler;
	use crate::graph::mirror::tests::{RecordingSurface, edge, node};
	use crate::graph::types::{NodeKind, RelationshipType};

	fn reconciler() -> Reconciler<RecordingSurface> {
		let mut rec = Reconciler::new(RecordingSurface::default());
		rec.replace_with(&GraphSnapshot {
			nodes: vec![node("d1", "diary"), node("d2", "diary"), node("t1", "tag")],
			edges: vec![edge("tag-d1-t1", "d1", "t1", "tagged_as_work")],
		});
		rec
	}

	fn ctx(rec: &Reconciler<RecordingSurface>) -> AuthoringContext<'_> {
		AuthoringContext {
			mirror: rec.mirror(),
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
	fn plain_node_click_notifies_with_type() {
		let rec = reconciler();
		let (next, effects) = route(SelectionState::default(), ClickHit::node("t1"), ctx(&rec));
		assert_eq!(next.selected_node.as_deref(), Some("t1"));
		assert_eq!(
			effects,
			vec![Effect::NodeSelected {
				id: "t1".into(),
				kind: NodeKind::Tag
			}]
		);
	}

	#[test]
	fn edge_hit_takes_precedence_over_node() {
		let rec = reconciler();
		let hit = ClickHit {
			node: Some("d1".into()),
			edge: Some("tag-d1-t1".into()),
		};
		let (next, effects) = route(awaiting_parent("d1"), hit, ctx(&rec));
		assert_eq!(next.selected_edge.as_deref(), Some("tag-d1-t1"));
		assert_eq!(next.pending_child(), None);
		assert_eq!(next.phase, Phase::AwaitingChild);
		assert_eq!(effects, vec![Effect::EdgeSelected { id: "tag-d1-t1".into() }]);
	}

	#[test]
	fn empty_click_keeps_pending_child_while_authoring() {
		let rec = reconciler();
		let (next, effects) = route(awaiting_parent("d1"), ClickHit::empty(), ctx(&rec));
		assert_eq!(next.pending_child(), Some("d1"));
		assert!(effects.is_empty());
	}

	#[test]
	fn empty_click_clears_everything_when_idle() {
		let rec = reconciler();
		let state = SelectionState {
			selected_edge: Some("tag-d1-t1".into()),
			selected_node: Some("d1".into()),
			..Default::default()
		};
		let (next, _) = route(state, ClickHit::empty(), ctx(&rec));
		assert_eq!(next, SelectionState::default());
	}

	#[test]
	fn authoring_clicks_go_to_state_machine() {
		let rec = reconciler();
		let state = SelectionState {
			phase: Phase::AwaitingChild,
			..Default::default()
		};
		let (next, _) = route(state, ClickHit::node("d2"), ctx(&rec));
		assert_eq!(next.pending_child(), Some("d2"));
		assert!(next.selected_node.is_none());
	}

	#[test]
	fn unknown_node_id_is_ignored() {
		let rec = reconciler();
		let state = awaiting_parent("d1");
		let (next, effects) = route(state.clone(), ClickHit::node("ghost"), ctx(&rec));
		assert_eq!(next, state);
		assert!(effects.is_empty());
	}
}
