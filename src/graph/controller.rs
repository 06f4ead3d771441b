//! Applies routed transitions to the mirror and turns them into backend work.
//!
//! Optimistic relationship creation is a two-phase commit: [`GraphController::click`]
//! inserts the edge and records it in the in-flight ledger, and
//! [`GraphController::create_completed`] either confirms it or compensates by
//! removing exactly that edge again.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::authoring::{self, AuthoringContext, Effect, Phase, SelectionState, StatusMessage, Transition};
use super::mirror::{GraphMirror, LoadState, ReconcileReport, Reconciler};
use super::router::{self, ClickHit};
use super::surface::RenderSurface;
use super::types::{GraphEdge, NodeKind, RelationshipType};
use crate::backend::{BackendError, CreateRelationship, GraphSnapshot};

/// Backend work requested by the controller. Completions come back through
/// [`GraphController::create_completed`], [`GraphController::delete_completed`]
/// and [`GraphController::fetch_completed`].
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
	/// Persist a staged relationship under the id the controller chose.
	CreateRelationship(CreateRelationship),
	/// Delete a persisted relationship.
	DeleteRelationship {
		/// Relationship id.
		id: String,
	},
	/// Re-fetch the graph and diff it in.
	Refresh,
}

/// Notifications for the host view.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum HostEvent {
	/// A node was picked outside authoring.
	NodeSelected { id: String, kind: NodeKind },
	/// The backend confirmed a create.
	RelationshipCreated { id: String },
	/// The backend confirmed a delete.
	RelationshipDeleted { id: String },
	/// Emitted after every batch; carries the current [`ViewStatus`].
	Changed(ViewStatus),
}

/// How a fetched snapshot is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchMode {
	/// First load: replace the mirror wholesale.
	Load,
	/// Later loads: incremental diff.
	Refresh,
}

/// Read-only summary for rendering toolbars and status lines.
#[derive(Clone, Debug, Default, PartialEq)]
#[allow(missing_docs)]
pub struct ViewStatus {
	pub selection: SelectionState,
	pub status: Option<StatusMessage>,
	pub load: LoadState,
	/// Type the next commit will carry.
	pub relationship: RelationshipType,
	pub node_count: usize,
	pub edge_count: usize,
	/// Optimistic creates awaiting the backend.
	pub in_flight: usize,
}

struct PendingCommit {
	edge: GraphEdge,
	/// Authoring session the commit belongs to.
	session: u64,
}

/// Owns the mirror, the selection and the in-flight ledger. All mutation
/// happens synchronously here; async work is described by [`Command`]s.
pub struct GraphController<S> {
	reconciler: Reconciler<S>,
	selection: SelectionState,
	relationship: RelationshipType,
	status: Option<StatusMessage>,
	in_flight: HashMap<String, PendingCommit>,
	deleting: HashSet<String>,
	authoring_session: u64,
	events: Vec<HostEvent>,
}

#[allow(missing_docs)]
impl<S: RenderSurface> GraphController<S> {
	pub fn new(surface: S, relationship: RelationshipType) -> Self {
		Self {
			reconciler: Reconciler::new(surface),
			selection: SelectionState::default(),
			relationship,
			status: None,
			in_flight: HashMap::new(),
			deleting: HashSet::new(),
			authoring_session: 0,
			events: Vec::new(),
		}
	}

	pub fn mirror(&self) -> &GraphMirror {
		self.reconciler.mirror()
	}

	pub fn surface(&self) -> &S {
		self.reconciler.surface()
	}

	pub fn selection(&self) -> &SelectionState {
		&self.selection
	}

	pub fn status(&self) -> Option<&StatusMessage> {
		self.status.as_ref()
	}

	pub fn load_state(&self) -> &LoadState {
		self.reconciler.load_state()
	}

	pub fn relationship(&self) -> RelationshipType {
		self.relationship
	}

	/// A snapshot has been applied at least once.
	pub fn has_loaded(&self) -> bool {
		self.reconciler.has_loaded()
	}

	pub fn view(&self) -> ViewStatus {
		ViewStatus {
			selection: self.selection.clone(),
			status: self.status.clone(),
			load: self.load_state().clone(),
			relationship: self.relationship,
			node_count: self.mirror().nodes().count(),
			edge_count: self.mirror().edges().count(),
			in_flight: self.in_flight.len(),
		}
	}

	/// Take queued events, followed by a fresh [`HostEvent::Changed`].
	pub fn drain_events(&mut self) -> Vec<HostEvent> {
		let mut events = std::mem::take(&mut self.events);
		events.push(HostEvent::Changed(self.view()));
		events
	}

	pub fn set_relationship_type(&mut self, relationship: RelationshipType) {
		self.relationship = relationship;
	}

	pub fn begin_fetch(&mut self) {
		self.reconciler.begin_fetch();
	}

	/// Apply a fetched snapshot, or record the failure and keep the mirror.
	pub fn fetch_completed(
		&mut self,
		mode: FetchMode,
		result: Result<GraphSnapshot, BackendError>,
	) -> Option<ReconcileReport> {
		let snapshot = match result {
			Ok(snapshot) => snapshot,
			Err(err) => {
				self.reconciler.fetch_failed(&err);
				return None;
			}
		};
		let report = match mode {
			FetchMode::Load => self.reconciler.replace_with(&snapshot),
			FetchMode::Refresh => self.reconciler.apply_diff(&snapshot),
		};
		self.forget_vanished();
		self.sync_highlight();
		Some(report)
	}

	pub fn start_authoring(&mut self) {
		self.authoring_session += 1;
		let transition = authoring::start(std::mem::take(&mut self.selection));
		let commands = self.apply(transition);
		debug_assert!(commands.is_empty());
	}

	/// Leave authoring. In-flight requests are not cancelled; their
	/// completions are still honored.
	pub fn cancel_authoring(&mut self) {
		self.authoring_session += 1;
		let transition = authoring::cancel(std::mem::take(&mut self.selection));
		let commands = self.apply(transition);
		debug_assert!(commands.is_empty());
	}

	pub fn click(&mut self, hit: ClickHit) -> Vec<Command> {
		let state = std::mem::take(&mut self.selection);
		let ctx = AuthoringContext {
			mirror: self.reconciler.mirror(),
			relationship: self.relationship,
		};
		let transition = router::route(state, hit, ctx);
		self.apply(transition)
	}

	/// Confirm a staged edge, or remove exactly that edge on failure. A
	/// refresh may already have removed it, in which case rollback does
	/// nothing.
	pub fn create_completed(&mut self, id: &str, result: Result<(), BackendError>) -> Vec<Command> {
		let Some(pending) = self.in_flight.remove(id) else {
			log::warn!("completion for unknown relationship {id}");
			return Vec::new();
		};
		let still_authoring =
			self.selection.is_authoring() && pending.session == self.authoring_session;

		match result {
			Ok(()) => {
				log::info!(
					"relationship {id} created ({} -> {})",
					pending.edge.source,
					pending.edge.target
				);
				self.status = Some(StatusMessage::info("Relationship created"));
				self.events.push(HostEvent::RelationshipCreated { id: id.to_string() });
			}
			Err(err) => {
				self.reconciler.remove_edge(id);
				if self.selection.selected_edge.as_deref() == Some(id) {
					self.selection.selected_edge = None;
				}
				if still_authoring {
					log::warn!("relationship {id} rolled back: {err}");
					self.status = Some(StatusMessage::error(format!(
						"Failed to create relationship: {err}"
					)));
				} else {
					log::warn!("relationship {id} rolled back after authoring ended: {err}");
				}
				self.sync_highlight();
			}
		}
		Vec::new()
	}

	/// Ask the backend to delete the selected relationship. The edge stays
	/// on screen until the backend confirms.
	pub fn delete_selected_edge(&mut self) -> Vec<Command> {
		let Some(id) = self.selection.selected_edge.clone() else {
			self.status = Some(StatusMessage::error("Select a relationship to delete"));
			return Vec::new();
		};
		let Some(edge) = self.reconciler.mirror().edge(&id) else {
			self.selection.selected_edge = None;
			self.status = Some(StatusMessage::error("That relationship no longer exists"));
			self.sync_highlight();
			return Vec::new();
		};
		if !edge.kind.is_user_relationship() {
			self.status = Some(StatusMessage::error(
				"Tag links are managed from the diary's tag list",
			));
			return Vec::new();
		}
		if self.in_flight.contains_key(&id) {
			self.status = Some(StatusMessage::error(
				"That relationship is still being saved; try again shortly",
			));
			return Vec::new();
		}
		if !self.deleting.insert(id.clone()) {
			return Vec::new();
		}
		self.status = Some(StatusMessage::info("Deleting relationship..."));
		vec![Command::DeleteRelationship { id }]
	}

	pub fn delete_completed(&mut self, id: &str, result: Result<(), BackendError>) -> Vec<Command> {
		self.deleting.remove(id);
		match result {
			Ok(()) => {
				log::info!("relationship {id} deleted");
				if self.selection.selected_edge.as_deref() == Some(id) {
					self.selection.selected_edge = None;
				}
				self.status = Some(StatusMessage::info("Relationship deleted"));
				self.events.push(HostEvent::RelationshipDeleted { id: id.to_string() });
				self.sync_highlight();
				vec![Command::Refresh]
			}
			Err(err) => {
				log::warn!("delete of relationship {id} failed: {err}");
				self.status = Some(StatusMessage::error(format!(
					"Failed to delete relationship: {err}"
				)));
				Vec::new()
			}
		}
	}

	fn apply(&mut self, (state, effects): Transition) -> Vec<Command> {
		self.selection = state;
		let mut commands = Vec::new();
		for effect in effects {
			match effect {
				Effect::Status(message) => self.status = Some(message),
				Effect::ClearStatus => self.status = None,
				Effect::Commit {
					child,
					parent,
					relationship,
				} => commands.extend(self.commit(child, parent, relationship)),
				Effect::NodeSelected { id, kind } => {
					self.events.push(HostEvent::NodeSelected { id, kind });
				}
				Effect::EdgeSelected { id } => log::debug!("edge {id} selected"),
			}
		}
		self.sync_highlight();
		commands
	}

	fn commit(
		&mut self,
		child: String,
		parent: String,
		relationship: RelationshipType,
	) -> Option<Command> {
		debug_assert_ne!(child, parent);
		let id = Uuid::new_v4().to_string();
		let edge = GraphEdge::relationship(id.clone(), child.clone(), parent.clone(), relationship);

		if !self.reconciler.insert_edge(edge.clone()) {
			log::warn!("could not stage relationship {child} -> {parent}");
			self.status = Some(StatusMessage::error(
				"One of the selected diaries is no longer in the graph",
			));
			return None;
		}
		self.in_flight.insert(
			id.clone(),
			PendingCommit {
				edge,
				session: self.authoring_session,
			},
		);
		log::info!("staged relationship {id}: {child} -[{relationship}]-> {parent}");
		self.status = Some(StatusMessage::info("Creating relationship..."));

		Some(Command::CreateRelationship(CreateRelationship {
			id,
			parent_id: parent,
			child_id: child,
			relationship_type: relationship.as_str().to_string(),
		}))
	}

	/// Drop selection references to ids a refresh removed.
	fn forget_vanished(&mut self) {
		let mirror = self.reconciler.mirror();
		let selection = &mut self.selection;
		if selection.selected_edge.as_deref().is_some_and(|id| mirror.edge(id).is_none()) {
			selection.selected_edge = None;
		}
		if selection.selected_node.as_deref().is_some_and(|id| mirror.node(id).is_none()) {
			selection.selected_node = None;
		}
		if selection.pending_child().is_some_and(|id| mirror.node(id).is_none()) {
			log::debug!("pending child vanished on refresh");
			selection.phase = Phase::AwaitingChild;
		}
	}

	fn sync_highlight(&mut self) {
		let pending = self.selection.pending_child().map(str::to_string);
		let edge = self.selection.selected_edge.clone();
		self.reconciler
			.surface_mut()
			.highlight(pending.as_deref(), edge.as_deref());
	}
}
