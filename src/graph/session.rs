//! Cooperative async driver around a [`GraphController`].
//!
//! Everything runs on one thread. The controller sits in a `RefCell` and is
//! only borrowed between awaits, so a click can be handled while requests
//! are in flight. Backend calls are handed to an injected local spawner.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use super::controller::{Command, FetchMode, GraphController, HostEvent, ViewStatus};
use super::router::ClickHit;
use super::surface::RenderSurface;
use super::types::RelationshipType;
use crate::backend::GraphBackend;

type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;
type EventSink = Rc<dyn Fn(HostEvent)>;

/// Shared handle to one controller and its backend. Clones share state.
pub struct Session<S, B> {
	controller: Rc<RefCell<GraphController<S>>>,
	backend: Rc<B>,
	spawn: Spawner,
	sink: EventSink,
}

impl<S, B> Clone for Session<S, B> {
	fn clone(&self) -> Self {
		Self {
			controller: self.controller.clone(),
			backend: self.backend.clone(),
			spawn: self.spawn.clone(),
			sink: self.sink.clone(),
		}
	}
}

impl<S: RenderSurface + 'static, B: GraphBackend + 'static> Session<S, B> {
	/// `spawn` must run futures on the current thread; `sink` receives every
	/// [`HostEvent`] in order.
	pub fn new(
		controller: GraphController<S>,
		backend: B,
		spawn: impl Fn(LocalBoxFuture<'static, ()>) + 'static,
		sink: impl Fn(HostEvent) + 'static,
	) -> Self {
		Self {
			controller: Rc::new(RefCell::new(controller)),
			backend: Rc::new(backend),
			spawn: Rc::new(spawn),
			sink: Rc::new(sink),
		}
	}

	/// Borrow the controller. Do not hold the guard across an await.
	pub fn controller(&self) -> Ref<'_, GraphController<S>> {
		self.controller.borrow()
	}

	#[allow(missing_docs)]
	pub fn view(&self) -> ViewStatus {
		self.controller.borrow().view()
	}

	/// First load: fetch and rebuild the mirror wholesale.
	pub async fn load_snapshot(&self) {
		self.fetch(FetchMode::Load).await;
	}

	/// Fetch and apply as an incremental diff.
	pub async fn refresh(&self) {
		self.fetch(FetchMode::Refresh).await;
	}

	/// Repeat the fetch that failed. Until a snapshot has been applied this is
	/// a load; afterwards it is a refresh, so the surface is never cleared.
	pub async fn retry(&self) {
		let mode = if self.controller.borrow().has_loaded() {
			FetchMode::Refresh
		} else {
			FetchMode::Load
		};
		self.fetch(mode).await;
	}

	async fn fetch(&self, mode: FetchMode) {
		self.controller.borrow_mut().begin_fetch();
		self.flush();
		let result = self.backend.fetch_graph().await;
		self.controller.borrow_mut().fetch_completed(mode, result);
		self.flush();
	}

	/// Route a canvas click; may spawn a create.
	pub fn click(&self, hit: ClickHit) {
		let commands = self.controller.borrow_mut().click(hit);
		self.run(commands);
	}

	#[allow(missing_docs)]
	pub fn start_authoring(&self) {
		self.controller.borrow_mut().start_authoring();
		self.flush();
	}

	#[allow(missing_docs)]
	pub fn cancel_authoring(&self) {
		self.controller.borrow_mut().cancel_authoring();
		self.flush();
	}

	/// Type used by the next commit.
	pub fn set_relationship_type(&self, relationship: RelationshipType) {
		self.controller.borrow_mut().set_relationship_type(relationship);
		self.flush();
	}

	/// Ask the backend to delete the selected edge. The edge stays until the
	/// backend confirms.
	pub fn delete_selected_edge(&self) {
		let commands = self.controller.borrow_mut().delete_selected_edge();
		self.run(commands);
	}

	/// Spawn each command; the controller has already applied any local
	/// mutation, so the request is issued strictly after it is visible.
	fn run(&self, commands: Vec<Command>) {
		self.flush();
		for command in commands {
			let session = self.clone();
			let task: LocalBoxFuture<'static, ()> = match command {
				Command::CreateRelationship(request) => Box::pin(async move {
					let id = request.id.clone();
					let result = session.backend.create_relationship(request).await;
					let next = session.controller.borrow_mut().create_completed(&id, result);
					session.run(next);
				}),
				Command::DeleteRelationship { id } => Box::pin(async move {
					let result = session.backend.delete_relationship(&id).await;
					let next = session.controller.borrow_mut().delete_completed(&id, result);
					session.run(next);
				}),
				Command::Refresh => Box::pin(async move { session.refresh().await }),
			};
			(self.spawn)(task);
		}
	}

	fn flush(&self) {
		let events = self.controller.borrow_mut().drain_events();
		for event in events {
			(self.sink)(event);
		}
	}
}
