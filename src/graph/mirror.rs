//! Local mirror of the backend graph and the reconciler that keeps it, and
//! the render surface, in step with fresh snapshots.

use std::collections::{BTreeSet, HashMap, HashSet};

use super::mapper::{MappedGraph, map_snapshot};
use super::surface::RenderSurface;
use super::types::{EdgeKind, GraphEdge, GraphNode, RelationshipType};
use crate::backend::{BackendError, GraphSnapshot};

/// Fetch status shown by the host. A single field, so "loading" and
/// "failed" can never both hold.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
	/// No fetch outstanding and the last one succeeded (or none ran yet).
	#[default]
	Idle,
	/// At least one fetch is in flight.
	Loading,
	/// The most recent fetch failed with this message.
	Failed(String),
}

impl LoadState {
	/// True while a fetch is in flight.
	pub fn is_loading(&self) -> bool {
		matches!(self, Self::Loading)
	}

	/// Message of the failed fetch, if that is the current state.
	pub fn error(&self) -> Option<&str> {
		match self {
			Self::Failed(msg) => Some(msg),
			_ => None,
		}
	}
}

/// Last-known node and edge sets.
#[derive(Clone, Debug, Default)]
pub struct GraphMirror {
	nodes: HashMap<String, GraphNode>,
	edges: HashMap<String, GraphEdge>,
}

impl GraphMirror {
	/// Node by id.
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.get(id)
	}

	/// Edge by id.
	pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
		self.edges.get(id)
	}

	/// All nodes, in no particular order.
	pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
		self.nodes.values()
	}

	/// All edges, in no particular order.
	pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
		self.edges.values()
	}

	/// Sorted node ids.
	pub fn node_ids(&self) -> BTreeSet<String> {
		self.nodes.keys().cloned().collect()
	}

	/// Sorted edge ids.
	pub fn edge_ids(&self) -> BTreeSet<String> {
		self.edges.keys().cloned().collect()
	}

	/// Whether an authored relationship with this exact shape already exists.
	pub fn has_relationship(&self, child: &str, parent: &str, kind: RelationshipType) -> bool {
		self.edges.values().any(|e| {
			e.source == child && e.target == parent && e.kind == EdgeKind::Relationship(kind)
		})
	}
}

/// Changes applied by one reconciliation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ReconcileReport {
	pub nodes_added: Vec<String>,
	pub nodes_updated: Vec<String>,
	pub nodes_removed: Vec<String>,
	pub edges_added: Vec<String>,
	pub edges_updated: Vec<String>,
	pub edges_removed: Vec<String>,
	/// Snapshot edges skipped because an endpoint was missing.
	pub edges_dropped: Vec<String>,
}

impl ReconcileReport {
	/// Nothing was added, updated or removed.
	pub fn is_noop(&self) -> bool {
		self.nodes_added.is_empty()
			&& self.nodes_updated.is_empty()
			&& self.nodes_removed.is_empty()
			&& self.edges_added.is_empty()
			&& self.edges_updated.is_empty()
			&& self.edges_removed.is_empty()
	}
}

/// Sole owner of the mirror and the render surface.
pub struct Reconciler<S> {
	mirror: GraphMirror,
	surface: S,
	load: LoadState,
	/// Fetches begun and not yet completed.
	outstanding: usize,
	/// A snapshot has been applied at least once.
	loaded: bool,
}

impl<S: RenderSurface> Reconciler<S> {
	/// Empty mirror over `surface`.
	pub fn new(surface: S) -> Self {
		Self {
			mirror: GraphMirror::default(),
			surface,
			load: LoadState::Idle,
			outstanding: 0,
			loaded: false,
		}
	}

	/// Current mirror contents.
	pub fn mirror(&self) -> &GraphMirror {
		&self.mirror
	}

	/// The render surface kept equal to the mirror.
	pub fn surface(&self) -> &S {
		&self.surface
	}

	/// Mutable surface access, for highlight state only.
	pub fn surface_mut(&mut self) -> &mut S {
		&mut self.surface
	}

	/// Fetch status for the host.
	pub fn load_state(&self) -> &LoadState {
		&self.load
	}

	/// Whether any snapshot was applied yet. Until then a retry must rebuild.
	pub fn has_loaded(&self) -> bool {
		self.loaded
	}

	/// Note that a fetch was issued.
	pub fn begin_fetch(&mut self) {
		self.outstanding += 1;
		self.load = LoadState::Loading;
	}

	/// Record a failed fetch. Mirror and surface are left as they were.
	pub fn fetch_failed(&mut self, err: &BackendError) {
		log::warn!("graph fetch failed: {err}");
		self.outstanding = self.outstanding.saturating_sub(1);
		self.load = LoadState::Failed(err.to_string());
	}

	/// Settle the load state after a successful apply. Another fetch still
	/// in flight keeps it at `Loading`.
	fn fetch_applied(&mut self) {
		self.outstanding = self.outstanding.saturating_sub(1);
		self.loaded = true;
		if self.outstanding == 0 {
			self.load = LoadState::Idle;
		}
	}

	/// Replace mirror and surface wholesale with `snapshot`.
	pub fn replace_with(&mut self, snapshot: &GraphSnapshot) -> ReconcileReport {
		let (nodes, edges, edges_dropped) = well_formed(map_snapshot(snapshot));

		self.surface.clear();
		self.mirror = GraphMirror::default();
		let mut report = ReconcileReport {
			edges_dropped,
			..Default::default()
		};
		for node in nodes {
			self.surface.add_node(&node);
			report.nodes_added.push(node.id.clone());
			self.mirror.nodes.insert(node.id.clone(), node);
		}
		for edge in edges {
			self.surface.add_edge(&edge);
			report.edges_added.push(edge.id.clone());
			self.mirror.edges.insert(edge.id.clone(), edge);
		}
		self.fetch_applied();
		log::info!(
			"graph loaded: {} nodes, {} edges",
			report.nodes_added.len(),
			report.edges_added.len()
		);
		report
	}

	/// Bring mirror and surface in line with `snapshot` incrementally.
	///
	/// Stale edges go first, then stale nodes, then nodes are upserted and
	/// finally edges, so the surface never holds an edge without both
	/// endpoints and never sees one id twice. Unchanged entries are not
	/// touched at all.
	pub fn apply_diff(&mut self, snapshot: &GraphSnapshot) -> ReconcileReport {
		let (nodes, edges, edges_dropped) = well_formed(map_snapshot(snapshot));
		let mut report = ReconcileReport {
			edges_dropped,
			..Default::default()
		};

		let next_edges: HashSet<&str> = edges.iter().map(|e| e.id.as_str()).collect();
		let next_nodes: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

		let stale_edges: Vec<String> = self
			.mirror
			.edges
			.keys()
			.filter(|id| !next_edges.contains(id.as_str()))
			.cloned()
			.collect();
		for id in stale_edges {
			self.surface.remove_edge(&id);
			self.mirror.edges.remove(&id);
			report.edges_removed.push(id);
		}

		let stale_nodes: Vec<String> = self
			.mirror
			.nodes
			.keys()
			.filter(|id| !next_nodes.contains(id.as_str()))
			.cloned()
			.collect();
		for id in stale_nodes {
			self.surface.remove_node(&id);
			self.mirror.nodes.remove(&id);
			report.nodes_removed.push(id);
		}

		for node in nodes {
			match self.mirror.nodes.get(&node.id) {
				None => {
					self.surface.add_node(&node);
					report.nodes_added.push(node.id.clone());
				}
				Some(current) if *current != node => {
					self.surface.update_node(&node);
					report.nodes_updated.push(node.id.clone());
				}
				Some(_) => continue,
			}
			self.mirror.nodes.insert(node.id.clone(), node);
		}

		for edge in edges {
			match self.mirror.edges.get(&edge.id) {
				None => {
					self.surface.add_edge(&edge);
					report.edges_added.push(edge.id.clone());
				}
				Some(current) if *current != edge => {
					self.surface.update_edge(&edge);
					report.edges_updated.push(edge.id.clone());
				}
				Some(_) => continue,
			}
			self.mirror.edges.insert(edge.id.clone(), edge);
		}

		self.fetch_applied();
		if !report.is_noop() {
			log::debug!("graph refresh applied: {report:?}");
		}
		report
	}

	/// Optimistically add an edge. Refused when the id is taken or an
	/// endpoint is not in the mirror.
	pub fn insert_edge(&mut self, edge: GraphEdge) -> bool {
		if self.mirror.edges.contains_key(&edge.id)
			|| !self.mirror.nodes.contains_key(&edge.source)
			|| !self.mirror.nodes.contains_key(&edge.target)
		{
			return false;
		}
		self.surface.add_edge(&edge);
		self.mirror.edges.insert(edge.id.clone(), edge);
		true
	}

	/// Remove an edge by id; a no-op when it is already gone.
	pub fn remove_edge(&mut self, id: &str) -> Option<GraphEdge> {
		let removed = self.mirror.edges.remove(id)?;
		self.surface.remove_edge(id);
		Some(removed)
	}
}

/// Deduplicate node ids (last record wins) and drop edges whose endpoints
/// are absent or whose id repeats.
fn well_formed(mapped: MappedGraph) -> (Vec<GraphNode>, Vec<GraphEdge>, Vec<String>) {
	let mut seen = HashMap::new();
	let mut nodes: Vec<GraphNode> = Vec::with_capacity(mapped.nodes.len());
	for node in mapped.nodes {
		match seen.get(&node.id).copied() {
			Some(slot) => {
				log::warn!("duplicate node id {} in snapshot", node.id);
				nodes[slot] = node;
			}
			None => {
				seen.insert(node.id.clone(), nodes.len());
				nodes.push(node);
			}
		}
	}

	let mut edge_ids = HashSet::new();
	let mut edges = Vec::with_capacity(mapped.edges.len());
	let mut dropped = Vec::new();
	for edge in mapped.edges {
		let has_endpoints = seen.contains_key(&edge.source) && seen.contains_key(&edge.target);
		if !has_endpoints || edge.source == edge.target || !edge_ids.insert(edge.id.clone()) {
			log::warn!(
				"dropping malformed edge {} ({} -> {})",
				edge.id,
				edge.source,
				edge.target
			);
			dropped.push(edge.id);
			continue;
		}
		edges.push(edge);
	}
	(nodes, edges, dropped)
}

#[cfg(test)]
pub(crate) mod tests {
	use std::collections::BTreeMap;

	use super::*;
	use crate::backend::{EdgeRecord, NodeRecord};

	/// Surface that records every call, for asserting on flicker.
	#[derive(Default)]
	pub(crate) struct RecordingSurface {
		pub nodes: BTreeMap<String, GraphNode>,
		pub edges: BTreeMap<String, GraphEdge>,
		pub log: Vec<String>,
	}

	impl RenderSurface for RecordingSurface {
		fn add_node(&mut self, node: &GraphNode) {
			assert!(!self.nodes.contains_key(&node.id), "duplicate node {}", node.id);
			self.log.push(format!("+n {}", node.id));
			self.nodes.insert(node.id.clone(), node.clone());
		}

		fn update_node(&mut self, node: &GraphNode) {
			self.log.push(format!("~n {}", node.id));
			self.nodes.insert(node.id.clone(), node.clone());
		}

		fn remove_node(&mut self, id: &str) {
			self.log.push(format!("-n {id}"));
			self.nodes.remove(id);
		}

		fn add_edge(&mut self, edge: &GraphEdge) {
			assert!(!self.edges.contains_key(&edge.id), "duplicate edge {}", edge.id);
			assert!(self.nodes.contains_key(&edge.source) && self.nodes.contains_key(&edge.target));
			self.log.push(format!("+e {}", edge.id));
			self.edges.insert(edge.id.clone(), edge.clone());
		}

		fn update_edge(&mut self, edge: &GraphEdge) {
			self.log.push(format!("~e {}", edge.id));
			self.edges.insert(edge.id.clone(), edge.clone());
		}

		fn remove_edge(&mut self, id: &str) {
			self.log.push(format!("-e {id}"));
			self.edges.remove(id);
		}

		fn clear(&mut self) {
			self.log.push("clear".into());
			self.nodes.clear();
			self.edges.clear();
		}

		fn node_ids(&self) -> BTreeSet<String> {
			self.nodes.keys().cloned().collect()
		}

		fn edge_ids(&self) -> BTreeSet<String> {
			self.edges.keys().cloned().collect()
		}
	}

	pub(crate) fn node(id: &str, kind: &str) -> NodeRecord {
		NodeRecord {
			id: id.into(),
			label: id.to_uppercase(),
			node_type: Some(kind.into()),
			properties: Default::default(),
		}
	}

	pub(crate) fn edge(id: &str, source: &str, target: &str, label: &str) -> EdgeRecord {
		EdgeRecord {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			label: label.into(),
		}
	}

	fn ids<'a>(items: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
		items.into_iter().map(String::from).collect()
	}

	fn sample() -> GraphSnapshot {
		GraphSnapshot {
			nodes: vec![node("d1", "diary"), node("d2", "diary"), node("t1", "tag")],
			edges: vec![
				edge("r1", "d1", "d2", "depends_on"),
				edge("tag-d1-t1", "d1", "t1", "tagged_as_work"),
				edge("tag-d2-t1", "d2", "t1", "tagged_as_work"),
			],
		}
	}

	fn assert_in_sync(rec: &Reconciler<RecordingSurface>, snapshot: &GraphSnapshot) {
		let snap_nodes = ids(snapshot.nodes.iter().map(|n| n.id.as_str()));
		let snap_edges = ids(snapshot.edges.iter().map(|e| e.id.as_str()));
		assert_eq!(rec.mirror().node_ids(), snap_nodes);
		assert_eq!(rec.surface().node_ids(), snap_nodes);
		assert_eq!(rec.mirror().edge_ids(), snap_edges);
		assert_eq!(rec.surface().edge_ids(), snap_edges);
	}

	#[test]
	fn refresh_from_empty_adds_everything() {
		let mut rec = Reconciler::new(RecordingSurface::default());
		let snapshot = sample();
		let report = rec.apply_diff(&snapshot);
		assert_eq!(report.nodes_added.len(), 3);
		assert_eq!(report.edges_added.len(), 3);
		assert_in_sync(&rec, &snapshot);
	}

	#[test]
	fn applying_same_snapshot_twice_is_idempotent() {
		let mut rec = Reconciler::new(RecordingSurface::default());
		let snapshot = sample();
		rec.replace_with(&snapshot);
		let calls_before = rec.surface().log.len();

		let report = rec.apply_diff(&snapshot);
		assert!(report.is_noop());
		assert_eq!(rec.surface().log.len(), calls_before);
		assert_in_sync(&rec, &snapshot);
	}

	#[test]
	fn removing_tag_only_touches_tag_and_its_edges() {
		let mut rec = Reconciler::new(RecordingSurface::default());
		rec.replace_with(&sample());
		rec.surface_mut().log.clear();

		let next = GraphSnapshot {
			nodes: vec![node("d1", "diary"), node("d2", "diary")],
			edges: vec![edge("r1", "d1", "d2", "depends_on")],
		};
		let report = rec.apply_diff(&next);

		assert_eq!(report.nodes_removed, vec!["t1".to_string()]);
		let mut removed_edges = report.edges_removed.clone();
		removed_edges.sort();
		assert_eq!(removed_edges, vec!["tag-d1-t1".to_string(), "tag-d2-t1".to_string()]);
		assert!(report.nodes_added.is_empty() && report.nodes_updated.is_empty());

		let log = &rec.surface().log;
		assert_eq!(log.len(), 3);
		assert_eq!(log.last().map(String::as_str), Some("-n t1"));
		assert!(log.iter().all(|call| call.starts_with('-')));
		assert_in_sync(&rec, &next);
	}

	#[test]
	fn changed_content_is_updated_in_place() {
		let mut rec = Reconciler::new(RecordingSurface::default());
		rec.replace_with(&sample());
		rec.surface_mut().log.clear();

		let mut next = sample();
		next.nodes[0].label = "Renamed".into();
		next.edges[0].label = "references".into();
		let report = rec.apply_diff(&next);

		assert_eq!(report.nodes_updated, vec!["d1".to_string()]);
		assert_eq!(report.edges_updated, vec!["r1".to_string()]);
		assert_eq!(rec.surface().log, vec!["~n d1".to_string(), "~e r1".to_string()]);
		assert_eq!(rec.mirror().node("d1").map(|n| n.label.as_str()), Some("Renamed"));
	}

	#[test]
	fn failed_fetch_leaves_mirror_untouched() {
		let mut rec = Reconciler::new(RecordingSurface::default());
		let snapshot = sample();
		rec.replace_with(&snapshot);
		rec.begin_fetch();
		assert!(rec.load_state().is_loading());

		rec.fetch_failed(&BackendError::Rejected("database is locked".into()));
		assert_eq!(rec.load_state().error(), Some("database is locked"));
		assert!(!rec.load_state().is_loading());
		assert_in_sync(&rec, &snapshot);
	}

	#[test]
	fn overlapping_fetches_stay_loading_until_the_last_lands() {
		let mut rec = Reconciler::new(RecordingSurface::default());
		let snapshot = sample();
		rec.replace_with(&snapshot);
		assert!(rec.has_loaded());

		rec.begin_fetch();
		rec.begin_fetch();
		rec.apply_diff(&snapshot);
		assert!(rec.load_state().is_loading());
		rec.apply_diff(&snapshot);
		assert_eq!(rec.load_state(), &LoadState::Idle);
	}

	#[test]
	fn nothing_is_loaded_until_a_snapshot_applies() {
		let mut rec = Reconciler::new(RecordingSurface::default());
		rec.begin_fetch();
		rec.fetch_failed(&BackendError::Rejected("offline".into()));
		assert!(!rec.has_loaded());
		assert!(!rec.load_state().is_loading());
	}

	#[test]
	fn dangling_and_self_loop_edges_are_dropped() {
		let mut rec = Reconciler::new(RecordingSurface::default());
		let snapshot = GraphSnapshot {
			nodes: vec![node("d1", "diary"), node("d2", "diary")],
			edges: vec![
				edge("ok", "d1", "d2", "related_to"),
				edge("ghost", "d1", "gone", "related_to"),
				edge("loop", "d1", "d1", "related_to"),
			],
		};
		let report = rec.apply_diff(&snapshot);
		assert_eq!(report.edges_dropped, vec!["ghost".to_string(), "loop".to_string()]);
		assert_eq!(rec.mirror().edge_ids(), ids(["ok"]));
		assert_eq!(rec.surface().edge_ids(), ids(["ok"]));
	}

	#[test]
	fn optimistic_insert_requires_known_endpoints() {
		let mut rec = Reconciler::new(RecordingSurface::default());
		rec.replace_with(&sample());
		let bad = GraphEdge::relationship("x".into(), "d1".into(), "nope".into(), RelationshipType::DependsOn);
		assert!(!rec.insert_edge(bad));

		let good = GraphEdge::relationship("x".into(), "d2".into(), "d1".into(), RelationshipType::References);
		assert!(rec.insert_edge(good));
		assert!(rec.mirror().has_relationship("d2", "d1", RelationshipType::References));
		assert!(rec.remove_edge("x").is_some());
		assert!(rec.remove_edge("x").is_none());
		assert_eq!(rec.surface().edge_ids(), rec.mirror().edge_ids());
	}
}
