use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};

use crate::config::GraphViewConfig;
use crate::graph::{ArrowHead, GraphEdge, GraphNode, RenderSurface};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

pub const NODE_RADIUS: f64 = 5.0;
pub const HIT_RADIUS: f64 = 12.0;
pub const EDGE_HIT_DISTANCE: f64 = 5.0;
const GOLDEN_ANGLE: f64 = 2.399_963;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	pub tooltip: String,
	pub color: String,
}

impl NodeInfo {
	fn from_node(node: &GraphNode) -> Self {
		Self {
			id: node.id.clone(),
			label: node.label.clone(),
			tooltip: node.tooltip.clone(),
			color: COLORS[node.group as usize % COLORS.len()].into(),
		}
	}
}

/// Drawn edge; `source` is the child end, `target` the parent end.
#[derive(Clone, Debug)]
pub struct EdgeInfo {
	pub source: String,
	pub target: String,
	pub label: String,
	pub arrow: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	/// Pointer has left the click slop; the node now follows and is pinned.
	pub moved: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

/// Canvas-side graph: force simulation plus the id bookkeeping that lets
/// the core add and remove single nodes and edges.
pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	/// Pointer-down position, for telling clicks from drags.
	pub press: Option<(f64, f64)>,
	pub pending_node: Option<String>,
	pub selected_edge: Option<String>,
	config: GraphViewConfig,
	node_index: HashMap<String, DefaultNodeIdx>,
	edges: HashMap<String, EdgeInfo>,
	/// Springs per unordered node pair; several edges may share one.
	springs: HashMap<(String, String), usize>,
	placed: usize,
}

impl ForceGraphState {
	pub fn new(config: &GraphViewConfig, width: f64, height: f64) -> Self {
		Self {
			graph: ForceGraph::new(config.simulation()),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
			press: None,
			pending_node: None,
			selected_edge: None,
			config: config.clone(),
			node_index: HashMap::new(),
			edges: HashMap::new(),
			springs: HashMap::new(),
			placed: 0,
		}
	}

	pub fn node_idx(&self, id: &str) -> Option<DefaultNodeIdx> {
		self.node_index.get(id).copied()
	}

	pub fn edges(&self) -> impl Iterator<Item = (&String, &EdgeInfo)> {
		self.edges.iter()
	}

	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut out = HashMap::with_capacity(self.node_index.len());
		self.graph.visit_nodes(|node| {
			out.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		out
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn node_id_at(&self, sx: f64, sy: f64) -> Option<String> {
		let idx = self.node_at_position(sx, sy)?;
		let mut id = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				id = Some(node.data.user_data.id.clone());
			}
		});
		id
	}

	/// Closest edge within [`EDGE_HIT_DISTANCE`] of the point.
	pub fn edge_id_at(&self, sx: f64, sy: f64) -> Option<String> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let positions = self.positions();
		let mut best: Option<(f64, &String)> = None;
		for (id, edge) in &self.edges {
			let (Some(a), Some(b)) = (
				self.node_idx(&edge.source).and_then(|i| positions.get(&i)),
				self.node_idx(&edge.target).and_then(|i| positions.get(&i)),
			) else {
				continue;
			};
			let d = segment_distance((gx, gy), *a, *b);
			if d < EDGE_HIT_DISTANCE && best.is_none_or(|(bd, _)| d < bd) {
				best = Some((d, id));
			}
		}
		best.map(|(_, id)| id.clone())
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for edge in self.edges.values() {
				let (src, tgt) = (self.node_idx(&edge.source), self.node_idx(&edge.target));
				if src == Some(idx) {
					self.hover.neighbors.extend(tgt);
				} else if tgt == Some(idx) {
					self.hover.neighbors.extend(src);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.flow_time += dt as f64;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	/// Pointer down: grab the node under the pointer, or start panning.
	pub fn press_at(&mut self, x: f64, y: f64) {
		self.press = Some((x, y));
		let Some(idx) = self.node_at_position(x, y) else {
			self.pan.active = true;
			self.pan.start_x = x;
			self.pan.start_y = y;
			self.pan.transform_start_x = self.transform.x;
			self.pan.transform_start_y = self.transform.y;
			return;
		};
		let mut drag = DragState {
			active: true,
			moved: false,
			node_idx: Some(idx),
			start_x: x,
			start_y: y,
			..DragState::default()
		};
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				drag.node_start_x = node.x();
				drag.node_start_y = node.y();
			}
		});
		self.drag = drag;
	}

	/// Pointer moved. A grabbed node stays put and unpinned until the
	/// pointer travels past the click slop.
	pub fn pointer_moved(&mut self, x: f64, y: f64) {
		if self.drag.active {
			let Some(idx) = self.drag.node_idx else {
				return;
			};
			if !self.drag.moved {
				let travel = (x - self.drag.start_x).hypot(y - self.drag.start_y);
				if travel <= self.config.click_slop {
					return;
				}
				self.drag.moved = true;
			}
			let (dx, dy) = (
				(x - self.drag.start_x) / self.transform.k,
				(y - self.drag.start_y) / self.transform.k,
			);
			let (nx, ny) = (
				self.drag.node_start_x + dx as f32,
				self.drag.node_start_y + dy as f32,
			);
			self.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.x = nx;
					node.data.y = ny;
					node.data.is_anchor = true;
				}
			});
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		} else {
			let hovered = self.node_at_position(x, y);
			self.set_hover(hovered);
		}
	}

	/// Pointer up. True when the press was a click rather than a drag or pan.
	pub fn release(&mut self, x: f64, y: f64) -> bool {
		let press = self.press.take();
		let dragged = self.drag.moved;
		self.drag = DragState::default();
		self.pan.active = false;
		!dragged && press.is_some_and(|(px, py)| (x - px).hypot(y - py) <= self.config.click_slop)
	}

	/// Pointer left the canvas: drop any gesture in progress.
	pub fn cancel_pointer(&mut self) {
		self.press = None;
		self.drag = DragState::default();
		self.pan.active = false;
		self.set_hover(None);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	fn next_position(&mut self) -> (f32, f32) {
		let n = self.placed as f64;
		self.placed += 1;
		let (r, angle) = (30.0 * (n + 1.0).sqrt(), n * GOLDEN_ANGLE);
		((r * angle.cos()) as f32, (r * angle.sin()) as f32)
	}

	fn add_spring(&mut self, source: &str, target: &str) {
		let count = self.springs.entry(pair(source, target)).or_insert(0);
		*count += 1;
		if *count > 1 {
			return;
		}
		if let (Some(a), Some(b)) = (self.node_idx(source), self.node_idx(target)) {
			self.graph.add_edge(a, b, EdgeData::default());
		}
	}

	/// Returns true when the pair lost its last spring.
	fn release_spring(&mut self, source: &str, target: &str) -> bool {
		let key = pair(source, target);
		match self.springs.get_mut(&key) {
			Some(count) if *count > 1 => {
				*count -= 1;
				false
			}
			Some(_) => {
				self.springs.remove(&key);
				true
			}
			None => false,
		}
	}

	/// Recreate the simulation from the current nodes and springs, keeping
	/// positions and anchors. Used for removals.
	fn rebuild(&mut self) {
		let mut nodes = Vec::with_capacity(self.node_index.len());
		self.graph.visit_nodes(|node| {
			if self.node_index.contains_key(&node.data.user_data.id) {
				nodes.push(NodeData {
					x: node.data.x,
					y: node.data.y,
					mass: node.data.mass,
					is_anchor: node.data.is_anchor,
					user_data: node.data.user_data.clone(),
				});
			}
		});

		self.graph = ForceGraph::new(self.config.simulation());
		self.node_index.clear();
		for data in nodes {
			let id = data.user_data.id.clone();
			let idx = self.graph.add_node(data);
			self.node_index.insert(id, idx);
		}
		for (a, b) in self.springs.keys() {
			if let (Some(&ia), Some(&ib)) = (self.node_index.get(a), self.node_index.get(b)) {
				self.graph.add_edge(ia, ib, EdgeData::default());
			}
		}
		// Indices changed; transient pointer state would point at the wrong nodes.
		self.drag = DragState::default();
		self.hover = HoverState::default();
	}
}

fn pair(a: &str, b: &str) -> (String, String) {
	if a <= b {
		(a.to_string(), b.to_string())
	} else {
		(b.to_string(), a.to_string())
	}
}

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len2 = dx * dx + dy * dy;
	let t = if len2 < 1e-9 {
		0.0
	} else {
		(((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
	((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

impl RenderSurface for ForceGraphState {
	fn add_node(&mut self, node: &GraphNode) {
		if self.node_index.contains_key(&node.id) {
			self.update_node(node);
			return;
		}
		let (x, y) = self.next_position();
		let idx = self.graph.add_node(NodeData {
			x,
			y,
			mass: 10.0,
			is_anchor: false,
			user_data: NodeInfo::from_node(node),
		});
		self.node_index.insert(node.id.clone(), idx);
	}

	fn update_node(&mut self, node: &GraphNode) {
		let Some(idx) = self.node_idx(&node.id) else {
			self.add_node(node);
			return;
		};
		let info = NodeInfo::from_node(node);
		self.graph.visit_nodes_mut(|n| {
			if n.index() == idx {
				n.data.user_data = info.clone();
			}
		});
	}

	fn remove_node(&mut self, id: &str) {
		if self.node_index.remove(id).is_none() {
			return;
		}
		let incident: Vec<String> = self
			.edges
			.iter()
			.filter(|(_, e)| e.source == id || e.target == id)
			.map(|(edge_id, _)| edge_id.clone())
			.collect();
		for edge_id in incident {
			self.edges.remove(&edge_id);
		}
		self.springs.retain(|(a, b), _| a != id && b != id);
		if self.pending_node.as_deref() == Some(id) {
			self.pending_node = None;
		}
		self.rebuild();
	}

	fn add_edge(&mut self, edge: &GraphEdge) {
		if self.edges.contains_key(&edge.id) {
			self.update_edge(edge);
			return;
		}
		self.add_spring(&edge.source, &edge.target);
		self.edges.insert(
			edge.id.clone(),
			EdgeInfo {
				source: edge.source.clone(),
				target: edge.target.clone(),
				label: edge.label.clone(),
				arrow: edge.arrow == ArrowHead::ToTarget,
			},
		);
	}

	fn update_edge(&mut self, edge: &GraphEdge) {
		let same_ends = self
			.edges
			.get(&edge.id)
			.is_some_and(|e| e.source == edge.source && e.target == edge.target);
		if same_ends {
			if let Some(info) = self.edges.get_mut(&edge.id) {
				info.label = edge.label.clone();
				info.arrow = edge.arrow == ArrowHead::ToTarget;
			}
		} else {
			self.remove_edge(&edge.id);
			self.add_edge(edge);
		}
	}

	fn remove_edge(&mut self, id: &str) {
		let Some(edge) = self.edges.remove(id) else {
			return;
		};
		if self.selected_edge.as_deref() == Some(id) {
			self.selected_edge = None;
		}
		if self.release_spring(&edge.source, &edge.target) {
			self.rebuild();
		}
	}

	fn clear(&mut self) {
		self.graph = ForceGraph::new(self.config.simulation());
		self.node_index.clear();
		self.edges.clear();
		self.springs.clear();
		self.drag = DragState::default();
		self.hover = HoverState::default();
		self.pending_node = None;
		self.selected_edge = None;
		self.placed = 0;
	}

	fn node_ids(&self) -> BTreeSet<String> {
		self.node_index.keys().cloned().collect()
	}

	fn edge_ids(&self) -> BTreeSet<String> {
		self.edges.keys().cloned().collect()
	}

	fn highlight(&mut self, pending_node: Option<&str>, selected_edge: Option<&str>) {
		self.pending_node = pending_node.map(str::to_string);
		self.selected_edge = selected_edge.map(str::to_string);
	}
}

/// Shared handle: the controller mutates the state, the animation loop
/// and pointer handlers read it. All on the browser thread.
#[derive(Clone)]
pub struct CanvasHandle(pub Rc<RefCell<ForceGraphState>>);

impl CanvasHandle {
	pub fn new(state: ForceGraphState) -> Self {
		Self(Rc::new(RefCell::new(state)))
	}
}

impl RenderSurface for CanvasHandle {
	fn add_node(&mut self, node: &GraphNode) {
		self.0.borrow_mut().add_node(node);
	}

	fn update_node(&mut self, node: &GraphNode) {
		self.0.borrow_mut().update_node(node);
	}

	fn remove_node(&mut self, id: &str) {
		self.0.borrow_mut().remove_node(id);
	}

	fn add_edge(&mut self, edge: &GraphEdge) {
		self.0.borrow_mut().add_edge(edge);
	}

	fn update_edge(&mut self, edge: &GraphEdge) {
		self.0.borrow_mut().update_edge(edge);
	}

	fn remove_edge(&mut self, id: &str) {
		self.0.borrow_mut().remove_edge(id);
	}

	fn clear(&mut self) {
		self.0.borrow_mut().clear();
	}

	fn node_ids(&self) -> BTreeSet<String> {
		self.0.borrow().node_ids()
	}

	fn edge_ids(&self) -> BTreeSet<String> {
		self.0.borrow().edge_ids()
	}

	fn highlight(&mut self, pending_node: Option<&str>, selected_edge: Option<&str>) {
		self.0.borrow_mut().highlight(pending_node, selected_edge);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{EdgeKind, NodeKind, RelationshipType};

	fn node(id: &str, kind: NodeKind) -> GraphNode {
		GraphNode {
			id: id.into(),
			label: id.into(),
			kind,
			group: kind.group(),
			tooltip: id.into(),
			raw_properties: Default::default(),
		}
	}

	fn rel(id: &str, child: &str, parent: &str) -> GraphEdge {
		GraphEdge::relationship(id.into(), child.into(), parent.into(), RelationshipType::DependsOn)
	}

	fn state() -> ForceGraphState {
		let mut s = ForceGraphState::new(&GraphViewConfig::default(), 800.0, 600.0);
		s.add_node(&node("d1", NodeKind::Diary));
		s.add_node(&node("d2", NodeKind::Diary));
		s.add_node(&node("t1", NodeKind::Tag));
		s
	}

	fn node_count(s: &ForceGraphState) -> usize {
		let mut n = 0;
		s.graph.visit_nodes(|_| n += 1);
		n
	}

	#[test]
	fn removing_node_drops_incident_edges() {
		let mut s = state();
		s.add_edge(&rel("r1", "d1", "d2"));
		s.add_edge(&GraphEdge {
			id: "tag-d1-t1".into(),
			source: "d1".into(),
			target: "t1".into(),
			kind: EdgeKind::Tagged { tag: "t".into() },
			label: "t".into(),
			arrow: ArrowHead::None,
		});

		s.remove_node("t1");
		assert_eq!(s.node_ids().len(), 2);
		assert_eq!(node_count(&s), 2);
		assert_eq!(s.edge_ids().into_iter().collect::<Vec<_>>(), vec!["r1".to_string()]);
		assert!(s.node_idx("d1").is_some());
	}

	#[test]
	fn parallel_edges_share_a_spring() {
		let mut s = state();
		s.add_edge(&rel("r1", "d1", "d2"));
		s.add_edge(&rel("r2", "d2", "d1"));
		assert_eq!(s.springs.len(), 1);

		s.remove_edge("r1");
		assert_eq!(s.springs.len(), 1);
		s.remove_edge("r2");
		assert!(s.springs.is_empty());
		assert!(s.edge_ids().is_empty());
	}

	#[test]
	fn rebuild_preserves_positions() {
		let mut s = state();
		s.add_edge(&rel("r1", "d1", "d2"));
		let before = s.positions()[&s.node_idx("d2").unwrap()];
		s.remove_edge("r1");
		let after = s.positions()[&s.node_idx("d2").unwrap()];
		assert_eq!(before, after);
	}

	#[test]
	fn edge_hit_test_uses_segment_distance() {
		let mut s = state();
		s.add_edge(&rel("r1", "d1", "d2"));
		let positions = s.positions();
		let a = positions[&s.node_idx("d1").unwrap()];
		let b = positions[&s.node_idx("d2").unwrap()];
		let mid = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
		let screen = (mid.0 + s.transform.x, mid.1 + s.transform.y);
		assert_eq!(s.edge_id_at(screen.0, screen.1).as_deref(), Some("r1"));
		assert_eq!(s.edge_id_at(screen.0 + 500.0, screen.1 + 500.0), None);
	}

	#[test]
	fn highlight_tracks_core_selection() {
		let mut s = state();
		s.add_edge(&rel("r1", "d1", "d2"));
		s.highlight(Some("d1"), Some("r1"));
		assert_eq!(s.pending_node.as_deref(), Some("d1"));
		s.remove_edge("r1");
		assert!(s.selected_edge.is_none());
	}

	fn anchored(s: &ForceGraphState, idx: DefaultNodeIdx) -> bool {
		let mut pinned = false;
		s.graph.visit_nodes(|node| {
			if node.index() == idx {
				pinned = node.data.is_anchor;
			}
		});
		pinned
	}

	fn screen_position(s: &ForceGraphState, id: &str) -> (DefaultNodeIdx, f64, f64) {
		let idx = s.node_idx(id).unwrap();
		let (gx, gy) = s.positions()[&idx];
		(idx, gx * s.transform.k + s.transform.x, gy * s.transform.k + s.transform.y)
	}

	#[test]
	fn jitter_within_click_slop_neither_moves_nor_pins() {
		let mut s = state();
		let (idx, x, y) = screen_position(&s, "d1");
		let before = s.positions()[&idx];

		s.press_at(x, y);
		assert!(s.drag.active);
		s.pointer_moved(x + 2.0, y + 1.0);
		assert!(!anchored(&s, idx));
		assert_eq!(s.positions()[&idx], before);
		assert!(s.release(x + 2.0, y + 1.0));
		assert!(!anchored(&s, idx));
	}

	#[test]
	fn drag_past_click_slop_moves_and_pins() {
		let mut s = state();
		let (idx, x, y) = screen_position(&s, "d1");
		let before = s.positions()[&idx];

		s.press_at(x, y);
		s.pointer_moved(x + 20.0, y);
		assert!(anchored(&s, idx));
		let after = s.positions()[&idx];
		assert!((after.0 - before.0 - 20.0).abs() < 1e-3);

		// Coming back near the press point is still a drag, not a click.
		s.pointer_moved(x + 1.0, y);
		assert!(!s.release(x + 1.0, y));
		assert!(!s.drag.active);
	}

	#[test]
	fn press_on_empty_space_pans() {
		let mut s = state();
		let (tx, ty) = (s.transform.x, s.transform.y);
		s.press_at(5.0, 5.0);
		assert!(s.pan.active);
		s.pointer_moved(25.0, 15.0);
		assert_eq!((s.transform.x, s.transform.y), (tx + 20.0, ty + 10.0));
		s.cancel_pointer();
		assert!(!s.pan.active);
		assert!(s.press.is_none());
	}

	#[test]
	fn segment_distance_clamps_to_endpoints() {
		assert_eq!(segment_distance((0.0, 3.0), (0.0, 0.0), (10.0, 0.0)), 3.0);
		assert_eq!(segment_distance((-4.0, 0.0), (0.0, 0.0), (10.0, 0.0)), 4.0);
	}
}
