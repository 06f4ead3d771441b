//! The boundary between the graph core and whatever draws it.

use std::collections::BTreeSet;

use super::types::{GraphEdge, GraphNode};

/// Dataset API of the visualization widget.
///
/// The core drives the surface incrementally; it never asks it to re-read
/// the mirror. Implementations must tolerate removing ids they do not hold.
#[allow(missing_docs)]
pub trait RenderSurface {
	fn add_node(&mut self, node: &GraphNode);
	fn update_node(&mut self, node: &GraphNode);
	/// Removing a node also drops its edges on the surface side.
	fn remove_node(&mut self, id: &str);

	/// Both endpoints are present when this is called.
	fn add_edge(&mut self, edge: &GraphEdge);
	fn update_edge(&mut self, edge: &GraphEdge);
	fn remove_edge(&mut self, id: &str);

	/// Drop every node and edge.
	fn clear(&mut self);

	fn node_ids(&self) -> BTreeSet<String>;
	fn edge_ids(&self) -> BTreeSet<String>;

	/// Mark the pending authoring child and the selected edge.
	fn highlight(&mut self, _pending_node: Option<&str>, _selected_edge: Option<&str>) {}
}
