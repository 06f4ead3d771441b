//! View configuration passed to the graph page.

use force_graph::SimulationParameters;

use crate::graph::RelationshipType;

/// Tunables for the diary graph view.
#[derive(Clone, Debug)]
pub struct GraphViewConfig {
	/// Node repulsion.
	pub force_charge: f32,
	/// Spring pull along edges.
	pub force_spring: f32,
	/// Cap on the force applied to one node per step.
	pub force_max: f32,
	#[allow(missing_docs)]
	pub node_speed: f32,
	/// Velocity retained per step, in `0..1`.
	pub damping_factor: f32,
	/// Fill the window and follow resizes.
	pub fullscreen: bool,
	/// Fixed size when not fullscreen; `None` measures the parent element.
	pub width: Option<f64>,
	/// See `width`.
	pub height: Option<f64>,
	/// Selector value when the page opens.
	pub default_relationship: RelationshipType,
	/// Pointer travel (px) under which a press-release counts as a click.
	pub click_slop: f64,
}

impl Default for GraphViewConfig {
	fn default() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			fullscreen: true,
			width: None,
			height: None,
			default_relationship: RelationshipType::DependsOn,
			click_slop: 4.0,
		}
	}
}

impl GraphViewConfig {
	/// Simulation parameters for the `force_graph` engine.
	pub fn simulation(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}
