//! Client-side mirror of the diary graph and the relationship authoring
//! workflow. Nothing here touches the DOM; the canvas plugs in through
//! [`RenderSurface`].

pub mod authoring;
pub mod controller;
pub mod mapper;
pub mod mirror;
pub mod router;
pub mod session;
pub mod surface;
pub mod types;

pub use authoring::{Phase, SelectionState, StatusLevel, StatusMessage};
pub use controller::{Command, FetchMode, GraphController, HostEvent, ViewStatus};
pub use mirror::{GraphMirror, LoadState, ReconcileReport, Reconciler};
pub use router::ClickHit;
pub use session::Session;
pub use surface::RenderSurface;
pub use types::{ArrowHead, EdgeKind, GraphEdge, GraphNode, NodeKind, RelationshipType};
