mod component;
mod render;
mod state;

pub use component::ForceGraphCanvas;
pub use state::{CanvasHandle, ForceGraphState};
