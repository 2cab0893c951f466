//! Canvas view of the interaction graph, driven by [`crate::simulation::ForceSimulation`].

mod clock;
mod component;
mod render;
mod viewport;

pub use clock::RafClock;
pub use component::ForceGraphCanvas;
pub use render::CanvasTarget;
pub use viewport::{PanState, Viewport};
