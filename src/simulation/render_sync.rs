//! Read-only hand-off of settled positions to whatever draws them.

use super::state::{NodeIdx, SimulationState};

/// One node as it should be drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeGlyph {
	/// Node id, for hit testing back to the simulation.
	pub id: String,
	/// Text drawn next to the node.
	pub label: String,
	/// Graph-space x.
	pub x: f64,
	/// Graph-space y.
	pub y: f64,
	/// Drawn with a marker while held by the pointer.
	pub pinned: bool,
}

/// A line between two node centers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeSegment {
	/// Index into [`Frame::nodes`].
	pub source: NodeIdx,
	/// Index into [`Frame::nodes`].
	pub target: NodeIdx,
	/// Source end, x.
	pub x1: f64,
	/// Source end, y.
	pub y1: f64,
	/// Target end, x.
	pub x2: f64,
	/// Target end, y.
	pub y2: f64,
}

/// Visual primitives for one completed tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
	/// One glyph per node, in snapshot order.
	pub nodes: Vec<NodeGlyph>,
	/// One segment per edge.
	pub edges: Vec<EdgeSegment>,
	/// Alpha after the tick.
	pub alpha: f64,
	/// Tick count the frame was taken at.
	pub tick: u64,
}

impl Frame {
	/// Topmost node whose center lies within `radius` of `(x, y)`.
	pub fn node_at(&self, x: f64, y: f64, radius: f64) -> Option<&NodeGlyph> {
		self.nodes
			.iter()
			.rev()
			.find(|n| (n.x - x).powi(2) + (n.y - y).powi(2) < radius * radius)
	}
}

/// Host side of the hand-off: a canvas, an SVG tree, a test recorder.
pub trait RenderTarget {
	/// Draw `frame`. Called once per completed tick.
	fn present(&mut self, frame: &Frame);
}

/// Keeps a [`Frame`] in step with a [`SimulationState`].
///
/// Labels and topology are captured once; each sync only copies coordinates.
#[derive(Clone, Debug, Default)]
pub struct RenderSync {
	frame: Frame,
}

impl RenderSync {
	/// Capture topology and labels from `state`, plus its current positions.
	pub fn new(state: &SimulationState) -> Self {
		let nodes = state
			.nodes()
			.iter()
			.map(|n| NodeGlyph {
				id: n.id.clone(),
				label: n.label.clone(),
				x: n.x,
				y: n.y,
				pinned: n.is_pinned(),
			})
			.collect();
		let edges = state
			.edges()
			.iter()
			.map(|e| EdgeSegment {
				source: e.source,
				target: e.target,
				x1: 0.0,
				y1: 0.0,
				x2: 0.0,
				y2: 0.0,
			})
			.collect();
		let mut sync = Self {
			frame: Frame {
				nodes,
				edges,
				alpha: state.alpha(),
				tick: 0,
			},
		};
		sync.capture(state, 0);
		sync
	}

	/// The last captured frame.
	pub fn frame(&self) -> &Frame {
		&self.frame
	}

	/// Copy current positions into the frame.
	pub fn capture(&mut self, state: &SimulationState, tick: u64) -> &Frame {
		for (glyph, node) in self.frame.nodes.iter_mut().zip(state.nodes()) {
			glyph.x = node.x;
			glyph.y = node.y;
			glyph.pinned = node.is_pinned();
		}
		for segment in self.frame.edges.iter_mut() {
			if let (Some(s), Some(t)) = (state.node(segment.source), state.node(segment.target)) {
				segment.x1 = s.x;
				segment.y1 = s.y;
				segment.x2 = t.x;
				segment.y2 = t.y;
			}
		}
		self.frame.alpha = state.alpha();
		self.frame.tick = tick;
		&self.frame
	}

	/// Capture and present in one go.
	pub fn sync(&mut self, state: &SimulationState, tick: u64, target: &mut dyn RenderTarget) {
		self.capture(state, tick);
		target.present(&self.frame);
	}
}
