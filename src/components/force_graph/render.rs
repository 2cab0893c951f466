use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::viewport::Viewport;
use crate::simulation::{Frame, RenderTarget};

/// Drawn radius of a node, in graph units.
pub const NODE_RADIUS: f64 = 6.0;
/// Pick radius for starting a drag. Larger than the glyph so small nodes stay grabbable.
pub const HIT_RADIUS: f64 = 12.0;

const BACKGROUND: &str = "#ffffff";
const EDGE_COLOR: &str = "#aaaaaa";
const NODE_COLOR: &str = "#0077ff";
const PINNED_RING: &str = "#ff7f0e";
const LABEL_COLOR: &str = "#333333";

/// Draws frames onto a 2D canvas context through the current viewport.
pub struct CanvasTarget {
	ctx: CanvasRenderingContext2d,
	/// Pan and zoom applied to every frame.
	pub viewport: Viewport,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
}

impl CanvasTarget {
	/// A target with the identity viewport.
	pub fn new(ctx: CanvasRenderingContext2d, width: f64, height: f64) -> Self {
		Self {
			ctx,
			viewport: Viewport::default(),
			width,
			height,
		}
	}

	/// Track a new canvas size; the next frame clears the whole area.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

impl RenderTarget for CanvasTarget {
	fn present(&mut self, frame: &Frame) {
		let ctx = &self.ctx;
		ctx.set_fill_style_str(BACKGROUND);
		ctx.fill_rect(0.0, 0.0, self.width, self.height);
		ctx.save();
		let _ = ctx.translate(self.viewport.x, self.viewport.y);
		let _ = ctx.scale(self.viewport.k, self.viewport.k);
		draw_edges(frame, ctx, self.viewport.k);
		draw_nodes(frame, ctx, self.viewport.k);
		ctx.restore();
	}
}

fn draw_edges(frame: &Frame, ctx: &CanvasRenderingContext2d, k: f64) {
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_line_width(1.5 / k);
	ctx.begin_path();
	for edge in &frame.edges {
		ctx.move_to(edge.x1, edge.y1);
		ctx.line_to(edge.x2, edge.y2);
	}
	ctx.stroke();
}

fn draw_nodes(frame: &Frame, ctx: &CanvasRenderingContext2d, k: f64) {
	ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
	for node in &frame.nodes {
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, NODE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(NODE_COLOR);
		ctx.fill();

		if node.pinned {
			let dash = 3.0 / k;
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(dash),
			));
			ctx.begin_path();
			let _ = ctx.arc(node.x, node.y, NODE_RADIUS + 3.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(PINNED_RING);
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}

		ctx.set_fill_style_str(LABEL_COLOR);
		let _ = ctx.fill_text(&node.label, node.x + 10.0, node.y + 3.0);
	}
}
