/// Pan and zoom applied on top of graph coordinates. `k` is the zoom factor.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	/// Horizontal offset in pixels.
	pub x: f64,
	/// Vertical offset in pixels.
	pub y: f64,
	/// Zoom factor.
	pub k: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl Viewport {
	/// Pointer position to graph coordinates.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Inverse of [`Viewport::screen_to_graph`].
	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	/// Zoom one wheel notch around a screen point, keeping that point fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, zoom_in: bool) {
		let factor = if zoom_in { 1.1 } else { 0.9 };
		let new_k = (self.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}
}

/// Background drag in progress.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// Whether the background is being dragged.
	pub active: bool,
	/// Pointer x at the start of the pan.
	pub start_x: f64,
	/// Pointer y at the start of the pan.
	pub start_y: f64,
	/// Viewport x at the start of the pan.
	pub viewport_start_x: f64,
	/// Viewport y at the start of the pan.
	pub viewport_start_y: f64,
}

impl PanState {
	/// Start panning from a screen point.
	pub fn begin(&mut self, sx: f64, sy: f64, viewport: &Viewport) {
		*self = Self {
			active: true,
			start_x: sx,
			start_y: sy,
			viewport_start_x: viewport.x,
			viewport_start_y: viewport.y,
		};
	}

	/// Move the viewport by the pointer's travel since [`PanState::begin`].
	pub fn apply(&self, sx: f64, sy: f64, viewport: &mut Viewport) {
		if self.active {
			viewport.x = self.viewport_start_x + (sx - self.start_x);
			viewport.y = self.viewport_start_y + (sy - self.start_y);
		}
	}
}
