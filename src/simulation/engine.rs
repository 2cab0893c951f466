use super::config::SimulationConfig;
use super::quadtree::{self, Charge};
use super::state::SimulationState;

/// Computes forces and advances a [`SimulationState`] one step at a time.
#[derive(Clone, Debug)]
pub struct LayoutEngine {
	charge_strength: f64,
	charge_distance_min: f64,
	theta: f64,
	barnes_hut_threshold: usize,
	center_strength: f64,
	velocity_decay: f64,
}

impl Default for LayoutEngine {
	fn default() -> Self {
		Self::new(&SimulationConfig::default())
	}
}

impl LayoutEngine {
	/// Copy the force parameters out of `config`.
	pub fn new(config: &SimulationConfig) -> Self {
		Self {
			charge_strength: config.charge_strength,
			charge_distance_min: config.charge_distance_min,
			theta: config.theta,
			barnes_hut_threshold: config.barnes_hut_threshold,
			center_strength: config.center_strength,
			velocity_decay: config.velocity_decay,
		}
	}

	/// One tick: forces, integration, then alpha decay.
	pub fn step(&self, state: &mut SimulationState) {
		let alpha = state.alpha;
		self.apply_links(state, alpha);
		self.apply_charge(state, alpha);
		self.apply_center(state);
		self.integrate(state);

		state.alpha = (state.alpha + (state.alpha_target - state.alpha) * state.alpha_decay)
			.clamp(0.0, 1.0);
	}

	/// Springs pull each pair toward its rest length. The correction is shared by degree so
	/// hubs move less than leaves.
	fn apply_links(&self, state: &mut SimulationState, alpha: f64) {
		let SimulationState {
			nodes,
			edges,
			jiggle,
			..
		} = state;

		for edge in edges.iter() {
			let (s, t) = (&nodes[edge.source], &nodes[edge.target]);
			let mut dx = t.x + t.vx - s.x - s.vx;
			let mut dy = t.y + t.vy - s.y - s.vy;
			if dx == 0.0 {
				dx = jiggle.next();
			}
			if dy == 0.0 {
				dy = jiggle.next();
			}
			let l = (dx * dx + dy * dy).sqrt();
			let k = (l - edge.distance) / l * alpha * edge.strength;
			let (fx, fy) = (dx * k, dy * k);

			let target = &mut nodes[edge.target];
			if !target.is_pinned() {
				target.vx -= fx * edge.bias;
				target.vy -= fy * edge.bias;
			}
			let source = &mut nodes[edge.source];
			if !source.is_pinned() {
				source.vx += fx * (1.0 - edge.bias);
				source.vy += fy * (1.0 - edge.bias);
			}
		}
	}

	fn apply_charge(&self, state: &mut SimulationState, alpha: f64) {
		if self.charge_strength == 0.0 || state.nodes.len() < 2 {
			return;
		}
		let points: Vec<(f64, f64)> = state.nodes.iter().map(|n| (n.x, n.y)).collect();
		let skip: Vec<bool> = state.nodes.iter().map(|n| n.is_pinned()).collect();
		let charge = Charge {
			strength: self.charge_strength,
			alpha,
			distance_min: self.charge_distance_min,
			theta: self.theta,
		};

		let deltas = if points.len() > self.barnes_hut_threshold {
			quadtree::barnes_hut(&points, &skip, &charge, &mut state.jiggle)
		} else {
			quadtree::all_pairs(&points, &skip, &charge, &mut state.jiggle)
		};

		for (node, (dvx, dvy)) in state.nodes.iter_mut().zip(deltas) {
			node.vx += dvx;
			node.vy += dvy;
		}
	}

	/// Shift free nodes so the centroid drifts back toward the canvas center.
	fn apply_center(&self, state: &mut SimulationState) {
		let Some((mx, my)) = state.centroid() else {
			return;
		};
		let (cx, cy) = state.center;
		let (sx, sy) = (
			(mx - cx) * self.center_strength,
			(my - cy) * self.center_strength,
		);
		for node in state.nodes.iter_mut().filter(|n| !n.is_pinned()) {
			node.x -= sx;
			node.y -= sy;
		}
	}

	fn integrate(&self, state: &mut SimulationState) {
		let keep = 1.0 - self.velocity_decay;
		for node in state.nodes.iter_mut() {
			match node.pin {
				Some((fx, fy)) => {
					node.x = fx;
					node.y = fy;
					node.vx = 0.0;
					node.vy = 0.0;
				}
				None => {
					node.vx *= keep;
					node.vy *= keep;
					node.x += node.vx;
					node.y += node.vy;
				}
			}
		}
	}
}
