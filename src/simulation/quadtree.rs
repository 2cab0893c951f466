//! Many-body repulsion, either exact over all pairs or approximated with a Barnes-Hut quad-tree.

use super::state::{Jiggle, NodeIdx};

const MAX_DEPTH: usize = 32;

#[derive(Debug)]
struct Quad {
	size: f64,
	count: usize,
	cx: f64,
	cy: f64,
	children: [Option<usize>; 4],
	points: Vec<NodeIdx>,
}

impl Quad {
	fn is_leaf(&self) -> bool {
		self.children.iter().all(Option::is_none)
	}
}

/// Region quad-tree over node positions, stored as an arena of quads.
#[derive(Debug)]
pub(crate) struct QuadTree {
	quads: Vec<Quad>,
}

impl QuadTree {
	pub(crate) fn build(points: &[(f64, f64)]) -> Self {
		let mut tree = Self { quads: Vec::new() };
		if points.is_empty() {
			return tree;
		}
		let (mut min_x, mut min_y, mut max_x, mut max_y) =
			(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
		for &(x, y) in points {
			min_x = min_x.min(x);
			min_y = min_y.min(y);
			max_x = max_x.max(x);
			max_y = max_y.max(y);
		}
		let size = (max_x - min_x).max(max_y - min_y).max(1.0) * (1.0 + 1e-9);
		let all: Vec<NodeIdx> = (0..points.len()).collect();
		tree.insert(points, all, min_x, min_y, size, 0);
		tree
	}

	fn insert(
		&mut self,
		points: &[(f64, f64)],
		members: Vec<NodeIdx>,
		x0: f64,
		y0: f64,
		size: f64,
		depth: usize,
	) -> usize {
		let count = members.len();
		let (sx, sy) = members
			.iter()
			.fold((0.0, 0.0), |(sx, sy), &i| (sx + points[i].0, sy + points[i].1));
		let slot = self.quads.len();
		self.quads.push(Quad {
			size,
			count,
			cx: sx / count as f64,
			cy: sy / count as f64,
			children: [None; 4],
			points: Vec::new(),
		});

		if count <= 1 || depth >= MAX_DEPTH {
			self.quads[slot].points = members;
			return slot;
		}

		let half = size / 2.0;
		let (mx, my) = (x0 + half, y0 + half);
		let mut buckets: [Vec<NodeIdx>; 4] = Default::default();
		for i in members {
			let (x, y) = points[i];
			let q = usize::from(x >= mx) | (usize::from(y >= my) << 1);
			buckets[q].push(i);
		}

		for (q, bucket) in buckets.into_iter().enumerate() {
			if bucket.is_empty() {
				continue;
			}
			let (qx, qy) = (
				if q & 1 == 1 { mx } else { x0 },
				if q & 2 == 2 { my } else { y0 },
			);
			let child = self.insert(points, bucket, qx, qy, half, depth + 1);
			self.quads[slot].children[q] = Some(child);
		}
		slot
	}

	#[cfg(test)]
	fn len(&self) -> usize {
		self.quads.len()
	}

	/// Velocity change on point `i` from every other point.
	fn accumulate(
		&self,
		i: NodeIdx,
		points: &[(f64, f64)],
		charge: &Charge,
		jiggle: &mut Jiggle,
	) -> (f64, f64) {
		let mut acc = (0.0, 0.0);
		if self.quads.is_empty() {
			return acc;
		}
		let (xi, yi) = points[i];
		let theta2 = charge.theta * charge.theta;
		let mut stack = vec![0usize];

		while let Some(slot) = stack.pop() {
			let quad = &self.quads[slot];
			let (dx, dy) = (quad.cx - xi, quad.cy - yi);
			let l = dx * dx + dy * dy;

			if quad.size * quad.size / theta2 < l {
				let (fx, fy) = charge.pull(dx, dy, quad.count as f64, jiggle);
				acc.0 += fx;
				acc.1 += fy;
				continue;
			}

			if quad.is_leaf() {
				for &j in quad.points.iter().filter(|&&j| j != i) {
					let (fx, fy) =
						charge.pull(points[j].0 - xi, points[j].1 - yi, 1.0, jiggle);
					acc.0 += fx;
					acc.1 += fy;
				}
			} else {
				stack.extend(quad.children.iter().flatten().copied());
			}
		}
		acc
	}
}

/// Parameters of the many-body pass for one step.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Charge {
	pub strength: f64,
	pub alpha: f64,
	pub distance_min: f64,
	pub theta: f64,
}

impl Charge {
	/// Velocity change toward a body of `weight` nodes offset by `(dx, dy)`.
	/// Negative strength turns the pull into a push.
	fn pull(&self, mut dx: f64, mut dy: f64, weight: f64, jiggle: &mut Jiggle) -> (f64, f64) {
		if dx == 0.0 {
			dx = jiggle.next();
		}
		if dy == 0.0 {
			dy = jiggle.next();
		}
		let mut l = dx * dx + dy * dy;
		let min2 = self.distance_min * self.distance_min;
		if l < min2 {
			l = (min2 * l).sqrt();
		}
		let k = self.strength * weight * self.alpha / l;
		(dx * k, dy * k)
	}
}

/// Exact O(n^2) pass. Returns the velocity change per node; `skip[i]` nodes get zero.
pub(crate) fn all_pairs(
	points: &[(f64, f64)],
	skip: &[bool],
	charge: &Charge,
	jiggle: &mut Jiggle,
) -> Vec<(f64, f64)> {
	let mut out = vec![(0.0, 0.0); points.len()];
	for (i, (xi, yi)) in points.iter().copied().enumerate() {
		if skip[i] {
			continue;
		}
		for (j, (xj, yj)) in points.iter().copied().enumerate() {
			if i == j {
				continue;
			}
			let (fx, fy) = charge.pull(xj - xi, yj - yi, 1.0, jiggle);
			out[i].0 += fx;
			out[i].1 += fy;
		}
	}
	out
}

/// Barnes-Hut pass over a freshly built quad-tree.
pub(crate) fn barnes_hut(
	points: &[(f64, f64)],
	skip: &[bool],
	charge: &Charge,
	jiggle: &mut Jiggle,
) -> Vec<(f64, f64)> {
	let tree = QuadTree::build(points);
	(0..points.len())
		.map(|i| {
			if skip[i] {
				(0.0, 0.0)
			} else {
				tree.accumulate(i, points, charge, jiggle)
			}
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn charge(theta: f64) -> Charge {
		Charge {
			strength: -150.0,
			alpha: 1.0,
			distance_min: 1.0,
			theta,
		}
	}

	fn scattered(n: usize) -> Vec<(f64, f64)> {
		let mut rng = Jiggle::new(42);
		(0..n)
			.map(|_| (rng.next() * 4e8, rng.next() * 4e8))
			.collect()
	}

	#[test]
	fn two_points_push_apart_symmetrically() {
		let points = [(0.0, 0.0), (10.0, 0.0)];
		let out = all_pairs(&points, &[false, false], &charge(0.9), &mut Jiggle::new(1));
		// 150 / 10 along the axis
		assert!((out[0].0 + 15.0).abs() < 1e-12);
		assert!((out[1].0 - 15.0).abs() < 1e-12);
		assert!(out[0].1.abs() < 1e-6 && out[1].1.abs() < 1e-6);
	}

	#[test]
	fn zero_theta_quadtree_matches_all_pairs() {
		let points = scattered(50);
		let skip = vec![false; points.len()];
		let exact = all_pairs(&points, &skip, &charge(0.0), &mut Jiggle::new(1));
		let approx = barnes_hut(&points, &skip, &charge(0.0), &mut Jiggle::new(1));
		for (a, b) in exact.iter().zip(&approx) {
			assert!((a.0 - b.0).abs() < 1e-9, "{a:?} vs {b:?}");
			assert!((a.1 - b.1).abs() < 1e-9, "{a:?} vs {b:?}");
		}
	}

	#[test]
	fn default_theta_stays_close_to_all_pairs() {
		let points = scattered(200);
		let skip = vec![false; points.len()];
		let exact = all_pairs(&points, &skip, &charge(0.0), &mut Jiggle::new(1));
		let approx = barnes_hut(&points, &skip, &charge(0.9), &mut Jiggle::new(1));
		let (mut err, mut norm) = (0.0, 0.0);
		for (a, b) in exact.iter().zip(&approx) {
			err += (a.0 - b.0).powi(2) + (a.1 - b.1).powi(2);
			norm += a.0.powi(2) + a.1.powi(2);
		}
		assert!((err / norm).sqrt() < 0.25, "relative error {}", (err / norm).sqrt());
	}

	#[test]
	fn coincident_points_terminate_and_repel() {
		let points = vec![(5.0, 5.0); 4];
		let tree = QuadTree::build(&points);
		assert!(tree.len() > 1);
		let out = barnes_hut(&points, &[false; 4], &charge(0.9), &mut Jiggle::new(3));
		assert!(out.iter().all(|(x, y)| x.is_finite() && y.is_finite()));
	}

	#[test]
	fn skipped_nodes_get_no_force() {
		let points = [(0.0, 0.0), (10.0, 0.0)];
		let out = all_pairs(&points, &[true, false], &charge(0.9), &mut Jiggle::new(1));
		assert_eq!(out[0], (0.0, 0.0));
	}
}
