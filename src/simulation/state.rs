use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use log::info;

use super::config::SimulationConfig;
use super::error::GraphDataError;
use super::types::GraphData;

/// Index of a node in the simulation arena.
pub type NodeIdx = usize;

/// A node's live position and velocity.
#[derive(Clone, Debug, PartialEq)]
pub struct SimNode {
	/// Id from the snapshot.
	pub id: String,
	/// Display text, already resolved from the label or the id.
	pub label: String,
	/// Graph-space x.
	pub x: f64,
	/// Graph-space y.
	pub y: f64,
	/// Velocity carried into the next step.
	pub vx: f64,
	/// Vertical velocity.
	pub vy: f64,
	/// Fixed position override. While set the node is not integrated.
	pub pin: Option<(f64, f64)>,
	/// Number of edges touching the node.
	pub degree: usize,
}

impl SimNode {
	/// Whether a drag holds the node in place.
	pub fn is_pinned(&self) -> bool {
		self.pin.is_some()
	}
}

/// An undirected spring between two arena slots.
#[derive(Clone, Debug, PartialEq)]
pub struct SimEdge {
	/// Arena slot of one endpoint.
	pub source: NodeIdx,
	/// Arena slot of the other endpoint.
	pub target: NodeIdx,
	/// Rest length of the spring.
	pub distance: f64,
	pub(crate) strength: f64,
	/// Share of the correction applied to the target (the rest goes to the source).
	pub(crate) bias: f64,
}

/// xorshift64* used to separate coincident nodes reproducibly.
#[derive(Clone, Debug)]
pub(crate) struct Jiggle(u64);

impl Jiggle {
	pub(crate) fn new(seed: u64) -> Self {
		Self(seed.max(1))
	}

	fn next_unit(&mut self) -> f64 {
		let mut x = self.0;
		x ^= x >> 12;
		x ^= x << 25;
		x ^= x >> 27;
		self.0 = x;
		(x.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 11) as f64 / (1u64 << 53) as f64
	}

	pub(crate) fn next(&mut self) -> f64 {
		(self.next_unit() - 0.5) * 1e-6
	}
}

/// Mutable physics state for one loaded graph.
///
/// Nodes live in an arena addressed by [`NodeIdx`]; edges store indices, never references.
/// Topology is fixed after construction, a new graph means a new state.
#[derive(Clone, Debug)]
pub struct SimulationState {
	pub(crate) nodes: Vec<SimNode>,
	pub(crate) edges: Vec<SimEdge>,
	index: HashMap<String, NodeIdx>,
	pub(crate) alpha: f64,
	pub(crate) alpha_min: f64,
	pub(crate) alpha_decay: f64,
	pub(crate) alpha_target: f64,
	pub(crate) center: (f64, f64),
	pub(crate) jiggle: Jiggle,
}

impl SimulationState {
	/// Validate `data` and place its nodes on a circle around the viewport center.
	pub fn new(
		data: &GraphData,
		config: &SimulationConfig,
		width: f64,
		height: f64,
	) -> Result<Self, GraphDataError> {
		config.validate()?;

		let mut index = HashMap::with_capacity(data.nodes.len());
		for (i, node) in data.nodes.iter().enumerate() {
			if index.insert(node.id.clone(), i).is_some() {
				return Err(GraphDataError::DuplicateNode {
					id: node.id.clone(),
				});
			}
		}

		let mut degree = vec![0usize; data.nodes.len()];
		let mut pairs = HashSet::with_capacity(data.edges.len());
		let mut endpoints = Vec::with_capacity(data.edges.len());
		for link in &data.edges {
			if link.source == link.target {
				return Err(GraphDataError::SelfLoop {
					id: link.source.clone(),
				});
			}
			let lookup = |id: &String| {
				index
					.get(id)
					.copied()
					.ok_or_else(|| GraphDataError::UnknownEndpoint {
						source_id: link.source.clone(),
						target_id: link.target.clone(),
						missing: id.clone(),
					})
			};
			let (src, tgt) = (lookup(&link.source)?, lookup(&link.target)?);
			if !pairs.insert((src.min(tgt), src.max(tgt))) {
				return Err(GraphDataError::DuplicateEdge {
					source_id: link.source.clone(),
					target_id: link.target.clone(),
				});
			}
			degree[src] += 1;
			degree[tgt] += 1;
			endpoints.push((src, tgt));
		}

		let edges = endpoints
			.into_iter()
			.map(|(source, target)| {
				let (ds, dt) = (degree[source] as f64, degree[target] as f64);
				SimEdge {
					source,
					target,
					distance: config.link_distance,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		let center = (width / 2.0, height / 2.0);
		let count = data.nodes.len().max(1) as f64;
		let nodes = data
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				let angle = (i as f64) * 2.0 * PI / count;
				SimNode {
					id: node.id.clone(),
					label: node.display_label().to_owned(),
					x: center.0 + config.initial_radius * angle.cos(),
					y: center.1 + config.initial_radius * angle.sin(),
					vx: 0.0,
					vy: 0.0,
					pin: None,
					degree: degree[i],
				}
			})
			.collect();

		info!(
			"Simulation state built: {} nodes, {} edges",
			data.nodes.len(),
			data.edges.len()
		);

		Ok(Self {
			nodes,
			edges,
			index,
			alpha: config.alpha,
			alpha_min: config.alpha_min,
			alpha_decay: config.alpha_decay,
			alpha_target: 0.0,
			center,
			jiggle: Jiggle::new(0x9E37_79B9_7F4A_7C15),
		})
	}

	/// Nodes in snapshot order.
	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	/// Edges in snapshot order.
	pub fn edges(&self) -> &[SimEdge] {
		&self.edges
	}

	/// Node at an arena slot.
	pub fn node(&self, idx: NodeIdx) -> Option<&SimNode> {
		self.nodes.get(idx)
	}

	/// Arena slot of the node with this id.
	pub fn index_of(&self, id: &str) -> Option<NodeIdx> {
		self.index.get(id).copied()
	}

	/// Node with this id.
	pub fn node_by_id(&self, id: &str) -> Option<&SimNode> {
		self.index_of(id).and_then(|idx| self.nodes.get(idx))
	}

	/// Current temperature. Forces scale with it.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Threshold below which the layout counts as settled.
	pub fn alpha_min(&self) -> f64 {
		self.alpha_min
	}

	/// Value alpha decays toward. Non-zero only while a drag holds it up.
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Point the centroid is pulled toward.
	pub fn center(&self) -> (f64, f64) {
		self.center
	}

	/// True once alpha has dropped below `alpha_min`.
	pub fn is_cooled(&self) -> bool {
		self.alpha < self.alpha_min
	}

	pub(crate) fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target.clamp(0.0, 1.0);
	}

	/// Move the centering target, e.g. after the canvas is resized.
	pub fn set_viewport(&mut self, width: f64, height: f64) {
		self.center = (width / 2.0, height / 2.0);
	}

	/// Pin or release a node. Pinning moves the node onto the pin immediately.
	pub(crate) fn set_pin(&mut self, idx: NodeIdx, pin: Option<(f64, f64)>) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.pin = pin;
			if let Some((fx, fy)) = pin {
				node.x = fx;
				node.y = fy;
				node.vx = 0.0;
				node.vy = 0.0;
			}
		}
	}

	/// Mean node position, or `None` for an empty graph.
	pub fn centroid(&self) -> Option<(f64, f64)> {
		if self.nodes.is_empty() {
			return None;
		}
		let n = self.nodes.len() as f64;
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		Some((sx / n, sy / n))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::simulation::types::{GraphLink, GraphNode};

	fn data(nodes: &[&str], edges: &[(&str, &str)]) -> GraphData {
		GraphData {
			nodes: nodes.iter().map(|id| GraphNode::new(*id)).collect(),
			edges: edges.iter().map(|(s, t)| GraphLink::new(*s, *t)).collect(),
		}
	}

	fn build(nodes: &[&str], edges: &[(&str, &str)]) -> Result<SimulationState, GraphDataError> {
		SimulationState::new(&data(nodes, edges), &SimulationConfig::default(), 600.0, 400.0)
	}

	#[test]
	fn rejects_edge_to_missing_node() {
		let err = build(&["X"], &[("X", "Y")]).unwrap_err();
		assert_eq!(
			err,
			GraphDataError::UnknownEndpoint {
				source_id: "X".into(),
				target_id: "Y".into(),
				missing: "Y".into(),
			}
		);
	}

	#[test]
	fn rejects_duplicate_ids_self_loops_and_multi_edges() {
		assert!(matches!(
			build(&["A", "A"], &[]),
			Err(GraphDataError::DuplicateNode { .. })
		));
		assert!(matches!(
			build(&["A"], &[("A", "A")]),
			Err(GraphDataError::SelfLoop { .. })
		));
		assert!(matches!(
			build(&["A", "B"], &[("A", "B"), ("B", "A")]),
			Err(GraphDataError::DuplicateEdge { .. })
		));
	}

	#[test]
	fn link_strength_follows_smaller_degree() {
		let state = build(&["hub", "a", "b"], &[("hub", "a"), ("hub", "b")]).unwrap();
		let edge = &state.edges()[0];
		assert_eq!(state.node(0).unwrap().degree, 2);
		assert!((edge.strength - 1.0).abs() < 1e-12);
		assert!((edge.bias - 2.0 / 3.0).abs() < 1e-12);
	}

	#[test]
	fn nodes_start_on_circle_around_center() {
		let state = build(&["a", "b", "c", "d"], &[]).unwrap();
		for node in state.nodes() {
			let r = ((node.x - 300.0).powi(2) + (node.y - 200.0).powi(2)).sqrt();
			assert!((r - 100.0).abs() < 1e-9);
		}
		let (cx, cy) = state.centroid().unwrap();
		assert!((cx - 300.0).abs() < 1e-9 && (cy - 200.0).abs() < 1e-9);
	}

	#[test]
	fn labels_default_to_id() {
		let mut graph = data(&["DB01"], &[]);
		graph.nodes.push(GraphNode::new("DB02").with_label("Warfarin"));
		let state =
			SimulationState::new(&graph, &SimulationConfig::default(), 100.0, 100.0).unwrap();
		assert_eq!(state.node_by_id("DB01").unwrap().label, "DB01");
		assert_eq!(state.node_by_id("DB02").unwrap().label, "Warfarin");
	}

	#[test]
	fn jiggle_is_tiny_and_reproducible() {
		let (mut a, mut b) = (Jiggle::new(7), Jiggle::new(7));
		for _ in 0..100 {
			let v = a.next();
			assert_eq!(v, b.next());
			assert!(v.abs() <= 5e-7);
		}
	}
}
