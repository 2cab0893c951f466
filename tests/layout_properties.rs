//! End-to-end behaviour of the layout core, driven by a manual clock.

use interaction_graph_canvas::simulation::{
	DragMessage, ForceSimulation, Frame, GraphData, GraphDataError, GraphLink, GraphNode,
	InteractionContractViolation, ManualClock, Phase, RenderTarget, SimulationConfig,
};

#[derive(Default)]
struct Recorder {
	frames: usize,
	last: Option<Frame>,
}

impl RenderTarget for Recorder {
	fn present(&mut self, frame: &Frame) {
		self.frames += 1;
		self.last = Some(frame.clone());
	}
}

fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> GraphData {
	GraphData {
		nodes: nodes.iter().map(|id| GraphNode::new(*id)).collect(),
		edges: edges.iter().map(|(s, t)| GraphLink::new(*s, *t)).collect(),
	}
}

fn simulation(data: &GraphData) -> ForceSimulation<ManualClock> {
	ForceSimulation::new(
		data,
		SimulationConfig::default(),
		600.0,
		400.0,
		ManualClock::default(),
	)
	.unwrap()
}

/// Deliver ticks for as long as the scheduler keeps asking.
fn run(sim: &mut ForceSimulation<ManualClock>, target: &mut Recorder) -> usize {
	let mut ticks = 0;
	while sim.clock_mut().take_pending() {
		if sim.tick(target) {
			ticks += 1;
		}
	}
	ticks
}

fn position(sim: &ForceSimulation<ManualClock>, id: &str) -> (f64, f64) {
	let node = sim.state().node_by_id(id).unwrap();
	(node.x, node.y)
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
	((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

#[test]
fn alpha_cools_monotonically_and_loop_stops() {
	let mut sim = simulation(&graph(&["a", "b", "c", "d"], &[("a", "b"), ("c", "d")]));
	let mut recorder = Recorder::default();
	let mut prev = sim.state().alpha();

	while sim.clock_mut().take_pending() {
		sim.tick(&mut recorder);
		assert!(sim.state().alpha() <= prev);
		prev = sim.state().alpha();
	}

	assert_eq!(sim.phase(), Phase::Stopped);
	assert!(sim.state().alpha() < sim.state().alpha_min());
	assert!(!sim.tick(&mut recorder));
	assert_eq!(recorder.frames as u64, sim.scheduler().ticks());
}

#[test]
fn linked_pair_settles_at_target_distance() {
	let mut sim = simulation(&graph(&["x", "y"], &[("x", "y")]));
	run(&mut sim, &mut Recorder::default());
	let d = distance(position(&sim, "x"), position(&sim, "y"));
	assert!((d - 100.0).abs() <= 5.0, "distance {d}");
}

#[test]
fn triangle_is_equilateral_and_centered() {
	let mut sim = simulation(&graph(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("a", "c")]));
	run(&mut sim, &mut Recorder::default());

	let (a, b, c) = (position(&sim, "a"), position(&sim, "b"), position(&sim, "c"));
	let sides = [distance(a, b), distance(b, c), distance(c, a)];
	let mean = sides.iter().sum::<f64>() / 3.0;
	assert!(sides.iter().all(|s| (s - mean).abs() / mean < 0.02), "{sides:?}");

	let (cx, cy) = sim.state().centroid().unwrap();
	assert!((cx - 300.0).abs() < 1.0 && (cy - 200.0).abs() < 1.0);
}

#[test]
fn dragged_node_holds_pin_then_resumes() {
	let mut sim = simulation(&graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]));
	let mut recorder = Recorder::default();
	run(&mut sim, &mut recorder);

	sim.dispatch(DragMessage::Start {
		node_id: "b".into(),
		pointer: (20.0, 30.0),
	})
	.unwrap();
	assert_eq!(sim.phase(), Phase::Running);

	sim.dispatch(DragMessage::Move { pointer: (40.0, 60.0) }).unwrap();
	for _ in 0..100 {
		assert!(sim.clock_mut().take_pending());
		sim.tick(&mut recorder);
		assert_eq!(position(&sim, "b"), (40.0, 60.0));
	}
	let rendered = recorder.last.as_ref().unwrap();
	assert!(rendered.nodes.iter().any(|n| n.id == "b" && n.pinned));

	sim.dispatch(DragMessage::End).unwrap();
	assert!(sim.clock_mut().take_pending());
	sim.tick(&mut recorder);
	assert_ne!(position(&sim, "b"), (40.0, 60.0));

	run(&mut sim, &mut recorder);
	assert_eq!(sim.phase(), Phase::Stopped);
}

#[test]
fn edge_to_absent_node_is_rejected() {
	let err = ForceSimulation::new(
		&graph(&["X"], &[("X", "Y")]),
		SimulationConfig::default(),
		600.0,
		400.0,
		ManualClock::default(),
	)
	.unwrap_err();
	assert!(matches!(err, GraphDataError::UnknownEndpoint { ref missing, .. } if missing == "Y"));
}

#[test]
fn overlapping_drag_is_rejected() {
	let mut sim = simulation(&graph(&["a", "b"], &[("a", "b")]));
	sim.dispatch(DragMessage::Start {
		node_id: "a".into(),
		pointer: (1.0, 2.0),
	})
	.unwrap();

	let err = sim
		.dispatch(DragMessage::Start {
			node_id: "b".into(),
			pointer: (3.0, 4.0),
		})
		.unwrap_err();
	assert!(matches!(
		err,
		InteractionContractViolation::SessionAlreadyActive { .. }
	));
	assert_eq!(sim.state().node_by_id("a").unwrap().pin, Some((1.0, 2.0)));
	assert_eq!(sim.drag_session().unwrap().node_id, "a");
}

#[test]
fn cancel_is_safe_from_every_phase() {
	let mut sim = simulation(&graph(&["a", "b"], &[("a", "b")]));
	sim.cancel();
	sim.cancel();
	assert_eq!(sim.phase(), Phase::Idle);
	assert!(!sim.clock_mut().is_pending());
	assert!(!sim.tick(&mut Recorder::default()));
}

#[test]
fn quadtree_pass_on_larger_graph_stays_finite() {
	let ids: Vec<String> = (0..150).map(|i| format!("DB{i:05}")).collect();
	let names: Vec<&str> = ids.iter().map(String::as_str).collect();
	let edges: Vec<(&str, &str)> = (1..150).map(|i| (names[i], names[i / 3])).collect();
	let config = SimulationConfig {
		barnes_hut_threshold: 64,
		..SimulationConfig::default()
	};
	let mut sim =
		ForceSimulation::new(&graph(&names, &edges), config, 600.0, 400.0, ManualClock::default())
			.unwrap();
	let ticks = run(&mut sim, &mut Recorder::default());

	assert!(ticks > 0);
	assert!(
		sim.state()
			.nodes()
			.iter()
			.all(|n| n.x.is_finite() && n.y.is_finite())
	);
}

#[test]
fn cancel_after_loop_has_stopped_leaves_nothing_pending() {
	let mut sim = simulation(&graph(&["a", "b"], &[("a", "b")]));
	run(&mut sim, &mut Recorder::default());
	assert_eq!(sim.phase(), Phase::Stopped);

	sim.cancel();
	assert_eq!(sim.phase(), Phase::Idle);
	assert!(!sim.clock_mut().is_pending());

	sim.dispatch(DragMessage::Start {
		node_id: "a".into(),
		pointer: (0.0, 0.0),
	})
	.unwrap();
	assert_eq!(sim.phase(), Phase::Idle);
	assert!(!sim.clock_mut().is_pending());
	assert!(!sim.tick(&mut Recorder::default()));
}
