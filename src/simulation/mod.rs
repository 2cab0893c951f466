//! Headless force-directed layout: physics, tick scheduling and drag handling.
//!
//! Nothing in here touches the DOM. The canvas component wires a [`Clock`] and a
//! [`RenderTarget`] from the browser into [`ForceSimulation`].

mod config;
mod engine;
mod error;
mod interaction;
mod quadtree;
mod render_sync;
mod scheduler;
mod state;
mod types;

pub use config::SimulationConfig;
pub use engine::LayoutEngine;
pub use error::{GraphDataError, InteractionContractViolation};
pub use interaction::{DragMessage, DragSession, InteractionController};
pub use render_sync::{EdgeSegment, Frame, NodeGlyph, RenderSync, RenderTarget};
pub use scheduler::{Clock, ManualClock, Phase, Scheduler};
pub use state::{NodeIdx, SimEdge, SimNode, SimulationState};
pub use types::{GraphData, GraphLink, GraphNode};

use log::info;

/// Single owner of one loaded graph's state, its scheduler and its drag controller.
///
/// All writers (ticks and drag messages) go through `&mut self`, so they are serialized
/// on whatever thread drives the host's event loop.
#[derive(Debug)]
pub struct ForceSimulation<C: Clock> {
	config: SimulationConfig,
	engine: LayoutEngine,
	state: SimulationState,
	scheduler: Scheduler<C>,
	controller: InteractionController,
	render: RenderSync,
}

impl<C: Clock> ForceSimulation<C> {
	/// Build the state and start ticking. On error nothing is started.
	pub fn new(
		data: &GraphData,
		config: SimulationConfig,
		width: f64,
		height: f64,
		clock: C,
	) -> Result<Self, GraphDataError> {
		let state = SimulationState::new(data, &config, width, height)?;
		let mut scheduler = Scheduler::new(clock);
		scheduler.start();
		Ok(Self {
			engine: LayoutEngine::new(&config),
			render: RenderSync::new(&state),
			controller: InteractionController::new(config.reheat_alpha),
			config,
			state,
			scheduler,
		})
	}

	/// Read-only view of the live layout.
	pub fn state(&self) -> &SimulationState {
		&self.state
	}

	/// The tuning the simulation was built with.
	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}

	/// Scheduler phase; `Idle` after a cancel or a rejected reload.
	pub fn phase(&self) -> Phase {
		self.scheduler.phase()
	}

	/// The tick loop, for inspecting its phase and tick count.
	pub fn scheduler(&self) -> &Scheduler<C> {
		&self.scheduler
	}

	/// The clock the scheduler requests ticks from.
	pub fn clock_mut(&mut self) -> &mut C {
		self.scheduler.clock_mut()
	}

	/// The node currently held by the pointer, if any.
	pub fn drag_session(&self) -> Option<&DragSession> {
		self.controller.session()
	}

	/// Frame as of the most recent completed tick.
	pub fn frame(&self) -> &Frame {
		self.render.frame()
	}

	/// Deliver one clock tick: step, then hand the result to `target`.
	/// Returns false without presenting when the loop is not running.
	pub fn tick(&mut self, target: &mut dyn RenderTarget) -> bool {
		let dragging = self.controller.is_dragging();
		if !self
			.scheduler
			.tick(&self.engine, &mut self.state, dragging)
		{
			return false;
		}
		self.render
			.sync(&self.state, self.scheduler.ticks(), target);
		true
	}

	/// Apply one drag message. See [`InteractionController::handle`].
	pub fn dispatch(&mut self, message: DragMessage) -> Result<(), InteractionContractViolation> {
		self.controller
			.handle(message, &mut self.state, &mut self.scheduler)
	}

	/// Move the centering target after the canvas changes size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.state.set_viewport(width, height);
	}

	/// Replace the graph. The running loop is cancelled before the new state is built; if the
	/// new snapshot is rejected the loop stays idle.
	pub fn reload(&mut self, data: &GraphData, width: f64, height: f64) -> Result<(), GraphDataError> {
		self.scheduler.cancel();
		self.controller = InteractionController::new(self.config.reheat_alpha);
		self.state = SimulationState::new(data, &self.config, width, height)?;
		self.render = RenderSync::new(&self.state);
		self.scheduler.start();
		info!("Graph reloaded");
		Ok(())
	}

	/// Tear down: stop ticking and release the clock. Safe to call more than once.
	pub fn cancel(&mut self) {
		self.scheduler.cancel();
	}
}
