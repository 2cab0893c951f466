//! Tick loop state machine, independent of any real timer.

use log::debug;

use super::engine::LayoutEngine;
use super::state::SimulationState;

/// Source of ticks. The scheduler asks for one tick at a time and the host delivers it by
/// calling [`Scheduler::tick`].
pub trait Clock {
	/// Ask for a tick on the next frame. Repeated requests before delivery coalesce.
	fn request_tick(&mut self);

	/// Drop any outstanding request. Must be safe to call repeatedly.
	fn release(&mut self);
}

/// Clock driven by hand, for tests and headless use.
#[derive(Debug, Default)]
pub struct ManualClock {
	pending: bool,
	requests: usize,
}

impl ManualClock {
	/// Take the outstanding request, if any. A `true` means the host owes a tick.
	pub fn take_pending(&mut self) -> bool {
		std::mem::take(&mut self.pending)
	}

	/// Whether a request is outstanding, without taking it.
	pub fn is_pending(&self) -> bool {
		self.pending
	}

	/// Total number of requests seen.
	pub fn requests(&self) -> usize {
		self.requests
	}
}

impl Clock for ManualClock {
	fn request_tick(&mut self) {
		self.pending = true;
		self.requests += 1;
	}

	fn release(&mut self) {
		self.pending = false;
	}
}

/// Where the tick loop is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
	/// Not started, or cancelled.
	Idle,
	/// Stepping once per clock tick.
	Running,
	/// Cooled below `alpha_min`; reheating resumes it.
	Stopped,
}

/// Drives [`LayoutEngine::step`] once per clock tick until the layout cools.
#[derive(Debug)]
pub struct Scheduler<C: Clock> {
	clock: C,
	phase: Phase,
	ticks: u64,
}

impl<C: Clock> Scheduler<C> {
	/// A scheduler in [`Phase::Idle`] that has not asked `clock` for anything yet.
	pub fn new(clock: C) -> Self {
		Self {
			clock,
			phase: Phase::Idle,
			ticks: 0,
		}
	}

	/// Current phase.
	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// Whether the next tick will step the engine.
	pub fn is_running(&self) -> bool {
		self.phase == Phase::Running
	}

	/// Steps taken since construction.
	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	/// The clock ticks are requested from.
	pub fn clock(&self) -> &C {
		&self.clock
	}

	/// Host access to the clock, e.g. to hand it a frame callback.
	pub fn clock_mut(&mut self) -> &mut C {
		&mut self.clock
	}

	/// Idle -> Running. Has no effect in any other phase.
	pub fn start(&mut self) {
		if self.phase == Phase::Idle {
			self.transition(Phase::Running);
			self.clock.request_tick();
		}
	}

	/// Run one step if running. Returns whether a step was taken.
	pub fn tick(
		&mut self,
		engine: &LayoutEngine,
		state: &mut SimulationState,
		dragging: bool,
	) -> bool {
		if self.phase != Phase::Running {
			return false;
		}
		engine.step(state);
		self.ticks += 1;

		if state.is_cooled() && !dragging {
			self.transition(Phase::Stopped);
		} else {
			self.clock.request_tick();
		}
		true
	}

	/// Raise the resting alpha and resume a stopped loop.
	pub fn reheat(&mut self, state: &mut SimulationState, target_alpha: f64) {
		state.set_alpha_target(target_alpha);
		if self.phase == Phase::Stopped {
			self.transition(Phase::Running);
			self.clock.request_tick();
		}
	}

	/// Let alpha fall back to rest; the loop stops on its own once cooled.
	pub fn cool(&mut self, state: &mut SimulationState) {
		state.set_alpha_target(0.0);
	}

	/// Stop unconditionally and release the clock. Idempotent.
	pub fn cancel(&mut self) {
		self.clock.release();
		if self.phase != Phase::Idle {
			self.transition(Phase::Idle);
		}
	}

	fn transition(&mut self, next: Phase) {
		debug!("Scheduler {:?} -> {:?} after {} ticks", self.phase, next, self.ticks);
		self.phase = next;
	}
}
