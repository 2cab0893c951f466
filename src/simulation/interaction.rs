use log::{debug, warn};

use super::error::InteractionContractViolation;
use super::scheduler::{Clock, Scheduler};
use super::state::{NodeIdx, SimulationState};

/// Pointer gestures, already converted to graph coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum DragMessage {
	/// Pointer went down on a node.
	Start {
		/// Id of the node under the pointer.
		node_id: String,
		/// Where the pointer went down.
		pointer: (f64, f64),
	},
	/// Pointer moved while a node is held.
	Move {
		/// New pointer position.
		pointer: (f64, f64),
	},
	/// Pointer released.
	End,
}

/// The one node currently held by the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct DragSession {
	/// Arena slot of the held node.
	pub node: NodeIdx,
	/// Id of the held node, for logging and error reports.
	pub node_id: String,
	/// Last pointer position, which is also the node's pin.
	pub pointer: (f64, f64),
}

/// Turns drag gestures into pins and reheats. Holds at most one [`DragSession`].
#[derive(Clone, Debug)]
pub struct InteractionController {
	session: Option<DragSession>,
	reheat_alpha: f64,
}

impl InteractionController {
	/// A controller with no session. `reheat_alpha` is the alpha target held while dragging.
	pub fn new(reheat_alpha: f64) -> Self {
		Self {
			session: None,
			reheat_alpha,
		}
	}

	/// The active drag, if any.
	pub fn session(&self) -> Option<&DragSession> {
		self.session.as_ref()
	}

	/// Whether a node is held.
	pub fn is_dragging(&self) -> bool {
		self.session.is_some()
	}

	/// Route one message to its handler. Violations are logged and returned; they never
	/// change the state or the scheduler.
	pub fn handle<C: Clock>(
		&mut self,
		message: DragMessage,
		state: &mut SimulationState,
		scheduler: &mut Scheduler<C>,
	) -> Result<(), InteractionContractViolation> {
		let result = match message {
			DragMessage::Start { node_id, pointer } => {
				self.on_drag_start(state, scheduler, &node_id, pointer)
			}
			DragMessage::Move { pointer } => self.on_drag_move(state, pointer),
			DragMessage::End => self.on_drag_end(state, scheduler),
		};
		if let Err(ref violation) = result {
			warn!("Rejected drag message: {violation}");
		}
		result
	}

	/// Pin `node_id` under the pointer and reheat the loop.
	pub fn on_drag_start<C: Clock>(
		&mut self,
		state: &mut SimulationState,
		scheduler: &mut Scheduler<C>,
		node_id: &str,
		pointer: (f64, f64),
	) -> Result<(), InteractionContractViolation> {
		if let Some(active) = &self.session {
			return Err(InteractionContractViolation::SessionAlreadyActive {
				active: active.node_id.clone(),
				requested: node_id.to_owned(),
			});
		}
		let node = state
			.index_of(node_id)
			.ok_or_else(|| InteractionContractViolation::UnknownNode {
				id: node_id.to_owned(),
			})?;

		state.set_pin(node, Some(pointer));
		scheduler.reheat(state, self.reheat_alpha);
		debug!("Drag started on {node_id}");
		self.session = Some(DragSession {
			node,
			node_id: node_id.to_owned(),
			pointer,
		});
		Ok(())
	}

	/// Move the pin of the held node.
	pub fn on_drag_move(
		&mut self,
		state: &mut SimulationState,
		pointer: (f64, f64),
	) -> Result<(), InteractionContractViolation> {
		let session = self
			.session
			.as_mut()
			.ok_or(InteractionContractViolation::NoActiveSession {
				operation: "drag move",
			})?;
		session.pointer = pointer;
		state.set_pin(session.node, Some(pointer));
		Ok(())
	}

	/// Release the held node and let the layout cool again.
	pub fn on_drag_end<C: Clock>(
		&mut self,
		state: &mut SimulationState,
		scheduler: &mut Scheduler<C>,
	) -> Result<(), InteractionContractViolation> {
		let session = self
			.session
			.take()
			.ok_or(InteractionContractViolation::NoActiveSession {
				operation: "drag end",
			})?;
		state.set_pin(session.node, None);
		scheduler.cool(state);
		debug!("Drag ended on {}", session.node_id);
		Ok(())
	}
}
