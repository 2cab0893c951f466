/// Structural problems with a graph snapshot or its tuning. Fatal for that load attempt.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphDataError {
	/// The JSON did not have the snapshot or config shape.
	#[error("graph snapshot could not be decoded: {0}")]
	Malformed(String),
	/// Two nodes share an id.
	#[error("duplicate node id: {id}")]
	DuplicateNode {
		/// The repeated id.
		id: String,
	},
	/// An edge names a node that is not in the snapshot.
	#[error("edge {source_id} -> {target_id} references unknown node {missing}")]
	UnknownEndpoint {
		/// Source id as given on the edge.
		source_id: String,
		/// Target id as given on the edge.
		target_id: String,
		/// Whichever of the two is missing.
		missing: String,
	},
	/// An edge connects a node to itself.
	#[error("self-loop edge on node {id}")]
	SelfLoop {
		/// The node on both ends.
		id: String,
	},
	/// Two edges join the same pair, in either direction.
	#[error("duplicate edge between {source_id} and {target_id}")]
	DuplicateEdge {
		/// Source id of the second edge.
		source_id: String,
		/// Target id of the second edge.
		target_id: String,
	},
	/// A tuning value is non-finite or out of range.
	#[error("invalid simulation config: {field} = {value}")]
	InvalidConfig {
		/// Name of the config field.
		field: &'static str,
		/// The rejected value.
		value: f64,
	},
}

/// A drag message arrived that the interaction state machine cannot accept.
///
/// These indicate a bug in the host's event wiring. They are returned to the caller and
/// never change the simulation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InteractionContractViolation {
	/// Drag start named a node that is not loaded.
	#[error("drag started on unknown node {id}")]
	UnknownNode {
		/// The id from the message.
		id: String,
	},
	/// Drag start arrived while another node is held.
	#[error("drag started on {requested} while {active} is still being dragged")]
	SessionAlreadyActive {
		/// Node already held.
		active: String,
		/// Node the new start asked for.
		requested: String,
	},
	/// Move or end arrived with no drag in progress.
	#[error("{operation} received without an active drag")]
	NoActiveSession {
		/// Which message it was.
		operation: &'static str,
	},
}
