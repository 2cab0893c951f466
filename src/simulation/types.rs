use serde::Deserialize;

use super::error::GraphDataError;

/// A drug node as delivered by the interaction graph endpoint.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphNode {
	/// Unique drug id; edges refer to nodes by it.
	pub id: String,
	/// Optional display name.
	#[serde(default)]
	pub label: Option<String>,
}

impl GraphNode {
	/// A node with no label.
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			label: None,
		}
	}

	/// Set the display label.
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	/// Display text, falling back to the id.
	pub fn display_label(&self) -> &str {
		self.label.as_deref().unwrap_or(&self.id)
	}
}

/// An interaction between two drugs. Interactions are undirected for layout purposes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphLink {
	/// Id of one drug.
	pub source: String,
	/// Id of the other drug.
	pub target: String,
}

impl GraphLink {
	/// An interaction between two node ids.
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}
}

/// Snapshot of the interaction graph, consumed once per load.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphData {
	/// Drugs, in the order they are laid out.
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	/// Interactions. Also accepted under the `links` key.
	#[serde(default, alias = "links")]
	pub edges: Vec<GraphLink>,
}

impl GraphData {
	/// Parse a snapshot from the `{ nodes, edges }` JSON shape.
	pub fn from_json(json: &str) -> Result<Self, GraphDataError> {
		serde_json::from_str(json).map_err(|e| GraphDataError::Malformed(e.to_string()))
	}
}
