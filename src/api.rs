//! HTTP contracts with the scoring backend.
//!
//! Only [`fetch_interaction_graph`] feeds the layout core. The risk and recommendation calls
//! are for the surrounding dashboard.

use gloo_net::http::{Request, Response};
use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::simulation::GraphData;

/// Failure talking to the backend. The endpoint path is kept for the log line.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
	/// The request never got a response.
	#[error("network error calling {endpoint}: {message}")]
	Network {
		/// Endpoint path.
		endpoint: &'static str,
		/// Transport error text.
		message: String,
	},
	/// The backend answered with a non-2xx status.
	#[error("{endpoint} returned HTTP {status}")]
	Status {
		/// Endpoint path.
		endpoint: &'static str,
		/// HTTP status code.
		status: u16,
	},
	/// The body did not match the expected shape.
	#[error("failed to decode {endpoint} response: {message}")]
	Decode {
		/// Endpoint path.
		endpoint: &'static str,
		/// Decoder error text.
		message: String,
	},
}

/// Where the dashboard backend lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
	/// Scheme, host and port, with or without a trailing slash.
	pub base_url: String,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			base_url: "http://127.0.0.1:8000".into(),
		}
	}
}

impl ApiConfig {
	fn url(&self, endpoint: &str) -> String {
		format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
	}
}

/// Patient sex as the risk model encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
	/// Male.
	M,
	/// Female.
	F,
}

/// Body of `POST /risk_score`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskRequest {
	/// The patient's current medications.
	pub drug_ids: Vec<String>,
	/// Patient age in years, if known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub age: Option<u32>,
	/// Patient sex, if known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sex: Option<Sex>,
}

/// Aggregate interaction risk for a medication list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RiskScore {
	/// Overall score from the backend's model.
	pub risk_score: f64,
	/// Drug pairs considered.
	pub total_pairs: u32,
	/// Pairs with a severe interaction.
	pub severe_pairs: u32,
	/// Pairs with a moderate interaction.
	pub moderate_pairs: u32,
	/// Pairs with no known severity.
	pub unknown_pairs: u32,
}

#[derive(Debug, Deserialize)]
struct RiskResponse {
	risk: RiskScore,
}

/// Body of `POST /recommend`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendRequest {
	/// The patient's current medications.
	pub drug_ids: Vec<String>,
	/// The medication to find a replacement for.
	pub target_drug: String,
}

/// A candidate replacement and the risk of the list with it swapped in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Recommendation {
	/// The suggested drug.
	pub alternative_drug_id: String,
	/// Score of the list after the swap.
	pub risk_score: f64,
	/// Severe pairs after the swap.
	pub severe_pairs: u32,
	/// Moderate pairs after the swap.
	pub moderate_pairs: u32,
	/// Unknown-severity pairs after the swap.
	pub unknown_pairs: u32,
}

#[derive(Debug, Deserialize)]
struct RecommendResponse {
	#[serde(default)]
	recommendations: Vec<Recommendation>,
}

const GRAPH_ENDPOINT: &str = "/interaction_graph";
const RISK_ENDPOINT: &str = "/risk_score";
const RECOMMEND_ENDPOINT: &str = "/recommend_drug";

/// Fetch the graph snapshot. Structural validation happens later, when the simulation is built.
pub async fn fetch_interaction_graph(config: &ApiConfig) -> Result<GraphData, ApiError> {
	let response = Request::get(&config.url(GRAPH_ENDPOINT))
		.send()
		.await
		.map_err(|e| network(GRAPH_ENDPOINT, e))?;
	let graph: GraphData = decode(GRAPH_ENDPOINT, response).await?;
	info!(
		"Fetched interaction graph: {} nodes, {} edges",
		graph.nodes.len(),
		graph.edges.len()
	);
	Ok(graph)
}

pub async fn fetch_risk_score(config: &ApiConfig, request: &RiskRequest) -> Result<RiskScore, ApiError> {
	let response = Request::post(&config.url(RISK_ENDPOINT))
		.json(request)
		.map_err(|e| network(RISK_ENDPOINT, e))?
		.send()
		.await
		.map_err(|e| network(RISK_ENDPOINT, e))?;
	let body: RiskResponse = decode(RISK_ENDPOINT, response).await?;
	Ok(body.risk)
}

pub async fn fetch_recommendations(
	config: &ApiConfig,
	request: &RecommendRequest,
) -> Result<Vec<Recommendation>, ApiError> {
	let response = Request::post(&config.url(RECOMMEND_ENDPOINT))
		.json(request)
		.map_err(|e| network(RECOMMEND_ENDPOINT, e))?
		.send()
		.await
		.map_err(|e| network(RECOMMEND_ENDPOINT, e))?;
	let body: RecommendResponse = decode(RECOMMEND_ENDPOINT, response).await?;
	Ok(body.recommendations)
}

fn network(endpoint: &'static str, err: gloo_net::Error) -> ApiError {
	ApiError::Network {
		endpoint,
		message: err.to_string(),
	}
}

async fn decode<T: DeserializeOwned>(endpoint: &'static str, response: Response) -> Result<T, ApiError> {
	if !response.ok() {
		return Err(ApiError::Status {
			endpoint,
			status: response.status(),
		});
	}
	response.json::<T>().await.map_err(|e| ApiError::Decode {
		endpoint,
		message: e.to_string(),
	})
}
