use serde::Deserialize;

use super::error::GraphDataError;

/// Tuning constants for the layout. The defaults reproduce the dashboard's established look.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Ideal spring length assigned to every edge.
	pub link_distance: f64,
	/// Many-body strength; negative values repel.
	pub charge_strength: f64,
	/// Distances below this are softened in the many-body pass.
	pub charge_distance_min: f64,
	/// Barnes-Hut opening criterion. Zero makes the quad-tree pass exact.
	pub theta: f64,
	/// Above this node count the quad-tree pass replaces the all-pairs pass. A coarse `theta`
	/// can settle into a different resting layout, so only graphs too large for the exact
	/// pass should cross it.
	pub barnes_hut_threshold: usize,
	/// Fraction of the centroid offset removed per step.
	pub center_strength: f64,
	/// Fraction of velocity lost per step.
	pub velocity_decay: f64,
	/// Starting alpha.
	pub alpha: f64,
	/// The loop stops once alpha falls below this.
	pub alpha_min: f64,
	/// Fraction of the gap to the alpha target closed per step.
	pub alpha_decay: f64,
	/// Alpha target held while a node is being dragged.
	pub reheat_alpha: f64,
	/// Radius of the circle nodes start on.
	pub initial_radius: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			link_distance: 100.0,
			charge_strength: -150.0,
			charge_distance_min: 1.0,
			theta: 0.9,
			barnes_hut_threshold: 1000,
			center_strength: 0.1,
			velocity_decay: 0.4,
			alpha: 1.0,
			alpha_min,
			// ~300 steps from 1.0 down to alpha_min
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			reheat_alpha: 0.3,
			initial_radius: 100.0,
		}
	}
}

impl SimulationConfig {
	/// Parse overrides on top of the defaults, then validate.
	pub fn from_json(json: &str) -> Result<Self, GraphDataError> {
		let config: Self =
			serde_json::from_str(json).map_err(|e| GraphDataError::Malformed(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	/// Reject non-finite and out-of-range values.
	pub fn validate(&self) -> Result<(), GraphDataError> {
		check("link_distance", self.link_distance, |v| v >= 0.0)?;
		check("charge_strength", self.charge_strength, |_| true)?;
		check("charge_distance_min", self.charge_distance_min, |v| v > 0.0)?;
		check("theta", self.theta, |v| v >= 0.0)?;
		check("center_strength", self.center_strength, |v| (0.0..=1.0).contains(&v))?;
		check("velocity_decay", self.velocity_decay, |v| (0.0..=1.0).contains(&v))?;
		check("alpha", self.alpha, |v| (0.0..=1.0).contains(&v))?;
		check("alpha_min", self.alpha_min, |v| (0.0..1.0).contains(&v))?;
		check("alpha_decay", self.alpha_decay, |v| v > 0.0 && v <= 1.0)?;
		check("reheat_alpha", self.reheat_alpha, |v| (0.0..=1.0).contains(&v))?;
		check("initial_radius", self.initial_radius, |v| v >= 0.0)?;
		Ok(())
	}
}

fn check(field: &'static str, value: f64, ok: impl Fn(f64) -> bool) -> Result<(), GraphDataError> {
	if value.is_finite() && ok(value) {
		Ok(())
	} else {
		Err(GraphDataError::InvalidConfig { field, value })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_validate() {
		SimulationConfig::default().validate().unwrap();
	}

	#[test]
	fn default_decay_cools_in_about_three_hundred_steps() {
		let config = SimulationConfig::default();
		let mut alpha = config.alpha;
		let mut steps = 0;
		while alpha >= config.alpha_min {
			alpha += (0.0 - alpha) * config.alpha_decay;
			steps += 1;
		}
		assert!((299..=301).contains(&steps), "steps: {steps}");
	}

	#[test]
	fn json_overrides_fill_remaining_defaults() {
		let config = SimulationConfig::from_json(r#"{"charge_strength": -30.0}"#).unwrap();
		assert_eq!(config.charge_strength, -30.0);
		assert_eq!(config.link_distance, 100.0);
	}

	#[test]
	fn rejects_out_of_range_damping() {
		let err = SimulationConfig::from_json(r#"{"velocity_decay": 1.5}"#).unwrap_err();
		assert_eq!(
			err,
			GraphDataError::InvalidConfig {
				field: "velocity_decay",
				value: 1.5
			}
		);
	}
}
