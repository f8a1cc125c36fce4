use serde::{Deserialize, Serialize};

use super::error::Result;
use super::palette::Palette;

/// Force constants and interaction thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Pairwise repulsion strength.
	pub repulsion: f64,
	/// Pairs farther apart than this ignore each other's repulsion.
	pub repulsion_max_distance: f64,
	/// Rest length of every link spring.
	pub link_distance: f64,
	/// Spring strength; `None` uses `1 / min(degree(source), degree(target))`.
	pub link_strength: Option<f64>,
	/// Pull toward the viewport center.
	pub centering: f64,
	/// Pull toward the node type's column.
	pub type_strength: f64,
	/// Pull toward the hashed per-node row.
	pub jitter_strength: f64,
	/// Vertical spread of the hashed rows as a fraction of the height.
	pub jitter_span: f64,
	/// Exclusion radius around each node.
	pub collision_radius: f64,
	/// Relaxation passes for overlap removal per tick.
	pub collision_iterations: usize,
	/// Fraction of velocity lost each tick.
	pub velocity_decay: f64,
	/// Per-tick approach of alpha toward its target.
	pub alpha_decay: f64,
	/// Alpha below which the simulation is considered cold.
	pub alpha_min: f64,
	/// Alpha restored when a pin changes.
	pub reheat_alpha: f64,
	/// Mean kinetic energy below which the simulation is considered settled.
	pub energy_threshold: f64,
	/// Hard cap on ticks before settling.
	pub max_ticks: u32,
	/// Empty band left and right of the type columns, as a fraction of the width.
	pub column_margin: f64,
	/// Padding around the node bounds when fitting the view.
	pub fit_margin: f64,
	/// Extra zoom factor applied after fitting.
	pub fit_zoom_out: f64,
	/// Zoom level used when focusing a clicked node.
	pub focus_zoom: f64,
	/// Duration of camera animations in seconds.
	pub camera_duration: f64,
	/// Pointer travel in screen pixels before a press becomes a drag.
	pub drag_threshold: f64,
	/// Hit test radius in graph units.
	pub hit_radius: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			repulsion: 400.0,
			repulsion_max_distance: 2000.0,
			link_distance: 150.0,
			link_strength: None,
			centering: 0.01,
			type_strength: 0.1,
			jitter_strength: 0.02,
			jitter_span: 0.5,
			collision_radius: 18.0,
			collision_iterations: 3,
			velocity_decay: 0.4,
			alpha_decay: 0.0228,
			alpha_min: 0.001,
			reheat_alpha: 0.3,
			energy_threshold: 0.001,
			max_ticks: 600,
			column_margin: 0.1,
			fit_margin: 40.0,
			fit_zoom_out: 0.9,
			focus_zoom: 2.0,
			camera_duration: 1.0,
			drag_threshold: 3.0,
			hit_radius: 12.0,
		}
	}
}

/// Everything that parameterizes one diagram variant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	/// Simulation and interaction constants.
	pub layout: LayoutConfig,
	/// Per-type tables.
	pub palette: Palette,
	/// Mark every edge directed regardless of the record.
	pub force_directed: bool,
}

impl GraphConfig {
	/// Parses a partial JSON override on top of the defaults.
	pub fn from_json_str(text: &str) -> Result<Self> {
		Ok(serde_json::from_str(text)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_override() {
		let config =
			GraphConfig::from_json_str(r#"{"force_directed": true, "layout": {"link_distance": 90}}"#)
				.unwrap();
		assert!(config.force_directed);
		assert_eq!(config.layout.link_distance, 90.0);
		assert_eq!(config.layout.repulsion, 400.0);
		assert_eq!(config.palette, Palette::default());
	}

	#[test]
	fn rejects_bad_json() {
		assert!(GraphConfig::from_json_str("[1,").is_err());
	}
}
