//! Zoom-dependent sizes for graph visuals.
//!
//! Sizes are given in one of two spaces. World-space values scale with the
//! canvas transform; screen-space values stay a fixed number of pixels and are
//! divided by the zoom factor `k` before drawing.

/// How a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// World-space value for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Node radius in world units.
	pub node_radius: f64,
	pub node_behavior: ScaleBehavior,
	/// Hit detection radius in world units.
	pub hit_radius: f64,
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Zoom below which the label font stops shrinking.
	pub label_min_k: f64,
	/// Zoom at which every label is drawn, not only hovered and path nodes.
	pub label_all_k: f64,
	/// Link width in screen pixels.
	pub line_width: f64,
	/// Arrow head length in world units.
	pub arrow_size: f64,
	pub arrow_behavior: ScaleBehavior,
	/// Hover ring width in screen pixels.
	pub ring_width: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node_radius: 5.0,
			node_behavior: ScaleBehavior::Clamped {
				min_screen: 4.0,
				max_screen: f64::INFINITY,
			},
			hit_radius: 10.0,
			label_size: 10.0,
			label_min_k: 0.5,
			label_all_k: 1.2,
			line_width: 1.0,
			arrow_size: 4.0,
			arrow_behavior: ScaleBehavior::Clamped {
				min_screen: 3.0,
				max_screen: 14.0,
			},
			ring_width: 1.5,
		}
	}
}

/// Scale values computed once per frame for the current zoom level.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	pub node_radius: f64,
	pub hit_radius: f64,
	pub label_font: String,
	pub show_all_labels: bool,
	pub line_width: f64,
	pub arrow_size: f64,
	pub ring_width: f64,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let node_radius = config.node_behavior.apply(config.node_radius, k);
		let label_font_size = config.label_size / k.max(config.label_min_k);
		Self {
			node_radius,
			hit_radius: config.hit_radius.max(node_radius),
			label_font: format!("{label_font_size}px sans-serif"),
			show_all_labels: k >= config.label_all_k,
			line_width: ScaleBehavior::Screen.apply(config.line_width, k),
			arrow_size: config.arrow_behavior.apply(config.arrow_size, k),
			ring_width: ScaleBehavior::Screen.apply(config.ring_width, k),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn screen_sizes_counter_zoom() {
		assert_eq!(ScaleBehavior::Screen.apply(2.0, 2.0), 1.0);
		assert_eq!(ScaleBehavior::Screen.apply(2.0, 0.5), 4.0);
	}

	#[test]
	fn clamped_sizes_respect_bounds() {
		let behavior = ScaleBehavior::Clamped {
			min_screen: 4.0,
			max_screen: 8.0,
		};
		// 5 world units at k=0.5 is 2.5px; raised to 4px = 8 world units.
		assert_eq!(behavior.apply(5.0, 0.5), 8.0);
		assert_eq!(behavior.apply(5.0, 1.0), 5.0);
		// 5 world units at k=4 is 20px; capped at 8px = 2 world units.
		assert_eq!(behavior.apply(5.0, 4.0), 2.0);
	}

	#[test]
	fn labels_appear_when_zoomed_in() {
		let config = ScaleConfig::default();
		assert!(!ScaledValues::new(&config, 1.0).show_all_labels);
		assert!(ScaledValues::new(&config, 2.0).show_all_labels);
	}
}
