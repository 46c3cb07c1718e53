//! Colors and visual styling shared by the graph model and the renderer.
//!
//! The model only needs the category palette and the neutral colors assigned
//! to placeholders and plain edges; the renderer uses the rest.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	/// Parses `#RRGGBB`. Anything else yields `None`.
	pub fn from_hex(hex: &str) -> Option<Self> {
		let digits = hex.strip_prefix('#')?;
		if digits.len() != 6 {
			return None;
		}
		let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
		Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Fixed palette cycled through by category index.
pub const CATEGORY_PALETTE: [Color; 4] = [
	Color::rgb(0x71, 0x67, 0xf6), // Blue
	Color::rgb(0xed, 0x70, 0xb1), // Pink
	Color::rgb(0xef, 0x87, 0x59), // Orange
	Color::rgb(0x99, 0xe4, 0xe5), // Green
];

/// Color of the category with the given registry index.
pub fn category_color(index: usize) -> Color {
	CATEGORY_PALETTE[index % CATEGORY_PALETTE.len()]
}

/// Color given to placeholder nodes until their own record arrives.
pub const PLACEHOLDER_COLOR: Color = Color::rgb(150, 150, 160);

/// Color of an edge that is not on a highlighted path.
pub const EDGE_COLOR: Color = Color::rgb(153, 153, 153);

/// Color of nodes and edges on a highlighted path.
pub const PATH_COLOR: Color = Color::rgb(0xf9, 0xc2, 0x4d);

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Secondary color for the radial gradient
	pub color_secondary: Color,
	pub use_gradient: bool,
}

/// Edge visual style.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Alpha applied to plain edges
	pub alpha: f64,
	/// Alpha applied to edges that are not on the path while a path is shown
	pub dimmed_alpha: f64,
	/// Width multiplier for path edges
	pub path_width: f64,
}

/// Node visual style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Whether nodes have inner gradients
	pub use_gradient: bool,
	/// Ring color for path endpoints and the selected path
	pub selected_ring: Color,
	/// Alpha of nodes off the path while a path is shown
	pub dimmed_alpha: f64,
	/// Label color
	pub label_color: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub background: BackgroundStyle,
	pub edge: EdgeStyle,
	pub node: NodeStyle,
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				color_secondary: Color::rgb(30, 35, 42),
				use_gradient: true,
			},
			edge: EdgeStyle {
				alpha: 0.6,
				dimmed_alpha: 0.15,
				path_width: 2.5,
			},
			node: NodeStyle {
				use_gradient: true,
				selected_ring: Color::rgb(255, 255, 255),
				dimmed_alpha: 0.3,
				label_color: Color::rgba(255, 255, 255, 0.85),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn palette_cycles_after_four_categories() {
		assert_eq!(category_color(0), CATEGORY_PALETTE[0]);
		assert_eq!(category_color(4), CATEGORY_PALETTE[0]);
		assert_eq!(category_color(6), CATEGORY_PALETTE[2]);
	}

	#[test]
	fn hex_parsing() {
		assert_eq!(Color::from_hex("#7167f6"), Some(CATEGORY_PALETTE[0]));
		assert_eq!(Color::from_hex("7167f6"), None);
		assert_eq!(Color::from_hex("#71"), None);
		assert_eq!(Color::from_hex("#zz67f6"), None);
	}

	#[test]
	fn css_output() {
		assert_eq!(CATEGORY_PALETTE[0].to_css(), "#7167f6");
		assert_eq!(Color::rgba(1, 2, 3, 0.5).to_css(), "rgba(1, 2, 3, 0.5)");
	}
}
