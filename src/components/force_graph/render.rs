//! Canvas rendering for the force graph.
//!
//! Drawing happens in passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Links, straight or curved by their curvature, self-loops as arcs
//! 3. Nodes, then rings and labels on top
//!
//! Hidden nodes and links are skipped. While a path is shown, everything off
//! the path is dimmed.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaleConfig, ScaledValues};
use super::state::{EdgeInfo, ForceGraphState, NodeInfo};
use crate::theme::Theme;

type Positions = HashMap<DefaultNodeIdx, (f64, f64)>;

/// Renders the complete graph to the canvas.
pub fn render(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	draw_background(state, ctx, theme);

	let mut positions = Positions::new();
	state.graph.visit_nodes(|node| {
		positions.insert(node.index(), (node.x() as f64, node.y() as f64));
	});

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	draw_links(state, ctx, &scale, theme, &positions);
	draw_nodes(state, ctx, &scale, theme);

	ctx.restore();
}

fn draw_background(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let gradient = theme
		.background
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(
				state.width / 2.0,
				state.height / 2.0,
				0.0,
				state.width / 2.0,
				state.height / 2.0,
				state.width.max(state.height) * 0.8,
			)
			.ok()
		})
		.flatten();

	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&theme.background.color.to_css()),
	}
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

/// Quadratic control point bending the segment by `curve` times its length.
fn control_point(x1: f64, y1: f64, x2: f64, y2: f64, curve: f64) -> (f64, f64) {
	let (dx, dy) = (x2 - x1, y2 - y1);
	let (mid_x, mid_y) = ((x1 + x2) / 2.0, (y1 + y2) / 2.0);
	// Perpendicular of (dx, dy) scaled by curve; length cancels out.
	(mid_x + dy * curve, mid_y - dx * curve)
}

/// Circle used to draw a self-loop: sits on the node, on the side given by the
/// curvature sign, with a radius that grows with its magnitude.
fn self_loop_circle(x: f64, y: f64, curve: f64, node_radius: f64) -> (f64, f64, f64) {
	let radius = node_radius * (1.0 + 10.0 * curve.abs());
	let side = if curve < 0.0 { -1.0 } else { 1.0 };
	(x, y - side * radius, radius)
}

fn unit(dx: f64, dy: f64) -> Option<(f64, f64)> {
	let len = (dx * dx + dy * dy).sqrt();
	(len > 0.001).then(|| (dx / len, dy / len))
}

fn draw_links(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	positions: &Positions,
) {
	// Path links go last so they sit above dimmed ones.
	let (path, plain): (Vec<&EdgeInfo>, Vec<&EdgeInfo>) = state
		.edges
		.iter()
		.filter(|e| e.visible)
		.partition(|e| e.is_path);

	for edge in plain.into_iter().chain(path) {
		let (Some(&(x1, y1)), Some(&(x2, y2))) =
			(positions.get(&edge.source), positions.get(&edge.target))
		else {
			continue;
		};

		let alpha = if state.path_active && !edge.is_path {
			theme.edge.dimmed_alpha
		} else {
			theme.edge.alpha
		};
		let width = if edge.is_path_selected {
			scale.line_width * theme.edge.path_width * 1.5
		} else if edge.is_path {
			scale.line_width * theme.edge.path_width
		} else {
			scale.line_width
		};
		let color = edge.color.with_alpha(alpha).to_css();
		ctx.set_stroke_style_str(&color);
		ctx.set_fill_style_str(&color);
		ctx.set_line_width(width);

		if edge.source == edge.target {
			let (cx, cy, r) = self_loop_circle(x1, y1, edge.curve, scale.node_radius);
			ctx.begin_path();
			let _ = ctx.arc(cx, cy, r, 0.0, 2.0 * PI);
			ctx.stroke();
			continue;
		}

		let (cx, cy) = control_point(x1, y1, x2, y2, edge.curve);
		let (Some((sx, sy)), Some((ex, ey))) = (unit(cx - x1, cy - y1), unit(x2 - cx, y2 - cy))
		else {
			continue;
		};
		let start = (x1 + sx * scale.node_radius, y1 + sy * scale.node_radius);
		let tip = (x2 - ex * scale.node_radius, y2 - ey * scale.node_radius);
		let back = (tip.0 - ex * scale.arrow_size, tip.1 - ey * scale.arrow_size);

		ctx.begin_path();
		ctx.move_to(start.0, start.1);
		if edge.curve == 0.0 {
			ctx.line_to(back.0, back.1);
		} else {
			let _ = ctx.quadratic_curve_to(cx, cy, back.0, back.1);
		}
		ctx.stroke();

		let (px, py) = (-ey * scale.arrow_size * 0.5, ex * scale.arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip.0, tip.1);
		ctx.line_to(back.0 + px, back.1 + py);
		ctx.line_to(back.0 - px, back.1 - py);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_nodes(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	state.graph.visit_nodes(|node| {
		let info = &node.data.user_data;
		if !info.visible {
			return;
		}
		let alpha = if state.path_active && !info.is_path {
			theme.node.dimmed_alpha
		} else {
			1.0
		};
		draw_node(ctx, node.x() as f64, node.y() as f64, info, scale, theme, alpha);
	});

	// Rings and labels on top of every node body.
	state.graph.visit_nodes(|node| {
		let info = &node.data.user_data;
		if !info.visible {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		let radius = scale.node_radius * info.size;
		let hovered = state.hovered == Some(node.index());

		if hovered || info.is_path_selected {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + scale.ring_width * 2.0, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&theme.node.selected_ring.with_alpha(0.8).to_css());
			ctx.set_line_width(scale.ring_width);
			ctx.stroke();
		}

		if hovered || info.is_path || scale.show_all_labels {
			let dimmed = state.path_active && !info.is_path && !hovered;
			let label_alpha = if dimmed {
				theme.node.dimmed_alpha
			} else {
				theme.node.label_color.a
			};
			ctx.set_fill_style_str(&theme.node.label_color.with_alpha(label_alpha).to_css());
			ctx.set_font(&scale.label_font);
			let _ = ctx.fill_text(&info.label, x + radius + 4.0, y + 3.0);
		}
	});
}

fn draw_node(
	ctx: &CanvasRenderingContext2d,
	x: f64,
	y: f64,
	info: &NodeInfo,
	scale: &ScaledValues,
	theme: &Theme,
	alpha: f64,
) {
	let radius = scale.node_radius * info.size;
	ctx.set_global_alpha(alpha);
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);

	let gradient = theme
		.node
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius)
				.ok()
		})
		.flatten();
	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &info.color.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(0.7, &info.color.to_css());
			let _ = gradient.add_color_stop(1.0, &info.color.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&info.color.to_css()),
	}
	ctx.fill();
	ctx.set_global_alpha(1.0);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_curvature_is_the_midpoint() {
		assert_eq!(control_point(0.0, 0.0, 10.0, 0.0, 0.0), (5.0, 0.0));
	}

	#[test]
	fn opposite_curvatures_bend_to_opposite_sides() {
		let (_, up) = control_point(0.0, 0.0, 10.0, 0.0, 0.1);
		let (_, down) = control_point(0.0, 0.0, 10.0, 0.0, -0.1);
		assert_eq!(up, -1.0);
		assert_eq!(down, 1.0);
	}

	#[test]
	fn self_loops_nest_by_magnitude() {
		let (_, _, small) = self_loop_circle(0.0, 0.0, 0.2, 5.0);
		let (_, _, large) = self_loop_circle(0.0, 0.0, 0.4, 5.0);
		assert!(large > small);
		let (_, above, _) = self_loop_circle(0.0, 0.0, 0.2, 5.0);
		let (_, below, _) = self_loop_circle(0.0, 0.0, -0.3, 5.0);
		assert!(above < 0.0 && below > 0.0);
	}
}
