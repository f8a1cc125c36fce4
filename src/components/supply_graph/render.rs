use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::graph::camera::ease_out_cubic;
use crate::graph::scene::Scene;
use crate::graph::state::{NODE_RADIUS, SupplyGraphState};

pub fn render(state: &SupplyGraphState, ctx: &CanvasRenderingContext2d) {
	let scene = state.scene();
	ctx.set_fill_style_str("#f7f7f2");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, &scene, ctx);
	draw_nodes(state, &scene, ctx);
	ctx.restore();
}

fn draw_edges(state: &SupplyGraphState, scene: &Scene, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (line_width, dash, gap, arrow_size) = (1.5 / k, 8.0 / k, 4.0 / k, 6.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);

	for edge in &scene.edges {
		let ((x1, y1), (x2, y2)) = (edge.from, edge.to);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let is_highlighted =
			state.is_highlighted(edge.source) && state.is_highlighted(edge.target);
		// t=0: every edge at 0.6, t=1: highlighted at 0.9, the rest at 0.15
		let (alpha, width) = if is_highlighted {
			(0.6 + 0.3 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(&edge.color);
		ctx.set_line_width(width);
		if edge.directed {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		}

		let (ux, uy) = (dx / dist, dy / dist);
		let head = if edge.directed { arrow_size } else { 0.0 };
		ctx.begin_path();
		ctx.move_to(x1 + ux * NODE_RADIUS, y1 + uy * NODE_RADIUS);
		ctx.line_to(
			x2 - ux * (NODE_RADIUS + head),
			y2 - uy * (NODE_RADIUS + head),
		);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		if edge.directed {
			ctx.set_fill_style_str(&edge.color);
			let (tip_x, tip_y) = (x2 - ux * NODE_RADIUS, y2 - uy * NODE_RADIUS);
			let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
			let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
			ctx.begin_path();
			ctx.move_to(tip_x, tip_y);
			ctx.line_to(back_x + px, back_y + py);
			ctx.line_to(back_x - px, back_y - py);
			ctx.close_path();
			ctx.fill();
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &SupplyGraphState, scene: &Scene, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);
	let font_size = 12.0 / k.max(0.5);

	// Dimmed nodes first so highlighted ones draw on top
	for node in &scene.nodes {
		if has_highlight && state.is_highlighted(node.index) {
			continue;
		}
		let (alpha, radius) = if has_highlight {
			(1.0 - 0.7 * t, NODE_RADIUS * (1.0 - 0.15 * t))
		} else {
			(1.0, NODE_RADIUS)
		};
		ctx.set_global_alpha(alpha);
		draw_disc(ctx, node.x, node.y, radius, &node.color, node.pinned, k);
		draw_label(ctx, font_size, &node.label, node.x, node.y + radius);
	}
	ctx.set_global_alpha(1.0);

	if !has_highlight {
		return;
	}

	for node in &scene.nodes {
		if !state.is_highlighted(node.index) {
			continue;
		}
		let (x, y) = (node.x, node.y);
		let is_hovered = state.is_hovered(node.index);

		let (radius, glow_radius) = if is_hovered {
			(NODE_RADIUS * (1.0 + 0.35 * t), NODE_RADIUS * (1.8 + 1.2 * t))
		} else {
			(NODE_RADIUS * (1.0 + 0.2 * t), NODE_RADIUS * (1.4 + 0.6 * t))
		};

		if t > 0.01 {
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius) {
				let alpha = if is_hovered { 0.35 * t } else { 0.2 * t };
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 200, 80, {})", alpha));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 200, 80, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		draw_disc(ctx, x, y, radius, &node.color, node.pinned, k);
		draw_label(ctx, font_size, &node.label, x, y + radius);
	}
}

fn draw_disc(
	ctx: &CanvasRenderingContext2d,
	x: f64,
	y: f64,
	radius: f64,
	color: &str,
	pinned: bool,
	k: f64,
) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(color);
	ctx.fill();
	ctx.set_stroke_style_str(if pinned { "#333" } else { "white" });
	ctx.set_line_width(if pinned { 2.5 / k } else { 1.5 / k });
	ctx.stroke();
}

/// Label on a translucent plate just below the node.
fn draw_label(
	ctx: &CanvasRenderingContext2d,
	font_size: f64,
	label: &str,
	x: f64,
	top: f64,
) {
	ctx.set_font(&format!("{}px sans-serif", font_size));
	let text_width = ctx.measure_text(label).map(|m| m.width()).unwrap_or(0.0);
	let (pad, height) = (font_size * 0.3, font_size + 4.0);
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.8)");
	ctx.fill_rect(x - text_width / 2.0 - pad, top + 2.0, text_width + 2.0 * pad, height);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str("#333");
	let _ = ctx.fill_text(label, x, top + 2.0 + height / 2.0);
}
