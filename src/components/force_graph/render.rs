use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, NODE_RADIUS};

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	let positions = state.positions();
	draw_edges(state, &positions, ctx);
	draw_nodes(state, ctx);
	draw_pending(state, &positions, ctx);
	ctx.restore();
	draw_tooltip(state, &positions, ctx);
}

fn draw_edges(
	state: &ForceGraphState,
	positions: &HashMap<DefaultNodeIdx, (f64, f64)>,
	ctx: &CanvasRenderingContext2d,
) {
	let k = state.transform.k;
	let (line_width, dash, gap, arrow_size) = (1.5 / k, 8.0 / k, 4.0 / k, 8.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);

	for (id, edge) in state.edges() {
		let (Some(src), Some(tgt)) = (state.node_idx(&edge.source), state.node_idx(&edge.target))
		else {
			continue;
		};
		let (Some(&(x1, y1)), Some(&(x2, y2))) = (positions.get(&src), positions.get(&tgt)) else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let is_selected = state.selected_edge.as_deref() == Some(id.as_str());
		let is_highlighted = state.is_highlighted(src) && state.is_highlighted(tgt);

		// Base values when no highlight active
		// When highlighting: highlighted edges brighten, others dim
		// t=0: all edges at base (0.6), t=1: highlighted at 0.9, others at 0.15
		let (edge_alpha, arrow_alpha, width) = if is_selected {
			(1.0, 1.0, line_width * 2.0)
		} else if is_highlighted {
			(0.6 + 0.3 * t, 0.8 + 0.1 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, 0.8 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};
		let rgb = if is_selected { "255, 200, 80" } else { "100, 180, 255" };

		ctx.set_stroke_style_str(&format!("rgba({rgb}, {edge_alpha})"));
		ctx.set_line_width(width);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(dash_offset);

		let (ux, uy) = (dx / dist, dy / dist);
		let head = if edge.arrow { arrow_size } else { 0.0 };
		ctx.begin_path();
		ctx.move_to(x1 + ux * NODE_RADIUS, y1 + uy * NODE_RADIUS);
		ctx.line_to(x2 - ux * (NODE_RADIUS + head), y2 - uy * (NODE_RADIUS + head));
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		if edge.arrow {
			ctx.set_fill_style_str(&format!("rgba({rgb}, {arrow_alpha})"));
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

		if is_selected || (is_highlighted && t > 0.5) {
			ctx.set_fill_style_str(&format!("rgba({rgb}, {edge_alpha})"));
			ctx.set_font(&format!("{}px sans-serif", 9.0 / k.max(0.5)));
			let _ = ctx.fill_text(&edge.label, (x1 + x2) / 2.0 + 3.0 / k, (y1 + y2) / 2.0 - 3.0 / k);
		}
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

/// Ring around the child picked while authoring.
fn draw_pending(
	state: &ForceGraphState,
	positions: &HashMap<DefaultNodeIdx, (f64, f64)>,
	ctx: &CanvasRenderingContext2d,
) {
	let Some(&(x, y)) = state
		.pending_node
		.as_deref()
		.and_then(|id| state.node_idx(id))
		.and_then(|idx| positions.get(&idx))
	else {
		return;
	};
	let k = state.transform.k;
	let pulse = 1.0 + 0.15 * (state.flow_time * 4.0).sin();
	ctx.begin_path();
	let _ = ctx.arc(x, y, (NODE_RADIUS + 4.0 / k) * pulse, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str("rgba(255, 200, 80, 0.9)");
	ctx.set_line_width(2.0 / k);
	ctx.stroke();
}

/// Tooltip for the hovered node, drawn in screen space.
fn draw_tooltip(
	state: &ForceGraphState,
	positions: &HashMap<DefaultNodeIdx, (f64, f64)>,
	ctx: &CanvasRenderingContext2d,
) {
	let Some(idx) = state.hover.node else {
		return;
	};
	let Some(&(gx, gy)) = positions.get(&idx) else {
		return;
	};
	let mut tooltip = None;
	state.graph.visit_nodes(|node| {
		if node.index() == idx {
			tooltip = Some(node.data.user_data.tooltip.clone());
		}
	});
	let Some(tooltip) = tooltip.filter(|t| !t.is_empty()) else {
		return;
	};

	let (sx, sy) = (
		gx * state.transform.k + state.transform.x + 12.0,
		gy * state.transform.k + state.transform.y + 12.0,
	);
	let lines: Vec<&str> = tooltip.lines().collect();
	ctx.set_font("11px sans-serif");
	let width = lines
		.iter()
		.filter_map(|l| ctx.measure_text(l).ok())
		.map(|m| m.width())
		.fold(0.0_f64, f64::max);
	ctx.set_fill_style_str("rgba(20, 20, 40, 0.9)");
	ctx.fill_rect(sx, sy, width + 12.0, lines.len() as f64 * 14.0 + 8.0);
	ctx.set_fill_style_str("white");
	for (i, line) in lines.iter().enumerate() {
		let _ = ctx.fill_text(line, sx + 6.0, sy + 16.0 + i as f64 * 14.0);
	}
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if has_highlight && state.is_highlighted(idx) {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		let (alpha, radius) = (1.0 - 0.7 * t, NODE_RADIUS * (1.0 - 0.15 * t));

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&node.data.user_data.color);
		ctx.fill();
		ctx.set_global_alpha(1.0);

		let label = &node.data.user_data.label;
		ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha * 0.8));
		ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
		let _ = ctx.fill_text(label, x + radius + 3.0, y + 3.0);
	});

	if !has_highlight {
		return;
	}

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if !state.is_highlighted(idx) {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		let is_hovered = state.is_hovered(idx);
		let is_neighbor =
			state.hover.neighbors.contains(&idx) || state.hover.prev_neighbors.contains(&idx);

		let (radius, glow_radius) = if is_hovered {
			(
				NODE_RADIUS * (1.0 + 0.35 * t),
				NODE_RADIUS * (1.8 + 1.2 * t),
			)
		} else if is_neighbor {
			(NODE_RADIUS * (1.0 + 0.2 * t), NODE_RADIUS * (1.4 + 0.6 * t))
		} else {
			(NODE_RADIUS, 0.0)
		};

		if glow_radius > 0.0 && t > 0.01 {
			let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius)
			else {
				return;
			};
			let alpha = if is_hovered { 0.35 * t } else { 0.2 * t };
			let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {})", alpha));
			let _ = gradient.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
			let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
			ctx.begin_path();
			let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
			ctx.fill();
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&node.data.user_data.color);
		ctx.fill();

		if is_hovered && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		ctx.set_fill_style_str("white");
		ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
		let _ = ctx.fill_text(&node.data.user_data.label, x + radius + 3.0, y + 3.0);
	});
}
