use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::GraphViewState;
use crate::json_graph::{Position, RankDir, Size};

const COLORS: &[&str] = &[
	"#ff7f0e", "#1f77b4", "#2ca02c", "#9467bd", "#17becf", "#e377c2", "#bcbd22", "#8c564b",
];

const CORNER_RADIUS: f64 = 8.0;
const HEADER_HEIGHT: f64 = 26.0;
const LINE_HEIGHT: f64 = 15.0;
const TEXT_PAD: f64 = 10.0;
/// Approximate advance of one 12px monospace glyph.
const CHAR_WIDTH: f64 = 7.2;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Shortens `line` to `max_chars`, marking the cut with an ellipsis.
fn fit_line(line: &str, max_chars: usize) -> String {
	if line.chars().count() <= max_chars {
		return line.to_string();
	}
	let mut out: String = line.chars().take(max_chars.saturating_sub(1)).collect();
	out.push('…');
	out
}

/// Where an edge leaves its parent card and enters its child card, plus the
/// unit vector ranks advance along.
fn edge_anchors(dir: RankDir, from: Position, to: Position, size: Size) -> (Position, Position, (f64, f64)) {
	match dir {
		RankDir::LeftRight => (
			Position::new(from.x + size.width, from.y + size.height / 2.0),
			Position::new(to.x, to.y + size.height / 2.0),
			(1.0, 0.0),
		),
		RankDir::TopBottom => (
			Position::new(from.x + size.width / 2.0, from.y + size.height),
			Position::new(to.x + size.width / 2.0, to.y),
			(0.0, 1.0),
		),
	}
}

/// Draws one frame of the graph.
pub fn render(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let size = state.graph.node_size;
	let (line_width, dash, gap, arrow_size) = (1.5 / k.max(0.5), 8.0, 4.0, 8.0);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);
	let has_highlight = state.has_active_highlight();

	for &(src, tgt) in &state.edges {
		let (start, end, (ux, uy)) = edge_anchors(
			state.graph.rank_dir,
			state.graph.nodes[src].position,
			state.graph.nodes[tgt].position,
			size,
		);
		let reach = ((end.x - start.x) * ux + (end.y - start.y) * uy) / 2.0;
		let (base_x, base_y) = (end.x - ux * arrow_size, end.y - uy * arrow_size);

		let is_highlighted = state.is_highlighted(src) && state.is_highlighted(tgt);
		let (edge_alpha, width) = if !has_highlight {
			(0.6, line_width)
		} else if is_highlighted {
			(0.6 + 0.3 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};

		ctx.set_stroke_style_str(&format!("rgba(100, 180, 255, {})", edge_alpha));
		ctx.set_line_width(width);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(dash_offset);

		ctx.begin_path();
		ctx.move_to(start.x, start.y);
		ctx.bezier_curve_to(
			start.x + ux * reach,
			start.y + uy * reach,
			end.x - ux * reach,
			end.y - uy * reach,
			base_x,
			base_y,
		);
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_fill_style_str(&format!("rgba(100, 180, 255, {})", (edge_alpha + 0.2).min(1.0)));
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(end.x, end.y);
		ctx.line_to(base_x + px, base_y + py);
		ctx.line_to(base_x - px, base_y - py);
		ctx.close_path();
		ctx.fill();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

fn draw_nodes(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);
	let size = state.graph.node_size;
	let max_chars = ((size.width - 2.0 * TEXT_PAD) / CHAR_WIDTH).max(1.0) as usize;
	let max_lines = ((size.height - HEADER_HEIGHT - 6.0) / LINE_HEIGHT).max(0.0) as usize;

	for (idx, node) in state.graph.nodes.iter().enumerate() {
		let (x, y) = (node.position.x, node.position.y);
		let color = COLORS[state.depths.get(idx).copied().unwrap_or(0) % COLORS.len()];
		let dimmed = has_highlight && !state.is_highlighted(idx);
		ctx.set_global_alpha(if dimmed { 1.0 - 0.6 * t } else { 1.0 });

		if state.is_hovered(idx) && t > 0.01 {
			ctx.set_shadow_color(&format!("rgba(200, 220, 255, {})", 0.5 * t));
			ctx.set_shadow_blur(18.0 * t);
		}
		rounded_rect(ctx, x, y, size.width, size.height, CORNER_RADIUS);
		ctx.set_fill_style_str("#24243e");
		ctx.fill();
		ctx.set_shadow_blur(0.0);
		ctx.set_shadow_color("transparent");

		// Header band in the depth color
		ctx.save();
		rounded_rect(ctx, x, y, size.width, size.height, CORNER_RADIUS);
		ctx.clip();
		ctx.set_fill_style_str(color);
		ctx.fill_rect(x, y, size.width, HEADER_HEIGHT);
		ctx.restore();

		rounded_rect(ctx, x, y, size.width, size.height, CORNER_RADIUS);
		ctx.set_stroke_style_str(if state.is_hovered(idx) { "white" } else { color });
		ctx.set_line_width(if state.is_hovered(idx) { 2.0 / k.max(0.5) } else { 1.0 });
		ctx.stroke();

		ctx.set_fill_style_str("white");
		ctx.set_font("bold 13px sans-serif");
		let _ = ctx.fill_text(&fit_line(&node.label, max_chars), x + TEXT_PAD, y + 17.0);

		ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
		ctx.set_font("12px monospace");
		for (i, line) in node.content.lines().take(max_lines).enumerate() {
			let baseline = y + HEADER_HEIGHT + 16.0 + i as f64 * LINE_HEIGHT;
			let _ = ctx.fill_text(&fit_line(line, max_chars), x + TEXT_PAD, baseline);
		}
		ctx.set_global_alpha(1.0);
	}

	// Root marker
	if let Some(root) = state.graph.nodes.first() {
		let (_, entry, _) = edge_anchors(state.graph.rank_dir, root.position, root.position, size);
		ctx.begin_path();
		let _ = ctx.arc(entry.x, entry.y, 4.0, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(COLORS[0]);
		ctx.fill();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fit_line_truncates_on_chars() {
		assert_eq!(fit_line("short", 10), "short");
		assert_eq!(fit_line("exactly10!", 10), "exactly10!");
		assert_eq!(fit_line("this is too long", 8), "this is…");
		assert_eq!(fit_line("ééééé", 3), "éé…");
	}

	#[test]
	fn edges_attach_to_the_sides_facing_the_rank_direction() {
		let size = Size { width: 100.0, height: 40.0 };
		let (from, to) = (Position::new(0.0, 0.0), Position::new(200.0, 80.0));

		let (start, end, dir) = edge_anchors(RankDir::LeftRight, from, to, size);
		assert_eq!((start, end, dir), (Position::new(100.0, 20.0), Position::new(200.0, 100.0), (1.0, 0.0)));

		let (start, end, dir) = edge_anchors(RankDir::TopBottom, from, to, size);
		assert_eq!((start, end, dir), (Position::new(50.0, 40.0), Position::new(250.0, 80.0), (0.0, 1.0)));
	}

	#[test]
	fn easing_hits_endpoints() {
		assert_eq!(ease_out_cubic(0.0), 0.0);
		assert_eq!(ease_out_cubic(1.0), 1.0);
		assert!(ease_out_cubic(0.5) > 0.5);
	}
}
