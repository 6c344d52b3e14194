use std::collections::{HashMap, HashSet};

use crate::json_graph::{JsonGraph, Position};

/// Smallest zoom factor.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest zoom factor.
pub const MAX_ZOOM: f64 = 4.0;
/// Screen-space margin kept around the graph by [`GraphViewState::fit_view`].
pub const FIT_PADDING: f64 = 40.0;

/// Screen = graph * k + (x, y).
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	/// Horizontal offset in pixels.
	pub x: f64,
	/// Vertical offset in pixels.
	pub y: f64,
	/// Zoom factor.
	pub k: f64,
}

/// Node being dragged and where the drag began.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Position,
}

/// Background drag in progress.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Hovered node, its neighbours and the fade progress.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<usize>,
	pub neighbors: HashSet<usize>,
	pub highlight_t: f64,
	pub prev_node: Option<usize>,
	pub prev_neighbors: HashSet<usize>,
	delay_t: f64,
}

/// Everything the canvas needs between frames.
pub struct GraphViewState {
	pub graph: JsonGraph,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
	/// Edges as node indices.
	pub edges: Vec<(usize, usize)>,
	/// Distance of each node from the root.
	pub depths: Vec<usize>,
}

impl GraphViewState {
	/// State for a canvas of the given size, framed on `graph`.
	pub fn new(graph: JsonGraph, width: f64, height: f64) -> Self {
		let mut state = Self {
			graph: JsonGraph::default(),
			transform: ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			flow_time: 0.0,
			edges: Vec::new(),
			depths: Vec::new(),
		};
		state.set_graph(graph);
		state
	}

	/// Swaps in a freshly converted graph and frames it.
	pub fn set_graph(&mut self, graph: JsonGraph) {
		let index: HashMap<&str, usize> = graph
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.as_str(), i))
			.collect();
		let edges: Vec<(usize, usize)> = graph
			.edges
			.iter()
			.filter_map(|e| Some((*index.get(e.source.as_str())?, *index.get(e.target.as_str())?)))
			.collect();

		// Edges arrive parent first, so one pass settles every depth.
		let mut depths = vec![0; graph.nodes.len()];
		for &(src, tgt) in &edges {
			depths[tgt] = depths[src] + 1;
		}

		self.edges = edges;
		self.depths = depths;
		self.graph = graph;
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.hover = HoverState::default();
		self.fit_view();
	}

	/// Converts a canvas point into graph coordinates.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node card under the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let size = self.graph.node_size;
		self.graph.nodes.iter().rposition(|node| {
			let Position { x, y } = node.position;
			gx >= x && gx <= x + size.width && gy >= y && gy <= y + size.height
		})
	}

	/// Moves the hover highlight, keeping the previous one to fade out.
	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Keep the old highlight around while it fades out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for &(src, tgt) in &self.edges {
				if src == idx {
					self.hover.neighbors.insert(tgt);
				} else if tgt == idx {
					self.hover.neighbors.insert(src);
				}
			}
		}
	}

	/// Hovered, a neighbour of the hovered node, or still fading out.
	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	/// The hovered node itself, current or fading.
	pub fn is_hovered(&self, idx: usize) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	/// True while any highlight is visible.
	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	/// Starts dragging the node under the pointer, or panning when there is none.
	pub fn pointer_down(&mut self, x: f64, y: f64) {
		if let Some(idx) = self.node_at_position(x, y) {
			self.drag = DragState {
				active: true,
				node_idx: Some(idx),
				start_x: x,
				start_y: y,
				node_start: self.graph.nodes[idx].position,
			};
		} else {
			self.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	/// Updates hover, the dragged node or the pan offset.
	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if !self.drag.active {
			let hovered = self.node_at_position(x, y);
			self.set_hover(hovered);
		}

		if self.drag.active {
			if let Some(node) = self.drag.node_idx.and_then(|idx| self.graph.nodes.get_mut(idx)) {
				let k = self.transform.k;
				node.position = Position::new(
					self.drag.node_start.x + (x - self.drag.start_x) / k,
					self.drag.node_start.y + (y - self.drag.start_y) / k,
				);
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
	}

	/// Ends any drag or pan.
	pub fn pointer_up(&mut self) {
		self.drag.active = false;
		self.drag.node_idx = None;
		self.pan.active = false;
	}

	/// Ends interaction and clears the hover.
	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.set_hover(None);
	}

	/// Zooms one wheel notch, keeping the point under the cursor fixed.
	pub fn zoom_at(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Centers the graph and shrinks it to fit the canvas. Never zooms past 1.
	pub fn fit_view(&mut self) {
		let Some((min, max)) = self.graph.bounds() else {
			self.transform = ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
			return;
		};
		let (gw, gh) = (max.x - min.x, max.y - min.y);
		let avail_w = (self.width - 2.0 * FIT_PADDING).max(1.0);
		let avail_h = (self.height - 2.0 * FIT_PADDING).max(1.0);
		let k = (avail_w / gw).min(avail_h / gh).clamp(MIN_ZOOM, 1.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - (min.x + gw / 2.0) * k,
			y: self.height / 2.0 - (min.y + gh / 2.0) * k,
			k,
		};
	}

	/// Advances edge flow and highlight easing by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	/// Records a new canvas size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::json_graph::json_to_graph;

	fn state() -> GraphViewState {
		let graph = json_to_graph(&json!({"a": {"b": {}}, "c": [1, 2], "d": {}}));
		GraphViewState::new(graph, 1200.0, 800.0)
	}

	fn center_on_screen(s: &GraphViewState, idx: usize) -> (f64, f64) {
		let p = s.graph.nodes[idx].position;
		let size = s.graph.node_size;
		(
			(p.x + size.width / 2.0) * s.transform.k + s.transform.x,
			(p.y + size.height / 2.0) * s.transform.k + s.transform.y,
		)
	}

	#[test]
	fn computes_depths_and_edge_indices() {
		let s = state();
		assert_eq!(s.edges, vec![(0, 1), (1, 2), (0, 3), (0, 4)]);
		assert_eq!(s.depths, vec![0, 1, 2, 1, 1]);
	}

	#[test]
	fn fit_view_keeps_graph_inside_canvas() {
		let s = state();
		let (min, max) = s.graph.bounds().unwrap();
		let k = s.transform.k;
		assert!(k <= 1.0 && k >= MIN_ZOOM);
		assert!(min.x * k + s.transform.x >= FIT_PADDING - 1e-6);
		assert!(max.x * k + s.transform.x <= s.width - FIT_PADDING + 1e-6);
		assert!(min.y * k + s.transform.y >= 0.0);
		assert!(max.y * k + s.transform.y <= s.height);
	}

	#[test]
	fn empty_graph_fits_to_center() {
		let s = GraphViewState::new(JsonGraph::default(), 400.0, 300.0);
		assert_eq!((s.transform.x, s.transform.y, s.transform.k), (200.0, 150.0, 1.0));
		assert_eq!(s.node_at_position(200.0, 150.0), None);
	}

	#[test]
	fn hit_test_finds_node_cards() {
		let s = state();
		for idx in 0..s.graph.nodes.len() {
			let (x, y) = center_on_screen(&s, idx);
			assert_eq!(s.node_at_position(x, y), Some(idx));
		}
		assert_eq!(s.node_at_position(1.0, 1.0), None);
	}

	#[test]
	fn hover_collects_neighbors_and_fades_out() {
		let mut s = state();
		s.set_hover(Some(1));
		assert_eq!(s.hover.neighbors, HashSet::from([0, 2]));
		assert!(s.is_highlighted(0) && s.is_highlighted(2));
		assert!(!s.is_highlighted(3));

		for _ in 0..60 {
			s.tick(0.016);
		}
		assert!(s.hover.highlight_t > 0.5);

		s.set_hover(None);
		assert!(s.is_hovered(1));
		for _ in 0..600 {
			s.tick(0.016);
		}
		assert_eq!(s.hover.highlight_t, 0.0);
		assert!(!s.has_active_highlight());
	}

	#[test]
	fn dragging_moves_only_the_grabbed_node() {
		let mut s = state();
		let before: Vec<Position> = s.graph.nodes.iter().map(|n| n.position).collect();
		let (x, y) = center_on_screen(&s, 3);
		s.pointer_down(x, y);
		s.pointer_move(x + 20.0, y + 10.0);
		s.pointer_up();

		let k = s.transform.k;
		let moved = s.graph.nodes[3].position;
		assert!((moved.x - (before[3].x + 20.0 / k)).abs() < 1e-9);
		assert!((moved.y - (before[3].y + 10.0 / k)).abs() < 1e-9);
		assert_eq!(s.graph.nodes[0].position, before[0]);
		assert!(!s.drag.active);
	}

	#[test]
	fn background_drag_pans() {
		let mut s = state();
		let (tx, ty) = (s.transform.x, s.transform.y);
		s.pointer_down(1.0, 1.0);
		s.pointer_move(31.0, -9.0);
		s.pointer_leave();
		assert_eq!((s.transform.x, s.transform.y), (tx + 30.0, ty - 10.0));
		assert!(!s.pan.active);
	}

	#[test]
	fn zoom_is_anchored_and_clamped() {
		let mut s = state();
		let anchor = s.screen_to_graph(300.0, 200.0);
		s.zoom_at(300.0, 200.0, -1.0);
		let after = s.screen_to_graph(300.0, 200.0);
		assert!((anchor.0 - after.0).abs() < 1e-9 && (anchor.1 - after.1).abs() < 1e-9);

		for _ in 0..200 {
			s.zoom_at(0.0, 0.0, 1.0);
		}
		assert_eq!(s.transform.k, MIN_ZOOM);
	}
}
