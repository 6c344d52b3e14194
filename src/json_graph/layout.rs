//! Layered layout for the converted tree.
//!
//! Ranks follow the longest path from a source node, and the cross axis is a
//! tidy tree placement over each node's first parent: leaves take consecutive
//! slots and parents sit in the middle of their children.

use std::collections::HashSet;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

pub use super::types::RankDir;
use super::types::{Position, Size};

/// Default card width.
pub const NODE_WIDTH: f64 = 220.0;
/// Default card height.
pub const NODE_HEIGHT: f64 = 110.0;

/// Placement backend used by the converter.
pub trait LayoutEngine {
	/// Size every node is laid out with.
	fn node_size(&self) -> Size;

	/// Direction children are placed in relative to their parent.
	fn rank_dir(&self) -> RankDir {
		RankDir::LeftRight
	}

	/// Center point of each node, indexed like the nodes passed in. `edges`
	/// are `(source, target)` index pairs.
	fn layout(&self, node_count: usize, edges: &[(usize, usize)]) -> Vec<Position>;
}

/// Knobs of [`LayeredLayout`].
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	/// Axis the ranks advance along.
	pub rank_dir: RankDir,
	/// Card width.
	pub node_width: f64,
	/// Card height.
	pub node_height: f64,
	/// Gap between consecutive ranks.
	pub rank_sep: f64,
	/// Gap between neighbouring nodes of the same rank.
	pub node_sep: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			rank_dir: RankDir::LeftRight,
			node_width: NODE_WIDTH,
			node_height: NODE_HEIGHT,
			rank_sep: 60.0,
			node_sep: 30.0,
		}
	}
}

/// Rank-per-depth layout with parents centered on their children.
#[derive(Clone, Debug, Default)]
pub struct LayeredLayout {
	/// Sizes, gaps and direction.
	pub config: LayoutConfig,
}

impl LayeredLayout {
	/// Layout using `config`.
	pub fn new(config: LayoutConfig) -> Self {
		Self { config }
	}

	/// Extent of a node along the rank axis and across it.
	fn extents(&self) -> (f64, f64) {
		match self.config.rank_dir {
			RankDir::LeftRight => (self.config.node_width, self.config.node_height),
			RankDir::TopBottom => (self.config.node_height, self.config.node_width),
		}
	}
}

impl LayoutEngine for LayeredLayout {
	fn node_size(&self) -> Size {
		Size {
			width: self.config.node_width,
			height: self.config.node_height,
		}
	}

	fn rank_dir(&self) -> RankDir {
		self.config.rank_dir
	}

	fn layout(&self, node_count: usize, edges: &[(usize, usize)]) -> Vec<Position> {
		if node_count == 0 {
			return Vec::new();
		}
		let edges = acyclic_edges(node_count, edges);
		let ranks = assign_ranks(node_count, &edges);
		let (rank_extent, cross_extent) = self.extents();
		let cross = place_cross_axis(node_count, &edges, cross_extent + self.config.node_sep);

		(0..node_count)
			.map(|i| {
				let along = ranks[i] as f64 * (rank_extent + self.config.rank_sep) + rank_extent / 2.0;
				let across = cross[i] + cross_extent / 2.0;
				match self.config.rank_dir {
					RankDir::LeftRight => Position::new(along, across),
					RankDir::TopBottom => Position::new(across, along),
				}
			})
			.collect()
	}
}

fn build_digraph(node_count: usize, edges: &[(usize, usize)]) -> DiGraph<(), ()> {
	let mut graph = DiGraph::<(), ()>::with_capacity(node_count, edges.len());
	for _ in 0..node_count {
		graph.add_node(());
	}
	for &(s, t) in edges {
		graph.add_edge(NodeIndex::new(s), NodeIndex::new(t), ());
	}
	graph
}

/// Drops out-of-range edges, self loops and DFS back edges, keeping the
/// input order of what remains.
fn acyclic_edges(node_count: usize, edges: &[(usize, usize)]) -> Vec<(usize, usize)> {
	let valid: Vec<(usize, usize)> = edges
		.iter()
		.copied()
		.filter(|&(s, t)| s < node_count && t < node_count && s != t)
		.collect();

	// Trees from the converter always sort.
	if toposort(&build_digraph(node_count, &valid), None).is_ok() {
		return valid;
	}

	let back = back_edges(node_count, &valid);
	log::debug!("layout ignoring {} back edges", back.len());
	valid
		.into_iter()
		.enumerate()
		.filter(|(i, _)| !back.contains(i))
		.map(|(_, e)| e)
		.collect()
}

/// Positions in `edges` of the edges that close a cycle, found with an
/// explicit-stack DFS started from each unvisited node in index order.
fn back_edges(node_count: usize, edges: &[(usize, usize)]) -> HashSet<usize> {
	#[derive(Clone, Copy, PartialEq)]
	enum Mark {
		New,
		OnStack,
		Done,
	}

	let mut out_edges: Vec<Vec<usize>> = vec![Vec::new(); node_count];
	for (i, &(s, _)) in edges.iter().enumerate() {
		out_edges[s].push(i);
	}

	let mut marks = vec![Mark::New; node_count];
	let mut back = HashSet::new();
	// (node, next outgoing edge to look at)
	let mut stack: Vec<(usize, usize)> = Vec::new();
	for start in 0..node_count {
		if marks[start] != Mark::New {
			continue;
		}
		marks[start] = Mark::OnStack;
		stack.push((start, 0));
		while let Some((node, next)) = stack.last_mut() {
			let node = *node;
			let Some(&edge) = out_edges[node].get(*next) else {
				marks[node] = Mark::Done;
				stack.pop();
				continue;
			};
			*next += 1;
			let target = edges[edge].1;
			match marks[target] {
				Mark::New => {
					marks[target] = Mark::OnStack;
					stack.push((target, 0));
				}
				Mark::OnStack => {
					back.insert(edge);
				}
				Mark::Done => {}
			}
		}
	}
	back
}

/// Longest-path rank of every node; sources sit on rank 0.
fn assign_ranks(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
	let graph = build_digraph(node_count, edges);
	let order = toposort(&graph, None).unwrap_or_else(|_| graph.node_indices().collect());

	let mut ranks = vec![0usize; node_count];
	for node in order {
		let next = ranks[node.index()] + 1;
		for succ in graph.neighbors(node) {
			if ranks[succ.index()] < next {
				ranks[succ.index()] = next;
			}
		}
	}
	ranks
}

/// Offset of every node along the cross axis, `step` apart per leaf.
fn place_cross_axis(node_count: usize, edges: &[(usize, usize)], step: f64) -> Vec<f64> {
	let mut parent: Vec<Option<usize>> = vec![None; node_count];
	let mut children: Vec<Vec<usize>> = vec![Vec::new(); node_count];
	for &(s, t) in edges {
		if parent[t].is_none() {
			parent[t] = Some(s);
			children[s].push(t);
		}
	}

	let mut cross = vec![0.0; node_count];
	let mut cursor = 0.0;
	let mut stack: Vec<(usize, bool)> = Vec::new();
	for root in (0..node_count).filter(|&i| parent[i].is_none()) {
		stack.push((root, false));
		while let Some((node, expanded)) = stack.pop() {
			let kids = &children[node];
			match (kids.first(), kids.last()) {
				(Some(&first), Some(&last)) if expanded => {
					cross[node] = (cross[first] + cross[last]) / 2.0;
				}
				(Some(_), Some(_)) => {
					stack.push((node, true));
					stack.extend(kids.iter().rev().map(|&c| (c, false)));
				}
				_ => {
					cross[node] = cursor;
					cursor += step;
				}
			}
		}
	}
	cross
}
