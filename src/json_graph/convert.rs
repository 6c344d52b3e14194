use std::collections::HashMap;

use log::debug;
use serde_json::Value;

use super::layout::{LayeredLayout, LayoutEngine};
use super::preview::{is_container, node_content};
use super::types::{GraphEdge, GraphNode, JsonGraph, Position};

/// Label of the node created for the top-level value.
pub const ROOT_LABEL: &str = "Root";

/// Hands out node ids for one conversion.
#[derive(Debug, Default)]
struct IdAllocator {
	next: u64,
}

impl IdAllocator {
	fn allocate(&mut self) -> String {
		let id = self.next;
		self.next += 1;
		id.to_string()
	}
}

/// A container waiting to be turned into a node.
struct Pending<'a> {
	value: &'a Value,
	parent: Option<String>,
	label: String,
}

/// Converts `value` with the default left-to-right layered layout.
pub fn json_to_graph(value: &Value) -> JsonGraph {
	convert(value, &LayeredLayout::default())
}

/// Converts `value` into a tree of nodes (one per container plus the root)
/// and positions them with `engine`.
///
/// Nodes come out in depth-first pre-order. Scalar children are folded into
/// their parent's content instead of getting nodes of their own.
pub fn convert<L: LayoutEngine + ?Sized>(value: &Value, engine: &L) -> JsonGraph {
	let mut ids = IdAllocator::default();
	let mut nodes = Vec::new();
	let mut edges = Vec::new();

	let mut stack = vec![Pending {
		value,
		parent: None,
		label: ROOT_LABEL.to_string(),
	}];
	while let Some(Pending { value, parent, label }) = stack.pop() {
		let id = ids.allocate();
		nodes.push(GraphNode {
			id: id.clone(),
			label,
			content: node_content(value),
			position: Position::default(),
		});
		if let Some(source) = parent {
			edges.push(GraphEdge {
				id: format!("e{}-{}", source, id),
				source,
				target: id.clone(),
			});
		}

		// Reversed so the first child is popped, and numbered, first.
		let start = stack.len();
		match value {
			Value::Object(map) => stack.extend(
				map.iter()
					.filter(|(_, child)| is_container(child))
					.map(|(key, child)| Pending {
						value: child,
						parent: Some(id.clone()),
						label: key.clone(),
					}),
			),
			Value::Array(items) => stack.extend(
				items
					.iter()
					.enumerate()
					.filter(|(_, child)| is_container(child))
					.map(|(i, child)| Pending {
						value: child,
						parent: Some(id.clone()),
						label: i.to_string(),
					}),
			),
			_ => {}
		}
		stack[start..].reverse();
	}

	let mut graph = JsonGraph {
		nodes,
		edges,
		node_size: engine.node_size(),
		rank_dir: engine.rank_dir(),
	};
	apply_layout(&mut graph, engine);
	debug!(
		"converted json into {} nodes and {} edges",
		graph.nodes.len(),
		graph.edges.len()
	);
	graph
}

/// Overwrites node positions with the engine's centers shifted to the
/// top-left corner.
fn apply_layout<L: LayoutEngine + ?Sized>(graph: &mut JsonGraph, engine: &L) {
	let index: HashMap<&str, usize> = graph
		.nodes
		.iter()
		.enumerate()
		.map(|(i, n)| (n.id.as_str(), i))
		.collect();
	let pairs: Vec<(usize, usize)> = graph
		.edges
		.iter()
		.filter_map(|e| Some((*index.get(e.source.as_str())?, *index.get(e.target.as_str())?)))
		.collect();

	let centers = engine.layout(graph.nodes.len(), &pairs);
	let size = graph.node_size;
	for (node, center) in graph.nodes.iter_mut().zip(centers) {
		node.position = Position::new(center.x - size.width / 2.0, center.y - size.height / 2.0);
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use pretty_assertions::assert_eq;
	use serde_json::{Map, json};

	use super::*;
	use crate::json_graph::layout::{NODE_HEIGHT, NODE_WIDTH, RankDir};
	use crate::json_graph::types::Size;

	fn container_count(v: &Value) -> usize {
		let nested: usize = match v {
			Value::Object(m) => m.values().filter(|c| is_container(c)).map(container_count).sum(),
			Value::Array(a) => a.iter().filter(|c| is_container(c)).map(container_count).sum(),
			_ => 0,
		};
		1 + nested
	}

	fn assert_tree(graph: &JsonGraph) {
		let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids.len(), graph.nodes.len(), "node ids must be unique");
		assert_eq!(graph.edges.len(), graph.nodes.len() - 1);

		let mut targets = HashSet::new();
		for edge in &graph.edges {
			assert!(ids.contains(edge.source.as_str()));
			assert!(ids.contains(edge.target.as_str()));
			assert!(targets.insert(edge.target.as_str()), "{} has two parents", edge.target);
		}
		let root = graph.root().expect("root");
		assert!(!targets.contains(root.id.as_str()));
	}

	fn shape(graph: &JsonGraph) -> Vec<(String, String, Vec<String>)> {
		graph
			.nodes
			.iter()
			.map(|n| {
				(
					n.label.clone(),
					n.content.clone(),
					graph.children(&n.id).map(|c| c.label.clone()).collect(),
				)
			})
			.collect()
	}

	fn sample() -> Value {
		json!({
			"name": "tools",
			"version": 3,
			"owner": {"login": "ada", "site": {"url": "https://example.com"}},
			"tags": ["pdf", "image"],
			"items": [
				{"id": 1, "enabled": true},
				{"id": 2, "meta": {"size": null}},
				[]
			]
		})
	}

	#[test]
	fn nested_object_becomes_child_node() {
		let graph = json_to_graph(&json!({"a": 1, "b": {"c": 2}}));
		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(graph.edges.len(), 1);

		let root = &graph.nodes[0];
		assert_eq!(root.label, ROOT_LABEL);
		assert!(root.content.contains("a: 1"));
		assert!(!root.content.contains("b:"));

		let b = &graph.nodes[1];
		assert_eq!(b.label, "b");
		assert!(b.content.contains("c: 2"));

		let edge = &graph.edges[0];
		assert_eq!(edge.source, root.id);
		assert_eq!(edge.target, b.id);
		assert_eq!(edge.id, format!("e{}-{}", root.id, b.id));
	}

	#[test]
	fn empty_and_scalar_roots_yield_single_node() {
		for (input, content) in [
			(json!([]), "Array [0]"),
			(json!({}), "Object {}"),
			(json!(42), "42"),
			(json!("plain"), "plain"),
			(json!(null), "null"),
		] {
			let graph = json_to_graph(&input);
			assert_eq!(graph.nodes.len(), 1);
			assert_eq!(graph.nodes[0].content, content);
			assert!(graph.edges.is_empty());
		}
	}

	#[test]
	fn one_node_per_container() {
		for input in [sample(), json!([[[]], {"a": [1, {"b": {}}]}]), json!({"x": "y"})] {
			let graph = json_to_graph(&input);
			assert_eq!(graph.nodes.len(), container_count(&input));
			assert_tree(&graph);
		}
	}

	#[test]
	fn nodes_follow_depth_first_order() {
		let graph = json_to_graph(&sample());
		let labels: Vec<&str> = graph.nodes.iter().map(|n| n.label.as_str()).collect();
		assert_eq!(labels, ["Root", "owner", "site", "tags", "items", "0", "1", "meta", "2"]);
		let ids: Vec<String> = (0..graph.nodes.len()).map(|i| i.to_string()).collect();
		assert_eq!(graph.nodes.iter().map(|n| n.id.clone()).collect::<Vec<_>>(), ids);
		assert_eq!(graph.node("3").map(|n| n.content.as_str()), Some("0: \"pdf\"\n1: \"image\""));
		assert_eq!(graph.node("8").map(|n| n.content.as_str()), Some("Array [0]"));
	}

	#[test]
	fn repeated_conversion_is_independent() {
		let first = json_to_graph(&sample());
		let second = json_to_graph(&sample());
		assert_eq!(shape(&first), shape(&second));
		assert_tree(&second);

		let changed = json_to_graph(&json!({"only": {"one": {}}}));
		assert_eq!(changed.nodes.len(), 3);
		assert_eq!(changed.edges.len(), 2);
		assert_eq!(changed.nodes[0].id, "0");
	}

	#[test]
	fn graph_records_the_engine_direction() {
		assert_eq!(json_to_graph(&json!([])).rank_dir, RankDir::LeftRight);

		let engine = LayeredLayout::new(crate::json_graph::LayoutConfig {
			rank_dir: RankDir::TopBottom,
			..Default::default()
		});
		let graph = convert(&json!({"a": {}}), &engine);
		assert_eq!(graph.rank_dir, RankDir::TopBottom);
		assert!(graph.nodes[1].position.y > graph.nodes[0].position.y + NODE_HEIGHT);
		assert_eq!(graph.nodes[1].position.x, graph.nodes[0].position.x);
	}

	#[test]
	fn positions_are_top_left_corners() {
		let graph = json_to_graph(&json!({"a": {"b": {}}}));
		assert_eq!(graph.node_size, Size { width: NODE_WIDTH, height: NODE_HEIGHT });
		assert_eq!(graph.nodes[0].position, Position::new(0.0, 0.0));
		assert!(graph.nodes[1].position.x > graph.nodes[0].position.x + NODE_WIDTH);
		assert_eq!(graph.nodes[1].position.y, graph.nodes[0].position.y);
	}

	#[test]
	fn custom_engine_receives_edges() {
		struct Diagonal;
		impl LayoutEngine for Diagonal {
			fn node_size(&self) -> Size {
				Size { width: 10.0, height: 4.0 }
			}
			fn layout(&self, node_count: usize, edges: &[(usize, usize)]) -> Vec<Position> {
				assert_eq!(edges, &[(0, 1), (1, 2)]);
				(0..node_count).map(|i| Position::new(i as f64 * 100.0, i as f64 * 100.0)).collect()
			}
		}

		let graph = convert(&json!([[[]]]), &Diagonal);
		let corners: Vec<Position> = graph.nodes.iter().map(|n| n.position).collect();
		assert_eq!(
			corners,
			vec![Position::new(-5.0, -2.0), Position::new(95.0, 98.0), Position::new(195.0, 198.0)]
		);
	}

	#[test]
	fn deep_nesting_does_not_recurse() {
		let depth = 60_000;
		let mut value = Value::Object(Map::new());
		for _ in 0..depth {
			let mut map = Map::new();
			map.insert("next".to_string(), value);
			value = Value::Object(map);
		}

		let graph = json_to_graph(&value);
		assert_eq!(graph.nodes.len(), depth + 1);
		assert_eq!(graph.edges.len(), depth);
		assert_eq!(graph.nodes[depth].content, "Object {}");
		assert!(graph.nodes[depth].position.x > graph.nodes[depth - 1].position.x);

		// serde_json drops recursively; unwind it by hand so the test thread keeps its stack.
		let mut current = value;
		while let Value::Object(mut map) = current {
			current = map.remove("next").unwrap_or(Value::Null);
		}
	}
}
