use serde::Serialize;

/// A point in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Position {
	/// Horizontal coordinate, growing to the right.
	pub x: f64,
	/// Vertical coordinate, growing downwards.
	pub y: f64,
}

impl Position {
	/// Point at `(x, y)`.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Width and height of a node card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Size {
	/// Card width.
	pub width: f64,
	/// Card height.
	pub height: f64,
}

/// Axis along which ranks advance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum RankDir {
	/// Parents on the left, children to their right.
	#[default]
	LeftRight,
	/// Parents on top, children below.
	TopBottom,
}

/// One node per JSON object, array or top-level scalar.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphNode {
	/// Unique within one conversion.
	pub id: String,
	/// Key or index the value sat under, `"Root"` for the top level.
	pub label: String,
	/// Preview text shown inside the card.
	pub content: String,
	/// Top-left corner.
	pub position: Position,
}

/// Parent to child link between two container nodes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphEdge {
	/// `e{source}-{target}`.
	pub id: String,
	/// Parent node id.
	pub source: String,
	/// Child node id.
	pub target: String,
}

/// Laid out tree produced from one JSON value.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct JsonGraph {
	/// Nodes in depth-first pre-order, root first.
	pub nodes: Vec<GraphNode>,
	/// Edges in the order their targets were created.
	pub edges: Vec<GraphEdge>,
	/// Size every card was laid out with.
	pub node_size: Size,
	/// Direction the layout placed children in.
	pub rank_dir: RankDir,
}

impl JsonGraph {
	/// True when there is nothing to draw.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Node created for the top-level value.
	pub fn root(&self) -> Option<&GraphNode> {
		self.nodes.first()
	}

	/// Node with the given id.
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Direct children of `id`, in edge order.
	pub fn children<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphNode> + 'a {
		self.edges
			.iter()
			.filter(move |e| e.source == id)
			.filter_map(move |e| self.node(&e.target))
	}

	/// Top-left and bottom-right corners enclosing every node card.
	pub fn bounds(&self) -> Option<(Position, Position)> {
		let first = self.nodes.first()?;
		let mut min = first.position;
		let mut max = first.position;
		for node in &self.nodes[1..] {
			min.x = min.x.min(node.position.x);
			min.y = min.y.min(node.position.y);
			max.x = max.x.max(node.position.x);
			max.y = max.y.max(node.position.y);
		}
		max.x += self.node_size.width;
		max.y += self.node_size.height;
		Some((min, max))
	}
}
