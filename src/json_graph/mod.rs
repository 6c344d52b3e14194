//! JSON document to laid-out tree graph.

mod convert;
pub mod layout;
pub mod preview;
mod types;

pub use convert::{ROOT_LABEL, convert, json_to_graph};
pub use layout::{LayeredLayout, LayoutConfig, LayoutEngine, RankDir};
pub use types::{GraphEdge, GraphNode, JsonGraph, Position, Size};
