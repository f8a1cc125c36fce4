//! What the render adapter needs each frame.

use super::model::{AttrValue, Graph, Node};
use super::simulation::SimulationState;

/// A node ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
	/// Node index in the graph.
	pub index: usize,
	/// Graph-space x.
	pub x: f64,
	/// Graph-space y.
	pub y: f64,
	/// Fill color.
	pub color: String,
	/// Short label.
	pub label: String,
	/// Whether the node is held by the user.
	pub pinned: bool,
}

/// An edge ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneEdge {
	/// Source node index.
	pub source: usize,
	/// Target node index.
	pub target: usize,
	/// Source position.
	pub from: (f64, f64),
	/// Target position.
	pub to: (f64, f64),
	/// Stroke color.
	pub color: String,
	/// Draw an arrowhead at the target.
	pub directed: bool,
}

/// One frame's worth of drawable state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	/// Nodes in graph order.
	pub nodes: Vec<SceneNode>,
	/// Edges in graph order.
	pub edges: Vec<SceneEdge>,
}

impl Scene {
	/// Joins the static graph data with the current simulated positions.
	pub fn capture(graph: &Graph, sim: &SimulationState) -> Self {
		let nodes = graph
			.nodes
			.iter()
			.zip(sim.bodies())
			.enumerate()
			.map(|(index, (node, body))| SceneNode {
				index,
				x: body.x,
				y: body.y,
				color: node.color.clone(),
				label: node.short_label.clone(),
				pinned: body.is_pinned(),
			})
			.collect();
		let bodies = sim.bodies();
		let edges = graph
			.edges
			.iter()
			.map(|e| SceneEdge {
				source: e.source_idx,
				target: e.target_idx,
				from: (bodies[e.source_idx].x, bodies[e.source_idx].y),
				to: (bodies[e.target_idx].x, bodies[e.target_idx].y),
				color: e.color.clone(),
				directed: e.directed,
			})
			.collect();
		Self { nodes, edges }
	}
}

/// Glyph shown for a `true` attribute.
pub const PRESENT: &str = "✓";
/// Glyph shown for a `false` attribute.
pub const ABSENT: &str = "✗";

/// Content of the selected-node detail panel.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDetail {
	/// Raw type tag.
	pub type_tag: String,
	/// Node id.
	pub id: String,
	/// Long display name.
	pub display_name: String,
	/// Payload category, if any.
	pub category: Option<String>,
	/// Attribute rows as rendered text.
	pub rows: Vec<(String, String)>,
}

impl NodeDetail {
	/// Renders a node's attributes for display.
	pub fn of(node: &Node) -> Self {
		let rows = node
			.attributes
			.iter()
			.map(|(key, value)| {
				let text = match value {
					AttrValue::Bool(true) => PRESENT.to_string(),
					AttrValue::Bool(false) => ABSENT.to_string(),
					other => other.to_string(),
				};
				(key.clone(), text)
			})
			.collect();
		Self {
			type_tag: node.type_tag.clone(),
			id: node.id.clone(),
			display_name: node.display_name.clone(),
			category: node.category.clone(),
			rows,
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::graph::config::GraphConfig;
	use crate::graph::payload::RawPayload;

	#[test]
	fn detail_renders_booleans_as_glyphs() {
		let value = json!({"node": [{"v_id": "L1", "v_type": "Lot",
			"attributes": {"is_eudr_compliant": true, "certified": false, "price_per_kg": 30}}]});
		let graph = Graph::from_payload(&RawPayload::detect(&value), &GraphConfig::default());
		let detail = NodeDetail::of(&graph.nodes[0]);
		assert_eq!(detail.type_tag, "Lot");
		assert_eq!(
			detail.rows,
			[
				("is_eudr_compliant".to_string(), PRESENT.to_string()),
				("certified".to_string(), ABSENT.to_string()),
				("price_per_kg".to_string(), "30".to_string()),
			]
		);
	}

	#[test]
	fn scene_follows_positions() {
		let value = json!({"node": [
			{"v_id": "A", "v_type": "Farmer"},
			{"v_id": "B", "v_type": "Warehouse"}
		], "edges": [{"from_id": "A", "to_id": "B", "e_type": "Has", "directed": true}]});
		let config = GraphConfig::default();
		let graph = Graph::from_payload(&RawPayload::detect(&value), &config);
		let sim = SimulationState::new(&graph, &config, 800.0, 600.0);
		let scene = Scene::capture(&graph, &sim);
		assert_eq!(scene.nodes.len(), 2);
		assert!(!scene.nodes[1].label.is_empty());
		assert_eq!(scene.edges[0].from, (scene.nodes[0].x, scene.nodes[0].y));
		assert_eq!(scene.edges[0].to, (scene.nodes[1].x, scene.nodes[1].y));
		assert!(scene.edges[0].directed);
	}
}
