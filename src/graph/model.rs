use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::GraphConfig;
use super::normalize::normalize;
use super::payload::RawPayload;
use super::validate::validate;

/// Supply-chain entity kinds, listed in left-to-right process order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
	/// Individual farmer.
	Farmer,
	/// Cooperative or group of farmers.
	#[serde(rename = "Farmer_Group")]
	FarmerGroup,
	/// Local buying agent.
	#[serde(rename = "Local_Buying_Agent")]
	LocalBuyingAgent,
	/// Purchased lot.
	Lot,
	/// Purchase order.
	#[serde(rename = "Purchase_Order")]
	PurchaseOrder,
	/// Processing batch.
	#[serde(rename = "PMB")]
	Pmb,
	/// Process order.
	#[serde(rename = "Process_Order")]
	ProcessOrder,
	/// Transfer order.
	#[serde(rename = "Transfer_Order")]
	TransferOrder,
	/// Any tag not in the vocabulary above.
	Unknown,
}

impl NodeType {
	/// Known types in process order; `Unknown` is deliberately absent.
	pub const ORDERED: [NodeType; 8] = [
		NodeType::Farmer,
		NodeType::FarmerGroup,
		NodeType::LocalBuyingAgent,
		NodeType::Lot,
		NodeType::PurchaseOrder,
		NodeType::Pmb,
		NodeType::ProcessOrder,
		NodeType::TransferOrder,
	];

	/// Resolves a raw `v_type` tag.
	pub fn from_tag(tag: &str) -> Self {
		match tag {
			"Farmer" => NodeType::Farmer,
			"Farmer_Group" => NodeType::FarmerGroup,
			"Local_Buying_Agent" => NodeType::LocalBuyingAgent,
			"Lot" => NodeType::Lot,
			"Purchase_Order" => NodeType::PurchaseOrder,
			"PMB" => NodeType::Pmb,
			"Process_Order" => NodeType::ProcessOrder,
			"Transfer_Order" => NodeType::TransferOrder,
			_ => NodeType::Unknown,
		}
	}

	/// Canonical tag spelling.
	pub fn as_tag(self) -> &'static str {
		match self {
			NodeType::Farmer => "Farmer",
			NodeType::FarmerGroup => "Farmer_Group",
			NodeType::LocalBuyingAgent => "Local_Buying_Agent",
			NodeType::Lot => "Lot",
			NodeType::PurchaseOrder => "Purchase_Order",
			NodeType::Pmb => "PMB",
			NodeType::ProcessOrder => "Process_Order",
			NodeType::TransferOrder => "Transfer_Order",
			NodeType::Unknown => "Unknown",
		}
	}

	/// Position in the process ordering, `None` for `Unknown`.
	pub fn rank(self) -> Option<usize> {
		Self::ORDERED.iter().position(|&t| t == self)
	}
}

/// Relationship kinds between entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
	/// Generic ownership, e.g. group has farmer.
	Has,
	/// Buying agent works with a farmer group.
	#[serde(rename = "Has_Farmer_Group")]
	HasFarmerGroup,
	/// Batch has a process order.
	#[serde(rename = "Has_Process_Order")]
	HasProcessOrder,
	/// Batch has a purchase order.
	#[serde(rename = "Has_Order")]
	HasOrder,
	/// Buying agent bought a lot.
	#[serde(rename = "Has_Buying_Agent")]
	HasBuyingAgent,
	/// Purchase order contains a lot.
	#[serde(rename = "Contains_Lot")]
	ContainsLot,
	/// Goods transfer.
	Transfer,
	/// Any tag not in the vocabulary above.
	Unknown,
}

impl EdgeType {
	/// Resolves a raw `e_type` tag.
	pub fn from_tag(tag: &str) -> Self {
		match tag {
			"Has" => EdgeType::Has,
			"Has_Farmer_Group" => EdgeType::HasFarmerGroup,
			"Has_Process_Order" => EdgeType::HasProcessOrder,
			"Has_Order" => EdgeType::HasOrder,
			"Has_Buying_Agent" => EdgeType::HasBuyingAgent,
			"Contains_Lot" => EdgeType::ContainsLot,
			"Transfer" => EdgeType::Transfer,
			_ => EdgeType::Unknown,
		}
	}
}

/// Scalar attribute value carried through to the detail panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
	/// Boolean flag.
	Bool(bool),
	/// Numeric value, kept as written so large integer ids display unchanged.
	Number(serde_json::Number),
	/// Text, including stringified nested structures.
	Text(String),
}

impl AttrValue {
	/// Converts a raw JSON value; `null` has no attribute representation.
	pub fn from_json(value: &serde_json::Value) -> Option<Self> {
		use serde_json::Value;
		match value {
			Value::Null => None,
			Value::Bool(b) => Some(AttrValue::Bool(*b)),
			Value::Number(n) => Some(AttrValue::Number(n.clone())),
			Value::String(s) => Some(AttrValue::Text(s.clone())),
			other => Some(AttrValue::Text(other.to_string())),
		}
	}
}

impl fmt::Display for AttrValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AttrValue::Bool(b) => write!(f, "{b}"),
			AttrValue::Number(n) => write!(f, "{n}"),
			AttrValue::Text(s) => f.write_str(s),
		}
	}
}

/// Canonical node produced by normalization.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Primary key within the graph.
	pub id: String,
	/// Resolved type.
	pub kind: NodeType,
	/// The raw type tag as supplied, kept for display of unknown types.
	pub type_tag: String,
	/// Category bucket the record came from, when the payload had one.
	pub category: Option<String>,
	/// Attributes in payload order.
	pub attributes: Vec<(String, AttrValue)>,
	/// Long display name.
	pub display_name: String,
	/// Short label drawn next to the node.
	pub short_label: String,
	/// Fill color.
	pub color: String,
}

/// Canonical edge; both endpoints are guaranteed to exist in the owning graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Index of the source node in [`Graph::nodes`].
	pub source_idx: usize,
	/// Index of the target node in [`Graph::nodes`].
	pub target_idx: usize,
	/// Resolved type.
	pub kind: EdgeType,
	/// Raw type tag as supplied.
	pub type_tag: String,
	/// Stroke color.
	pub color: String,
	/// Whether an arrowhead is drawn at the target.
	pub directed: bool,
}

/// The canonical, validated node and edge set for one displayed dataset.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	/// Nodes in normalization order.
	pub nodes: Vec<Node>,
	/// Edges that survived validation.
	pub edges: Vec<Edge>,
	index: HashMap<String, usize>,
}

impl Graph {
	/// Builds a graph from already-canonical parts.
	pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
		let index = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();
		Self {
			nodes,
			edges,
			index,
		}
	}

	/// Runs the full pipeline: normalize the nodes, then validate the edges against them.
	pub fn from_payload(payload: &RawPayload, config: &GraphConfig) -> Self {
		let nodes = normalize(payload, &config.palette);
		let edges = validate(
			&nodes,
			payload.edges(),
			&config.palette,
			config.force_directed,
		);
		Self::new(nodes, edges)
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// True when no node survived normalization.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Index of the node with `id`.
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Node with `id`.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.index_of(id).map(|i| &self.nodes[i])
	}

	/// Indices of nodes sharing an edge with `idx`.
	pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
		self.edges.iter().filter_map(move |e| {
			if e.source_idx == idx {
				Some(e.target_idx)
			} else if e.target_idx == idx {
				Some(e.source_idx)
			} else {
				None
			}
		})
	}

	/// Edge count per node, self-loops excluded.
	pub fn degrees(&self) -> Vec<usize> {
		let mut degrees = vec![0; self.nodes.len()];
		for e in &self.edges {
			if e.source_idx != e.target_idx {
				degrees[e.source_idx] += 1;
				degrees[e.target_idx] += 1;
			}
		}
		degrees
	}
}
