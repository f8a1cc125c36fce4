//! Per-type presentation and layout tables.
//!
//! Label rules, colors, column placement and initial velocities are data in
//! one [`Palette`] rather than code branches, so a variant of the diagram is a
//! different table.

use serde::{Deserialize, Serialize};

use super::model::{EdgeType, NodeType};

/// Fill used for node types with no table entry.
pub const DEFAULT_NODE_COLOR: &str = "#607D8B";
/// Stroke used for edge types with no table entry.
pub const DEFAULT_EDGE_COLOR: &str = "#999999";

/// How a node's short label is derived.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum LabelRule {
	/// A fixed code shared by every node of the type.
	Fixed {
		/// The code, typically two or three characters.
		code: String,
	},
	/// Abbreviation of the display name.
	FromName,
	/// Uppercased first two characters of the id.
	FromId,
}

impl LabelRule {
	/// Applies the rule, falling back to the id rule whenever the result is empty.
	pub fn apply(&self, display_name: &str, id: &str) -> String {
		let label = match self {
			LabelRule::Fixed { code } => code.clone(),
			LabelRule::FromName => abbreviate(display_name),
			LabelRule::FromId => id_prefix(id),
		};
		if label.trim().is_empty() {
			id_prefix(id)
		} else {
			label
		}
	}
}

/// Initials of up to three words, or the first two letters of a single word.
pub fn abbreviate(text: &str) -> String {
	let words: Vec<&str> = text
		.split(|c: char| !c.is_alphanumeric())
		.filter(|w| !w.is_empty())
		.collect();
	match words.as_slice() {
		[] => String::new(),
		[word] => word.chars().take(2).collect::<String>().to_uppercase(),
		many => many
			.iter()
			.take(3)
			.filter_map(|w| w.chars().next())
			.collect::<String>()
			.to_uppercase(),
	}
}

fn id_prefix(id: &str) -> String {
	id.chars().take(2).collect::<String>().to_uppercase()
}

/// Table row for one node type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeStyle {
	/// Type this row describes.
	pub kind: NodeType,
	/// Short label rule.
	pub label: LabelRule,
	/// Fill color.
	pub color: String,
	/// Attribute keys tried in order for the display name.
	pub name_keys: Vec<String>,
	/// Horizontal band as a fraction of the usable width, 0 = leftmost.
	pub column: f64,
	/// Initial horizontal velocity; negative flows left.
	pub initial_vx: f64,
}

/// Table row for one edge type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
	/// Type this row describes.
	pub kind: EdgeType,
	/// Stroke color.
	pub color: String,
}

/// The full set of per-type tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
	/// Node type rows.
	pub nodes: Vec<TypeStyle>,
	/// Edge type rows.
	pub edges: Vec<EdgeStyle>,
	/// Fill for node types without a row.
	pub default_node_color: String,
	/// Stroke for edge types without a row.
	pub default_edge_color: String,
}

impl Default for Palette {
	fn default() -> Self {
		let node = |kind: NodeType, label: LabelRule, color: &str, name_key: Option<&str>, vx: f64| {
			let mut name_keys: Vec<String> = name_key.into_iter().map(String::from).collect();
			name_keys.push("name".into());
			let column = kind
				.rank()
				.map(|r| r as f64 / (NodeType::ORDERED.len() - 1) as f64)
				.unwrap_or(0.5);
			TypeStyle {
				kind,
				label,
				color: color.into(),
				name_keys,
				column,
				initial_vx: vx,
			}
		};
		let fixed = |code: &str| LabelRule::Fixed { code: code.into() };
		let edge = |kind: EdgeType, color: &str| EdgeStyle {
			kind,
			color: color.into(),
		};

		Self {
			nodes: vec![
				node(NodeType::Farmer, LabelRule::FromName, "#4CAF50", Some("farmer_name"), -40.0),
				node(NodeType::FarmerGroup, fixed("FG"), "#2196F3", Some("farmer_group_name"), -25.0),
				node(NodeType::LocalBuyingAgent, fixed("LBA"), "#FF9800", Some("buying_agent_name"), -10.0),
				node(NodeType::Lot, fixed("LOT"), "#9C27B0", None, 0.0),
				node(NodeType::PurchaseOrder, fixed("PO"), "#F44336", None, 10.0),
				node(NodeType::Pmb, fixed("PMB"), "#795548", None, 25.0),
				node(NodeType::ProcessOrder, fixed("PRO"), "#00BCD4", None, 35.0),
				node(NodeType::TransferOrder, fixed("TO"), "#E91E63", None, 40.0),
			],
			edges: vec![
				edge(EdgeType::Has, "#4CAF50"),
				edge(EdgeType::HasFarmerGroup, "#2196F3"),
				edge(EdgeType::HasBuyingAgent, "#FF9800"),
				edge(EdgeType::ContainsLot, "#9C27B0"),
				edge(EdgeType::HasOrder, "#F44336"),
				edge(EdgeType::HasProcessOrder, "#795548"),
				edge(EdgeType::Transfer, "#00BCD4"),
			],
			default_node_color: DEFAULT_NODE_COLOR.into(),
			default_edge_color: DEFAULT_EDGE_COLOR.into(),
		}
	}
}

impl Palette {
	/// Row for `kind`, if the table has one.
	pub fn style(&self, kind: NodeType) -> Option<&TypeStyle> {
		self.nodes.iter().find(|s| s.kind == kind)
	}

	/// Fill color for `kind`.
	pub fn node_color(&self, kind: NodeType) -> &str {
		self.style(kind)
			.map(|s| s.color.as_str())
			.unwrap_or(&self.default_node_color)
	}

	/// Short label rule for `kind`; unlisted types use the id rule.
	pub fn label_rule(&self, kind: NodeType) -> &LabelRule {
		const FALLBACK: &LabelRule = &LabelRule::FromId;
		self.style(kind).map(|s| &s.label).unwrap_or(FALLBACK)
	}

	/// Display name candidate keys for `kind`.
	pub fn name_keys(&self, kind: NodeType) -> Vec<&str> {
		match self.style(kind) {
			Some(s) => s.name_keys.iter().map(String::as_str).collect(),
			None => vec!["name"],
		}
	}

	/// Column fraction for `kind`; unlisted types sit in the middle.
	pub fn column(&self, kind: NodeType) -> f64 {
		self.style(kind).map(|s| s.column).unwrap_or(0.5)
	}

	/// Initial horizontal velocity for `kind`.
	pub fn initial_vx(&self, kind: NodeType) -> f64 {
		self.style(kind).map(|s| s.initial_vx).unwrap_or(0.0)
	}

	/// Stroke color for `kind`.
	pub fn edge_color(&self, kind: EdgeType) -> &str {
		self.edges
			.iter()
			.find(|s| s.kind == kind)
			.map(|s| s.color.as_str())
			.unwrap_or(&self.default_edge_color)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn abbreviates_names() {
		assert_eq!(abbreviate("Jane"), "JA");
		assert_eq!(abbreviate("MS - LIVELIHOOD"), "ML");
		assert_eq!(abbreviate("amenuveve kofi mensah asante"), "AKM");
		assert_eq!(abbreviate("  -- "), "");
	}

	#[test]
	fn empty_rule_output_falls_back_to_id() {
		let rule = LabelRule::Fixed { code: " ".into() };
		assert_eq!(rule.apply("whatever", "lot_1"), "LO");
		assert_eq!(LabelRule::FromName.apply("", "f-9"), "F-");
	}

	#[test]
	fn columns_are_ordered_left_to_right() {
		let palette = Palette::default();
		let columns: Vec<f64> = NodeType::ORDERED.iter().map(|&t| palette.column(t)).collect();
		assert!(columns.windows(2).all(|w| w[0] < w[1]));
		assert_eq!(columns[0], 0.0);
		assert_eq!(columns[7], 1.0);
		assert_eq!(palette.column(NodeType::Unknown), 0.5);
	}

	#[test]
	fn unknown_types_use_defaults() {
		let palette = Palette::default();
		assert_eq!(palette.node_color(NodeType::Unknown), DEFAULT_NODE_COLOR);
		assert_eq!(palette.edge_color(EdgeType::Unknown), DEFAULT_EDGE_COLOR);
		assert_eq!(palette.label_rule(NodeType::Unknown), &LabelRule::FromId);
		assert_eq!(palette.name_keys(NodeType::Unknown), vec!["name"]);
	}

	#[test]
	fn partial_json_override_keeps_defaults() {
		let palette: Palette =
			serde_json::from_str(r##"{"default_node_color": "#000000"}"##).unwrap();
		assert_eq!(palette.default_node_color, "#000000");
		assert_eq!(palette.node_color(NodeType::Farmer), "#4CAF50");
	}
}
