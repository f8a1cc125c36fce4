//! Raw input records and structural shape detection.

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::error::{PayloadError, Result};

/// A node record exactly as supplied; presence checks happen during normalization.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawNode {
	/// Node id.
	#[serde(default, deserialize_with = "lenient_id")]
	pub v_id: Option<String>,
	/// Node type tag.
	#[serde(default, deserialize_with = "lenient_id")]
	pub v_type: Option<String>,
	/// Free-form attributes; anything but an object counts as none.
	#[serde(default, deserialize_with = "lenient_map")]
	pub attributes: Option<Map<String, Value>>,
}

/// An edge record exactly as supplied.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawEdge {
	/// Source node id.
	#[serde(default, deserialize_with = "lenient_id")]
	pub from_id: Option<String>,
	/// Target node id.
	#[serde(default, deserialize_with = "lenient_id")]
	pub to_id: Option<String>,
	/// Edge type tag.
	#[serde(default, deserialize_with = "lenient_id")]
	pub e_type: Option<String>,
	/// Stated directedness; `"true"`/`"false"` strings are read as booleans,
	/// anything else as unstated.
	#[serde(default, deserialize_with = "lenient_bool")]
	pub directed: Option<bool>,
}

/// Ids and tags arrive as strings or, in some exports, as bare numbers.
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Option::<Value>::deserialize(deserializer)? {
		Some(Value::String(s)) => Some(s),
		Some(Value::Number(n)) => Some(n.to_string()),
		_ => None,
	})
}

fn lenient_map<'de, D>(deserializer: D) -> std::result::Result<Option<Map<String, Value>>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Option::<Value>::deserialize(deserializer)? {
		Some(Value::Object(map)) => Some(map),
		_ => None,
	})
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Option::<Value>::deserialize(deserializer)? {
		Some(Value::Bool(b)) => Some(b),
		Some(Value::String(s)) => s.trim().to_ascii_lowercase().parse().ok(),
		_ => None,
	})
}

/// The accepted input shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum RawPayload {
	/// `[{category: [node, ..], ..}, {edges: [..]}]`
	Categorized {
		/// Category name and its records, in payload order.
		categories: Vec<(String, Vec<RawNode>)>,
		/// Edge records.
		edges: Vec<RawEdge>,
	},
	/// `{node: [..], edges: [..]}`, optionally wrapped in a list.
	Flat {
		/// Node records.
		nodes: Vec<RawNode>,
		/// Edge records.
		edges: Vec<RawEdge>,
	},
}

impl Default for RawPayload {
	fn default() -> Self {
		RawPayload::Categorized {
			categories: Vec::new(),
			edges: Vec::new(),
		}
	}
}

impl RawPayload {
	/// Parses payload text.
	pub fn from_json_str(text: &str) -> Result<Self> {
		let value: Value = serde_json::from_str(text)?;
		Self::from_value(&value)
	}

	/// Accepts a parsed payload. `null` is an empty payload; scalars are rejected.
	pub fn from_value(value: &Value) -> Result<Self> {
		match value {
			Value::Null => Ok(Self::default()),
			Value::Array(_) | Value::Object(_) => Ok(Self::detect(value)),
			_ => Err(PayloadError::UnsupportedShape("a list or an object")),
		}
	}

	/// Picks the shape: a `node` array on the first element means [`RawPayload::Flat`],
	/// anything else is treated as [`RawPayload::Categorized`].
	pub fn detect(value: &Value) -> Self {
		let (first, second) = match value {
			Value::Array(items) => (items.first(), items.get(1)),
			Value::Object(_) => (Some(value), None),
			_ => (None, None),
		};
		fn edges_of(v: Option<&Value>) -> Option<&Vec<Value>> {
			v.and_then(|v| v.get("edges")).and_then(Value::as_array)
		}
		let edges = edges_of(first)
			.or_else(|| edges_of(second))
			.map(|records| parse_records(records, "edge"))
			.unwrap_or_default();

		if let Some(nodes) = first.and_then(|f| f.get("node")).and_then(Value::as_array) {
			return RawPayload::Flat {
				nodes: parse_records(nodes, "node"),
				edges,
			};
		}

		let categories = first
			.and_then(Value::as_object)
			.map(|map| {
				map.iter()
					.filter(|(name, _)| name.as_str() != "edges")
					.filter_map(|(name, records)| match records.as_array() {
						Some(records) => Some((name.clone(), parse_records(records, "node"))),
						None => {
							warn!("skipping category {name:?}: not a list of records");
							None
						}
					})
					.collect()
			})
			.unwrap_or_default();
		RawPayload::Categorized { categories, edges }
	}

	/// Node records paired with the category they came from.
	pub fn node_records(&self) -> Vec<(Option<&str>, &RawNode)> {
		match self {
			RawPayload::Categorized { categories, .. } => categories
				.iter()
				.flat_map(|(name, nodes)| nodes.iter().map(move |n| (Some(name.as_str()), n)))
				.collect(),
			RawPayload::Flat { nodes, .. } => nodes.iter().map(|n| (None, n)).collect(),
		}
	}

	/// Edge records.
	pub fn edges(&self) -> &[RawEdge] {
		match self {
			RawPayload::Categorized { edges, .. } | RawPayload::Flat { edges, .. } => edges,
		}
	}
}

fn parse_records<T: DeserializeOwned>(records: &[Value], what: &str) -> Vec<T> {
	records
		.iter()
		.filter_map(|record| match T::deserialize(record) {
			Ok(parsed) => Some(parsed),
			Err(err) => {
				warn!("dropping malformed {what} record: {err}");
				None
			}
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn detects_categorized_shape() {
		let value = json!([
			{"v_farmer": [{"v_id": "F1", "v_type": "Farmer"}], "lot": [{"v_id": "L1", "v_type": "Lot"}]},
			{"edges": [{"from_id": "F1", "to_id": "L1", "e_type": "Has"}]}
		]);
		let payload = RawPayload::detect(&value);
		let RawPayload::Categorized { categories, edges } = &payload else {
			panic!("expected categorized payload, got {payload:?}");
		};
		let names: Vec<&str> = categories.iter().map(|(n, _)| n.as_str()).collect();
		assert_eq!(names, ["v_farmer", "lot"]);
		assert_eq!(edges.len(), 1);
		assert_eq!(payload.node_records()[1].0, Some("lot"));
	}

	#[test]
	fn detects_flat_shape_bare_and_wrapped() {
		let flat = json!({"node": [{"v_id": "A", "v_type": "Lot"}], "edges": []});
		let wrapped = json!([flat.clone()]);
		for value in [flat, wrapped] {
			let payload = RawPayload::detect(&value);
			assert!(matches!(payload, RawPayload::Flat { ref nodes, .. } if nodes.len() == 1));
		}
	}

	#[test]
	fn numeric_ids_are_accepted() {
		let value = json!({"node": [{"v_id": 6101234, "v_type": "Purchase_Order"}],
			"edges": [{"from_id": 1, "to_id": 6101234}]});
		let payload = RawPayload::detect(&value);
		assert_eq!(payload.node_records()[0].1.v_id.as_deref(), Some("6101234"));
		assert_eq!(payload.edges()[0].from_id.as_deref(), Some("1"));
	}

	#[test]
	fn ill_typed_optional_fields_do_not_drop_the_record() {
		let value = json!({
			"node": [
				{"v_id": "A", "v_type": "Lot", "attributes": []},
				{"v_id": "B", "v_type": "Lot", "attributes": "n/a"},
				{"v_id": "C", "v_type": "Farmer", "attributes": {"name": "Jane"}}
			],
			"edges": [
				{"from_id": "C", "to_id": "A", "directed": "true"},
				{"from_id": "C", "to_id": "B", "e_type": 7, "directed": 1}
			]
		});
		let payload = RawPayload::detect(&value);
		let nodes = payload.node_records();
		assert_eq!(nodes.len(), 3);
		assert_eq!(nodes[0].1.attributes, None);
		assert_eq!(nodes[1].1.attributes, None);
		assert!(nodes[2].1.attributes.is_some());

		let edges = payload.edges();
		assert_eq!(edges.len(), 2);
		assert_eq!(edges[0].directed, Some(true));
		assert_eq!(edges[1].directed, None);
		assert_eq!(edges[1].e_type.as_deref(), Some("7"));
	}

	#[test]
	fn malformed_records_are_dropped_individually() {
		let value = json!([{"lot": [42, {"v_id": "L1", "v_type": "Lot"}], "po": "oops"}]);
		let payload = RawPayload::detect(&value);
		assert_eq!(payload.node_records().len(), 1);
		assert!(payload.edges().is_empty());
	}

	#[test]
	fn empty_and_scalar_inputs() {
		assert_eq!(RawPayload::from_value(&json!(null)).unwrap(), RawPayload::default());
		assert_eq!(RawPayload::from_value(&json!([])).unwrap(), RawPayload::default());
		assert!(matches!(
			RawPayload::from_value(&json!(3)),
			Err(PayloadError::UnsupportedShape(_))
		));
		assert!(matches!(
			RawPayload::from_json_str("{not json"),
			Err(PayloadError::Json(_))
		));
	}
}
