use std::collections::HashSet;

use log::{debug, warn};

use super::model::{AttrValue, Node, NodeType};
use super::palette::Palette;
use super::payload::{RawNode, RawPayload};

/// Converts raw node records into canonical nodes.
///
/// Records without an id or a type are skipped, as are repeated ids after the
/// first occurrence. Output order follows the payload.
pub fn normalize(payload: &RawPayload, palette: &Palette) -> Vec<Node> {
	let records = payload.node_records();
	let mut seen = HashSet::new();
	let mut nodes = Vec::with_capacity(records.len());

	for (category, raw) in &records {
		let Some(node) = normalize_node(*category, raw, palette) else {
			warn!("dropping node record without v_id/v_type: {raw:?}");
			continue;
		};
		if !seen.insert(node.id.clone()) {
			warn!("dropping duplicate node id {:?}", node.id);
			continue;
		}
		nodes.push(node);
	}

	debug!("normalized {} of {} node records", nodes.len(), records.len());
	nodes
}

fn normalize_node(category: Option<&str>, raw: &RawNode, palette: &Palette) -> Option<Node> {
	let id = raw.v_id.as_deref().filter(|s| !s.is_empty())?;
	let type_tag = raw.v_type.as_deref().filter(|s| !s.is_empty())?;
	let kind = NodeType::from_tag(type_tag);

	let attributes: Vec<(String, AttrValue)> = raw
		.attributes
		.iter()
		.flatten()
		.filter_map(|(k, v)| AttrValue::from_json(v).map(|v| (k.clone(), v)))
		.collect();

	let display_name = display_name(kind, id, &attributes, palette);
	let short_label = palette.label_rule(kind).apply(&display_name, id);

	Some(Node {
		id: id.to_string(),
		kind,
		type_tag: type_tag.to_string(),
		category: category.map(String::from),
		display_name,
		short_label,
		color: palette.node_color(kind).to_string(),
		attributes,
	})
}

fn display_name(
	kind: NodeType,
	id: &str,
	attributes: &[(String, AttrValue)],
	palette: &Palette,
) -> String {
	palette
		.name_keys(kind)
		.into_iter()
		.find_map(|key| {
			attributes
				.iter()
				.find(|(k, _)| k == key)
				.map(|(_, v)| v.to_string())
				.filter(|name| !name.trim().is_empty())
		})
		.unwrap_or_else(|| id.to_string())
}
