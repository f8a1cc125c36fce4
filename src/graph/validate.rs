use std::collections::HashMap;

use log::{debug, warn};

use super::model::{Edge, EdgeType, Node};
use super::palette::Palette;
use super::payload::RawEdge;

/// Keeps edges whose endpoints both exist in `nodes` and resolves their color.
///
/// With `force_directed` every edge is marked directed; otherwise the record's
/// own flag is kept and a missing flag means undirected.
pub fn validate(
	nodes: &[Node],
	raw_edges: &[RawEdge],
	palette: &Palette,
	force_directed: bool,
) -> Vec<Edge> {
	let ids: HashMap<&str, usize> = nodes
		.iter()
		.enumerate()
		.map(|(i, n)| (n.id.as_str(), i))
		.collect();

	let edges: Vec<Edge> = raw_edges
		.iter()
		.filter_map(|raw| {
			let source = raw.from_id.as_deref().unwrap_or_default();
			let target = raw.to_id.as_deref().unwrap_or_default();
			let (Some(&source_idx), Some(&target_idx)) = (ids.get(source), ids.get(target)) else {
				warn!("dropping dangling edge {source:?} -> {target:?}");
				return None;
			};
			let type_tag = raw.e_type.clone().unwrap_or_default();
			let kind = EdgeType::from_tag(&type_tag);
			Some(Edge {
				source: source.to_string(),
				target: target.to_string(),
				source_idx,
				target_idx,
				kind,
				type_tag,
				color: palette.edge_color(kind).to_string(),
				directed: force_directed || raw.directed.unwrap_or(false),
			})
		})
		.collect();

	debug!("kept {} of {} edges", edges.len(), raw_edges.len());
	edges
}
