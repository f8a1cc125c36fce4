use leptos::prelude::*;
use log::{info, warn};

use crate::components::supply_graph::{NodeDetailPanel, SupplyGraphCanvas};
use crate::graph::{Graph, GraphConfig, NodeDetail, PayloadError, RawPayload};

/// Bundled sample export of the supply-chain graph.
const SAMPLE: &str = include_str!("../../data/sample.json");

/// Parse and normalize a payload into the displayable graph.
fn load_graph(text: &str, config: &GraphConfig) -> Result<Graph, PayloadError> {
	let payload = RawPayload::from_json_str(text)?;
	let graph = Graph::from_payload(&payload, config);
	info!("sample payload: {} nodes, {} edges", graph.len(), graph.edges.len());
	Ok(graph)
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = GraphConfig::default();
	let (selected, set_selected) = signal(None::<NodeDetail>);

	let body = match load_graph(SAMPLE, &config) {
		Err(err) => {
			warn!("could not load graph data: {err}");
			view! { <p class="load-error">"Could not load graph data: "{err.to_string()}</p> }
				.into_any()
		}
		Ok(graph) if graph.is_empty() => {
			view! { <p class="empty">"No nodes matched the loaded data."</p> }.into_any()
		}
		Ok(graph) => {
			let graph_data = Signal::derive(move || graph.clone());
			view! {
				<SupplyGraphCanvas
					data=graph_data
					config=config
					fullscreen=true
					selection=set_selected
				/>
				<NodeDetailPanel detail=selected />
			}
			.into_any()
		}
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				{body}
				<div class="graph-overlay">
					<h1>"TruTrace Supply Chain Graph"</h1>
					<p class="subtitle">
						"Drag a node to pin it, right-click to release. Click to focus. Scroll to zoom."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bundled_sample_loads() {
		let graph = load_graph(SAMPLE, &GraphConfig::default()).unwrap();
		assert_eq!(graph.len(), 6);
		assert_eq!(graph.edges.len(), 5);
	}

	#[test]
	fn unreadable_payload_is_a_load_error() {
		assert!(load_graph("not json", &GraphConfig::default()).is_err());
	}
}
