use leptos::prelude::*;

use crate::graph::NodeDetail;

/// Side panel describing the selected node.
#[component]
pub fn NodeDetailPanel(#[prop(into)] detail: Signal<Option<NodeDetail>>) -> impl IntoView {
	move || {
		detail.get().map(|d| {
			let rows = d
				.rows
				.into_iter()
				.map(|(key, value)| {
					view! {
						<div class="attribute-row">
							<span class="attribute-key">{key}":"</span>
							<span class="attribute-value">{value}</span>
						</div>
					}
				})
				.collect_view();
			view! {
				<div class="node-tooltip">
					<h3>{d.type_tag}</h3>
					<p>"ID: "{d.id}</p>
					<p class="display-name">{d.display_name}</p>
					{d.category.map(|c| view! { <p class="category">"Category: "{c}</p> })}
					<div class="attributes">{rows}</div>
				</div>
			}
		})
	}
}
