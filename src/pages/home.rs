use leptos::prelude::*;
use log::warn;

use crate::api::{ApiConfig, fetch_interaction_graph};
use crate::components::force_graph::ForceGraphCanvas;

/// Dashboard page: loads the interaction graph once and lays it out.
#[component]
pub fn Home() -> impl IntoView {
	let graph = LocalResource::new(|| async { fetch_interaction_graph(&ApiConfig::default()).await });

	view! {
		<div class="app-container">
			<header class="app-header">
				<h1>"AI Drug Interaction Clinical Dashboard"</h1>
				<p class="subtitle">"Drag drugs to reposition. Scroll to zoom. Drag background to pan."</p>
			</header>

			<section class="card">
				<h2>"Drug Interaction Graph"</h2>
				<div class="graph-container" style="width: 100%; height: 400px; border: 1px solid #ddd;">
					<Suspense fallback=|| view! { <p>"Loading interaction graph..."</p> }>
						{move || Suspend::new(async move {
							match graph.await {
								Ok(data) => view! { <ForceGraphCanvas data=data height=Some(400.0) /> }.into_any(),
								Err(err) => {
									warn!("Interaction graph unavailable: {err}");
									view! {
										<p class="error">"Error loading interaction graph. Check /interaction_graph API."</p>
									}
										.into_any()
								}
							}
						})}
					</Suspense>
				</div>
			</section>
		</div>
	}
}
