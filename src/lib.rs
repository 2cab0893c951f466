//! Drug interaction dashboard: client-side app wiring, routes and the force-directed graph.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};
use wasm_bindgen::prelude::wasm_bindgen;

// Browser-only test harness, unused by native test builds.
#[cfg(test)]
use wasm_bindgen_test as _;

// Modules
pub mod api;
pub mod components;
mod pages;
pub mod simulation;

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// WASM entry point: trunk loads the cdylib and this mounts the app.
#[wasm_bindgen(start)]
pub fn start() {
	init_logging();
	mount_to_body(App);
}

/// An app router which renders the dashboard and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="Drug Interaction Dashboard" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
