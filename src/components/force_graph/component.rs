use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, info};
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::clock::RafClock;
use super::render::{CanvasTarget, HIT_RADIUS};
use super::viewport::PanState;
use crate::simulation::{DragMessage, ForceSimulation, GraphData, RenderTarget, SimulationConfig};

/// Everything the canvas owns for one mounted view.
struct CanvasView {
	sim: ForceSimulation<RafClock>,
	target: CanvasTarget,
	pan: PanState,
}

impl CanvasView {
	fn redraw(&mut self) {
		self.target.present(self.sim.frame());
	}
}

type SharedView = Rc<RefCell<Option<CanvasView>>>;
type ResizeCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Unmount teardown: cancel the loop, drop the view and detach the resize listener.
/// Returns the cancelled view, if one was mounted.
fn dispose(view_state: &SharedView, resize_cb: &ResizeCallback) -> Option<CanvasView> {
	let view = view_state.borrow_mut().take().map(|mut view| {
		view.sim.cancel();
		view
	});
	if let Some(cb) = resize_cb.borrow_mut().take() {
		if let Some(window) = web_sys::window() {
			let _ =
				window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
	}
	info!("Graph canvas disposed");
	view
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// End any drag and any pan. Used for both mouseup and mouseleave.
fn release_pointer(view: &mut CanvasView) {
	if view.sim.drag_session().is_some() {
		let _ = view.sim.dispatch(DragMessage::End);
	}
	view.pan.active = false;
}

/// Force-directed canvas for one interaction graph. A new `data` value reloads the layout.
#[component]
pub fn ForceGraphCanvas(
	/// The graph snapshot to lay out.
	#[prop(into)]
	data: Signal<GraphData>,
	/// Layout tuning; defaults when omitted.
	#[prop(optional)]
	config: Option<SimulationConfig>,
	/// Fill the window and follow its size.
	#[prop(default = false)]
	fullscreen: bool,
	/// Fixed width in pixels, ignored when `fullscreen`.
	#[prop(default = None)]
	width: Option<f64>,
	/// Fixed height in pixels, ignored when `fullscreen`.
	#[prop(default = None)]
	height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let view_state: SharedView = Rc::new(RefCell::new(None));
	let resize_cb: ResizeCallback = Rc::new(RefCell::new(None));
	let config = config.unwrap_or_default();

	let (view_init, resize_cb_init) = (view_state.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let graph = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("No window available for the graph canvas");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let mut guard = view_init.borrow_mut();
		if let Some(view) = guard.as_mut() {
			view.target.resize(w, h);
			match view.sim.reload(&graph, w, h) {
				Ok(()) => view.redraw(),
				Err(e) => error!("Rejected interaction graph: {e}"),
			}
			return;
		}

		let Some(ctx) = context_2d(&canvas) else {
			error!("Canvas 2D context unavailable");
			return;
		};

		let clock = RafClock::new();
		let (view_frame, clock_frame) = (view_init.clone(), clock.clone());
		clock.set_callback(move |_timestamp: f64| {
			clock_frame.frame_delivered();
			if let Some(view) = view_frame.borrow_mut().as_mut() {
				let CanvasView { sim, target, .. } = view;
				sim.tick(target);
			}
		});

		match ForceSimulation::new(&graph, config.clone(), w, h, clock) {
			Ok(sim) => {
				let mut view = CanvasView {
					sim,
					target: CanvasTarget::new(ctx, w, h),
					pan: PanState::default(),
				};
				view.redraw();
				*guard = Some(view);
			}
			Err(e) => {
				error!("Rejected interaction graph: {e}");
				return;
			}
		}

		if fullscreen {
			let (view_resize, canvas_resize) = (view_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(view) = view_resize.borrow_mut().as_mut() {
					view.target.resize(nw, nh);
					view.sim.resize(nw, nh);
					view.redraw();
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
	});

	let teardown = SendWrapper::new((view_state.clone(), resize_cb.clone()));
	on_cleanup(move || {
		let (view_state, resize_cb) = teardown.take();
		dispose(&view_state, &resize_cb);
	});

	let view_md = view_state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(view) = view_md.borrow_mut().as_mut() {
			let (gx, gy) = view.target.viewport.screen_to_graph(x, y);
			let hit = view
				.sim
				.frame()
				.node_at(gx, gy, HIT_RADIUS)
				.map(|n| n.id.clone());
			match hit {
				Some(node_id) => {
					let _ = view.sim.dispatch(DragMessage::Start {
						node_id,
						pointer: (gx, gy),
					});
				}
				None => view.pan.begin(x, y, &view.target.viewport),
			}
		}
	};

	let view_mm = view_state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(view) = view_mm.borrow_mut().as_mut() {
			if view.sim.drag_session().is_some() {
				let pointer = view.target.viewport.screen_to_graph(x, y);
				let _ = view.sim.dispatch(DragMessage::Move { pointer });
			} else if view.pan.active {
				view.pan.apply(x, y, &mut view.target.viewport);
				view.redraw();
			}
		}
	};

	let view_mu = view_state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(view) = view_mu.borrow_mut().as_mut() {
			release_pointer(view);
		}
	};

	let view_ml = view_state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(view) = view_ml.borrow_mut().as_mut() {
			release_pointer(view);
		}
	};

	let view_wh = view_state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(view) = view_wh.borrow_mut().as_mut() {
			view.target.viewport.zoom_at(x, y, ev.delta_y() <= 0.0);
			view.redraw();
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod tests {
	use std::cell::Cell;

	use wasm_bindgen_test::*;

	use super::*;
	use crate::simulation::{GraphLink, GraphNode, Phase};

	wasm_bindgen_test_configure!(run_in_browser);

	fn mounted_view() -> Option<CanvasView> {
		let document = web_sys::window()?.document()?;
		let canvas: HtmlCanvasElement = document.create_element("canvas").ok()?.dyn_into().ok()?;
		let ctx = context_2d(&canvas)?;
		let data = GraphData {
			nodes: vec![GraphNode::new("a"), GraphNode::new("b")],
			edges: vec![GraphLink::new("a", "b")],
		};
		let sim = ForceSimulation::new(
			&data,
			SimulationConfig::default(),
			200.0,
			200.0,
			RafClock::new(),
		)
		.ok()?;
		Some(CanvasView {
			sim,
			target: CanvasTarget::new(ctx, 200.0, 200.0),
			pan: PanState::default(),
		})
	}

	fn fire_resize() {
		let window = web_sys::window().unwrap();
		let event = web_sys::Event::new("resize").unwrap();
		window.dispatch_event(&event).unwrap();
	}

	#[wasm_bindgen_test]
	fn dispose_cancels_a_stopped_view_and_detaches_resize() {
		let mut view = mounted_view().unwrap();
		while view.sim.phase() == Phase::Running {
			let CanvasView { sim, target, .. } = &mut view;
			sim.tick(target);
		}
		assert_eq!(view.sim.phase(), Phase::Stopped);

		let view_state: SharedView = Rc::new(RefCell::new(Some(view)));
		let resize_cb: ResizeCallback = Rc::new(RefCell::new(None));
		let resizes = Rc::new(Cell::new(0u32));
		let counter = resizes.clone();
		*resize_cb.borrow_mut() = Some(Closure::new(move || counter.set(counter.get() + 1)));
		if let Some(ref cb) = *resize_cb.borrow() {
			web_sys::window()
				.unwrap()
				.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
				.unwrap();
		}
		fire_resize();
		assert_eq!(resizes.get(), 1);

		let disposed = dispose(&view_state, &resize_cb).unwrap();
		assert_eq!(disposed.sim.phase(), Phase::Idle);
		assert!(view_state.borrow().is_none());
		assert!(resize_cb.borrow().is_none());

		fire_resize();
		assert_eq!(resizes.get(), 1);
	}

	#[wasm_bindgen_test]
	fn dispose_without_a_mounted_view_is_harmless() {
		let view_state: SharedView = Rc::new(RefCell::new(None));
		let resize_cb: ResizeCallback = Rc::new(RefCell::new(None));
		assert!(dispose(&view_state, &resize_cb).is_none());
		assert!(dispose(&view_state, &resize_cb).is_none());
	}
}
