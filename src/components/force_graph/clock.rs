use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::simulation::Clock;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// [`Clock`] backed by `requestAnimationFrame`: each request schedules exactly one frame.
#[derive(Clone, Default)]
pub struct RafClock {
	callback: FrameCallback,
	request_id: Rc<Cell<Option<i32>>>,
}

impl RafClock {
	/// A clock with no frame handler installed yet.
	pub fn new() -> Self {
		Self::default()
	}

	/// Install the per-frame handler. It must call [`RafClock::frame_delivered`] first.
	pub fn set_callback(&self, callback: impl FnMut(f64) + 'static) {
		*self.callback.borrow_mut() = Some(Closure::wrap(
			Box::new(callback) as Box<dyn FnMut(f64)>
		));
	}

	/// Mark the outstanding frame as consumed so the next request schedules a new one.
	pub fn frame_delivered(&self) {
		self.request_id.set(None);
	}
}

impl Clock for RafClock {
	fn request_tick(&mut self) {
		if self.request_id.get().is_some() {
			return;
		}
		let Some(window) = web_sys::window() else {
			warn!("No window; animation frame not scheduled");
			return;
		};
		let callback = self.callback.borrow();
		let Some(cb) = callback.as_ref() else {
			return;
		};
		match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
			Ok(id) => self.request_id.set(Some(id)),
			Err(e) => warn!("requestAnimationFrame failed: {e:?}"),
		}
	}

	fn release(&mut self) {
		if let Some(id) = self.request_id.take() {
			if let Some(window) = web_sys::window() {
				let _ = window.cancel_animation_frame(id);
			}
		}
	}
}
