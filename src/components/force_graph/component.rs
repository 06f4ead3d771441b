use std::cell::RefCell;
use std::rc::Rc;

use leptos::callback::{Callable, UnsyncCallback};
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::state::CanvasHandle;
use crate::config::GraphViewConfig;
use crate::graph::ClickHit;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn local_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Canvas view over a [`CanvasHandle`]. The graph contents are driven from
/// outside through the handle; this component only animates, paints and
/// reports clicks.
#[component]
pub fn ForceGraphCanvas(
	state: CanvasHandle,
	config: GraphViewConfig,
	#[prop(into)] on_click: UnsyncCallback<ClickHit>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());
	let (fullscreen, width, height) = (config.fullscreen, config.width, config.height);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
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

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("canvas has no 2d context");
			return;
		};
		state_init.0.borrow_mut().resize(w, h);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				state_resize.0.borrow_mut().resize(nw, nh);
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			{
				let mut s = state_anim.0.borrow_mut();
				if s.animation_running {
					s.tick(0.016);
				}
				render::render(&s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = local_position(canvas_ref, &ev) {
			state_md.0.borrow_mut().press_at(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = local_position(canvas_ref, &ev) {
			state_mm.0.borrow_mut().pointer_moved(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let hit = {
			let mut s = state_mu.0.borrow_mut();
			match local_position(canvas_ref, &ev) {
				Some((x, y)) if s.release(x, y) => {
					let node = s.node_id_at(x, y);
					let edge = match node {
						Some(_) => None,
						None => s.edge_id_at(x, y),
					};
					Some(ClickHit { node, edge })
				}
				Some(_) => None,
				None => {
					s.cancel_pointer();
					None
				}
			}
		};
		if let Some(hit) = hit {
			on_click.run(hit);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| state_ml.0.borrow_mut().cancel_pointer();

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		let mut s = state_wh.0.borrow_mut();
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		let new_k = (s.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / s.transform.k;
		s.transform.x = x - (x - s.transform.x) * ratio;
		s.transform.y = y - (y - s.transform.y) * ratio;
		s.transform.k = new_k;
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
