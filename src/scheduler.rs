//! Browser frame loop: one [`Engine::tick`] per animation frame.
//!
//! Event handlers and the frame callback share the engine through
//! `Rc<RefCell<..>>`. Handlers mutate state and set the dirty flag; the frame
//! callback is the only place a scheduled full redraw happens.

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::HtmlElement;

use crate::engine::{Action, Engine};
use crate::input::{InputEvent, UiCommand};
use crate::web::{self, WebSurface};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Run flag plus the handle of the frame request the browser still owes us.
#[derive(Debug, Default)]
struct FrameState {
    running: Cell<bool>,
    pending: Cell<Option<i32>>,
}

impl FrameState {
    /// Mark the loop running. Returns `false` if it already was.
    fn begin(&self) -> bool {
        !self.running.replace(true)
    }

    fn requested(&self, handle: i32) {
        self.pending.set(Some(handle));
    }

    /// A frame callback fired. Returns whether the loop should keep going.
    fn fired(&self) -> bool {
        self.pending.set(None);
        self.running.get()
    }

    /// Stop the loop, returning the request that still needs cancelling.
    fn halt(&self) -> Option<i32> {
        self.running.set(false);
        self.pending.take()
    }
}

/// Owns the shared engine and the requestAnimationFrame callback.
pub struct FrameLoop {
    engine: Rc<RefCell<Engine<WebSurface>>>,
    world: HtmlElement,
    state: Rc<FrameState>,
    callback: FrameCallback,
}

impl FrameLoop {
    #[must_use]
    pub fn new(engine: Engine<WebSurface>, world: HtmlElement) -> Self {
        Self {
            engine: Rc::new(RefCell::new(engine)),
            world,
            state: Rc::new(FrameState::default()),
            callback: Rc::new(RefCell::new(None)),
        }
    }

    /// Shared handle for event listeners.
    #[must_use]
    pub fn engine(&self) -> Rc<RefCell<Engine<WebSurface>>> {
        Rc::clone(&self.engine)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    /// Start requesting frames. Does nothing if already running.
    pub fn start(&self) {
        if !self.state.begin() {
            return;
        }
        let Some(window) = web_sys::window() else {
            tracing::warn!("no window; frame loop not started");
            self.state.halt();
            return;
        };

        let engine = Rc::clone(&self.engine);
        let state = Rc::clone(&self.state);
        let holder = Rc::clone(&self.callback);
        let window_for_cb = window.clone();
        let cb = Closure::wrap(Box::new(move |_ts: f64| {
            if !state.fired() {
                return;
            }
            frame(&engine);
            if let Some(cb) = holder.borrow().as_ref() {
                match window_for_cb.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    Ok(handle) => state.requested(handle),
                    Err(e) => {
                        tracing::warn!(error = ?e, "requestAnimationFrame failed; frame loop stopped");
                        state.halt();
                    }
                }
            }
        }) as Box<dyn FnMut(f64)>);

        match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(handle) => {
                self.state.requested(handle);
                *self.callback.borrow_mut() = Some(cb);
            }
            Err(e) => {
                tracing::warn!(error = ?e, "requestAnimationFrame failed");
                self.state.halt();
            }
        }
    }

    /// Stop the loop and cancel any frame already requested.
    pub fn stop(&self) {
        let Some(handle) = self.state.halt() else {
            return;
        };
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(e) = window.cancel_animation_frame(handle) {
            tracing::warn!(error = ?e, "cancelAnimationFrame failed");
        }
    }

    /// Feed an input event and carry out its effects on the page.
    pub fn dispatch(&self, event: &InputEvent) -> Vec<Action> {
        let result = self.engine.borrow_mut().dispatch(event);
        match result {
            Ok(actions) => {
                self.apply_host_actions(&actions);
                actions
            }
            Err(e) => {
                tracing::warn!(error = %e, "event render failed");
                Vec::new()
            }
        }
    }

    /// Apply a settings change and carry out its effects on the page.
    pub fn apply_ui(&self, command: &UiCommand) -> Vec<Action> {
        let result = self.engine.borrow_mut().apply_ui(command);
        match result {
            Ok(actions) => {
                self.apply_host_actions(&actions);
                actions
            }
            Err(e) => {
                tracing::warn!(error = %e, "settings render failed");
                Vec::new()
            }
        }
    }

    fn apply_host_actions(&self, actions: &[Action]) {
        for action in actions {
            let result = match action {
                Action::TransformChanged(_) => web::apply_transform(&self.world, &self.engine.borrow().transform()),
                Action::WorldResized { width, height } => web::size_world(&self.world, *width, *height),
                _ => Ok(()),
            };
            if let Err(e) = result {
                tracing::warn!(error = %e, "failed to update world element");
            }
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        // The closure must outlive any frame the browser could still run.
        self.stop();
        self.callback.borrow_mut().take();
    }
}

fn frame(engine: &Rc<RefCell<Engine<WebSurface>>>) {
    let Ok(mut engine) = engine.try_borrow_mut() else {
        // A handler still holds the engine; try again next frame.
        return;
    };
    let started = js_sys::Date::now();
    match engine.tick() {
        Ok(true) => {
            let stats = engine.stats();
            tracing::trace!(ms = js_sys::Date::now() - started, full = stats.full, "frame rendered");
        }
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "frame render failed"),
    }
}
