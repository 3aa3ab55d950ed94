#![cfg(target_arch = "wasm32")]
//! WASM entry points: `mount` an animated backdrop into a page element and
//! tear it down through the returned handle.

use backdrop_core::{GeneratorRegistry, LoopState, Session};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys as web;

mod affordance;
mod backend;
mod dom;
mod events;
mod frame;
mod options;
mod permission;
mod render;

use backend::{SharedSession, WebBackend};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    _ = console_log::init_with_level(log::Level::Info);
    log::info!("backdrop module loaded");
}

fn config_json(config: &JsValue) -> Option<String> {
    if config.is_undefined() || config.is_null() {
        return None;
    }
    match js_sys::JSON::stringify(config) {
        Ok(text) => Some(String::from(text)),
        Err(e) => {
            log::warn!("[mount] config not serialisable: {e:?}");
            None
        }
    }
}

/// Mount a backdrop as the first layer inside `target`. Returns `undefined`
/// when `target` is not attached to the document or bootstrap fails; in the
/// latter case nothing is left behind.
#[wasm_bindgen]
pub fn mount(target: web::Element, config: JsValue) -> Option<BackdropHandle> {
    let config = options::parse_config(config_json(&config).as_deref());
    let backend = WebBackend::new(target)?;
    let registry = GeneratorRegistry::with_defaults();
    let session: SharedSession = Rc::new(RefCell::new(Session::new(backend, config, &registry)?));
    session
        .borrow_mut()
        .backend_mut()
        .bind(Rc::downgrade(&session));

    let started = session.borrow_mut().start();
    match started {
        Ok(()) => Some(BackdropHandle { session }),
        Err(e) => {
            log::error!("[mount] {e}");
            None
        }
    }
}

/// Owning handle for one mounted backdrop. Dropping it (`free()` from JS)
/// tears the backdrop down as well.
#[wasm_bindgen]
pub struct BackdropHandle {
    session: SharedSession,
}

#[wasm_bindgen]
impl BackdropHandle {
    /// Stop the loop and release every listener, the GPU device and the
    /// canvas. Returns `true` when every step succeeded; calling it again
    /// is a no-op that returns `true`.
    pub fn teardown(&self) -> bool {
        match self.session.try_borrow_mut() {
            Ok(mut s) => s.teardown().is_clean(),
            Err(_) => {
                log::warn!("[teardown] session busy; retry after the current callback");
                false
            }
        }
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.session
            .try_borrow()
            .map(|s| s.state() == LoopState::Running)
            .unwrap_or(false)
    }
}
