//! `DeviceOrientationEvent.requestPermission` where the platform has it.

use crate::backend::WeakSession;
use backdrop_core::{BackdropError, ListenerKind, PermissionRequirement, Result};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

fn request_fn(window: &web::Window) -> Option<(JsValue, js_sys::Function)> {
    let ctor = js_sys::Reflect::get(window, &JsValue::from_str("DeviceOrientationEvent")).ok()?;
    if ctor.is_undefined() || ctor.is_null() {
        return None;
    }
    let f = js_sys::Reflect::get(&ctor, &JsValue::from_str("requestPermission")).ok()?;
    f.dyn_into::<js_sys::Function>().ok().map(|f| (ctor, f))
}

pub fn requirement(window: &web::Window) -> PermissionRequirement {
    if request_fn(window).is_some() {
        PermissionRequirement::UserGesture
    } else {
        PermissionRequirement::Unrestricted
    }
}

fn prompt_err(reason: String) -> BackdropError {
    BackdropError::Listener {
        kind: ListenerKind::Orientation,
        reason,
    }
}

/// Start the prompt. Must run inside the click handler; the answer is
/// delivered to the session once the promise settles.
pub fn request(window: &web::Window, session: WeakSession) -> Result<()> {
    let (ctor, f) = request_fn(window).ok_or_else(|| prompt_err("requestPermission missing".into()))?;
    let promise: js_sys::Promise = f
        .call0(&ctor)
        .map_err(|e| prompt_err(format!("{e:?}")))?
        .dyn_into()
        .map_err(|_| prompt_err("requestPermission did not return a promise".into()))?;

    spawn_local(async move {
        let granted = match JsFuture::from(promise).await {
            Ok(answer) => answer.as_string().as_deref() == Some("granted"),
            Err(e) => {
                log::warn!("[permission] prompt rejected: {e:?}");
                false
            }
        };
        let Some(s) = session.upgrade() else {
            return;
        };
        match s.try_borrow_mut() {
            Ok(mut s) => s.on_permission_result(granted),
            Err(_) => log::warn!("[permission] session busy; answer dropped"),
        };
    });
    Ok(())
}
