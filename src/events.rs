//! DOM listener registrations owned by one mounted backdrop.
//!
//! Each callback holds only a weak handle to its session, so a listener
//! that outlives its session (it never should) does nothing.

use crate::backend::WeakSession;
use backdrop_core::{BackdropError, ListenerKind, Result};
use smallvec::SmallVec;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn event_name(kind: ListenerKind) -> &'static str {
    match kind {
        ListenerKind::PointerMove => "pointermove",
        ListenerKind::Resize => "resize",
        ListenerKind::Orientation => "deviceorientation",
        ListenerKind::PermissionClick => "click",
    }
}

struct Listener {
    kind: ListenerKind,
    target: web::EventTarget,
    callback: Closure<dyn FnMut(web::Event)>,
}

#[derive(Default)]
pub struct ListenerSet {
    entries: SmallVec<[Listener; 4]>,
}

impl ListenerSet {
    pub fn attach(
        &mut self,
        kind: ListenerKind,
        target: web::EventTarget,
        session: WeakSession,
    ) -> Result<()> {
        if self.entries.iter().any(|l| l.kind == kind) {
            return Ok(());
        }
        let callback = Closure::wrap(
            Box::new(move |ev: web::Event| dispatch(kind, &session, ev)) as Box<dyn FnMut(web::Event)>
        );
        target
            .add_event_listener_with_callback(event_name(kind), callback.as_ref().unchecked_ref())
            .map_err(|e| BackdropError::Listener {
                kind,
                reason: format!("{e:?}"),
            })?;
        self.entries.push(Listener {
            kind,
            target,
            callback,
        });
        Ok(())
    }

    /// Remove the registration; the closure is dropped only after the
    /// browser no longer references it.
    pub fn detach(&mut self, kind: ListenerKind) -> Result<()> {
        let Some(i) = self.entries.iter().position(|l| l.kind == kind) else {
            return Err(BackdropError::Listener {
                kind,
                reason: "not registered".into(),
            });
        };
        let listener = self.entries.remove(i);
        listener
            .target
            .remove_event_listener_with_callback(
                event_name(kind),
                listener.callback.as_ref().unchecked_ref(),
            )
            .map_err(|e| BackdropError::Listener {
                kind,
                reason: format!("{e:?}"),
            })
    }
}

fn dispatch(kind: ListenerKind, session: &WeakSession, ev: web::Event) {
    let Some(session) = session.upgrade() else {
        return;
    };
    let Ok(mut s) = session.try_borrow_mut() else {
        log::debug!("[input] {kind:?} arrived while session busy; dropped");
        return;
    };
    match kind {
        ListenerKind::PointerMove => {
            if let Some(ev) = ev.dyn_ref::<web::MouseEvent>() {
                s.on_pointer_move(ev.client_x() as f32, ev.client_y() as f32);
            }
        }
        ListenerKind::Resize => s.on_resize(),
        ListenerKind::Orientation => {
            if let Some(ev) = ev.dyn_ref::<web::DeviceOrientationEvent>() {
                s.on_orientation(ev.alpha(), ev.beta(), ev.gamma());
            }
        }
        ListenerKind::PermissionClick => s.on_permission_click(),
    }
}
