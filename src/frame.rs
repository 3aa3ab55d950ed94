use crate::backend::WeakSession;
use backdrop_core::{BackdropError, Result};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// `requestAnimationFrame` driver. The callback is created on first use and
/// reused for every frame until [`FrameLoop::cancel`].
#[derive(Default)]
pub struct FrameLoop {
    callback: Option<Closure<dyn FnMut()>>,
    pending: Option<i32>,
}

impl FrameLoop {
    pub fn request(&mut self, window: &web::Window, session: &WeakSession) -> Result<()> {
        let callback = self.callback.get_or_insert_with(|| {
            let session = session.clone();
            Closure::wrap(Box::new(move || {
                let Some(s) = session.upgrade() else {
                    return;
                };
                match s.try_borrow_mut() {
                    Ok(mut s) => s.on_frame(),
                    Err(_) => log::warn!("[frame] session busy; loop dropped a frame"),
                };
            }) as Box<dyn FnMut()>)
        });
        let id = window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|e| BackdropError::Schedule(format!("{e:?}")))?;
        self.pending = Some(id);
        Ok(())
    }

    /// Cancel the pending frame, if any, and drop the callback.
    pub fn cancel(&mut self, window: &web::Window) -> Result<()> {
        let result = match self.pending.take() {
            Some(id) => window
                .cancel_animation_frame(id)
                .map_err(|e| BackdropError::Schedule(format!("{e:?}"))),
            None => Ok(()),
        };
        self.callback = None;
        result
    }
}
