//! Browser implementation of the session backend.
//!
//! WebGPU initialisation is asynchronous while the session lifecycle is
//! not, so the renderer lives in a shared [`GpuSlot`]: meshes handed over by
//! `prepare` wait in `Pending` until the device arrives, frames before that
//! draw nothing, and a device that arrives after teardown is destroyed on
//! the spot.

use crate::affordance;
use crate::dom::{self, surface_err};
use crate::events::ListenerSet;
use crate::frame::FrameLoop;
use crate::permission;
use crate::render::{GpuState, MeshUpload};
use backdrop_core::{
    Backend, BackdropError, DrawFrame, ListenerKind, NodeId, PermissionRequirement, Result, Scene,
    Session, Viewport,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

pub type SharedSession = Rc<RefCell<Session<WebBackend>>>;
pub type WeakSession = Weak<RefCell<Session<WebBackend>>>;

enum GpuSlot {
    Idle,
    Pending(Vec<MeshUpload>),
    Ready(GpuState),
    Failed,
    Released,
}

pub struct WebBackend {
    window: web::Window,
    document: web::Document,
    target: web::Element,
    canvas: Option<web::HtmlCanvasElement>,
    affordance: Option<web::HtmlButtonElement>,
    listeners: ListenerSet,
    frame: FrameLoop,
    gpu: Rc<RefCell<GpuSlot>>,
    session: WeakSession,
}

impl WebBackend {
    pub fn new(target: web::Element) -> Option<Self> {
        let (window, document) = dom::window_document()?;
        Some(Self {
            window,
            document,
            target,
            canvas: None,
            affordance: None,
            listeners: ListenerSet::default(),
            frame: FrameLoop::default(),
            gpu: Rc::new(RefCell::new(GpuSlot::Idle)),
            session: Weak::new(),
        })
    }

    /// Give callbacks a way back to the owning session.
    pub fn bind(&mut self, session: WeakSession) {
        self.session = session;
    }

    fn affordance(&mut self) -> Result<&web::HtmlButtonElement> {
        if self.affordance.is_none() {
            self.affordance = Some(affordance::create(&self.document, &self.target)?);
        }
        self.affordance
            .as_ref()
            .ok_or_else(|| BackdropError::Surface("affordance missing".into()))
    }

    fn spawn_gpu_init(&self, canvas: web::HtmlCanvasElement) {
        let slot = self.gpu.clone();
        spawn_local(async move {
            let result = GpuState::new(canvas).await;
            let mut slot = slot.borrow_mut();
            let previous = std::mem::replace(&mut *slot, GpuSlot::Failed);
            *slot = match (previous, result) {
                (GpuSlot::Pending(uploads), Ok(mut gpu)) => {
                    gpu.upload_all(&uploads);
                    GpuSlot::Ready(gpu)
                }
                (GpuSlot::Pending(_), Err(e)) => {
                    log::error!("[gpu] WebGPU init error: {e:?}");
                    GpuSlot::Failed
                }
                (previous, Ok(gpu)) => {
                    log::info!("[gpu] device arrived after teardown; discarding");
                    gpu.release();
                    previous
                }
                (previous, Err(e)) => {
                    log::debug!("[gpu] late init error ignored: {e:?}");
                    previous
                }
            };
        });
    }
}

impl Backend for WebBackend {
    fn target_available(&self) -> bool {
        self.target.is_connected()
    }

    fn viewport(&self) -> Viewport {
        dom::read_viewport(&self.window)
    }

    fn permission_requirement(&self) -> PermissionRequirement {
        permission::requirement(&self.window)
    }

    fn attach_surface(&mut self, viewport: &Viewport) -> Result<()> {
        let canvas = dom::create_canvas(&self.document, viewport.physical_size())?;
        self.target
            .append_child(&canvas)
            .map_err(|e| surface_err("append canvas", e))?;
        *self.gpu.borrow_mut() = GpuSlot::Pending(Vec::new());
        self.spawn_gpu_init(canvas.clone());
        self.canvas = Some(canvas);
        Ok(())
    }

    fn prepare(&mut self, scene: &Scene) -> Result<()> {
        let mut uploads = Vec::new();
        scene.root.visit(&mut |node| {
            if let Some(mesh) = &node.mesh {
                uploads.push(MeshUpload {
                    node: node.id,
                    mesh: mesh.clone(),
                    material: node.material,
                });
            }
        });
        match &mut *self.gpu.borrow_mut() {
            GpuSlot::Pending(pending) => *pending = uploads,
            GpuSlot::Ready(gpu) => gpu.upload_all(&uploads),
            _ => return Err(BackdropError::Gpu("no surface to prepare".into())),
        }
        Ok(())
    }

    fn attach_listener(&mut self, kind: ListenerKind) -> Result<()> {
        let target: web::EventTarget = match kind {
            ListenerKind::PermissionClick => self.affordance()?.clone().into(),
            _ => self.window.clone().into(),
        };
        self.listeners.attach(kind, target, self.session.clone())
    }

    fn detach_listener(&mut self, kind: ListenerKind) -> Result<()> {
        self.listeners.detach(kind)
    }

    fn set_affordance_visible(&mut self, visible: bool) -> Result<()> {
        if !visible && self.affordance.is_none() {
            return Ok(());
        }
        affordance::set_visible(self.affordance()?, visible);
        Ok(())
    }

    fn request_permission(&mut self) -> Result<()> {
        permission::request(&self.window, self.session.clone())
    }

    fn request_frame(&mut self) -> Result<()> {
        self.frame.request(&self.window, &self.session)
    }

    fn cancel_frame(&mut self) -> Result<()> {
        self.frame.cancel(&self.window)
    }

    fn resize_surface(&mut self, width: u32, height: u32) -> Result<()> {
        let canvas = self
            .canvas
            .as_ref()
            .ok_or_else(|| BackdropError::Surface("no canvas".into()))?;
        dom::set_backing_size(canvas, (width, height));
        if let GpuSlot::Ready(gpu) = &mut *self.gpu.borrow_mut() {
            gpu.resize(width, height);
        }
        Ok(())
    }

    fn upload_vertices(&mut self, node: NodeId, positions: &[[f32; 3]]) -> Result<()> {
        if let GpuSlot::Ready(gpu) = &*self.gpu.borrow() {
            gpu.write_positions(node, positions);
        }
        Ok(())
    }

    fn draw(&mut self, frame: &DrawFrame<'_>) -> Result<()> {
        match &mut *self.gpu.borrow_mut() {
            GpuSlot::Ready(gpu) => gpu
                .render(frame)
                .map_err(|e| BackdropError::Gpu(e.to_string())),
            GpuSlot::Failed => Err(BackdropError::Gpu("WebGPU unavailable".into())),
            _ => Ok(()),
        }
    }

    fn release_gpu(&mut self) -> Result<()> {
        let previous = std::mem::replace(&mut *self.gpu.borrow_mut(), GpuSlot::Released);
        if let GpuSlot::Ready(gpu) = previous {
            gpu.release();
        }
        Ok(())
    }

    fn detach_surface(&mut self) -> Result<()> {
        if let Some(button) = self.affordance.take() {
            button.remove();
        }
        let canvas = self
            .canvas
            .take()
            .ok_or_else(|| BackdropError::Surface("canvas already detached".into()))?;
        if canvas.parent_node().is_none() {
            return Err(BackdropError::Surface("canvas removed by someone else".into()));
        }
        canvas.remove();
        Ok(())
    }
}
