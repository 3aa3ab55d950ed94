// Recording backend shared by the integration tests.

#![allow(dead_code)]

use backdrop_core::scene::NodeId;
use std::cell::Cell;
use std::rc::Rc;
use backdrop_core::{
    Backend, BackdropConfig, BackdropError, DrawFrame, GeneratorRegistry, ListenerKind,
    PermissionRequirement, Result, Scene, Session, Viewport,
};

#[derive(Debug)]
pub struct MockBackend {
    pub available: bool,
    pub viewport: Viewport,
    pub requirement: PermissionRequirement,
    pub listeners: Vec<ListenerKind>,
    pub surface_attached: bool,
    pub gpu_live: bool,
    pub affordance_visible: bool,
    pub frame_pending: bool,
    pub frames_requested: u32,
    pub draws: u32,
    pub uploads: Vec<NodeId>,
    pub resizes: Vec<(u32, u32)>,
    pub permission_requests: u32,
    pub fail_attach: Option<ListenerKind>,
    pub fail_detach: Option<ListenerKind>,
    pub fail_release_gpu: bool,
    pub fail_detach_surface: bool,
    pub fail_request_permission: bool,
    /// Shared so a test can observe teardown after the session is dropped.
    pub releases: Rc<Cell<u32>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            available: true,
            viewport: Viewport::new(800.0, 600.0, 1.0),
            requirement: PermissionRequirement::Unrestricted,
            listeners: Vec::new(),
            surface_attached: false,
            gpu_live: false,
            affordance_visible: false,
            frame_pending: false,
            frames_requested: 0,
            draws: 0,
            uploads: Vec::new(),
            resizes: Vec::new(),
            permission_requests: 0,
            fail_attach: None,
            fail_detach: None,
            fail_release_gpu: false,
            fail_detach_surface: false,
            fail_request_permission: false,
            releases: Rc::new(Cell::new(0)),
        }
    }

    pub fn gated() -> Self {
        Self {
            requirement: PermissionRequirement::UserGesture,
            ..Self::new()
        }
    }

    pub fn has(&self, kind: ListenerKind) -> bool {
        self.listeners.contains(&kind)
    }
}

impl Backend for MockBackend {
    fn target_available(&self) -> bool {
        self.available
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn permission_requirement(&self) -> PermissionRequirement {
        self.requirement
    }

    fn attach_surface(&mut self, _viewport: &Viewport) -> Result<()> {
        self.surface_attached = true;
        Ok(())
    }

    fn prepare(&mut self, _scene: &Scene) -> Result<()> {
        self.gpu_live = true;
        Ok(())
    }

    fn attach_listener(&mut self, kind: ListenerKind) -> Result<()> {
        if self.fail_attach == Some(kind) {
            return Err(BackdropError::Listener {
                kind,
                reason: "refused".into(),
            });
        }
        self.listeners.push(kind);
        Ok(())
    }

    fn detach_listener(&mut self, kind: ListenerKind) -> Result<()> {
        if self.fail_detach == Some(kind) {
            return Err(BackdropError::Listener {
                kind,
                reason: "still registered".into(),
            });
        }
        self.listeners.retain(|k| *k != kind);
        Ok(())
    }

    fn set_affordance_visible(&mut self, visible: bool) -> Result<()> {
        self.affordance_visible = visible;
        Ok(())
    }

    fn request_permission(&mut self) -> Result<()> {
        self.permission_requests += 1;
        if self.fail_request_permission {
            return Err(BackdropError::Listener {
                kind: ListenerKind::PermissionClick,
                reason: "no prompt".into(),
            });
        }
        Ok(())
    }

    fn request_frame(&mut self) -> Result<()> {
        self.frame_pending = true;
        self.frames_requested += 1;
        Ok(())
    }

    fn cancel_frame(&mut self) -> Result<()> {
        self.frame_pending = false;
        Ok(())
    }

    fn resize_surface(&mut self, width: u32, height: u32) -> Result<()> {
        self.resizes.push((width, height));
        Ok(())
    }

    fn upload_vertices(&mut self, node: NodeId, _positions: &[[f32; 3]]) -> Result<()> {
        self.uploads.push(node);
        Ok(())
    }

    fn draw(&mut self, _frame: &DrawFrame<'_>) -> Result<()> {
        self.draws += 1;
        Ok(())
    }

    fn release_gpu(&mut self) -> Result<()> {
        self.gpu_live = false;
        self.releases.set(self.releases.get() + 1);
        if self.fail_release_gpu {
            return Err(BackdropError::Gpu("device lost".into()));
        }
        Ok(())
    }

    fn detach_surface(&mut self) -> Result<()> {
        if self.fail_detach_surface {
            return Err(BackdropError::Surface("already detached".into()));
        }
        self.surface_attached = false;
        Ok(())
    }
}

pub fn small_config() -> BackdropConfig {
    let mut config = BackdropConfig::default();
    config.segments = 8;
    config.particles.count = 16;
    config.seed = Some(42);
    config
}

pub fn session(backend: MockBackend) -> Session<MockBackend> {
    Session::new(backend, small_config(), &GeneratorRegistry::with_defaults())
        .expect("mount target available")
}
