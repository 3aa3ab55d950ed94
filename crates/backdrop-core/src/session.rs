//! Mount-scoped session: owns the scene, camera, input record and loop
//! state for one mounted backdrop, and drives a platform [`Backend`].
//!
//! Lifecycle:
//! - [`Session::new`] checks the mount target and builds the scene. A
//!   missing target is a silent no-op (`None`), nothing is allocated on the
//!   platform side.
//! - [`Session::start`] attaches the surface, uploads the scene, registers
//!   listeners and schedules the first frame. Any failure unwinds whatever
//!   was acquired before returning the error.
//! - Event handlers (`on_*`) feed the input aggregator, resize path and
//!   permission gate. The frame handler advances and draws.
//! - [`Session::teardown`] (also run from `Drop`) stops the loop, removes
//!   every listener, releases the GPU and detaches the surface. Each step
//!   runs even if an earlier one failed.

use crate::animation;
use crate::camera::{Camera, Viewport};
use crate::clock::FrameClock;
use crate::config::BackdropConfig;
use crate::error::{BackdropError, Result};
use crate::geometry::registry::GeneratorRegistry;
use crate::input::{InputAggregator, InputState};
use crate::permission::{GateDecision, PermissionRequirement, PermissionState};
use crate::scene::{DrawItem, LightRig, NodeId, Scene};
use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use smallvec::SmallVec;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    PointerMove,
    Resize,
    /// Device orientation, registered once the permission gate is granted.
    Orientation,
    /// Click on the motion-permission affordance.
    PermissionClick,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Everything the backend needs to draw one frame.
#[derive(Debug)]
pub struct DrawFrame<'a> {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub lights: &'a LightRig,
    pub items: &'a [DrawItem],
    pub time: f32,
}

/// Platform seam. The web crate implements this with DOM listeners, a
/// `requestAnimationFrame` loop and a wgpu renderer; tests use a recorder.
pub trait Backend {
    /// Whether the mount target is attached to a document.
    fn target_available(&self) -> bool;
    fn viewport(&self) -> Viewport;
    fn permission_requirement(&self) -> PermissionRequirement;

    /// Create the output surface as a child of the mount target.
    fn attach_surface(&mut self, viewport: &Viewport) -> Result<()>;
    /// Hand the populated scene to the renderer for buffer creation.
    fn prepare(&mut self, scene: &Scene) -> Result<()>;
    fn attach_listener(&mut self, kind: ListenerKind) -> Result<()>;
    fn detach_listener(&mut self, kind: ListenerKind) -> Result<()>;
    fn set_affordance_visible(&mut self, visible: bool) -> Result<()>;
    /// Start the platform permission prompt. The answer comes back later
    /// through [`Session::on_permission_result`].
    fn request_permission(&mut self) -> Result<()>;
    fn request_frame(&mut self) -> Result<()>;
    fn cancel_frame(&mut self) -> Result<()>;
    /// Resize the backing store, in physical pixels.
    fn resize_surface(&mut self, width: u32, height: u32) -> Result<()>;
    fn upload_vertices(&mut self, node: NodeId, positions: &[[f32; 3]]) -> Result<()>;
    fn draw(&mut self, frame: &DrawFrame<'_>) -> Result<()>;
    fn release_gpu(&mut self) -> Result<()>;
    fn detach_surface(&mut self) -> Result<()>;
}

/// Failures collected while tearing down. Teardown never stops early, so
/// there may be several.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TeardownReport {
    errors: SmallVec<[BackdropError; 4]>,
}

impl TeardownReport {
    fn record(&mut self, step: &'static str, result: Result<()>) {
        if let Err(e) = result {
            log::warn!("[teardown] {step}: {e}");
            self.errors.push(BackdropError::Dispose {
                step,
                reason: e.to_string(),
            });
        }
    }

    #[inline]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    #[inline]
    pub fn errors(&self) -> &[BackdropError] {
        &self.errors
    }
}

pub struct Session<B: Backend> {
    backend: B,
    config: BackdropConfig,
    scene: Scene,
    camera: Camera,
    viewport: Viewport,
    surface_size: (u32, u32),
    input: InputAggregator,
    clock: FrameClock,
    state: LoopState,
    listeners: SmallVec<[ListenerKind; 4]>,
    surface_attached: bool,
    torn_down: bool,
    draws: Vec<DrawItem>,
    dirty: Vec<NodeId>,
    frames: u64,
    draw_failed: bool,
}

impl<B: Backend> Session<B> {
    /// Bootstrap the scene for `backend`'s mount target. Returns `None`
    /// without touching the platform when the target is not available yet.
    pub fn new(backend: B, mut config: BackdropConfig, registry: &GeneratorRegistry) -> Option<Self> {
        if !backend.target_available() {
            log::info!("[mount] target not attached; skipping bootstrap");
            return None;
        }

        for note in config.sanitize(registry) {
            log::warn!("[mount] config: {note}");
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let scene = Scene::build(&config, registry, &mut rng);

        let viewport = backend.viewport();
        let mut camera = config.camera.camera();
        camera.apply_viewport(&viewport);
        let input = InputAggregator::new(backend.permission_requirement());

        log::info!(
            "[mount] scene ready: {} nodes, viewport {}x{} @{}x",
            scene.root.node_count(),
            viewport.width,
            viewport.height,
            viewport.device_pixel_ratio
        );

        Some(Self {
            backend,
            config,
            scene,
            camera,
            surface_size: viewport.physical_size(),
            viewport,
            input,
            clock: FrameClock::new(),
            state: LoopState::Stopped,
            listeners: SmallVec::new(),
            surface_attached: false,
            torn_down: false,
            draws: Vec::new(),
            dirty: Vec::new(),
            frames: 0,
            draw_failed: false,
        })
    }

    /// Acquire platform resources and start the loop. On failure everything
    /// acquired so far is released before the error is returned.
    pub fn start(&mut self) -> Result<()> {
        if self.torn_down {
            return Err(BackdropError::Surface("session already torn down".into()));
        }
        if self.state == LoopState::Running {
            return Ok(());
        }
        match self.acquire() {
            Ok(()) => {
                log::info!("[mount] loop running");
                Ok(())
            }
            Err(e) => {
                log::error!("[mount] bootstrap failed: {e}");
                self.teardown();
                Err(e)
            }
        }
    }

    fn acquire(&mut self) -> Result<()> {
        self.backend.attach_surface(&self.viewport)?;
        self.surface_attached = true;
        self.backend.prepare(&self.scene)?;

        self.attach(ListenerKind::PointerMove)?;
        self.attach(ListenerKind::Resize)?;
        match self.input.gate().decision() {
            GateDecision::ListenNow => self.attach(ListenerKind::Orientation)?,
            GateDecision::AwaitGesture => {
                self.attach(ListenerKind::PermissionClick)?;
                self.backend.set_affordance_visible(true)?;
            }
        }

        self.backend.request_frame()?;
        self.state = LoopState::Running;
        Ok(())
    }

    fn attach(&mut self, kind: ListenerKind) -> Result<()> {
        if self.listeners.contains(&kind) {
            return Ok(());
        }
        self.backend.attach_listener(kind)?;
        self.listeners.push(kind);
        Ok(())
    }

    fn detach(&mut self, kind: ListenerKind) -> Result<()> {
        match self.listeners.iter().position(|k| *k == kind) {
            Some(i) => {
                // stays tracked on failure so teardown tries again
                self.backend.detach_listener(kind)?;
                self.listeners.remove(i);
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub fn on_pointer_move(&mut self, client_x: f32, client_y: f32) {
        if self.torn_down {
            return;
        }
        self.input.on_pointer_move(client_x, client_y, &self.viewport);
    }

    /// Returns whether the sample was applied.
    pub fn on_orientation(&mut self, alpha: Option<f64>, beta: Option<f64>, gamma: Option<f64>) -> bool {
        if self.torn_down {
            return false;
        }
        self.input.on_orientation(alpha, beta, gamma)
    }

    /// Re-read the viewport from the backend and apply it.
    pub fn on_resize(&mut self) {
        if self.torn_down {
            return;
        }
        let viewport = self.backend.viewport();
        self.on_resize_to(viewport);
    }

    /// Apply `viewport` to the camera and surface. Calling it again with the
    /// same dimensions is a no-op.
    pub fn on_resize_to(&mut self, viewport: Viewport) {
        if self.torn_down {
            return;
        }
        self.viewport = viewport;
        self.camera.apply_viewport(&viewport);
        let size = viewport.physical_size();
        if size == self.surface_size {
            return;
        }
        match self.backend.resize_surface(size.0, size.1) {
            Ok(()) => self.surface_size = size,
            Err(e) => log::warn!("[resize] {e}"),
        }
    }

    /// The user activated the permission affordance.
    pub fn on_permission_click(&mut self) {
        if self.torn_down || !self.input.gate_mut().begin_request() {
            return;
        }
        log::info!("[permission] requesting motion access");
        if let Err(e) = self.backend.request_permission() {
            log::warn!("[permission] request failed: {e}");
            self.on_permission_result(false);
        }
    }

    /// The platform answered a permission request. Only a grant retires the
    /// affordance; after a denial it stays up for another attempt.
    pub fn on_permission_result(&mut self, granted: bool) {
        if self.torn_down {
            return;
        }
        let state = self.input.gate_mut().resolve(granted);
        log::info!("[permission] motion access {state:?}");
        if state != PermissionState::Granted {
            return;
        }
        if let Err(e) = self.detach(ListenerKind::PermissionClick) {
            log::warn!("[permission] {e}");
        }
        if let Err(e) = self.backend.set_affordance_visible(false) {
            log::warn!("[permission] {e}");
        }
        if let Err(e) = self.attach(ListenerKind::Orientation) {
            log::warn!("[permission] {e}");
        }
    }

    /// Frame callback: advance to the clock's current time, draw, and
    /// schedule the next frame. Does nothing once stopped.
    pub fn on_frame(&mut self) {
        if self.state != LoopState::Running {
            return;
        }
        let t = self.clock.elapsed_secs();
        self.tick(t);
        if let Err(e) = self.backend.request_frame() {
            log::error!("[frame] {e}; stopping loop");
            self.state = LoopState::Stopped;
        }
    }

    /// Advance and draw at absolute time `t` without scheduling anything.
    /// Ignored unless the loop is running.
    pub fn tick(&mut self, t: f32) {
        if self.state != LoopState::Running {
            return;
        }
        self.dirty.clear();
        animation::advance(
            &mut self.scene,
            &mut self.camera,
            self.input.state(),
            t,
            self.config.camera.tilt_scale,
            &mut self.dirty,
        );

        for id in &self.dirty {
            let Some(mesh) = self.scene.find(*id).and_then(|n| n.mesh.as_ref()) else {
                continue;
            };
            if let Err(e) = self.backend.upload_vertices(*id, &mesh.positions) {
                warn_once(&mut self.draw_failed, &e);
            }
        }

        self.scene.collect_draws(&mut self.draws);
        let frame = DrawFrame {
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(),
            camera_position: self.camera.position,
            lights: &self.scene.lights,
            items: &self.draws,
            time: t,
        };
        match self.backend.draw(&frame) {
            Ok(()) => self.frames += 1,
            Err(e) => warn_once(&mut self.draw_failed, &e),
        }
    }

    /// Stop the loop and release everything this session attached. Safe to
    /// call more than once; later calls return an empty report.
    pub fn teardown(&mut self) -> TeardownReport {
        let mut report = TeardownReport::default();
        if self.torn_down {
            return report;
        }
        self.torn_down = true;
        self.state = LoopState::Stopped;

        report.record("cancel frame", self.backend.cancel_frame());
        for kind in std::mem::take(&mut self.listeners) {
            report.record("detach listener", self.backend.detach_listener(kind));
        }
        report.record("release gpu", self.backend.release_gpu());
        if self.surface_attached {
            self.surface_attached = false;
            report.record("detach surface", self.backend.detach_surface());
        }

        log::info!(
            "[teardown] done after {} frames, {} step(s) failed",
            self.frames,
            report.errors().len()
        );
        report
    }

    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[inline]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    #[inline]
    pub fn input(&self) -> &InputState {
        self.input.state()
    }

    #[inline]
    pub fn permission(&self) -> PermissionState {
        self.input.gate().state()
    }

    #[inline]
    pub fn listeners(&self) -> &[ListenerKind] {
        &self.listeners
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[inline]
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

// Per-frame failures are logged once per mount; a lost device would
// otherwise log on every frame.
fn warn_once(logged: &mut bool, e: &BackdropError) {
    if !*logged {
        *logged = true;
        log::warn!("[gpu] {e}");
    }
}

impl<B: Backend> Drop for Session<B> {
    fn drop(&mut self) {
        if !self.torn_down {
            self.teardown();
        }
    }
}
