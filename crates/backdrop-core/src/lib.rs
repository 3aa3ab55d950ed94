//! Platform-free core of the animated page backdrop: procedural geometry,
//! scene graph, input aggregation, per-frame animation and the mount-scoped
//! session that drives a rendering backend.

pub mod animation;
pub mod camera;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod input;
pub mod motion;
pub mod particles;
pub mod permission;
pub mod placement;
pub mod scene;
pub mod session;

pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");

pub use camera::{Camera, Viewport};
pub use config::BackdropConfig;
pub use error::{BackdropError, Result};
pub use geometry::{GeneratorRegistry, Mesh, Topology};
pub use input::{InputState, Orientation};
pub use permission::{PermissionRequirement, PermissionState};
pub use scene::{DrawItem, MaterialKind, NodeId, Scene};
pub use session::{Backend, DrawFrame, ListenerKind, LoopState, Session, TeardownReport};
