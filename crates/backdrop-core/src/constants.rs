// Shared visual tuning constants. These are defaults; `BackdropConfig`
// overrides any of them per mount.

// Camera
pub const CAMERA_FOV_DEG: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_Z: f32 = 5.0; // eye distance from the origin along +Z

// Orientation-driven camera tilt (radians per degree of device tilt)
pub const ORIENTATION_TILT_SCALE: f32 = 0.001;

// Pointer parallax
pub const PARALLAX_INFLUENCE: f32 = 0.02; // fraction of the remaining gap closed per frame
pub const PARALLAX_DECAY: f32 = 0.1; // pull of the current offset back toward rest

// Placement region for generated objects
pub const PLACEMENT_MIN: [f32; 3] = [-10.0, -8.0, -18.0];
pub const PLACEMENT_MAX: [f32; 3] = [10.0, 8.0, -8.0];
pub const PLACEMENT_MIN_DISTANCE: f32 = 6.0;
pub const PLACEMENT_MAX_RETRIES: u32 = 32;

// Fabric grid height field: sin(t*k1 + x*k2) * cos(t*k3 + y*k4) * amplitude
pub const FABRIC_K1: f32 = 2.0;
pub const FABRIC_K2: f32 = 0.5;
pub const FABRIC_K3: f32 = 1.5;
pub const FABRIC_K4: f32 = 0.3;
pub const FABRIC_AMPLITUDE: f32 = 2.0;
pub const FABRIC_SIZE: f32 = 20.0;
pub const FABRIC_SEGMENTS: u32 = 32;
pub const FABRIC_POSITION: [f32; 3] = [0.0, 0.0, -20.0];

// Particle stream
pub const PARTICLE_COUNT: usize = 200;
pub const PARTICLE_SPREAD: f32 = 25.0; // half-extent across the stream axis
pub const PARTICLE_NEAR_BOUNDARY: [f32; 2] = [-50.0, -40.0]; // spawn range along +Z
pub const PARTICLE_FAR_THRESHOLD: f32 = 6.0; // just behind the camera
pub const PARTICLE_VELOCITY: [f32; 2] = [0.02, 0.08]; // units per frame
pub const PARTICLE_SIZE: f32 = 0.1;
pub const MAX_PARTICLES: usize = 5_000;

// Mesh resolution for the parametric generators
pub const SURFACE_SEGMENTS: u32 = 32;
pub const MAX_SURFACE_SEGMENTS: u32 = 256; // keeps (m + 1) * (n + 1) well inside u32 indices


// Palette (sRGB hex / 255)
pub const INDIGO: [f32; 3] = [0.388, 0.400, 0.945];
pub const DEEP_INDIGO: [f32; 3] = [0.310, 0.275, 0.898];
pub const AMBER: [f32; 3] = [0.984, 0.749, 0.141];
pub const AMBIENT_BLUE: [f32; 3] = [0.165, 0.165, 0.361];
