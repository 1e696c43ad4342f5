//! WebGPU rendering module
//!
//! The lab is ray traced in a single fragment shader; the camera and
//! palette are shared with the DOM label overlay.

pub mod camera;
pub mod palette;
pub mod scene_pipeline;

pub use camera::OrbitCamera;
pub use scene_pipeline::SceneRenderState;
