//! Error types for lab startup.
//!
//! The simulation itself cannot fail; everything here comes from the
//! browser environment or GPU initialisation.

use thiserror::Error;

/// Errors that can occur while bringing the lab up.
#[derive(Debug, Error)]
pub enum LabError {
    /// A required DOM node or browser object is missing.
    #[error("Missing DOM element or browser object: {0}")]
    MissingElement(&'static str),
    /// An element exists but has the wrong type.
    #[error("Element #{0} has an unexpected type")]
    WrongElementType(&'static str),
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// Logger was already initialised.
    #[error("Failed to initialise logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}
