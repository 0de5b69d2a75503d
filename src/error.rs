//! Error types for the renderer glue.
//!
//! The wave and shading kernels are total functions and never fail; everything here
//! comes from device setup, frame capture or user input.

use thiserror::Error;

/// Failures while bringing up or driving the GPU
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(String),

    #[error("could not acquire frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),

    #[error("no suitable GPU adapter found")]
    Adapter,

    #[error("device error: {0}")]
    Device(String),

    #[error("frame capture failed: {0}")]
    Capture(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub fn surface<T: ToString>(msg: T) -> Self {
        RenderError::Surface(msg.to_string())
    }

    pub fn device<T: ToString>(msg: T) -> Self {
        RenderError::Device(msg.to_string())
    }

    pub fn capture<T: ToString>(msg: T) -> Self {
        RenderError::Capture(msg.to_string())
    }
}

/// Rejected `#rrggbb` input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("expected 6 hex digits, got '{0}'")]
    Length(String),

    #[error("invalid hex digit in '{0}'")]
    Digit(String),
}
