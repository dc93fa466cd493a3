//! A CPU-side 2D/3D rasterization engine.
//!
//! This crate draws points, lines, convex polygons, quadratic Bezier curves
//! and perspective-projected triangle meshes directly into an in-memory
//! [`Framebuffer`], with optional depth testing and alpha compositing. SDL2
//! is used only to present the finished buffer on screen; all rasterization
//! happens in software.
//!
//! # Quick Start
//!
//! ```ignore
//! use rastr::prelude::*;
//!
//! let mut fb = Framebuffer::new(1280, 720, 3)?;
//! fb.fill(Rgba::BLACK);
//! fb.draw_polygon(
//!     &[Vec2::new(0.3, 0.6), Vec2::new(0.6, 0.7), Vec2::new(0.7, 0.3)],
//!     Rgba::new(0.1, 0.3, 0.7, 1.0),
//! );
//! export::write_ppm(&fb, "image.ppm")?;
//! ```

// Public API - exposed to library consumers
pub mod color;
pub mod export;
pub mod framebuffer;
pub mod math;
pub mod mesh;
pub mod raster;
pub mod window;

// Re-export commonly needed types at crate root for convenience
pub use color::Rgba;
pub use framebuffer::{BufferError, DrawFlags, Framebuffer};
pub use mesh::{LoadError, Mesh, Vertex};
pub use raster::BoundsError;

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use rastr::prelude::*;
/// ```
pub mod prelude {
    // Color
    pub use crate::color::Rgba;

    // Framebuffer
    pub use crate::framebuffer::{BufferError, DrawFlags, Framebuffer};

    // Mesh
    pub use crate::mesh::{LoadError, Mesh, Vertex};

    // Rasterizer
    pub use crate::raster::BoundsError;

    // Math
    pub use crate::math::vec2::Vec2;
    pub use crate::math::vec3::Vec3;

    // Export
    pub use crate::export::{save_image, write_ppm, write_ppm_ascii, ExportError};

    // Window & Input
    pub use crate::window::{FrameLimiter, Signal, Window};
}
