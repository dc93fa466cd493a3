//! Primitive rasterization against a [`Framebuffer`].
//!
//! Every draw call is atomic and stateless beyond reading and writing the
//! target framebuffer's planes under its current flags. Primitives take
//! positions in normalized coordinates (`[0,1] x [0,1]`, origin top-left)
//! and clip silently: the contract is "never write outside the buffer",
//! not "reject malformed input". Only the indexed batch path reports an
//! error, because a bad index means the caller's data is corrupt.
//!
//! Coverage for convex polygons and triangles comes from one shared
//! scanline-span computation, so a constant-color orthographic triangle
//! fills exactly the same pixel set as the equivalent 3-point polygon.

mod primitives;
mod triangle;

use std::error::Error;
use std::fmt;

use crate::color::Rgba;
use crate::math::{Vec2, Vec3};

/// A triangle/mesh vertex: position, texture coordinate, color.
///
/// The texture coordinate is carried through the pipeline untouched
/// (texturing is out of scope for this engine); color is interpolated
/// across the triangle, perspective-correctly when the perspective flag
/// is set. Vertices are value data, copied into interpolation state per
/// draw call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub uv: Vec2,
    pub color: Rgba,
}

impl Vertex {
    pub const fn new(position: Vec3, uv: Vec2, color: Rgba) -> Self {
        Self {
            position,
            uv,
            color,
        }
    }
}

/// An index in a triangle batch referenced a vertex that does not exist.
///
/// This is reported (rather than silently clipped) because an out-of-range
/// index indicates corrupt caller data, not out-of-view geometry. The whole
/// batch is rejected before any pixel is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundsError {
    /// The offending index value.
    pub index: u32,
    /// Length of the vertex array it was checked against.
    pub len: usize,
}

impl fmt::Display for BoundsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mesh index {} out of range for {} vertices",
            self.index, self.len
        )
    }
}

impl Error for BoundsError {}

/// Signed parallelogram area of edge (a -> b) against point p; the 2D cross
/// product `(b - a) x (p - a)`. Zero means p lies on the edge's line.
#[inline]
pub(crate) fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)
}

/// Computes the filled span of a convex polygon on the scanline through
/// `yc`, in pixel-space coordinates.
///
/// Walks every edge, collects the crossings with the scanline using a
/// half-open rule (so shared vertices are not counted twice), and returns
/// the leftmost/rightmost crossing. Horizontal edges never cross and are
/// skipped. Returns `None` when the scanline misses the polygon.
pub(crate) fn span_at(points: &[Vec2], yc: f32) -> Option<(f32, f32)> {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    let n = points.len();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        if (a.y <= yc) != (b.y <= yc) {
            let t = (yc - a.y) / (b.y - a.y);
            let x = a.x + (b.x - a.x) * t;
            lo = lo.min(x);
            hi = hi.max(x);
        }
    }
    (lo <= hi).then_some((lo, hi))
}

/// Inclusive pixel x-range whose centers fall inside `[lo, hi]`.
///
/// Pixel x covers center `x + 0.5`, so the first covered pixel is
/// `ceil(lo - 0.5)` and the last is `floor(hi - 0.5)`. An empty range means
/// the span fell between two pixel centers.
#[inline]
pub(crate) fn pixel_range(lo: f32, hi: f32) -> (i32, i32) {
    ((lo - 0.5).ceil() as i32, (hi - 0.5).floor() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_function_sign_tracks_winding() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(4.0, 0.0);
        // Positive for a point below the edge (y-down screen space).
        assert!(edge_function(a, b, Vec2::new(2.0, 2.0)) > 0.0);
        assert!(edge_function(a, b, Vec2::new(2.0, -2.0)) < 0.0);
        assert_eq!(edge_function(a, b, Vec2::new(2.0, 0.0)), 0.0);
    }

    #[test]
    fn span_at_finds_triangle_extent() {
        let tri = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 10.0),
        ];
        let (lo, hi) = span_at(&tri, 5.0).unwrap();
        assert_eq!(lo, 0.0);
        assert_eq!(hi, 5.0);
        assert!(span_at(&tri, 11.0).is_none());
        assert!(span_at(&tri, -1.0).is_none());
    }

    #[test]
    fn pixel_range_uses_centers() {
        // Span [0.0, 5.0] covers centers 0.5..=4.5 -> pixels 0..=4.
        assert_eq!(pixel_range(0.0, 5.0), (0, 4));
        // Span narrower than a pixel and between centers covers nothing.
        let (start, end) = pixel_range(0.6, 0.9);
        assert!(start > end);
    }
}
