//! The perspective-aware triangle primitive and the indexed batch path.
//!
//! Projection is driven entirely by the framebuffer's flags:
//!
//! - `perspective` set: each vertex is divided by its (sign-adjusted) z and
//!   the result mapped from `[-1, 1]` into normalized buffer space; color
//!   is interpolated perspective-correctly (`attr/z` linearly in screen
//!   space, divided by the interpolated `1/z`). A vertex at or behind
//!   z = 0 skips the whole triangle, the basic near-plane rule.
//! - `perspective` unset: the vertex x/y are already normalized buffer
//!   coordinates, exactly like the 2D primitives, and attributes
//!   interpolate linearly in screen space. z still feeds the depth test.
//!
//! Fragment depth follows the framebuffer's nearness convention
//! (see [`crate::framebuffer`]): `1/z` under perspective, `-z` otherwise.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::math::Vec2;

use super::{edge_function, pixel_range, span_at, BoundsError, Vertex};

/// A vertex after projection: screen position in pixels, nearness for the
/// depth test, and the attribute weight (1/z under perspective, 1 otherwise).
#[derive(Clone, Copy)]
struct Projected {
    screen: Vec2,
    nearness: f32,
    weight: f32,
}

impl Framebuffer {
    /// Draws one triangle under the current drawing-mode flags.
    ///
    /// Degenerate (zero-area) triangles and, under perspective, triangles
    /// with a vertex at or behind the eye plane write nothing. Coverage is
    /// determined per scanline with the same span computation as
    /// [`draw_polygon`](Framebuffer::draw_polygon), so an orthographic
    /// constant-color triangle and the 3-point polygon fill are
    /// pixel-identical.
    pub fn draw_triangle(&mut self, v0: Vertex, v1: Vertex, v2: Vertex) {
        let Some([p0, p1, p2]) = self.project([v0, v1, v2]) else {
            return;
        };

        let area = edge_function(p0.screen, p1.screen, p2.screen);
        if area.abs() < f32::EPSILON {
            return; // Degenerate triangle
        }
        let inv_area = 1.0 / area;

        let pts = [p0.screen, p1.screen, p2.screen];
        let y_lo = pts.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let y_hi = pts.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        let (y_start, y_end) = pixel_range(y_lo, y_hi);
        let y_start = y_start.max(0);
        let y_end = y_end.min(self.height() as i32 - 1);

        let colors = [v0.color, v1.color, v2.color];
        for y in y_start..=y_end {
            let yc = y as f32 + 0.5;
            let Some((lo, hi)) = span_at(&pts, yc) else {
                continue;
            };
            let (x_start, x_end) = pixel_range(lo, hi);
            for x in x_start.max(0)..=x_end.min(self.width() as i32 - 1) {
                let pc = Vec2::new(x as f32 + 0.5, yc);

                // Barycentric coordinates from the edge functions. Signed
                // division by the signed area keeps them positive inside
                // the triangle for either winding.
                let lambda = [
                    edge_function(p1.screen, p2.screen, pc) * inv_area,
                    edge_function(p2.screen, p0.screen, pc) * inv_area,
                    edge_function(p0.screen, p1.screen, pc) * inv_area,
                ];

                // Nearness (1/z or -z) interpolates linearly in screen
                // space in both projection modes.
                let nearness = lambda[0] * p0.nearness
                    + lambda[1] * p1.nearness
                    + lambda[2] * p2.nearness;

                let color = interpolate_color(&colors, &[p0, p1, p2], lambda);
                self.put_fragment(x, y, nearness, color);
            }
        }
    }

    /// Draws a batch of indexed triangles, one per `[u32; 3]` triple, in
    /// array order.
    ///
    /// Every index is validated against the vertex array before any pixel
    /// is written: a single out-of-range index rejects the whole batch with
    /// [`BoundsError`] and the framebuffer is left untouched. Draw order
    /// only matters for depth-test ties (later triangles win) and blending
    /// order; the batch is never sorted.
    pub fn draw_triangles(
        &mut self,
        vertices: &[Vertex],
        indices: &[[u32; 3]],
    ) -> Result<(), BoundsError> {
        let len = vertices.len();
        for triple in indices {
            for &index in triple {
                if index as usize >= len {
                    return Err(BoundsError { index, len });
                }
            }
        }
        for [a, b, c] in indices {
            self.draw_triangle(
                vertices[*a as usize],
                vertices[*b as usize],
                vertices[*c as usize],
            );
        }
        Ok(())
    }

    /// Projects three vertices to screen space under the current flags.
    /// Returns `None` when the perspective near-plane rule rejects the
    /// triangle.
    fn project(&self, vertices: [Vertex; 3]) -> Option<[Projected; 3]> {
        let flags = self.flags();
        let (w, h) = (self.width() as f32, self.height() as f32);

        let mut out = [Projected {
            screen: Vec2::ZERO,
            nearness: 0.0,
            weight: 1.0,
        }; 3];

        for (slot, v) in out.iter_mut().zip(vertices) {
            let z = if flags.negate_z {
                -v.position.z
            } else {
                v.position.z
            };

            let (nx, ny, nearness, weight) = if flags.perspective {
                if z <= 0.0 {
                    return None; // At or behind the eye plane.
                }
                let inv_z = 1.0 / z;
                (
                    (v.position.x * inv_z + 1.0) * 0.5,
                    (v.position.y * inv_z + 1.0) * 0.5,
                    inv_z,
                    inv_z,
                )
            } else {
                (v.position.x, v.position.y, -z, 1.0)
            };

            *slot = Projected {
                screen: Vec2::new(nx * w, ny * h),
                nearness,
                weight,
            };
        }
        Some(out)
    }
}

/// Interpolates vertex colors at barycentric coordinates `lambda`.
///
/// Each color is pre-multiplied by its vertex weight (1/z under
/// perspective), interpolated linearly, then divided by the interpolated
/// weight. With orthographic weights of 1 this reduces to plain
/// barycentric interpolation.
fn interpolate_color(colors: &[Rgba; 3], proj: &[Projected; 3], lambda: [f32; 3]) -> Rgba {
    let w = lambda[0] * proj[0].weight + lambda[1] * proj[1].weight + lambda[2] * proj[2].weight;
    let mut acc = [0.0f32; 4];
    for i in 0..3 {
        let scale = lambda[i] * proj[i].weight;
        acc[0] += colors[i].r * scale;
        acc[1] += colors[i].g * scale;
        acc[2] += colors[i].b * scale;
        acc[3] += colors[i].a * scale;
    }
    Rgba::new(acc[0] / w, acc[1] / w, acc[2] / w, acc[3] / w)
}
