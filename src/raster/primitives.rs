//! 2D primitives: points, lines, convex polygons, quadratic Beziers.
//!
//! All inputs are normalized coordinates. These primitives write through
//! [`Framebuffer::put_pixel`], so the alpha flag applies but the depth
//! plane is never consulted; depth testing belongs to the triangle path.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::math::Vec2;

use super::{pixel_range, span_at};

/// Number of line segments a quadratic Bezier is flattened into. A fixed
/// count keeps flattening deterministic and is plenty below 4K resolutions.
const BEZIER_SEGMENTS: u32 = 24;

impl Framebuffer {
    /// Draws a filled disc of the given normalized radius centered at
    /// `center`.
    ///
    /// The disc lives in normalized coordinate space: on a buffer whose
    /// aspect ratio is not 1 it appears elliptical in pixel space.
    /// Out-of-bounds pixels clip silently.
    pub fn draw_point(&mut self, center: Vec2, radius: f32, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let (w, h) = (self.width() as f32, self.height() as f32);

        // Bounding box of the disc in pixel space, clamped to the buffer.
        let x_min = (((center.x - radius) * w).floor() as i32).max(0);
        let x_max = (((center.x + radius) * w).ceil() as i32).min(self.width() as i32 - 1);
        let y_min = (((center.y - radius) * h).floor() as i32).max(0);
        let y_max = (((center.y + radius) * h).ceil() as i32).min(self.height() as i32 - 1);

        let r2 = radius * radius;
        for y in y_min..=y_max {
            for x in x_min..=x_max {
                // Test the pixel center in normalized space.
                let dx = (x as f32 + 0.5) / w - center.x;
                let dy = (y as f32 + 0.5) / h - center.y;
                if dx * dx + dy * dy <= r2 {
                    self.put_pixel(x, y, color);
                }
            }
        }
    }

    /// Draws a 1-pixel-wide line between two normalized endpoints.
    ///
    /// The segment is clipped to the buffer rectangle before scan
    /// conversion; a line fully outside is a no-op. A zero-length segment
    /// draws exactly one pixel, clamped to bounds.
    pub fn draw_line(&mut self, p0: Vec2, p1: Vec2, color: Rgba) {
        let (w, h) = (self.width() as f32, self.height() as f32);
        let a = Vec2::new(p0.x * w, p0.y * h);
        let b = Vec2::new(p1.x * w, p1.y * h);

        // Degenerate segment: single pixel, clamped into the buffer.
        if a == b {
            let x = (a.x.floor() as i32).clamp(0, self.width() as i32 - 1);
            let y = (a.y.floor() as i32).clamp(0, self.height() as i32 - 1);
            self.put_pixel(x, y, color);
            return;
        }

        let Some((a, b)) = clip_segment(a, b, w, h) else {
            return; // Fully outside.
        };

        let x0 = (a.x.floor() as i32).clamp(0, self.width() as i32 - 1);
        let y0 = (a.y.floor() as i32).clamp(0, self.height() as i32 - 1);
        let x1 = (b.x.floor() as i32).clamp(0, self.width() as i32 - 1);
        let y1 = (b.y.floor() as i32).clamp(0, self.height() as i32 - 1);
        self.line_bresenham(x0, y0, x1, y1, color);
    }

    /// Bresenham scan conversion between two in-bounds pixel endpoints.
    ///
    /// Tracks an integer error term against the major axis; when the error
    /// crosses the threshold the walk also steps along the minor axis.
    /// Both steps can fire at once, producing a diagonal move.
    fn line_bresenham(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let x_step = if x0 < x1 { 1 } else { -1 };
        let y_step = if y0 < y1 { 1 } else { -1 };
        let mut err = dx - dy;

        let mut x = x0;
        let mut y = y0;
        loop {
            self.put_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += x_step;
            }
            if e2 < dx {
                err += dx;
                y += y_step;
            }
        }
    }

    /// Fills the convex polygon described by the ordered point list using
    /// a scanline fill.
    ///
    /// The caller guarantees convexity and consistent winding; behavior on
    /// non-convex input is unspecified. Fewer than 3 points is a silent
    /// no-op, matching the fail-silent contract of the 2D primitives.
    pub fn draw_polygon(&mut self, points: &[Vec2], color: Rgba) {
        if points.len() < 3 {
            return;
        }
        let (w, h) = (self.width() as f32, self.height() as f32);
        let pts: Vec<Vec2> = points
            .iter()
            .map(|p| Vec2::new(p.x * w, p.y * h))
            .collect();

        let y_lo = pts.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let y_hi = pts.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        let (y_start, y_end) = pixel_range(y_lo, y_hi);
        let y_start = y_start.max(0);
        let y_end = y_end.min(self.height() as i32 - 1);

        for y in y_start..=y_end {
            let yc = y as f32 + 0.5;
            let Some((lo, hi)) = span_at(&pts, yc) else {
                continue;
            };
            let (x_start, x_end) = pixel_range(lo, hi);
            for x in x_start.max(0)..=x_end.min(self.width() as i32 - 1) {
                self.put_pixel(x, y, color);
            }
        }
    }

    /// Strokes a quadratic Bezier curve from `p0` to `p1` with control
    /// point `ctrl`, flattened into a fixed number of line segments.
    pub fn draw_bezier(&mut self, p0: Vec2, ctrl: Vec2, p1: Vec2, color: Rgba) {
        let mut prev = p0;
        for i in 1..=BEZIER_SEGMENTS {
            let t = i as f32 / BEZIER_SEGMENTS as f32;
            // De Casteljau: lerp the two legs, then lerp between them.
            let q0 = p0.lerp(ctrl, t);
            let q1 = ctrl.lerp(p1, t);
            let point = q0.lerp(q1, t);
            self.draw_line(prev, point, color);
            prev = point;
        }
    }
}

/// Liang-Barsky clip of segment (a -> b) against the pixel rectangle
/// `[0, w) x [0, h)`. Returns the clipped endpoints, or `None` when the
/// segment lies fully outside.
fn clip_segment(a: Vec2, b: Vec2, w: f32, h: f32) -> Option<(Vec2, Vec2)> {
    let d = b - a;
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    // (p, q) per rectangle side: the segment is inside while p*t <= q.
    let checks = [
        (-d.x, a.x),
        (d.x, w - a.x),
        (-d.y, a.y),
        (d.y, h - a.y),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None; // Parallel and outside this side.
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
    }
    if t0 > t1 {
        return None;
    }
    Some((a + d * t0, a + d * t1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(w: u32, h: u32) -> Framebuffer {
        let mut fb = Framebuffer::new(w, h, 3).unwrap();
        fb.fill(Rgba::BLACK);
        fb
    }

    fn lit_pixels(fb: &Framebuffer) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..fb.height() as i32 {
            for x in 0..fb.width() as i32 {
                if fb.pixel(x, y).unwrap() != Rgba::BLACK {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn zero_length_line_draws_exactly_one_pixel() {
        let mut fb = buffer(8, 8);
        let p = Vec2::new(0.5, 0.5);
        fb.draw_line(p, p, Rgba::WHITE);
        assert_eq!(lit_pixels(&fb), vec![(4, 4)]);
    }

    #[test]
    fn zero_length_line_outside_clamps_to_border() {
        let mut fb = buffer(8, 8);
        let p = Vec2::new(1.5, -0.25);
        fb.draw_line(p, p, Rgba::WHITE);
        assert_eq!(lit_pixels(&fb), vec![(7, 0)]);
    }

    #[test]
    fn line_fully_outside_is_a_no_op() {
        let mut fb = buffer(8, 8);
        fb.draw_line(Vec2::new(-0.5, -0.5), Vec2::new(-0.1, -0.4), Rgba::WHITE);
        assert!(lit_pixels(&fb).is_empty());
    }

    #[test]
    fn line_crossing_the_buffer_is_clipped_not_dropped() {
        let mut fb = buffer(8, 8);
        // Horizontal line through the middle, endpoints far outside.
        fb.draw_line(Vec2::new(-1.0, 0.5), Vec2::new(2.0, 0.5), Rgba::WHITE);
        let lit = lit_pixels(&fb);
        assert_eq!(lit.len(), 8);
        assert!(lit.iter().all(|&(_, y)| y == 4));
    }

    #[test]
    fn diagonal_line_connects_endpoints() {
        let mut fb = buffer(16, 16);
        fb.draw_line(Vec2::new(0.0, 0.0), Vec2::new(0.999, 0.999), Rgba::WHITE);
        let lit = lit_pixels(&fb);
        assert!(lit.contains(&(0, 0)));
        assert!(lit.contains(&(15, 15)));
        // A perfect diagonal lights exactly one pixel per row.
        assert_eq!(lit.len(), 16);
    }

    #[test]
    fn polygon_with_fewer_than_three_points_is_a_no_op() {
        let mut fb = buffer(8, 8);
        fb.draw_polygon(&[Vec2::new(0.2, 0.2), Vec2::new(0.8, 0.8)], Rgba::WHITE);
        assert!(lit_pixels(&fb).is_empty());
    }

    #[test]
    fn polygon_fills_interior() {
        let mut fb = buffer(16, 16);
        // Axis-aligned square covering the middle of the buffer.
        fb.draw_polygon(
            &[
                Vec2::new(0.25, 0.25),
                Vec2::new(0.75, 0.25),
                Vec2::new(0.75, 0.75),
                Vec2::new(0.25, 0.75),
            ],
            Rgba::WHITE,
        );
        // Pixel centers inside [4, 12) x [4, 12).
        let lit = lit_pixels(&fb);
        assert_eq!(lit.len(), 64);
        assert!(lit.contains(&(4, 4)));
        assert!(lit.contains(&(11, 11)));
        assert!(!lit.contains(&(3, 4)));
        assert!(!lit.contains(&(12, 11)));
    }

    #[test]
    fn point_disc_covers_center_and_clips() {
        let mut fb = buffer(16, 16);
        fb.draw_point(Vec2::new(0.5, 0.5), 0.25, Rgba::WHITE);
        let lit = lit_pixels(&fb);
        assert!(lit.contains(&(8, 8)));
        // Disc radius 0.25 of a 16px buffer is 4px; corners stay dark.
        assert!(!lit.contains(&(0, 0)));

        // A disc centered outside only contributes its in-bounds part.
        let mut fb = buffer(16, 16);
        fb.draw_point(Vec2::new(1.0, 0.5), 0.2, Rgba::WHITE);
        assert!(!lit_pixels(&fb).is_empty());
    }

    #[test]
    fn bezier_touches_both_endpoints() {
        let mut fb = buffer(32, 32);
        fb.draw_bezier(
            Vec2::new(0.1, 0.9),
            Vec2::new(0.5, 0.0),
            Vec2::new(0.9, 0.9),
            Rgba::WHITE,
        );
        let lit = lit_pixels(&fb);
        assert!(lit.contains(&(3, 28)));
        assert!(lit.contains(&(28, 28)));
        // The curve bends toward the control point above the chord.
        assert!(lit.iter().any(|&(_, y)| y < 16));
    }

    #[test]
    fn clip_segment_keeps_interior_portion() {
        let (a, b) = clip_segment(
            Vec2::new(-4.0, 2.0),
            Vec2::new(12.0, 2.0),
            8.0,
            8.0,
        )
        .unwrap();
        assert_eq!(a, Vec2::new(0.0, 2.0));
        assert_eq!(b, Vec2::new(8.0, 2.0));
        assert!(clip_segment(Vec2::new(-2.0, -2.0), Vec2::new(-1.0, -3.0), 8.0, 8.0).is_none());
    }
}
