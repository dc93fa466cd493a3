//! RGBA color values and compositing arithmetic.
//!
//! Colors are stored as four `f32` channels conceptually in `[0, 1]`.
//! Construction does not clamp: blending and interpolation may transiently
//! leave the range, and the framebuffer clamps at the point of writing.
//! Packing to bytes happens only at the presentation/export boundary.

/// A 4-component floating-point color (red, green, blue, alpha).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Composites `self` over `dst` using the source alpha:
    /// `dst * (1 - a) + self * a` per color channel.
    ///
    /// The result keeps the destination alpha blended the same way, so
    /// repeated compositing stays well defined on 4-channel buffers.
    pub fn over(&self, dst: Self) -> Self {
        let a = self.a;
        Self {
            r: dst.r * (1.0 - a) + self.r * a,
            g: dst.g * (1.0 - a) + self.g * a,
            b: dst.b * (1.0 - a) + self.b * a,
            a: dst.a * (1.0 - a) + self.a * a,
        }
    }

    /// Linear interpolation between two colors at parameter `t`.
    pub fn lerp(&self, other: Self, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Returns the color with every channel clamped to `[0, 1]`.
    pub fn clamped(&self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }

    /// Quantizes the color to 8-bit RGB via rounding (not truncation),
    /// to minimize banding in exported images. Alpha is dropped.
    pub fn to_rgb8(&self) -> [u8; 3] {
        let c = self.clamped();
        [
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
        ]
    }

    /// Packs the color into ARGB8888 for SDL texture upload. Writing the
    /// packed word little-endian yields the B, G, R, A byte order SDL's
    /// streaming textures expect.
    pub fn to_argb8888(&self) -> u32 {
        let c = self.clamped();
        let a = (c.a * 255.0).round() as u32;
        let r = (c.r * 255.0).round() as u32;
        let g = (c.g * 255.0).round() as u32;
        let b = (c.b * 255.0).round() as u32;
        (a << 24) | (r << 16) | (g << 8) | b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn over_matches_closed_form() {
        // blend(blend(bg, a, 0.5), b, 0.5) with bg=0, a=1, b=0 per channel:
        // first blend gives 0.5, second gives 0.25.
        let bg = Rgba::BLACK;
        let a = Rgba::new(1.0, 1.0, 1.0, 0.5);
        let b = Rgba::new(0.0, 0.0, 0.0, 0.5);
        let once = a.over(bg);
        let twice = b.over(once);
        assert_relative_eq!(once.r, 0.5, epsilon = 1e-6);
        assert_relative_eq!(twice.r, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn over_with_opaque_source_replaces() {
        let dst = Rgba::new(0.2, 0.4, 0.6, 1.0);
        let src = Rgba::new(0.9, 0.1, 0.3, 1.0);
        let out = src.over(dst);
        assert_relative_eq!(out.r, 0.9, epsilon = 1e-6);
        assert_relative_eq!(out.g, 0.1, epsilon = 1e-6);
        assert_relative_eq!(out.b, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn clamped_limits_out_of_range_channels() {
        let c = Rgba::new(1.5, -0.25, 0.5, 2.0).clamped();
        assert_eq!(c, Rgba::new(1.0, 0.0, 0.5, 1.0));
    }

    #[test]
    fn to_rgb8_rounds_instead_of_truncating() {
        // 0.999 * 255 = 254.745, which must round up to 255.
        let c = Rgba::new(0.999, 0.0, 0.5, 1.0);
        assert_eq!(c.to_rgb8(), [255, 0, 128]);
    }

    #[test]
    fn argb8888_packing_layout() {
        let c = Rgba::new(1.0, 0.5, 0.0, 1.0);
        // 0.5 * 255 = 127.5 rounds to 0x80.
        assert_eq!(c.to_argb8888(), 0xFFFF_8000);
        assert_eq!(c.to_argb8888().to_le_bytes(), [0x00, 0x80, 0xFF, 0xFF]);
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Rgba::new(0.0, 0.2, 0.4, 1.0);
        let b = Rgba::new(1.0, 0.6, 0.0, 0.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        let mid = a.lerp(b, 0.5);
        assert_relative_eq!(mid.r, 0.5, epsilon = 1e-6);
        assert_relative_eq!(mid.g, 0.4, epsilon = 1e-6);
    }
}
