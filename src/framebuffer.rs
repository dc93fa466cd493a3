//! The framebuffer: pixel storage, optional depth storage, drawing modes.
//!
//! A [`Framebuffer`] owns a row-major color plane of `f32` channel samples
//! (3 = RGB, 4 = RGBA), an optional depth plane of the same pixel count, and
//! the drawing-mode flag set consulted by every primitive draw call. The
//! origin is the top-left corner; x grows right, y grows down.
//!
//! # Depth convention
//!
//! The depth plane stores a *nearness* value per pixel: `1/z` when drawing
//! with perspective, `-z` when drawing orthographically. Larger is nearer.
//! The plane is cleared to [`DEPTH_FAR`] (negative infinity, the farthest
//! possible value) and a fragment wins the depth test when its nearness is
//! greater than *or equal to* the stored value, so equal-depth fragments
//! always overwrite and later draws win ties.

use std::error::Error;
use std::fmt;

use crate::color::Rgba;

/// Clear value for the depth plane: farther than any representable fragment.
pub const DEPTH_FAR: f32 = f32::NEG_INFINITY;

/// Independent drawing-mode options, all combinable.
///
/// Flags take effect on draw calls issued after [`Framebuffer::set_flags`];
/// they never reinterpret pixels already written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawFlags {
    /// Per-pixel alpha compositing (`dst*(1-a) + src*a`) instead of a
    /// direct overwrite, for all primitives.
    pub alpha: bool,
    /// Perspective divide and perspective-correct attribute interpolation
    /// for triangles.
    pub perspective: bool,
    /// Flips the sign of the z coordinate before projection, for data
    /// authored with the opposite handedness.
    pub negate_z: bool,
}

impl DrawFlags {
    pub const fn none() -> Self {
        Self {
            alpha: false,
            perspective: false,
            negate_z: false,
        }
    }
}

/// Framebuffer construction failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferError {
    /// Width or height was zero.
    ZeroDimension,
    /// Channel count other than 3 (RGB) or 4 (RGBA).
    UnsupportedChannels(u8),
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::ZeroDimension => {
                write!(f, "framebuffer dimensions must be non-zero")
            }
            BufferError::UnsupportedChannels(n) => {
                write!(f, "unsupported channel count {n} (expected 3 or 4)")
            }
        }
    }
}

impl Error for BufferError {}

/// An in-memory pixel buffer with an optional depth plane and mode flags.
///
/// All primitive draw calls (see the [`raster`](crate::raster) module) are
/// methods on this type and read/write its planes under the current flags.
/// The two planes are exclusively owned: the borrow checker enforces the
/// single-writer assumption the rasterizer relies on.
#[derive(Debug)]
pub struct Framebuffer {
    pixels: Vec<f32>,
    depth: Option<Vec<f32>>,
    width: u32,
    height: u32,
    channels: u8,
    flags: DrawFlags,
}

impl Framebuffer {
    /// Allocates a color plane of `width * height` pixels with `channels`
    /// samples each (3 = RGB, 4 = RGBA), cleared to zero.
    ///
    /// The depth plane is not allocated until [`enable_depth`] requests it.
    ///
    /// [`enable_depth`]: Framebuffer::enable_depth
    pub fn new(width: u32, height: u32, channels: u8) -> Result<Self, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::ZeroDimension);
        }
        if channels != 3 && channels != 4 {
            return Err(BufferError::UnsupportedChannels(channels));
        }
        let len = width as usize * height as usize * channels as usize;
        Ok(Self {
            pixels: vec![0.0; len],
            depth: None,
            width,
            height,
            channels,
            flags: DrawFlags::none(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Samples per pixel (3 = RGB, 4 = RGBA).
    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn flags(&self) -> DrawFlags {
        self.flags
    }

    /// Replaces the drawing-mode flag set. Affects subsequent draw calls only.
    pub fn set_flags(&mut self, flags: DrawFlags) {
        self.flags = flags;
    }

    /// Allocates or releases the depth plane.
    ///
    /// When enabled, the plane holds exactly `width * height` entries
    /// initialized to [`DEPTH_FAR`]; [`fill`](Framebuffer::fill) resets it
    /// the same way. Enabling twice is a no-op.
    pub fn enable_depth(&mut self, enabled: bool) {
        let len = self.width as usize * self.height as usize;
        match (enabled, &self.depth) {
            (true, None) => self.depth = Some(vec![DEPTH_FAR; len]),
            (false, Some(_)) => self.depth = None,
            _ => {}
        }
    }

    pub fn has_depth(&self) -> bool {
        self.depth.is_some()
    }

    /// Overwrites every pixel with `color` (clamped) and resets the depth
    /// plane, if present, to [`DEPTH_FAR`].
    pub fn fill(&mut self, color: Rgba) {
        let c = color.clamped();
        let ch = self.channels as usize;
        for px in self.pixels.chunks_exact_mut(ch) {
            px[0] = c.r;
            px[1] = c.g;
            px[2] = c.b;
            if ch == 4 {
                px[3] = c.a;
            }
        }
        if let Some(depth) = &mut self.depth {
            depth.fill(DEPTH_FAR);
        }
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    #[inline]
    fn pixel_index(&self, x: i32, y: i32) -> usize {
        (y as u32 * self.width + x as u32) as usize
    }

    /// Reads the color at (x, y), or `None` if out of bounds.
    ///
    /// 3-channel buffers read back with alpha = 1.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let idx = self.pixel_index(x, y) * self.channels as usize;
        let a = if self.channels == 4 {
            self.pixels[idx + 3]
        } else {
            1.0
        };
        Some(Rgba::new(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            a,
        ))
    }

    /// Reads the stored depth at (x, y), if a depth plane exists and the
    /// coordinates are in bounds.
    #[inline]
    pub fn depth_at(&self, x: i32, y: i32) -> Option<f32> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let idx = self.pixel_index(x, y);
        self.depth.as_ref().map(|d| d[idx])
    }

    /// Writes `color` at (x, y), silently clipping out-of-bounds
    /// coordinates.
    ///
    /// With the alpha flag set the color is composited over the stored
    /// pixel; otherwise it overwrites. Channels are clamped to `[0, 1]`
    /// at the write.
    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.pixel_index(x, y);
        self.write_color(idx, color);
    }

    /// Writes `color` at (x, y) subject to the depth test.
    ///
    /// `nearness` follows the module-level depth convention: larger is
    /// nearer, equal overwrites. Without a depth plane this degrades to
    /// [`put_pixel`](Framebuffer::put_pixel).
    #[inline]
    pub(crate) fn put_fragment(&mut self, x: i32, y: i32, nearness: f32, color: Rgba) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.pixel_index(x, y);
        if let Some(depth) = &mut self.depth {
            if nearness < depth[idx] {
                return;
            }
            depth[idx] = nearness;
        }
        self.write_color(idx, color);
    }

    #[inline]
    fn write_color(&mut self, pixel_index: usize, color: Rgba) {
        let idx = pixel_index * self.channels as usize;
        let src = if self.flags.alpha {
            let a = if self.channels == 4 {
                self.pixels[idx + 3]
            } else {
                1.0
            };
            let dst = Rgba::new(
                self.pixels[idx],
                self.pixels[idx + 1],
                self.pixels[idx + 2],
                a,
            );
            color.over(dst).clamped()
        } else {
            color.clamped()
        };
        self.pixels[idx] = src.r;
        self.pixels[idx + 1] = src.g;
        self.pixels[idx + 2] = src.b;
        if self.channels == 4 {
            self.pixels[idx + 3] = src.a;
        }
    }

    /// Converts the color plane to ARGB8888 bytes for texture upload,
    /// reusing `out` as scratch storage.
    ///
    /// Byte order per pixel is B, G, R, A (little-endian ARGB), matching
    /// SDL's `ARGB8888` streaming-texture layout.
    pub fn to_argb8888(&self, out: &mut Vec<u8>) {
        let ch = self.channels as usize;
        out.clear();
        out.reserve(self.pixels.len() / ch * 4);
        for px in self.pixels.chunks_exact(ch) {
            let a = if ch == 4 { px[3] } else { 1.0 };
            let argb = Rgba::new(px[0], px[1], px[2], a).to_argb8888();
            out.extend_from_slice(&argb.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fill_then_read_returns_exact_color() {
        let mut fb = Framebuffer::new(16, 9, 3).unwrap();
        let c = Rgba::new(0.25, 0.5, 0.75, 1.0);
        fb.fill(c);
        for (x, y) in [(0, 0), (15, 8), (7, 4)] {
            assert_eq!(fb.pixel(x, y), Some(c));
        }
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert_eq!(
            Framebuffer::new(0, 10, 3).unwrap_err(),
            BufferError::ZeroDimension
        );
        assert_eq!(
            Framebuffer::new(10, 0, 3).unwrap_err(),
            BufferError::ZeroDimension
        );
    }

    #[test]
    fn bad_channel_count_is_rejected() {
        assert_eq!(
            Framebuffer::new(4, 4, 2).unwrap_err(),
            BufferError::UnsupportedChannels(2)
        );
    }

    #[test]
    fn depth_plane_tracks_pixel_count_and_sentinel() {
        let mut fb = Framebuffer::new(8, 8, 4).unwrap();
        assert!(!fb.has_depth());
        assert_eq!(fb.depth_at(0, 0), None);

        fb.enable_depth(true);
        assert!(fb.has_depth());
        assert_eq!(fb.depth_at(7, 7), Some(DEPTH_FAR));

        fb.enable_depth(false);
        assert!(!fb.has_depth());
    }

    #[test]
    fn out_of_bounds_reads_and_writes_are_clipped() {
        let mut fb = Framebuffer::new(4, 4, 3).unwrap();
        fb.put_pixel(-1, 2, Rgba::WHITE);
        fb.put_pixel(4, 0, Rgba::WHITE);
        assert_eq!(fb.pixel(-1, 2), None);
        assert_eq!(fb.pixel(4, 0), None);
        // Nothing inside the buffer changed.
        assert_eq!(fb.pixel(0, 0), Some(Rgba::new(0.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn alpha_flag_switches_overwrite_to_compositing() {
        let mut fb = Framebuffer::new(2, 1, 3).unwrap();
        fb.fill(Rgba::BLACK);
        let half_white = Rgba::new(1.0, 1.0, 1.0, 0.5);

        // Alpha off: direct overwrite regardless of source alpha.
        fb.put_pixel(0, 0, half_white);
        assert_relative_eq!(fb.pixel(0, 0).unwrap().r, 1.0, epsilon = 1e-6);

        // Alpha on: composited over black gives 0.5.
        fb.set_flags(DrawFlags {
            alpha: true,
            ..DrawFlags::none()
        });
        fb.put_pixel(1, 0, half_white);
        assert_relative_eq!(fb.pixel(1, 0).unwrap().r, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn writes_clamp_out_of_range_channels() {
        let mut fb = Framebuffer::new(1, 1, 3).unwrap();
        fb.put_pixel(0, 0, Rgba::new(2.0, -1.0, 0.5, 1.0));
        assert_eq!(fb.pixel(0, 0), Some(Rgba::new(1.0, 0.0, 0.5, 1.0)));
    }

    #[test]
    fn depth_test_keeps_nearer_fragment_and_ties_overwrite() {
        let mut fb = Framebuffer::new(1, 1, 3).unwrap();
        fb.enable_depth(true);

        fb.put_fragment(0, 0, 1.0, Rgba::RED);
        // Farther fragment loses.
        fb.put_fragment(0, 0, 0.5, Rgba::GREEN);
        assert_eq!(fb.pixel(0, 0), Some(Rgba::RED));
        // Equal nearness overwrites: later draw wins ties.
        fb.put_fragment(0, 0, 1.0, Rgba::BLUE);
        assert_eq!(fb.pixel(0, 0), Some(Rgba::BLUE));
        assert_eq!(fb.depth_at(0, 0), Some(1.0));
    }

    #[test]
    fn fill_resets_depth_plane() {
        let mut fb = Framebuffer::new(2, 2, 3).unwrap();
        fb.enable_depth(true);
        fb.put_fragment(1, 1, 3.0, Rgba::WHITE);
        assert_eq!(fb.depth_at(1, 1), Some(3.0));
        fb.fill(Rgba::BLACK);
        assert_eq!(fb.depth_at(1, 1), Some(DEPTH_FAR));
    }

    #[test]
    fn argb8888_conversion_packs_bgra_bytes() {
        let mut fb = Framebuffer::new(1, 1, 3).unwrap();
        fb.fill(Rgba::new(1.0, 0.5, 0.0, 1.0));
        let mut bytes = Vec::new();
        fb.to_argb8888(&mut bytes);
        assert_eq!(bytes, vec![0, 128, 255, 255]);
    }
}
