//! Serializing a framebuffer's color plane to image files.
//!
//! The native target is the portable pixmap (PPM) container, either binary
//! `P6` or ASCII `P3`: a `magic width height max-sample` header followed by
//! row-major RGB samples, top-left pixel first. Channels are clamped to
//! `[0, 1]` and quantized to 8 bits by rounding, not truncation, to keep
//! banding down. The depth plane and alpha channel are ignored; output is
//! opaque RGB.
//!
//! [`save_image`] routes through the `image` crate instead, choosing the
//! container from the file extension (PNG, BMP, ...).

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::framebuffer::Framebuffer;

/// Export failure. No partial file should be considered valid.
#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Image(image::ImageError),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "image write failed: {e}"),
            ExportError::Image(e) => write!(f, "image encode failed: {e}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExportError::Io(e) => Some(e),
            ExportError::Image(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

impl From<image::ImageError> for ExportError {
    fn from(e: image::ImageError) -> Self {
        ExportError::Image(e)
    }
}

/// Quantizes the color plane to row-major 8-bit RGB, top-left first.
fn rgb_bytes(fb: &Framebuffer) -> Vec<u8> {
    let mut out = Vec::with_capacity(fb.width() as usize * fb.height() as usize * 3);
    for y in 0..fb.height() as i32 {
        for x in 0..fb.width() as i32 {
            // In-bounds by construction.
            if let Some(c) = fb.pixel(x, y) {
                out.extend(c.to_rgb8());
            }
        }
    }
    out
}

/// Writes the color plane as a binary `P6` portable pixmap.
pub fn write_ppm<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_ppm_to(fb, BufWriter::new(file))
}

fn write_ppm_to<W: Write>(fb: &Framebuffer, mut w: W) -> Result<(), ExportError> {
    write!(w, "P6\n{} {}\n255\n", fb.width(), fb.height())?;
    w.write_all(&rgb_bytes(fb))?;
    w.flush()?;
    Ok(())
}

/// Writes the color plane as an ASCII `P3` portable pixmap, one pixel per
/// line.
pub fn write_ppm_ascii<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_ppm_ascii_to(fb, BufWriter::new(file))
}

fn write_ppm_ascii_to<W: Write>(fb: &Framebuffer, mut w: W) -> Result<(), ExportError> {
    writeln!(w, "P3\n{} {}\n255", fb.width(), fb.height())?;
    for rgb in rgb_bytes(fb).chunks_exact(3) {
        writeln!(w, "{} {} {}", rgb[0], rgb[1], rgb[2])?;
    }
    w.flush()?;
    Ok(())
}

/// Writes the color plane through the `image` crate, picking the container
/// format from the file extension.
pub fn save_image<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<(), ExportError> {
    image::save_buffer(
        path,
        &rgb_bytes(fb),
        fb.width(),
        fb.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    #[test]
    fn ppm_header_and_payload_layout() {
        let mut fb = Framebuffer::new(2, 1, 3).unwrap();
        fb.fill(Rgba::new(1.0, 0.5, 0.0, 1.0));
        let mut out = Vec::new();
        write_ppm_to(&fb, &mut out).unwrap();
        // 0.5 * 255 = 127.5 rounds to 128.
        assert_eq!(out, b"P6\n2 1\n255\n\xff\x80\x00\xff\x80\x00");
    }

    #[test]
    fn ascii_ppm_is_human_readable() {
        let mut fb = Framebuffer::new(1, 2, 3).unwrap();
        fb.fill(Rgba::BLACK);
        fb.put_pixel(0, 0, Rgba::WHITE);
        let mut out = Vec::new();
        write_ppm_ascii_to(&fb, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "P3\n1 2\n255\n255 255 255\n0 0 0\n");
    }

    #[test]
    fn first_pixel_written_is_top_left() {
        let mut fb = Framebuffer::new(2, 2, 3).unwrap();
        fb.fill(Rgba::BLACK);
        fb.put_pixel(0, 0, Rgba::RED);
        fb.put_pixel(1, 1, Rgba::BLUE);
        let bytes = rgb_bytes(&fb);
        assert_eq!(&bytes[0..3], &[255, 0, 0]);
        assert_eq!(&bytes[9..12], &[0, 0, 255]);
    }

    #[test]
    fn export_round_trips_through_an_independent_decoder() {
        let mut fb = Framebuffer::new(4, 3, 3).unwrap();
        let c = Rgba::new(0.2, 0.4, 0.8, 1.0);
        fb.fill(c);

        let path = std::env::temp_dir().join("rastr_export_roundtrip.ppm");
        write_ppm(&fb, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (4, 3));
        let expected = c.to_rgb8();
        for px in img.pixels() {
            for ch in 0..3 {
                // Quantization tolerance of +/- 1 on an 8-bit channel.
                assert!((px.0[ch] as i16 - expected[ch] as i16).abs() <= 1);
            }
        }
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn alpha_plane_is_ignored_in_rgb_output() {
        let mut fb = Framebuffer::new(1, 1, 4).unwrap();
        fb.fill(Rgba::new(1.0, 0.0, 0.0, 0.25));
        assert_eq!(rgb_bytes(&fb), vec![255, 0, 0]);
    }
}
