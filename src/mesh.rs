//! Indexed triangle meshes: decoding and rendering dispatch.
//!
//! A [`Mesh`] owns an ordered vertex array and an ordered list of index
//! triples; drawing borrows both for the duration of the call and hands
//! each triple to the triangle rasterizer in order. Meshes come from three
//! places: the compact binary vertex-stream format described below, OBJ
//! files via `tobj`, or the built-in unit cube.
//!
//! # Binary stream format
//!
//! All values little-endian:
//!
//! ```text
//! u32           vertex count
//! per vertex:   3 x f32 position, 2 x f32 uv, 4 x u8 color (0..255 -> 0..1)
//! u32           index count (must be a multiple of 3)
//! per index:    u32
//! ```
//!
//! A truncated stream or a malformed count is a [`LoadError`]; no partial
//! mesh is ever returned.

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::math::{Vec2, Vec3};
use crate::raster::BoundsError;

pub use crate::raster::Vertex;

/// Mesh decode failure.
#[derive(Debug)]
pub enum LoadError {
    /// Underlying I/O failure, including a truncated stream.
    Io(std::io::Error),
    /// Index count in the stream was not a multiple of 3.
    IndexCount(u32),
    /// OBJ parse failure.
    Obj(tobj::LoadError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "mesh read failed: {e}"),
            LoadError::IndexCount(n) => {
                write!(f, "index count {n} is not a multiple of 3")
            }
            LoadError::Obj(e) => write!(f, "obj load failed: {e}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::IndexCount(_) => None,
            LoadError::Obj(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<tobj::LoadError> for LoadError {
    fn from(e: tobj::LoadError) -> Self {
        LoadError::Obj(e)
    }
}

/// An indexed triangle mesh.
#[derive(Debug)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<[u32; 3]>) -> Self {
        Self { vertices, indices }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Decodes a mesh from the compact binary stream format.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, LoadError> {
        // Counts come straight from the untrusted stream; cap the up-front
        // reservation so a corrupt header cannot demand a huge allocation.
        // Growth past the cap is paid for by bytes actually read, and a
        // short stream fails as `LoadError::Io` at the first missing record.
        const PREALLOC_LIMIT: usize = 1 << 16;

        let vertex_count = read_u32(&mut reader)?;
        let mut vertices = Vec::with_capacity((vertex_count as usize).min(PREALLOC_LIMIT));
        for _ in 0..vertex_count {
            let position = Vec3::new(
                read_f32(&mut reader)?,
                read_f32(&mut reader)?,
                read_f32(&mut reader)?,
            );
            let uv = Vec2::new(read_f32(&mut reader)?, read_f32(&mut reader)?);
            let mut rgba = [0u8; 4];
            reader.read_exact(&mut rgba)?;
            let color = Rgba::new(
                rgba[0] as f32 / 255.0,
                rgba[1] as f32 / 255.0,
                rgba[2] as f32 / 255.0,
                rgba[3] as f32 / 255.0,
            );
            vertices.push(Vertex::new(position, uv, color));
        }

        let index_count = read_u32(&mut reader)?;
        if index_count % 3 != 0 {
            return Err(LoadError::IndexCount(index_count));
        }
        let mut indices = Vec::with_capacity((index_count as usize / 3).min(PREALLOC_LIMIT));
        for _ in 0..index_count / 3 {
            indices.push([
                read_u32(&mut reader)?,
                read_u32(&mut reader)?,
                read_u32(&mut reader)?,
            ]);
        }

        Ok(Self { vertices, indices })
    }

    /// Decodes a mesh from a binary stream file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Loads the first model of an OBJ file, triangulated.
    ///
    /// Positions and texture coordinates come from the OBJ; vertex colors
    /// default to white since the format carries none.
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let (models, _materials) = tobj::load_obj(
            path.as_ref(),
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )?;

        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        for model in &models {
            let mesh = &model.mesh;
            let base = vertices.len() as u32;
            for i in 0..mesh.positions.len() / 3 {
                let position = Vec3::new(
                    mesh.positions[i * 3],
                    mesh.positions[i * 3 + 1],
                    mesh.positions[i * 3 + 2],
                );
                let uv = if mesh.texcoords.len() >= (i + 1) * 2 {
                    Vec2::new(mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1])
                } else {
                    Vec2::ZERO
                };
                vertices.push(Vertex::new(position, uv, Rgba::WHITE));
            }
            for triple in mesh.indices.chunks_exact(3) {
                indices.push([base + triple[0], base + triple[1], base + triple[2]]);
            }
        }

        Ok(Self { vertices, indices })
    }

    /// The built-in unit cube centered on the origin, with a distinct color
    /// per corner. Useful for demos and tests without asset files.
    pub fn cube() -> Self {
        let corners = [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(-1.0, -1.0, 1.0),
        ];
        let vertices = corners
            .iter()
            .map(|&p| {
                let color = Rgba::new(
                    (p.x + 1.0) * 0.5,
                    (p.y + 1.0) * 0.5,
                    (p.z + 1.0) * 0.5,
                    1.0,
                );
                Vertex::new(p, Vec2::ZERO, color)
            })
            .collect();
        let indices = vec![
            // Front face
            [0, 1, 2],
            [0, 2, 3],
            // Right face
            [3, 2, 4],
            [3, 4, 5],
            // Back face
            [5, 4, 6],
            [5, 6, 7],
            // Left face
            [7, 6, 1],
            [7, 1, 0],
            // Top face
            [1, 6, 4],
            [1, 4, 2],
            // Bottom face
            [5, 7, 0],
            [5, 0, 3],
        ];
        Self { vertices, indices }
    }

    /// Draws the mesh into `fb`, one triangle per index triple in order.
    ///
    /// Index validation happens before any pixel is written; see
    /// [`Framebuffer::draw_triangles`].
    pub fn draw(&self, fb: &mut Framebuffer) -> Result<(), BoundsError> {
        fb.draw_triangles(&self.vertices, &self.indices)
    }
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, std::io::Error> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_f32<R: Read>(reader: &mut R) -> Result<f32, std::io::Error> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}
