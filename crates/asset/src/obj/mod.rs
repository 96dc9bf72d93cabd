//! Wavefront OBJ loader for the `v`/`vt`/`vn`/`f` subset.
//!
//! Loading runs two passes over the text. The first counts records of each
//! kind, the second fills tables sized from those counts. Records must be
//! grouped by kind in the order positions, texture coordinates, normals,
//! faces; a file that interleaves kinds is rejected at the first out-of-order
//! record. Faces are then fan-triangulated into flat per-corner streams.

mod elements;
mod scanner;
mod triangulate;

use std::path::Path;

use anyhow::{Context, Result};
use corelib::{Vec2, Vec3};
use log::{debug, error, info};

use crate::{
    error::{Location, ObjError},
    mesh::MeshData,
    source,
};

use self::scanner::Scanner;
pub use self::triangulate::triangulate;

/// One face corner, 0-based. Absent texture/normal references are `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawVertexIndex {
    pub position: usize,
    pub tex_coord: Option<usize>,
    pub normal: Option<usize>,
}

/// Polygon as authored: three or more corners, counter-clockwise.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    pub corners: Vec<RawVertexIndex>,
    /// Where the `f` keyword starts, for error reports.
    pub location: Location,
}

/// Attribute tables in file order plus the faces that index them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedGeometry {
    pub positions: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub faces: Vec<Face>,
}

impl ParsedGeometry {
    fn with_capacity(counts: &RecordCounts) -> Self {
        Self {
            positions: Vec::with_capacity(counts.positions),
            tex_coords: Vec::with_capacity(counts.tex_coords),
            normals: Vec::with_capacity(counts.normals),
            faces: Vec::with_capacity(counts.faces),
        }
    }

    /// Triangles produced by fan triangulation: `corners - 2` per face.
    pub fn triangle_count(&self) -> usize {
        self.faces
            .iter()
            .map(|face| face.corners.len().saturating_sub(2))
            .sum()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct RecordCounts {
    positions: usize,
    tex_coords: usize,
    normals: usize,
    faces: usize,
}

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<MeshData> {
    let path = path.as_ref();
    info!("Loading OBJ mesh: {}", path.display());

    let bytes = source::read_source(path)
        .with_context(|| format!("Failed to read OBJ file: {}", path.display()))?;
    let mesh = parse_obj(&bytes).map_err(|e| {
        error!("{}: {}", path.display(), e);
        e
    });
    let mesh = mesh.with_context(|| format!("Failed to parse OBJ file: {}", path.display()))?;

    info!(
        "Loaded {}: {} triangles, {} vertices",
        path.display(),
        mesh.triangle_count(),
        mesh.vertex_count()
    );
    Ok(mesh)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> Result<MeshData, ObjError> {
    parse_obj(contents.as_bytes())
}

/// Parse and triangulate OBJ text into flat vertex streams.
pub fn parse_obj(source: &[u8]) -> Result<MeshData, ObjError> {
    triangulate(&parse_geometry(source)?)
}

/// Parse OBJ text into attribute tables and faces without triangulating.
pub fn parse_geometry(source: &[u8]) -> Result<ParsedGeometry, ObjError> {
    let mut sc = Scanner::new(source);

    let counts = RecordCounts {
        positions: sweep(&mut sc, |sc| elements::parse_position(sc, None))?,
        tex_coords: sweep(&mut sc, |sc| elements::parse_tex_coord(sc, None))?,
        normals: sweep(&mut sc, |sc| elements::parse_normal(sc, None))?,
        faces: sweep(&mut sc, |sc| elements::parse_face(sc, None))?,
    };
    expect_end(&mut sc)?;
    debug!("OBJ record counts: {:?}", counts);

    sc.rewind();
    let mut geometry = ParsedGeometry::with_capacity(&counts);
    sweep(&mut sc, |sc| {
        elements::parse_position(sc, Some(&mut geometry.positions))
    })?;
    sweep(&mut sc, |sc| {
        elements::parse_tex_coord(sc, Some(&mut geometry.tex_coords))
    })?;
    sweep(&mut sc, |sc| {
        elements::parse_normal(sc, Some(&mut geometry.normals))
    })?;
    sweep(&mut sc, |sc| {
        elements::parse_face(sc, Some(&mut geometry.faces))
    })?;

    Ok(geometry)
}

/// Run `parse` until it stops matching, skipping whitespace and comments
/// between records. Returns how many records matched.
fn sweep<F>(sc: &mut Scanner<'_>, mut parse: F) -> Result<usize, ObjError>
where
    F: FnMut(&mut Scanner<'_>) -> Result<bool, ObjError>,
{
    let mut count = 0;
    loop {
        sc.skip_blanks_and_comments();
        if !parse(sc)? {
            return Ok(count);
        }
        count += 1;
    }
}

fn expect_end(sc: &mut Scanner<'_>) -> Result<(), ObjError> {
    sc.skip_blanks_and_comments();
    match sc.peek() {
        None => Ok(()),
        Some(byte) => Err(ObjError::UnexpectedToken {
            location: sc.location(),
            found: char::from(byte),
        }),
    }
}
