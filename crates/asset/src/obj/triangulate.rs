use corelib::{Vec2, Vec3};

use super::{Face, ParsedGeometry, RawVertexIndex};
use crate::{
    error::{AttributeKind, ObjError},
    mesh::MeshData,
};

/// Fan-triangulate every face into flat per-corner streams.
///
/// Face `(c0, c1, ..., cn)` becomes `(c0, c1, c2), (c0, c2, c3), ...`; this is
/// only correct for convex planar polygons. Missing texture coordinates and
/// normals come out as zeros.
pub fn triangulate(geometry: &ParsedGeometry) -> Result<MeshData, ObjError> {
    let mut mesh = MeshData::with_capacity(3 * geometry.triangle_count());

    for face in &geometry.faces {
        let corners = &face.corners;
        for j in 1..corners.len().saturating_sub(1) {
            for corner in [&corners[0], &corners[j], &corners[j + 1]] {
                let (position, tex_coord, normal) = resolve(geometry, face, corner)?;
                mesh.push_vertex(position.to_array(), tex_coord.to_array(), normal.to_array());
            }
        }
    }

    Ok(mesh)
}

fn resolve(
    geometry: &ParsedGeometry,
    face: &Face,
    corner: &RawVertexIndex,
) -> Result<(Vec3, Vec2, Vec3), ObjError> {
    let position = lookup(&geometry.positions, corner.position, face, AttributeKind::Position)?;
    let tex_coord = match corner.tex_coord {
        Some(i) => lookup(&geometry.tex_coords, i, face, AttributeKind::TexCoord)?,
        None => Vec2::ZERO,
    };
    let normal = match corner.normal {
        Some(i) => lookup(&geometry.normals, i, face, AttributeKind::Normal)?,
        None => Vec3::ZERO,
    };
    Ok((position, tex_coord, normal))
}

fn lookup<T: Copy>(
    table: &[T],
    index: usize,
    face: &Face,
    kind: AttributeKind,
) -> Result<T, ObjError> {
    table
        .get(index)
        .copied()
        .ok_or(ObjError::IndexOutOfRange {
            location: face.location,
            kind,
            index: index + 1,
            len: table.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Location;

    fn corner(position: usize) -> RawVertexIndex {
        RawVertexIndex {
            position,
            ..Default::default()
        }
    }

    fn pentagon() -> ParsedGeometry {
        ParsedGeometry {
            positions: (0..5).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect(),
            tex_coords: vec![Vec2::new(0.5, 0.5)],
            normals: vec![Vec3::new(0.0, 1.0, 0.0)],
            faces: vec![Face {
                corners: (0..5)
                    .map(|i| RawVertexIndex {
                        position: i,
                        tex_coord: Some(0),
                        normal: Some(0),
                    })
                    .collect(),
                location: Location::START,
            }],
        }
    }

    #[test]
    fn pentagon_fan_order() {
        let mesh = triangulate(&pentagon()).unwrap();
        assert_eq!(mesh.vertex_count(), 9);
        let xs: Vec<f32> = mesh.positions.iter().map(|p| p[0]).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 0.0, 2.0, 3.0, 0.0, 3.0, 4.0]);
        assert!(mesh.tex_coords.iter().all(|t| *t == [0.5, 0.5]));
        assert!(mesh.normals.iter().all(|n| *n == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn streams_stay_parallel() {
        let mesh = triangulate(&pentagon()).unwrap();
        assert_eq!(mesh.positions.len(), mesh.tex_coords.len());
        assert_eq!(mesh.positions.len(), mesh.normals.len());
        assert!(mesh.is_valid());
    }

    #[test]
    fn missing_attributes_default_to_zero() {
        let geometry = ParsedGeometry {
            positions: vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
            faces: vec![Face {
                corners: vec![corner(0), corner(1), corner(2)],
                location: Location::START,
            }],
            ..Default::default()
        };
        let mesh = triangulate(&geometry).unwrap();
        assert_eq!(mesh.tex_coords, vec![[0.0, 0.0]; 3]);
        assert_eq!(mesh.normals, vec![[0.0, 0.0, 0.0]; 3]);
    }

    #[test]
    fn out_of_range_normal_is_reported() {
        let mut geometry = pentagon();
        geometry.faces[0].corners[3].normal = Some(4);
        assert_eq!(
            triangulate(&geometry),
            Err(ObjError::IndexOutOfRange {
                location: Location::START,
                kind: AttributeKind::Normal,
                index: 5,
                len: 1
            })
        );
    }
}
