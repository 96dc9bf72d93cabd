//! Procedural solids built without any asset files.

use std::f32::consts::PI;

use corelib::{Vec3, vec3};

use crate::mesh::MeshData;

/// Indexed triangle list, counter-clockwise seen from outside.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedSolid {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl IndexedSolid {
    /// Expand indices into flat streams with one face normal per triangle.
    pub fn to_mesh_data(&self) -> MeshData {
        let mut mesh = MeshData::with_capacity(self.indices.len());
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|k| self.positions[tri[k] as usize]);
            let normal = (b - a).cross(c - a).normalize_or_zero().to_array();
            for p in [a, b, c] {
                mesh.push_vertex(p.to_array(), [0.0, 0.0], normal);
            }
        }
        mesh
    }
}

/// Axis-aligned cube of edge `size` centered on the origin.
#[rustfmt::skip]
pub fn cube(size: f32) -> IndexedSolid {
    let s = size / 2.0;
    let positions = vec![
        vec3(-s, -s, -s),
        vec3(-s, s, -s),
        vec3(s, s, -s),
        vec3(s, -s, -s),
        vec3(-s, -s, s),
        vec3(-s, s, s),
        vec3(s, s, s),
        vec3(s, -s, s),
    ];
    let indices = vec![
        3, 1, 2, 3, 0, 1, // back
        0, 5, 1, 0, 4, 5, // left
        1, 6, 2, 1, 5, 6, // top
        2, 7, 3, 2, 6, 7, // right
        3, 4, 0, 3, 7, 4, // bottom
        4, 6, 5, 4, 7, 6, // front
    ];
    IndexedSolid { positions, indices }
}

/// Icosahedron-like solid: two staggered rings of five vertices plus two poles.
pub fn icosahedron(size: f32) -> IndexedSolid {
    let big_r = size * (2.0 * (5.0 + 5f32.sqrt())).sqrt() / 4.0;
    let r = size * 3f32.sqrt() * (3.0 + 5f32.sqrt()) / 12.0;

    let mut positions = Vec::with_capacity(12);
    for i in 0..5 {
        let upper = 2.0 * PI / 5.0 * i as f32;
        let lower = upper + 2.0 * PI / 10.0;
        positions.push(vec3(r * upper.cos(), big_r / 2.0, r * upper.sin()));
        positions.push(vec3(r * lower.cos(), -big_r / 2.0, r * lower.sin()));
    }
    positions.push(vec3(0.0, big_r, 0.0));
    positions.push(vec3(0.0, -big_r, 0.0));

    let mut indices = Vec::with_capacity(60);
    // Band around the equator: ring vertices alternate upper/lower.
    for i in 0..10u32 {
        if i % 2 == 0 {
            indices.extend([(i + 1) % 10, i, (i + 2) % 10]);
        } else {
            indices.extend([(i + 1) % 10, (i + 2) % 10, i]);
        }
    }
    // Caps.
    for i in 0..5u32 {
        indices.extend([10, (2 * (i + 1)) % 10, 2 * i]);
        indices.extend([11, 2 * i + 1, (2 * (i + 1) + 1) % 10]);
    }

    IndexedSolid { positions, indices }
}
