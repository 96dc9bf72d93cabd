//! CPU-side mesh representation used by loaders.

/// Three parallel, non-indexed vertex streams; every three consecutive
/// entries form one triangle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
}

impl MeshData {
    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            tex_coords: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
        }
    }

    #[inline]
    pub fn push_vertex(&mut self, position: [f32; 3], tex_coord: [f32; 2], normal: [f32; 3]) {
        self.positions.push(position);
        self.tex_coords.push(tex_coord);
        self.normals.push(normal);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Non-empty, streams of equal length, whole triangles only.
    pub fn is_valid(&self) -> bool {
        let n = self.positions.len();
        n > 0 && n % 3 == 0 && self.tex_coords.len() == n && self.normals.len() == n
    }
}

/// Phong-style surface parameters carried alongside a mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
}

impl Material {
    pub fn with_diffuse(diffuse: [f32; 3]) -> Self {
        Self {
            diffuse,
            ..Self::default()
        }
    }

    /// Highlight color and exponent for the specular term.
    pub fn with_specular(mut self, specular: [f32; 3], shininess: f32) -> Self {
        self.specular = specular;
        self.shininess = shininess;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: [0.1, 0.1, 0.1],
            diffuse: [0.8, 0.8, 0.8],
            specular: [0.0, 0.0, 0.0],
            shininess: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_data_validity() {
        let mut data = MeshData::default();
        assert!(!data.is_valid());
        for _ in 0..3 {
            data.push_vertex([0.0; 3], [0.0; 2], [0.0, 0.0, 1.0]);
        }
        assert!(data.is_valid());
        assert_eq!(data.triangle_count(), 1);
        data.positions.push([1.0; 3]);
        assert!(!data.is_valid());
    }

    #[test]
    fn material_builders() {
        let m = Material::with_diffuse([1.0, 0.0, 0.0]).with_specular([0.5; 3], 32.0);
        assert_eq!(m.diffuse, [1.0, 0.0, 0.0]);
        assert_eq!(m.ambient, Material::default().ambient);
        assert_eq!((m.specular, m.shininess), ([0.5; 3], 32.0));
    }
}
