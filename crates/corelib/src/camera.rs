use crate::Mat4;

/// Perspective camera described by its near-plane frustum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new_frustum(left: f32, right: f32, bottom: f32, top: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            left,
            right,
            bottom,
            top,
            z_near,
            z_far,
        }
    }

    /// Widen (or narrow) the horizontal extent to match `aspect = width / height`,
    /// keeping the vertical extent.
    #[inline]
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        let half_height = (self.top - self.bottom) * 0.5;
        let center = (self.right + self.left) * 0.5;
        let half_width = half_height * aspect.max(1e-6);
        self.left = center - half_width;
        self.right = center + half_width;
        self
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.z_near,
            self.z_far,
        )
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new_frustum(-1.0, 1.0, -1.0, 1.0, 1.0, 100.0)
    }
}
