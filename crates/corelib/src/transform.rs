use crate::Mat4;

/// Accumulates a model-view matrix the way a fixed-function matrix stack does:
/// every call right-multiplies, so the last transform applied is the first one
/// a vertex sees.
#[derive(Clone, Copy, Debug)]
pub struct ModelView {
    current: Mat4,
}

impl ModelView {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            current: Mat4::IDENTITY,
        }
    }

    #[inline]
    pub fn translate(self, dx: f32, dy: f32, dz: f32) -> Self {
        self.then(Mat4::translation(dx, dy, dz))
    }

    #[inline]
    pub fn rotate_x(self, angle: f32) -> Self {
        self.then(Mat4::rotation_x(angle))
    }

    #[inline]
    pub fn rotate_y(self, angle: f32) -> Self {
        self.then(Mat4::rotation_y(angle))
    }

    #[inline]
    pub fn rotate_z(self, angle: f32) -> Self {
        self.then(Mat4::rotation_z(angle))
    }

    #[inline]
    pub fn scale(self, sx: f32, sy: f32, sz: f32) -> Self {
        self.then(Mat4::scale(sx, sy, sz))
    }

    #[inline]
    pub fn then(mut self, m: Mat4) -> Self {
        self.current *= m;
        self
    }

    #[inline]
    pub fn matrix(&self) -> Mat4 {
        self.current
    }
}

impl Default for ModelView {
    fn default() -> Self {
        Self::identity()
    }
}
