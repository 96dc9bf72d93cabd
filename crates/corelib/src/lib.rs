//! Core types: vector re-exports, matrix math, model-view builder, camera, errors.

pub use glam::{Vec2, Vec3, vec3};

mod error;
mod matrix;

pub mod camera;
pub mod transform;

pub use camera::Camera;
pub use error::{CoreError, CoreResult};
pub use matrix::Mat4;
pub use transform::ModelView;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_model_view_is_identity_matrix() {
        assert_eq!(ModelView::identity().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translate_then_scale_matrix() {
        let m = ModelView::identity()
            .translate(1.0, 2.0, 3.0)
            .scale(2.0, 2.0, 2.0)
            .matrix();
        // Last column holds the translation, the diagonal the scale.
        assert!((m.data[0][3] - 1.0).abs() < 1e-6);
        assert!((m.data[1][3] - 2.0).abs() < 1e-6);
        assert!((m.data[2][3] - 3.0).abs() < 1e-6);
        assert!((m.data[0][0] - 2.0).abs() < 1e-6);
        assert!((m.data[1][1] - 2.0).abs() < 1e-6);
        assert!((m.data[2][2] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn camera_projection_is_finite() {
        let cam = Camera::default().with_aspect(16.0 / 9.0);
        let p = cam.projection();
        assert!(p.data.iter().flatten().all(|f| f.is_finite()));
    }
}
