//! Demo scene: a hatched cube and a solid icosahedron tumbling side by side,
//! plus an optional loaded model between them.

use anyhow::Result;
use asset::{Material, MeshData, solids, texture::TextureData};
use corelib::{Mat4, ModelView};
use renderer::{DrawCommand, GpuState, ObjectId, Shading};

/// Angle step per frame, in radians.
pub const ANGLE_STEP: f32 = 0.01;

/// Model view for an object centered at `(dx, 0, -3)` at animation time `angle`.
pub fn tumbling(dx: f32, angle: f32) -> Mat4 {
    ModelView::identity()
        .translate(dx, 0.0, -3.0)
        .rotate_y(3.1 * angle)
        .rotate_x(2.0 * angle)
        .scale(
            angle.sin().abs(),
            (angle + 1.0).cos().abs(),
            ((angle + 3.0).cos() * (angle + 2.0).sin()).abs(),
        )
        .matrix()
}

/// Hatch stripe width in pixels at animation time `angle`; always in `[1, 4]`.
pub fn hatch_width(angle: f32) -> f32 {
    (angle + 1.1).sin().abs() * 3.0 + 1.0
}

/// Slow spin for the loaded model, kept at its authored scale.
pub fn turntable(angle: f32) -> Mat4 {
    ModelView::identity()
        .translate(0.0, 0.0, -4.0)
        .rotate_y(angle)
        .matrix()
}

pub struct DemoScene {
    angle: f32,
    cube: ObjectId,
    icosahedron: ObjectId,
    model: Option<ObjectId>,
}

impl DemoScene {
    pub fn new(
        gpu: &mut GpuState,
        model: Option<&MeshData>,
        texture: Option<&TextureData>,
    ) -> Result<Self> {
        let cube = gpu.add_object(
            "Cube",
            &solids::cube(1.0).to_mesh_data(),
            Material::with_diffuse([0.9, 0.6, 0.2]),
            None,
            Shading::Hatch,
        )?;
        let icosahedron = gpu.add_object(
            "Icosahedron",
            &solids::icosahedron(1.0).to_mesh_data(),
            Material::with_diffuse([0.3, 0.6, 0.9]).with_specular([0.6, 0.6, 0.6], 32.0),
            None,
            Shading::Solid,
        )?;
        let model = match model {
            Some(data) => Some(gpu.add_object("Model", data, Material::default(), texture, Shading::Solid)?),
            None => None,
        };
        Ok(Self {
            angle: 0.0,
            cube,
            icosahedron,
            model,
        })
    }

    /// Step the animation and return this frame's draw list.
    pub fn advance(&mut self) -> Vec<DrawCommand> {
        self.angle += ANGLE_STEP;
        let a = self.angle;
        let mut commands = vec![
            DrawCommand::new(self.cube, tumbling(1.5, a)).with_line_width(hatch_width(a)),
            DrawCommand::new(self.icosahedron, tumbling(-1.5, a)),
        ];
        if let Some(model) = self.model {
            commands.push(DrawCommand::new(model, turntable(a)));
        }
        commands
    }
}
