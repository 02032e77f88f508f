/// Built-in shader programs.
///
/// These cover the common demo cases (flat vertex color, mipmapped
/// texturing, Blinn-Phong lighting) and double as fixtures for the test and
/// benchmark suites. Applications are expected to bring their own `Program`
/// implementations for anything beyond them.
use crate::shader::{FsIn, FsOut, Program, VsOut};
use crate::texture::Texture2d;
use glam::{Mat2, Mat4, Vec2, Vec3, Vec4};

/// Flat per-vertex color, interpolated across the triangle.
pub struct ColorProgram;

#[derive(Copy, Clone, Debug)]
pub struct ColorVertex {
    pub position: Vec3,
    pub color: Vec3,
}

pub struct ColorUniform {
    pub mvp: Mat4,
}

impl Program for ColorProgram {
    type Uniform = ColorUniform;
    type Vertex = ColorVertex;
    type Varyings = Vec3;

    fn vertex(vertex: &ColorVertex, uniform: &ColorUniform) -> VsOut<Vec3> {
        VsOut {
            position: uniform.mvp * vertex.position.extend(1.0),
            varyings: vertex.color,
        }
    }

    fn fragment(input: &FsIn<Vec3>, _uniform: &ColorUniform) -> FsOut {
        FsOut {
            depth: input.depth,
            color: input.varyings.extend(1.0),
        }
    }

    fn interpolate(weights: Vec3, v0: &Vec3, v1: &Vec3, v2: &Vec3) -> Vec3 {
        weights.x * *v0 + weights.y * *v1 + weights.z * *v2
    }

    fn quad_derivative(_quad: &[Vec3; 4]) -> Mat2 {
        Mat2::ZERO
    }
}

/// Mipmapped texture mapping; the quad derivative of the UV coordinates
/// drives the sampler's footprint.
pub struct TextureProgram;

#[derive(Copy, Clone, Debug)]
pub struct TextureVertex {
    pub position: Vec3,
    pub uv: Vec2,
}

pub struct TextureUniform {
    pub mvp: Mat4,
    pub texture: Texture2d,
}

impl Program for TextureProgram {
    type Uniform = TextureUniform;
    type Vertex = TextureVertex;
    type Varyings = Vec2;

    fn vertex(vertex: &TextureVertex, uniform: &TextureUniform) -> VsOut<Vec2> {
        VsOut {
            position: uniform.mvp * vertex.position.extend(1.0),
            varyings: vertex.uv,
        }
    }

    fn fragment(input: &FsIn<Vec2>, uniform: &TextureUniform) -> FsOut {
        let ddx = input.derivative.col(0);
        let ddy = input.derivative.col(1);
        let footprint = ddx.length_squared().max(ddy.length_squared()).sqrt();

        FsOut {
            depth: input.depth,
            color: uniform
                .texture
                .sample(input.varyings.x, input.varyings.y, footprint),
        }
    }

    fn interpolate(weights: Vec3, v0: &Vec2, v1: &Vec2, v2: &Vec2) -> Vec2 {
        weights.x * *v0 + weights.y * *v1 + weights.z * *v2
    }

    fn quad_derivative(quad: &[Vec2; 4]) -> Mat2 {
        // 2x2 finite differences, averaging the two rows/columns.
        let ddx = (-quad[0] + quad[1] - quad[2] + quad[3]) * 0.5;
        let ddy = (-quad[0] - quad[1] + quad[2] + quad[3]) * 0.5;
        Mat2::from_cols(ddx, ddy)
    }
}

/// Blinn-Phong point-light shading with per-vertex base color.
pub struct PhongProgram;

#[derive(Copy, Clone, Debug)]
pub struct PhongVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
}

pub struct PhongUniform {
    pub mvp: Mat4,
    pub model: Mat4,
    /// Inverse-transpose of the model matrix for normal transformation.
    pub normal_matrix: Mat4,
    pub light_position: Vec3,
    pub view_position: Vec3,
    pub light_color: Vec3,
}

#[derive(Copy, Clone, Debug)]
pub struct PhongVaryings {
    pub world_position: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
}

const AMBIENT_STRENGTH: f32 = 0.2;
const SPECULAR_STRENGTH: f32 = 0.8;
const SHININESS: f32 = 32.0;

impl Program for PhongProgram {
    type Uniform = PhongUniform;
    type Vertex = PhongVertex;
    type Varyings = PhongVaryings;

    fn vertex(vertex: &PhongVertex, uniform: &PhongUniform) -> VsOut<PhongVaryings> {
        let local = vertex.position.extend(1.0);
        VsOut {
            position: uniform.mvp * local,
            varyings: PhongVaryings {
                world_position: (uniform.model * local).truncate(),
                normal: (uniform.normal_matrix * vertex.normal.extend(0.0)).truncate(),
                color: vertex.color,
            },
        }
    }

    fn fragment(input: &FsIn<PhongVaryings>, uniform: &PhongUniform) -> FsOut {
        let normal = input.varyings.normal.normalize_or_zero();
        let light_dir = (uniform.light_position - input.varyings.world_position).normalize_or_zero();
        let view_dir = (uniform.view_position - input.varyings.world_position).normalize_or_zero();

        let ambient = AMBIENT_STRENGTH * uniform.light_color;
        let diffuse = normal.dot(light_dir).max(0.0) * uniform.light_color;
        let halfway = (view_dir + light_dir).normalize_or_zero();
        let specular = SPECULAR_STRENGTH
            * halfway.dot(normal).max(0.0).powf(SHININESS)
            * uniform.light_color;

        let shaded = ((ambient + diffuse + specular) * input.varyings.color).min(Vec3::ONE);
        FsOut {
            depth: input.depth,
            color: shaded.extend(1.0),
        }
    }

    fn interpolate(
        weights: Vec3,
        v0: &PhongVaryings,
        v1: &PhongVaryings,
        v2: &PhongVaryings,
    ) -> PhongVaryings {
        PhongVaryings {
            world_position: weights.x * v0.world_position
                + weights.y * v1.world_position
                + weights.z * v2.world_position,
            normal: weights.x * v0.normal + weights.y * v1.normal + weights.z * v2.normal,
            color: weights.x * v0.color + weights.y * v1.color + weights.z * v2.color,
        }
    }

    fn quad_derivative(_quad: &[PhongVaryings; 4]) -> Mat2 {
        Mat2::ZERO
    }
}
