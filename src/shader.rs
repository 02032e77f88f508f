/// Shader program contract for the pipeline.
///
/// The pipeline is generic over one `Program` implementation per draw call.
/// Vertex and fragment entry points are pure functions of their input record
/// and the per-draw uniform block; the `interpolate`/`quad_derivative` pair
/// binds the rasterizer to the program's varying layout without the core
/// knowing anything about its fields.
use glam::{Mat2, Vec3, Vec4};

/// Anti-aliasing mode selected per draw call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AaMode {
    /// One coverage sample at the pixel center; binary coverage.
    Standard,
    /// Four coverage samples at +-0.25 offsets; the pass count scales the
    /// shaded fragment's alpha.
    Msaa4,
}

/// Post-vertex-shader record: mandatory clip-space position plus the
/// program's interpolable fields. The clipper may synthesize new records by
/// linear interpolation of existing ones.
#[derive(Copy, Clone, Debug)]
pub struct VsOut<V> {
    /// Clip-space position while clipping runs. After the perspective divide
    /// and viewport transform, `x`/`y` are pixel coordinates, `z` stays in
    /// its divided range, and `w` keeps the original clip-space value for
    /// perspective correction.
    pub position: Vec4,
    pub varyings: V,
}

/// Per-fragment shader input, assembled once per covered pixel.
#[derive(Copy, Clone, Debug)]
pub struct FsIn<V> {
    /// Perspective-correct interpolated varyings.
    pub varyings: V,
    /// Screen-linear interpolated depth of this fragment.
    pub depth: f32,
    /// Screen-space derivative bundle shared by the fragment's 2x2 quad.
    /// Columns are the x and y finite differences of the program's
    /// representative 2-vector (typically texture coordinates).
    pub derivative: Mat2,
}

/// Fragment shader output consumed by the compositor.
#[derive(Copy, Clone, Debug)]
pub struct FsOut {
    pub depth: f32,
    /// Unpremultiplied RGBA.
    pub color: Vec4,
}

pub trait Program {
    type Uniform;
    type Vertex;
    type Varyings: Copy;

    /// Transform one application vertex into clip space.
    fn vertex(vertex: &Self::Vertex, uniform: &Self::Uniform) -> VsOut<Self::Varyings>;

    /// Shade one fragment.
    fn fragment(input: &FsIn<Self::Varyings>, uniform: &Self::Uniform) -> FsOut;

    /// Blend three varying records with the given weights. The weights sum
    /// to 1; the clipper calls this with `(1-t, t, 0)` to interpolate along
    /// an edge, the rasterizer with perspective-corrected barycentrics.
    fn interpolate(
        weights: Vec3,
        v0: &Self::Varyings,
        v1: &Self::Varyings,
        v2: &Self::Varyings,
    ) -> Self::Varyings;

    /// Finite-difference the representative 2-vector over a 2x2 quad.
    /// Input order is (x, y), (x+1, y), (x, y+1), (x+1, y+1).
    fn quad_derivative(quad: &[Self::Varyings; 4]) -> Mat2;
}
