/// Pipeline orchestrator.
///
/// Owns the persistent color/depth buffers and sequences the four stages per
/// frame: vertex shading, near/far clipping, perspective divide + viewport
/// mapping, and rasterization. `clear` must run once before each `render`;
/// the buffers persist across frames otherwise.
use crate::clip::clip_stage;
use crate::framebuffer::Framebuffer;
use crate::raster::raster_stage;
use crate::shader::{AaMode, Program, VsOut};
use glam::Vec4;
use log::debug;
use std::error::Error;
use std::fmt;

/// Draw-call validation failures. Numerical edge cases (degenerate
/// triangles, near-parallel clip edges, off-screen coordinates) are handled
/// by policy inside the stages and never surface as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    /// Index buffer length is not a multiple of three.
    IndexCount(usize),
    /// An index references a vertex past the end of the vertex buffer.
    IndexOutOfBounds { index: u32, vertex_count: usize },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::IndexCount(len) => {
                write!(f, "index buffer length {len} is not a multiple of 3")
            }
            RenderError::IndexOutOfBounds {
                index,
                vertex_count,
            } => write!(
                f,
                "index {index} out of bounds for {vertex_count} vertices"
            ),
        }
    }
}

impl Error for RenderError {}

/// Per-frame pipeline counters, reset on `clear`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderStats {
    pub triangles_in: u64,
    /// Triangles surviving the clip stage (including re-triangulated ones).
    pub triangles_rasterized: u64,
    /// Degenerate, back-wound or non-finite triangles rejected up front.
    pub triangles_skipped: u64,
    pub pixels_tested: u64,
    pub pixels_shaded: u64,
    pub pixels_written: u64,
}

impl RenderStats {
    pub fn reset(&mut self) {
        *self = RenderStats::default();
    }
}

pub struct Pipeline {
    framebuffer: Framebuffer,
    stats: RenderStats,
}

impl Pipeline {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            framebuffer: Framebuffer::new(width, height),
            stats: RenderStats::default(),
        }
    }

    /// Reset the framebuffer to `clear_color`, the depth buffer to the far
    /// plane, and the frame statistics. Call once before each `render`.
    pub fn clear(&mut self, clear_color: Vec4) {
        self.framebuffer.clear(clear_color);
        self.stats.reset();
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Resize the render target. The next frame must start with `clear`.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.framebuffer.resize(width, height);
    }

    /// Run one draw call through the pipeline and return the framebuffer.
    pub fn render<P: Program>(
        &mut self,
        vertices: &[P::Vertex],
        indices: &[u32],
        uniform: &P::Uniform,
        aa: AaMode,
    ) -> Result<&Framebuffer, RenderError> {
        if indices.len() % 3 != 0 {
            return Err(RenderError::IndexCount(indices.len()));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(RenderError::IndexOutOfBounds {
                index: bad,
                vertex_count: vertices.len(),
            });
        }
        self.stats.triangles_in += (indices.len() / 3) as u64;

        // Vertex stage: one shader invocation per submitted vertex.
        let mut shaded: Vec<VsOut<P::Varyings>> =
            vertices.iter().map(|v| P::vertex(v, uniform)).collect();

        // Clip stage: may append synthesized vertices and re-triangulate.
        let clipped_indices = clip_stage::<P>(&mut shaded, indices);

        // Perspective divide + viewport mapping, exactly once per record
        // regardless of how many triangles reference it.
        divide_and_map(&mut shaded, self.framebuffer.width, self.framebuffer.height);

        raster_stage::<P>(
            &mut self.framebuffer,
            &shaded,
            &clipped_indices,
            uniform,
            aa,
            &mut self.stats,
        );

        debug!(
            "render: {} tris in, {} rasterized, {} skipped, {}/{} pixels written/shaded",
            self.stats.triangles_in,
            self.stats.triangles_rasterized,
            self.stats.triangles_skipped,
            self.stats.pixels_written,
            self.stats.pixels_shaded,
        );

        Ok(&self.framebuffer)
    }
}

/// In-place perspective divide and viewport transform.
///
/// `x`/`y` move to pixel coordinates, `z` stays in its divided range for the
/// depth test, and `w` keeps the clip-space value the rasterizer needs for
/// perspective correction. Vertices with a vanishing `w` are left untouched;
/// the rasterizer rejects any triangle still referencing one.
fn divide_and_map<V>(vertices: &mut [VsOut<V>], width: usize, height: usize) {
    let half_w = width as f32 * 0.5;
    let half_h = height as f32 * 0.5;

    for vertex in vertices {
        let w = vertex.position.w;
        if w.abs() < f32::EPSILON {
            continue;
        }
        let ndc = vertex.position / w;
        vertex.position = Vec4::new(
            (ndc.x + 1.0) * half_w,
            (ndc.y + 1.0) * half_h,
            ndc.z,
            w,
        );
    }
}
