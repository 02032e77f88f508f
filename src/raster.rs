/// Quad-granular rasterization, shading and compositing.
///
/// Triangles arrive viewport-mapped: `x`/`y` in pixels, `z` in its divided
/// range, `w` still holding the clip-space value for perspective correction.
/// The bounding box of each triangle is walked in 2x2 quads so screen-space
/// derivatives can be estimated by finite differences across the quad;
/// pixels that fail the edge test still act as helper fragments for the
/// derivative estimate.
use crate::framebuffer::Framebuffer;
use crate::pipeline::RenderStats;
use crate::shader::{AaMode, FsIn, Program, VsOut};
use glam::{Vec2, Vec3};
use std::array;

/// Perspective-correction denominators below this omit the contribution
/// instead of propagating inf/NaN.
const CORRECTION_EPS: f32 = 1e-6;

/// Pixel offsets of a 2x2 quad, in (x, y) order matching `quad_derivative`.
const QUAD_OFFSETS: [(i32, i32); 4] = [(0, 0), (1, 0), (0, 1), (1, 1)];

/// MSAAx4 sub-pixel sample offsets from the pixel center.
const SAMPLE_OFFSETS: [(f32, f32); 4] = [(-0.25, -0.25), (0.25, -0.25), (-0.25, 0.25), (0.25, 0.25)];

/// Signed edge function. Positive on the interior side of `v1 -> v2` for a
/// front-wound triangle; the three values form an unnormalized barycentric
/// triple whose sum is the doubled signed triangle area.
#[inline]
pub(crate) fn edge_function(p: Vec2, v1: Vec2, v2: Vec2) -> f32 {
    (p.y - v2.y) * (v1.x - v2.x) - (p.x - v2.x) * (v1.y - v2.y)
}

/// One triangle edge with its precomputed fill-rule tie-break flag.
#[derive(Copy, Clone)]
struct Edge {
    a: Vec2,
    b: Vec2,
    top_left: bool,
}

impl Edge {
    fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            a,
            b,
            top_left: a.x <= b.x && a.y <= b.y,
        }
    }

    #[inline]
    fn eval(&self, p: Vec2) -> f32 {
        edge_function(p, self.a, self.b)
    }

    /// Fill rule: strictly positive, or exactly on the edge when the edge is
    /// a top-left one. Resolves shared edges deterministically with neither
    /// double coverage nor gaps.
    #[inline]
    fn accepts(&self, value: f32) -> bool {
        value > 0.0 || (value == 0.0 && self.top_left)
    }
}

#[inline]
fn sample_covered(edges: &[Edge; 3], p: Vec2) -> (Vec3, bool) {
    let raw = Vec3::new(edges[0].eval(p), edges[1].eval(p), edges[2].eval(p));
    let covered =
        edges[0].accepts(raw.x) && edges[1].accepts(raw.y) && edges[2].accepts(raw.z);
    (raw, covered)
}

/// Interpolation weights for one pixel.
#[derive(Copy, Clone)]
struct PixelWeights {
    /// Screen-linear barycentrics, normalized to sum 1.
    screen: Vec3,
    /// Perspective-corrected interpolation weights.
    corrected: Vec3,
    /// Screen-linear interpolated depth.
    depth: f32,
}

fn solve_weights(raw: Vec3, z: Vec3, inv_w: Vec3) -> Option<PixelWeights> {
    let sum = raw.x + raw.y + raw.z;
    if sum.abs() < CORRECTION_EPS {
        return None;
    }
    let screen = raw / sum;

    let corrected = screen * inv_w;
    let corrected_sum = corrected.x + corrected.y + corrected.z;
    if corrected_sum.abs() < CORRECTION_EPS {
        return None;
    }

    Some(PixelWeights {
        screen,
        corrected: corrected / corrected_sum,
        depth: screen.dot(z),
    })
}

/// Rasterize viewport-mapped triangles into the framebuffer.
pub(crate) fn raster_stage<P: Program>(
    framebuffer: &mut Framebuffer,
    vertices: &[VsOut<P::Varyings>],
    indices: &[u32],
    uniform: &P::Uniform,
    aa: AaMode,
    stats: &mut RenderStats,
) {
    let fb_width = framebuffer.width as i32;
    let fb_height = framebuffer.height as i32;
    if fb_width < 2 || fb_height < 2 {
        return;
    }

    for triangle in indices.chunks_exact(3) {
        let v0 = &vertices[triangle[0] as usize];
        let v1 = &vertices[triangle[1] as usize];
        let v2 = &vertices[triangle[2] as usize];

        let p0 = v0.position;
        let p1 = v1.position;
        let p2 = v2.position;

        if !p0.is_finite() || !p1.is_finite() || !p2.is_finite() {
            stats.triangles_skipped += 1;
            continue;
        }
        if p0.w.abs() < CORRECTION_EPS
            || p1.w.abs() < CORRECTION_EPS
            || p2.w.abs() < CORRECTION_EPS
        {
            stats.triangles_skipped += 1;
            continue;
        }

        let a = Vec2::new(p0.x, p0.y);
        let b = Vec2::new(p1.x, p1.y);
        let c = Vec2::new(p2.x, p2.y);

        // Doubled signed area. Zero-area triangles produce no pixels, and
        // nothing back-wound can pass the all-positive fill rule, so both
        // are rejected up front.
        let area = edge_function(a, b, c);
        if area <= 0.0 {
            stats.triangles_skipped += 1;
            continue;
        }

        // Even-aligned screen bounding box so the walk tiles into 2x2 quads.
        let mut min_x = a.x.min(b.x).min(c.x).floor() as i32;
        let mut max_x = a.x.max(b.x).max(c.x).ceil() as i32;
        let mut min_y = a.y.min(b.y).min(c.y).floor() as i32;
        let mut max_y = a.y.max(b.y).max(c.y).ceil() as i32;

        min_x = (min_x - (min_x & 1)).max(0);
        min_y = (min_y - (min_y & 1)).max(0);
        max_x = (max_x + (max_x & 1)).min(fb_width - 2);
        max_y = (max_y + (max_y & 1)).min(fb_height - 2);

        if min_x > max_x || min_y > max_y {
            stats.triangles_skipped += 1;
            continue;
        }
        stats.triangles_rasterized += 1;

        let edges = [Edge::new(b, c), Edge::new(c, a), Edge::new(a, b)];
        let z = Vec3::new(p0.z, p1.z, p2.z);
        let inv_w = Vec3::new(1.0 / p0.w, 1.0 / p1.w, 1.0 / p2.w);

        let mut qy = min_y;
        while qy <= max_y {
            let mut qx = min_x;
            while qx <= max_x {
                rasterize_quad::<P>(
                    framebuffer,
                    &edges,
                    z,
                    inv_w,
                    (v0, v1, v2),
                    uniform,
                    aa,
                    (qx, qy),
                    stats,
                );
                qx += 2;
            }
            qy += 2;
        }
    }
}

/// Process one 2x2 pixel quad: coverage, perspective correction, the shared
/// derivative estimate, fragment shading, and the late depth-tested blend.
#[allow(clippy::too_many_arguments)]
fn rasterize_quad<P: Program>(
    framebuffer: &mut Framebuffer,
    edges: &[Edge; 3],
    z: Vec3,
    inv_w: Vec3,
    (v0, v1, v2): (&VsOut<P::Varyings>, &VsOut<P::Varyings>, &VsOut<P::Varyings>),
    uniform: &P::Uniform,
    aa: AaMode,
    (qx, qy): (i32, i32),
    stats: &mut RenderStats,
) {
    let mut raw = [Vec3::ZERO; 4];
    let mut covered = [false; 4];
    let mut coverage = [0.0f32; 4];
    let mut any_covered = false;

    for i in 0..4 {
        let center = Vec2::new(
            (qx + QUAD_OFFSETS[i].0) as f32 + 0.5,
            (qy + QUAD_OFFSETS[i].1) as f32 + 0.5,
        );
        stats.pixels_tested += 1;

        let (values, inside) = sample_covered(edges, center);
        raw[i] = values;
        covered[i] = inside;
        if !inside {
            continue;
        }
        any_covered = true;

        coverage[i] = match aa {
            AaMode::Standard => 1.0,
            AaMode::Msaa4 => {
                let mut hits = 0u32;
                for (dx, dy) in SAMPLE_OFFSETS {
                    let (_, sub_inside) =
                        sample_covered(edges, center + Vec2::new(dx, dy));
                    if sub_inside {
                        hits += 1;
                    }
                }
                hits as f32 / SAMPLE_OFFSETS.len() as f32
            }
        };
    }

    if !any_covered {
        return;
    }

    let weights: [Option<PixelWeights>; 4] = array::from_fn(|i| solve_weights(raw[i], z, inv_w));

    // Screen-linear interpolation for all four pixels, helpers included,
    // feeding the per-quad finite-difference derivative.
    let linear: [P::Varyings; 4] = array::from_fn(|i| {
        let screen = weights[i].map_or(Vec3::X, |w| w.screen);
        P::interpolate(screen, &v0.varyings, &v1.varyings, &v2.varyings)
    });
    let derivative = P::quad_derivative(&linear);

    for i in 0..4 {
        if !covered[i] {
            continue;
        }
        let Some(pixel) = weights[i] else {
            continue;
        };

        let input = FsIn {
            varyings: P::interpolate(pixel.corrected, &v0.varyings, &v1.varyings, &v2.varyings),
            depth: pixel.depth,
            derivative,
        };
        let output = P::fragment(&input, uniform);
        stats.pixels_shaded += 1;

        let mut color = output.color;
        color.w *= coverage[i];

        let px = (qx + QUAD_OFFSETS[i].0) as usize;
        let py = (qy + QUAD_OFFSETS[i].1) as usize;
        if framebuffer.blend_pixel(px, py, output.depth, color) {
            stats.pixels_written += 1;
        }
    }
}
