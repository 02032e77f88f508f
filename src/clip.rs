/// Homogeneous-space clipping against the near and far planes.
///
/// Triangles are clipped in clip space, before the perspective divide, so
/// intersection points can be found by solving the plane equations linearly
/// along each edge. The side frustum planes are deliberately not clipped:
/// off-screen geometry is discarded later by the bounding-box clamp and the
/// per-pixel edge test, at the cost of wasted work on oversized triangles.
use crate::shader::{Program, VsOut};
use glam::{Vec3, Vec4};
use log::trace;

/// Plane-equation denominators below this are treated as non-intersecting
/// so near-parallel edges never produce a division blow-up.
pub const PLANE_EPS: f32 = 1e-6;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClipState {
    Inside,
    Near,
    Far,
}

/// Classify a clip-space position against `-|w| <= z <= |w|`.
#[inline]
fn classify(position: Vec4) -> ClipState {
    let limit = position.w.abs();
    if position.z < -limit {
        ClipState::Near
    } else if position.z > limit {
        ClipState::Far
    } else {
        ClipState::Inside
    }
}

/// Signed distance to the plane an outside vertex violated.
/// Near plane: z + w = 0. Far plane: w - z = 0.
#[inline]
fn plane_value(side: ClipState, position: Vec4) -> f32 {
    match side {
        ClipState::Near => position.z + position.w,
        ClipState::Far => position.w - position.z,
        ClipState::Inside => 0.0,
    }
}

/// Intersect the edge `a -> b` with the plane `side`, synthesizing a full
/// vertex record by component-wise linear interpolation. Returns `None`
/// when the edge runs (numerically) parallel to the plane or the root falls
/// outside the open interval (0, 1).
fn intersect_edge<P: Program>(
    side: ClipState,
    a: &VsOut<P::Varyings>,
    b: &VsOut<P::Varyings>,
) -> Option<VsOut<P::Varyings>> {
    let fa = plane_value(side, a.position);
    let fb = plane_value(side, b.position);
    let denom = fa - fb;
    if denom.abs() < PLANE_EPS {
        return None;
    }

    let t = fa / denom;
    if t <= 0.0 || t >= 1.0 {
        return None;
    }

    Some(VsOut {
        position: a.position.lerp(b.position, t),
        varyings: P::interpolate(Vec3::new(1.0 - t, t, 0.0), &a.varyings, &b.varyings, &a.varyings),
    })
}

/// Clip every input triangle against the near/far planes.
///
/// Synthesized vertices are appended to `vertices`; the returned index list
/// references both original and synthesized records and replaces the input
/// index list entirely. Each clipped polygon is fan-triangulated from its
/// first vertex; polygons reduced below three vertices are dropped.
pub fn clip_stage<P: Program>(
    vertices: &mut Vec<VsOut<P::Varyings>>,
    indices: &[u32],
) -> Vec<u32> {
    let mut out_indices = Vec::with_capacity(indices.len());
    // Ordered vertex loop of the polygon a single triangle clips to.
    // Two planes can cut a triangle to at most five vertices; each of the
    // three edges contributes at most four entries before deduplication.
    let mut polygon: Vec<u32> = Vec::with_capacity(12);

    for triangle in indices.chunks_exact(3) {
        let states = [
            classify(vertices[triangle[0] as usize].position),
            classify(vertices[triangle[1] as usize].position),
            classify(vertices[triangle[2] as usize].position),
        ];

        // Fast path: nothing to clip.
        if states.iter().all(|&s| s == ClipState::Inside) {
            out_indices.extend_from_slice(triangle);
            continue;
        }
        // Fully outside on one side contributes nothing.
        if states[0] != ClipState::Inside && states[1] == states[0] && states[2] == states[0] {
            continue;
        }

        polygon.clear();
        for edge in 0..3 {
            let k0 = edge;
            let k1 = (edge + 1) % 3;
            let (i0, i1) = (triangle[k0], triangle[k1]);
            let (s0, s1) = (states[k0], states[k1]);

            if s0 == ClipState::Inside && s1 == ClipState::Inside {
                polygon.push(i0);
                polygon.push(i1);
                continue;
            }
            if s0 != ClipState::Inside && s0 == s1 {
                continue;
            }

            // Each endpoint contributes either itself (inside) or the
            // intersection with the plane it violated.
            for (index, side) in [(i0, s0), (i1, s1)] {
                if side == ClipState::Inside {
                    polygon.push(index);
                } else {
                    let a = vertices[i0 as usize];
                    let b = vertices[i1 as usize];
                    if let Some(synth) = intersect_edge::<P>(side, &a, &b) {
                        vertices.push(synth);
                        polygon.push((vertices.len() - 1) as u32);
                    }
                }
            }
        }

        // Collapse consecutive duplicates, then the wraparound duplicate.
        polygon.dedup();
        if polygon.len() > 1 && polygon.first() == polygon.last() {
            polygon.pop();
        }

        if polygon.len() < 3 {
            continue;
        }
        for i in 1..polygon.len() - 1 {
            out_indices.extend_from_slice(&[polygon[0], polygon[i], polygon[i + 1]]);
        }
    }

    trace!(
        "clip: {} triangles in, {} out, {} vertices total",
        indices.len() / 3,
        out_indices.len() / 3,
        vertices.len()
    );

    out_indices
}
