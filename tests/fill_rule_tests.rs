// Edge-function sign convention and the top-left fill rule: adjacent
// triangles sharing an edge must cover every pixel of their union exactly
// once - no gaps, no double composites - and back-wound triangles must
// produce nothing.

use glam::{Mat2, Vec3, Vec4};
use softpipe::{AaMode, FsIn, FsOut, Pipeline, Program, VsOut};

/// Clip-space passthrough writing translucent white; double-composited
/// pixels are distinguishable from single ones by their final value.
struct TranslucentWhite;

impl Program for TranslucentWhite {
    type Uniform = ();
    type Vertex = Vec4;
    type Varyings = ();

    fn vertex(vertex: &Vec4, _uniform: &()) -> VsOut<()> {
        VsOut {
            position: *vertex,
            varyings: (),
        }
    }

    fn fragment(input: &FsIn<()>, _uniform: &()) -> FsOut {
        FsOut {
            depth: input.depth,
            color: Vec4::new(1.0, 1.0, 1.0, 0.5),
        }
    }

    fn interpolate(_weights: Vec3, _v0: &(), _v1: &(), _v2: &()) {}

    fn quad_derivative(_quad: &[(); 4]) -> Mat2 {
        Mat2::ZERO
    }
}

fn screen_vertex(x: f32, y: f32, z: f32, size: f32) -> Vec4 {
    Vec4::new(2.0 * x / size - 1.0, 2.0 * y / size - 1.0, z, 1.0)
}

#[test]
fn shared_diagonal_covers_every_pixel_exactly_once() {
    let size = 64.0;
    let mut pipeline = Pipeline::new(64, 64);
    pipeline.clear(Vec4::new(0.0, 0.0, 0.0, 1.0));

    // Upper-left half of the quad at z = 0.8.
    let a = screen_vertex(10.0, 10.0, 0.8, size);
    let c = screen_vertex(40.0, 40.0, 0.8, size);
    let d = screen_vertex(10.0, 40.0, 0.8, size);

    // Lower-right half sits nearer so an (incorrect) double coverage of the
    // shared diagonal would survive the depth test and composite twice.
    let a2 = screen_vertex(10.0, 10.0, 0.5, size);
    let b2 = screen_vertex(40.0, 10.0, 0.5, size);
    let c2 = screen_vertex(40.0, 40.0, 0.5, size);

    let vertices = [a, d, c, a2, c2, b2];
    let indices = [0u32, 1, 2, 3, 4, 5];

    pipeline
        .render::<TranslucentWhite>(&vertices, &indices, &(), AaMode::Standard)
        .unwrap();

    let fb = pipeline.framebuffer();
    for y in 10..40 {
        for x in 10..40 {
            let value = fb.color_at(x, y).x;
            // One composite of 0.5-alpha white over black is exactly 0.5;
            // a gap stays 0.0 and a double composite reaches 0.75.
            assert!(
                (value - 0.5).abs() < 1e-5,
                "pixel ({x}, {y}) composited {value} times the expected amount"
            );
        }
    }
}

#[test]
fn back_wound_triangle_is_invisible() {
    let size = 32.0;
    let mut pipeline = Pipeline::new(32, 32);
    let clear = Vec4::new(0.0, 0.0, 0.0, 1.0);
    pipeline.clear(clear);

    // Reversed winding of a triangle that would otherwise cover pixels.
    let vertices = [
        screen_vertex(4.0, 4.0, 0.0, size),
        screen_vertex(28.0, 4.0, 0.0, size),
        screen_vertex(4.0, 28.0, 0.0, size),
    ];
    pipeline
        .render::<TranslucentWhite>(&vertices, &[0, 1, 2], &(), AaMode::Standard)
        .unwrap();

    assert_eq!(pipeline.stats().pixels_written, 0);
    let fb = pipeline.framebuffer();
    for y in 0..32 {
        for x in 0..32 {
            assert_eq!(fb.color_at(x, y), clear);
        }
    }
}

#[test]
fn front_wound_triangle_covers_its_centroid() {
    let size = 32.0;
    let mut pipeline = Pipeline::new(32, 32);
    pipeline.clear(Vec4::new(0.0, 0.0, 0.0, 1.0));

    let vertices = [
        screen_vertex(4.0, 4.0, 0.0, size),
        screen_vertex(4.0, 28.0, 0.0, size),
        screen_vertex(28.0, 4.0, 0.0, size),
    ];
    pipeline
        .render::<TranslucentWhite>(&vertices, &[0, 1, 2], &(), AaMode::Standard)
        .unwrap();

    let fb = pipeline.framebuffer();
    assert!(fb.color_at(12, 12).x > 0.0, "centroid pixel must be covered");
}
