/// Benchmark suite for the rendering pipeline.
/// Tests performance of frame clears, flat and textured draws, MSAA cost,
/// and hot-path texture sampling.
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::{Mat4, Vec2, Vec3, Vec4};
use softpipe::shaders::{
    ColorProgram, ColorUniform, ColorVertex, TextureProgram, TextureUniform, TextureVertex,
};
use softpipe::{AaMode, Pipeline, Texture2d};

const WIDTH: usize = 1280;
const HEIGHT: usize = 720;
const CLEAR: Vec4 = Vec4::new(0.53, 0.81, 0.92, 1.0);

fn color_quad() -> (Vec<ColorVertex>, Vec<u32>) {
    let quad = [
        (Vec3::new(-0.9, -0.9, 0.0), Vec3::new(1.0, 0.2, 0.2)),
        (Vec3::new(-0.9, 0.9, 0.0), Vec3::new(0.2, 1.0, 0.2)),
        (Vec3::new(0.9, 0.9, 0.0), Vec3::new(0.2, 0.2, 1.0)),
        (Vec3::new(0.9, -0.9, 0.0), Vec3::new(1.0, 1.0, 0.2)),
    ];
    let vertices = quad
        .iter()
        .map(|&(position, color)| ColorVertex { position, color })
        .collect();
    (vertices, vec![0, 1, 2, 0, 2, 3])
}

fn texture_quad() -> (Vec<TextureVertex>, Vec<u32>) {
    let quad = [
        (Vec3::new(-0.9, -0.9, 0.0), Vec2::new(0.0, 0.0)),
        (Vec3::new(-0.9, 0.9, 0.0), Vec2::new(0.0, 1.0)),
        (Vec3::new(0.9, 0.9, 0.0), Vec2::new(1.0, 1.0)),
        (Vec3::new(0.9, -0.9, 0.0), Vec2::new(1.0, 0.0)),
    ];
    let vertices = quad
        .iter()
        .map(|&(position, uv)| TextureVertex { position, uv })
        .collect();
    (vertices, vec![0, 1, 2, 0, 2, 3])
}

fn bench_pipeline_clear(c: &mut Criterion) {
    c.bench_function("pipeline_clear", |b| {
        let mut pipeline = Pipeline::new(WIDTH, HEIGHT);
        b.iter(|| {
            pipeline.clear(black_box(CLEAR));
        });
    });
}

fn bench_render_color_quad(c: &mut Criterion) {
    c.bench_function("render_color_quad", |b| {
        let mut pipeline = Pipeline::new(WIDTH, HEIGHT);
        let (vertices, indices) = color_quad();
        let uniform = ColorUniform {
            mvp: Mat4::IDENTITY,
        };

        b.iter(|| {
            pipeline.clear(CLEAR);
            pipeline
                .render::<ColorProgram>(
                    black_box(&vertices),
                    black_box(&indices),
                    &uniform,
                    AaMode::Standard,
                )
                .unwrap();
        });
    });
}

fn bench_render_textured_quad(c: &mut Criterion) {
    for (name, aa) in [
        ("render_textured_quad_standard", AaMode::Standard),
        ("render_textured_quad_msaa4", AaMode::Msaa4),
    ] {
        c.bench_function(name, |b| {
            let mut pipeline = Pipeline::new(WIDTH, HEIGHT);
            let (vertices, indices) = texture_quad();
            let uniform = TextureUniform {
                mvp: Mat4::IDENTITY,
                texture: Texture2d::checkerboard(
                    256,
                    16,
                    Vec4::new(0.04, 0.04, 0.04, 1.0),
                    Vec4::new(0.78, 0.78, 0.78, 1.0),
                ),
            };

            b.iter(|| {
                pipeline.clear(CLEAR);
                pipeline
                    .render::<TextureProgram>(
                        black_box(&vertices),
                        black_box(&indices),
                        &uniform,
                        aa,
                    )
                    .unwrap();
            });
        });
    }
}

fn bench_texture_sample(c: &mut Criterion) {
    c.bench_function("texture_sample_mipmapped", |b| {
        let texture = Texture2d::checkerboard(
            256,
            16,
            Vec4::new(0.04, 0.04, 0.04, 1.0),
            Vec4::new(0.78, 0.78, 0.78, 1.0),
        );

        b.iter(|| {
            let mut acc = Vec4::ZERO;
            for i in 0..64 {
                let t = i as f32 / 64.0;
                acc += texture.sample(black_box(t), black_box(1.0 - t), black_box(t * 0.02));
            }
            acc
        });
    });
}

criterion_group!(
    benches,
    bench_pipeline_clear,
    bench_render_color_quad,
    bench_render_textured_quad,
    bench_texture_sample
);
criterion_main!(benches);
