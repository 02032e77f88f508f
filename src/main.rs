/// Demo entry point: spinning textured cube rendered by the software
/// pipeline and presented through a softbuffer window.
use anyhow::Context;
use glam::{Mat4, Vec2, Vec3, Vec4};
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use softpipe::shaders::{TextureProgram, TextureUniform, TextureVertex};
use softpipe::{rgba_to_argb8888, AaMode, Pipeline, Texture2d};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 800;
const CLEAR_COLOR: Vec4 = Vec4::new(0.39, 0.39, 0.39, 1.0);

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("=== softpipe - software rasterizer demo ===");
    println!("Controls:");
    println!("  M   - toggle MSAA x4 / standard sampling");
    println!("  ESC - exit");
    println!();

    let event_loop = EventLoop::new().context("creating event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("softpipe")
            .with_inner_size(winit::dpi::LogicalSize::new(WIDTH, HEIGHT))
            .build(&event_loop)
            .context("creating window")?,
    );

    let context = softbuffer::Context::new(window.clone())
        .map_err(|e| anyhow::anyhow!("creating softbuffer context: {e}"))?;
    let mut surface = softbuffer::Surface::new(&context, window.clone())
        .map_err(|e| anyhow::anyhow!("creating softbuffer surface: {e}"))?;

    let window_size = window.inner_size();
    let mut pipeline = Pipeline::new(window_size.width as usize, window_size.height as usize);

    let (vertices, indices) = cube_mesh();
    let texture = Texture2d::checkerboard(
        256,
        16,
        Vec4::new(0.04, 0.04, 0.04, 1.0),
        Vec4::new(0.78, 0.78, 0.78, 1.0),
    );

    let mut uniform = TextureUniform {
        mvp: Mat4::IDENTITY,
        texture,
    };

    let mut aa_mode = AaMode::Msaa4;
    let start = Instant::now();
    let mut frame_count = 0u32;
    let mut fps_timer = Instant::now();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        elwt.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        pipeline.resize(new_size.width as usize, new_size.height as usize);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        let pressed = event.state == ElementState::Pressed;
                        if let PhysicalKey::Code(keycode) = event.physical_key {
                            match keycode {
                                KeyCode::KeyM if pressed => {
                                    aa_mode = match aa_mode {
                                        AaMode::Standard => AaMode::Msaa4,
                                        AaMode::Msaa4 => AaMode::Standard,
                                    };
                                    println!("Sampling: {aa_mode:?}");
                                }
                                KeyCode::Escape if pressed => {
                                    elwt.exit();
                                }
                                _ => {}
                            }
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let time = start.elapsed().as_secs_f32();
                        let width = pipeline.framebuffer().width;
                        let height = pipeline.framebuffer().height;
                        if width < 2 || height < 2 {
                            return;
                        }
                        let aspect = width as f32 / height as f32;

                        let model =
                            Mat4::from_axis_angle(Vec3::new(1.0, 1.0, 1.0).normalize(), time * 0.6);
                        let view =
                            Mat4::look_at_rh(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y);
                        let projection =
                            Mat4::perspective_rh(60f32.to_radians(), aspect, 0.1, 100.0);

                        uniform.mvp = projection * view * model;

                        pipeline.clear(CLEAR_COLOR);
                        pipeline
                            .render::<TextureProgram>(&vertices, &indices, &uniform, aa_mode)
                            .expect("static demo geometry is always valid");

                        surface
                            .resize(
                                NonZeroU32::new(width as u32).unwrap(),
                                NonZeroU32::new(height as u32).unwrap(),
                            )
                            .unwrap();

                        let framebuffer = pipeline.framebuffer();
                        let mut buffer = surface.buffer_mut().unwrap();
                        for y in 0..height {
                            // The pipeline's y axis points up; scanout rows go down.
                            let src_y = height - 1 - y;
                            for x in 0..width {
                                buffer[y * width + x] =
                                    rgba_to_argb8888(framebuffer.color_at(x, src_y));
                            }
                        }
                        buffer.present().unwrap();

                        frame_count += 1;
                        if fps_timer.elapsed().as_secs() >= 1 {
                            let stats = pipeline.stats();
                            println!(
                                "FPS: {} | {} tris rasterized | {} pixels written",
                                frame_count, stats.triangles_rasterized, stats.pixels_written
                            );
                            frame_count = 0;
                            fps_timer = Instant::now();
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    window.request_redraw();
                }
                _ => {}
            }
        })
        .context("running event loop")?;

    Ok(())
}

/// Unit cube as 24 vertices / 12 triangles, one quad per face, front-wound
/// when seen from outside.
fn cube_mesh() -> (Vec<TextureVertex>, Vec<u32>) {
    // (normal, right, up) per face with right x up = normal.
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, right, up) in faces {
        let base = vertices.len() as u32;
        let center = normal * 0.5;
        let corners = [
            (center - right * 0.5 - up * 0.5, Vec2::new(0.0, 0.0)),
            (center - right * 0.5 + up * 0.5, Vec2::new(0.0, 1.0)),
            (center + right * 0.5 + up * 0.5, Vec2::new(1.0, 1.0)),
            (center + right * 0.5 - up * 0.5, Vec2::new(1.0, 0.0)),
        ];
        for (position, uv) in corners {
            vertices.push(TextureVertex { position, uv });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}
