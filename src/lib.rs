/// Softpipe - deterministic CPU software rasterizer.
///
/// A programmable pipeline in the classic four-stage shape: vertex shading,
/// homogeneous near/far clipping, perspective divide + viewport mapping, and
/// quad-granular rasterization with perspective-correct interpolation,
/// optional 4x multisample coverage, late depth testing and alpha-over
/// compositing. Single-threaded and pixel-exact by design; presentation,
/// file output and windowing are the caller's business.
pub mod clip;
pub mod framebuffer;
pub mod pipeline;
mod raster;
pub mod shader;
pub mod shaders;
pub mod texture;

pub use framebuffer::{rgba_to_argb8888, Framebuffer, DEPTH_CLEAR};
pub use pipeline::{Pipeline, RenderError, RenderStats};
pub use shader::{AaMode, FsIn, FsOut, Program, VsOut};
pub use texture::Texture2d;
