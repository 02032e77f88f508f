/// Mipmapped 2D texture sampling.
///
/// The pyramid is built once at construction by repeated 2x2 box filtering;
/// `sample` picks the mip levels whose texel size brackets the caller's
/// screen-space footprint and blends their bilinear samples. Only the
/// `sample` signature is visible to the pipeline core - shader bodies are
/// the sole consumers.
use glam::Vec4;

struct MipLevel {
    width: usize,
    height: usize,
    texels: Vec<Vec4>,
}

impl MipLevel {
    #[inline]
    fn texel(&self, x: usize, y: usize) -> Vec4 {
        self.texels[y * self.width + x]
    }
}

pub struct Texture2d {
    levels: Vec<MipLevel>,
    /// UV-space size of one texel at the base level.
    base_texel: f32,
    mipmapped: bool,
}

impl Texture2d {
    /// Build a texture from row-major RGBA texels. A full mip pyramid is
    /// constructed when both extents are powers of two; otherwise the
    /// texture stays single-level and `sample` ignores the footprint.
    pub fn new(width: usize, height: usize, texels: Vec<Vec4>) -> Self {
        assert!(width > 0 && height > 0, "texture extents must be non-zero");
        assert_eq!(texels.len(), width * height, "texel count mismatch");

        let mipmapped = width.is_power_of_two() && height.is_power_of_two();
        let mut levels = vec![MipLevel {
            width,
            height,
            texels,
        }];

        if mipmapped {
            loop {
                let parent = levels.last().unwrap();
                if parent.width == 1 && parent.height == 1 {
                    break;
                }
                let width = (parent.width / 2).max(1);
                let height = (parent.height / 2).max(1);
                let mut texels = Vec::with_capacity(width * height);
                for y in 0..height {
                    for x in 0..width {
                        let x0 = (x * 2).min(parent.width - 1);
                        let x1 = (x * 2 + 1).min(parent.width - 1);
                        let y0 = (y * 2).min(parent.height - 1);
                        let y1 = (y * 2 + 1).min(parent.height - 1);
                        texels.push(
                            (parent.texel(x0, y0)
                                + parent.texel(x1, y0)
                                + parent.texel(x0, y1)
                                + parent.texel(x1, y1))
                                * 0.25,
                        );
                    }
                }
                levels.push(MipLevel {
                    width,
                    height,
                    texels,
                });
            }
        }

        Self {
            base_texel: 1.0 / width.max(height) as f32,
            levels,
            mipmapped,
        }
    }

    /// Checkerboard test pattern: `size` x `size` texels in `cell`-sized
    /// squares alternating between the two colors.
    pub fn checkerboard(size: usize, cell: usize, dark: Vec4, light: Vec4) -> Self {
        let cell = cell.max(1);
        let texels = (0..size * size)
            .map(|i| {
                let x = i % size;
                let y = i / size;
                if (x / cell + y / cell) % 2 == 0 {
                    dark
                } else {
                    light
                }
            })
            .collect();
        Self::new(size, size, texels)
    }

    pub fn width(&self) -> usize {
        self.levels[0].width
    }

    pub fn height(&self) -> usize {
        self.levels[0].height
    }

    /// Number of pyramid levels (1 when mipmapping is disabled).
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Trilinear-style sample: bilinear within the mip level(s) whose texel
    /// size brackets `footprint`, linearly blended between the two.
    /// Footprints at or below one base texel sample the base level directly.
    pub fn sample(&self, u: f32, v: f32, footprint: f32) -> Vec4 {
        if !self.mipmapped || footprint <= self.base_texel {
            return bilinear(&self.levels[0], u, v);
        }

        let mut len = self.base_texel;
        let mut level = 0usize;
        while footprint >= len && level < self.levels.len() {
            len *= 2.0;
            level += 1;
        }
        if level == self.levels.len() {
            return bilinear(self.levels.last().unwrap(), u, v);
        }

        // Share of the finer level: 1 at half this texel size, 0 at full.
        let t = (len - footprint) / (len * 0.5);
        let fine = bilinear(&self.levels[level - 1], u, v);
        let coarse = bilinear(&self.levels[level], u, v);
        fine * t + coarse * (1.0 - t)
    }

    /// Bilinear sample of the base level, no mip selection.
    pub fn sample_bilinear(&self, u: f32, v: f32) -> Vec4 {
        bilinear(&self.levels[0], u, v)
    }

    /// Nearest-texel sample of the base level.
    pub fn sample_nearest(&self, u: f32, v: f32) -> Vec4 {
        let level = &self.levels[0];
        let x = (u * level.width as f32).clamp(0.0, level.width as f32 - 1.0) as usize;
        let y = (v * level.height as f32).clamp(0.0, level.height as f32 - 1.0) as usize;
        level.texel(x, y)
    }
}

fn bilinear(level: &MipLevel, u: f32, v: f32) -> Vec4 {
    let xi = u * level.width as f32;
    let yi = v * level.height as f32;

    let x0 = (xi.floor() as isize).clamp(0, level.width as isize - 1) as usize;
    let y0 = (yi.floor() as isize).clamp(0, level.height as isize - 1) as usize;
    let x1 = (x0 + 1).min(level.width - 1);
    let y1 = (y0 + 1).min(level.height - 1);

    let tx = (xi - x0 as f32).clamp(0.0, 1.0);
    let ty = (yi - y0 as f32).clamp(0.0, 1.0);

    let top = level.texel(x0, y0).lerp(level.texel(x1, y0), tx);
    let bottom = level.texel(x0, y1).lerp(level.texel(x1, y1), tx);
    top.lerp(bottom, ty)
}
