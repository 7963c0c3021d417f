//! Sprite textures: CPU-side images and their GPU upload.
//!
//! Particles sample a single RGBA texture (optionally laid out as a sprite
//! sheet grid). Images can be loaded from PNG/JPEG files or generated
//! procedurally, so the demos run without any asset files on disk.
//!
//! # Example
//!
//! ```ignore
//! use embers::texture::SpriteImage;
//!
//! let from_disk = SpriteImage::load("assets/puff.png")?;
//! let procedural = SpriteImage::soft_circle(64);
//! ```

use std::path::Path;

use crate::error::TextureError;

/// Filter mode for sprite sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Smooth linear filtering (default).
    #[default]
    Linear,
    /// Sharp nearest-neighbor filtering. Good for pixel art sprites.
    Nearest,
}

/// An RGBA image on the CPU, ready for upload.
#[derive(Debug, Clone)]
pub struct SpriteImage {
    /// Raw RGBA pixel data (width * height * 4 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub filter: FilterMode,
}

impl SpriteImage {
    /// Wraps raw RGBA data.
    ///
    /// # Panics
    ///
    /// Panics if `data` is not exactly `width * height * 4` bytes.
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Self {
        assert_eq!(
            data.len(),
            (width * height * 4) as usize,
            "RGBA data size mismatch"
        );
        Self {
            data,
            width,
            height,
            filter: FilterMode::Linear,
        }
    }

    /// Loads an image file (PNG or JPEG) and converts it to RGBA.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let img = image::open(path.as_ref())?.into_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            data: img.into_raw(),
            width,
            height,
            filter: FilterMode::Linear,
        })
    }

    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }

    /// A white disc with a soft radial falloff, the classic particle puff.
    pub fn soft_circle(size: u32) -> Self {
        let size = size.max(2);
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                data.extend_from_slice(&soft_circle_pixel(x, y, size, 1.0));
            }
        }
        Self::from_rgba(data, size, size)
    }

    /// A sprite sheet of soft discs that shrink frame by frame, giving a
    /// dissolving-puff animation with no asset files. Cells are `cell`
    /// pixels square, frames run row-major from the top-left.
    pub fn soft_circle_sheet(columns: u32, rows: u32, cell: u32) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        let cell = cell.max(2);
        let frames = columns * rows;
        let width = columns * cell;
        let height = rows * cell;
        let mut data = vec![0u8; (width * height * 4) as usize];
        for frame in 0..frames {
            let origin_x = (frame % columns) * cell;
            let origin_y = (frame / columns) * cell;
            // Radius shrinks from full to 30% over the sheet.
            let scale = 1.0 - 0.7 * frame as f32 / (frames - 1).max(1) as f32;
            for y in 0..cell {
                for x in 0..cell {
                    let pixel = soft_circle_pixel(x, y, cell, scale);
                    let offset = (((origin_y + y) * width + origin_x + x) * 4) as usize;
                    data[offset..offset + 4].copy_from_slice(&pixel);
                }
            }
        }
        Self::from_rgba(data, width, height)
    }
}

/// Alpha-falloff disc pixel at `(x, y)` inside a `cell`-sized square whose
/// disc radius is scaled by `radius_scale`.
fn soft_circle_pixel(x: u32, y: u32, cell: u32, radius_scale: f32) -> [u8; 4] {
    let half = cell as f32 / 2.0;
    let dx = x as f32 + 0.5 - half;
    let dy = y as f32 + 0.5 - half;
    let dist = (dx * dx + dy * dy).sqrt() / (half * radius_scale.max(1e-3));
    let alpha = 1.0 - smoothstep(0.35, 1.0, dist);
    [255, 255, 255, (alpha * 255.0).round() as u8]
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// A sprite image uploaded to the GPU, with its sampler.
pub struct SpriteTexture {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl SpriteTexture {
    /// Uploads `image` and builds a clamped sampler with its filter mode.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, image: &SpriteImage) -> Self {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Sprite Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let filter = match image.filter {
            FilterMode::Linear => wgpu::FilterMode::Linear,
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
        };
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sprite Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            sampler,
        }
    }
}

// ===== TESTS =====
