//! CPU-side geometry streaming: quad expansion and upload ordering.
//!
//! Two streaming shapes are supported, one per draw mode:
//!
//! - **Expanded quads**: the CPU turns every live particle into four
//!   [`QuadVertex`] values (camera-facing, rotated, tinted, frame-selected)
//!   and the GPU just rasterizes them through a static index buffer.
//! - **Compact records**: the raw [`Particle`] records are copied up
//!   unchanged and the record shader does the same evaluation per vertex.
//!
//! In both modes the destination buffer is written front to back in
//! emission order. A wrapped pool contributes its two slices back to back,
//! so the draw covers `0..live_count` contiguously and stays a single call.
//!
//! Everything here is plain math over slices; nothing touches a device, so
//! the wraparound and billboard behavior is testable headless.

use bytemuck::Zeroable;
use glam::{Vec2, Vec3};

use crate::config::EmitterConfig;
use crate::particle::Particle;
use crate::pool::ParticlePool;

pub const VERTICES_PER_PARTICLE: usize = 4;
pub const INDICES_PER_PARTICLE: usize = 6;

/// Unit corner offsets of a particle quad, in billboard space.
/// Order: bottom-left, bottom-right, top-left, top-right.
const CORNERS: [Vec2; 4] = [
    Vec2::new(-1.0, -1.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(1.0, 1.0),
];

/// One corner of a fully evaluated particle quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl QuadVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x4];

    /// Vertex buffer layout for the expanded-quad pipeline.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

impl Particle {
    const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4, 2 => Float32];

    /// Instance buffer layout for the compact-record pipeline. Three rows:
    /// position+age, velocity+start rotation, end rotation (plus padding).
    pub fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Index pattern for `max_particles` quads: two triangles per particle over
/// its four vertices. Built once at buffer creation; only the index *count*
/// of a draw changes with the live count.
pub fn quad_indices(max_particles: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(max_particles * INDICES_PER_PARTICLE);
    for quad in 0..max_particles as u32 {
        let base = quad * VERTICES_PER_PARTICLE as u32;
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
    }
    indices
}

/// Evaluates one particle into its four camera-facing corners.
///
/// `right` and `up` come from [`Camera::billboard_axes`]; the quad is
/// rotated in that plane, scaled by the interpolated size and centered on
/// the closed-form kinematic position.
///
/// [`Camera::billboard_axes`]: crate::camera::Camera::billboard_axes
pub fn expand_particle(
    particle: &Particle,
    config: &EmitterConfig,
    right: Vec3,
    up: Vec3,
) -> [QuadVertex; 4] {
    let t = particle.life_fraction(config.lifetime());
    let center = particle.position(config.acceleration);
    let color = config.color_at(t).to_array();
    let size = config.size_at(t);
    let (sin, cos) = particle.rotation(t).sin_cos();
    let (uv_origin, uv_size) = match &config.sprite_sheet {
        Some(sheet) => sheet.frame_uv(t),
        None => (Vec2::ZERO, Vec2::ONE),
    };

    let mut quad = [QuadVertex::zeroed(); 4];
    for (vertex, corner) in quad.iter_mut().zip(CORNERS) {
        let local = Vec2::new(
            corner.x * cos - corner.y * sin,
            corner.x * sin + corner.y * cos,
        ) * size;
        let world = center + right * local.x + up * local.y;
        // Texture V runs downward, billboard Y runs upward.
        let uv = uv_origin + uv_size * Vec2::new(0.5 + 0.5 * corner.x, 0.5 - 0.5 * corner.y);
        *vertex = QuadVertex {
            position: world.to_array(),
            uv: uv.to_array(),
            color,
        };
    }
    quad
}

/// Expands every live particle into `out`, oldest first. Returns the live
/// count. The vector is cleared, not reallocated, so a frame loop reusing
/// it settles at the pool's high-water mark.
pub fn expand_pool(
    pool: &ParticlePool,
    config: &EmitterConfig,
    right: Vec3,
    up: Vec3,
    out: &mut Vec<QuadVertex>,
) -> usize {
    out.clear();
    pool.for_each_alive(|_, particle| {
        out.extend_from_slice(&expand_particle(particle, config, right, up));
    });
    pool.live_count()
}

/// Copies the live records into `out` in emission order, exactly as the
/// two-slice GPU upload lays them out. Headless mirror of the streaming
/// path; the renderer itself writes the slices straight to the buffer.
pub fn compact_live(pool: &ParticlePool, out: &mut Vec<Particle>) {
    out.clear();
    let (head, tail) = pool.alive_slices();
    out.extend_from_slice(head);
    out.extend_from_slice(tail);
}

// ===== TESTS =====
