//! Sprite sheet frame selection.
//!
//! A sheet is a regular grid of equally sized frames, numbered row-major
//! from the top-left. Frame selection is a pure function of the particle's
//! life fraction, so it needs no per-particle animation state and stays in
//! lockstep between the CPU quad expander and the record shader.

use glam::Vec2;

/// Grid layout and playback speed for an animated particle texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteSheet {
    /// Frames per row. At least 1.
    pub columns: u32,
    /// Frame rows. At least 1.
    pub rows: u32,
    /// Playback speed multiplier. At 1.0 the animation plays exactly once
    /// over a particle's lifetime; above 1.0 it wraps around.
    pub speed_scale: f32,
}

impl SpriteSheet {
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns: columns.max(1),
            rows: rows.max(1),
            speed_scale: 1.0,
        }
    }

    pub fn with_speed_scale(mut self, speed_scale: f32) -> Self {
        self.speed_scale = speed_scale.max(0.0);
        self
    }

    /// Grid width with the zero guard applied.
    #[inline]
    pub fn grid_columns(&self) -> u32 {
        self.columns.max(1)
    }

    /// Grid height with the zero guard applied.
    #[inline]
    pub fn grid_rows(&self) -> u32 {
        self.rows.max(1)
    }

    /// Total frame count, never zero.
    #[inline]
    pub fn frame_count(&self) -> u32 {
        self.grid_columns() * self.grid_rows()
    }

    /// Frame index for a life fraction in `[0, 1]`.
    ///
    /// `floor(t * frames * speed)`, wrapped modulo the frame count so
    /// speeds above 1.0 loop. A fully aged particle always shows the last
    /// frame instead of wrapping back to the first.
    pub fn frame_at(&self, life_fraction: f32) -> u32 {
        let frames = self.frame_count();
        let t = life_fraction.clamp(0.0, 1.0);
        if t >= 1.0 {
            return frames - 1;
        }
        let raw = (t * frames as f32 * self.speed_scale) as u32;
        raw % frames
    }

    /// UV rectangle of the frame for a life fraction: `(origin, size)`, with
    /// the origin at the frame's top-left in texture space.
    pub fn frame_uv(&self, life_fraction: f32) -> (Vec2, Vec2) {
        let frame = self.frame_at(life_fraction);
        let columns = self.grid_columns();
        let size = Vec2::new(1.0 / columns as f32, 1.0 / self.grid_rows() as f32);
        let origin = Vec2::new(
            (frame % columns) as f32 * size.x,
            (frame / columns) as f32 * size.y,
        );
        (origin, size)
    }
}

impl Default for SpriteSheet {
    /// A single full-texture frame.
    fn default() -> Self {
        Self::new(1, 1)
    }
}

// ===== TESTS =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_clamp_to_one() {
        let sheet = SpriteSheet::new(0, 0);
        assert_eq!(sheet.columns, 1);
        assert_eq!(sheet.rows, 1);
        assert_eq!(sheet.frame_count(), 1);
    }

    #[test]
    fn test_zeroed_fields_fall_back_to_single_frame() {
        // The fields are pub, so a sheet can bypass `new` and its clamps;
        // frame selection still has to behave like a single-frame sheet.
        let sheet = SpriteSheet {
            columns: 0,
            rows: 0,
            speed_scale: 1.0,
        };
        assert_eq!(sheet.frame_at(0.5), 0);
        assert_eq!(sheet.frame_at(1.0), 0);
        let (origin, size) = sheet.frame_uv(0.5);
        assert_eq!(origin, Vec2::ZERO);
        assert_eq!(size, Vec2::ONE);
    }

    #[test]
    fn test_frame_advances_with_life() {
        let sheet = SpriteSheet::new(4, 2);
        assert_eq!(sheet.frame_at(0.0), 0);
        assert_eq!(sheet.frame_at(0.49), 3);
        assert_eq!(sheet.frame_at(0.51), 4);
        assert_eq!(sheet.frame_at(0.99), 7);
    }

    #[test]
    fn test_end_of_life_holds_last_frame() {
        // Without the clamp, t = 1.0 would index one past the sheet.
        let sheet = SpriteSheet::new(4, 4);
        assert_eq!(sheet.frame_at(1.0), 15);
        assert_eq!(sheet.frame_at(2.0), 15);
    }

    #[test]
    fn test_speed_scale_wraps() {
        let sheet = SpriteSheet::new(2, 2).with_speed_scale(2.0);
        // Two full passes over 4 frames: t = 0.55 maps to raw frame 4,
        // which wraps to 0.
        assert_eq!(sheet.frame_at(0.55), 0);
        assert_eq!(sheet.frame_at(0.8), 2);
        // End of life still pins to the last frame.
        assert_eq!(sheet.frame_at(1.0), 3);
    }

    #[test]
    fn test_frame_uv_walks_the_grid() {
        let sheet = SpriteSheet::new(2, 2);
        let (origin, size) = sheet.frame_uv(0.0);
        assert_eq!(origin, Vec2::ZERO);
        assert_eq!(size, Vec2::new(0.5, 0.5));

        // Frame 1 sits top-right, frame 2 bottom-left.
        let (origin, _) = sheet.frame_uv(0.3);
        assert_eq!(origin, Vec2::new(0.5, 0.0));
        let (origin, _) = sheet.frame_uv(0.6);
        assert_eq!(origin, Vec2::new(0.0, 0.5));
    }
}
