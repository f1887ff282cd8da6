use crate::{
    config::{NebulaConfig, uniform},
    types::Viewport,
};
use glam::Vec2;
use rand::Rng;

/// A large, faint gradient blob drifting behind everything else.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nebula {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Degrees, fixed at creation.
    pub hue: f32,
}

impl Nebula {
    pub fn random(viewport: Viewport, cfg: &NebulaConfig, rng: &mut impl Rng) -> Self {
        let extent = viewport.width.max(viewport.height);
        Self {
            pos: Vec2::new(
                rng.random::<f32>() * viewport.width,
                rng.random::<f32>() * viewport.height,
            ),
            vel: Vec2::new(
                uniform(rng, (-cfg.speed, cfg.speed)),
                uniform(rng, (-cfg.speed, cfg.speed)),
            ),
            radius: uniform(rng, cfg.radius_range) * extent,
            hue: rng.random::<f32>() * 360.0,
        }
    }

    pub fn spawn_all(viewport: Viewport, cfg: &NebulaConfig, rng: &mut impl Rng) -> Vec<Self> {
        (0..cfg.count).map(|_| Self::random(viewport, cfg, rng)).collect()
    }

    /// Drifts one tick and wraps toroidally once the whole disc has left
    /// the viewport.
    pub fn drift(&mut self, viewport: Viewport) {
        self.pos += self.vel;
        let r = self.radius;

        if self.pos.x - r > viewport.width {
            self.pos.x = -r;
        } else if self.pos.x + r < 0.0 {
            self.pos.x = viewport.width + r;
        }

        if self.pos.y - r > viewport.height {
            self.pos.y = -r;
        } else if self.pos.y + r < 0.0 {
            self.pos.y = viewport.height + r;
        }
    }
}
