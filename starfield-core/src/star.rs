//! Shooting stars: short-lived streaks that cross the viewport and push
//! nearby dots out of their way.
//!
//! [`StarEmitter`] holds at most one [`ShootingStar`]. Its life cycle is
//! idle (waiting for `next_spawn_at`) -> active (advancing and fading) ->
//! expired, after which the idle timer is re-randomised.

use crate::{
    config::{StarConfig, TierStyle, depth_scale, uniform},
    types::Viewport,
};
use glam::Vec2;
use rand::Rng;
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpeedTier {
    Regular,
    Fast,
    Hypervelocity,
}

impl SpeedTier {
    /// Maps one uniform draw in [0,1) onto a tier: hypervelocity below
    /// `p_hyper`, fast in the next `p_fast`, regular for the rest.
    pub fn from_draw(r: f32, p_hyper: f32, p_fast: f32) -> Self {
        if r < p_hyper {
            SpeedTier::Hypervelocity
        } else if r < p_hyper + p_fast {
            SpeedTier::Fast
        } else {
            SpeedTier::Regular
        }
    }

    pub fn choose(cfg: &StarConfig, rng: &mut impl Rng) -> Self {
        Self::from_draw(
            rng.random::<f32>(),
            cfg.hypervelocity_probability,
            cfg.fast_probability,
        )
    }

    pub fn style(self, cfg: &StarConfig) -> &TierStyle {
        match self {
            SpeedTier::Regular => &cfg.regular,
            SpeedTier::Fast => &cfg.fast,
            SpeedTier::Hypervelocity => &cfg.hypervelocity,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnEdge {
    Top,
    Left,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShootingStar {
    pub pos: Vec2,
    pub vel: Vec2,
    pub z: f32,
    pub tier: SpeedTier,
    pub tail_length: f32,
    pub opacity: f32,
}

impl ShootingStar {
    pub fn new(
        edge: SpawnEdge,
        viewport: Viewport,
        tier: SpeedTier,
        cfg: &StarConfig,
        rng: &mut impl Rng,
    ) -> Self {
        let pos = match edge {
            SpawnEdge::Top => Vec2::new(rng.random::<f32>() * viewport.width, 0.0),
            SpawnEdge::Left => Vec2::new(0.0, rng.random::<f32>() * viewport.height),
        };
        let z = uniform(rng, cfg.depth_range);
        let scale = depth_scale(cfg.depth_floor, z);
        let style = tier.style(cfg);
        let vel = Vec2::new(
            uniform(rng, style.speed_range),
            uniform(rng, style.speed_range),
        ) * scale;

        Self {
            pos,
            vel,
            z,
            tier,
            tail_length: style.tail_length * scale,
            opacity: 1.0,
        }
    }

    pub fn random(viewport: Viewport, cfg: &StarConfig, rng: &mut impl Rng) -> Self {
        let edge = if rng.random_bool(0.5) {
            SpawnEdge::Top
        } else {
            SpawnEdge::Left
        };
        let tier = SpeedTier::choose(cfg, rng);
        Self::new(edge, viewport, tier, cfg, rng)
    }

    /// Far end of the tail.
    pub fn tail_start(&self) -> Vec2 {
        self.pos - self.vel * self.tail_length
    }

    /// Depth factor applied to speed, tail and visuals.
    pub fn scale(&self, cfg: &StarConfig) -> f32 {
        depth_scale(cfg.depth_floor, self.z)
    }

    pub fn is_near(&self, cfg: &StarConfig) -> bool {
        self.z >= cfg.near_depth
    }

    pub fn advance(&mut self, cfg: &StarConfig) {
        self.pos += self.vel;
        self.opacity -= cfg.opacity_decay;
    }

    pub fn is_expired(&self, viewport: Viewport) -> bool {
        let tail = self.tail_start();
        tail.x > viewport.width || tail.y > viewport.height || self.opacity <= 0.0
    }

    /// Impulse multiplier of this star's tier.
    pub fn impulse_scale(&self, cfg: &StarConfig) -> f32 {
        match self.tier {
            SpeedTier::Hypervelocity => cfg.hypervelocity_impulse_scale,
            _ => 1.0,
        }
    }
}

/// Running totals over an emitter's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitterStats {
    pub regular: u64,
    pub fast: u64,
    pub hypervelocity: u64,
    pub expired: u64,
}

impl EmitterStats {
    pub fn spawned(&self) -> u64 {
        self.regular + self.fast + self.hypervelocity
    }

    fn record(&mut self, tier: SpeedTier) {
        match tier {
            SpeedTier::Regular => self.regular += 1,
            SpeedTier::Fast => self.fast += 1,
            SpeedTier::Hypervelocity => self.hypervelocity += 1,
        }
    }
}

#[derive(Debug)]
pub struct StarEmitter {
    active: Option<ShootingStar>,
    next_spawn_at: f64,
    stats: EmitterStats,
}

impl StarEmitter {
    pub fn new(now_ms: f64, cfg: &StarConfig) -> Self {
        Self {
            active: None,
            next_spawn_at: now_ms + cfg.initial_delay_ms,
            stats: EmitterStats::default(),
        }
    }

    pub fn active(&self) -> Option<&ShootingStar> {
        self.active.as_ref()
    }

    pub fn active_count(&self) -> usize {
        usize::from(self.active.is_some())
    }

    pub fn next_spawn_at(&self) -> f64 {
        self.next_spawn_at
    }

    pub fn stats(&self) -> EmitterStats {
        self.stats
    }

    /// Spawns a random star if none is active and the idle timer elapsed.
    pub fn try_spawn(
        &mut self,
        now_ms: f64,
        viewport: Viewport,
        cfg: &StarConfig,
        rng: &mut impl Rng,
    ) -> bool {
        if self.active.is_some() || now_ms <= self.next_spawn_at {
            return false;
        }
        let star = ShootingStar::random(viewport, cfg, rng);
        self.launch(star);
        true
    }

    /// Makes `star` the active star, replacing any current one.
    pub fn launch(&mut self, star: ShootingStar) {
        trace!(
            tier = ?star.tier,
            z = star.z,
            x = star.pos.x,
            y = star.pos.y,
            "shooting star spawned"
        );
        self.stats.record(star.tier);
        self.active = Some(star);
    }

    /// Moves and fades the active star, and removes it once it has left the
    /// viewport or faded out. Returns `true` if a star expired this tick.
    pub fn advance(
        &mut self,
        now_ms: f64,
        viewport: Viewport,
        cfg: &StarConfig,
        rng: &mut impl Rng,
    ) -> bool {
        let Some(star) = self.active.as_mut() else {
            return false;
        };
        star.advance(cfg);
        if !star.is_expired(viewport) {
            return false;
        }

        trace!(tier = ?star.tier, opacity = star.opacity, "shooting star expired");
        self.active = None;
        self.stats.expired += 1;
        let wait = cfg.min_interval_ms
            + rng.random::<f64>() * (cfg.max_interval_ms - cfg.min_interval_ms);
        self.next_spawn_at = now_ms + wait;
        true
    }
}
