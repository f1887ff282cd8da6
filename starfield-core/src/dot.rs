use crate::{
    canvas::Rgb,
    config::{FieldConfig, PaletteEntry, depth_scale, uniform},
    types::Viewport,
};
use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

/// Breathing brightness state of a pulsing dot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulsar {
    pub phase: f32,
    pub speed: f32,
    pub base_size: f32,
    pub base_opacity: f32,
}

impl Pulsar {
    /// `(1 + sin(phase)) / 2`, in [0, 1].
    #[inline]
    pub fn level(&self) -> f32 {
        (1.0 + self.phase.sin()) * 0.5
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dot {
    pub pos: Vec2,
    pub origin: Vec2,
    pub z: f32,
    pub vel: Vec2,
    pub base_vel: Vec2,
    pub size: f32,
    pub opacity: f32,
    pub color: Rgb,
    pub pulsar: Option<Pulsar>,
}

impl Dot {
    /// A plain, non-pulsing dot resting at `origin` with velocity `base_vel`.
    pub fn at_rest(origin: Vec2, base_vel: Vec2, z: f32) -> Self {
        Self {
            pos: origin,
            origin,
            z,
            vel: base_vel,
            base_vel,
            size: 1.0,
            opacity: 0.5,
            color: Rgb::WHITE,
            pulsar: None,
        }
    }

    pub fn random(viewport: Viewport, cfg: &FieldConfig, rng: &mut impl Rng) -> Self {
        let origin = Vec2::new(
            rng.random::<f32>() * viewport.width,
            rng.random::<f32>() * viewport.height,
        );
        let z = rng.random::<f32>();

        let speed = depth_scale(cfg.depth_speed_floor, z);
        let base_vel = Vec2::new(
            uniform(rng, (-cfg.base_speed, cfg.base_speed)),
            uniform(rng, (-cfg.base_speed, cfg.base_speed)),
        ) * speed;

        let size = uniform(rng, cfg.size_range) * depth_scale(cfg.depth_size_floor, z);
        let opacity = uniform(rng, cfg.opacity_range) * depth_scale(cfg.depth_opacity_floor, z);
        let color = pick_color(&cfg.palette, rng);

        let pulsar = rng.random_bool(cfg.pulsar_probability as f64).then(|| Pulsar {
            phase: rng.random::<f32>() * TAU,
            speed: uniform(rng, cfg.pulsar_speed_range),
            base_size: size,
            base_opacity: opacity,
        });

        Self {
            pos: origin,
            origin,
            z,
            vel: base_vel,
            base_vel,
            size,
            opacity,
            color,
            pulsar,
        }
    }

    /// Advances the pulsar phase (if any) and refreshes size and opacity.
    pub fn pulse(&mut self, cfg: &FieldConfig) {
        let Some(p) = self.pulsar.as_mut() else {
            return;
        };
        p.phase += p.speed;
        let level = p.level();
        self.size = p.base_size + cfg.pulsar_size_amplitude * level;
        self.opacity = (p.base_opacity + cfg.pulsar_opacity_amplitude * level).min(1.0);
    }

    pub fn is_pulsar(&self) -> bool {
        self.pulsar.is_some()
    }
}

fn pick_color(palette: &[PaletteEntry], rng: &mut impl Rng) -> Rgb {
    let total: f32 = palette.iter().map(|e| e.weight).sum();
    let mut r = rng.random::<f32>() * total;
    for entry in palette {
        if r < entry.weight {
            return entry.color;
        }
        r -= entry.weight;
    }
    palette.last().map_or(Rgb::WHITE, |e| e.color)
}

/// The background dots of one viewport.
#[derive(Debug, Default)]
pub struct DotField {
    pub dots: Vec<Dot>,
}

impl DotField {
    pub fn from_dots(dots: Vec<Dot>) -> Self {
        Self { dots }
    }

    /// Number of dots for a viewport: one per `density` square pixels, with a
    /// sparser density on narrow (mobile) viewports.
    pub fn count_for(viewport: Viewport, cfg: &FieldConfig) -> usize {
        let density = if viewport.width < cfg.mobile_breakpoint {
            cfg.mobile_density
        } else {
            cfg.density
        };
        (viewport.area() / density).floor() as usize
    }

    pub fn generate(viewport: Viewport, cfg: &FieldConfig, rng: &mut impl Rng) -> Self {
        let count = Self::count_for(viewport, cfg);
        let dots = (0..count).map(|_| Dot::random(viewport, cfg, rng)).collect();
        Self { dots }
    }

    pub fn len(&self) -> usize {
        self.dots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    pub fn pulsar_count(&self) -> usize {
        self.dots.iter().filter(|d| d.is_pulsar()).count()
    }

    /// Sorts farthest (smallest `z`) first, so nearer dots draw on top.
    pub fn sort_by_depth(&mut self) {
        self.dots.sort_by(|a, b| a.z.total_cmp(&b.z));
    }
}
