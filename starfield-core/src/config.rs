//! Tuning constants, grouped per component.
//!
//! Every group derives `Deserialize` with `#[serde(default)]`, so a JSON
//! file only has to mention the values it overrides:
//!
//! ```json
//! { "field": { "repulsion_radius": 30.0 }, "stars": { "max_interval_ms": 8000.0 } }
//! ```

use crate::canvas::Rgb;
use crate::error::{ConfigError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub quadtree: QuadtreeConfig,
    pub field: FieldConfig,
    pub stars: StarConfig,
    pub nebulae: NebulaConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadtreeConfig {
    /// Points a node holds before it subdivides.
    pub capacity: usize,
    /// Nodes at this depth keep accepting points past `capacity`.
    pub max_depth: usize,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            capacity: 4,
            max_depth: 16,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub color: Rgb,
    pub weight: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Viewport pixels per dot.
    pub density: f32,
    /// Viewport pixels per dot below `mobile_breakpoint`.
    pub mobile_density: f32,
    pub mobile_breakpoint: f32,

    /// Baseline velocity components are drawn from `[-base_speed, base_speed)`.
    pub base_speed: f32,
    pub size_range: (f32, f32),
    pub opacity_range: (f32, f32),
    pub palette: Vec<PaletteEntry>,

    /// Depth scaling is `floor + (1 - floor) * z`.
    pub depth_speed_floor: f32,
    pub depth_size_floor: f32,
    pub depth_opacity_floor: f32,

    pub pulsar_probability: f32,
    pub pulsar_speed_range: (f32, f32),
    pub pulsar_size_amplitude: f32,
    pub pulsar_opacity_amplitude: f32,

    pub repulsion_radius: f32,
    pub repulsion_strength: f32,
    pub restore_strength: f32,
    pub velocity_blend: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            density: 9000.0,
            mobile_density: 20000.0,
            mobile_breakpoint: 768.0,
            base_speed: 0.1,
            size_range: (0.5, 2.5),
            opacity_range: (0.2, 0.7),
            palette: vec![
                PaletteEntry {
                    color: Rgb::new(255, 255, 255),
                    weight: 0.70,
                },
                PaletteEntry {
                    color: Rgb::new(173, 216, 255),
                    weight: 0.15,
                },
                PaletteEntry {
                    color: Rgb::new(255, 236, 179),
                    weight: 0.10,
                },
                PaletteEntry {
                    color: Rgb::new(255, 190, 170),
                    weight: 0.05,
                },
            ],
            depth_speed_floor: 0.3,
            depth_size_floor: 0.4,
            depth_opacity_floor: 0.5,
            pulsar_probability: 0.06,
            pulsar_speed_range: (0.02, 0.06),
            pulsar_size_amplitude: 1.5,
            pulsar_opacity_amplitude: 0.35,
            repulsion_radius: 25.0,
            repulsion_strength: 0.02,
            restore_strength: 0.0005,
            velocity_blend: 0.05,
        }
    }
}

/// Speed and visual treatment of one shooting-star tier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierStyle {
    /// Each velocity component is drawn from this range.
    pub speed_range: (f32, f32),
    /// Tail length in ticks of travel.
    pub tail_length: f32,
    pub line_width: f32,
    pub head_radius: f32,
    pub glow: Rgb,
    pub tail_head: Rgb,
    pub tail_end: Rgb,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    pub initial_delay_ms: f64,
    pub min_interval_ms: f64,
    pub max_interval_ms: f64,

    pub depth_range: (f32, f32),
    /// Speed, tail, width and head scaling is `floor + (1 - floor) * z`.
    pub depth_floor: f32,
    /// Stars at or above this depth draw in front of the dots.
    pub near_depth: f32,

    pub hypervelocity_probability: f32,
    pub fast_probability: f32,
    pub regular: TierStyle,
    pub fast: TierStyle,
    pub hypervelocity: TierStyle,

    pub opacity_decay: f32,
    pub glow_alpha: f32,
    pub glow_blur: f32,

    pub impulse_radius: f32,
    pub impulse_strength: f32,
    pub hypervelocity_impulse_scale: f32,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 2000.0,
            min_interval_ms: 1500.0,
            max_interval_ms: 5000.0,
            depth_range: (0.2, 1.0),
            depth_floor: 0.6,
            near_depth: 0.5,
            hypervelocity_probability: 0.2,
            fast_probability: 0.4,
            regular: TierStyle {
                speed_range: (6.0, 10.0),
                tail_length: 20.0,
                line_width: 3.0,
                head_radius: 2.5,
                glow: Rgb::new(255, 255, 255),
                tail_head: Rgb::new(255, 255, 255),
                tail_end: Rgb::new(255, 255, 255),
            },
            fast: TierStyle {
                speed_range: (14.0, 21.0),
                tail_length: 16.0,
                line_width: 3.5,
                head_radius: 3.0,
                glow: Rgb::new(173, 216, 230),
                tail_head: Rgb::new(135, 206, 250),
                tail_end: Rgb::new(0, 0, 139),
            },
            hypervelocity: TierStyle {
                speed_range: (24.0, 32.0),
                tail_length: 12.0,
                line_width: 4.0,
                head_radius: 3.5,
                glow: Rgb::new(221, 160, 255),
                tail_head: Rgb::new(230, 190, 255),
                tail_end: Rgb::new(75, 0, 130),
            },
            opacity_decay: 0.007,
            glow_alpha: 0.8,
            glow_blur: 20.0,
            impulse_radius: 90.0,
            impulse_strength: 0.6,
            hypervelocity_impulse_scale: 2.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NebulaConfig {
    pub count: usize,
    /// Velocity components are drawn from `[-speed, speed)`.
    pub speed: f32,
    /// Radius as a fraction of the larger viewport dimension.
    pub radius_range: (f32, f32),
    pub saturation: f32,
    pub inner_lightness: f32,
    pub outer_lightness: f32,
    /// Outer stop hue is the inner hue plus this many degrees.
    pub hue_shift: f32,
    pub inner_alpha: f32,
}

impl Default for NebulaConfig {
    fn default() -> Self {
        Self {
            count: 2,
            speed: 0.15,
            radius_range: (0.25, 0.45),
            saturation: 0.6,
            inner_lightness: 0.45,
            outer_lightness: 0.25,
            hue_shift: 40.0,
            inner_alpha: 0.10,
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Config = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks every value the simulation divides by, samples from, or
    /// recurses on.
    pub fn validate(&self) -> Result<()> {
        if self.quadtree.capacity == 0 {
            return Err(ConfigError::invalid("quadtree.capacity", "must be at least 1"));
        }

        let f = &self.field;
        positive("field.density", f.density)?;
        positive("field.mobile_density", f.mobile_density)?;
        positive("field.repulsion_radius", f.repulsion_radius)?;
        ordered("field.size_range", f.size_range)?;
        ordered("field.opacity_range", f.opacity_range)?;
        ordered("field.pulsar_speed_range", f.pulsar_speed_range)?;
        probability("field.pulsar_probability", f.pulsar_probability)?;
        if f.palette.is_empty() || f.palette.iter().any(|p| p.weight < 0.0) {
            return Err(ConfigError::invalid(
                "field.palette",
                "needs at least one entry and no negative weights",
            ));
        }
        if f.palette.iter().map(|p| p.weight).sum::<f32>() <= 0.0 {
            return Err(ConfigError::invalid("field.palette", "weights sum to zero"));
        }

        let s = &self.stars;
        positive("stars.impulse_radius", s.impulse_radius)?;
        if s.min_interval_ms < 0.0 || s.min_interval_ms > s.max_interval_ms {
            return Err(ConfigError::invalid(
                "stars.min_interval_ms",
                format!(
                    "must be in [0, max_interval_ms], got {} > {}",
                    s.min_interval_ms, s.max_interval_ms
                ),
            ));
        }
        ordered("stars.depth_range", s.depth_range)?;
        if s.depth_range.0 < 0.0 || s.depth_range.1 > 1.0 {
            return Err(ConfigError::invalid("stars.depth_range", "must lie within [0, 1]"));
        }
        probability("stars.hypervelocity_probability", s.hypervelocity_probability)?;
        probability("stars.fast_probability", s.fast_probability)?;
        if s.hypervelocity_probability + s.fast_probability > 1.0 {
            return Err(ConfigError::invalid(
                "stars.fast_probability",
                "hypervelocity and fast probabilities sum above 1",
            ));
        }
        for (name, tier) in [
            ("stars.regular.speed_range", &s.regular),
            ("stars.fast.speed_range", &s.fast),
            ("stars.hypervelocity.speed_range", &s.hypervelocity),
        ] {
            ordered(name, tier.speed_range)?;
            if tier.speed_range.0 <= 0.0 {
                return Err(ConfigError::invalid(name, "speeds must be positive"));
            }
        }
        positive("stars.opacity_decay", s.opacity_decay)?;

        ordered("nebulae.radius_range", self.nebulae.radius_range)?;
        positive("nebulae.radius_range", self.nebulae.radius_range.0)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {value}")))
    }
}

fn ordered(field: &'static str, (lo, hi): (f32, f32)) -> Result<()> {
    if lo <= hi {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("min {lo} exceeds max {hi}")))
    }
}

fn probability(field: &'static str, p: f32) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be in [0, 1], got {p}")))
    }
}

/// Uniform draw from `[lo, hi)`; returns `lo` for an empty range.
pub(crate) fn uniform(rng: &mut impl Rng, (lo, hi): (f32, f32)) -> f32 {
    lo + rng.random::<f32>() * (hi - lo)
}

/// `floor + (1 - floor) * z`
#[inline]
pub(crate) fn depth_scale(floor: f32, z: f32) -> f32 {
    floor + (1.0 - floor) * z
}
