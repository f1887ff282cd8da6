//! Per-frame simulation phases for the starfield.
//!
//! One tick runs them in this order:
//! 1. [`index_phase`]: rebuild the quadtree from current dot positions.
//! 2. [`star_impulse_phase`]: the active shooting star pushes nearby dots.
//! 3. [`repulsion_phase`]: dots push apart from close neighbours.
//! 4. [`integration_phase`]: restoring force, baseline blend, pulsar
//!    update, position integration and edge reflection.
//!
//! Phases 2 and 3 only touch velocities, so the positions stored in the
//! quadtree stay exact until phase 4 moves the dots.

use crate::{
    config::{FieldConfig, QuadtreeConfig, StarConfig},
    dot::DotField,
    quadtree::{Point, Quadtree, Rect, SpatialIndex},
    star::ShootingStar,
    types::Viewport,
};
use glam::Vec2;

/// Builds a fresh quadtree covering the viewport and inserts every dot.
///
/// Dots outside the viewport (possible only before the first integration
/// after a shrink) are rejected by the tree and simply take no part in
/// neighbour queries this frame.
///
/// ### Parameters
/// - `field` - The dots to index; each point carries its dot's index.
/// - `viewport` - Area covered by the root node.
/// - `cfg` - Node capacity and maximum depth.
///
/// ### Returns
/// The populated [`Quadtree`].
pub fn index_phase(field: &DotField, viewport: Viewport, cfg: &QuadtreeConfig) -> Quadtree {
    let boundary = Rect::from_min_size(Vec2::ZERO, viewport.size());
    let mut tree = Quadtree::with_max_depth(boundary, cfg.capacity, cfg.max_depth);
    for (id, dot) in field.dots.iter().enumerate() {
        tree.insert(Point::new(dot.pos, id));
    }
    tree
}

/// Pushes dots away from the head of the active shooting star.
///
/// Every dot at exact distance `0 < d < impulse_radius` from the head gains
/// velocity along the head-to-dot direction with magnitude
/// `(1 - d / radius)² * impulse_strength`, multiplied by the tier's impulse
/// scale.
///
/// ### Parameters
/// - `star` - The active star.
/// - `field` - Dots whose velocities are updated.
/// - `index` - Spatial index built from `field` this frame.
/// - `cfg` - Impulse radius, strength and tier scaling.
/// - `scratch` - Reusable query buffer; cleared before use.
pub fn star_impulse_phase(
    star: &ShootingStar,
    field: &mut DotField,
    index: &impl SpatialIndex,
    cfg: &StarConfig,
    scratch: &mut Vec<Point>,
) {
    let radius = cfg.impulse_radius;
    let strength = cfg.impulse_strength * star.impulse_scale(cfg);

    scratch.clear();
    index.query_into(&Rect::around(star.pos, radius), scratch);

    for p in scratch.iter() {
        let offset = p.pos - star.pos;
        let d = offset.length();
        if d <= 0.0 || d >= radius {
            continue;
        }
        let falloff = 1.0 - d / radius;
        field.dots[p.id].vel += offset / d * falloff * falloff * strength;
    }
}

/// Applies local crowding avoidance between dots.
///
/// For each dot, neighbours at exact distance `0 < d < repulsion_radius`
/// push it away along the connecting line with magnitude
/// `(1 - d / radius) * repulsion_strength`. Both dots of a pair are visited,
/// so each receives its own, opposite push. Coincident dots are skipped.
///
/// ### Parameters
/// - `field` - Dots whose velocities are updated.
/// - `index` - Spatial index built from `field` this frame.
/// - `cfg` - Repulsion radius and strength.
/// - `scratch` - Reusable query buffer.
pub fn repulsion_phase(
    field: &mut DotField,
    index: &impl SpatialIndex,
    cfg: &FieldConfig,
    scratch: &mut Vec<Point>,
) {
    let radius = cfg.repulsion_radius;

    for id in 0..field.dots.len() {
        let pos = field.dots[id].pos;
        scratch.clear();
        index.query_into(&Rect::around(pos, radius), scratch);

        let mut push = Vec2::ZERO;
        for other in scratch.iter().filter(|p| p.id != id) {
            let offset = pos - other.pos;
            let d = offset.length();
            if d <= 0.0 || d >= radius {
                continue;
            }
            push += offset / d * (1.0 - d / radius) * cfg.repulsion_strength;
        }
        field.dots[id].vel += push;
    }
}

/// Relaxes velocities, updates pulsars and moves every dot one tick.
///
/// Per dot:
/// 1. `vel += (origin - pos) * restore_strength`
/// 2. `vel += (base_vel - vel) * velocity_blend`
/// 3. Pulsar phase advance and size/opacity refresh.
/// 4. `pos += vel`, then reflection off the four viewport edges: the
///    position is clamped onto the crossed edge and the velocity component
///    is turned to point back inside.
///
/// ### Parameters
/// - `field` - Dots to advance.
/// - `viewport` - Reflection bounds.
/// - `cfg` - Restoring, blending and pulsar constants.
pub fn integration_phase(field: &mut DotField, viewport: Viewport, cfg: &FieldConfig) {
    for dot in &mut field.dots {
        dot.vel += (dot.origin - dot.pos) * cfg.restore_strength;
        dot.vel += (dot.base_vel - dot.vel) * cfg.velocity_blend;
        dot.pulse(cfg);

        dot.pos += dot.vel;
        reflect(&mut dot.pos.x, &mut dot.vel.x, viewport.width);
        reflect(&mut dot.pos.y, &mut dot.vel.y, viewport.height);
    }
}

#[inline]
fn reflect(pos: &mut f32, vel: &mut f32, max: f32) {
    if *pos < 0.0 {
        *pos = 0.0;
        *vel = vel.abs();
    } else if *pos > max {
        *pos = max;
        *vel = -vel.abs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        dot::{Dot, Pulsar},
        star::SpeedTier,
    };
    use std::f32::consts::TAU;

    const VP: Viewport = Viewport {
        width: 1920.0,
        height: 1080.0,
    };

    fn still(x: f32, y: f32) -> Dot {
        Dot::at_rest(Vec2::new(x, y), Vec2::ZERO, 0.5)
    }

    fn star_at(pos: Vec2, tier: SpeedTier) -> ShootingStar {
        ShootingStar {
            pos,
            vel: Vec2::new(8.0, 8.0),
            z: 0.6,
            tier,
            tail_length: 20.0,
            opacity: 1.0,
        }
    }

    #[test]
    fn index_phase_inserts_every_dot_in_view() {
        let cfg = Config::default();
        let field = DotField::from_dots(vec![
            still(10.0, 10.0),
            still(1900.0, 1000.0),
            still(960.0, 540.0),
        ]);
        let tree = index_phase(&field, VP, &cfg.quadtree);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn repulsion_pushes_pairs_apart_symmetrically() {
        let cfg = Config::default();
        let mut field = DotField::from_dots(vec![still(100.0, 100.0), still(110.0, 100.0)]);
        let tree = index_phase(&field, VP, &cfg.quadtree);
        let mut scratch = Vec::new();

        repulsion_phase(&mut field, &tree, &cfg.field, &mut scratch);

        let expected = (1.0 - 10.0 / cfg.field.repulsion_radius) * cfg.field.repulsion_strength;
        let (a, b) = (field.dots[0].vel, field.dots[1].vel);
        assert!((a.x + expected).abs() < 1e-6, "a = {a:?}");
        assert!((b.x - expected).abs() < 1e-6, "b = {b:?}");
        assert_eq!(a.y, 0.0);
        assert_eq!(a + b, Vec2::ZERO);
    }

    #[test]
    fn repulsion_prunes_box_corners_by_exact_distance() {
        let cfg = Config::default();
        // Inside the 25-unit query box, but 28.3 units away.
        let mut field = DotField::from_dots(vec![still(100.0, 100.0), still(120.0, 120.0)]);
        let tree = index_phase(&field, VP, &cfg.quadtree);
        repulsion_phase(&mut field, &tree, &cfg.field, &mut Vec::new());

        assert_eq!(field.dots[0].vel, Vec2::ZERO);
        assert_eq!(field.dots[1].vel, Vec2::ZERO);
    }

    #[test]
    fn coincident_dots_are_skipped() {
        let cfg = Config::default();
        let mut field = DotField::from_dots(vec![still(50.0, 50.0), still(50.0, 50.0)]);
        let tree = index_phase(&field, VP, &cfg.quadtree);
        repulsion_phase(&mut field, &tree, &cfg.field, &mut Vec::new());

        for d in &field.dots {
            assert_eq!(d.vel, Vec2::ZERO);
            assert!(d.vel.is_finite());
        }
    }

    #[test]
    fn star_impulse_falls_off_quadratically() {
        let cfg = Config::default();
        let head = Vec2::new(500.0, 500.0);
        let mut field = DotField::from_dots(vec![
            still(530.0, 500.0),
            still(500.0, 500.0),
            still(700.0, 500.0),
        ]);
        let tree = index_phase(&field, VP, &cfg.quadtree);

        star_impulse_phase(
            &star_at(head, SpeedTier::Regular),
            &mut field,
            &tree,
            &cfg.stars,
            &mut Vec::new(),
        );

        let falloff = 1.0 - 30.0 / cfg.stars.impulse_radius;
        let expected = falloff * falloff * cfg.stars.impulse_strength;
        assert!((field.dots[0].vel.x - expected).abs() < 1e-6);
        assert_eq!(field.dots[0].vel.y, 0.0);
        // Coincident with the head and out of range: untouched.
        assert_eq!(field.dots[1].vel, Vec2::ZERO);
        assert_eq!(field.dots[2].vel, Vec2::ZERO);
    }

    #[test]
    fn hypervelocity_star_pushes_harder() {
        let cfg = Config::default();
        let head = Vec2::new(500.0, 500.0);
        let push = |tier| {
            let mut field = DotField::from_dots(vec![still(500.0, 540.0)]);
            let tree = index_phase(&field, VP, &cfg.quadtree);
            star_impulse_phase(
                &star_at(head, tier),
                &mut field,
                &tree,
                &cfg.stars,
                &mut Vec::new(),
            );
            field.dots[0].vel.y
        };

        let regular = push(SpeedTier::Regular);
        let hyper = push(SpeedTier::Hypervelocity);
        assert!(regular > 0.0);
        assert!((hyper - regular * cfg.stars.hypervelocity_impulse_scale).abs() < 1e-5);
    }

    #[test]
    fn reflection_keeps_dots_inside_and_turns_velocity() {
        let cfg = Config::default();
        let mut dot = still(1.0, 1079.0);
        dot.vel = Vec2::new(-5.0, 5.0);
        dot.base_vel = dot.vel;
        dot.origin = dot.pos;
        let mut field = DotField::from_dots(vec![dot]);

        integration_phase(&mut field, VP, &cfg.field);

        let d = &field.dots[0];
        assert_eq!(d.pos, Vec2::new(0.0, 1080.0));
        assert!(d.vel.x > 0.0);
        assert!(d.vel.y < 0.0);
    }

    #[test]
    fn lone_dot_stays_bounded_near_its_anchor() {
        let cfg = Config::default();
        let anchor = Vec2::new(100.0, 100.0);
        let mut field = DotField::from_dots(vec![Dot::at_rest(anchor, Vec2::new(0.05, 0.0), 0.5)]);
        let mut scratch = Vec::new();

        let mut max_speed: f32 = 0.0;
        for _ in 0..1000 {
            let tree = index_phase(&field, VP, &cfg.quadtree);
            repulsion_phase(&mut field, &tree, &cfg.field, &mut scratch);
            integration_phase(&mut field, VP, &cfg.field);

            let d = &field.dots[0];
            assert!(d.pos.distance(anchor) < 10.0, "drifted to {:?}", d.pos);
            max_speed = max_speed.max(d.vel.length());
        }

        assert!(max_speed <= 0.06, "max speed {max_speed}");
        // Settled: the restoring pull balances the baseline drift.
        let d = &field.dots[0];
        assert!(d.vel.length() < 1e-3);
        assert!(d.pos.distance(anchor) < 6.0);
    }

    #[test]
    fn pulsar_size_repeats_every_period() {
        let cfg = Config::default();
        let period = 100;
        let mut dot = still(300.0, 300.0);
        dot.pulsar = Some(Pulsar {
            phase: 0.3,
            speed: TAU / period as f32,
            base_size: 1.2,
            base_opacity: 0.3,
        });
        let mut field = DotField::from_dots(vec![dot]);

        let mut sizes = Vec::with_capacity(3 * period);
        for _ in 0..3 * period {
            integration_phase(&mut field, VP, &cfg.field);
            sizes.push(field.dots[0].size);
        }

        for t in 0..2 * period {
            assert!(
                (sizes[t] - sizes[t + period]).abs() < 1e-3,
                "tick {t}: {} vs {}",
                sizes[t],
                sizes[t + period]
            );
        }
        // Not trivially constant.
        let (lo, hi) = sizes
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &s| (lo.min(s), hi.max(s)));
        assert!(hi - lo > 1.0);
    }
}
