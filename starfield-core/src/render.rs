//! Turns simulation state into [`Canvas`] calls, one layer at a time.

use crate::{
    canvas::{Canvas, Glow, LinearGradient, Rgb},
    config::{NebulaConfig, StarConfig},
    dot::Dot,
    nebula::Nebula,
    star::ShootingStar,
};

pub fn draw_nebula(canvas: &mut impl Canvas, nebula: &Nebula, cfg: &NebulaConfig) {
    let inner =
        Rgb::from_hsl(nebula.hue, cfg.saturation, cfg.inner_lightness).with_alpha(cfg.inner_alpha);
    let outer = Rgb::from_hsl(nebula.hue + cfg.hue_shift, cfg.saturation, cfg.outer_lightness)
        .with_alpha(0.0);
    canvas.fill_radial_gradient(nebula.pos, nebula.radius, inner, outer);
}

pub fn draw_dot(canvas: &mut impl Canvas, dot: &Dot) {
    canvas.fill_circle(dot.pos, dot.size, dot.color.with_alpha(dot.opacity));
}

/// Tail (head to tail start, fading out) with a tier-coloured glow, then
/// the bright head.
pub fn draw_star(canvas: &mut impl Canvas, star: &ShootingStar, cfg: &StarConfig) {
    let style = star.tier.style(cfg);
    let scale = star.scale(cfg);

    let gradient = LinearGradient {
        start: style.tail_head.with_alpha(star.opacity),
        end: style.tail_end.with_alpha(0.0),
    };
    let glow = Glow {
        color: style.glow.with_alpha(cfg.glow_alpha),
        blur: cfg.glow_blur * scale,
    };
    canvas.stroke_gradient_line(
        star.pos,
        star.tail_start(),
        style.line_width * scale,
        gradient,
        Some(glow),
    );
    canvas.fill_circle(
        star.pos,
        style.head_radius * scale,
        Rgb::WHITE.with_alpha(star.opacity * 0.9),
    );
}
