//! [`Canvas`] implementation on top of an egui [`egui::Painter`].
//!
//! egui has no gradient fills, so gradients are drawn as meshes with
//! per-vertex colours: a quad for a gradient line, a triangle fan for a
//! radial gradient.

use egui::{Color32, Mesh, Pos2, Shape};
use glam::Vec2;
use starfield_core::canvas::{Canvas, Color, Glow, LinearGradient};
use std::f32::consts::TAU;

/// Rim segments of a radial gradient fan.
const FAN_SEGMENTS: u32 = 48;

pub struct EguiCanvas<'a> {
    painter: &'a egui::Painter,
    /// Screen position of simulation coordinate (0, 0).
    origin: Pos2,
    background: Color32,
}

impl<'a> EguiCanvas<'a> {
    pub fn new(painter: &'a egui::Painter, origin: Pos2, background: Color32) -> Self {
        Self {
            painter,
            origin,
            background,
        }
    }

    fn to_screen(&self, p: Vec2) -> Pos2 {
        egui::pos2(self.origin.x + p.x, self.origin.y + p.y)
    }
}

pub fn to_color32(c: Color) -> Color32 {
    let a = (c.alpha * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(c.rgb.r, c.rgb.g, c.rgb.b, a)
}

/// Quad of `width` around the segment `from`-`to`, coloured `start` at
/// `from` and `end` at `to`.
fn gradient_quad(from: Pos2, to: Pos2, width: f32, start: Color32, end: Color32) -> Option<Mesh> {
    let dir = to - from;
    let len = dir.length();
    if len <= f32::EPSILON || width <= 0.0 {
        return None;
    }
    let n = egui::vec2(-dir.y, dir.x) / len * (width * 0.5);

    let mut mesh = Mesh::default();
    mesh.colored_vertex(from + n, start);
    mesh.colored_vertex(from - n, start);
    mesh.colored_vertex(to + n, end);
    mesh.colored_vertex(to - n, end);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(1, 3, 2);
    Some(mesh)
}

fn radial_fan(center: Pos2, radius: f32, inner: Color32, outer: Color32) -> Mesh {
    let mut mesh = Mesh::default();
    mesh.colored_vertex(center, inner);
    for i in 0..FAN_SEGMENTS {
        let t = i as f32 / FAN_SEGMENTS as f32 * TAU;
        mesh.colored_vertex(center + egui::vec2(t.cos(), t.sin()) * radius, outer);
    }
    for i in 0..FAN_SEGMENTS {
        let a = 1 + i;
        let b = 1 + (i + 1) % FAN_SEGMENTS;
        mesh.add_triangle(0, a, b);
    }
    mesh
}

impl Canvas for EguiCanvas<'_> {
    fn clear(&mut self, width: f32, height: f32) {
        let rect = egui::Rect::from_min_size(self.origin, egui::vec2(width, height));
        self.painter.rect_filled(rect, 0.0, self.background);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.painter
            .circle_filled(self.to_screen(center), radius, to_color32(color));
    }

    fn stroke_gradient_line(
        &mut self,
        from: Vec2,
        to: Vec2,
        width: f32,
        gradient: LinearGradient,
        glow: Option<Glow>,
    ) {
        let (a, b) = (self.to_screen(from), self.to_screen(to));

        // Halo: a wider, faint copy of the stroke under the real one.
        if let Some(glow) = glow {
            let mut halo = glow.color;
            halo.alpha *= 0.25 * gradient.start.alpha;
            let mut fade = halo;
            fade.alpha = 0.0;
            let (halo, fade) = (to_color32(halo), to_color32(fade));
            if let Some(mesh) = gradient_quad(a, b, width + glow.blur, halo, fade) {
                self.painter.add(Shape::mesh(mesh));
            }
        }

        if let Some(mesh) = gradient_quad(
            a,
            b,
            width,
            to_color32(gradient.start),
            to_color32(gradient.end),
        ) {
            self.painter.add(Shape::mesh(mesh));
        }
    }

    fn fill_radial_gradient(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color) {
        if radius <= 0.0 {
            return;
        }
        let mesh = radial_fan(
            self.to_screen(center),
            radius,
            to_color32(inner),
            to_color32(outer),
        );
        self.painter.add(Shape::mesh(mesh));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starfield_core::canvas::Rgb;

    #[test]
    fn to_color32_scales_alpha() {
        let c = to_color32(Rgb::new(255, 255, 255).with_alpha(1.0));
        assert_eq!(c, Color32::WHITE);
        assert_eq!(to_color32(Rgb::new(10, 20, 30).with_alpha(0.0)), Color32::TRANSPARENT);
    }

    #[test]
    fn gradient_quad_has_requested_width() {
        let mesh = gradient_quad(
            egui::pos2(0.0, 0.0),
            egui::pos2(10.0, 0.0),
            4.0,
            Color32::WHITE,
            Color32::TRANSPARENT,
        )
        .unwrap();

        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        let ys: Vec<f32> = mesh.vertices.iter().map(|v| v.pos.y).collect();
        assert_eq!(ys, vec![2.0, -2.0, 2.0, -2.0]);
        assert_eq!(mesh.vertices[0].color, Color32::WHITE);
        assert_eq!(mesh.vertices[3].color, Color32::TRANSPARENT);
    }

    #[test]
    fn degenerate_quad_is_skipped() {
        let p = egui::pos2(5.0, 5.0);
        assert!(gradient_quad(p, p, 3.0, Color32::WHITE, Color32::WHITE).is_none());
    }

    #[test]
    fn radial_fan_is_closed() {
        let mesh = radial_fan(egui::pos2(0.0, 0.0), 10.0, Color32::WHITE, Color32::TRANSPARENT);
        assert_eq!(mesh.vertices.len(), 1 + FAN_SEGMENTS as usize);
        assert_eq!(mesh.indices.len(), 3 * FAN_SEGMENTS as usize);
        // Last triangle wraps back to the first rim vertex.
        assert_eq!(mesh.indices[mesh.indices.len() - 1], 1);
    }
}
