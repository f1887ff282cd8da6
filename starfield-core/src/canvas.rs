//! The drawing surface the simulation renders onto.
//!
//! [`Canvas`] mirrors the handful of 2D primitives a browser canvas or an
//! immediate-mode painter offers. The core never draws anything else, so a
//! host only has to implement these four calls. [`Recorder`] is a canvas
//! that stores the calls instead of drawing them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn with_alpha(self, alpha: f32) -> Color {
        Color {
            rgb: self,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Converts HSL (hue in degrees, saturation and lightness in [0,1]).
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::new(to_u8(r), to_u8(g), to_u8(b))
    }
}

/// An [`Rgb`] colour with straight (non-premultiplied) alpha in [0,1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub rgb: Rgb,
    pub alpha: f32,
}

/// A two-stop linear gradient along a stroked line, `start` at the line's
/// first point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearGradient {
    pub start: Color,
    pub end: Color,
}

/// Soft shadow drawn around a stroke, like a canvas `shadowBlur`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glow {
    pub color: Color,
    pub blur: f32,
}

pub trait Canvas {
    /// Clears the whole `width` x `height` frame.
    fn clear(&mut self, width: f32, height: f32);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    fn stroke_gradient_line(
        &mut self,
        from: Vec2,
        to: Vec2,
        width: f32,
        gradient: LinearGradient,
        glow: Option<Glow>,
    );

    /// Fills a disc whose colour runs from `inner` at the centre to `outer`
    /// at `radius`.
    fn fill_radial_gradient(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color);
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear {
        width: f32,
        height: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    GradientLine {
        from: Vec2,
        to: Vec2,
        width: f32,
        gradient: LinearGradient,
        glow: Option<Glow>,
    },
    RadialGradient {
        center: Vec2,
        radius: f32,
        inner: Color,
        outer: Color,
    },
}

/// A [`Canvas`] that records every call in order.
#[derive(Debug, Default)]
pub struct Recorder {
    pub commands: Vec<DrawCommand>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }
}

impl Canvas for Recorder {
    fn clear(&mut self, width: f32, height: f32) {
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn stroke_gradient_line(
        &mut self,
        from: Vec2,
        to: Vec2,
        width: f32,
        gradient: LinearGradient,
        glow: Option<Glow>,
    ) {
        self.commands.push(DrawCommand::GradientLine {
            from,
            to,
            width,
            gradient,
            glow,
        });
    }

    fn fill_radial_gradient(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color) {
        self.commands.push(DrawCommand::RadialGradient {
            center,
            radius,
            inner,
            outer,
        });
    }
}
