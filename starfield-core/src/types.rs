use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier for a dot in a [`crate::dot::DotField`].
///
/// This is an index into `DotField::dots`, and is only meaningful between
/// two reorderings of that vector (the field is depth-sorted once per frame
/// and regenerated on every resize).
pub type DotId = usize;

/// Visible drawing area in pixels, origin at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}
