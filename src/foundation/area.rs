use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle with inclusive corners, used for clip, blend and source regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendArea {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BlendArea {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// The area covering `width x height` pixels starting at the origin.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32 - 1, height as i32 - 1)
    }

    /// `x2 - x1 + 1`, clamped at zero for inverted areas.
    pub fn width(&self) -> u32 {
        (i64::from(self.x2) - i64::from(self.x1) + 1).max(0) as u32
    }

    /// `y2 - y1 + 1`, clamped at zero for inverted areas.
    pub fn height(&self) -> u32 {
        (i64::from(self.y2) - i64::from(self.y1) + 1).max(0) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Overlap of two areas, `None` when they are disjoint.
    pub fn intersect(&self, other: &BlendArea) -> Option<BlendArea> {
        let out = BlendArea::new(
            self.x1.max(other.x1),
            self.y1.max(other.y1),
            self.x2.min(other.x2),
            self.y2.min(other.y2),
        );
        (!out.is_empty()).then_some(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/area.rs"]
mod tests;
