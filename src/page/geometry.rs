//! Pixel geometry carried by snapshot trees

use serde::{Deserialize, Serialize};

/// Axis-aligned element bounds in page coordinates
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Check if a point is inside this bounding box.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Get the center point of this bounding box.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if this box intersects with another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Bottom edge in page coordinates.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Vertical gap between this box's top and another box's bottom edge.
    /// Used to rank headings and siblings by how close they sit above a field.
    pub fn gap_above(&self, other: &BoundingBox) -> f64 {
        (self.y - other.bottom()).abs()
    }

    /// Distance between the vertical centers of two boxes.
    pub fn center_distance(&self, other: &BoundingBox) -> f64 {
        let (_, a) = self.center();
        let (_, b) = other.center();
        (a - b).abs()
    }
}

/// Viewport dimensions recorded with a snapshot
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportInfo {
    pub width: f64,
    pub height: f64,
}

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;
