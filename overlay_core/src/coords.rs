//! Grid → pixel mapping for overlay glyphs.

use bevy::math::UVec2;

use crate::components::FactoryTile;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Shrink by `padding` on every side.
    pub fn inset(&self, padding: f32) -> PixelRect {
        PixelRect {
            x: self.x + padding,
            y: self.y + padding,
            width: self.width - 2.0 * padding,
            height: self.height - 2.0 * padding,
        }
    }
}

/// Cell-space placement of one building, decoupled from the host component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPlacement {
    pub position: UVec2,
    pub footprint: UVec2,
}

impl From<&FactoryTile> for GridPlacement {
    fn from(tile: &FactoryTile) -> Self {
        Self {
            position: tile.position,
            footprint: tile.footprint,
        }
    }
}

pub fn pixel_rect(placement: GridPlacement, cell_size: u32) -> PixelRect {
    let cell = cell_size as f32;
    PixelRect {
        x: placement.position.x as f32 * cell,
        y: placement.position.y as f32 * cell,
        width: placement.footprint.x as f32 * cell,
        height: placement.footprint.y as f32 * cell,
    }
}

pub fn icon_radius(cell_size: u32) -> f32 {
    cell_size as f32 / 6.0
}

/// Dot center: 1.5 icon radii in from the bottom-right corner.
pub fn icon_anchor(rect: PixelRect, radius: f32) -> PixelPoint {
    PixelPoint {
        x: rect.right() - radius * 1.5,
        y: rect.bottom() - radius * 1.5,
    }
}

/// Label panel along the building's top edge: one cell tall, or one and a half
/// when a research line is shown, inset by `padding`.
pub fn label_panel(rect: PixelRect, cell_size: u32, research: bool, padding: f32) -> PixelRect {
    let cell = cell_size as f32;
    let height = if research { 1.5 * cell } else { cell };
    PixelRect {
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height,
    }
    .inset(padding)
}
