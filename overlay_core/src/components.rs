use bevy::{math::UVec2, prelude::*};

/// Static placement of a factory building on the tile grid.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct FactoryTile {
    /// Host kind id, e.g. `"researchCenter3"`.
    pub kind: String,
    /// Grid position of the building's top-left cell.
    pub position: UVec2,
    /// Footprint in cells.
    pub footprint: UVec2,
}

impl FactoryTile {
    pub fn new(kind: impl Into<String>, position: UVec2, footprint: UVec2) -> Self {
        Self {
            kind: kind.into(),
            position,
            footprint,
        }
    }
}

impl Default for FactoryTile {
    fn default() -> Self {
        Self {
            kind: String::new(),
            position: UVec2::ZERO,
            footprint: UVec2::ONE,
        }
    }
}

/// Marks the tile that owns a building (as opposed to the other cells it covers).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MainComponentContainer;

/// Live efficiency descriptor as the host's description data reports it (`"85%"`).
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Effectiveness(pub Option<String>);

impl Effectiveness {
    pub fn percent(value: i32) -> Self {
        Self(Some(format!("{value}%")))
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Economy strategy state attached to bonus-producing buildings.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct ProductionStrategy {
    pub production_bonus: f64,
}

/// Bundle used by hosts and tests to place a building in one call.
#[derive(Bundle, Default)]
pub struct BuildingBundle {
    pub tile: FactoryTile,
    pub main: MainComponentContainer,
    pub effectiveness: Effectiveness,
}

impl BuildingBundle {
    pub fn new(kind: impl Into<String>, position: UVec2, footprint: UVec2) -> Self {
        Self {
            tile: FactoryTile::new(kind, position, footprint),
            main: MainComponentContainer,
            effectiveness: Effectiveness::default(),
        }
    }

    pub fn with_effectiveness(mut self, value: i32) -> Self {
        self.effectiveness = Effectiveness::percent(value);
        self
    }
}
