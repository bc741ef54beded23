use bevy::prelude::*;

/// Grid dimensions of the host factory, in cells.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactoryMeta {
    pub tiles_x: u32,
    pub tiles_y: u32,
}

impl Default for FactoryMeta {
    fn default() -> Self {
        Self {
            tiles_x: 60,
            tiles_y: 40,
        }
    }
}

/// Host ticker focus flag; ticks while unfocused are ignored by the overlay.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickerFocus(pub bool);

impl Default for TickerFocus {
    fn default() -> Self {
        Self(true)
    }
}
