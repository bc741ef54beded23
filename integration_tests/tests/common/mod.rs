#![allow(dead_code)]

use bevy::{math::UVec2, prelude::*};
use overlay_core::{
    attach_overlay, build_overlay_app, BuildingBundle, DrawCommand, Effectiveness, FactoryMeta,
    ProductionStrategy, RecordingContainer, SurfaceLog,
};

pub const CELL_SIZE: u32 = 24;

pub struct Harness {
    pub app: App,
    pub container: RecordingContainer,
    pub log: SurfaceLog,
}

pub fn factory_app() -> App {
    build_overlay_app(FactoryMeta {
        tiles_x: 12,
        tiles_y: 8,
    })
}

pub fn place(app: &mut App, kind: &str, x: u32, y: u32, efficiency: Option<i32>) -> Entity {
    let mut bundle = BuildingBundle::new(kind, UVec2::new(x, y), UVec2::ONE);
    if let Some(value) = efficiency {
        bundle = bundle.with_effectiveness(value);
    }
    app.world.spawn(bundle).id()
}

pub fn place_with_bonus(
    app: &mut App,
    kind: &str,
    x: u32,
    y: u32,
    efficiency: i32,
    bonus: f64,
) -> Entity {
    app.world
        .spawn((
            BuildingBundle::new(kind, UVec2::new(x, y), UVec2::new(2, 2))
                .with_effectiveness(efficiency),
            ProductionStrategy {
                production_bonus: bonus,
            },
        ))
        .id()
}

pub fn set_efficiency(app: &mut App, entity: Entity, descriptor: Option<&str>) {
    let mut effectiveness = app
        .world
        .get_mut::<Effectiveness>(entity)
        .expect("building has an effectiveness component");
    *effectiveness = Effectiveness(descriptor.map(str::to_string));
}

pub fn attach(mut app: App) -> Harness {
    let mut container = RecordingContainer::new();
    attach_overlay(&mut app.world, &mut container, CELL_SIZE);
    let log = container.log().expect("surface attached");
    Harness {
        app,
        container,
        log,
    }
}

/// x coordinate of every efficiency dot in `commands`, in draw order.
pub fn dot_columns(commands: &[DrawCommand]) -> Vec<u32> {
    commands
        .iter()
        .filter_map(|command| match command {
            DrawCommand::FillCircle { center, radius, .. } => {
                Some(((center.x + 1.5 * radius) / CELL_SIZE as f32) as u32 - 1)
            }
            _ => None,
        })
        .collect()
}

pub fn clears(commands: &[DrawCommand]) -> usize {
    commands
        .iter()
        .filter(|command| matches!(command, DrawCommand::Clear { .. }))
        .count()
}
