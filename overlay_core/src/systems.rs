//! Bevy side of the overlay: host events, the world-backed [`FactoryHost`]
//! and the two handler systems.

use bevy::{ecs::system::SystemParam, prelude::*};

use crate::{
    components::{Effectiveness, FactoryTile, MainComponentContainer, ProductionStrategy},
    layer::{EfficiencyLayer, FactoryHost},
    metrics::OverlayMetrics,
    resources::TickerFocus,
};

/// Simulated time advanced one step.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct FactoryTick;

/// Buildings were added, removed or reconfigured.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct FactoryComponentsChanged;

type BuildingQueryData = (
    Entity,
    &'static FactoryTile,
    Option<&'static Effectiveness>,
    Option<&'static ProductionStrategy>,
);

/// Read-only view of the factory buildings for the overlay layer.
#[derive(SystemParam)]
pub struct FactoryView<'w, 's> {
    buildings: Query<'w, 's, BuildingQueryData, With<MainComponentContainer>>,
    focus: Res<'w, TickerFocus>,
}

impl FactoryHost for FactoryView<'_, '_> {
    fn main_containers(&self) -> Vec<Entity> {
        self.buildings.iter().map(|(entity, ..)| entity).collect()
    }

    fn tile(&self, entity: Entity) -> Option<&FactoryTile> {
        self.buildings.get(entity).ok().map(|(_, tile, ..)| tile)
    }

    fn effectiveness(&self, entity: Entity) -> Option<&str> {
        self.buildings
            .get(entity)
            .ok()
            .and_then(|(_, _, effectiveness, _)| effectiveness)
            .and_then(Effectiveness::as_str)
    }

    fn production_bonus(&self, entity: Entity) -> Option<f64> {
        self.buildings
            .get(entity)
            .ok()
            .and_then(|(.., strategy)| strategy)
            .map(|strategy| strategy.production_bonus)
    }

    fn is_focused(&self) -> bool {
        self.focus.0
    }
}

/// Run condition: handlers are live only once the layer is attached.
pub fn overlay_attached(layer: Res<EfficiencyLayer>) -> bool {
    layer.is_attached()
}

/// Several structural changes in one frame collapse into a single rebuild.
pub fn handle_components_changed(
    mut events: EventReader<FactoryComponentsChanged>,
    mut layer: ResMut<EfficiencyLayer>,
    mut metrics: ResMut<OverlayMetrics>,
    factory: FactoryView,
) {
    let changes = events.read().count();
    if changes == 0 {
        return;
    }
    if let Some(report) = layer.on_components_changed(&factory) {
        let cache_len = layer.cache().map_or(0, |cache| cache.len());
        metrics.record_rebuild(changes, &report, cache_len);
    }
}

/// Ticks in one frame share one repaint pass; later passes would see no change.
pub fn handle_factory_tick(
    mut events: EventReader<FactoryTick>,
    mut layer: ResMut<EfficiencyLayer>,
    mut metrics: ResMut<OverlayMetrics>,
    factory: FactoryView,
) {
    let ticks = events.read().count();
    if ticks == 0 {
        return;
    }
    let outcome = layer.on_tick(&factory);
    metrics.record_tick(ticks, &outcome);
}
