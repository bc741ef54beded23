//! Efficiency overlay for a factory tile game.
//!
//! Keeps a per-building cache of the last efficiency value drawn and repaints
//! only the glyphs whose value changed on each [`FactoryTick`]. A
//! [`FactoryComponentsChanged`] event rebuilds the cache and repaints the
//! whole surface.

mod cache;
mod components;
pub mod config;
mod coords;
pub mod estimates;
mod glyph;
mod kinds;
mod layer;
pub mod metrics;
mod palette;
mod resources;
pub mod surface;
mod systems;

use std::sync::Arc;

use bevy::{ecs::system::SystemState, prelude::*};

pub use cache::{
    decide_repaint, parse_leading_int, CacheRecord, EntityCache, LastObserved, RepaintDecision,
    SkipReason,
};
pub use components::{
    BuildingBundle, Effectiveness, FactoryTile, MainComponentContainer, ProductionStrategy,
};
pub use config::{
    load_overlay_config_from_env, OverlayConfig, OverlayConfigError, OverlayConfigHandle,
    OverlayConfigMetadata, PanelConfig,
};
pub use coords::{
    icon_anchor, icon_radius, label_panel, pixel_rect, GridPlacement, PixelPoint, PixelRect,
};
pub use glyph::{format_amount, GlyphRenderer};
pub use kinds::{KindClass, KindEntry, KindTable, KindTableError, KindTraits, ResearchRate};
pub use layer::{AttachOutcome, EfficiencyLayer, FactoryHost, RepaintReport, TickOutcome};
pub use metrics::OverlayMetrics;
pub use palette::{Color, ColorParseError, EmptyPalette, Palette};
pub use resources::{FactoryMeta, TickerFocus};
pub use surface::{
    DrawCommand, DrawSurface, OverlayContainer, RecordingContainer, RecordingSurface,
    SurfaceLog, SurfaceSpec,
};
pub use systems::{FactoryComponentsChanged, FactoryTick, FactoryView};

/// Registers the overlay events, resources and the two handler systems.
///
/// The handlers only run once [`attach_overlay`] has attached the layer.
#[derive(Default)]
pub struct EfficiencyOverlayPlugin {
    config: Option<Arc<OverlayConfig>>,
}

impl EfficiencyOverlayPlugin {
    pub fn with_config(config: Arc<OverlayConfig>) -> Self {
        Self {
            config: Some(config),
        }
    }
}

impl Plugin for EfficiencyOverlayPlugin {
    fn build(&self, app: &mut App) {
        let (config, metadata) = match &self.config {
            Some(config) => (Arc::clone(config), OverlayConfigMetadata::default()),
            None => load_overlay_config_from_env(),
        };

        app.add_event::<FactoryTick>()
            .add_event::<FactoryComponentsChanged>()
            .init_resource::<TickerFocus>()
            .init_resource::<FactoryMeta>()
            .init_resource::<OverlayMetrics>()
            .insert_resource(OverlayConfigHandle::new(Arc::clone(&config)))
            .insert_resource(metadata)
            .insert_resource(EfficiencyLayer::new(config))
            .add_systems(
                Update,
                (
                    systems::handle_components_changed,
                    systems::handle_factory_tick,
                )
                    .chain()
                    .run_if(systems::overlay_attached),
            );
    }
}

/// Construct a headless Bevy [`App`] hosting a factory of the given size with
/// the overlay plugin installed.
pub fn build_overlay_app(meta: FactoryMeta) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(meta)
        .add_plugins(EfficiencyOverlayPlugin::default());
    app
}

/// Attach the overlay surface to `container` with the given cell size.
///
/// Idempotent within one world: later calls return
/// [`AttachOutcome::AlreadyAttached`] without creating a surface.
///
/// # Panics
///
/// Panics if [`EfficiencyOverlayPlugin`] was not added to the app.
pub fn attach_overlay(
    world: &mut World,
    container: &mut dyn OverlayContainer,
    cell_size: u32,
) -> AttachOutcome {
    let meta = world
        .get_resource::<FactoryMeta>()
        .copied()
        .unwrap_or_default();
    let mut view: SystemState<FactoryView> = SystemState::new(world);

    world.resource_scope(|world, mut layer: Mut<EfficiencyLayer>| {
        let factory = view.get(world);
        let grid = (meta.tiles_x, meta.tiles_y);
        let outcome = layer.attach(container, grid, cell_size, &factory);
        if outcome == AttachOutcome::Attached {
            // Signals raised while idle belong to no subscription.
            world.resource_mut::<Events<FactoryTick>>().clear();
            world
                .resource_mut::<Events<FactoryComponentsChanged>>()
                .clear();
            let cache_len = layer.cache().map_or(0, EntityCache::len);
            world.resource_mut::<OverlayMetrics>().record_attach(cache_len);
        }
        outcome
    })
}

/// Send one [`FactoryTick`] and run the frame that handles it.
pub fn run_tick(app: &mut App) {
    app.world.send_event(FactoryTick);
    app.update();
}

/// Send one [`FactoryComponentsChanged`] and run the frame that handles it.
pub fn notify_components_changed(app: &mut App) {
    app.world.send_event(FactoryComponentsChanged);
    app.update();
}
