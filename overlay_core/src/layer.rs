//! The efficiency overlay layer: cache, invalidation and surface ownership.
//!
//! A layer starts idle and becomes attached exactly once, when the host view
//! calls [`EfficiencyLayer::attach`]. Once attached it reacts to two host
//! signals:
//!
//! * structural change → rebuild the cache, clear the surface, draw everything;
//! * tick → redraw only buildings whose efficiency changed (skipped while the
//!   host ticker is unfocused).

use std::sync::Arc;

use bevy::prelude::{Entity, Resource};

use crate::{
    cache::{decide_repaint, EntityCache, LastObserved, RepaintDecision, SkipReason},
    components::FactoryTile,
    config::OverlayConfig,
    glyph::GlyphRenderer,
    surface::{DrawSurface, OverlayContainer, SurfaceSpec},
};

/// What the overlay needs to know about the host factory.
pub trait FactoryHost {
    /// Buildings currently registered as main component containers.
    fn main_containers(&self) -> Vec<Entity>;
    fn tile(&self, entity: Entity) -> Option<&FactoryTile>;
    fn effectiveness(&self, entity: Entity) -> Option<&str>;
    fn production_bonus(&self, entity: Entity) -> Option<f64>;
    fn is_focused(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Attached,
    AlreadyAttached,
}

/// Counts from one pass over the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepaintReport {
    pub redrawn: usize,
    pub unchanged: usize,
    pub no_value: usize,
    pub unparseable: usize,
    pub vanished: usize,
}

impl RepaintReport {
    pub fn skipped(&self) -> usize {
        self.unchanged + self.no_value + self.unparseable + self.vanished
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Detached,
    Unfocused,
    Repainted(RepaintReport),
}

struct AttachedLayer {
    surface: Box<dyn DrawSurface>,
    renderer: GlyphRenderer,
    cache: EntityCache,
}

impl AttachedLayer {
    fn rebuild<H: FactoryHost + ?Sized>(&mut self, host: &H) {
        self.cache.rebuild(host.main_containers());
    }

    fn repaint_changed<H: FactoryHost + ?Sized>(&mut self, host: &H) -> RepaintReport {
        let mut report = RepaintReport::default();
        let Self {
            surface,
            renderer,
            cache,
        } = self;

        for record in cache.records_mut() {
            let entity = record.entity;
            let value = match decide_repaint(record.last, host.effectiveness(entity)) {
                RepaintDecision::Redraw(value) => value,
                RepaintDecision::Skip(SkipReason::Unchanged) => {
                    report.unchanged += 1;
                    continue;
                }
                RepaintDecision::Skip(SkipReason::NoValue) => {
                    report.no_value += 1;
                    continue;
                }
                RepaintDecision::Skip(SkipReason::Unparseable) => {
                    report.unparseable += 1;
                    continue;
                }
            };

            let Some(tile) = host.tile(entity) else {
                report.vanished += 1;
                continue;
            };
            tracing::trace!(
                target: "overlay::layer",
                ?entity,
                kind = %tile.kind,
                value,
                "glyph.redraw"
            );
            renderer.render(&mut **surface, tile, value, || {
                host.production_bonus(entity).unwrap_or(0.0)
            });
            record.last = LastObserved::Value(value);
            report.redrawn += 1;
        }

        report
    }
}

/// Overlay layer for one host view instance.
#[derive(Resource)]
pub struct EfficiencyLayer {
    config: Arc<OverlayConfig>,
    attached: Option<AttachedLayer>,
}

impl EfficiencyLayer {
    pub fn new(config: Arc<OverlayConfig>) -> Self {
        Self {
            config,
            attached: None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    pub fn cache(&self) -> Option<&EntityCache> {
        self.attached.as_ref().map(|layer| &layer.cache)
    }

    pub fn surface_spec(&self) -> Option<SurfaceSpec> {
        self.attached.as_ref().map(|layer| layer.surface.spec())
    }

    /// Create the surface, build the cache and draw the initial glyphs.
    /// Later calls on the same layer do nothing.
    pub fn attach<H: FactoryHost + ?Sized>(
        &mut self,
        container: &mut dyn OverlayContainer,
        grid: (u32, u32),
        cell_size: u32,
        host: &H,
    ) -> AttachOutcome {
        if self.attached.is_some() {
            tracing::debug!(target: "overlay::layer", "layer.attach=ignored_already_attached");
            return AttachOutcome::AlreadyAttached;
        }

        let spec = SurfaceSpec::for_grid(grid.0, grid.1, cell_size);
        let mut layer = AttachedLayer {
            surface: container.attach_surface(spec),
            renderer: GlyphRenderer::new(Arc::clone(&self.config), cell_size),
            cache: EntityCache::default(),
        };
        layer.rebuild(host);
        let report = layer.repaint_changed(host);

        tracing::info!(
            target: "overlay::layer",
            width_px = spec.width_px,
            height_px = spec.height_px,
            cell_size,
            cached = layer.cache.len(),
            redrawn = report.redrawn,
            "layer.attached"
        );
        self.attached = Some(layer);
        AttachOutcome::Attached
    }

    /// Structural change: rebuild, clear, then redraw every cached building.
    pub fn on_components_changed<H: FactoryHost + ?Sized>(
        &mut self,
        host: &H,
    ) -> Option<RepaintReport> {
        let layer = self.attached.as_mut()?;
        layer.rebuild(host);
        layer.surface.clear();
        let report = layer.repaint_changed(host);
        tracing::info!(
            target: "overlay::layer",
            cached = layer.cache.len(),
            redrawn = report.redrawn,
            "layer.rebuilt"
        );
        Some(report)
    }

    pub fn on_tick<H: FactoryHost + ?Sized>(&mut self, host: &H) -> TickOutcome {
        let Some(layer) = self.attached.as_mut() else {
            return TickOutcome::Detached;
        };
        if !host.is_focused() {
            return TickOutcome::Unfocused;
        }
        let report = layer.repaint_changed(host);
        tracing::debug!(
            target: "overlay::layer",
            redrawn = report.redrawn,
            skipped = report.skipped(),
            "layer.tick"
        );
        TickOutcome::Repainted(report)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, collections::HashMap};

    use bevy::math::UVec2;

    use super::*;
    use crate::surface::{DrawCommand, RecordingContainer, SurfaceLog};

    #[derive(Default)]
    struct FakeFactory {
        order: Vec<Entity>,
        tiles: HashMap<Entity, FactoryTile>,
        values: HashMap<Entity, String>,
        bonuses: HashMap<Entity, f64>,
        focused: bool,
        value_queries: Cell<usize>,
        bonus_queries: Cell<usize>,
    }

    impl FakeFactory {
        fn new() -> Self {
            Self {
                focused: true,
                ..Self::default()
            }
        }

        fn place(&mut self, index: u32, kind: &str, x: u32, value: Option<&str>) -> Entity {
            let entity = Entity::from_raw(index);
            self.order.push(entity);
            self.tiles.insert(
                entity,
                FactoryTile::new(kind, UVec2::new(x, 0), UVec2::ONE),
            );
            if let Some(value) = value {
                self.values.insert(entity, value.to_string());
            }
            entity
        }

        fn set(&mut self, entity: Entity, value: &str) {
            self.values.insert(entity, value.to_string());
        }
    }

    impl FactoryHost for FakeFactory {
        fn main_containers(&self) -> Vec<Entity> {
            self.order.clone()
        }

        fn tile(&self, entity: Entity) -> Option<&FactoryTile> {
            self.tiles.get(&entity)
        }

        fn effectiveness(&self, entity: Entity) -> Option<&str> {
            self.value_queries.set(self.value_queries.get() + 1);
            self.values.get(&entity).map(String::as_str)
        }

        fn production_bonus(&self, entity: Entity) -> Option<f64> {
            self.bonus_queries.set(self.bonus_queries.get() + 1);
            self.bonuses.get(&entity).copied()
        }

        fn is_focused(&self) -> bool {
            self.focused
        }
    }

    fn attached(factory: &FakeFactory) -> (EfficiencyLayer, RecordingContainer, SurfaceLog) {
        let mut layer = EfficiencyLayer::new(OverlayConfig::builtin());
        let mut container = RecordingContainer::new();
        assert_eq!(
            layer.attach(&mut container, (10, 4), 24, factory),
            AttachOutcome::Attached
        );
        let log = container.log().expect("surface attached");
        (layer, container, log)
    }

    fn dot_centers(commands: &[DrawCommand]) -> Vec<f32> {
        commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::FillCircle { center, .. } => Some(center.x),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn idle_layer_ignores_events() {
        let factory = FakeFactory::new();
        let mut layer = EfficiencyLayer::new(OverlayConfig::builtin());
        assert_eq!(layer.on_tick(&factory), TickOutcome::Detached);
        assert_eq!(layer.on_components_changed(&factory), None);
        assert!(layer.cache().is_none());
    }

    #[test]
    fn attach_sizes_surface_and_draws_initial_glyphs() {
        let mut factory = FakeFactory::new();
        factory.place(1, "conveyor", 0, Some("40%"));
        factory.place(2, "conveyor", 1, None);
        let (layer, container, log) = attached(&factory);

        assert_eq!(
            container.spec(),
            Some(SurfaceSpec {
                width_px: 240,
                height_px: 96,
                pointer_passthrough: true
            })
        );
        assert_eq!(layer.cache().map(EntityCache::len), Some(2));
        assert_eq!(log.glyph_count(), 1);
    }

    #[test]
    fn second_attach_is_a_no_op() {
        let mut factory = FakeFactory::new();
        factory.place(1, "conveyor", 0, Some("40%"));
        let (mut layer, mut container, log) = attached(&factory);

        assert_eq!(
            layer.attach(&mut container, (10, 4), 24, &factory),
            AttachOutcome::AlreadyAttached
        );
        assert_eq!(container.surfaces_attached(), 1);
        assert_eq!(log.glyph_count(), 1);
    }

    #[test]
    fn tick_redraws_only_changed_entities() {
        let mut factory = FakeFactory::new();
        let _a = factory.place(1, "conveyor", 0, Some("40%"));
        let b = factory.place(2, "conveyor", 1, Some("40%"));
        let (mut layer, _container, log) = attached(&factory);
        log.take();

        factory.set(b, "41%");
        let outcome = layer.on_tick(&factory);

        let TickOutcome::Repainted(report) = outcome else {
            panic!("expected repaint, got {outcome:?}");
        };
        assert_eq!(report.redrawn, 1);
        assert_eq!(report.unchanged, 1);
        let commands = log.take();
        assert!(!commands
            .iter()
            .any(|command| matches!(command, DrawCommand::Clear { .. })));
        // b sits in column 1: 24 + 24 - 1.5 * 4.
        assert_eq!(dot_centers(&commands), vec![42.0]);
    }

    #[test]
    fn unfocused_tick_queries_nothing() {
        let mut factory = FakeFactory::new();
        let a = factory.place(1, "conveyor", 0, Some("40%"));
        let (mut layer, _container, log) = attached(&factory);
        log.take();
        factory.value_queries.set(0);

        factory.set(a, "90%");
        factory.focused = false;
        assert_eq!(layer.on_tick(&factory), TickOutcome::Unfocused);
        assert_eq!(factory.value_queries.get(), 0);
        assert!(log.is_empty());

        factory.focused = true;
        assert!(matches!(
            layer.on_tick(&factory),
            TickOutcome::Repainted(RepaintReport { redrawn: 1, .. })
        ));
    }

    #[test]
    fn structural_change_clears_then_redraws_everything() {
        let mut factory = FakeFactory::new();
        let a = factory.place(1, "conveyor", 0, Some("55%"));
        let (mut layer, _container, log) = attached(&factory);
        log.take();

        factory.place(2, "metalsLab", 3, Some("10%"));
        let report = layer
            .on_components_changed(&factory)
            .expect("layer attached");
        assert_eq!(report.redrawn, 2);

        let commands = log.take();
        assert!(matches!(commands.first(), Some(DrawCommand::Clear { .. })));
        assert_eq!(
            commands
                .iter()
                .filter(|command| matches!(command, DrawCommand::Clear { .. }))
                .count(),
            1
        );
        // a is redrawn at the same value because the rebuild reset its record.
        assert_eq!(dot_centers(&commands).len(), 2);
        assert_eq!(
            layer.cache().and_then(|cache| cache.get(a)).map(|r| r.last),
            Some(LastObserved::Value(55))
        );
    }

    #[test]
    fn removed_entities_stop_drawing() {
        let mut factory = FakeFactory::new();
        let a = factory.place(1, "conveyor", 0, Some("10%"));
        let b = factory.place(2, "conveyor", 1, Some("10%"));
        let (mut layer, _container, log) = attached(&factory);

        factory.order.retain(|entity| *entity != a);
        layer.on_components_changed(&factory);
        log.take();

        factory.set(a, "90%");
        factory.set(b, "90%");
        layer.on_tick(&factory);
        assert_eq!(dot_centers(&log.take()), vec![42.0]);
    }

    #[test]
    fn despawned_handle_is_skipped() {
        let mut factory = FakeFactory::new();
        let a = factory.place(1, "conveyor", 0, Some("10%"));
        let (mut layer, _container, log) = attached(&factory);
        log.take();

        factory.tiles.remove(&a);
        factory.set(a, "20%");
        assert!(matches!(
            layer.on_tick(&factory),
            TickOutcome::Repainted(RepaintReport { vanished: 1, redrawn: 0, .. })
        ));
        assert!(log.is_empty());
        assert_eq!(
            layer.cache().and_then(|cache| cache.get(a)).map(|r| r.last),
            Some(LastObserved::Value(10))
        );
    }

    #[test]
    fn bonus_is_read_only_for_panel_kinds() {
        let mut factory = FakeFactory::new();
        factory.place(1, "conveyor", 0, Some("40%"));
        factory.place(2, "sorterVertical", 1, Some("40%"));
        let lab = factory.place(3, "metalsLab", 2, Some("40%"));
        factory.bonuses.insert(lab, 3.0);
        let (_layer, _container, log) = attached(&factory);

        assert_eq!(log.glyph_count(), 3);
        assert_eq!(factory.bonus_queries.get(), 1);
    }

    #[test]
    fn empty_factory_ticks_are_no_ops() {
        let factory = FakeFactory::new();
        let (mut layer, _container, log) = attached(&factory);
        assert_eq!(
            layer.on_tick(&factory),
            TickOutcome::Repainted(RepaintReport::default())
        );
        assert!(log.is_empty());
    }
}
