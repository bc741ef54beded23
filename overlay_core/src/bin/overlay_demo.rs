use std::io::{self, BufRead};
use std::thread;

use bevy::math::UVec2;
use bevy::prelude::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use tracing::{info, warn};

use overlay_core::estimates::{factory_purchase, IncomeRates};
use overlay_core::{
    attach_overlay, build_overlay_app, notify_components_changed, run_tick, BuildingBundle,
    Effectiveness, FactoryMeta, MainComponentContainer, OverlayMetrics, ProductionStrategy,
    RecordingContainer, TickerFocus,
};

const CELL_SIZE: u32 = 24;
const DEMO_KINDS: [&str; 6] = [
    "conveyor",
    "sorterVertical",
    "garbageCollector",
    "researchCenter3",
    "metalsLab",
    "qualityLab",
];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let meta = FactoryMeta {
        tiles_x: 32,
        tiles_y: 18,
    };
    let mut app = build_overlay_app(meta);
    let mut rng = SmallRng::seed_from_u64(0x0fac_7021);
    seed_factory(&mut app, &mut rng, meta);

    let mut container = RecordingContainer::new();
    attach_overlay(&mut app.world, &mut container, CELL_SIZE);
    let log = container.log();

    info!(
        target: "overlay::demo",
        tiles_x = meta.tiles_x,
        tiles_y = meta.tiles_y,
        cell_size = CELL_SIZE,
        commands = log.as_ref().map_or(0, |log| log.len()),
        "overlay demo ready (commands: tick [n], focus on|off, place <kind> x y w h, clear, eta <price> <money>)"
    );

    let command_rx = spawn_stdin_listener();
    while let Ok(command) = command_rx.recv() {
        match command {
            Command::Tick(ticks) => {
                for _ in 0..ticks {
                    drift_efficiency(&mut app, &mut rng);
                    run_tick(&mut app);
                }
                let drawn = log.as_ref().map_or(0, |log| log.take().len());
                report(&app, drawn);
            }
            Command::Focus(focused) => {
                app.world.resource_mut::<TickerFocus>().0 = focused;
                info!(target: "overlay::demo", focused, "command.applied=focus");
            }
            Command::Place {
                kind,
                position,
                footprint,
            } => {
                app.world.spawn((
                    BuildingBundle::new(kind.clone(), position, footprint)
                        .with_effectiveness(rng.gen_range(0..=100)),
                    ProductionStrategy {
                        production_bonus: rng.gen_range(0..12) as f64,
                    },
                ));
                notify_components_changed(&mut app);
                info!(target: "overlay::demo", %kind, x = position.x, y = position.y, "command.applied=place");
            }
            Command::Clear => {
                let buildings: Vec<Entity> = app
                    .world
                    .query_filtered::<Entity, With<MainComponentContainer>>()
                    .iter(&app.world)
                    .collect();
                for entity in buildings {
                    app.world.despawn(entity);
                }
                notify_components_changed(&mut app);
                info!(target: "overlay::demo", "command.applied=clear");
            }
            Command::Eta { price, money } => {
                let profit = IncomeRates {
                    avg_per_tick: 12.5,
                    ticks_per_sec: 5.0,
                };
                let label = factory_purchase(false, price, money, profit)
                    .map(|eta| eta.to_string())
                    .unwrap_or_default();
                info!(target: "overlay::demo", price, money, %label, "estimate.factory");
            }
        }
    }
}

fn seed_factory(app: &mut App, rng: &mut SmallRng, meta: FactoryMeta) {
    for y in (0..meta.tiles_y.saturating_sub(1)).step_by(3) {
        for x in (0..meta.tiles_x.saturating_sub(1)).step_by(3) {
            let kind = DEMO_KINDS[rng.gen_range(0..DEMO_KINDS.len())];
            app.world.spawn((
                BuildingBundle::new(kind, UVec2::new(x, y), UVec2::new(2, 2))
                    .with_effectiveness(rng.gen_range(0..=100)),
                ProductionStrategy {
                    production_bonus: rng.gen_range(0..12) as f64,
                },
            ));
        }
    }
}

/// Nudge a few buildings each tick so only some glyphs change.
fn drift_efficiency(app: &mut App, rng: &mut SmallRng) {
    let mut query = app.world.query::<&mut Effectiveness>();
    for mut effectiveness in query.iter_mut(&mut app.world) {
        if !rng.gen_bool(0.2) {
            continue;
        }
        let current = effectiveness
            .as_str()
            .and_then(overlay_core::parse_leading_int)
            .unwrap_or(50);
        let next = (current + rng.gen_range(-5..=5)).clamp(0, 100);
        *effectiveness = Effectiveness::percent(next);
    }
}

fn report(app: &App, drawn_commands: usize) {
    let metrics = app.world.resource::<OverlayMetrics>();
    info!(
        target: "overlay::demo",
        ticks = metrics.ticks_received,
        ignored = metrics.ticks_ignored_unfocused,
        glyphs = metrics.glyphs_drawn,
        skipped = metrics.entities_skipped,
        cached = metrics.cache_len,
        drawn_commands,
        "tick.completed"
    );
}

#[derive(Debug)]
enum Command {
    Tick(u32),
    Focus(bool),
    Place {
        kind: String,
        position: UVec2,
        footprint: UVec2,
    },
    Clear,
    Eta {
        price: f64,
        money: f64,
    },
}

fn spawn_stdin_listener() -> Receiver<Command> {
    let (sender, receiver) = unbounded::<Command>();
    thread::spawn(move || read_commands(sender));
    receiver
}

fn read_commands(sender: Sender<Command>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("Command read error: {}", err);
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match parse_command(trimmed) {
            Some(command) => {
                if sender.send(command).is_err() {
                    break;
                }
            }
            None => warn!("Invalid command: {}", trimmed),
        }
    }
}

fn parse_command(input: &str) -> Option<Command> {
    let mut parts = input.split_whitespace();
    match parts.next()? {
        "tick" => {
            let amount = parts.next().unwrap_or("1").parse().ok()?;
            Some(Command::Tick(amount))
        }
        "focus" => match parts.next()? {
            "on" => Some(Command::Focus(true)),
            "off" => Some(Command::Focus(false)),
            other => {
                warn!("Unsupported focus value: {}", other);
                None
            }
        },
        "place" => {
            let kind = parts.next()?.to_string();
            let x: u32 = parts.next()?.parse().ok()?;
            let y: u32 = parts.next()?.parse().ok()?;
            let w: u32 = parts.next().unwrap_or("1").parse().ok()?;
            let h: u32 = parts.next().unwrap_or("1").parse().ok()?;
            Some(Command::Place {
                kind,
                position: UVec2::new(x, y),
                footprint: UVec2::new(w.max(1), h.max(1)),
            })
        }
        "clear" => Some(Command::Clear),
        "eta" => {
            let price: f64 = parts.next()?.parse().ok()?;
            let money: f64 = parts.next().unwrap_or("0").parse().ok()?;
            Some(Command::Eta { price, money })
        }
        _ => None,
    }
}
