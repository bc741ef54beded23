//! Composite efficiency glyphs: optional bonus panel underneath, colored dot on top.

use std::sync::Arc;

use crate::{
    components::FactoryTile,
    config::OverlayConfig,
    coords::{icon_anchor, icon_radius, label_panel, pixel_rect, GridPlacement, PixelPoint},
    surface::{DrawCommand, DrawSurface, TextAlign, TextBaseline},
};

#[derive(Debug, Clone)]
pub struct GlyphRenderer {
    config: Arc<OverlayConfig>,
    cell_size: u32,
}

impl GlyphRenderer {
    pub fn new(config: Arc<OverlayConfig>, cell_size: u32) -> Self {
        Self { config, cell_size }
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Commands for one building at `efficiency` (raw, 0–100). `bonus` is only
    /// called for kinds with a bonus panel.
    pub fn plan<F>(&self, tile: &FactoryTile, efficiency: i32, bonus: F) -> Vec<DrawCommand>
    where
        F: FnOnce() -> f64,
    {
        let class = self.config.kinds().classify(&tile.kind);
        let value = if class.reverse_sense() {
            100 - efficiency
        } else {
            efficiency
        };

        let rect = pixel_rect(GridPlacement::from(tile), self.cell_size);
        let radius = icon_radius(self.cell_size);
        let anchor = icon_anchor(rect, radius);

        let mut commands = Vec::with_capacity(5);
        // Bonus kinds always carry an accent; the kind table rejects them otherwise.
        if let (true, Some(accent)) = (class.shows_bonus_panel(), class.accent) {
            let panel = self.config.panel();
            let research = class.research;
            let frame = label_panel(rect, self.cell_size, research.is_some(), panel.padding);
            let text_x = rect.right() - 2.0 * panel.padding;
            let bonus = bonus();

            commands.push(DrawCommand::FillRect {
                rect: frame,
                color: panel.background,
            });
            commands.push(DrawCommand::StrokeRect {
                rect: frame,
                color: accent,
                line_width: panel.padding,
            });
            commands.push(DrawCommand::FillText {
                text: format!("{}{}", format_amount(bonus), panel.bonus_suffix),
                at: PixelPoint {
                    x: text_x,
                    y: frame.y,
                },
                align: TextAlign::Right,
                baseline: TextBaseline::Top,
                color: accent,
            });
            if let Some(rate) = research {
                commands.push(DrawCommand::FillText {
                    text: format!("{}{}", format_rate(rate.output(bonus)), panel.research_suffix),
                    at: PixelPoint {
                        x: text_x,
                        y: frame.y + 0.5 * self.cell_size as f32,
                    },
                    align: TextAlign::Right,
                    baseline: TextBaseline::Top,
                    color: accent,
                });
            }
        }

        commands.push(DrawCommand::FillCircle {
            center: anchor,
            radius,
            color: self.config.palette().color_for(value),
        });
        commands
    }

    pub fn render<F>(
        &self,
        surface: &mut dyn DrawSurface,
        tile: &FactoryTile,
        efficiency: i32,
        bonus: F,
    ) where
        F: FnOnce() -> f64,
    {
        for command in self.plan(tile, efficiency, bonus) {
            surface.draw(command);
        }
    }
}

/// Whole amounts print without a fraction (`10`), others in shortest form (`2.5`).
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{amount}")
    }
}

/// One decimal place, with ties rounded away from zero (`6.25` → `6.3`).
fn format_rate(rate: f64) -> String {
    format!("{:.1}", (rate * 10.0).round() / 10.0)
}
