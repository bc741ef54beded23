//! Drawing surface seam.
//!
//! The overlay never talks to a canvas directly. It emits [`DrawCommand`]s into a
//! [`DrawSurface`] that the host's [`OverlayContainer`] creates and attaches.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    coords::{PixelPoint, PixelRect},
    palette::Color,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        rect: PixelRect,
    },
    FillRect {
        rect: PixelRect,
        color: Color,
    },
    StrokeRect {
        rect: PixelRect,
        color: Color,
        line_width: f32,
    },
    FillText {
        text: String,
        at: PixelPoint,
        align: TextAlign,
        baseline: TextBaseline,
        color: Color,
    },
    FillCircle {
        center: PixelPoint,
        radius: f32,
        color: Color,
    },
}

/// Size and input behaviour of the overlay surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSpec {
    pub width_px: u32,
    pub height_px: u32,
    /// The overlay never takes pointer input from the view below it.
    pub pointer_passthrough: bool,
}

impl SurfaceSpec {
    pub fn for_grid(tiles_x: u32, tiles_y: u32, cell_size: u32) -> Self {
        Self {
            width_px: tiles_x * cell_size,
            height_px: tiles_y * cell_size,
            pointer_passthrough: true,
        }
    }

    pub fn bounds(&self) -> PixelRect {
        PixelRect {
            x: 0.0,
            y: 0.0,
            width: self.width_px as f32,
            height: self.height_px as f32,
        }
    }
}

/// Low-level primitive sink owned by the overlay layer.
pub trait DrawSurface: Send + Sync {
    fn spec(&self) -> SurfaceSpec;
    fn draw(&mut self, command: DrawCommand);

    fn clear(&mut self) {
        let rect = self.spec().bounds();
        self.draw(DrawCommand::Clear { rect });
    }
}

/// Host view element the overlay surface is attached to.
pub trait OverlayContainer {
    fn attach_surface(&mut self, spec: SurfaceSpec) -> Box<dyn DrawSurface>;
}

/// Shared, append-only record of the commands a [`RecordingSurface`] received.
#[derive(Debug, Clone, Default)]
pub struct SurfaceLog(Arc<Mutex<Vec<DrawCommand>>>);

impl SurfaceLog {
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.0.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    pub fn take(&self) -> Vec<DrawCommand> {
        std::mem::take(&mut *self.0.lock())
    }

    /// Number of efficiency dots drawn, i.e. glyphs rendered.
    pub fn glyph_count(&self) -> usize {
        self.0
            .lock()
            .iter()
            .filter(|command| matches!(command, DrawCommand::FillCircle { .. }))
            .count()
    }

    fn push(&self, command: DrawCommand) {
        self.0.lock().push(command);
    }
}

/// Surface that records commands instead of rasterizing them.
#[derive(Debug)]
pub struct RecordingSurface {
    spec: SurfaceSpec,
    log: SurfaceLog,
}

impl RecordingSurface {
    pub fn new(spec: SurfaceSpec) -> Self {
        Self {
            spec,
            log: SurfaceLog::default(),
        }
    }

    pub fn log(&self) -> SurfaceLog {
        self.log.clone()
    }
}

impl DrawSurface for RecordingSurface {
    fn spec(&self) -> SurfaceSpec {
        self.spec
    }

    fn draw(&mut self, command: DrawCommand) {
        self.log.push(command);
    }
}

/// Container handing out [`RecordingSurface`]s and remembering each one.
#[derive(Debug, Default)]
pub struct RecordingContainer {
    attached: Vec<(SurfaceSpec, SurfaceLog)>,
}

impl RecordingContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn surfaces_attached(&self) -> usize {
        self.attached.len()
    }

    pub fn spec(&self) -> Option<SurfaceSpec> {
        self.attached.last().map(|(spec, _)| *spec)
    }

    /// Log of the most recently attached surface.
    pub fn log(&self) -> Option<SurfaceLog> {
        self.attached.last().map(|(_, log)| log.clone())
    }
}

impl OverlayContainer for RecordingContainer {
    fn attach_surface(&mut self, spec: SurfaceSpec) -> Box<dyn DrawSurface> {
        let surface = RecordingSurface::new(spec);
        self.attached.push((spec, surface.log()));
        Box::new(surface)
    }
}
