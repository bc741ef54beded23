use bevy::prelude::*;

use crate::layer::{RepaintReport, TickOutcome};

#[derive(Resource, Default, Debug, Clone, PartialEq, Eq)]
pub struct OverlayMetrics {
    pub ticks_received: u64,
    pub ticks_ignored_unfocused: u64,
    pub structural_changes: u64,
    pub rebuilds: u64,
    pub glyphs_drawn: u64,
    pub entities_skipped: u64,
    pub cache_len: usize,
}

impl OverlayMetrics {
    pub fn record_attach(&mut self, cache_len: usize) {
        self.cache_len = cache_len;
    }

    pub fn record_rebuild(&mut self, events: usize, report: &RepaintReport, cache_len: usize) {
        self.structural_changes += events as u64;
        self.rebuilds += 1;
        self.record_report(report);
        self.cache_len = cache_len;
    }

    pub fn record_tick(&mut self, events: usize, outcome: &TickOutcome) {
        self.ticks_received += events as u64;
        match outcome {
            TickOutcome::Unfocused => self.ticks_ignored_unfocused += events as u64,
            TickOutcome::Repainted(report) => self.record_report(report),
            TickOutcome::Detached => {}
        }
    }

    fn record_report(&mut self, report: &RepaintReport) {
        self.glyphs_drawn += report.redrawn as u64;
        self.entities_skipped += report.skipped() as u64;
    }
}
