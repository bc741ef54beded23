//! Per-building cache of the last efficiency value drawn.
//!
//! The cache decides which glyphs need repainting on a tick. Records hold an
//! [`Entity`] handle only; the host keeps ownership of the building itself.

use std::collections::HashSet;

use bevy::prelude::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastObserved {
    /// Nothing drawn since the last rebuild.
    #[default]
    Unset,
    Value(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheRecord {
    pub entity: Entity,
    pub last: LastObserved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoValue,
    Unparseable,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepaintDecision {
    Skip(SkipReason),
    Redraw(i32),
}

/// Pure repaint decision for one record given the host's current descriptor.
pub fn decide_repaint(last: LastObserved, descriptor: Option<&str>) -> RepaintDecision {
    let Some(descriptor) = descriptor else {
        return RepaintDecision::Skip(SkipReason::NoValue);
    };
    let Some(value) = parse_leading_int(descriptor) else {
        return RepaintDecision::Skip(SkipReason::Unparseable);
    };
    if last == LastObserved::Value(value) {
        return RepaintDecision::Skip(SkipReason::Unchanged);
    }
    RepaintDecision::Redraw(value)
}

/// Leading base-10 integer of `src`, ignoring leading whitespace and any
/// trailing text (`" 85%"` → 85, `"-3.7"` → -3, `"n/a"` → `None`).
pub fn parse_leading_int(src: &str) -> Option<i32> {
    let trimmed = src.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|byte| !byte.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end]
        .bytes()
        .fold(0i64, |acc, byte| {
            (acc * 10 + i64::from(byte - b'0')).min(i64::from(i32::MAX) + 1)
        });
    let value = if negative { -magnitude } else { magnitude };
    Some(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}

#[derive(Debug, Clone, Default)]
pub struct EntityCache {
    records: Vec<CacheRecord>,
}

impl EntityCache {
    /// Replace every record; each entity starts [`LastObserved::Unset`].
    /// Repeated handles keep their first position only.
    pub fn rebuild<I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = Entity>,
    {
        let mut seen = HashSet::new();
        self.records = entities
            .into_iter()
            .filter(|entity| seen.insert(*entity))
            .map(|entity| CacheRecord {
                entity,
                last: LastObserved::Unset,
            })
            .collect();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CacheRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [CacheRecord] {
        &mut self.records
    }

    pub fn get(&self, entity: Entity) -> Option<&CacheRecord> {
        self.records.iter().find(|record| record.entity == entity)
    }
}
