//! Static classification of building kinds.
//!
//! Each kind id the host reports (`"researchCenter3"`, `"sorterVertical"`, ...)
//! maps to a small set of [`KindTraits`] plus the per-kind data the glyph
//! renderer needs. Kinds missing from the table get [`KindClass::UNCLASSIFIED`].

use std::collections::HashMap;

use bitflags::bitflags;
use serde::Deserialize;
use thiserror::Error;

use crate::palette::Color;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct KindTraits: u8 {
        /// High raw efficiency is bad; invert before color mapping.
        const REVERSE_SENSE = 1 << 0;
        /// Draws the production-bonus label panel.
        const BONUS_PANEL = 1 << 1;
        /// Bonus kind that also shows a research-per-tick rate.
        const RESEARCH = 1 << 2;
    }
}

/// `base + bonus * multiplier` research points per tick.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ResearchRate {
    pub base: f64,
    pub multiplier: f64,
}

impl ResearchRate {
    pub fn output(&self, bonus: f64) -> f64 {
        self.base + bonus * self.multiplier
    }
}

/// Raw table entry as it appears in the overlay config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KindEntry {
    pub reverse_sense: bool,
    pub bonus_panel: bool,
    pub accent: Option<Color>,
    pub research: Option<ResearchRate>,
}

/// Resolved classification for one kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindClass {
    pub traits: KindTraits,
    pub accent: Option<Color>,
    pub research: Option<ResearchRate>,
}

impl KindClass {
    pub const UNCLASSIFIED: KindClass = KindClass {
        traits: KindTraits::empty(),
        accent: None,
        research: None,
    };

    pub fn reverse_sense(&self) -> bool {
        self.traits.contains(KindTraits::REVERSE_SENSE)
    }

    pub fn shows_bonus_panel(&self) -> bool {
        self.traits.contains(KindTraits::BONUS_PANEL)
    }

    pub fn is_research(&self) -> bool {
        self.traits.contains(KindTraits::RESEARCH)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KindTableError {
    #[error("kind {kind:?} shows a bonus panel but has no accent color")]
    MissingAccent { kind: String },
    #[error("kind {kind:?} has a research rate but no bonus panel")]
    ResearchWithoutPanel { kind: String },
}

/// Immutable kind → classification lookup, validated once at construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KindTable {
    classes: HashMap<String, KindClass>,
}

impl KindTable {
    pub fn from_entries<'a, I>(entries: I) -> Result<Self, KindTableError>
    where
        I: IntoIterator<Item = (&'a String, &'a KindEntry)>,
    {
        let mut classes = HashMap::new();
        for (kind, entry) in entries {
            let mut traits = KindTraits::empty();
            traits.set(KindTraits::REVERSE_SENSE, entry.reverse_sense);
            traits.set(KindTraits::BONUS_PANEL, entry.bonus_panel);
            traits.set(KindTraits::RESEARCH, entry.research.is_some());

            if entry.bonus_panel && entry.accent.is_none() {
                return Err(KindTableError::MissingAccent { kind: kind.clone() });
            }
            if entry.research.is_some() && !entry.bonus_panel {
                return Err(KindTableError::ResearchWithoutPanel { kind: kind.clone() });
            }

            classes.insert(
                kind.clone(),
                KindClass {
                    traits,
                    accent: entry.accent,
                    research: entry.research,
                },
            );
        }
        Ok(Self { classes })
    }

    pub fn classify(&self, kind: &str) -> KindClass {
        self.classes
            .get(kind)
            .copied()
            .unwrap_or(KindClass::UNCLASSIFIED)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Kind ids carrying every flag in `traits`, sorted for stable output.
    pub fn kinds_with(&self, traits: KindTraits) -> Vec<&str> {
        let mut kinds: Vec<&str> = self
            .classes
            .iter()
            .filter(|(_, class)| class.traits.contains(traits))
            .map(|(kind, _)| kind.as_str())
            .collect();
        kinds.sort_unstable();
        kinds
    }
}
