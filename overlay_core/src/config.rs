//! Overlay configuration: palette, label panel styling and the kind table.
//!
//! Loaded from `overlay_config.json` with support for an environment variable override.

use std::{
    collections::HashMap,
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use bevy::prelude::Resource;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    kinds::{KindEntry, KindTable, KindTableError},
    palette::{Color, EmptyPalette, Palette},
};

pub const BUILTIN_OVERLAY_CONFIG: &str = include_str!("data/overlay_config.json");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawOverlayConfig {
    palette: PaletteConfig,
    panel: PanelConfig,
    kinds: HashMap<String, KindEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub colors: Vec<Color>,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            colors: Palette::default().colors().to_vec(),
        }
    }
}

/// Styling of the production-bonus label block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub padding: f32,
    pub background: Color,
    pub bonus_suffix: String,
    pub research_suffix: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            padding: 2.0,
            background: Color::WHITE,
            bonus_suffix: "  PB".to_string(),
            research_suffix: " R per T".to_string(),
        }
    }
}

/// Validated overlay configuration. Construction fails on a malformed kind table.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    palette: Palette,
    panel: PanelConfig,
    kinds: KindTable,
}

impl OverlayConfig {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            OverlayConfig::from_json_str(BUILTIN_OVERLAY_CONFIG)
                .expect("builtin overlay config should parse"),
        )
    }

    pub fn new(palette: Palette, panel: PanelConfig, kinds: KindTable) -> Self {
        Self {
            palette,
            panel,
            kinds,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, OverlayConfigError> {
        let raw: RawOverlayConfig = serde_json::from_str(json)?;
        let palette = Palette::new(raw.palette.colors)?;
        let kinds = KindTable::from_entries(&raw.kinds)?;
        Ok(Self {
            palette,
            panel: raw.panel,
            kinds,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, OverlayConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| OverlayConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        OverlayConfig::from_json_str(&contents)
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn panel(&self) -> &PanelConfig {
        &self.panel
    }

    pub fn kinds(&self) -> &KindTable {
        &self.kinds
    }
}

#[derive(Debug, Error)]
pub enum OverlayConfigError {
    #[error("failed to parse overlay config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read overlay config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid kind table: {0}")]
    Kind(#[from] KindTableError),
    #[error(transparent)]
    Palette(#[from] EmptyPalette),
}

/// Handle for accessing the overlay configuration.
#[derive(Resource, Debug, Clone)]
pub struct OverlayConfigHandle(pub Arc<OverlayConfig>);

impl OverlayConfigHandle {
    pub fn new(config: Arc<OverlayConfig>) -> Self {
        Self(config)
    }

    pub fn get(&self) -> Arc<OverlayConfig> {
        Arc::clone(&self.0)
    }
}

/// Metadata about where the active overlay configuration came from.
#[derive(Resource, Debug, Clone, Default)]
pub struct OverlayConfigMetadata {
    path: Option<PathBuf>,
}

impl OverlayConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Load the overlay configuration from `OVERLAY_CONFIG_PATH`, falling back to the builtin.
pub fn load_overlay_config_from_env() -> (Arc<OverlayConfig>, OverlayConfigMetadata) {
    if let Some(path) = env::var("OVERLAY_CONFIG_PATH").ok().map(PathBuf::from) {
        match OverlayConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "overlay::config",
                    path = %path.display(),
                    "overlay_config.loaded=file"
                );
                return (Arc::new(config), OverlayConfigMetadata::new(Some(path)));
            }
            Err(err) => {
                tracing::warn!(
                    target: "overlay::config",
                    path = %path.display(),
                    error = %err,
                    "overlay_config.load_failed"
                );
            }
        }
    }

    let config = OverlayConfig::builtin();
    tracing::info!(target: "overlay::config", "overlay_config.loaded=builtin");
    (config, OverlayConfigMetadata::new(None))
}
