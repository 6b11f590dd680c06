//! Configuration persistence for editor settings

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::compile::GridSettings;
use crate::surface::{DEFAULT_HIT_RADIUS, SnapSetting};

/// Snap choices offered to the user, in millimetres (0 = free hand)
pub const SNAP_CHOICES_MM: [u32; 5] = [10, 5, 2, 1, 0];
/// Allowed grid extent range in centimetres
pub const GRID_EXTENT_RANGE_CM: (u32, u32) = (20, 100);

/// Editor settings persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Grid and snap step in millimetres
    #[serde(default = "default_snap_mm")]
    pub snap_mm: u32,
    /// Visual grid extent in centimetres
    #[serde(default = "default_grid_extent_cm")]
    pub grid_extent_cm: u32,
    /// Debounce between a text change and the recompile it triggers
    #[serde(default = "default_auto_compile_delay_ms")]
    pub auto_compile_delay_ms: u32,
    /// Rasterisation resolution
    #[serde(default = "default_render_dpi")]
    pub render_dpi: u32,
    /// TeX engine executable
    #[serde(default = "default_compiler")]
    pub compiler: String,
    /// PDF to PNG converter executable
    #[serde(default = "default_rasterizer")]
    pub rasterizer: String,
    /// Handle hit radius in screen pixels
    #[serde(default = "default_hit_radius_px")]
    pub hit_radius_px: f64,
}

fn default_snap_mm() -> u32 {
    10
}

fn default_grid_extent_cm() -> u32 {
    20
}

fn default_auto_compile_delay_ms() -> u32 {
    450
}

fn default_render_dpi() -> u32 {
    110
}

fn default_compiler() -> String {
    "pdflatex".to_string()
}

fn default_rasterizer() -> String {
    "pdftoppm".to_string()
}

fn default_hit_radius_px() -> f64 {
    DEFAULT_HIT_RADIUS
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_mm: default_snap_mm(),
            grid_extent_cm: default_grid_extent_cm(),
            auto_compile_delay_ms: default_auto_compile_delay_ms(),
            render_dpi: default_render_dpi(),
            compiler: default_compiler(),
            rasterizer: default_rasterizer(),
            hit_radius_px: default_hit_radius_px(),
        }
    }
}

impl EditorConfig {
    /// Directory name under the user config dir
    pub const APP_DIR: &'static str = "tikzdrag";

    /// `~/.config/tikzdrag/config.json` (or the platform equivalent)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::APP_DIR).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            log::warn!("No config directory available, using defaults");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {err:#}");
                Self::default()
            }
        }
    }

    /// Load and normalise a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: EditorConfig = serde_json::from_str(&json)
            .with_context(|| format!("Malformed config file: {}", path.display()))?;
        Ok(config.normalized())
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            log::error!("No config directory available for saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {err:#}");
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Clamp out-of-range values into what the editor supports
    pub fn normalized(mut self) -> Self {
        if !SNAP_CHOICES_MM.contains(&self.snap_mm) {
            log::warn!(
                "Unsupported snap step {} mm, using {} mm",
                self.snap_mm,
                default_snap_mm()
            );
            self.snap_mm = default_snap_mm();
        }
        let (lo, hi) = GRID_EXTENT_RANGE_CM;
        self.grid_extent_cm = self.grid_extent_cm.clamp(lo, hi);
        if self.render_dpi == 0 {
            self.render_dpi = default_render_dpi();
        }
        if !(self.hit_radius_px.is_finite() && self.hit_radius_px > 0.0) {
            self.hit_radius_px = default_hit_radius_px();
        }
        self
    }

    pub fn snap(&self) -> SnapSetting {
        SnapSetting::from_mm(self.snap_mm)
    }

    pub fn grid(&self) -> GridSettings {
        GridSettings::new(self.snap_mm, self.grid_extent_cm)
    }

    pub fn auto_compile_delay(&self) -> Duration {
        Duration::from_millis(self.auto_compile_delay_ms as u64)
    }
}
