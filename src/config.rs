//! Animation settings, loadable from JSON

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FlameError, Result};
use crate::palette::{default_schemes, ColorScheme};
use crate::particles::ParticleConfig;

pub const DEFAULT_CONFIG_PATH: &str = "emberfall.json";

/// Parse a user-supplied intensity; only finite, non-negative values pass
pub fn parse_intensity(s: &str) -> Option<f32> {
    s.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Everything the animation needs besides its surface and host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub particle: ParticleConfig,
    /// Opacity of the black wash painted at the start of each frame.
    /// Lower values leave longer trails.
    pub fade_alpha: f32,
    /// Palettes cycled by the color-mode toggle, in order
    pub schemes: Vec<ColorScheme>,
    /// Respawn dead particles in place when the population is resized
    pub recycle_dead: bool,
    /// RNG seed; unseeded runs draw one from the clock
    pub seed: Option<u64>,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            particle: ParticleConfig::default(),
            fade_alpha: 0.1,
            schemes: default_schemes(),
            recycle_dead: false,
            seed: None,
        }
    }
}

impl AnimationSettings {
    pub fn validate(&self) -> Result<()> {
        if self.schemes.is_empty() {
            return Err(FlameError::EmptyPalette);
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load from `path`, falling back to defaults (with a warning) when the
    /// file is missing or unusable
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                tracing::info!(path = %path.display(), "loaded animation settings");
                settings
            },
            Err(FlameError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                Self::default()
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring settings file");
                Self::default()
            },
        }
    }
}
