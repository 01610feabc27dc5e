//! # Effects Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file (or no file) yields the stock look.
//!
//! ```toml
//! seed = 7
//! theme = "neon"
//!
//! [particles]
//! capacity = 300
//!
//! [shake]
//! enabled = false   # reduced effects
//!
//! [explosion.glow]
//! width = 1.3
//! taper = 3.0
//! alpha = 0.4
//!
//! # Replaces the theme's colors when present.
//! [palette]
//! outer = { r = 0.5, g = 0.0, b = 0.5, a = 1.0 }
//! inner = { r = 0.8, g = 0.2, b = 0.8, a = 1.0 }
//! core = { r = 1.0, g = 0.9, b = 1.0, a = 1.0 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EffectsError, EffectsResult};
use crate::palette::{Palette, Theme};

/// Top-level configuration for the effects stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Seed for the particle, shake and explosion-variety RNG streams.
    pub seed: u64,
    /// Palette used when the caller does not pass one explicitly.
    pub theme: Theme,
    /// Particle pool settings.
    pub particles: ParticleSettings,
    /// Screen shake settings.
    pub shake: ShakeSettings,
    /// Explosion layer settings.
    pub explosion: ExplosionSettings,
    /// Custom colors overriding `theme`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<Palette>,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED_B00B_1E55_0001,
            theme: Theme::default(),
            particles: ParticleSettings::default(),
            shake: ShakeSettings::default(),
            explosion: ExplosionSettings::default(),
            palette: None,
        }
    }
}

/// Particle pool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSettings {
    /// Number of particle slots, allocated once.
    pub capacity: usize,
    /// Downward acceleration in pixels per second squared.
    pub gravity: f32,
    /// Upper bound on particles spawned by a single emit call.
    pub max_emit_per_call: usize,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            capacity: 300,
            gravity: 400.0,
            max_emit_per_call: 64,
        }
    }
}

/// Screen shake settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShakeSettings {
    /// When false every trigger is ignored (reduced effects).
    pub enabled: bool,
    /// Triggers are clamped to this many pixels.
    pub max_intensity: f32,
}

impl Default for ShakeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_intensity: 24.0,
        }
    }
}

/// Shape and opacity of one flame layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerSettings {
    /// Ribbon width as a fraction of the cell size.
    pub width: f32,
    /// End-taper exponent; larger keeps the ribbon wide for longer.
    pub taper: f32,
    /// Alpha weight multiplied by the envelope.
    pub alpha: f32,
}

/// Explosion compositor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionSettings {
    /// Alpha weight of the flickering tongues.
    pub tongue_alpha: f32,
    /// Envelopes below this skip drawing entirely.
    pub visibility_threshold: f32,
    /// Explosions tracked at once by the renderer.
    pub max_active: usize,
    /// Arm width at the blast center relative to full width, so arms stay
    /// merged with the center burst.
    pub start_taper_floor: f32,
    /// Wide, blurred outer layer.
    pub glow: LayerSettings,
    /// Two-color main body.
    pub body: LayerSettings,
    /// Narrow hot core.
    pub core: LayerSettings,
}

impl Default for ExplosionSettings {
    fn default() -> Self {
        Self {
            tongue_alpha: 0.6,
            visibility_threshold: 0.01,
            max_active: 32,
            start_taper_floor: 0.45,
            glow: LayerSettings {
                width: 1.15,
                taper: 2.5,
                alpha: 0.55,
            },
            body: LayerSettings {
                width: 0.8,
                taper: 1.8,
                alpha: 0.9,
            },
            core: LayerSettings {
                width: 0.35,
                taper: 1.4,
                alpha: 0.75,
            },
        }
    }
}

impl EffectsConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`EffectsError::ConfigParse`] for malformed TOML and
    /// [`EffectsError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(source: &str) -> EffectsResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`EffectsError::ConfigIo`] if the file cannot be read, plus
    /// everything [`EffectsConfig::from_toml_str`] can return.
    pub fn load(path: impl AsRef<Path>) -> EffectsResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| EffectsError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), "effects config loaded");
        Ok(config)
    }

    /// Serializes the config back to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`EffectsError::ConfigSerialize`] if a value cannot be encoded.
    pub fn to_toml_string(&self) -> EffectsResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The custom palette if one is set, else the theme's.
    #[must_use]
    pub fn active_palette(&self) -> Palette {
        self.palette.unwrap_or_else(|| self.theme.palette())
    }

    /// Checks every value the per-frame code relies on.
    ///
    /// # Errors
    ///
    /// Returns [`EffectsError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> EffectsResult<()> {
        let particles = &self.particles;
        if particles.capacity == 0 {
            return Err(invalid("particles.capacity must be greater than zero"));
        }
        if particles.max_emit_per_call == 0 {
            return Err(invalid("particles.max_emit_per_call must be greater than zero"));
        }
        if !particles.gravity.is_finite() {
            return Err(invalid("particles.gravity must be finite"));
        }

        if !(self.shake.max_intensity.is_finite() && self.shake.max_intensity >= 0.0) {
            return Err(invalid("shake.max_intensity must be a finite, non-negative number"));
        }

        let explosion = &self.explosion;
        for (name, layer) in [
            ("glow", &explosion.glow),
            ("body", &explosion.body),
            ("core", &explosion.core),
        ] {
            if !(layer.width > 0.0 && layer.width.is_finite()) {
                return Err(invalid(format!("explosion.{name}.width must be positive")));
            }
            if !(layer.taper > 0.0 && layer.taper.is_finite()) {
                return Err(invalid(format!("explosion.{name}.taper must be positive")));
            }
            if !(0.0..=1.0).contains(&layer.alpha) {
                return Err(invalid(format!("explosion.{name}.alpha must be within [0, 1]")));
            }
        }
        if !(0.0..=1.0).contains(&explosion.tongue_alpha) {
            return Err(invalid("explosion.tongue_alpha must be within [0, 1]"));
        }
        if !(0.0..1.0).contains(&explosion.visibility_threshold) {
            return Err(invalid("explosion.visibility_threshold must be within [0, 1)"));
        }
        if !(0.0..=1.0).contains(&explosion.start_taper_floor) {
            return Err(invalid("explosion.start_taper_floor must be within [0, 1]"));
        }
        if explosion.max_active == 0 {
            return Err(invalid("explosion.max_active must be greater than zero"));
        }

        if let Some(palette) = &self.palette {
            for (name, color) in [
                ("outer", palette.outer),
                ("inner", palette.inner),
                ("core", palette.core),
            ] {
                if !color.to_array().iter().all(|c| (0.0..=1.0).contains(c)) {
                    return Err(invalid(format!("palette.{name} channels must be within [0, 1]")));
                }
            }
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> EffectsError {
    EffectsError::InvalidConfig(message.into())
}
