//! Fire palettes and the visual themes that select them.
//!
//! A palette is plain data handed to every render call. Switching theme means
//! passing a different value on the next frame; nothing here subscribes to
//! anything.

use kaboom_core::Color;
use serde::{Deserialize, Serialize};

/// Three-color fire palette.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    /// Glow and body edges.
    pub outer: Color,
    /// Body centerline.
    pub inner: Color,
    /// Hot core and tongues.
    pub core: Color,
}

impl Palette {
    /// Orange fire with a yellow-white core.
    pub const CLASSIC: Self = Self {
        outer: Color::rgb(0.90, 0.22, 0.05),
        inner: Color::rgb(1.00, 0.58, 0.10),
        core: Color::rgb(1.00, 0.95, 0.70),
    };

    /// Magenta edges, cyan body.
    pub const NEON: Self = Self {
        outer: Color::rgb(0.95, 0.10, 0.75),
        inner: Color::rgb(0.20, 0.85, 1.00),
        core: Color::rgb(0.92, 1.00, 1.00),
    };

    /// Cold blue flame.
    pub const ICE: Self = Self {
        outer: Color::rgb(0.10, 0.35, 0.90),
        inner: Color::rgb(0.45, 0.80, 1.00),
        core: Color::rgb(0.90, 0.97, 1.00),
    };

    /// Acid green.
    pub const TOXIC: Self = Self {
        outer: Color::rgb(0.20, 0.55, 0.05),
        inner: Color::rgb(0.55, 0.95, 0.15),
        core: Color::rgb(0.92, 1.00, 0.70),
    };

    /// Creates a palette from explicit colors.
    #[must_use]
    pub const fn new(outer: Color, inner: Color, core: Color) -> Self {
        Self { outer, inner, core }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::CLASSIC
    }
}

/// Visual theme, as stored in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Orange fire.
    #[default]
    Classic,
    /// Synthwave colors.
    Neon,
    /// Blue flame.
    Ice,
    /// Green flame.
    Toxic,
}

impl Theme {
    /// Every theme, in menu order.
    pub const ALL: [Self; 4] = [Self::Classic, Self::Neon, Self::Ice, Self::Toxic];

    /// The fire palette for this theme.
    #[must_use]
    pub const fn palette(self) -> Palette {
        match self {
            Self::Classic => Palette::CLASSIC,
            Self::Neon => Palette::NEON,
            Self::Ice => Palette::ICE,
            Self::Toxic => Palette::TOXIC,
        }
    }
}
