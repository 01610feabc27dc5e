//! # Explosion Compositor
//!
//! Layers flame ribbons into a full explosion:
//!
//! ```text
//!   glow    wide, blurred, outer color
//!   body    gradient across the ribbon, inner color on the centerline
//!   core    narrow, hot core color
//!   tongues short ribbons that flicker in and out along the arm
//!   burst   three radial gradients at the center, pulsing with fbm
//! ```
//!
//! Every layer's alpha is `envelope * layer weight`, so the layers fade
//! together at slightly different rates. Below the visibility threshold a call
//! returns before touching the canvas.

use kaboom_core::{Color, GridDir, Vec2};
use kaboom_procedural::{fbm, noise};

use crate::canvas::{Canvas, Gradient, GradientStop, Paint, Shader};
use crate::config::{ExplosionSettings, LayerSettings};
use crate::envelope::calculate_envelope;
use crate::flame::{FlameArmRequest, FlameGeometryBuilder, OutlineParams};
use crate::palette::Palette;

/// Layers whose byte alpha falls below this are skipped.
pub const MIN_ALPHA_BYTE: u8 = 3;

/// Pixels of arm length per tongue.
const PIXELS_PER_TONGUE: f32 = 15.0;

/// Most tongues on one arm.
const MAX_TONGUES: usize = 5;

/// Noise level a tongue must exceed to be drawn this frame.
const TONGUE_GATE: f32 = 0.4;

/// Center burst radii relative to cell size: glow, fireball, core.
const BURST_RADII: [f32; 3] = [0.9, 0.6, 0.32];

/// Extra reach past the last cell center, relative to cell size.
const ARM_OVERHANG: f32 = 0.5;

/// Blur sigma of the glow layer, relative to cell size.
const GLOW_BLUR: f32 = 0.22;

/// Paints reused by every draw call of one compositor.
///
/// Built once; each draw only rewrites the shader. Backends key their cached
/// brush and blur filter objects off these values, and dropping the
/// compositor releases them.
#[derive(Debug, Clone, Copy)]
pub struct PaintSet {
    /// Blurred glow layer.
    pub glow: Paint,
    /// Main body layer.
    pub body: Paint,
    /// Hot core layer.
    pub core: Paint,
    /// Flickering tongues.
    pub tongue: Paint,
    /// Center burst circles.
    pub burst: Paint,
}

impl PaintSet {
    /// Creates the paint set for a given cell size.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            glow: Paint::default().with_blur(cell_size * GLOW_BLUR),
            body: Paint::default(),
            core: Paint::default(),
            tongue: Paint::default(),
            burst: Paint::default(),
        }
    }

    /// Rescales the glow blur when the cell size changes.
    pub fn set_cell_size(&mut self, cell_size: f32) {
        self.glow.blur = Some(cell_size * GLOW_BLUR);
    }
}

/// A whole explosion for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionFrame {
    /// Blast center.
    pub center: Vec2,
    /// Arm lengths in cells, indexed by [`GridDir::index`].
    pub arms: [u32; 4],
    /// Grid cell size in pixels.
    pub cell_size: f32,
    /// Animation time in seconds.
    pub time: f32,
    /// Effect progress in [0, 1].
    pub progress: f32,
    /// Fire colors.
    pub palette: Palette,
    /// Per-explosion noise offset.
    pub seed: f32,
}

/// Draws explosions from flame ribbons and radial bursts.
///
/// Owns its geometry buffers and paints; not thread-safe.
#[derive(Debug)]
pub struct ExplosionCompositor {
    builder: FlameGeometryBuilder,
    settings: ExplosionSettings,
    paints: PaintSet,
    cell_size: f32,
}

impl ExplosionCompositor {
    /// Creates a compositor for the given settings and cell size.
    #[must_use]
    pub fn new(settings: ExplosionSettings, cell_size: f32) -> Self {
        Self {
            builder: FlameGeometryBuilder::new(),
            settings,
            paints: PaintSet::new(cell_size),
            cell_size,
        }
    }

    /// Active settings.
    #[must_use]
    pub fn settings(&self) -> &ExplosionSettings {
        &self.settings
    }

    /// Cached paints.
    #[must_use]
    pub fn paints(&self) -> &PaintSet {
        &self.paints
    }

    fn sync_cell_size(&mut self, cell_size: f32) {
        if (cell_size - self.cell_size).abs() > f32::EPSILON {
            self.cell_size = cell_size;
            self.paints.set_cell_size(cell_size);
        }
    }

    /// Draws the radial center burst. Returns the number of draw calls issued.
    pub fn render_center_burst<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        center: Vec2,
        cell_size: f32,
        time: f32,
        palette: &Palette,
        envelope: f32,
    ) -> usize {
        if envelope < self.settings.visibility_threshold {
            return 0;
        }

        let pulse = fbm(time * 1.5, time * 1.2);
        let scale = 0.85 + 0.35 * pulse;
        let layers = [
            (BURST_RADII[0], self.settings.glow.alpha, palette.outer, palette.outer),
            (BURST_RADII[1], self.settings.body.alpha, palette.inner, palette.outer),
            (BURST_RADII[2], self.settings.core.alpha, Color::HOT_WHITE, palette.core),
        ];

        let mut drawn = 0;
        for (radius_factor, weight, inner, mid) in layers {
            let alpha = envelope * weight;
            if !Color::WHITE.with_alpha(alpha).is_visible(MIN_ALPHA_BYTE) {
                continue;
            }
            let radius = cell_size * radius_factor * scale;
            self.paints.burst.shader = Shader::Radial {
                center,
                radius,
                gradient: Gradient::new(&[
                    GradientStop::new(0.0, inner.fade(alpha)),
                    GradientStop::new(0.55, mid.fade(alpha * 0.8)),
                    GradientStop::new(1.0, mid.with_alpha(0.0)),
                ]),
            };
            canvas.fill_circle(center, radius, &self.paints.burst);
            drawn += 1;
        }
        drawn
    }

    /// Draws one arm: glow, body, core and tongues.
    ///
    /// Returns the number of draw calls issued; zero for a zero-length arm or
    /// an envelope below the visibility threshold.
    pub fn render_arm<C: Canvas + ?Sized>(&mut self, canvas: &mut C, request: &FlameArmRequest) -> usize {
        if request.envelope < self.settings.visibility_threshold || request.length_cells == 0 {
            return 0;
        }
        self.sync_cell_size(request.cell_size);

        let length = request.length_px() + request.cell_size * ARM_OVERHANG;
        let palette = &request.palette;
        let mut drawn = 0;

        for kind in [LayerKind::Glow, LayerKind::Body, LayerKind::Core] {
            let layer = kind.settings(&self.settings);
            let alpha = request.envelope * layer.alpha;
            if !Color::WHITE.with_alpha(alpha).is_visible(MIN_ALPHA_BYTE) {
                continue;
            }

            let base_width = request.cell_size * layer.width;
            let params = OutlineParams {
                origin: request.origin,
                direction: request.direction,
                start_offset: 0.0,
                length,
                base_width,
                time: request.time,
                seed: request.seed,
                taper_exponent: layer.taper,
                start_taper_floor: self.settings.start_taper_floor,
            };
            let path = self.builder.build_path(&params);

            let paint = match kind {
                LayerKind::Glow => {
                    self.paints.glow.shader = Shader::Solid(palette.outer.fade(alpha));
                    &self.paints.glow
                }
                LayerKind::Body => {
                    let across = request.direction.unit().perp() * (base_width * 0.5);
                    self.paints.body.shader = Shader::Linear {
                        from: request.origin + across,
                        to: request.origin - across,
                        gradient: Gradient::three(
                            palette.outer.fade(alpha),
                            palette.inner.fade(alpha),
                            palette.outer.fade(alpha),
                        ),
                    };
                    &self.paints.body
                }
                LayerKind::Core => {
                    self.paints.core.shader = Shader::Solid(palette.core.fade(alpha));
                    &self.paints.core
                }
            };
            canvas.fill_path(path, paint);
            drawn += 1;
        }

        drawn + self.render_tongues(canvas, request, length)
    }

    fn render_tongues<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        request: &FlameArmRequest,
        length: f32,
    ) -> usize {
        let count = tongue_count(request.length_px());
        let normal = request.direction.unit().perp();
        let mut drawn = 0;

        for k in 0..count {
            let kf = k as f32;
            let gate = noise(request.seed * 3.7 + kf * 11.3, request.time * 4.0 + kf * 0.7);
            if gate < TONGUE_GATE {
                continue;
            }
            let strength = (gate - TONGUE_GATE) / (1.0 - TONGUE_GATE);
            let alpha = request.envelope * self.settings.tongue_alpha * strength;
            if !Color::WHITE.with_alpha(alpha).is_visible(MIN_ALPHA_BYTE) {
                continue;
            }

            let along = (kf + 0.5) / count as f32;
            let side = if k % 2 == 0 { 1.0 } else { -1.0 };
            let lateral = side * request.cell_size * 0.15 * (0.5 + strength);
            let params = OutlineParams {
                origin: request.origin + normal * lateral,
                direction: request.direction,
                start_offset: along * length * 0.8,
                length: request.cell_size * (0.3 + 0.4 * strength),
                base_width: request.cell_size * 0.22 * (0.5 + 0.5 * strength),
                time: request.time,
                seed: request.seed + kf * 5.3,
                taper_exponent: 1.2,
                start_taper_floor: self.settings.start_taper_floor,
            };
            let path = self.builder.build_path(&params);
            self.paints.tongue.shader =
                Shader::Solid(request.palette.inner.lerp(request.palette.core, strength).fade(alpha));
            canvas.fill_path(path, &self.paints.tongue);
            drawn += 1;
        }
        drawn
    }

    /// Draws arms then the center burst for one explosion.
    ///
    /// The envelope is computed once from `frame.progress` and shared by every
    /// layer.
    pub fn render_explosion<C: Canvas + ?Sized>(&mut self, canvas: &mut C, frame: &ExplosionFrame) -> usize {
        let envelope = calculate_envelope(frame.progress, 1.0);
        if envelope < self.settings.visibility_threshold {
            return 0;
        }

        let mut drawn = 0;
        for direction in GridDir::ALL {
            let request = FlameArmRequest {
                origin: frame.center,
                direction,
                length_cells: frame.arms[direction.index()],
                cell_size: frame.cell_size,
                time: frame.time,
                palette: frame.palette,
                envelope,
                seed: frame.seed,
            };
            drawn += self.render_arm(canvas, &request);
        }
        drawn
            + self.render_center_burst(
                canvas,
                frame.center,
                frame.cell_size,
                frame.time,
                &frame.palette,
                envelope,
            )
    }
}

#[derive(Clone, Copy)]
enum LayerKind {
    Glow,
    Body,
    Core,
}

impl LayerKind {
    fn settings(self, settings: &ExplosionSettings) -> LayerSettings {
        match self {
            Self::Glow => settings.glow,
            Self::Body => settings.body,
            Self::Core => settings.core,
        }
    }
}

/// Tongues drawn along an arm of `length_px` pixels: one per 15 px, 1 to 5.
#[must_use]
pub fn tongue_count(length_px: f32) -> usize {
    ((length_px / PIXELS_PER_TONGUE) as usize).clamp(1, MAX_TONGUES)
}
