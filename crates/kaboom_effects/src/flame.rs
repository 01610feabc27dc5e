//! # Flame Geometry
//!
//! Builds one continuous ribbon per explosion arm instead of one shape per
//! grid cell, so there are no seams where cells meet.
//!
//! ## Shape
//!
//! For sample `i` of [`FLAME_SAMPLES`], with `t = i / FLAME_SEGMENTS`:
//!
//! ```text
//! dist       = start_offset + t * length
//! half_width = base_width / 2
//!            * start_taper(t)            ramp over the first third
//!            * (1 - t^taper_exponent)    end taper, zero at the tip
//!            * (0.8 + 0.4 * fbm(dist))   organic thickness
//! sway       = (noise(dist) - 0.5) * base_width * 0.25 * t
//! ```
//!
//! Width noise is sampled by distance from the explosion center, never by
//! direction, so arms that share a start offset agree on their base width.
//!
//! ## Outline
//!
//! Side A is walked forward with quadratic midpoint smoothing, a quadratic
//! cap goes around the tip, side B is walked backward and the path closes.

use kaboom_core::{GridDir, Vec2};
use kaboom_procedural::{fbm, noise, smoothstep_range};

use crate::canvas::PathBuffer;
use crate::palette::Palette;

/// Segments along one flame ribbon.
pub const FLAME_SEGMENTS: usize = 14;

/// Samples per side: one more than the segment count.
pub const FLAME_SAMPLES: usize = FLAME_SEGMENTS + 1;

/// Verbs in a traced outline: move, 2 x 13 smoothed quads, tip line, cap, final line, close.
pub const FLAME_PATH_VERBS: usize = 2 * FLAME_SAMPLES + 1;

/// Fraction of the ribbon over which the start taper ramps up.
const START_TAPER_SPAN: f32 = 1.0 / 3.0;

/// Spatial frequency of the width noise, per pixel.
const WIDTH_NOISE_FREQ: f32 = 0.045;

/// Time scale of the width noise.
const WIDTH_NOISE_SPEED: f32 = 1.8;

/// Spatial frequency of the sway noise, per pixel.
const SWAY_NOISE_FREQ: f32 = 0.06;

/// Time scale of the sway noise.
const SWAY_NOISE_SPEED: f32 = 2.6;

/// Maximum sway as a fraction of base width, reached at the tip.
const SWAY_AMOUNT: f32 = 0.25;

/// How far the tip cap bulges past the last sample, relative to base width.
const TIP_BULGE: f32 = 0.2;

/// Input to [`FlameGeometryBuilder::build_outline`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineParams {
    /// Explosion center.
    pub origin: Vec2,
    /// Axis the ribbon extends along.
    pub direction: GridDir,
    /// Distance from `origin` where the ribbon starts.
    pub start_offset: f32,
    /// Ribbon length in pixels.
    pub length: f32,
    /// Full width before tapering, in pixels.
    pub base_width: f32,
    /// Animation time in seconds.
    pub time: f32,
    /// Per-explosion noise offset. Zero gives the stock look.
    pub seed: f32,
    /// End taper exponent; larger keeps the ribbon wide for longer.
    pub taper_exponent: f32,
    /// Width at the very start, relative to full width. Zero gives a plain
    /// smoothstep ramp that pinches the ribbon to a point at `start_offset`.
    pub start_taper_floor: f32,
}

/// One arm of an explosion, as handed to the compositor each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlameArmRequest {
    /// Explosion center.
    pub origin: Vec2,
    /// Arm direction.
    pub direction: GridDir,
    /// Arm length in grid cells. Zero draws nothing.
    pub length_cells: u32,
    /// Grid cell size in pixels.
    pub cell_size: f32,
    /// Animation time in seconds.
    pub time: f32,
    /// Fire colors.
    pub palette: Palette,
    /// Envelope value for this frame.
    pub envelope: f32,
    /// Per-explosion noise offset.
    pub seed: f32,
}

impl FlameArmRequest {
    /// Arm length in pixels.
    #[must_use]
    pub fn length_px(&self) -> f32 {
        self.length_cells as f32 * self.cell_size
    }
}

/// Two parallel polylines describing a flame ribbon.
///
/// Overwritten in place by every [`FlameGeometryBuilder::build_outline`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlameOutline {
    side_a: [Vec2; FLAME_SAMPLES],
    side_b: [Vec2; FLAME_SAMPLES],
    centerline: [Vec2; FLAME_SAMPLES],
    half_widths: [f32; FLAME_SAMPLES],
    tip_control: Vec2,
    axis: Vec2,
    normal: Vec2,
}

impl Default for FlameOutline {
    fn default() -> Self {
        Self {
            side_a: [Vec2::ZERO; FLAME_SAMPLES],
            side_b: [Vec2::ZERO; FLAME_SAMPLES],
            centerline: [Vec2::ZERO; FLAME_SAMPLES],
            half_widths: [0.0; FLAME_SAMPLES],
            tip_control: Vec2::ZERO,
            axis: Vec2::ZERO,
            normal: Vec2::ZERO,
        }
    }
}

impl FlameOutline {
    /// Side offset by `+normal`.
    #[must_use]
    pub fn side_a(&self) -> &[Vec2; FLAME_SAMPLES] {
        &self.side_a
    }

    /// Side offset by `-normal`.
    #[must_use]
    pub fn side_b(&self) -> &[Vec2; FLAME_SAMPLES] {
        &self.side_b
    }

    /// Swayed center of each sample.
    #[must_use]
    pub fn centerline(&self) -> &[Vec2; FLAME_SAMPLES] {
        &self.centerline
    }

    /// Half width at each sample.
    #[must_use]
    pub fn half_widths(&self) -> &[f32; FLAME_SAMPLES] {
        &self.half_widths
    }

    /// Full width at sample `i`.
    #[must_use]
    pub fn width_at(&self, i: usize) -> f32 {
        self.half_widths[i] * 2.0
    }

    /// Unit vector along the ribbon.
    #[must_use]
    pub fn axis(&self) -> Vec2 {
        self.axis
    }

    /// Unit vector across the ribbon, towards side A.
    #[must_use]
    pub fn normal(&self) -> Vec2 {
        self.normal
    }

    /// End of the ribbon.
    #[must_use]
    pub fn tip(&self) -> Vec2 {
        self.centerline[FLAME_SEGMENTS]
    }
}

/// Owns the reusable outline and path buffers for flame ribbons.
#[derive(Debug, Default)]
pub struct FlameGeometryBuilder {
    outline: FlameOutline,
    path: PathBuffer,
}

impl FlameGeometryBuilder {
    /// Creates a builder with its path storage already sized.
    #[must_use]
    pub fn new() -> Self {
        Self {
            outline: FlameOutline::default(),
            path: PathBuffer::with_capacity(FLAME_PATH_VERBS),
        }
    }

    /// Recomputes the outline for `params`.
    pub fn build_outline(&mut self, params: &OutlineParams) -> &FlameOutline {
        let axis = params.direction.unit();
        let normal = axis.perp();
        let floor = params.start_taper_floor.clamp(0.0, 1.0);
        let out = &mut self.outline;

        for i in 0..FLAME_SAMPLES {
            let t = i as f32 / FLAME_SEGMENTS as f32;
            let dist = params.start_offset + t * params.length;

            let start_taper = floor + (1.0 - floor) * smoothstep_range(0.0, START_TAPER_SPAN, t);
            let end_taper = 1.0 - t.powf(params.taper_exponent);
            let width_noise = 0.8
                + 0.4 * fbm(dist * WIDTH_NOISE_FREQ + params.seed, params.time * WIDTH_NOISE_SPEED);
            let half = params.base_width * 0.5 * start_taper * end_taper.max(0.0) * width_noise;

            let sway_noise = noise(
                dist * SWAY_NOISE_FREQ + params.seed * 1.31 + 17.0,
                params.time * SWAY_NOISE_SPEED,
            );
            let sway = (sway_noise - 0.5) * params.base_width * SWAY_AMOUNT * t;

            let center = params.origin + axis * dist + normal * sway;
            out.centerline[i] = center;
            out.half_widths[i] = half;
            out.side_a[i] = center + normal * half;
            out.side_b[i] = center - normal * half;
        }

        out.tip_control = out.centerline[FLAME_SEGMENTS] + axis * (params.base_width * TIP_BULGE);
        out.axis = axis;
        out.normal = normal;
        &self.outline
    }

    /// The outline from the last build.
    #[must_use]
    pub fn outline(&self) -> &FlameOutline {
        &self.outline
    }

    /// Builds the outline for `params` and traces it into the owned path.
    pub fn build_path(&mut self, params: &OutlineParams) -> &PathBuffer {
        self.build_outline(params);
        trace_outline(&self.outline, &mut self.path);
        &self.path
    }

    /// The path from the last [`FlameGeometryBuilder::build_path`].
    #[must_use]
    pub fn path(&self) -> &PathBuffer {
        &self.path
    }
}

/// Traces `outline` as one closed, smoothed contour into `path`.
pub fn trace_outline(outline: &FlameOutline, path: &mut PathBuffer) {
    let a = &outline.side_a;
    let b = &outline.side_b;
    let last = FLAME_SEGMENTS;

    path.reset();
    path.move_to(a[0]);
    for pair in a.windows(2).skip(1) {
        path.quad_to(pair[0], pair[0].midpoint(pair[1]));
    }
    path.line_to(a[last]);

    path.quad_to(outline.tip_control, b[last]);

    for pair in b.windows(2).take(last - 1).rev() {
        path.quad_to(pair[1], pair[1].midpoint(pair[0]));
    }
    path.line_to(b[0]);
    path.close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::PathVerb;

    fn params(direction: GridDir) -> OutlineParams {
        OutlineParams {
            origin: Vec2::new(200.0, 200.0),
            direction,
            start_offset: 0.0,
            length: 120.0,
            base_width: 32.0,
            time: 1.25,
            seed: 0.0,
            taper_exponent: 1.8,
            start_taper_floor: 0.45,
        }
    }

    #[test]
    fn test_outline_follows_axis() {
        let mut builder = FlameGeometryBuilder::new();
        let outline = *builder.build_outline(&params(GridDir::Right));

        assert_eq!(outline.centerline()[0], Vec2::new(200.0, 200.0));
        // Sway only moves samples across the axis
        assert!((outline.tip().x - 320.0).abs() < 1e-3);
        for (a, b) in outline.side_a().iter().zip(outline.side_b()) {
            assert!((a.x - b.x).abs() < 1e-3);
        }
    }

    #[test]
    fn test_tip_closes_to_a_point() {
        let mut builder = FlameGeometryBuilder::new();
        let outline = builder.build_outline(&params(GridDir::Up));
        assert_eq!(outline.half_widths()[FLAME_SEGMENTS], 0.0);
        assert_eq!(outline.side_a()[FLAME_SEGMENTS], outline.side_b()[FLAME_SEGMENTS]);
    }

    #[test]
    fn test_width_stays_within_base() {
        let mut builder = FlameGeometryBuilder::new();
        for time in [0.0, 0.7, 3.3, 12.9] {
            let p = OutlineParams { time, ..params(GridDir::Left) };
            let outline = builder.build_outline(&p);
            for i in 0..FLAME_SAMPLES {
                let w = outline.width_at(i);
                assert!(w >= 0.0 && w <= p.base_width * 1.2, "width {w} at {i}");
            }
        }
    }

    #[test]
    fn test_start_taper_narrows_the_base() {
        let mut builder = FlameGeometryBuilder::new();
        let outline = builder.build_outline(&params(GridDir::Down));
        let base = outline.half_widths()[0];
        let full = outline.half_widths()[5];
        assert!(base < full, "base {base} should be narrower than {full}");
    }

    #[test]
    fn test_zero_start_floor_pinches_the_base() {
        let mut builder = FlameGeometryBuilder::new();
        let pinched = OutlineParams {
            start_taper_floor: 0.0,
            ..params(GridDir::Down)
        };
        assert_eq!(builder.build_outline(&pinched).half_widths()[0], 0.0);
        assert!(builder.build_outline(&params(GridDir::Down)).half_widths()[0] > 0.0);
    }

    #[test]
    fn test_arms_sharing_start_agree_at_the_base() {
        let mut builder = FlameGeometryBuilder::new();
        let up = builder.build_outline(&params(GridDir::Up)).width_at(0);
        for dir in [GridDir::Down, GridDir::Left, GridDir::Right] {
            let w = builder.build_outline(&params(dir)).width_at(0);
            assert!((w - up).abs() < 0.5 * 32.0 * 0.4, "{dir:?}: {w} vs {up}");
        }
    }

    #[test]
    fn test_path_shape() {
        let mut builder = FlameGeometryBuilder::new();
        let path = builder.build_path(&params(GridDir::Right));
        let verbs = path.verbs();

        assert_eq!(verbs.len(), FLAME_PATH_VERBS);
        assert!(matches!(verbs[0], PathVerb::MoveTo(_)));
        assert_eq!(verbs[verbs.len() - 1], PathVerb::Close);
        let quads = verbs.iter().filter(|v| matches!(v, PathVerb::QuadTo { .. })).count();
        assert_eq!(quads, 2 * (FLAME_SEGMENTS - 1) + 1);
    }

    #[test]
    fn test_path_buffer_is_reused() {
        let mut builder = FlameGeometryBuilder::new();
        let cap = builder.path().capacity();
        for i in 0..50 {
            let p = OutlineParams { time: i as f32 * 0.016, ..params(GridDir::Up) };
            assert_eq!(builder.build_path(&p).len(), FLAME_PATH_VERBS);
        }
        assert_eq!(builder.path().capacity(), cap);
    }

    #[test]
    fn test_zero_seed_is_reproducible() {
        let mut a = FlameGeometryBuilder::new();
        let mut b = FlameGeometryBuilder::new();
        assert_eq!(a.build_outline(&params(GridDir::Left)), b.build_outline(&params(GridDir::Left)));

        let seeded = OutlineParams { seed: 41.7, ..params(GridDir::Left) };
        let plain = *a.build_outline(&params(GridDir::Left));
        assert_ne!(*b.build_outline(&seeded), plain);
    }
}
