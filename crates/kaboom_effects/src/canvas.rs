//! # Drawing Surface
//!
//! The effects never talk to a graphics API directly. They issue filled and
//! stroked paths, circles, rounded rects and lines through [`Canvas`], with
//! colors described by a [`Paint`].
//!
//! ## Allocation Rules
//!
//! - [`Paint`] and [`Gradient`] are `Copy` values with inline stops
//! - [`PathBuffer`] is owned by whoever builds geometry and is `reset` between
//!   uses, so its verb storage is reused frame after frame
//! - Backends translate a [`Paint`] into their own brush/shader/filter objects
//!   and are expected to cache them
//!
//! [`RecordingCanvas`] stores every call as a [`DrawCommand`]. It backs the
//! tests and the headless soak driver.

use kaboom_core::{Color, Rect, Vec2};

/// Maximum number of stops in a [`Gradient`].
pub const MAX_GRADIENT_STOPS: usize = 4;

/// One color stop of a gradient.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient, 0 to 1.
    pub offset: f32,
    /// Color at this position.
    pub color: Color,
}

impl GradientStop {
    /// Creates a stop.
    #[must_use]
    pub const fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Up to [`MAX_GRADIENT_STOPS`] color stops stored inline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Gradient {
    stops: [GradientStop; MAX_GRADIENT_STOPS],
    len: usize,
}

impl Gradient {
    /// Builds a gradient from explicit stops. Extra stops are ignored.
    #[must_use]
    pub fn new(stops: &[GradientStop]) -> Self {
        let mut gradient = Self::default();
        for stop in stops.iter().take(MAX_GRADIENT_STOPS) {
            gradient.stops[gradient.len] = *stop;
            gradient.len += 1;
        }
        gradient
    }

    /// Three evenly spaced stops.
    #[must_use]
    pub fn three(start: Color, middle: Color, end: Color) -> Self {
        Self::new(&[
            GradientStop::new(0.0, start),
            GradientStop::new(0.5, middle),
            GradientStop::new(1.0, end),
        ])
    }

    /// The stops in use.
    #[must_use]
    pub fn stops(&self) -> &[GradientStop] {
        &self.stops[..self.len]
    }

    /// Highest alpha of any stop.
    #[must_use]
    pub fn max_alpha(&self) -> f32 {
        self.stops().iter().fold(0.0, |acc, s| acc.max(s.color.a))
    }
}

/// How a shape is colored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shader {
    /// One flat color.
    Solid(Color),
    /// Gradient along the segment `from -> to`.
    Linear {
        /// Gradient start point.
        from: Vec2,
        /// Gradient end point.
        to: Vec2,
        /// Color stops.
        gradient: Gradient,
    },
    /// Gradient from `center` outwards to `radius`.
    Radial {
        /// Gradient origin.
        center: Vec2,
        /// Distance at which the last stop is reached.
        radius: f32,
        /// Color stops.
        gradient: Gradient,
    },
}

impl Shader {
    /// Highest alpha this shader can produce.
    #[must_use]
    pub fn max_alpha(&self) -> f32 {
        match self {
            Self::Solid(color) => color.a,
            Self::Linear { gradient, .. } | Self::Radial { gradient, .. } => gradient.max_alpha(),
        }
    }
}

impl Default for Shader {
    fn default() -> Self {
        Self::Solid(Color::WHITE)
    }
}

/// Line end style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StrokeCap {
    /// Flat end at the endpoint.
    #[default]
    Butt,
    /// Semicircle past the endpoint.
    Round,
}

/// Everything a backend needs to color one draw call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Paint {
    /// Fill or stroke coloring.
    pub shader: Shader,
    /// Gaussian blur sigma in pixels, if any.
    pub blur: Option<f32>,
    /// Stroke width for strokes and lines.
    pub stroke_width: f32,
    /// Stroke end style.
    pub cap: StrokeCap,
}

impl Paint {
    /// Flat color paint.
    #[must_use]
    pub fn solid(color: Color) -> Self {
        Self {
            shader: Shader::Solid(color),
            ..Self::default()
        }
    }

    /// Sets the blur sigma.
    #[must_use]
    pub fn with_blur(mut self, sigma: f32) -> Self {
        self.blur = Some(sigma);
        self
    }

    /// Sets stroke width and cap.
    #[must_use]
    pub fn with_stroke(mut self, width: f32, cap: StrokeCap) -> Self {
        self.stroke_width = width;
        self.cap = cap;
        self
    }
}

/// One path construction step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathVerb {
    /// Start a new contour.
    MoveTo(Vec2),
    /// Straight segment.
    LineTo(Vec2),
    /// Quadratic Bezier segment.
    QuadTo {
        /// Control point.
        ctrl: Vec2,
        /// End point.
        to: Vec2,
    },
    /// Close the current contour.
    Close,
}

/// Reusable path storage.
///
/// Call [`PathBuffer::reset`] before building a new path; the verb storage is
/// kept, so after warm-up no call allocates.
#[derive(Debug, Clone, Default)]
pub struct PathBuffer {
    verbs: Vec<PathVerb>,
}

impl PathBuffer {
    /// Creates a buffer with room for `verbs` steps.
    #[must_use]
    pub fn with_capacity(verbs: usize) -> Self {
        Self {
            verbs: Vec::with_capacity(verbs),
        }
    }

    /// Forgets the current path. Storage is kept.
    pub fn reset(&mut self) {
        self.verbs.clear();
    }

    /// Starts a contour at `point`.
    pub fn move_to(&mut self, point: Vec2) {
        self.verbs.push(PathVerb::MoveTo(point));
    }

    /// Adds a straight segment to `point`.
    pub fn line_to(&mut self, point: Vec2) {
        self.verbs.push(PathVerb::LineTo(point));
    }

    /// Adds a quadratic segment through `ctrl` to `to`.
    pub fn quad_to(&mut self, ctrl: Vec2, to: Vec2) {
        self.verbs.push(PathVerb::QuadTo { ctrl, to });
    }

    /// Closes the current contour.
    pub fn close(&mut self) {
        self.verbs.push(PathVerb::Close);
    }

    /// The recorded steps.
    #[must_use]
    pub fn verbs(&self) -> &[PathVerb] {
        &self.verbs
    }

    /// Number of recorded steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.verbs.len()
    }

    /// True when nothing has been recorded since the last reset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    /// Allocated verb slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.verbs.capacity()
    }

    /// Every end and control point, in order.
    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.verbs.iter().flat_map(|verb| {
            let (a, b) = match *verb {
                PathVerb::MoveTo(p) | PathVerb::LineTo(p) => (Some(p), None),
                PathVerb::QuadTo { ctrl, to } => (Some(ctrl), Some(to)),
                PathVerb::Close => (None, None),
            };
            a.into_iter().chain(b)
        })
    }

    /// Axis-aligned box around every point, or `None` for an empty path.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        let mut points = self.points();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| {
            (
                Vec2::new(min.x.min(p.x), min.y.min(p.y)),
                Vec2::new(max.x.max(p.x), max.y.max(p.y)),
            )
        });
        Some(Rect::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }
}

/// An immediate-mode 2D drawing surface.
///
/// Calls have no return value; a backend that cannot draw something drops it.
pub trait Canvas {
    /// Fills a closed path.
    fn fill_path(&mut self, path: &PathBuffer, paint: &Paint);

    /// Strokes a path with `paint.stroke_width`.
    fn stroke_path(&mut self, path: &PathBuffer, paint: &Paint);

    /// Fills a circle.
    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint);

    /// Fills a rectangle with rounded corners. A zero radius gives a plain rect.
    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, paint: &Paint);

    /// Draws a straight line with `paint.stroke_width` and `paint.cap`.
    fn line(&mut self, from: Vec2, to: Vec2, paint: &Paint);

    /// Pushes the current transform.
    fn save(&mut self);

    /// Pops the transform pushed by the matching [`Canvas::save`].
    fn restore(&mut self);

    /// Translates subsequent drawing.
    fn translate(&mut self, offset: Vec2);

    /// Uniformly scales subsequent drawing.
    fn scale(&mut self, factor: f32);

    /// Rotates subsequent drawing by `radians`.
    fn rotate(&mut self, radians: f32);
}

/// One call recorded by [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// [`Canvas::fill_path`].
    FillPath {
        /// Copy of the path verbs.
        verbs: Vec<PathVerb>,
        /// Paint used.
        paint: Paint,
    },
    /// [`Canvas::stroke_path`].
    StrokePath {
        /// Copy of the path verbs.
        verbs: Vec<PathVerb>,
        /// Paint used.
        paint: Paint,
    },
    /// [`Canvas::fill_circle`].
    Circle {
        /// Center.
        center: Vec2,
        /// Radius.
        radius: f32,
        /// Paint used.
        paint: Paint,
    },
    /// [`Canvas::fill_rounded_rect`].
    RoundedRect {
        /// Rectangle.
        rect: Rect,
        /// Corner radius.
        radius: f32,
        /// Paint used.
        paint: Paint,
    },
    /// [`Canvas::line`].
    Line {
        /// Start point.
        from: Vec2,
        /// End point.
        to: Vec2,
        /// Paint used.
        paint: Paint,
    },
    /// [`Canvas::save`].
    Save,
    /// [`Canvas::restore`].
    Restore,
    /// [`Canvas::translate`].
    Translate(Vec2),
    /// [`Canvas::scale`].
    Scale(f32),
    /// [`Canvas::rotate`].
    Rotate(f32),
}

impl DrawCommand {
    /// The paint of a drawing command, `None` for transform commands.
    #[must_use]
    pub fn paint(&self) -> Option<&Paint> {
        match self {
            Self::FillPath { paint, .. }
            | Self::StrokePath { paint, .. }
            | Self::Circle { paint, .. }
            | Self::RoundedRect { paint, .. }
            | Self::Line { paint, .. } => Some(paint),
            _ => None,
        }
    }

    /// True for commands that put pixels on the surface.
    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.paint().is_some()
    }
}

/// A [`Canvas`] that records calls instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
    depth: usize,
    max_depth: usize,
    unbalanced_restores: usize,
}

impl RecordingCanvas {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the previous frame's commands and transform bookkeeping.
    pub fn begin_frame(&mut self) {
        self.commands.clear();
        self.depth = 0;
        self.max_depth = 0;
        self.unbalanced_restores = 0;
    }

    /// Every recorded command, in call order.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of commands that draw something.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_draw()).count()
    }

    /// Recorded filled paths.
    pub fn filled_paths(&self) -> impl Iterator<Item = (&[PathVerb], &Paint)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::FillPath { verbs, paint } => Some((verbs.as_slice(), paint)),
            _ => None,
        })
    }

    /// Recorded circles as `(center, radius, paint)`.
    pub fn circles(&self) -> impl Iterator<Item = (Vec2, f32, &Paint)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Circle {
                center,
                radius,
                paint,
            } => Some((*center, *radius, paint)),
            _ => None,
        })
    }

    /// Current save depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Deepest save nesting seen this frame.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// True when every save was restored and no restore was unmatched.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.depth == 0 && self.unbalanced_restores == 0
    }
}

impl Canvas for RecordingCanvas {
    fn fill_path(&mut self, path: &PathBuffer, paint: &Paint) {
        self.commands.push(DrawCommand::FillPath {
            verbs: path.verbs().to_vec(),
            paint: *paint,
        });
    }

    fn stroke_path(&mut self, path: &PathBuffer, paint: &Paint) {
        self.commands.push(DrawCommand::StrokePath {
            verbs: path.verbs().to_vec(),
            paint: *paint,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            paint: *paint,
        });
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, paint: &Paint) {
        self.commands.push(DrawCommand::RoundedRect {
            rect,
            radius,
            paint: *paint,
        });
    }

    fn line(&mut self, from: Vec2, to: Vec2, paint: &Paint) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            paint: *paint,
        });
    }

    fn save(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if self.depth == 0 {
            self.unbalanced_restores += 1;
        } else {
            self.depth -= 1;
        }
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, offset: Vec2) {
        self.commands.push(DrawCommand::Translate(offset));
    }

    fn scale(&mut self, factor: f32) {
        self.commands.push(DrawCommand::Scale(factor));
    }

    fn rotate(&mut self, radians: f32) {
        self.commands.push(DrawCommand::Rotate(radians));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_truncates_extra_stops() {
        let stops = [GradientStop::new(0.0, Color::WHITE); 6];
        assert_eq!(Gradient::new(&stops).stops().len(), MAX_GRADIENT_STOPS);
        assert_eq!(Gradient::three(Color::WHITE, Color::WHITE, Color::TRANSPARENT).stops()[1].offset, 0.5);
    }

    #[test]
    fn test_path_reset_keeps_storage() {
        let mut path = PathBuffer::with_capacity(8);
        path.move_to(Vec2::ZERO);
        path.line_to(Vec2::new(1.0, 0.0));
        path.quad_to(Vec2::new(2.0, 1.0), Vec2::new(1.0, 2.0));
        path.close();
        assert_eq!(path.len(), 4);

        let cap = path.capacity();
        path.reset();
        assert!(path.is_empty());
        assert_eq!(path.capacity(), cap);
    }

    #[test]
    fn test_path_bounds_include_control_points() {
        let mut path = PathBuffer::default();
        assert!(path.bounds().is_none());

        path.move_to(Vec2::new(0.0, 0.0));
        path.quad_to(Vec2::new(5.0, -3.0), Vec2::new(2.0, 4.0));
        path.close();

        let b = path.bounds().unwrap();
        assert_eq!((b.x, b.y, b.width, b.height), (0.0, -3.0, 5.0, 7.0));
    }

    #[test]
    fn test_recording_tracks_save_depth() {
        let mut canvas = RecordingCanvas::new();
        canvas.save();
        canvas.save();
        canvas.fill_circle(Vec2::ZERO, 1.0, &Paint::solid(Color::WHITE));
        canvas.restore();
        assert_eq!(canvas.depth(), 1);
        assert!(!canvas.is_balanced());
        canvas.restore();
        assert!(canvas.is_balanced());
        assert_eq!(canvas.max_depth(), 2);
        assert_eq!(canvas.draw_count(), 1);

        canvas.restore();
        assert!(!canvas.is_balanced());
        canvas.begin_frame();
        assert!(canvas.commands().is_empty());
        assert!(canvas.is_balanced());
    }
}
