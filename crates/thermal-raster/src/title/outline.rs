//! Vector glyph outlines as drawing commands.

use tiny_skia::PathBuilder;
use ttf_parser::OutlineBuilder;

const EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One drawing command of a glyph outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    Close,
}

impl PathCommand {
    /// Apply `f` to every coordinate pair of the command.
    fn map(self, f: impl Fn(Point) -> Point) -> Self {
        match self {
            Self::MoveTo(p) => Self::MoveTo(f(p)),
            Self::LineTo(p) => Self::LineTo(f(p)),
            Self::QuadTo(c, p) => Self::QuadTo(f(c), f(p)),
            Self::CubicTo(c1, c2, p) => Self::CubicTo(f(c1), f(c2), f(p)),
            Self::Close => Self::Close,
        }
    }
}

/// Axis-aligned box in path coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    /// An inverted box that any point will expand.
    const EMPTY: Self = Self {
        x1: f32::INFINITY,
        y1: f32::INFINITY,
        x2: f32::NEG_INFINITY,
        y2: f32::NEG_INFINITY,
    };

    /// Zero-sized box at the origin.
    pub const ZERO: Self = Self {
        x1: 0.0,
        y1: 0.0,
        x2: 0.0,
        y2: 0.0,
    };

    fn is_valid(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    fn include(&mut self, p: Point) {
        self.x1 = self.x1.min(p.x);
        self.y1 = self.y1.min(p.y);
        self.x2 = self.x2.max(p.x);
        self.y2 = self.y2.max(p.y);
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

/// Ordered outline commands for one rendered string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphPath {
    commands: Vec<PathCommand>,
}

impl GlyphPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn push(&mut self, command: PathCommand) {
        self.commands.push(command);
    }

    /// Append an axis-aligned rectangle as a closed contour.
    pub fn push_rect(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.push(PathCommand::MoveTo(Point::new(x1, y1)));
        self.push(PathCommand::LineTo(Point::new(x2, y1)));
        self.push(PathCommand::LineTo(Point::new(x2, y2)));
        self.push(PathCommand::LineTo(Point::new(x1, y2)));
        self.push(PathCommand::Close);
    }

    /// Exact bounds of the outline, including curve extrema.
    ///
    /// Control points that the curve never reaches do not widen the box.
    /// An empty path yields [`BoundingBox::ZERO`].
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::EMPTY;
        let mut current = Point::default();
        let mut start = Point::default();

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    bbox.include(p);
                    current = p;
                    start = p;
                }
                PathCommand::LineTo(p) => {
                    bbox.include(current);
                    bbox.include(p);
                    current = p;
                }
                PathCommand::QuadTo(c, p) => {
                    bbox.include(current);
                    bbox.include(p);
                    for t in quad_extrema(current, c, p) {
                        bbox.include(quad_point(current, c, p, t));
                    }
                    current = p;
                }
                PathCommand::CubicTo(c1, c2, p) => {
                    bbox.include(current);
                    bbox.include(p);
                    for t in cubic_extrema(current, c1, c2, p) {
                        bbox.include(cubic_point(current, c1, c2, p, t));
                    }
                    current = p;
                }
                PathCommand::Close => current = start,
            }
        }

        if bbox.is_valid() { bbox } else { BoundingBox::ZERO }
    }

    /// Map every coordinate through `(x * scale + tx, y * scale + ty)`.
    pub fn transformed(&self, scale: f32, tx: f32, ty: f32) -> Self {
        let commands = self
            .commands
            .iter()
            .map(|c| c.map(|p| Point::new(p.x * scale + tx, p.y * scale + ty)))
            .collect();
        Self { commands }
    }

    /// Convert to a tiny-skia path. `None` if nothing drawable remains.
    pub fn to_skia(&self) -> Option<tiny_skia::Path> {
        let mut pb = PathBuilder::new();
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => pb.move_to(p.x, p.y),
                PathCommand::LineTo(p) => pb.line_to(p.x, p.y),
                PathCommand::QuadTo(c, p) => pb.quad_to(c.x, c.y, p.x, p.y),
                PathCommand::CubicTo(c1, c2, p) => pb.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
                PathCommand::Close => pb.close(),
            }
        }
        pb.finish()
    }
}

/// Collects a TrueType/CFF glyph outline into a [`GlyphPath`].
///
/// Font units are scaled to pixels, offset by the pen position and
/// flipped so that y grows downward from the baseline.
pub(crate) struct GlyphPathBuilder<'a> {
    path: &'a mut GlyphPath,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl<'a> GlyphPathBuilder<'a> {
    pub(crate) fn new(path: &'a mut GlyphPath, origin_x: f32, origin_y: f32, scale: f32) -> Self {
        Self {
            path,
            origin_x,
            origin_y,
            scale,
        }
    }

    fn point(&self, x: f32, y: f32) -> Point {
        Point::new(self.origin_x + x * self.scale, self.origin_y - y * self.scale)
    }
}

impl OutlineBuilder for GlyphPathBuilder<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.push(PathCommand::MoveTo(p));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.push(PathCommand::LineTo(p));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let c = self.point(x1, y1);
        let p = self.point(x, y);
        self.path.push(PathCommand::QuadTo(c, p));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let c1 = self.point(x1, y1);
        let c2 = self.point(x2, y2);
        let p = self.point(x, y);
        self.path.push(PathCommand::CubicTo(c1, c2, p));
    }

    fn close(&mut self) {
        self.path.push(PathCommand::Close);
    }
}

fn quad_point(p0: Point, p1: Point, p2: Point, t: f32) -> Point {
    let mt = 1.0 - t;
    Point::new(
        mt * mt * p0.x + 2.0 * mt * t * p1.x + t * t * p2.x,
        mt * mt * p0.y + 2.0 * mt * t * p1.y + t * t * p2.y,
    )
}

fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f32) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

/// Parameters in (0, 1) where a quadratic's derivative vanishes per axis.
fn quad_extrema(p0: Point, p1: Point, p2: Point) -> Vec<f32> {
    let axis = |a: f32, b: f32, c: f32| {
        let denom = a - 2.0 * b + c;
        if denom.abs() < EPSILON {
            None
        } else {
            Some((a - b) / denom)
        }
    };
    [axis(p0.x, p1.x, p2.x), axis(p0.y, p1.y, p2.y)]
        .into_iter()
        .flatten()
        .filter(|t| *t > 0.0 && *t < 1.0)
        .collect()
}

/// Parameters in (0, 1) where a cubic's derivative vanishes per axis.
fn cubic_extrema(p0: Point, p1: Point, p2: Point, p3: Point) -> Vec<f32> {
    let mut out = Vec::with_capacity(4);
    for (a0, a1, a2, a3) in [(p0.x, p1.x, p2.x, p3.x), (p0.y, p1.y, p2.y, p3.y)] {
        let d0 = a1 - a0;
        let d1 = a2 - a1;
        let d2 = a3 - a2;
        // derivative / 3 = a t^2 + b t + c
        let a = d0 - 2.0 * d1 + d2;
        let b = 2.0 * (d1 - d0);
        let c = d0;
        if a.abs() < EPSILON {
            if b.abs() >= EPSILON {
                out.push(-c / b);
            }
            continue;
        }
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            continue;
        }
        let sq = disc.sqrt();
        out.push((-b + sq) / (2.0 * a));
        out.push((-b - sq) / (2.0 * a));
    }
    out.retain(|t| *t > 0.0 && *t < 1.0);
    out
}
