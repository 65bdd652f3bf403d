//! Geometry kernel: points, paths and affine transforms.
//!
//! `Point` is the exact, nanometre-domain type used throughout the board
//! model and the path generator. `Point2D` is a plain floating-point 2D
//! point used by the affine `Transform` and by the flattening step that
//! hands vertices to the polygon algebra layer (`polygon.rs`) — conversion
//! between the two only happens at that boundary.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::polygon::PolygonSet;
use crate::units::{Angle, Length};

/// Degenerate input to the geometry kernel: a zero-length stroke, or three
/// colinear points passed where an arc was expected.
#[derive(Debug, Clone, Error)]
pub enum GeometryError {
    #[error("cannot stroke a zero-length path")]
    ZeroLengthStroke,
    #[error("degenerate arc: three colinear points")]
    DegenerateArc,
}

/// An exact point in the nanometre domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: Length,
    pub y: Length,
}

impl Point {
    pub const fn new(x: Length, y: Length) -> Self {
        Self { x, y }
    }

    pub const ORIGIN: Point = Point { x: Length::ZERO, y: Length::ZERO };

    pub fn translated(self, dx: Length, dy: Length) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn to_point2d(self) -> Point2D {
        Point2D::new(self.x.as_nanos() as f64, self.y.as_nanos() as f64)
    }
}

/// A floating-point 2D point, in the same nanometre-as-f64 units as `Point`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_dvec2(self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn from_dvec2(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }

    pub fn distance_to(self, other: Point2D) -> f64 {
        self.to_dvec2().distance(other.to_dvec2())
    }
}

/// An affine transform: `T(p) = translate + rotate(mirror(p))`.
///
/// Composition order is fixed: mirror is applied first (about the Y axis),
/// then rotation, then translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translate: Point2D,
    pub rotate: Angle,
    pub mirror: bool,
}

impl Transform {
    pub fn identity() -> Self {
        Self { translate: Point2D::new(0.0, 0.0), rotate: Angle::ZERO, mirror: false }
    }

    pub fn new(translate: Point2D, rotate: Angle, mirror: bool) -> Self {
        Self { translate, rotate, mirror }
    }

    pub fn apply(&self, p: Point2D) -> Point2D {
        let mut v = p.to_dvec2();
        if self.mirror {
            v.x = -v.x;
        }
        let rotated = DVec2::from_angle(self.rotate.as_radians()).rotate(v);
        Point2D::from_dvec2(rotated + self.translate.to_dvec2())
    }

    pub fn apply_path(&self, path: &Path) -> Path {
        let vertices = path
            .vertices
            .iter()
            .map(|v| Vertex { pos: self.apply(v.pos), arc_angle: v.arc_angle })
            .collect();
        Path { vertices }
    }
}

/// A vertex of a `Path`: a position plus the arc angle of the segment that
/// leads *to the next* vertex (`0` means a straight line).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub pos: Point2D,
    pub arc_angle: Angle,
}

/// An ordered sequence of vertices describing an open or closed outline.
///
/// Closed iff the first and last vertex coincide. Arcs are flattened to
/// line segments on demand, bounded by a caller-supplied tolerance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path {
    vertices: Vec<Vertex>,
}

impl Path {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }

    pub fn from_straight_points(points: impl IntoIterator<Item = Point2D>) -> Self {
        Self {
            vertices: points.into_iter().map(|pos| Vertex { pos, arc_angle: Angle::ZERO }).collect(),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn is_closed(&self) -> bool {
        match (self.vertices.first(), self.vertices.last()) {
            (Some(a), Some(b)) if self.vertices.len() > 1 => {
                (a.pos.x - b.pos.x).abs() < 1e-6 && (a.pos.y - b.pos.y).abs() < 1e-6
            }
            _ => false,
        }
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Path {
        let vertices = self
            .vertices
            .iter()
            .map(|v| Vertex { pos: Point2D::new(v.pos.x + dx, v.pos.y + dy), arc_angle: v.arc_angle })
            .collect();
        Path { vertices }
    }

    /// A circle of diameter `d` centred at the origin, as a closed path made
    /// of two 180° arcs so flattening can bound the chord-height error.
    pub fn circle(d: f64) -> Path {
        let r = d / 2.0;
        Path {
            vertices: vec![
                Vertex { pos: Point2D::new(-r, 0.0), arc_angle: Angle::from_degrees(180.0) },
                Vertex { pos: Point2D::new(r, 0.0), arc_angle: Angle::from_degrees(180.0) },
                Vertex { pos: Point2D::new(-r, 0.0), arc_angle: Angle::ZERO },
            ],
        }
    }

    /// An obround (stadium) between `p1` and `p2` with width `w`.
    pub fn obround(p1: Point2D, p2: Point2D, w: f64) -> Result<Path, GeometryError> {
        let d = p1.to_dvec2();
        let e = p2.to_dvec2();
        let dir = e - d;
        let len = dir.length();
        if len <= f64::EPSILON {
            return Err(GeometryError::ZeroLengthStroke);
        }
        let n = DVec2::new(-dir.y, dir.x) / len * (w / 2.0);
        let a = d + n;
        let b = e + n;
        let c = e - n;
        let e2 = d - n;
        Ok(Path {
            vertices: vec![
                Vertex { pos: Point2D::from_dvec2(a), arc_angle: Angle::ZERO },
                Vertex { pos: Point2D::from_dvec2(b), arc_angle: Angle::from_degrees(180.0) },
                Vertex { pos: Point2D::from_dvec2(c), arc_angle: Angle::ZERO },
                Vertex { pos: Point2D::from_dvec2(e2), arc_angle: Angle::from_degrees(180.0) },
                Vertex { pos: Point2D::from_dvec2(a), arc_angle: Angle::ZERO },
            ],
        })
    }

    /// Strokes this (possibly open) path with width `w`, returning the union
    /// of every segment's obround (a rectangle + two semicircular caps),
    /// flattened at `arc_tolerance`.
    pub fn to_outline_strokes(&self, w: f64, arc_tolerance: f64) -> Result<PolygonSet, GeometryError> {
        if w <= f64::EPSILON {
            return Err(GeometryError::ZeroLengthStroke);
        }
        if self.vertices.len() < 2 {
            return Err(GeometryError::ZeroLengthStroke);
        }
        let mut out = PolygonSet::empty();
        for window in self.vertices.windows(2) {
            let segment = Path::obround(window[0].pos, window[1].pos, w)?;
            out = out.union(&PolygonSet::from_closed_path(&segment, arc_tolerance)?);
        }
        Ok(out)
    }

    /// Flattens arcs into straight segments such that the maximum
    /// chord-height deviation from the true arc is bounded by `tolerance`
    /// (in the same units as the path's coordinates). Fails with
    /// `GeometryError::DegenerateArc` if a vertex claims a nonzero arc sweep
    /// between coincident points (no circle can pass through a single
    /// point with a nonzero sweep).
    pub fn flatten(&self, tolerance: f64) -> Result<Vec<Point2D>, GeometryError> {
        if self.vertices.is_empty() {
            return Ok(Vec::new());
        }
        let tolerance = tolerance.max(1e-9);
        let mut out = Vec::with_capacity(self.vertices.len());
        for window in self.vertices.windows(2) {
            let a = window[0];
            let b = window[1];
            out.push(a.pos);
            if !a.arc_angle.is_zero() {
                out.extend(flatten_arc(a.pos, b.pos, a.arc_angle, tolerance)?);
            }
        }
        if let Some(last) = self.vertices.last() {
            out.push(last.pos);
        }
        Ok(out)
    }
}

/// Flattens the arc from `start` to `end` sweeping `angle`, returning the
/// intermediate points (exclusive of `start` and `end`).
fn flatten_arc(start: Point2D, end: Point2D, angle: Angle, tolerance: f64) -> Result<Vec<Point2D>, GeometryError> {
    if angle.is_zero() {
        return Ok(Vec::new());
    }
    let chord = start.distance_to(end);
    if chord <= f64::EPSILON {
        return Err(GeometryError::DegenerateArc);
    }
    let half_angle = (angle.as_radians() / 2.0).abs();
    if half_angle <= f64::EPSILON {
        return Ok(Vec::new());
    }
    let radius = (chord / 2.0) / half_angle.sin();
    // Chord-height error for an n-segment flattening of a circular arc of
    // radius r swept by `angle/n` is r*(1 - cos(angle/(2n))). Solve for the
    // smallest n keeping that under `tolerance`.
    let mut segments = 1usize;
    loop {
        let step = angle.as_radians().abs() / segments as f64;
        let error = radius * (1.0 - (step / 2.0).cos());
        if error <= tolerance || segments >= 1024 {
            break;
        }
        segments += 1;
    }

    let center = arc_center(start, end, radius, angle);
    let start_vec = start.to_dvec2() - center;
    let mut points = Vec::with_capacity(segments.saturating_sub(1));
    let step = angle.as_radians() / segments as f64;
    for i in 1..segments {
        let rotated = DVec2::from_angle(step * i as f64).rotate(start_vec);
        points.push(Point2D::from_dvec2(center + rotated));
    }
    Ok(points)
}

fn arc_center(start: Point2D, end: Point2D, radius: f64, angle: Angle) -> DVec2 {
    let mid = (start.to_dvec2() + end.to_dvec2()) / 2.0;
    let chord = end.to_dvec2() - start.to_dvec2();
    let chord_len = chord.length();
    if chord_len <= f64::EPSILON {
        return start.to_dvec2();
    }
    let perp = DVec2::new(-chord.y, chord.x) / chord_len;
    let half_chord = chord_len / 2.0;
    let h_sq = (radius * radius - half_chord * half_chord).max(0.0);
    let h = h_sq.sqrt();
    // Sweep sign determines which side of the chord the centre sits on.
    let sign = if angle.as_millidegrees() >= 0 { 1.0 } else { -1.0 };
    mid + perp * (h * sign)
}

/// Mirrors a layer name top <-> bottom. Even-numbered inner layer pairs
/// (`In2.Cu` <-> `In(N-1).Cu` style naming is a host concern) are identity —
/// only the two outer copper layers and the paired silkscreen/mask/paste
/// layers have a well-defined opposite.
pub fn mirror_layer_name(name: &str) -> String {
    match name {
        "top_courtyard" => "bot_courtyard".to_string(),
        "bot_courtyard" => "top_courtyard".to_string(),
        other if other.starts_with("top_") => format!("bot_{}", &other[4..]),
        other if other.starts_with("bot_") => format!("top_{}", &other[4..]),
        other if other.starts_with("F.") => format!("B.{}", &other[2..]),
        other if other.starts_with("B.") => format!("F.{}", &other[2..]),
        other => other.to_string(),
    }
}
