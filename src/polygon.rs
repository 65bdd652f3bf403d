//! Polygon algebra: boolean union/intersection/difference and offsetting
//! over closed polygon sets.
//!
//! `PolygonSet` wraps `geo::MultiPolygon<f64>`. Booleans are provided by
//! `geo`'s own `BooleanOps` trait; offsetting (growing/shrinking along every
//! normal, with rounded joins) is provided by the `geo-offset` crate. Both
//! operate in the same nanometre-as-f64 coordinate space that `geometry::Path::flatten`
//! produces, so no rescaling happens at this boundary.

use geo::{BooleanOps, Coord, LineString, MultiPolygon, Polygon};
use geo_offset::Offset;
use thiserror::Error;

use crate::geometry::{GeometryError, Path, Point2D};

/// Failure inside a boolean or offset operation. In practice this only
/// happens on numerical overflow of pathologically large inputs; recovery
/// policy (per the check procedures) is to abort the current check and
/// continue with the next one.
#[derive(Debug, Clone, Error)]
pub enum PolygonAlgebraError {
    #[error("offset operation failed: {0}")]
    OffsetFailed(String),
}

/// A set of simple polygons with holes, closed under union / intersection /
/// difference / offset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonSet {
    polygons: MultiPolygon<f64>,
}

impl PolygonSet {
    pub fn empty() -> Self {
        Self { polygons: MultiPolygon::new(Vec::new()) }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.0.iter().all(|p| p.exterior().0.len() < 3)
    }

    /// Builds a polygon set from a single closed outline, flattening arcs at
    /// `arc_tolerance`. Fails if the outline contains a degenerate arc.
    pub fn from_closed_path(path: &Path, arc_tolerance: f64) -> Result<PolygonSet, GeometryError> {
        let points = path.flatten(arc_tolerance)?;
        if points.len() < 3 {
            return Ok(PolygonSet::empty());
        }
        let coords: Vec<Coord<f64>> = points.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
        let exterior = LineString::new(coords);
        Ok(PolygonSet { polygons: MultiPolygon::new(vec![Polygon::new(exterior, Vec::new())]) })
    }

    /// Builds a polygon set from several closed outlines (e.g. an outer
    /// boundary plus holes already separated), unioning them together.
    pub fn from_closed_paths<'a>(paths: impl IntoIterator<Item = &'a Path>, arc_tolerance: f64) -> Result<PolygonSet, GeometryError> {
        let mut acc = PolygonSet::empty();
        for path in paths {
            acc = acc.union(&PolygonSet::from_closed_path(path, arc_tolerance)?);
        }
        Ok(acc)
    }

    pub fn union(&self, other: &PolygonSet) -> PolygonSet {
        PolygonSet { polygons: self.polygons.union(&other.polygons) }
    }

    /// Returns a polygon set whose area is empty iff `self` and `other` have
    /// no interior overlap (boundary-only contact is not a violation).
    pub fn intersection(&self, other: &PolygonSet) -> PolygonSet {
        PolygonSet { polygons: self.polygons.intersection(&other.polygons) }
    }

    pub fn difference(&self, other: &PolygonSet) -> PolygonSet {
        PolygonSet { polygons: self.polygons.difference(&other.polygons) }
    }

    /// Grows (`delta > 0`) or shrinks (`delta < 0`) this polygon set by
    /// `delta` along every normal, using rounded joins. Shrinking may yield
    /// an empty set.
    pub fn offset(&self, delta: f64) -> Result<PolygonSet, PolygonAlgebraError> {
        if delta == 0.0 {
            return Ok(self.clone());
        }
        if self.is_empty() {
            return Ok(PolygonSet::empty());
        }
        self.polygons
            .offset(delta)
            .map(|polygons| PolygonSet { polygons })
            .map_err(PolygonAlgebraError::OffsetFailed)
    }

    /// Total area across all polygons (exterior minus holes).
    pub fn area(&self) -> f64 {
        use geo::Area;
        self.polygons.unsigned_area()
    }

    /// Exterior rings (and hole rings) as flattened `Path`s, used as
    /// violation `locations`.
    pub fn to_paths(&self) -> Vec<Path> {
        self.polygons
            .0
            .iter()
            .flat_map(|poly| {
                std::iter::once(poly.exterior()).chain(poly.interiors().iter())
            })
            .map(|ring| {
                let points: Vec<Point2D> = ring.coords().map(|c| Point2D::new(c.x, c.y)).collect();
                Path::from_straight_points(points)
            })
            .collect()
    }

    pub fn as_multi_polygon(&self) -> &MultiPolygon<f64> {
        &self.polygons
    }

    /// True iff the point `(x, y)` lies within this set (boundary-exclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        use geo::Contains;
        self.polygons.contains(&geo::Point::new(x, y))
    }
}
