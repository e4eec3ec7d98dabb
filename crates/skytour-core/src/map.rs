//! The survey map: one confinement boundary plus the no-fly zones.
//!
//! Rings are validated once at construction; every later query can
//! assume closed, simple polygons and stays allocation-free.

use crate::geometry::{segment_intersects_ring, segments_intersect, Point, Segment};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Construction-time validation failures for rings and zones.
#[derive(Debug, Error, PartialEq)]
pub enum MapError {
    #[error("ring has {0} vertices, need at least 4 including the closing one")]
    TooFewVertices(usize),
    #[error("ring is not closed: first and last vertex differ")]
    NotClosed,
    #[error("ring edge {0} has zero length")]
    DegenerateEdge(usize),
    #[error("ring is not simple: edges {0} and {1} intersect")]
    SelfIntersecting(usize, usize),
}

/// A closed simple polygon: a ring of at least 4 points whose first
/// and last entries are identical. No holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Ring {
    points: Vec<Point>,
}

impl Ring {
    pub fn new(points: Vec<Point>) -> Result<Self, MapError> {
        if points.len() < 4 {
            return Err(MapError::TooFewVertices(points.len()));
        }
        if points.first() != points.last() {
            return Err(MapError::NotClosed);
        }

        let edge_count = points.len() - 1;
        for i in 0..edge_count {
            if points[i] == points[i + 1] {
                return Err(MapError::DegenerateEdge(i));
            }
        }

        // Simplicity: no two non-adjacent edges may intersect. Adjacent
        // edges share a vertex and would always report touching, so
        // they are skipped, as is the closing edge against the first.
        for i in 0..edge_count {
            for j in (i + 1)..edge_count {
                if j == i + 1 || (i == 0 && j == edge_count - 1) {
                    continue;
                }
                let a = Segment::new(points[i], points[i + 1]);
                let b = Segment::new(points[j], points[j + 1]);
                if segments_intersect(&a, &b) {
                    return Err(MapError::SelfIntersecting(i, j));
                }
            }
        }

        Ok(Self { points })
    }

    /// Axis-aligned rectangle helper, closed counter-clockwise.
    pub fn rectangle(min: Point, max: Point) -> Self {
        let points = vec![
            Point::new(min.lon, min.lat),
            Point::new(max.lon, min.lat),
            Point::new(max.lon, max.lat),
            Point::new(min.lon, max.lat),
            Point::new(min.lon, min.lat),
        ];
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Whether the given segment touches or crosses any edge.
    pub fn blocks(&self, seg: &Segment) -> bool {
        segment_intersects_ring(seg, &self.points)
    }
}

impl TryFrom<Vec<Point>> for Ring {
    type Error = MapError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Ring::new(points)
    }
}

impl From<Ring> for Vec<Point> {
    fn from(ring: Ring) -> Self {
        ring.points
    }
}

/// A named no-fly polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub ring: Ring,
}

impl Zone {
    pub fn new(name: impl Into<String>, ring: Ring) -> Self {
        Self { name: name.into(), ring }
    }
}

/// Handle to an obstacle inside a [`SurveyMap`].
///
/// A plain copyable index instead of a reference, so agents can hold
/// on to "the obstacle that blocked me" without borrowing the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneRef {
    /// The confinement boundary; crossing it in either direction is
    /// illegal, so its edges block like any no-fly edge.
    Boundary,
    /// Index into the no-fly zone list.
    NoFly(usize),
}

/// The immutable map all agents fly against: the confinement boundary
/// plus the list of no-fly zones. Never mutated after construction and
/// freely shared by reference.
#[derive(Debug, Clone)]
pub struct SurveyMap {
    boundary: Ring,
    zones: Vec<Zone>,
}

impl SurveyMap {
    pub fn new(boundary: Ring, zones: Vec<Zone>) -> Self {
        Self { boundary, zones }
    }

    pub fn boundary(&self) -> &Ring {
        &self.boundary
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn ring(&self, zone: ZoneRef) -> &Ring {
        match zone {
            ZoneRef::Boundary => &self.boundary,
            ZoneRef::NoFly(i) => &self.zones[i].ring,
        }
    }

    pub fn zone_name(&self, zone: ZoneRef) -> &str {
        match zone {
            ZoneRef::Boundary => "confinement area",
            ZoneRef::NoFly(i) => &self.zones[i].name,
        }
    }

    /// The first obstacle whose edges the segment touches, checking the
    /// confinement boundary before the no-fly zones in list order.
    pub fn first_blocking(&self, seg: &Segment) -> Option<ZoneRef> {
        if self.boundary.blocks(seg) {
            return Some(ZoneRef::Boundary);
        }
        self.zones
            .iter()
            .position(|zone| zone.ring.blocks(seg))
            .map(ZoneRef::NoFly)
    }
}
