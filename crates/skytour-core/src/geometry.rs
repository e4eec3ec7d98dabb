//! Planar geometry for move legality and collision checks.
//!
//! All coordinates are plain (longitude, latitude) pairs on a flat 2D
//! plane; the survey area is small enough that no geodesic correction
//! is applied.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A position in the plane. Longitude acts as x, latitude as y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

impl Point {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// A directed line segment from `start` to `end`.
///
/// The direction matters: the heading of a segment models the heading
/// of a move, so a segment and its reverse have headings 180° apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        distance(self.start, self.end)
    }

    /// Heading of the segment in degrees, in `[0, 360)`, measured from
    /// the east axis with counter-clockwise positive.
    ///
    /// Vertical segments have no finite slope and are handled before
    /// the `atan` branch.
    pub fn heading_deg(&self) -> f64 {
        if self.start.lon == self.end.lon {
            return if self.start.lat <= self.end.lat { 90.0 } else { 270.0 };
        }

        let slope = (self.end.lat - self.start.lat) / (self.end.lon - self.start.lon);
        let mut deg = slope.atan().to_degrees();

        // Moving from east to west lands in the opposite half-plane.
        if self.start.lon > self.end.lon {
            deg += 180.0;
        }

        deg.rem_euclid(360.0)
    }
}

/// Orientation of an ordered point triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    CounterClockwise,
    Colinear,
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    ((a.lon - b.lon).powi(2) + (a.lat - b.lat).powi(2)).sqrt()
}

/// Move a point by `dist` along the given heading (degrees, east axis,
/// counter-clockwise positive).
pub fn translate(p: Point, heading_deg: f64, dist: f64) -> Point {
    let rad = heading_deg.to_radians();
    Point {
        lon: p.lon + dist * rad.cos(),
        lat: p.lat + dist * rad.sin(),
    }
}

/// Orientation of the triplet (a, b, c).
///
/// Agrees with the sign of the cross product (b − a) × (c − a); the
/// vertical-line cases are branched explicitly so no slope is ever
/// divided out.
pub fn orientation(a: Point, b: Point, c: Point) -> Orientation {
    if b.lon == a.lon {
        return if b.lat == a.lat || c.lon == b.lon {
            Orientation::Colinear
        } else if (b.lat > a.lat) != (c.lon > b.lon) {
            Orientation::CounterClockwise
        } else {
            Orientation::Clockwise
        };
    }

    if c.lon == a.lon {
        return if c.lat == a.lat {
            Orientation::Colinear
        } else if (c.lat > a.lat) != (b.lon > c.lon) {
            Orientation::Clockwise
        } else {
            Orientation::CounterClockwise
        };
    }

    // Compare the slopes of AB and AC without dividing.
    let dy_ab = b.lat - a.lat;
    let dy_ac = c.lat - a.lat;
    let dx_ab = b.lon - a.lon;
    let dx_ac = c.lon - a.lon;

    match (dy_ac * dx_ab).partial_cmp(&(dy_ab * dx_ac)) {
        Some(Ordering::Greater) => Orientation::CounterClockwise,
        Some(Ordering::Less) => Orientation::Clockwise,
        _ => Orientation::Colinear,
    }
}

/// Whether two segments intersect. Touching counts as intersecting:
/// a path may not slip through a shared boundary point.
///
/// Zero-length segments never intersect anything. When a colinear
/// triplet occurs the crossing test degenerates, so those triplets get
/// an explicit containment check instead; if colinear triplets were
/// seen but none contained its point, the segments lie on the same or
/// on crossing lines without overlapping.
pub fn segments_intersect(first: &Segment, second: &Segment) -> bool {
    if first.length() == 0.0 || second.length() == 0.0 {
        return false;
    }

    let a = first.start;
    let b = first.end;
    let c = second.start;
    let d = second.end;

    let acd = orientation(a, c, d);
    let bcd = orientation(b, c, d);
    let cab = orientation(c, a, b);
    let dab = orientation(d, a, b);

    let mut saw_colinear = false;

    if acd == Orientation::Colinear {
        if point_on_colinear_segment(a, second) {
            return true;
        }
        saw_colinear = true;
    }
    if bcd == Orientation::Colinear {
        if point_on_colinear_segment(b, second) {
            return true;
        }
        saw_colinear = true;
    }
    if cab == Orientation::Colinear {
        if point_on_colinear_segment(c, first) {
            return true;
        }
        saw_colinear = true;
    }
    if dab == Orientation::Colinear {
        if point_on_colinear_segment(d, first) {
            return true;
        }
        saw_colinear = true;
    }

    if saw_colinear {
        return false;
    }

    // The segments cross iff each separates the other's endpoints.
    acd != bcd && cab != dab
}

/// Containment check for a point known to be colinear with `seg`:
/// whether it lies within the segment's bounds. Compares longitudes
/// first and falls back to latitudes on a vertical segment.
pub fn point_on_colinear_segment(point: Point, seg: &Segment) -> bool {
    let start = seg.start;
    let end = seg.end;

    if point.lon > start.lon {
        point.lon <= end.lon
    } else if point.lon < start.lon {
        point.lon >= end.lon
    } else if point.lat > start.lat {
        point.lat <= end.lat
    } else if point.lat < start.lat {
        point.lat >= end.lat
    } else {
        // The point is the start of the segment.
        true
    }
}

/// Whether a segment intersects any edge of a closed ring of points
/// (first == last). Short-circuits on the first hit.
pub fn segment_intersects_ring(seg: &Segment, ring: &[Point]) -> bool {
    ring.windows(2)
        .any(|edge| segments_intersect(seg, &Segment::new(edge[0], edge[1])))
}
