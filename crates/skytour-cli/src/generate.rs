//! Random scenario generation for demos and stress tests.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skytour_core::{Point, Scenario, Target, ZoneSpec};

// The survey area the default rules are tuned for.
const MIN_LON: f64 = -3.192473;
const MAX_LON: f64 = -3.184319;
const MIN_LAT: f64 = 55.942617;
const MAX_LAT: f64 = 55.946233;

/// Margin kept between the start/targets and any zone edge, in map
/// degrees. Slightly above the default move distance, so a parking
/// maneuver next to a zone always has room.
const CLEARANCE: f64 = 0.0005;
const ZONE_SIZE: f64 = 0.0008;

/// Build a random scenario: rectangular no-fly zones away from the
/// boundary, and a start plus targets that keep clear of every zone.
pub fn random_scenario(targets: usize, zones: usize, seed: u64, date: NaiveDate) -> Scenario {
    let mut rng = StdRng::seed_from_u64(seed);

    let boundary = vec![
        Point::new(MIN_LON, MIN_LAT),
        Point::new(MAX_LON, MIN_LAT),
        Point::new(MAX_LON, MAX_LAT),
        Point::new(MIN_LON, MAX_LAT),
        Point::new(MIN_LON, MIN_LAT),
    ];

    let mut no_fly_zones = Vec::with_capacity(zones);
    for i in 0..zones {
        // Zones stay away from the boundary so a way around them
        // always exists.
        let lon = rng
            .random_range(MIN_LON + 2.0 * CLEARANCE..MAX_LON - 2.0 * CLEARANCE - ZONE_SIZE);
        let lat = rng
            .random_range(MIN_LAT + 2.0 * CLEARANCE..MAX_LAT - 2.0 * CLEARANCE - ZONE_SIZE);
        no_fly_zones.push(ZoneSpec {
            name: format!("zone-{i}"),
            ring: rectangle(lon, lat, lon + ZONE_SIZE, lat + ZONE_SIZE),
        });
    }

    let start = clear_point(&mut rng, &no_fly_zones);
    let targets = (0..targets)
        .map(|i| {
            Target::new(
                format!("target-{i:02}"),
                clear_point(&mut rng, &no_fly_zones),
            )
        })
        .collect();

    Scenario {
        date,
        start,
        boundary,
        no_fly_zones,
        targets,
    }
}

fn rectangle(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Vec<Point> {
    vec![
        Point::new(min_lon, min_lat),
        Point::new(max_lon, min_lat),
        Point::new(max_lon, max_lat),
        Point::new(min_lon, max_lat),
        Point::new(min_lon, min_lat),
    ]
}

/// Sample a point inside the boundary that keeps its clearance from
/// every zone.
fn clear_point(rng: &mut StdRng, zones: &[ZoneSpec]) -> Point {
    loop {
        let point = Point::new(
            rng.random_range(MIN_LON + CLEARANCE..MAX_LON - CLEARANCE),
            rng.random_range(MIN_LAT + CLEARANCE..MAX_LAT - CLEARANCE),
        );
        if zones.iter().all(|zone| !near_zone(point, &zone.ring)) {
            return point;
        }
    }
}

/// Zones are axis-aligned rectangles, so a bounding-box check with the
/// clearance added is exact.
fn near_zone(point: Point, ring: &[Point]) -> bool {
    let min_lon = ring.iter().map(|p| p.lon).fold(f64::INFINITY, f64::min);
    let max_lon = ring.iter().map(|p| p.lon).fold(f64::NEG_INFINITY, f64::max);
    let min_lat = ring.iter().map(|p| p.lat).fold(f64::INFINITY, f64::min);
    let max_lat = ring.iter().map(|p| p.lat).fold(f64::NEG_INFINITY, f64::max);

    point.lon >= min_lon - CLEARANCE
        && point.lon <= max_lon + CLEARANCE
        && point.lat >= min_lat - CLEARANCE
        && point.lat <= max_lat + CLEARANCE
}
