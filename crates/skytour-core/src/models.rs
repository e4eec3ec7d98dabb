//! Domain models shared between the planner core and its callers.

use crate::geometry::Point;
use crate::map::{MapError, Ring, SurveyMap, Zone};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A point of interest the flight must visit within the read range.
///
/// The payload is opaque to the planner; it is carried through to the
/// flight record when the target is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub position: Point,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Target {
    pub fn new(name: impl Into<String>, position: Point) -> Self {
        Self {
            name: name.into(),
            position,
            payload: serde_json::Value::Null,
        }
    }
}

/// One successful target read during a flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub target: String,
    /// Move number the reading coincided with (1-based step count at
    /// the time of the read).
    pub step: u32,
    pub payload: serde_json::Value,
}

/// A full mission definition as handed over the construction boundary:
/// the survey date, the confinement boundary, the no-fly zones, the
/// start/landing point and the targets to visit.
///
/// Geometry is validated when the map is built, not on every query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub date: NaiveDate,
    pub start: Point,
    pub boundary: Vec<Point>,
    #[serde(default)]
    pub no_fly_zones: Vec<ZoneSpec>,
    pub targets: Vec<Target>,
}

/// Raw named ring, as it appears in a scenario file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub name: String,
    pub ring: Vec<Point>,
}

impl Scenario {
    /// Validate all rings and assemble the immutable obstacle map.
    pub fn build_map(&self) -> Result<SurveyMap, MapError> {
        let boundary = Ring::new(self.boundary.clone())?;
        let zones = self
            .no_fly_zones
            .iter()
            .map(|spec| Ok(Zone::new(spec.name.clone(), Ring::new(spec.ring.clone())?)))
            .collect::<Result<Vec<_>, MapError>>()?;
        Ok(SurveyMap::new(boundary, zones))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_round_trips_through_json() {
        let scenario = Scenario {
            date: NaiveDate::from_ymd_opt(2021, 3, 14).unwrap(),
            start: Point::new(-3.1878, 55.9444),
            boundary: vec![
                Point::new(-3.192473, 55.942617),
                Point::new(-3.184319, 55.942617),
                Point::new(-3.184319, 55.946233),
                Point::new(-3.192473, 55.946233),
                Point::new(-3.192473, 55.942617),
            ],
            no_fly_zones: Vec::new(),
            targets: vec![Target::new("alpha.bravo.charlie", Point::new(-3.1885, 55.9445))],
        };

        let json = serde_json::to_string(&scenario).unwrap();
        let back: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(back.date, scenario.date);
        assert_eq!(back.targets, scenario.targets);
        assert!(back.build_map().is_ok());
    }

    #[test]
    fn bad_ring_fails_at_map_construction() {
        let scenario = Scenario {
            date: NaiveDate::from_ymd_opt(2021, 3, 14).unwrap(),
            start: Point::new(0.5, 0.5),
            boundary: vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(0.0, 1.0),
            ],
            no_fly_zones: Vec::new(),
            targets: Vec::new(),
        };
        assert_eq!(scenario.build_map().unwrap_err(), MapError::NotClosed);
    }
}
