//! Flight log and GeoJSON rendering of a finished mission.

use anyhow::{Context, Result};
use serde_json::json;
use skytour_core::{FlightRecord, MissionReport, Point, Scenario};
use std::fs;
use std::path::{Path, PathBuf};

/// Write `flightpath-<date>.txt` and `tour-<date>.geojson` into the
/// given directory, returning both paths.
pub fn write_outputs(
    dir: &Path,
    scenario: &Scenario,
    report: &MissionReport,
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let date = scenario.date.format("%d-%m-%Y");

    let log_path = dir.join(format!("flightpath-{date}.txt"));
    fs::write(&log_path, flightpath_lines(scenario.start, &report.flight))
        .with_context(|| format!("failed to write {}", log_path.display()))?;

    let geojson_path = dir.join(format!("tour-{date}.geojson"));
    let collection = tour_feature_collection(scenario, &report.flight);
    fs::write(&geojson_path, serde_json::to_string_pretty(&collection)?)
        .with_context(|| format!("failed to write {}", geojson_path.display()))?;

    Ok((log_path, geojson_path))
}

/// One line per move: step number, position before, heading, position
/// after, and the target read on that step (or `null`).
pub fn flightpath_lines(start: Point, flight: &FlightRecord) -> String {
    let mut out = String::new();
    let mut from = start;

    for (i, mv) in flight.moves.iter().enumerate() {
        let step = i as u32 + 1;
        let read = flight
            .readings
            .iter()
            .find(|r| r.step == step)
            .map(|r| r.target.as_str())
            .unwrap_or("null");
        out.push_str(&format!(
            "{step},{},{},{},{},{},{read}\n",
            from.lon, from.lat, mv.heading_deg, mv.position.lon, mv.position.lat
        ));
        from = mv.position;
    }

    out
}

/// A GeoJSON FeatureCollection: the flown path as a LineString plus
/// one marker per target, colored by whether it was read.
pub fn tour_feature_collection(scenario: &Scenario, flight: &FlightRecord) -> serde_json::Value {
    let mut coordinates = vec![vec![scenario.start.lon, scenario.start.lat]];
    coordinates.extend(
        flight
            .moves
            .iter()
            .map(|mv| vec![mv.position.lon, mv.position.lat]),
    );

    let mut features = vec![json!({
        "type": "Feature",
        "properties": {},
        "geometry": {
            "type": "LineString",
            "coordinates": coordinates,
        },
    })];

    for target in &scenario.targets {
        let visited = flight.readings.iter().any(|r| r.target == target.name);
        let (color, symbol) = if visited {
            ("#00ff00", "lighthouse")
        } else {
            ("#aaaaaa", "cross")
        };
        features.push(json!({
            "type": "Feature",
            "properties": {
                "name": target.name,
                "marker-color": color,
                "marker-symbol": symbol,
                "visited": visited,
            },
            "geometry": {
                "type": "Point",
                "coordinates": [target.position.lon, target.position.lat],
            },
        }));
    }

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use skytour_core::{FlightStatus, MoveRecord, Reading, Target};

    fn sample_flight() -> FlightRecord {
        FlightRecord {
            status: FlightStatus::Landed { steps: 2 },
            moves: vec![
                MoveRecord {
                    heading_deg: 0,
                    position: Point::new(1.0, 0.0),
                },
                MoveRecord {
                    heading_deg: 90,
                    position: Point::new(1.0, 1.0),
                },
            ],
            readings: vec![Reading {
                target: "alpha".to_string(),
                step: 2,
                payload: serde_json::Value::Null,
            }],
        }
    }

    fn sample_scenario() -> Scenario {
        Scenario {
            date: NaiveDate::from_ymd_opt(2021, 3, 14).unwrap(),
            start: Point::new(0.0, 0.0),
            boundary: vec![
                Point::new(-5.0, -5.0),
                Point::new(5.0, -5.0),
                Point::new(5.0, 5.0),
                Point::new(-5.0, 5.0),
                Point::new(-5.0, -5.0),
            ],
            no_fly_zones: Vec::new(),
            targets: vec![
                Target::new("alpha", Point::new(1.0, 1.0)),
                Target::new("beta", Point::new(-1.0, -1.0)),
            ],
        }
    }

    #[test]
    fn flightpath_marks_the_reading_step() {
        let lines = flightpath_lines(Point::new(0.0, 0.0), &sample_flight());
        let lines: Vec<_> = lines.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "1,0,0,0,1,0,null");
        assert_eq!(lines[1], "2,1,0,90,1,1,alpha");
    }

    #[test]
    fn feature_collection_distinguishes_visited_targets() {
        let collection = tour_feature_collection(&sample_scenario(), &sample_flight());
        let features = collection["features"].as_array().unwrap();
        // Path plus one marker per target.
        assert_eq!(features.len(), 3);
        assert_eq!(features[0]["geometry"]["type"], "LineString");
        assert_eq!(
            features[0]["geometry"]["coordinates"].as_array().unwrap().len(),
            3
        );
        assert_eq!(features[1]["properties"]["visited"], true);
        assert_eq!(features[1]["properties"]["marker-color"], "#00ff00");
        assert_eq!(features[2]["properties"]["visited"], false);
        assert_eq!(features[2]["properties"]["marker-color"], "#aaaaaa");
    }
}
