//! End-to-end flight scenarios: plan a tour, fly it, check the record.

use chrono::NaiveDate;
use skytour_core::{
    run_scenario, FlightPhase, FlightRules, FlightStatus, Point, Scenario, Target, ZoneSpec,
};

fn p(lon: f64, lat: f64) -> Point {
    Point::new(lon, lat)
}

fn rect(min: Point, max: Point) -> Vec<Point> {
    vec![
        p(min.lon, min.lat),
        p(max.lon, min.lat),
        p(max.lon, max.lat),
        p(min.lon, max.lat),
        p(min.lon, min.lat),
    ]
}

fn coarse_rules() -> FlightRules {
    FlightRules {
        move_distance: 0.1,
        read_range: 0.05,
        landing_range: 0.1,
        ..FlightRules::default()
    }
}

fn scenario(no_fly_zones: Vec<ZoneSpec>, start: Point, targets: Vec<Target>) -> Scenario {
    Scenario {
        date: NaiveDate::from_ymd_opt(2021, 3, 14).unwrap(),
        start,
        boundary: rect(p(0.0, 0.0), p(10.0, 10.0)),
        no_fly_zones,
        targets,
    }
}

#[test]
fn diagonal_flight_across_an_empty_map_lands() {
    let mission = scenario(
        Vec::new(),
        p(1.0, 1.0),
        vec![Target::new("far-corner", p(9.0, 9.0))],
    );
    let rules = coarse_rules();

    let report = run_scenario(&mission, &rules).unwrap();

    let FlightStatus::Landed { steps } = report.flight.status else {
        panic!("expected a landing, got {:?}", report.flight.status);
    };

    // Out and back along the diagonal, give or take heading rounding
    // and the final parking moves on each leg.
    let diagonal_moves = (8.0_f64 * std::f64::consts::SQRT_2 / rules.move_distance).ceil() as u32;
    assert!(steps >= 2 * diagonal_moves - 6, "suspiciously few steps: {steps}");
    assert!(steps <= 2 * diagonal_moves + 12, "suspiciously many steps: {steps}");

    assert_eq!(report.visit_order, vec![0]);
    assert_eq!(report.flight.readings.len(), 1);
    assert_eq!(report.flight.moves.len() as u32, steps);
}

#[test]
fn boxed_in_target_crashes_instead_of_looping() {
    // The target sits inside a closed no-fly ring, so both rotation
    // directions run out of their avoidance move cap.
    let walls = vec![ZoneSpec {
        name: "box".to_string(),
        ring: rect(p(7.0, 4.0), p(9.0, 6.0)),
    }];
    let mission = scenario(
        walls,
        p(2.0, 5.0),
        vec![Target::new("walled-in", p(8.0, 5.0))],
    );
    let rules = coarse_rules();

    let report = run_scenario(&mission, &rules).unwrap();

    let FlightStatus::Crashed { steps, phase, obstacle } = &report.flight.status else {
        panic!("expected a crash, got {:?}", report.flight.status);
    };
    assert_eq!(*phase, FlightPhase::Avoiding);
    assert_eq!(obstacle.as_deref(), Some("box"));
    assert!(*steps <= rules.max_moves_per_flight);
    // The partial log survives the crash.
    assert_eq!(report.flight.moves.len() as u32, *steps);
    assert!(report.flight.readings.is_empty());
}

#[test]
fn pillar_on_the_path_is_rounded_and_the_flight_lands() {
    let pillar = vec![ZoneSpec {
        name: "pillar".to_string(),
        ring: rect(p(4.8, 4.4), p(5.2, 5.6)),
    }];
    let mission = scenario(
        pillar,
        p(2.0, 5.0),
        vec![Target::new("behind-pillar", p(8.0, 5.0))],
    );
    let rules = coarse_rules();

    let report = run_scenario(&mission, &rules).unwrap();

    assert!(
        matches!(report.flight.status, FlightStatus::Landed { .. }),
        "expected a landing, got {:?}",
        report.flight.status
    );
    assert_eq!(report.flight.readings.len(), 1);
    assert_eq!(report.flight.readings[0].target, "behind-pillar");

    // The detour costs more than the straight line would have.
    let straight_moves = (6.0 / rules.move_distance) as u32;
    let FlightStatus::Landed { steps } = report.flight.status else {
        unreachable!()
    };
    assert!(steps > 2 * straight_moves - 10);
}

#[test]
fn colinear_targets_keep_their_order() {
    // Dyadic move length keeps the simulated costs exact, so the
    // cost-neutral full reversal is not committed.
    let rules = FlightRules {
        move_distance: 0.25,
        read_range: 0.1,
        landing_range: 0.25,
        ..FlightRules::default()
    };
    let mission = scenario(
        Vec::new(),
        p(1.0, 5.0),
        vec![
            Target::new("near", p(3.0, 5.0)),
            Target::new("middle", p(5.0, 5.0)),
            Target::new("far", p(7.0, 5.0)),
        ],
    );

    let report = run_scenario(&mission, &rules).unwrap();

    assert_eq!(report.visit_order, vec![0, 1, 2]);
    assert!(matches!(report.flight.status, FlightStatus::Landed { .. }));
    let names: Vec<_> = report
        .flight
        .readings
        .iter()
        .map(|r| r.target.as_str())
        .collect();
    assert_eq!(names, vec!["near", "middle", "far"]);
}

#[test]
fn exhausted_move_budget_crashes_with_the_log_intact() {
    let rules = FlightRules {
        max_moves_per_flight: 10,
        ..coarse_rules()
    };
    let mission = scenario(
        Vec::new(),
        p(1.0, 5.0),
        vec![Target::new("too-far", p(9.0, 5.0))],
    );

    let report = run_scenario(&mission, &rules).unwrap();

    let FlightStatus::Crashed { steps, phase, obstacle } = &report.flight.status else {
        panic!("expected a crash, got {:?}", report.flight.status);
    };
    assert_eq!(*steps, 10);
    assert_eq!(*phase, FlightPhase::Flying);
    assert!(obstacle.is_none());
    assert_eq!(report.flight.moves.len(), 10);
}

#[test]
fn scattered_targets_are_all_read_once_and_the_flight_lands() {
    let mission = scenario(
        Vec::new(),
        p(1.0, 1.0),
        vec![
            Target::new("north", p(2.0, 8.0)),
            Target::new("east", p(8.0, 2.0)),
            Target::new("center", p(5.0, 5.0)),
        ],
    );
    let rules = FlightRules {
        max_moves_per_flight: 1000,
        ..coarse_rules()
    };

    let report = run_scenario(&mission, &rules).unwrap();

    assert!(matches!(report.flight.status, FlightStatus::Landed { .. }));
    // The order is a permutation of all targets, each read exactly once.
    let mut order = report.visit_order.clone();
    order.sort_unstable();
    assert_eq!(order, vec![0, 1, 2]);
    assert_eq!(report.flight.readings.len(), 3);

    // Readings happen in visiting order, at increasing step counts.
    let steps: Vec<_> = report.flight.readings.iter().map(|r| r.step).collect();
    assert!(steps.windows(2).all(|w| w[0] < w[1]));
}
