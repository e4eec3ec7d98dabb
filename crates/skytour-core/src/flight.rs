//! The real flight: a state machine over one full tour.
//!
//! All failures surface as values. A crashed flight still hands back
//! everything it logged up to the point of failure.

use crate::agent::{Agent, CommitPolicy, MoveRecord};
use crate::avoidance;
use crate::geometry::Point;
use crate::map::{MapError, SurveyMap, ZoneRef};
use crate::models::{Reading, Scenario, Target};
use crate::rules::FlightRules;
use crate::tour::TourPlanner;
use serde::{Deserialize, Serialize};

/// Phase of the flight state machine. `Landed` and `Crashed` are
/// terminal; `Crashed` reports the phase the failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightPhase {
    Flying,
    Avoiding,
    Parking,
    Reading,
    Returning,
    Landed,
    Crashed,
}

/// Terminal status of a flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FlightStatus {
    Landed {
        steps: u32,
    },
    Crashed {
        steps: u32,
        /// Phase in which the flight failed.
        phase: FlightPhase,
        /// Name of the obstacle that could not be avoided, when the
        /// failure was geometric.
        obstacle: Option<String>,
    },
}

/// Everything a flight produces: the terminal status, the full
/// chronological move log, and the readings taken along the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub status: FlightStatus,
    pub moves: Vec<MoveRecord>,
    pub readings: Vec<Reading>,
}

/// Result of planning and flying a whole scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionReport {
    /// Optimized visiting order, as indices into the scenario targets.
    pub visit_order: Vec<usize>,
    pub flight: FlightRecord,
}

/// Outcome of one leg: flying from the current position until the
/// destination is inside the action range.
#[derive(Debug)]
pub(crate) enum LegOutcome {
    Arrived { steps: u32 },
    Crashed { phase: FlightPhase, obstacle: Option<ZoneRef> },
}

/// Fly the agent to its current destination: straight advances while
/// they are legal, the parking maneuver once the destination is within
/// one move length, and the avoidance strategy when blocked.
pub(crate) fn fly_to_destination(agent: &mut Agent) -> LegOutcome {
    let steps_at_start = agent.steps_made();

    loop {
        if agent.is_at_destination() {
            return LegOutcome::Arrived {
                steps: agent.steps_made() - steps_at_start,
            };
        }

        if agent.distance_to_destination() <= agent.rules().move_distance {
            // A straight move would overshoot the action range.
            match agent.park() {
                Ok(true) => continue,
                Ok(false) | Err(_) => {
                    return LegOutcome::Crashed {
                        phase: FlightPhase::Parking,
                        obstacle: agent.blocked_by(),
                    }
                }
            }
        }

        let heading = agent.heading_to_destination();
        if agent.can_move(heading) {
            if agent.commit_move(heading).is_err() {
                return LegOutcome::Crashed {
                    phase: FlightPhase::Flying,
                    obstacle: None,
                };
            }
            continue;
        }

        // Blocked: evaluate both rotations and replay the cheaper one.
        let Some(zone) = agent.blocked_by() else {
            return LegOutcome::Crashed {
                phase: FlightPhase::Avoiding,
                obstacle: None,
            };
        };
        match avoidance::plan_detour(agent, zone) {
            Some(headings) => {
                for heading in headings {
                    if agent.commit_move(heading).is_err() {
                        return LegOutcome::Crashed {
                            phase: FlightPhase::Avoiding,
                            obstacle: Some(zone),
                        };
                    }
                }
            }
            None => {
                return LegOutcome::Crashed {
                    phase: FlightPhase::Avoiding,
                    obstacle: Some(zone),
                }
            }
        }
    }
}

/// Fly the real agent through the targets in the given visiting order
/// and back to the start.
pub fn fly_mission(
    map: &SurveyMap,
    rules: &FlightRules,
    start: Point,
    targets: &[Target],
    order: &[usize],
) -> FlightRecord {
    let mut agent = Agent::new(map, rules, CommitPolicy::Live, start);
    let mut readings = Vec::with_capacity(order.len());

    for &idx in order {
        let target = &targets[idx];
        agent.set_destination(target.position, rules.read_range);
        tracing::debug!(target = %target.name, "flying to next target");

        match fly_to_destination(&mut agent) {
            LegOutcome::Arrived { steps } => {
                if steps == 0 {
                    // Only one reading per move: already being in range
                    // costs a waiting move (or two) that must stay in
                    // range of the target.
                    match agent.park() {
                        Ok(true) => {}
                        Ok(false) | Err(_) => {
                            return crashed(map, &agent, readings, FlightPhase::Parking, None);
                        }
                    }
                }
                tracing::debug!(target = %target.name, step = agent.steps_made(), "read target");
                readings.push(Reading {
                    target: target.name.clone(),
                    step: agent.steps_made(),
                    payload: target.payload.clone(),
                });
            }
            LegOutcome::Crashed { phase, obstacle } => {
                return crashed(map, &agent, readings, phase, obstacle);
            }
        }
    }

    // All targets read: back to the start with the landing range.
    agent.set_destination(start, rules.landing_range);
    tracing::debug!("returning to start");
    match fly_to_destination(&mut agent) {
        LegOutcome::Arrived { .. } => {
            let steps = agent.steps_made();
            tracing::info!(steps, "finished the tour");
            FlightRecord {
                status: FlightStatus::Landed { steps },
                moves: agent.track().to_vec(),
                readings,
            }
        }
        LegOutcome::Crashed { phase, obstacle } => {
            let phase = if phase == FlightPhase::Flying {
                FlightPhase::Returning
            } else {
                phase
            };
            crashed(map, &agent, readings, phase, obstacle)
        }
    }
}

/// Plan the visiting order for a scenario and fly it.
pub fn run_scenario(scenario: &Scenario, rules: &FlightRules) -> Result<MissionReport, MapError> {
    let map = scenario.build_map()?;
    let mut planner = TourPlanner::new(&map, rules, &scenario.targets, scenario.start);
    let visit_order = planner.optimize();
    let flight = fly_mission(&map, rules, scenario.start, &scenario.targets, &visit_order);
    Ok(MissionReport { visit_order, flight })
}

fn crashed(
    map: &SurveyMap,
    agent: &Agent,
    readings: Vec<Reading>,
    phase: FlightPhase,
    obstacle: Option<ZoneRef>,
) -> FlightRecord {
    let obstacle = obstacle.map(|zone| map.zone_name(zone).to_string());
    tracing::warn!(
        steps = agent.steps_made(),
        ?phase,
        obstacle = obstacle.as_deref(),
        "the flight crashed"
    );
    FlightRecord {
        status: FlightStatus::Crashed {
            steps: agent.steps_made(),
            phase,
            obstacle,
        },
        moves: agent.track().to_vec(),
        readings,
    }
}
