//! Obstacle avoidance by comparing two opposite rotation strategies.
//!
//! When a straight advance is blocked, two trial agents are spawned
//! from the real agent's state. Each hugs the blocking obstacle in its
//! assigned rotation direction, deviating from the ideal heading by
//! the smallest angle that still yields a legal move. The cheaper of
//! the two resulting move sequences is replayed on the real agent.

use crate::agent::Agent;
use crate::geometry::{self, Segment};
use crate::map::ZoneRef;

/// Rotation bias of one avoidance trial. The two directions are
/// evaluated independently; neither observes the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Deviate by decreasing headings (turning right).
    Clockwise,
    /// Deviate by increasing headings (turning left).
    CounterClockwise,
}

/// Drive a trial agent around `obstacle` in the given rotation
/// direction until the obstacle no longer blocks the straight path to
/// the destination, and estimate the total cost of this strategy.
///
/// The estimate is the number of moves spent plus the remaining
/// straight-line distance in move units, overweighted by the
/// configured factor: further obstacles may still lie ahead and the
/// angular grid is coarse, so remaining distance is deliberately
/// priced above its optimum.
///
/// Returns `f64::INFINITY` if no legal deviation up to 180° exists at
/// some step, or if the move cap for a single avoidance attempt is
/// exceeded. The trial agent keeps its committed heading sequence for
/// replay by the caller.
pub fn detour_cost(shadow: &mut Agent, obstacle: ZoneRef, rotation: Rotation) -> f64 {
    let rules = shadow.rules();
    let g = rules.angle_granularity_deg as i32;
    let mut moves_made = 0u32;

    while !clears_obstacle(shadow, obstacle) {
        let base = shadow.heading_to_destination();
        let mut made_move = false;

        for i in 0..=(180 / g) {
            let offset = i * g;
            let candidate = match rotation {
                Rotation::Clockwise => (base - offset).rem_euclid(360),
                Rotation::CounterClockwise => (base + offset).rem_euclid(360),
            };

            // Undoing the previous move would oscillate forever.
            if let Some(&prev) = shadow.headings().last() {
                if candidate == (prev + 180).rem_euclid(360) {
                    continue;
                }
            }

            if shadow.can_move(candidate) {
                if shadow.commit_move(candidate).is_err() {
                    return f64::INFINITY;
                }
                moves_made += 1;
                made_move = true;
                break;
            }
        }

        if !made_move || moves_made > rules.max_avoidance_moves {
            tracing::debug!(?rotation, moves_made, "rotation direction is infeasible");
            return f64::INFINITY;
        }
    }

    let remaining = shadow.distance_to_destination();
    moves_made as f64 + rules.remaining_distance_weight * remaining / rules.move_distance
}

/// Whether the given obstacle has stopped blocking the trial agent's
/// straight-line approach to its destination.
///
/// Simulates the whole remaining approach without committing anything,
/// checking each quantized step against this one obstacle only; other
/// obstacles are a later problem and do not concern this trial. Once
/// the simulated position is within one move length, the outcome is
/// whatever a full-legality parking probe from there would achieve.
fn clears_obstacle(shadow: &Agent, obstacle: ZoneRef) -> bool {
    let rules = shadow.rules();
    let ring = shadow.map().ring(obstacle);
    let dest = shadow.destination();
    let range = shadow.action_range();

    let mut pos = shadow.position();
    loop {
        if geometry::distance(pos, dest) <= range {
            return true;
        }
        if geometry::distance(pos, dest) <= rules.move_distance {
            let mut parker = shadow.shadow_at(pos);
            return matches!(parker.park(), Ok(true));
        }

        let exact = Segment::new(pos, dest).heading_deg();
        let heading = rules.snap_heading(exact);
        let next = geometry::translate(pos, heading as f64, rules.move_distance);
        if ring.blocks(&Segment::new(pos, next)) {
            return false;
        }
        pos = next;
    }
}

/// Evaluate both rotation directions from the real agent's current
/// state and return the cheaper committed heading sequence, or `None`
/// if the obstacle cannot be rounded in either direction.
pub fn plan_detour(agent: &Agent, obstacle: ZoneRef) -> Option<Vec<i32>> {
    let name = agent.map().zone_name(obstacle);

    let mut cw = agent.shadow();
    let cw_cost = detour_cost(&mut cw, obstacle, Rotation::Clockwise);

    let mut ccw = agent.shadow();
    let ccw_cost = detour_cost(&mut ccw, obstacle, Rotation::CounterClockwise);

    tracing::debug!(obstacle = name, cw_cost, ccw_cost, "compared rotation strategies");

    if cw_cost.is_infinite() && ccw_cost.is_infinite() {
        return None;
    }

    if cw_cost < ccw_cost {
        Some(cw.into_headings())
    } else {
        Some(ccw.into_headings())
    }
}
