//! Movement rules and thresholds for a survey flight.

use serde::{Deserialize, Serialize};

/// Configuration of the quantized movement model.
///
/// Every committed move has length `move_distance` and a heading that
/// is a multiple of `angle_granularity_deg`. The defaults are the
/// values the planner was tuned with; the two heuristic constants
/// (`max_avoidance_moves`, `remaining_distance_weight`) are empirical
/// and deliberately left as plain tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightRules {
    /// Length of every committed move, in map degrees
    pub move_distance: f64,
    /// Angular granularity: committed headings are multiples of this
    pub angle_granularity_deg: u32,
    /// Radius within which a target counts as reached for reading
    pub read_range: f64,
    /// Radius within which the anchor counts as reached for landing
    pub landing_range: f64,
    /// Step budget per flight; running out is a crash
    pub max_moves_per_flight: u32,
    /// Cap on moves spent by one obstacle-avoidance trial before the
    /// rotation direction is declared infeasible
    pub max_avoidance_moves: u32,
    /// Overestimate applied to the remaining straight-line distance
    /// when costing an avoidance strategy
    pub remaining_distance_weight: f64,
}

impl Default for FlightRules {
    fn default() -> Self {
        Self {
            move_distance: 0.0003,
            angle_granularity_deg: 10,
            read_range: 0.0002,
            landing_range: 0.0003,
            max_moves_per_flight: 350,
            max_avoidance_moves: 15,
            remaining_distance_weight: 1.1,
        }
    }
}

impl FlightRules {
    /// Number of distinct legal headings.
    pub fn heading_count(&self) -> u32 {
        360 / self.angle_granularity_deg
    }

    /// Round an exact heading to the nearest legal one, half-up, into
    /// `[0, 360)`.
    pub fn snap_heading(&self, exact_deg: f64) -> i32 {
        let g = self.angle_granularity_deg as f64;
        ((g * (exact_deg / g).round()) as i32).rem_euclid(360)
    }
}
