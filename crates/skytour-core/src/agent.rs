//! Agent state and the single-move planner primitives.
//!
//! One `Agent` type covers both the real flight and the disposable
//! trial copies ("shadows") used to evaluate maneuvers: the two differ
//! only in their [`CommitPolicy`]. Shadows are always independent
//! value copies, so nothing a trial does can leak into the real
//! flight until its moves are explicitly replayed.

use crate::geometry::{self, Point, Segment};
use crate::map::{SurveyMap, ZoneRef};
use crate::rules::FlightRules;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether committed moves have real side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPolicy {
    /// The real flight: keeps the full (heading, position) track.
    Live,
    /// A throwaway trial: records headings only, for replay.
    Trial,
}

/// One committed move of the real flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub heading_deg: i32,
    /// Position after the move.
    pub position: Point,
}

/// Violated precondition of a move commit. For the real flight any of
/// these escalates to a crash; for a trial they signal the caller to
/// abandon the maneuver under evaluation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("heading {0}° is not a multiple of the angular granularity")]
    OffGrid(i32),
    #[error("move budget exhausted after {0} steps")]
    OutOfMoves(u32),
    #[error("move at {0}° is blocked by an obstacle")]
    Blocked(i32),
}

/// A simulated flying unit: position, step counter, move log, current
/// destination with its action range, and the obstacle that last
/// blocked a straight advance.
#[derive(Debug, Clone)]
pub struct Agent<'a> {
    map: &'a SurveyMap,
    rules: &'a FlightRules,
    policy: CommitPolicy,
    position: Point,
    destination: Point,
    action_range: f64,
    steps_made: u32,
    headings: Vec<i32>,
    track: Vec<MoveRecord>,
    blocked_by: Option<ZoneRef>,
}

impl<'a> Agent<'a> {
    pub fn new(map: &'a SurveyMap, rules: &'a FlightRules, policy: CommitPolicy, start: Point) -> Self {
        Self {
            map,
            rules,
            policy,
            position: start,
            destination: start,
            action_range: rules.read_range,
            steps_made: 0,
            headings: Vec::new(),
            track: Vec::new(),
            blocked_by: None,
        }
    }

    /// Spawn an independent trial copy at this agent's position, with
    /// the same destination and action range but fresh counters and an
    /// empty move log.
    pub fn shadow(&self) -> Agent<'a> {
        self.shadow_at(self.position)
    }

    /// Like [`Agent::shadow`], but placed at an arbitrary position.
    pub fn shadow_at(&self, position: Point) -> Agent<'a> {
        let mut trial = Agent::new(self.map, self.rules, CommitPolicy::Trial, position);
        trial.destination = self.destination;
        trial.action_range = self.action_range;
        trial
    }

    pub fn set_destination(&mut self, destination: Point, action_range: f64) {
        self.destination = destination;
        self.action_range = action_range;
    }

    pub fn map(&self) -> &'a SurveyMap {
        self.map
    }

    pub fn rules(&self) -> &'a FlightRules {
        self.rules
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn destination(&self) -> Point {
        self.destination
    }

    pub fn action_range(&self) -> f64 {
        self.action_range
    }

    pub fn steps_made(&self) -> u32 {
        self.steps_made
    }

    pub fn headings(&self) -> &[i32] {
        &self.headings
    }

    /// Consume a trial agent, keeping only its heading sequence.
    pub fn into_headings(self) -> Vec<i32> {
        self.headings
    }

    pub fn track(&self) -> &[MoveRecord] {
        &self.track
    }

    /// The obstacle that rejected the most recent `can_move` query.
    pub fn blocked_by(&self) -> Option<ZoneRef> {
        self.blocked_by
    }

    pub fn distance_to_destination(&self) -> f64 {
        geometry::distance(self.position, self.destination)
    }

    /// Whether the destination lies within the current action range.
    pub fn is_at_destination(&self) -> bool {
        self.distance_to_destination() <= self.action_range
    }

    /// Heading of the straight line to the destination, rounded to the
    /// nearest legal heading (half-up).
    pub fn heading_to_destination(&self) -> i32 {
        let exact = Segment::new(self.position, self.destination).heading_deg();
        self.rules.snap_heading(exact)
    }

    /// Whether one move at the given heading is legal: the move segment
    /// must touch neither the confinement boundary nor any no-fly
    /// zone. On rejection the blocking obstacle is remembered for the
    /// avoidance strategy.
    pub fn can_move(&mut self, heading_deg: i32) -> bool {
        let next = geometry::translate(self.position, heading_deg as f64, self.rules.move_distance);
        let seg = Segment::new(self.position, next);
        match self.map.first_blocking(&seg) {
            Some(zone) => {
                self.blocked_by = Some(zone);
                false
            }
            None => true,
        }
    }

    /// Commit one move. Preconditions: the heading is on the angular
    /// grid, the step budget is not exhausted, and the move is legal.
    pub fn commit_move(&mut self, heading_deg: i32) -> Result<(), MoveError> {
        let heading = heading_deg.rem_euclid(360);
        if heading % self.rules.angle_granularity_deg as i32 != 0 {
            return Err(MoveError::OffGrid(heading_deg));
        }
        if self.steps_made >= self.rules.max_moves_per_flight {
            return Err(MoveError::OutOfMoves(self.steps_made));
        }
        if !self.can_move(heading) {
            return Err(MoveError::Blocked(heading));
        }

        self.position = geometry::translate(self.position, heading as f64, self.rules.move_distance);
        self.headings.push(heading);
        if self.policy == CommitPolicy::Live {
            self.track.push(MoveRecord {
                heading_deg: heading,
                position: self.position,
            });
        }
        self.steps_made += 1;
        Ok(())
    }

    /// The parking maneuver: reach the action range in one or two
    /// moves when the destination is closer than one move length, so a
    /// straight move would overshoot. Also used as a waiting move when
    /// the agent is already in range but must spend a step.
    ///
    /// Tries every legal heading as an intermediate hop. If the hop
    /// itself lands in range, it is committed alone. Otherwise the
    /// first hop from which a follow-up move straight at the
    /// destination is legal and lands in range is remembered, and that
    /// two-move sequence is committed once all headings are exhausted.
    ///
    /// Returns `Ok(false)` if neither a one- nor a two-move solution
    /// exists. Never commits more than two moves.
    pub fn park(&mut self) -> Result<bool, MoveError> {
        let g = self.rules.angle_granularity_deg as i32;
        let mut chosen: Option<(i32, i32)> = None;

        for i in 0..self.rules.heading_count() as i32 {
            let hop = i * g;
            if !self.can_move(hop) {
                continue;
            }

            let hop_pos = geometry::translate(self.position, hop as f64, self.rules.move_distance);
            let mut probe = self.shadow_at(hop_pos);

            if probe.is_at_destination() {
                self.commit_move(hop)?;
                tracing::debug!(heading = hop, "parked in one move");
                return Ok(true);
            }

            if chosen.is_none() {
                let follow = probe.heading_to_destination();
                let landing =
                    geometry::translate(hop_pos, follow as f64, self.rules.move_distance);
                if geometry::distance(landing, self.destination) <= self.action_range
                    && probe.can_move(follow)
                {
                    chosen = Some((hop, follow));
                }
            }
        }

        match chosen {
            Some((hop, follow)) => {
                self.commit_move(hop)?;
                self.commit_move(follow)?;
                tracing::debug!(hop, follow, "parked in two moves");
                Ok(true)
            }
            None => {
                tracing::debug!("parking attempt failed");
                Ok(false)
            }
        }
    }
}
