pub mod agent;
pub mod avoidance;
pub mod flight;
pub mod geometry;
pub mod map;
pub mod models;
pub mod rules;
pub mod tour;

pub use agent::{Agent, CommitPolicy, MoveError, MoveRecord};
pub use avoidance::{detour_cost, plan_detour, Rotation};
pub use flight::{fly_mission, run_scenario, FlightPhase, FlightRecord, FlightStatus, MissionReport};
pub use geometry::{
    distance, orientation, segment_intersects_ring, segments_intersect, translate, Orientation,
    Point, Segment,
};
pub use map::{MapError, Ring, SurveyMap, Zone, ZoneRef};
pub use models::{Reading, Scenario, Target, ZoneSpec};
pub use rules::FlightRules;
pub use tour::TourPlanner;
