pub mod config;
pub mod engine;
pub mod team;
pub mod types;
pub mod validation;

pub use config::*;
pub use engine::score_race;
pub use types::{
    Entrant, PointBreakdown, RaceEntry, RaceResult, RelativeFinish, ScoredEntrant, TeamResult,
};
pub use validation::{validate_entry, validate_points_table, MAX_TURNS_LED};
