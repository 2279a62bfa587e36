pub mod engine;
pub mod ownership;
pub mod types;

pub use engine::{compute_all, compute_standings, PLAYOFF_CUTLINE, PLAYOFF_FIELD};
pub use ownership::{OwnershipPeriod, OwnershipTable};
pub use types::{AllStandings, Category, StandingsRow};
