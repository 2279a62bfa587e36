use chrono::NaiveDate;
use thiserror::Error;

/// Failures raised by the scoring engine and the standings aggregator.
///
/// Every variant names the race it came from so a caller can report exactly
/// which record needs fixing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeagueError {
    /// Race input is malformed (positions, turns led, duplicate drivers).
    #[error("Race {race}: invalid entry - {reason}")]
    Validation { race: u32, reason: String },

    /// The points table has no value for a position present in the field.
    #[error("Race {race}: no {table} points defined for position {position} (driver {driver})")]
    Configuration {
        race: u32,
        driver: String,
        table: &'static str,
        position: u32,
    },

    /// A team has no owner on the date a race was run.
    #[error("Race {race} ({date}): team '{team}' has no owner on that date")]
    Consistency {
        race: u32,
        date: NaiveDate,
        team: String,
    },
}

impl LeagueError {
    pub(crate) fn validation(race: u32, reason: impl Into<String>) -> Self {
        LeagueError::Validation {
            race,
            reason: reason.into(),
        }
    }
}
