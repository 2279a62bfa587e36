use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::config::LeagueConfig;
use crate::error::LeagueError;
use crate::scoring::{Entrant, RaceEntry};

/// A finished race as written down at the table.
///
/// Example YAML:
/// ```yaml
/// track: bristol
/// date: 2025-05-01
/// results:
///   - { car: 3, finish: 1, start: 2, turns_led: 4 }
///   - { car: 24, finish: 2, start: 1 }
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RaceSheet {
    pub track: String,

    /// Race day (default: today)
    #[serde(default)]
    pub date: Option<NaiveDate>,

    pub results: Vec<SheetResult>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SheetResult {
    pub car: u32,
    pub finish: u32,
    pub start: u32,
    #[serde(default)]
    pub turns_led: i32,
}

impl RaceSheet {
    /// Resolve car numbers through the roster into a race ready to score.
    pub fn into_entry(
        self,
        config: &LeagueConfig,
        race_num: u32,
        today: NaiveDate,
    ) -> Result<RaceEntry, LeagueError> {
        if !config.tracks.is_empty() && !config.tracks.contains_key(&self.track) {
            return Err(LeagueError::validation(
                race_num,
                format!("unknown track '{}'", self.track),
            ));
        }

        let entrants = self
            .results
            .into_iter()
            .map(|r| {
                let driver = config.driver_by_car(r.car).ok_or_else(|| {
                    LeagueError::validation(race_num, format!("car {} is not on the roster", r.car))
                })?;
                Ok(Entrant {
                    car_number: r.car,
                    driver: driver.name.clone(),
                    team: driver.team.clone(),
                    finish: r.finish,
                    start: r.start,
                    turns_led: r.turns_led,
                })
            })
            .collect::<Result<Vec<_>, LeagueError>>()?;

        Ok(RaceEntry {
            race_num,
            track_id: self.track,
            date: self.date.unwrap_or(today),
            entrants,
        })
    }
}

/// Read a race sheet from a YAML file
pub fn load_sheet(path: &Path) -> Result<RaceSheet> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read race sheet at {}", path.display()))?;
    serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse race sheet: invalid YAML in {}", path.display()))
}
