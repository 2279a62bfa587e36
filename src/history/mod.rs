pub mod export;
pub mod storage;

pub use export::{export_season_csv, export_standings_csv, season_csv_path, CsvHeader, SeasonRow};
pub use storage::{load_history, race_file_name, races_dir, save_race, season_dir};

use crate::error::LeagueError;
use crate::scoring::RaceResult;

/// Every scored race of one season, ordered by race number.
///
/// Append-only: races can be added at the end but never edited or removed.
/// A corrected race is handled by rewriting its file and reloading the whole
/// history from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonHistory {
    pub season: u32,
    races: Vec<RaceResult>,
}

impl SeasonHistory {
    pub fn new(season: u32) -> Self {
        Self {
            season,
            races: Vec::new(),
        }
    }

    /// Build a history from races in any order. Duplicate race numbers are rejected.
    pub fn from_races(season: u32, mut races: Vec<RaceResult>) -> Result<Self, LeagueError> {
        races.sort_by_key(|r| r.race_num);
        if let Some(pair) = races.windows(2).find(|w| w[0].race_num == w[1].race_num) {
            return Err(LeagueError::validation(
                pair[1].race_num,
                format!("race number recorded twice in season {}", season),
            ));
        }
        Ok(Self { season, races })
    }

    /// Add a newly scored race. Its number must follow every race already recorded.
    pub fn append(&mut self, race: RaceResult) -> Result<(), LeagueError> {
        if let Some(last) = self.races.last() {
            if race.race_num <= last.race_num {
                return Err(LeagueError::validation(
                    race.race_num,
                    format!("race numbers must increase (last recorded: {})", last.race_num),
                ));
            }
        }
        self.races.push(race);
        Ok(())
    }

    pub fn races(&self) -> &[RaceResult] {
        &self.races
    }

    pub fn len(&self) -> usize {
        self.races.len()
    }

    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }

    pub fn next_race_num(&self) -> u32 {
        self.races.last().map_or(1, |r| r.race_num + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn race(num: u32) -> RaceResult {
        RaceResult {
            race_num: num,
            track_id: "talladega".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, num).unwrap(),
            results: vec![],
            team_results: vec![],
        }
    }

    #[test]
    fn test_new_history_empty() {
        let history = SeasonHistory::new(2);
        assert!(history.is_empty());
        assert_eq!(history.next_race_num(), 1);
    }

    #[test]
    fn test_from_races_orders_by_number() {
        let history = SeasonHistory::from_races(2, vec![race(3), race(1), race(2)]).unwrap();
        let nums: Vec<u32> = history.races().iter().map(|r| r.race_num).collect();
        assert_eq!(nums, vec![1, 2, 3]);
        assert_eq!(history.next_race_num(), 4);
    }

    #[test]
    fn test_from_races_rejects_duplicates() {
        let err = SeasonHistory::from_races(2, vec![race(1), race(2), race(2)]).unwrap_err();
        assert!(matches!(err, LeagueError::Validation { race: 2, .. }));
    }

    #[test]
    fn test_append_requires_increasing_numbers() {
        let mut history = SeasonHistory::new(2);
        history.append(race(1)).unwrap();
        history.append(race(2)).unwrap();
        assert!(history.append(race(2)).is_err());
        assert_eq!(history.len(), 2);
    }
}
