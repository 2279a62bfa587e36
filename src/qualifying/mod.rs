pub mod grid;

pub use grid::{cars_per_team, starting_grid, GridSlot, MAX_TEAMS, MIN_TEAMS};

use std::collections::BTreeMap;

use rand::Rng;
use tracing::debug;

use crate::history::SeasonHistory;

/// Qualifiers kept per team.
pub const MAX_QUALIFIERS: usize = 4;

/// Smallest and largest selection weight a driver can get.
const MIN_WEIGHT: f64 = 1e-6;
const MAX_WEIGHT: f64 = 1.0;

/// A driver who earned a qualifying slot for their team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualifier {
    pub car_number: u32,
    pub driver: String,
    pub team: String,
    /// 1 = first pick of the team
    pub team_position: u32,
}

#[derive(Debug)]
struct Record {
    car_number: u32,
    team: String,
    points: u32,
}

/// Draw the qualifying order of every team from past qualifying results.
///
/// Each driver is weighted by their share of the team's season qualifying
/// points (pole bonus included) and drawn with key `u^(1/weight)`, so strong
/// qualifiers tend to go first without being guaranteed to. A driver's team
/// and car are taken from their latest race.
pub fn qualifying_sequence<R: Rng + ?Sized>(history: &SeasonHistory, rng: &mut R) -> Vec<Qualifier> {
    let mut records: BTreeMap<&str, Record> = BTreeMap::new();
    for race in history.races() {
        for scored in &race.results {
            let record = records
                .entry(scored.entrant.driver.as_str())
                .or_insert_with(|| Record {
                    car_number: 0,
                    team: String::new(),
                    points: 0,
                });
            record.car_number = scored.entrant.car_number;
            record.team.clone_from(&scored.entrant.team);
            record.points += scored.points.qualifying_total();
        }
    }

    let mut teams: BTreeMap<&str, Vec<(&str, &Record)>> = BTreeMap::new();
    for (driver, record) in &records {
        teams.entry(record.team.as_str()).or_default().push((*driver, record));
    }

    let mut sequence = Vec::new();
    for (team, drivers) in teams {
        let team_total: u32 = drivers.iter().map(|(_, r)| r.points).sum();
        let team_size = drivers.len() as f64;
        let mut drawn: Vec<(f64, &str, &Record)> = drivers
            .into_iter()
            .map(|(driver, record)| {
                let share = if team_total == 0 {
                    1.0 / team_size
                } else {
                    f64::from(record.points) / f64::from(team_total)
                };
                let weight = share.clamp(MIN_WEIGHT, MAX_WEIGHT);
                let u: f64 = rng.random();
                (u.powf(1.0 / weight), driver, record)
            })
            .collect();
        drawn.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));

        for (idx, (key, driver, record)) in drawn.into_iter().take(MAX_QUALIFIERS).enumerate() {
            debug!(team, driver, key, "qualified");
            sequence.push(Qualifier {
                car_number: record.car_number,
                driver: driver.to_string(),
                team: team.to_string(),
                team_position: idx as u32 + 1,
            });
        }
    }
    sequence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Entrant, PointBreakdown, RaceResult, ScoredEntrant};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// One race per lineup; each lineup lists (driver, team, qualifying points).
    fn history(lineups: &[&[(&str, &str, u32)]]) -> SeasonHistory {
        let races = lineups
            .iter()
            .enumerate()
            .map(|(i, lineup)| {
                let results = lineup
                    .iter()
                    .enumerate()
                    .map(|(pos, &(driver, team, qualifying))| ScoredEntrant {
                        entrant: Entrant {
                            car_number: driver.bytes().map(u32::from).sum(),
                            driver: driver.to_string(),
                            team: team.to_string(),
                            finish: pos as u32 + 1,
                            start: pos as u32 + 1,
                            turns_led: 0,
                        },
                        relative_finish: 1,
                        points: PointBreakdown {
                            qualifying,
                            ..PointBreakdown::default()
                        },
                    })
                    .collect();
                RaceResult {
                    race_num: i as u32 + 1,
                    track_id: "dover".to_string(),
                    date: NaiveDate::from_ymd_opt(2025, 4, i as u32 + 1).unwrap(),
                    results,
                    team_results: vec![],
                }
            })
            .collect();
        SeasonHistory::from_races(1, races).unwrap()
    }

    #[test]
    fn test_empty_history_has_no_qualifiers() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(qualifying_sequence(&SeasonHistory::new(1), &mut rng).is_empty());
    }

    #[test]
    fn test_at_most_four_per_team() {
        let names: Vec<String> = (1..=6).map(|i| format!("R{}", i)).collect();
        let lineup: Vec<(&str, &str, u32)> = names.iter().map(|d| (d.as_str(), "Red", 5)).collect();
        let history = history(&[lineup.as_slice()]);

        let mut rng = StdRng::seed_from_u64(1);
        let sequence = qualifying_sequence(&history, &mut rng);
        assert_eq!(sequence.len(), MAX_QUALIFIERS);
        let positions: Vec<u32> = sequence.iter().map(|q| q.team_position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_pointless_driver_drawn_last() {
        let history = history(&[
            &[("A", "Red", 14), ("B", "Red", 0)],
            &[("A", "Red", 8), ("B", "Red", 0)],
        ]);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let sequence = qualifying_sequence(&history, &mut rng);
            assert_eq!(sequence[0].driver, "A", "seed {}", seed);
            assert_eq!(sequence[1].driver, "B", "seed {}", seed);
        }
    }

    #[test]
    fn test_zero_point_team_still_qualifies() {
        let history = history(&[&[("A", "Red", 14), ("X", "Blue", 0), ("Y", "Blue", 0)]]);
        let mut rng = StdRng::seed_from_u64(3);
        let sequence = qualifying_sequence(&history, &mut rng);
        let blue: Vec<&Qualifier> = sequence.iter().filter(|q| q.team == "Blue").collect();
        assert_eq!(blue.len(), 2);
        assert_eq!(blue[0].team_position, 1);
        assert_eq!(blue[1].team_position, 2);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let history = history(&[&[("A", "Red", 6), ("B", "Red", 14), ("C", "Blue", 8)]]);
        let first = qualifying_sequence(&history, &mut StdRng::seed_from_u64(42));
        let second = qualifying_sequence(&history, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn test_latest_team_and_car_used() {
        let history = history(&[&[("A", "Red", 14)], &[("A", "Blue", 14)]]);
        let sequence = qualifying_sequence(&history, &mut StdRng::seed_from_u64(0));
        assert_eq!(sequence.len(), 1);
        assert_eq!(sequence[0].team, "Blue");
    }
}
