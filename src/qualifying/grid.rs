use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::Qualifier;
use crate::config::DriverConfig;

/// Fewest and most teams a race can have.
pub const MIN_TEAMS: usize = 2;
pub const MAX_TEAMS: usize = 7;

/// Cars each team fields, by number of teams in the race.
pub fn cars_per_team(teams: usize) -> usize {
    match teams {
        0..=2 => 6,
        3 => 5,
        4 => 4,
        _ => 3,
    }
}

/// One starting position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSlot {
    pub start: u32,
    pub car_number: u32,
    pub driver: String,
    pub team: String,
}

/// Build the starting grid for the given teams, listed in pole order.
///
/// Each team's cars come from its qualifiers first (in qualifying order),
/// then from the rest of its roster in random order. Teams alternate row by
/// row: every team's first car, then every team's second car, and so on. A
/// team with fewer roster cars than slots just fields fewer cars.
pub fn starting_grid<R: Rng + ?Sized>(
    teams: &[&str],
    roster: &[DriverConfig],
    qualifiers: &[Qualifier],
    rng: &mut R,
) -> Vec<GridSlot> {
    let cars = cars_per_team(teams.len());

    let lineups: Vec<Vec<&DriverConfig>> = teams
        .iter()
        .map(|&team| {
            let mut picked: Vec<&DriverConfig> = Vec::with_capacity(cars);

            let mut team_qualifiers: Vec<&Qualifier> =
                qualifiers.iter().filter(|q| q.team == team).collect();
            team_qualifiers.sort_by_key(|q| q.team_position);
            for qualifier in team_qualifiers {
                // Only drivers still on the team's roster can start
                if let Some(driver) = roster
                    .iter()
                    .find(|d| d.team == team && d.name == qualifier.driver)
                {
                    if picked.len() < cars {
                        picked.push(driver);
                    }
                }
            }

            let mut rest: Vec<&DriverConfig> = roster
                .iter()
                .filter(|d| d.team == team && !picked.iter().any(|p| p.car == d.car))
                .collect();
            rest.shuffle(&mut *rng);
            let open = cars.saturating_sub(picked.len());
            picked.extend(rest.into_iter().take(open));
            picked
        })
        .collect();

    let mut grid = Vec::new();
    for rank in 0..cars {
        for (team, lineup) in teams.iter().zip(&lineups) {
            if let Some(driver) = lineup.get(rank) {
                grid.push(GridSlot {
                    start: grid.len() as u32 + 1,
                    car_number: driver.car,
                    driver: driver.name.clone(),
                    team: team.to_string(),
                });
            }
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn roster(teams: &[&str], per_team: u32) -> Vec<DriverConfig> {
        teams
            .iter()
            .enumerate()
            .flat_map(|(t, team)| {
                (1..=per_team).map(move |i| DriverConfig {
                    car: (t as u32 + 1) * 10 + i,
                    name: format!("{}{}", team, i),
                    team: team.to_string(),
                })
            })
            .collect()
    }

    fn qualifier(driver: &str, team: &str, team_position: u32) -> Qualifier {
        Qualifier {
            car_number: 0,
            driver: driver.to_string(),
            team: team.to_string(),
            team_position,
        }
    }

    #[test]
    fn test_cars_per_team() {
        assert_eq!(cars_per_team(2), 6);
        assert_eq!(cars_per_team(3), 5);
        assert_eq!(cars_per_team(4), 4);
        assert_eq!(cars_per_team(5), 3);
        assert_eq!(cars_per_team(7), 3);
    }

    #[test]
    fn test_grid_size_and_positions() {
        let teams = ["Red", "Blue", "Gold"];
        let roster = roster(&teams, 8);
        let grid = starting_grid(&teams, &roster, &[], &mut StdRng::seed_from_u64(5));

        assert_eq!(grid.len(), 15);
        let starts: Vec<u32> = grid.iter().map(|s| s.start).collect();
        assert_eq!(starts, (1..=15).collect::<Vec<_>>());
        let cars: HashSet<u32> = grid.iter().map(|s| s.car_number).collect();
        assert_eq!(cars.len(), 15);
    }

    #[test]
    fn test_teams_interleave_in_pole_order() {
        let teams = ["Blue", "Red"];
        let roster = roster(&teams, 6);
        let grid = starting_grid(&teams, &roster, &[], &mut StdRng::seed_from_u64(9));

        let order: Vec<&str> = grid.iter().map(|s| s.team.as_str()).collect();
        assert_eq!(&order[..4], &["Blue", "Red", "Blue", "Red"]);
    }

    #[test]
    fn test_qualifiers_start_first_in_order() {
        let teams = ["Red", "Blue"];
        let roster = roster(&teams, 6);
        let qualifiers = vec![
            qualifier("Red4", "Red", 2),
            qualifier("Red2", "Red", 1),
            qualifier("Blue6", "Blue", 1),
        ];
        let grid = starting_grid(&teams, &roster, &qualifiers, &mut StdRng::seed_from_u64(11));

        assert_eq!(grid[0].driver, "Red2");
        assert_eq!(grid[1].driver, "Blue6");
        assert_eq!(grid[2].driver, "Red4");
    }

    #[test]
    fn test_departed_qualifier_skipped() {
        let teams = ["Red", "Blue"];
        let roster = roster(&teams, 6);
        let qualifiers = vec![qualifier("Gone", "Red", 1), qualifier("Red3", "Red", 2)];
        let grid = starting_grid(&teams, &roster, &qualifiers, &mut StdRng::seed_from_u64(2));

        assert_eq!(grid[0].driver, "Red3");
        assert!(grid.iter().all(|s| s.driver != "Gone"));
    }

    #[test]
    fn test_short_roster_fields_fewer_cars() {
        let teams = ["Red", "Blue"];
        let mut roster = roster(&teams, 6);
        roster.retain(|d| d.team == "Blue" || d.car <= 12);
        let grid = starting_grid(&teams, &roster, &[], &mut StdRng::seed_from_u64(4));

        assert_eq!(grid.len(), 8);
        assert_eq!(grid.iter().filter(|s| s.team == "Red").count(), 2);
        assert_eq!(grid.last().map(|s| s.team.as_str()), Some("Blue"));
    }
}
