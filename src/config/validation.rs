use std::collections::HashSet;

use super::schema::LeagueConfig;
use crate::qualifying::{cars_per_team, MAX_TEAMS, MIN_TEAMS};
use crate::scoring::validate_points_table;

/// Validate the league configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_league(config: &LeagueConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.season == 0 {
        errors.push("season: must be 1 or greater".to_string());
    }

    if let Err(points_errors) = validate_points_table(&config.points) {
        errors.extend(points_errors);
    }

    // Every field the grid can produce must be scorable
    let largest_field = (MIN_TEAMS..=config.teams.len().min(MAX_TEAMS))
        .map(|teams| teams * cars_per_team(teams))
        .max()
        .unwrap_or(0) as u32;
    let scorable = config.points.max_field_size();
    if largest_field > scorable {
        errors.push(format!(
            "points: tables cover {} positions but a race can have {} cars",
            scorable, largest_field
        ));
    }

    // Teams
    if config.teams.len() < MIN_TEAMS {
        errors.push(format!("teams: at least {} teams are required", MIN_TEAMS));
    }
    let mut poles = HashSet::new();
    for (name, team) in &config.teams {
        if !poles.insert(team.pole) {
            errors.push(format!("teams.{}.pole: rank {} used by another team", name, team.pole));
        }
        if team.owners.is_empty() {
            errors.push(format!("teams.{}.owners: at least one owner is required", name));
        }
    }
    for overlap in config.ownership().overlaps() {
        errors.push(format!("teams: {}", overlap));
    }

    // Drivers
    let mut cars = HashSet::new();
    let mut names = HashSet::new();
    for (i, driver) in config.drivers.iter().enumerate() {
        if !cars.insert(driver.car) {
            errors.push(format!("drivers[{}].car: number {} used twice", i, driver.car));
        }
        if !names.insert(driver.name.as_str()) {
            errors.push(format!("drivers[{}].name: '{}' used twice", i, driver.name));
        }
        if !config.teams.contains_key(&driver.team) {
            errors.push(format!(
                "drivers[{}].team: unknown team '{}'",
                i, driver.team
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
