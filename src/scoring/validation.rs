use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::config::{contiguous_len, PointsTable};
use super::types::RaceEntry;
use crate::error::LeagueError;

/// Validate the points table at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_points_table(table: &PointsTable) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let tables: [(&str, &BTreeMap<u32, u32>); 3] = [
        ("race", &table.race),
        ("playoff", &table.playoff),
        ("qualifying", &table.qualifying),
    ];

    for (name, positions) in tables {
        if positions.is_empty() {
            errors.push(format!("points.{}: must define at least position 1", name));
            continue;
        }
        let covered = contiguous_len(positions);
        if covered as usize != positions.len() {
            errors.push(format!(
                "points.{}: positions must run from 1 without gaps (missing {})",
                name,
                covered + 1
            ));
        }
    }

    // The field size is bounded by the race table; the other tables must keep up
    let field = contiguous_len(&table.race);
    for (name, positions) in &tables[1..] {
        let covered = contiguous_len(positions);
        if covered < field {
            errors.push(format!(
                "points.{}: covers {} positions but race table covers {}",
                name, covered, field
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Most turns a single entrant can be credited with in one race.
/// Keeps team and season sums far from `u32` overflow.
pub const MAX_TURNS_LED: i32 = 10_000;

/// Validate a race before any points are computed.
pub fn validate_entry(entry: &RaceEntry) -> Result<(), LeagueError> {
    let race = entry.race_num;

    if entry.entrants.is_empty() {
        return Err(LeagueError::validation(race, "race has no entrants"));
    }

    let field = entry.entrants.len() as u32;
    check_positions(race, "finishing", entry.entrants.iter().map(|e| e.finish), field)?;
    check_positions(race, "qualifying", entry.entrants.iter().map(|e| e.start), field)?;

    if let Some(e) = entry.entrants.iter().find(|e| e.turns_led < 0) {
        return Err(LeagueError::validation(
            race,
            format!("{} has negative turns led ({})", e.driver, e.turns_led),
        ));
    }

    if let Some(e) = entry.entrants.iter().find(|e| e.turns_led > MAX_TURNS_LED) {
        return Err(LeagueError::validation(
            race,
            format!(
                "{} led {} turns (at most {} per race)",
                e.driver, e.turns_led, MAX_TURNS_LED
            ),
        ));
    }

    let mut drivers = HashSet::new();
    for e in &entry.entrants {
        if !drivers.insert(e.driver.as_str()) {
            return Err(LeagueError::validation(
                race,
                format!("driver {} entered more than once", e.driver),
            ));
        }
    }

    Ok(())
}

/// Positions must be unique and form exactly 1..=field.
fn check_positions(
    race: u32,
    label: &str,
    positions: impl Iterator<Item = u32>,
    field: u32,
) -> Result<(), LeagueError> {
    let mut seen = BTreeSet::new();
    for pos in positions {
        if !seen.insert(pos) {
            return Err(LeagueError::validation(
                race,
                format!("duplicate {} position {}", label, pos),
            ));
        }
        if pos == 0 || pos > field {
            return Err(LeagueError::validation(
                race,
                format!(
                    "{} position {} outside 1..{} for a field of {}",
                    label, pos, field, field
                ),
            ));
        }
    }
    Ok(())
}
