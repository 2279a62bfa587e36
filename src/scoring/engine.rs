use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use super::config::PointsTable;
use super::team::summarize_teams;
use super::types::{Entrant, PointBreakdown, RaceEntry, RaceResult, ScoredEntrant};
use super::validation::validate_entry;
use crate::error::LeagueError;

/// Score one race.
///
/// The entry is validated in full before any points are looked up, and a
/// missing points-table position fails the whole race. Either a complete
/// `RaceResult` comes back or nothing does.
pub fn score_race(entry: &RaceEntry, points: &PointsTable) -> Result<RaceResult, LeagueError> {
    validate_entry(entry)?;

    let relative = relative_finishes(&entry.entrants);
    let leaders = turn_leaders(&team_turns_led(&entry.entrants));

    let mut ordered: Vec<&Entrant> = entry.entrants.iter().collect();
    ordered.sort_by_key(|e| e.finish);

    let mut results = Vec::with_capacity(ordered.len());
    for entrant in ordered {
        let relative_finish = relative[entrant.driver.as_str()];
        let earns_team_bonus = relative_finish == 1 && leaders.contains(entrant.team.as_str());
        let breakdown = score_entrant(entry.race_num, entrant, earns_team_bonus, points)?;
        results.push(ScoredEntrant {
            entrant: entrant.clone(),
            relative_finish,
            points: breakdown,
        });
    }

    let team_results = summarize_teams(&results, &leaders);

    debug!(
        race = entry.race_num,
        track = %entry.track_id,
        entrants = results.len(),
        leaders = ?leaders,
        "scored race"
    );

    Ok(RaceResult {
        race_num: entry.race_num,
        track_id: entry.track_id.clone(),
        date: entry.date,
        results,
        team_results,
    })
}

fn score_entrant(
    race: u32,
    entrant: &Entrant,
    earns_team_bonus: bool,
    points: &PointsTable,
) -> Result<PointBreakdown, LeagueError> {
    let missing = |table: &'static str, position: u32| LeagueError::Configuration {
        race,
        driver: entrant.driver.clone(),
        table,
        position,
    };

    let race_points = points
        .race_points(entrant.finish)
        .ok_or_else(|| missing("race", entrant.finish))?;
    let playoff = points
        .playoff_points(entrant.finish)
        .ok_or_else(|| missing("playoff", entrant.finish))?;
    let qualifying = points
        .qualifying_points(entrant.start)
        .ok_or_else(|| missing("qualifying", entrant.start))?;

    // turns_led was validated non-negative
    let turns_led = points.turns_led_points(entrant.turns_led.unsigned_abs());

    Ok(PointBreakdown {
        race: race_points,
        turns_led,
        qualifying,
        pole_bonus: if entrant.start == 1 { points.pole_bonus } else { 0 },
        team_bonus: if earns_team_bonus { points.team_bonus } else { 0 },
        playoff,
    })
}

/// Rank of each driver among teammates by finishing position.
fn relative_finishes(entrants: &[Entrant]) -> HashMap<&str, u32> {
    let mut by_team: BTreeMap<&str, Vec<&Entrant>> = BTreeMap::new();
    for e in entrants {
        by_team.entry(e.team.as_str()).or_default().push(e);
    }

    let mut ranks = HashMap::with_capacity(entrants.len());
    for teammates in by_team.values_mut() {
        teammates.sort_by_key(|e| e.finish);
        for (idx, e) in teammates.iter().enumerate() {
            ranks.insert(e.driver.as_str(), idx as u32 + 1);
        }
    }
    ranks
}

fn team_turns_led(entrants: &[Entrant]) -> BTreeMap<&str, u32> {
    let mut totals: BTreeMap<&str, u32> = BTreeMap::new();
    for e in entrants {
        *totals.entry(e.team.as_str()).or_default() += e.turns_led.unsigned_abs();
    }
    totals
}

/// Every team sharing the highest turns-led total. Empty when nobody led.
fn turn_leaders<'a>(totals: &BTreeMap<&'a str, u32>) -> BTreeSet<&'a str> {
    let max = totals.values().copied().max().unwrap_or(0);
    if max == 0 {
        return BTreeSet::new();
    }
    totals
        .iter()
        .filter(|(_, &led)| led == max)
        .map(|(&team, _)| team)
        .collect()
}
