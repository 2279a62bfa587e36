use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::ownership::OwnershipTable;
use super::types::{AllStandings, Category, StandingsRow};
use crate::error::LeagueError;
use crate::history::SeasonHistory;
use crate::scoring::{RaceResult, ScoredEntrant};

/// Positions 1..=12 are above the playoff cutline.
pub const PLAYOFF_CUTLINE: usize = 12;

/// Playoff standings list at most this many drivers.
pub const PLAYOFF_FIELD: usize = 24;

/// Running totals for one standings entity.
#[derive(Debug)]
struct Tally {
    name: String,
    /// Most recent last
    teams: Vec<String>,
    car_number: u32,
    points: u32,
    starts: u32,
    wins: u32,
    top5s: u32,
    top10s: u32,
    turns_led: u32,
    first: (NaiveDate, u32),
    last_race: u32,
}

impl Tally {
    fn new(name: String, race: &RaceResult) -> Self {
        Self {
            name,
            teams: Vec::new(),
            car_number: 0,
            points: 0,
            starts: 0,
            wins: 0,
            top5s: 0,
            top10s: 0,
            turns_led: 0,
            first: (race.date, race.race_num),
            last_race: 0,
        }
    }

    fn add(&mut self, race: &RaceResult, scored: &ScoredEntrant, points: u32) {
        // An owner with several cars in a race still starts it once
        if self.last_race != race.race_num || self.starts == 0 {
            self.starts += 1;
            self.last_race = race.race_num;
        }
        // Race dates need not follow race numbers
        self.first = self.first.min((race.date, race.race_num));
        self.points += points;
        self.wins += u32::from(scored.is_win());
        self.top5s += u32::from(scored.is_top(5));
        self.top10s += u32::from(scored.is_top(10));
        self.turns_led += scored.points.turns_led;
        self.car_number = scored.entrant.car_number;

        let team = &scored.entrant.team;
        self.teams.retain(|t| t != team);
        self.teams.push(team.clone());
    }
}

/// Build one standings table from the whole season.
///
/// Nothing is cached between calls: every call walks the entire history, so
/// the table always matches the races on record.
pub fn compute_standings(
    history: &SeasonHistory,
    category: Category,
    owners: &OwnershipTable,
) -> Result<Vec<StandingsRow>, LeagueError> {
    let mut tallies: BTreeMap<String, Tally> = BTreeMap::new();

    for race in history.races() {
        for scored in &race.results {
            let (key, points) = match category {
                Category::Driver => (scored.entrant.driver.clone(), scored.points.race_total()),
                Category::Playoff => (scored.entrant.driver.clone(), scored.points.playoff),
                Category::Owner => {
                    let owner = owners
                        .owner_on(&scored.entrant.team, race.date)
                        .ok_or_else(|| LeagueError::Consistency {
                            race: race.race_num,
                            date: race.date,
                            team: scored.entrant.team.clone(),
                        })?;
                    (owner.to_string(), scored.points.race_total())
                }
            };

            tallies
                .entry(key)
                .or_insert_with_key(|name| Tally::new(name.clone(), race))
                .add(race, scored, points);
        }
    }

    let mut ordered: Vec<Tally> = tallies.into_values().collect();
    ordered.sort_by(standings_order);

    let leader = ordered.first().map_or(0, |t| t.points);
    let mut rows: Vec<StandingsRow> = ordered
        .into_iter()
        .enumerate()
        .map(|(idx, t)| {
            let (team, car_number) = match category {
                Category::Owner => (t.teams.join(" / "), None),
                _ => (t.teams.last().cloned().unwrap_or_default(), Some(t.car_number)),
            };
            StandingsRow {
                position: idx as u32 + 1,
                name: t.name,
                team,
                car_number,
                points: t.points,
                behind: leader - t.points,
                starts: t.starts,
                wins: t.wins,
                top5s: t.top5s,
                top10s: t.top10s,
                turns_led: t.turns_led,
                first_date: t.first.0,
                first_race: t.first.1,
                margin: None,
            }
        })
        .collect();

    if category == Category::Playoff {
        apply_cutline(&mut rows);
        rows.truncate(PLAYOFF_FIELD);
    }

    debug!(%category, races = history.len(), rows = rows.len(), "computed standings");
    Ok(rows)
}

/// Compute every category. A failure in one leaves the others untouched.
pub fn compute_all(history: &SeasonHistory, owners: &OwnershipTable) -> AllStandings {
    let run = |category: Category| {
        let result = compute_standings(history, category, owners);
        if let Err(e) = &result {
            warn!(%category, error = %e, "standings not computed");
        }
        result
    };

    AllStandings {
        driver: run(Category::Driver),
        owner: run(Category::Owner),
        playoff: run(Category::Playoff),
    }
}

/// Points, then wins, then top-5s, then earliest first start, then name.
/// Names are unique per table, so no two tallies compare equal.
fn standings_order(a: &Tally, b: &Tally) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| b.top5s.cmp(&a.top5s))
        .then_with(|| a.first.cmp(&b.first))
        .then_with(|| a.name.cmp(&b.name))
}

/// Above the cutline: lead over 13th. Below it: gap to 12th.
fn apply_cutline(rows: &mut [StandingsRow]) {
    if rows.len() <= PLAYOFF_CUTLINE {
        return;
    }
    let last_in = i64::from(rows[PLAYOFF_CUTLINE - 1].points);
    let first_out = i64::from(rows[PLAYOFF_CUTLINE].points);

    for (idx, row) in rows.iter_mut().enumerate() {
        let points = i64::from(row.points);
        row.margin = Some(if idx < PLAYOFF_CUTLINE {
            points - first_out
        } else {
            points - last_in
        });
    }
}
