use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Points awarded per turn led. Fixed by the league format.
pub const TURNS_LED_POINTS: u32 = 1;

/// Points configuration for a season.
///
/// Each table maps a 1-based position to the points it earns. Tables must
/// cover every position that can appear in a field; a missing position is a
/// configuration error at scoring time, never zero points.
///
/// Example YAML:
/// ```yaml
/// points:
///   race: { 1: 43, 2: 38, 3: 36 }
///   playoff: { 1: 5, 2: 4, 3: 3 }
///   qualifying: { 1: 10, 2: 8, 3: 6 }
///   pole_bonus: 4
///   team_bonus: 1
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PointsTable {
    /// Finishing position -> race points
    pub race: BTreeMap<u32, u32>,

    /// Finishing position -> playoff points
    pub playoff: BTreeMap<u32, u32>,

    /// Qualifying (starting) position -> qualifying points
    pub qualifying: BTreeMap<u32, u32>,

    /// Extra qualifying points for starting on pole (default: 4)
    #[serde(default = "default_pole_bonus")]
    pub pole_bonus: u32,

    /// Bonus for the best finisher of the team that led the most turns (default: 1)
    #[serde(default = "default_team_bonus")]
    pub team_bonus: u32,
}

fn default_pole_bonus() -> u32 {
    4
}

fn default_team_bonus() -> u32 {
    1
}

/// Largest field the league format allows (7 teams of 3 cars).
pub const MAX_FIELD: u32 = 21;

impl Default for PointsTable {
    fn default() -> Self {
        let race = (1..=MAX_FIELD)
            .map(|pos| {
                let points = match pos {
                    1 => 43,
                    2 => 38,
                    3 => 36,
                    4 => 34,
                    5 => 32,
                    n => 37 - n,
                };
                (pos, points)
            })
            .collect();
        let playoff = (1..=MAX_FIELD)
            .map(|pos| (pos, 6u32.saturating_sub(pos)))
            .collect();
        let qualifying = (1..=MAX_FIELD)
            .map(|pos| {
                let points = match pos {
                    1 => 10,
                    2 => 8,
                    3 => 6,
                    n => 9u32.saturating_sub(n),
                };
                (pos, points)
            })
            .collect();

        Self {
            race,
            playoff,
            qualifying,
            pole_bonus: default_pole_bonus(),
            team_bonus: default_team_bonus(),
        }
    }
}

impl PointsTable {
    pub fn race_points(&self, finish: u32) -> Option<u32> {
        self.race.get(&finish).copied()
    }

    pub fn playoff_points(&self, finish: u32) -> Option<u32> {
        self.playoff.get(&finish).copied()
    }

    pub fn qualifying_points(&self, start: u32) -> Option<u32> {
        self.qualifying.get(&start).copied()
    }

    pub fn turns_led_points(&self, turns_led: u32) -> u32 {
        turns_led * TURNS_LED_POINTS
    }

    /// Largest field every table can score.
    pub fn max_field_size(&self) -> u32 {
        [&self.race, &self.playoff, &self.qualifying]
            .iter()
            .map(|table| contiguous_len(table))
            .min()
            .unwrap_or(0)
    }
}

/// Number of positions covered without a gap, starting at 1.
pub(crate) fn contiguous_len(table: &BTreeMap<u32, u32>) -> u32 {
    let mut expected = 1;
    for &pos in table.keys() {
        if pos != expected {
            break;
        }
        expected += 1;
    }
    expected - 1
}
