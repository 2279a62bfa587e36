use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One driver's participation in one race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entrant {
    pub car_number: u32,
    pub driver: String,
    pub team: String,
    pub finish: u32,
    /// Qualifying (starting) position
    pub start: u32,
    pub turns_led: i32,
}

/// A race as entered, before scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceEntry {
    pub race_num: u32,
    pub track_id: String,
    pub date: NaiveDate,
    pub entrants: Vec<Entrant>,
}

/// Every component that went into an entrant's points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointBreakdown {
    pub race: u32,
    pub turns_led: u32,
    pub qualifying: u32,
    pub pole_bonus: u32,
    pub team_bonus: u32,
    /// Tracked for playoff standings only, never part of the race total
    pub playoff: u32,
}

impl PointBreakdown {
    /// Points counted toward driver and owner standings.
    pub fn race_total(&self) -> u32 {
        self.race + self.turns_led + self.qualifying + self.pole_bonus + self.team_bonus
    }

    /// Qualifying points including the pole bonus.
    pub fn qualifying_total(&self) -> u32 {
        self.qualifying + self.pole_bonus
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredEntrant {
    #[serde(flatten)]
    pub entrant: Entrant,
    /// Rank among teammates, 1 = best placed
    pub relative_finish: u32,
    pub points: PointBreakdown,
}

impl ScoredEntrant {
    pub fn is_win(&self) -> bool {
        self.entrant.finish == 1
    }

    pub fn is_top(&self, n: u32) -> bool {
        self.entrant.finish <= n
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelativeFinish {
    pub driver: String,
    pub rank: u32,
}

/// Per-team summary of a single race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamResult {
    pub position: u32,
    pub team: String,
    pub total_points: u32,
    pub turns_led: u32,
    pub led_most_turns: bool,
    pub avg_finish: f64,
    pub drivers: u32,
    /// Teammates in finishing order
    pub relative_finishes: Vec<RelativeFinish>,
}

/// A fully scored race. Produced once by `score_race` and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    pub race_num: u32,
    pub track_id: String,
    pub date: NaiveDate,
    /// Entrants in finishing order
    pub results: Vec<ScoredEntrant>,
    pub team_results: Vec<TeamResult>,
}

impl RaceResult {
    pub fn winner(&self) -> Option<&ScoredEntrant> {
        self.results.iter().find(|r| r.is_win())
    }

    /// Teams that received the turns-led bonus.
    pub fn turn_leaders(&self) -> impl Iterator<Item = &str> {
        self.team_results
            .iter()
            .filter(|t| t.led_most_turns)
            .map(|t| t.team.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakdown() -> PointBreakdown {
        PointBreakdown {
            race: 43,
            turns_led: 10,
            qualifying: 10,
            pole_bonus: 4,
            team_bonus: 1,
            playoff: 5,
        }
    }

    #[test]
    fn test_race_total_excludes_playoff() {
        assert_eq!(breakdown().race_total(), 68);
    }

    #[test]
    fn test_qualifying_total_includes_pole() {
        assert_eq!(breakdown().qualifying_total(), 14);
    }

    #[test]
    fn test_scored_entrant_json_is_flat() {
        let scored = ScoredEntrant {
            entrant: Entrant {
                car_number: 7,
                driver: "Ricky".to_string(),
                team: "Red".to_string(),
                finish: 1,
                start: 1,
                turns_led: 10,
            },
            relative_finish: 1,
            points: breakdown(),
        };

        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["carNumber"], 7);
        assert_eq!(json["turnsLed"], 10);
        assert_eq!(json["relativeFinish"], 1);
        assert_eq!(json["points"]["poleBonus"], 4);

        let parsed: ScoredEntrant = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, scored);
        assert!(parsed.is_win());
        assert!(parsed.is_top(5));
    }
}
