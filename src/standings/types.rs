use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::error::LeagueError;

/// Which standings table to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Driver,
    Owner,
    Playoff,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Driver, Category::Owner, Category::Playoff];

    /// File name (without extension) of the exported table
    pub fn file_stem(&self) -> &'static str {
        match self {
            Category::Driver => "driver_standings",
            Category::Owner => "owner_standings",
            Category::Playoff => "playoff_standings",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Driver => "driver",
            Category::Owner => "owner",
            Category::Playoff => "playoff",
        };
        f.write_str(name)
    }
}

/// One ranked line of a standings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsRow {
    pub position: u32,
    /// Driver or owner name
    pub name: String,
    /// Driver: team of the latest start. Owner: every team held this season.
    pub team: String,
    pub car_number: Option<u32>,
    pub points: u32,
    /// Gap to the leader
    pub behind: u32,
    pub starts: u32,
    pub wins: u32,
    pub top5s: u32,
    pub top10s: u32,
    pub turns_led: u32,
    pub first_date: NaiveDate,
    pub first_race: u32,
    /// Playoff only: distance to the cutline
    pub margin: Option<i64>,
}

/// The three standings tables, each computed independently.
#[derive(Debug)]
pub struct AllStandings {
    pub driver: Result<Vec<StandingsRow>, LeagueError>,
    pub owner: Result<Vec<StandingsRow>, LeagueError>,
    pub playoff: Result<Vec<StandingsRow>, LeagueError>,
}

impl AllStandings {
    pub fn get(&self, category: Category) -> &Result<Vec<StandingsRow>, LeagueError> {
        match category {
            Category::Driver => &self.driver,
            Category::Owner => &self.owner,
            Category::Playoff => &self.playoff,
        }
    }
}
