use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::scoring::PointsTable;
use crate::standings::{OwnershipPeriod, OwnershipTable};

/// League configuration for one season.
///
/// Example YAML:
/// ```yaml
/// season: 2
/// points:
///   race: { 1: 43, 2: 38, 3: 36, 4: 34 }
///   playoff: { 1: 5, 2: 4, 3: 3, 4: 2 }
///   qualifying: { 1: 10, 2: 8, 3: 6, 4: 5 }
/// teams:
///   Red:
///     pole: 1
///     owners:
///       - owner: Rick
///         until: 2025-06-01
///       - owner: Teresa
///         from: 2025-06-01
///   Blue:
///     pole: 2
///     owners:
///       - owner: Joe
/// drivers:
///   - { car: 3, name: Dale, team: Red }
///   - { car: 24, name: Jeff, team: Blue }
/// tracks:
///   bristol: { name: Bristol Motor Speedway }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LeagueConfig {
    /// Season number; selects the data directory
    pub season: u32,

    /// Points tables (default: the league's standard tables)
    #[serde(default)]
    pub points: PointsTable,

    pub teams: BTreeMap<String, TeamConfig>,

    pub drivers: Vec<DriverConfig>,

    #[serde(default)]
    pub tracks: BTreeMap<String, TrackConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TeamConfig {
    /// Pole order rank; 1 starts first in every grid row
    pub pole: u32,

    #[serde(default)]
    pub owners: Vec<OwnershipPeriod>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    pub car: u32,
    pub name: String,
    pub team: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TrackConfig {
    pub name: String,
}

impl LeagueConfig {
    /// Ownership periods of every team, ready for date lookups
    pub fn ownership(&self) -> OwnershipTable {
        let mut table = OwnershipTable::new();
        for (team, config) in &self.teams {
            for period in &config.owners {
                table.insert(team.clone(), period.clone());
            }
        }
        table
    }

    pub fn driver_by_car(&self, car: u32) -> Option<&DriverConfig> {
        self.drivers.iter().find(|d| d.car == car)
    }

    /// Team names sorted by pole rank
    pub fn teams_in_pole_order(&self) -> Vec<&str> {
        let mut teams: Vec<(&str, u32)> = self
            .teams
            .iter()
            .map(|(name, t)| (name.as_str(), t.pole))
            .collect();
        teams.sort_by_key(|&(name, pole)| (pole, name));
        teams.into_iter().map(|(name, _)| name).collect()
    }
}
