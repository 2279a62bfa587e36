use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A stretch of time during which one owner holds a team.
///
/// `from` is inclusive, `until` exclusive; a missing bound is open-ended.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OwnershipPeriod {
    pub owner: String,

    #[serde(default)]
    pub from: Option<NaiveDate>,

    #[serde(default)]
    pub until: Option<NaiveDate>,
}

impl OwnershipPeriod {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| from <= date) && self.until.is_none_or(|until| date < until)
    }

    fn overlaps(&self, other: &OwnershipPeriod) -> bool {
        let starts_before_other_ends = match (self.from, other.until) {
            (Some(from), Some(until)) => from < until,
            _ => true,
        };
        let other_starts_before_end = match (other.from, self.until) {
            (Some(from), Some(until)) => from < until,
            _ => true,
        };
        starts_before_other_ends && other_starts_before_end
    }
}

/// Who owned which team, and when.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipTable {
    periods: BTreeMap<String, Vec<OwnershipPeriod>>,
}

impl OwnershipTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, team: impl Into<String>, period: OwnershipPeriod) {
        self.periods.entry(team.into()).or_default().push(period);
    }

    /// Owner of `team` on `date`, if any period covers it.
    pub fn owner_on(&self, team: &str, date: NaiveDate) -> Option<&str> {
        self.periods
            .get(team)?
            .iter()
            .find(|p| p.covers(date))
            .map(|p| p.owner.as_str())
    }

    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.periods.keys().map(String::as_str)
    }

    /// Describe every pair of periods of the same team that overlap.
    pub fn overlaps(&self) -> Vec<String> {
        let mut found = Vec::new();
        for (team, periods) in &self.periods {
            for (i, a) in periods.iter().enumerate() {
                for b in &periods[i + 1..] {
                    if a.overlaps(b) {
                        found.push(format!(
                            "team '{}': ownership of {} overlaps ownership of {}",
                            team, a.owner, b.owner
                        ));
                    }
                }
            }
        }
        found
    }
}
