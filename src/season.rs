use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::LeagueError;
use crate::history::{export_season_csv, export_standings_csv, save_race, SeasonHistory};
use crate::scoring::{score_race, PointsTable, RaceEntry, RaceResult};
use crate::standings::{compute_all, AllStandings, Category, OwnershipTable};

/// Score a race and add it to the season.
///
/// The race is saved to disk before it joins the in-memory history. Nothing
/// is written if scoring fails, and a dry run scores without saving.
pub fn record_race(
    season_dir: &Path,
    history: &mut SeasonHistory,
    entry: &RaceEntry,
    points: &PointsTable,
    dry_run: bool,
) -> Result<RaceResult> {
    let next = history.next_race_num();
    if entry.race_num < next {
        return Err(LeagueError::validation(
            entry.race_num,
            format!("race numbers must increase (next is {})", next),
        )
        .into());
    }

    let result = score_race(entry, points)?;
    if dry_run {
        info!(race = result.race_num, "dry run, race not saved");
        return Ok(result);
    }

    save_race(season_dir, &result)?;
    history.append(result.clone())?;
    Ok(result)
}

/// What a standings rebuild produced.
#[derive(Debug)]
pub struct RebuildReport {
    pub season_csv: PathBuf,
    pub standings: AllStandings,
    /// One file per category that computed
    pub exported: Vec<PathBuf>,
}

impl RebuildReport {
    /// Categories that could not be computed, with the reason.
    pub fn failures(&self) -> Vec<(Category, &LeagueError)> {
        Category::ALL
            .into_iter()
            .filter_map(|c| self.standings.get(c).as_ref().err().map(|e| (c, e)))
            .collect()
    }
}

/// Recompute every standings table from the full history and export them.
///
/// A category that fails is reported and skipped; its previous export is
/// left as it was.
pub fn rebuild_standings(
    season_dir: &Path,
    history: &SeasonHistory,
    owners: &OwnershipTable,
) -> Result<RebuildReport> {
    let season_csv = export_season_csv(season_dir, history)?;
    let standings = compute_all(history, owners);

    let mut exported = Vec::new();
    for category in Category::ALL {
        match standings.get(category) {
            Ok(rows) => exported.push(export_standings_csv(season_dir, category, rows)?),
            Err(e) => warn!(%category, error = %e, "skipping export"),
        }
    }

    info!(
        season = history.season,
        races = history.len(),
        exported = exported.len(),
        "rebuilt standings"
    );
    Ok(RebuildReport {
        season_csv,
        standings,
        exported,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{load_history, races_dir};
    use crate::scoring::Entrant;
    use crate::standings::OwnershipPeriod;
    use chrono::NaiveDate;
    use std::fs;

    fn entry(race_num: u32, teams: [&str; 2]) -> RaceEntry {
        let entrants = [("Dale", teams[0], 3), ("Jeff", teams[1], 0)]
            .iter()
            .enumerate()
            .map(|(i, &(driver, team, led))| Entrant {
                car_number: i as u32 + 1,
                driver: driver.to_string(),
                team: team.to_string(),
                finish: i as u32 + 1,
                start: 2 - i as u32,
                turns_led: led,
            })
            .collect();
        RaceEntry {
            race_num,
            track_id: "martinsville".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, race_num).unwrap(),
            entrants,
        }
    }

    fn owners() -> OwnershipTable {
        let mut table = OwnershipTable::new();
        table.insert(
            "Red",
            OwnershipPeriod {
                owner: "Rick".to_string(),
                from: None,
                until: None,
            },
        );
        table
    }

    fn file_count(dir: &Path) -> usize {
        fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[test]
    fn test_record_race_saves_and_appends() {
        let tmp = tempfile::tempdir().unwrap();
        let mut history = SeasonHistory::new(1);

        let result = record_race(
            tmp.path(),
            &mut history,
            &entry(1, ["Red", "Red"]),
            &PointsTable::default(),
            false,
        )
        .unwrap();

        assert_eq!(result.winner().unwrap().entrant.driver, "Dale");
        assert_eq!(history.len(), 1);
        assert_eq!(load_history(tmp.path(), 1).unwrap(), history);
    }

    #[test]
    fn test_invalid_race_leaves_everything_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let mut history = SeasonHistory::new(1);
        let mut bad = entry(1, ["Red", "Red"]);
        bad.entrants[1].finish = 1;

        let err = record_race(tmp.path(), &mut history, &bad, &PointsTable::default(), false)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LeagueError>(),
            Some(LeagueError::Validation { race: 1, .. })
        ));
        assert!(history.is_empty());
        assert_eq!(file_count(&races_dir(tmp.path())), 0);
    }

    #[test]
    fn test_stale_race_number_rejected_before_scoring() {
        let tmp = tempfile::tempdir().unwrap();
        let mut history = SeasonHistory::new(1);
        let points = PointsTable::default();
        record_race(tmp.path(), &mut history, &entry(1, ["Red", "Red"]), &points, false).unwrap();

        let err = record_race(tmp.path(), &mut history, &entry(1, ["Red", "Red"]), &points, false)
            .unwrap_err();
        assert!(err.downcast_ref::<LeagueError>().is_some());
        assert_eq!(history.len(), 1);
        assert_eq!(file_count(&races_dir(tmp.path())), 1);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut history = SeasonHistory::new(1);

        let result = record_race(
            tmp.path(),
            &mut history,
            &entry(1, ["Red", "Red"]),
            &PointsTable::default(),
            true,
        )
        .unwrap();

        assert_eq!(result.race_num, 1);
        assert!(history.is_empty());
        assert!(!races_dir(tmp.path()).exists());
    }

    #[test]
    fn test_rebuild_exports_every_category() {
        let tmp = tempfile::tempdir().unwrap();
        let mut history = SeasonHistory::new(1);
        let points = PointsTable::default();
        for num in 1..=2 {
            record_race(tmp.path(), &mut history, &entry(num, ["Red", "Red"]), &points, false)
                .unwrap();
        }

        let report = rebuild_standings(tmp.path(), &history, &owners()).unwrap();

        assert!(report.failures().is_empty());
        assert_eq!(report.exported.len(), 3);
        assert!(report.season_csv.ends_with("season_1_results.csv"));
        for stem in ["driver_standings", "owner_standings", "playoff_standings"] {
            assert!(tmp.path().join(format!("{}.csv", stem)).exists(), "{}", stem);
        }
        let season = fs::read_to_string(&report.season_csv).unwrap();
        assert_eq!(season.lines().count(), 5);
    }

    #[test]
    fn test_rebuild_skips_failed_category() {
        let tmp = tempfile::tempdir().unwrap();
        let mut history = SeasonHistory::new(1);
        record_race(
            tmp.path(),
            &mut history,
            &entry(1, ["Red", "Blue"]),
            &PointsTable::default(),
            false,
        )
        .unwrap();

        let report = rebuild_standings(tmp.path(), &history, &owners()).unwrap();

        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, Category::Owner);
        assert_eq!(report.exported.len(), 2);
        assert!(!tmp.path().join("owner_standings.csv").exists());
        assert!(tmp.path().join("driver_standings.csv").exists());
    }
}
