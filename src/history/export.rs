use super::SeasonHistory;
use crate::standings::{Category, StandingsRow};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// One entrant of one race, flattened for the season-wide table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonRow {
    pub date: NaiveDate,
    pub race_num: u32,
    pub track_id: String,
    pub finish: u32,
    pub car_number: u32,
    pub driver: String,
    pub team: String,
    pub start: u32,
    pub turns_led: i32,
    pub race_points: u32,
    pub qualifying_points: u32,
    pub pole_bonus: u32,
    pub team_bonus: u32,
    pub points: u32,
    pub playoff_points: u32,
    pub relative_finish: u32,
}

impl SeasonRow {
    pub fn from_history(history: &SeasonHistory) -> Vec<SeasonRow> {
        history
            .races()
            .iter()
            .flat_map(|race| {
                race.results.iter().map(move |r| SeasonRow {
                    date: race.date,
                    race_num: race.race_num,
                    track_id: race.track_id.clone(),
                    finish: r.entrant.finish,
                    car_number: r.entrant.car_number,
                    driver: r.entrant.driver.clone(),
                    team: r.entrant.team.clone(),
                    start: r.entrant.start,
                    turns_led: r.entrant.turns_led,
                    race_points: r.points.race,
                    qualifying_points: r.points.qualifying,
                    pole_bonus: r.points.pole_bonus,
                    team_bonus: r.points.team_bonus,
                    points: r.points.race_total(),
                    playoff_points: r.points.playoff,
                    relative_finish: r.relative_finish,
                })
            })
            .collect()
    }
}

/// Path of the season-wide results table
pub fn season_csv_path(season_dir: &Path, season: u32) -> PathBuf {
    season_dir.join(format!("season_{}_results.csv", season))
}

/// Rebuild the season-wide results table from scratch.
pub fn export_season_csv(season_dir: &Path, history: &SeasonHistory) -> Result<PathBuf> {
    let path = season_csv_path(season_dir, history.season);
    let rows = SeasonRow::from_history(history);
    write_csv(&path, &rows)?;
    info!(rows = rows.len(), path = %path.display(), "exported season results");
    Ok(path)
}

/// Write one standings table (`driver_standings.csv` etc.).
pub fn export_standings_csv(
    season_dir: &Path,
    category: Category,
    rows: &[StandingsRow],
) -> Result<PathBuf> {
    let path = season_dir.join(format!("{}.csv", category.file_stem()));
    write_csv(&path, rows)?;
    info!(%category, rows = rows.len(), path = %path.display(), "exported standings");
    Ok(path)
}

/// Write rows as CSV with a header, atomically.
///
/// An empty table still gets its header so downstream readers see the schema.
fn write_csv<T: Serialize + CsvHeader>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory at {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    {
        let mut writer = csv::Writer::from_writer(&mut file);
        if rows.is_empty() {
            writer
                .write_record(T::HEADER)
                .context("Failed to write CSV header")?;
        }
        for row in rows {
            writer.serialize(row).context("Failed to write CSV row")?;
        }
        writer.flush().context("Failed to flush CSV writer")?;
    }

    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(())
}

/// Column names, used when a table has no rows to derive them from.
pub trait CsvHeader {
    const HEADER: &'static [&'static str];
}

impl CsvHeader for SeasonRow {
    const HEADER: &'static [&'static str] = &[
        "date",
        "raceNum",
        "trackId",
        "finish",
        "carNumber",
        "driver",
        "team",
        "start",
        "turnsLed",
        "racePoints",
        "qualifyingPoints",
        "poleBonus",
        "teamBonus",
        "points",
        "playoffPoints",
        "relativeFinish",
    ];
}

impl CsvHeader for StandingsRow {
    const HEADER: &'static [&'static str] = &[
        "position",
        "name",
        "team",
        "carNumber",
        "points",
        "behind",
        "starts",
        "wins",
        "top5s",
        "top10s",
        "turnsLed",
        "firstDate",
        "firstRace",
        "margin",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SeasonHistory;
    use crate::scoring::{score_race, Entrant, PointsTable, RaceEntry};
    use crate::standings::{compute_standings, OwnershipTable};

    fn history() -> SeasonHistory {
        let entry = RaceEntry {
            race_num: 1,
            track_id: "richmond".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 4, 5).unwrap(),
            entrants: vec![
                Entrant {
                    car_number: 43,
                    driver: "Richard".to_string(),
                    team: "Blue".to_string(),
                    finish: 1,
                    start: 2,
                    turns_led: 3,
                },
                Entrant {
                    car_number: 11,
                    driver: "Darrell".to_string(),
                    team: "Green".to_string(),
                    finish: 2,
                    start: 1,
                    turns_led: 0,
                },
            ],
        };
        let race = score_race(&entry, &PointsTable::default()).unwrap();
        SeasonHistory::from_races(3, vec![race]).unwrap()
    }

    #[test]
    fn test_season_rows_flatten_history() {
        let rows = SeasonRow::from_history(&history());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].driver, "Richard");
        // 43 race + 3 turns + 8 qualifying + 1 team bonus
        assert_eq!(rows[0].points, 55);
        assert_eq!(rows[1].pole_bonus, 4);
    }

    #[test]
    fn test_export_season_csv() {
        let tmp = tempfile::tempdir().unwrap();
        let path = export_season_csv(tmp.path(), &history()).unwrap();
        assert!(path.ends_with("season_3_results.csv"));

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), SeasonRow::HEADER.join(","));
        assert!(lines.next().unwrap().starts_with("2025-04-05,1,richmond,1,43,Richard,Blue"));
        assert_eq!(content.lines().count(), 3);
    }

    /// Header that serde derives from the row's fields.
    fn derived_header<T: Serialize>(row: &T) -> Vec<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(row).unwrap();
        let bytes = writer.into_inner().unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        reader.headers().unwrap().iter().map(String::from).collect()
    }

    #[test]
    fn test_empty_table_headers_match_row_fields() {
        let history = history();
        let season_row = &SeasonRow::from_history(&history)[0];
        assert_eq!(derived_header(season_row), SeasonRow::HEADER);

        let standings = compute_standings(&history, Category::Playoff, &OwnershipTable::default())
            .unwrap();
        assert_eq!(derived_header(&standings[0]), StandingsRow::HEADER);
    }

    #[test]
    fn test_export_empty_season_writes_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = export_season_csv(tmp.path(), &SeasonHistory::new(1)).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), SeasonRow::HEADER.join(","));
    }

    #[test]
    fn test_export_standings_csv() {
        let tmp = tempfile::tempdir().unwrap();
        let rows = compute_standings(&history(), Category::Driver, &OwnershipTable::default())
            .unwrap();
        let path = export_standings_csv(tmp.path(), Category::Driver, &rows).unwrap();
        assert!(path.ends_with("driver_standings.csv"));

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), StandingsRow::HEADER.join(","));
        assert!(lines.next().unwrap().starts_with("1,Richard,Blue,43,55,0,1,1"));
    }
}
