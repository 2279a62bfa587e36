use super::SeasonHistory;
use crate::scoring::RaceResult;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory holding everything for one season (`<data_dir>/season_<n>`)
pub fn season_dir(data_dir: &Path, season: u32) -> PathBuf {
    data_dir.join(format!("season_{}", season))
}

/// Directory holding the per-race JSON records of a season
pub fn races_dir(season_dir: &Path) -> PathBuf {
    season_dir.join("raw")
}

/// File name of a race record: `race_<date>_r<num>.json`
pub fn race_file_name(race: &RaceResult) -> String {
    format!("race_{}_r{}.json", race.date, race.race_num)
}

/// Save a scored race as its own JSON file, atomically.
///
/// The file is either fully written or not written at all. Refuses to save a
/// race number that already has a record.
pub fn save_race(season_dir: &Path, race: &RaceResult) -> Result<PathBuf> {
    let dir = races_dir(season_dir);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create race directory at {}", dir.display()))?;

    if let Some(existing) = find_race_file(&dir, race.race_num)? {
        anyhow::bail!(
            "Race {} is already recorded at {}",
            race.race_num,
            existing.display()
        );
    }

    let path = dir.join(race_file_name(race));
    let mut file = AtomicWriteFile::open(&path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, race).context("Failed to serialize race record")?;

    file.commit()
        .with_context(|| format!("Failed to save race record at {}", path.display()))?;

    info!(race = race.race_num, path = %path.display(), "saved race");
    Ok(path)
}

/// Load every race record of a season from disk.
///
/// A missing directory is an empty season.
pub fn load_history(season_dir: &Path, season: u32) -> Result<SeasonHistory> {
    let dir = races_dir(season_dir);
    let mut races = Vec::new();

    for path in race_files(&dir)? {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open race record at {}", path.display()))?;
        let race: RaceResult = serde_json::from_reader(file)
            .with_context(|| format!("Failed to load race record at {}", path.display()))?;
        debug!(race = race.race_num, path = %path.display(), "loaded race");
        races.push(race);
    }

    let history = SeasonHistory::from_races(season, races)
        .with_context(|| format!("Inconsistent race records in {}", dir.display()))?;
    Ok(history)
}

fn race_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let pattern = dir.join("race_*.json");
    let pattern = pattern
        .to_str()
        .with_context(|| format!("Race directory is not valid UTF-8: {}", dir.display()))?;

    let mut paths = glob::glob(pattern)
        .context("Invalid race file pattern")?
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to list race records")?;
    paths.sort();
    Ok(paths)
}

fn find_race_file(dir: &Path, race_num: u32) -> Result<Option<PathBuf>> {
    let suffix = format!("_r{}.json", race_num);
    Ok(race_files(dir)?.into_iter().find(|p| {
        p.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(&suffix))
    }))
}
