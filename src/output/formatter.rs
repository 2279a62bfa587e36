use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::qualifying::GridSlot;
use crate::scoring::{RaceResult, TeamResult};
use crate::standings::{Category, StandingsRow, PLAYOFF_CUTLINE};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Width of the name column: the longest name, shrunk to fit the terminal.
fn name_column_width<'a>(names: impl Iterator<Item = &'a str>, fixed_width: usize) -> usize {
    let longest = names.map(|n| n.chars().count()).max().unwrap_or(0).max(4);
    match get_terminal_width() {
        Some(width) if width > fixed_width + 10 => longest.min(width - fixed_width),
        Some(_) => longest.min(10),
        None => longest,
    }
}

/// Signed cutline margin ("+12", "-3", "0"); blank when there is none
pub fn format_margin(margin: Option<i64>) -> String {
    match margin {
        Some(0) => "0".to_string(),
        Some(m) => format!("{:+}", m),
        None => String::new(),
    }
}

/// Format a standings table with a header row.
/// Playoff tables get a margin column and a rule under the last position in.
pub fn format_standings_table(rows: &[StandingsRow], category: Category, use_colors: bool) -> String {
    if rows.is_empty() {
        return format!("No {} standings yet.", category);
    }

    let team_width = rows.iter().map(|r| r.team.chars().count()).max().unwrap_or(0).max(4);
    // pos, car, numeric columns, separators
    let fixed_width = 4 + 5 + team_width + 7 * 7 + 8;
    let name_width = name_column_width(rows.iter().map(|r| r.name.as_str()), fixed_width);
    let playoff = category == Category::Playoff;

    let mut header = format!(
        "{:>3}  {:<name_w$}  {:<team_w$}  {:>4} {:>6} {:>6} {:>6} {:>4} {:>4} {:>4} {:>5}",
        "Pos", "Name", "Team", "Car", "Pts", "Behind", "Starts", "W", "T5", "T10", "Led",
        name_w = name_width,
        team_w = team_width,
    );
    if playoff {
        header.push_str(&format!(" {:>6}", "Margin"));
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(if use_colors { header.bold().to_string() } else { header });

    for row in rows {
        let car = row.car_number.map(|c| c.to_string()).unwrap_or_default();
        let mut line = format!(
            "{:>3}  {:<name_w$}  {:<team_w$}  {:>4} {:>6} {:>6} {:>6} {:>4} {:>4} {:>4} {:>5}",
            row.position,
            truncate_name(&row.name, name_width),
            row.team,
            car,
            row.points,
            row.behind,
            row.starts,
            row.wins,
            row.top5s,
            row.top10s,
            row.turns_led,
            name_w = name_width,
            team_w = team_width,
        );
        if playoff {
            let margin = format!(" {:>6}", format_margin(row.margin));
            if use_colors {
                match row.margin {
                    Some(m) if m < 0 => line.push_str(&margin.red().to_string()),
                    Some(_) => line.push_str(&margin.green().to_string()),
                    None => line.push_str(&margin),
                }
            } else {
                line.push_str(&margin);
            }
        }
        let line = if use_colors && row.position == 1 { line.bold().to_string() } else { line };
        lines.push(line);

        if playoff && row.position as usize == PLAYOFF_CUTLINE && rows.len() > PLAYOFF_CUTLINE {
            let rule = "-".repeat(lines[0].chars().count().min(80));
            lines.push(if use_colors { rule.dimmed().to_string() } else { rule });
        }
    }

    lines.join("\n")
}

/// Format standings as tab-separated values for scripting
/// Columns: position, name, team, points, behind (no headers, no colors)
pub fn format_standings_tsv(rows: &[StandingsRow]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                row.position, row.name, row.team, row.points, row.behind
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a scored race: finishing order followed by the team summary
pub fn format_race_result(result: &RaceResult, use_colors: bool) -> String {
    let title = format!(
        "Race {} - {} ({})",
        result.race_num, result.track_id, result.date
    );
    let mut lines = vec![if use_colors { title.bold().to_string() } else { title }];

    let fixed_width = 4 + 5 + 4 + 5 + 5 + 8;
    let name_width = name_column_width(
        result.results.iter().map(|r| r.entrant.driver.as_str()),
        fixed_width,
    );

    for scored in &result.results {
        let e = &scored.entrant;
        let line = format!(
            "{:>3}. #{:<3} {:<name_w$}  {:<10} start {:>2}  led {:>2}  {:>3} pts",
            e.finish,
            e.car_number,
            truncate_name(&e.driver, name_width),
            truncate_name(&e.team, 10),
            e.start,
            scored.points.turns_led,
            scored.points.race_total(),
            name_w = name_width,
        );
        let line = if use_colors && scored.points.team_bonus > 0 {
            format!("{} {}", line, "+bonus".yellow())
        } else if scored.points.team_bonus > 0 {
            format!("{} +bonus", line)
        } else {
            line
        };
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(format_team_results(&result.team_results, use_colors));
    lines.join("\n")
}

/// Format the per-team summary of one race
pub fn format_team_results(teams: &[TeamResult], use_colors: bool) -> String {
    if teams.is_empty() {
        return "No teams raced.".to_string();
    }

    teams
        .iter()
        .map(|t| {
            let marker = if t.led_most_turns { "*" } else { " " };
            let line = format!(
                "{:>2}. {:<12} {:>4} pts  led {:>3}{}  avg finish {:>5.2}  ({} cars)",
                t.position,
                truncate_name(&t.team, 12),
                t.total_points,
                t.turns_led,
                marker,
                t.avg_finish,
                t.drivers
            );
            if use_colors && t.position == 1 {
                line.bold().to_string()
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a starting grid, one car per line
pub fn format_grid(grid: &[GridSlot], use_colors: bool) -> String {
    if grid.is_empty() {
        return "No cars on the grid.".to_string();
    }

    grid.iter()
        .map(|slot| {
            let start = format!("{:>2}.", slot.start);
            if use_colors {
                format!(
                    "{} #{:<3} {}  {}",
                    start.dimmed(),
                    slot.car_number,
                    slot.driver.bold(),
                    slot.team.cyan()
                )
            } else {
                format!("{} #{:<3} {}  {}", start, slot.car_number, slot.driver, slot.team)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
