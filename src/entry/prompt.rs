use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::io::{BufRead, Write};

use crate::config::LeagueConfig;
use crate::qualifying::{GridSlot, MAX_TEAMS, MIN_TEAMS};
use crate::scoring::Entrant;

/// Line-based race entry over any reader and writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prompt with a message and return the trimmed input.
    fn prompt(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{}", message).context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush output")?;
        let mut input = String::new();
        let read = self
            .input
            .read_line(&mut input)
            .context("Failed to read input")?;
        if read == 0 {
            anyhow::bail!("Input ended before the race was fully entered");
        }
        Ok(input.trim().to_string())
    }

    /// Prompt with a default value. Returns default if input is empty.
    fn prompt_with_default(&mut self, message: &str, default: &str) -> Result<String> {
        let input = self.prompt(&format!("{} [{}]: ", message, default))?;
        if input.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(input)
        }
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message).context("Failed to write output")
    }

    /// Pick the racing teams by their number in the pole-order list.
    /// Returns team names in pole order.
    pub fn select_teams(&mut self, config: &LeagueConfig) -> Result<Vec<String>> {
        let teams = config.teams_in_pole_order();
        for (idx, team) in teams.iter().enumerate() {
            self.say(&format!("  {}. {}", idx + 1, team))?;
        }

        loop {
            let input = self.prompt_with_default("Teams racing (e.g. 1,3,4)", "all")?;
            let picked: Result<HashSet<usize>, _> = if input.eq_ignore_ascii_case("all") {
                Ok((1..=teams.len()).collect())
            } else {
                input.split(',').map(|s| s.trim().parse::<usize>()).collect()
            };

            match picked {
                Ok(picked) if picked.iter().any(|&n| n == 0 || n > teams.len()) => {
                    self.say(&format!("Team numbers run from 1 to {}.", teams.len()))?;
                }
                Ok(picked) if !(MIN_TEAMS..=MAX_TEAMS).contains(&picked.len()) => {
                    self.say(&format!(
                        "Pick between {} and {} teams.",
                        MIN_TEAMS, MAX_TEAMS
                    ))?;
                }
                Ok(picked) => {
                    return Ok(teams
                        .iter()
                        .enumerate()
                        .filter(|(idx, _)| picked.contains(&(idx + 1)))
                        .map(|(_, team)| team.to_string())
                        .collect());
                }
                Err(_) => self.say("Enter team numbers separated by commas.")?,
            }
        }
    }

    pub fn select_track(&mut self, config: &LeagueConfig) -> Result<String> {
        for (id, track) in &config.tracks {
            self.say(&format!("  {:<12} {}", id, track.name))?;
        }

        loop {
            let input = self.prompt("Track: ")?;
            if input.is_empty() {
                continue;
            }
            if config.tracks.is_empty() || config.tracks.contains_key(&input) {
                return Ok(input);
            }
            self.say(&format!("Unknown track '{}'.", input))?;
        }
    }

    pub fn select_date(&mut self, today: NaiveDate) -> Result<NaiveDate> {
        loop {
            let input = self.prompt_with_default("Race date", &today.format("%Y-%m-%d").to_string())?;
            match NaiveDate::parse_from_str(&input, "%Y-%m-%d") {
                Ok(date) => return Ok(date),
                Err(_) => self.say("Dates look like 2025-05-03.")?,
            }
        }
    }

    /// Ask for the car in each finishing position and the turns it led.
    /// Start positions come from the grid.
    pub fn collect_finishers(&mut self, grid: &[GridSlot]) -> Result<Vec<Entrant>> {
        let mut entrants: Vec<Entrant> = Vec::with_capacity(grid.len());

        for finish in 1..=grid.len() as u32 {
            let slot = loop {
                let input = self.prompt(&format!("P{} car #: ", finish))?;
                let Ok(car) = input.parse::<u32>() else {
                    self.say("Enter a car number.")?;
                    continue;
                };
                if entrants.iter().any(|e| e.car_number == car) {
                    self.say(&format!("Car {} already finished.", car))?;
                    continue;
                }
                match grid.iter().find(|s| s.car_number == car) {
                    Some(slot) => break slot,
                    None => self.say(&format!("Car {} is not in this race.", car))?,
                }
            };

            let turns_led = loop {
                let input = self.prompt_with_default("  turns led", "0")?;
                match input.parse::<i32>() {
                    Ok(turns) if turns >= 0 => break turns,
                    _ => self.say("Turns led must be 0 or more.")?,
                }
            };

            entrants.push(Entrant {
                car_number: slot.car_number,
                driver: slot.driver.clone(),
                team: slot.team.clone(),
                finish,
                start: slot.start,
                turns_led,
            });
        }
        Ok(entrants)
    }
}
