use std::collections::{BTreeMap, BTreeSet};

use super::types::{RelativeFinish, ScoredEntrant, TeamResult};

/// Build the per-team summary of a scored race.
///
/// Teams are ordered by total points (bonus included), then by name.
/// `results` must already be in finishing order.
pub fn summarize_teams(results: &[ScoredEntrant], leaders: &BTreeSet<&str>) -> Vec<TeamResult> {
    let mut by_team: BTreeMap<&str, Vec<&ScoredEntrant>> = BTreeMap::new();
    for r in results {
        by_team.entry(r.entrant.team.as_str()).or_default().push(r);
    }

    let mut teams: Vec<TeamResult> = by_team
        .into_iter()
        .map(|(team, members)| {
            let drivers = members.len() as u32;
            let finish_sum: u32 = members.iter().map(|m| m.entrant.finish).sum();
            let avg_finish = (f64::from(finish_sum) / f64::from(drivers) * 100.0).round() / 100.0;

            TeamResult {
                position: 0,
                team: team.to_string(),
                total_points: members.iter().map(|m| m.points.race_total()).sum(),
                turns_led: members.iter().map(|m| m.points.turns_led).sum(),
                led_most_turns: leaders.contains(team),
                avg_finish,
                drivers,
                relative_finishes: members
                    .iter()
                    .map(|m| RelativeFinish {
                        driver: m.entrant.driver.clone(),
                        rank: m.relative_finish,
                    })
                    .collect(),
            }
        })
        .collect();

    teams.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| a.team.cmp(&b.team))
    });
    for (idx, team) in teams.iter_mut().enumerate() {
        team.position = idx as u32 + 1;
    }

    teams
}
