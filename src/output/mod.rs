pub mod formatter;

pub use formatter::{
    format_grid, format_margin, format_race_result, format_standings_table, format_standings_tsv,
    format_team_results, should_use_colors,
};
