use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use thunder_league::config::LeagueConfig;
use thunder_league::qualifying::{MAX_TEAMS, MIN_TEAMS};
use thunder_league::scoring::RaceEntry;
use thunder_league::standings::Category;
use thunder_league::LeagueError;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_DATA: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_INVALID_RACE: i32 = 5;

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
enum Show {
    #[default]
    Driver,
    Owner,
    Playoff,
}

impl From<Show> for Category {
    fn from(show: Show) -> Self {
        match show {
            Show::Driver => Category::Driver,
            Show::Owner => Category::Owner,
            Show::Playoff => Category::Playoff,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record a finished race, then rebuild the standings
    Race {
        /// Race sheet YAML to read results from (interactive entry if omitted)
        #[arg(short, long)]
        sheet: Option<PathBuf>,

        /// Score and print the race without saving it
        #[arg(long)]
        dry_run: bool,

        /// Seed for the starting grid draw (interactive entry only)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Rebuild and print standings (default if no subcommand)
    Standings {
        /// Which table to print
        #[arg(long, value_enum, default_value_t = Show::Driver)]
        show: Show,

        /// Print tab-separated values instead of a table
        #[arg(long)]
        tsv: bool,
    },
    /// Draw a starting grid
    Grid {
        /// Teams racing, comma-separated (defaults to every team)
        #[arg(short, long, value_delimiter = ',')]
        teams: Vec<String>,

        /// Seed for the draw
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "thunder-league")]
#[command(about = "Tabletop racing league scoring and standings", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/thunder-league/league.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory holding season data (defaults to the platform data directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("thunder_league=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let start_time = Instant::now();
    let command = cli.command.unwrap_or(Commands::Standings {
        show: Show::default(),
        tsv: false,
    });

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match thunder_league::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate league config at startup
    if let Err(errors) = thunder_league::config::validate_league(&config) {
        eprintln!("League config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let data_dir = match cli.data_dir.map_or_else(thunder_league::config::get_data_dir, Ok) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    let season_dir = thunder_league::history::season_dir(&data_dir, config.season);

    debug!(
        season = config.season,
        teams = config.teams.len(),
        drivers = config.drivers.len(),
        data = %season_dir.display(),
        "loaded league"
    );

    let result = match command {
        Commands::Race {
            sheet,
            dry_run,
            seed,
        } => run_race(&config, &season_dir, sheet, dry_run, seed),
        Commands::Standings { show, tsv } => run_standings(&config, &season_dir, show.into(), tsv),
        Commands::Grid { teams, seed } => run_grid(&config, &season_dir, &teams, seed),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }

    debug!(elapsed = ?start_time.elapsed(), "done");
    std::process::exit(EXIT_SUCCESS);
}

fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<LeagueError>() {
        Some(LeagueError::Validation { .. }) => EXIT_INVALID_RACE,
        Some(LeagueError::Configuration { .. }) => EXIT_CONFIG,
        Some(LeagueError::Consistency { .. }) | None => EXIT_DATA,
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn run_race(
    config: &LeagueConfig,
    season_dir: &Path,
    sheet: Option<PathBuf>,
    dry_run: bool,
    seed: Option<u64>,
) -> Result<()> {
    let use_colors = thunder_league::output::should_use_colors();
    let mut history = thunder_league::history::load_history(season_dir, config.season)?;
    let race_num = history.next_race_num();
    let today = chrono::Local::now().date_naive();

    let entry = match sheet {
        Some(path) => thunder_league::entry::load_sheet(&path)?.into_entry(config, race_num, today)?,
        None => {
            let stdin = io::stdin();
            let mut prompter = thunder_league::entry::Prompter::new(stdin.lock(), io::stdout());
            println!("Race {} of season {}", race_num, config.season);

            let teams = prompter.select_teams(config)?;
            let teams: Vec<&str> = teams.iter().map(String::as_str).collect();
            let mut rng = seeded_rng(seed);
            let qualifiers = thunder_league::qualifying::qualifying_sequence(&history, &mut rng);
            let grid = thunder_league::qualifying::starting_grid(
                &teams,
                &config.drivers,
                &qualifiers,
                &mut rng,
            );
            println!("{}", thunder_league::output::format_grid(&grid, use_colors));

            let track_id = prompter.select_track(config)?;
            let date = prompter.select_date(today)?;
            let entrants = prompter.collect_finishers(&grid)?;
            RaceEntry {
                race_num,
                track_id,
                date,
                entrants,
            }
        }
    };

    let result = thunder_league::season::record_race(
        season_dir,
        &mut history,
        &entry,
        &config.points,
        dry_run,
    )?;
    println!(
        "{}",
        thunder_league::output::format_race_result(&result, use_colors)
    );

    if dry_run {
        println!("Dry run: race {} not saved.", result.race_num);
        return Ok(());
    }

    let report = thunder_league::season::rebuild_standings(season_dir, &history, &config.ownership())?;
    for (category, error) in report.failures() {
        eprintln!("{} standings not updated: {}", category, error);
    }
    Ok(())
}

fn run_standings(config: &LeagueConfig, season_dir: &Path, category: Category, tsv: bool) -> Result<()> {
    let history = thunder_league::history::load_history(season_dir, config.season)?;
    let report = thunder_league::season::rebuild_standings(season_dir, &history, &config.ownership())?;

    for (failed, error) in report.failures() {
        if failed != category {
            eprintln!("{} standings not updated: {}", failed, error);
        }
    }

    let rows = report.standings.get(category).clone()?;
    if tsv {
        println!("{}", thunder_league::output::format_standings_tsv(&rows));
    } else {
        let use_colors = thunder_league::output::should_use_colors();
        println!(
            "{}",
            thunder_league::output::format_standings_table(&rows, category, use_colors)
        );
    }
    Ok(())
}

fn run_grid(config: &LeagueConfig, season_dir: &Path, teams: &[String], seed: Option<u64>) -> Result<()> {
    for team in teams {
        if !config.teams.contains_key(team) {
            anyhow::bail!("Unknown team '{}'", team);
        }
    }

    // Pole order, restricted to the requested teams
    let racing: Vec<&str> = config
        .teams_in_pole_order()
        .into_iter()
        .filter(|t| teams.is_empty() || teams.iter().any(|r| r == t))
        .collect();
    if !(MIN_TEAMS..=MAX_TEAMS).contains(&racing.len()) {
        anyhow::bail!(
            "A race needs between {} and {} teams, got {}",
            MIN_TEAMS,
            MAX_TEAMS,
            racing.len()
        );
    }

    let history = thunder_league::history::load_history(season_dir, config.season)
        .context("Failed to load race history for qualifying")?;
    let mut rng = seeded_rng(seed);
    let qualifiers = thunder_league::qualifying::qualifying_sequence(&history, &mut rng);
    let grid = thunder_league::qualifying::starting_grid(&racing, &config.drivers, &qualifiers, &mut rng);

    let use_colors = thunder_league::output::should_use_colors();
    println!("{}", thunder_league::output::format_grid(&grid, use_colors));
    Ok(())
}
