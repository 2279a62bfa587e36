pub mod config;
pub mod entry;
pub mod error;
pub mod history;
pub mod output;
pub mod qualifying;
pub mod scoring;
pub mod season;
pub mod standings;

pub use error::LeagueError;
