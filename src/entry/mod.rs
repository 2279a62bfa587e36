pub mod prompt;
pub mod sheet;

pub use prompt::Prompter;
pub use sheet::{load_sheet, RaceSheet, SheetResult};
