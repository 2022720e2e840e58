pub mod cli;
pub mod config;
pub mod detect;
pub mod directory;
pub mod dom;
pub mod driver;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod literal;
pub mod logging;
pub mod process;
pub mod prompt;
pub mod reconcile;
pub mod rename;
pub mod scrape;
pub mod table;

pub use error::{Error, Result};
