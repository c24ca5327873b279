mod app;
pub mod cli;
pub mod logging;
pub mod login;
pub mod prompt;
pub mod status;
pub mod terminal;

pub use app::{App, InstrumentLists};

// Always expose testing module (integration tests need it)
pub mod testing;
