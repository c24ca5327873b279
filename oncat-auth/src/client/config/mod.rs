mod settings;

pub use settings::{ConfigValue, Settings};
