pub mod config;
pub mod errors;
pub mod estimate;
pub mod language_model;

pub use config::PalmConfig;
pub use errors::{LmError, LmResult};
pub use estimate::{estimate_recipe_details, estimate_recipe_details_raw};
pub use language_model::{PalmLanguageModel, TextGenerator};
