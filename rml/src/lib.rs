pub mod basic_models;
pub mod prompts;

pub use basic_models::{GenerationRequest, RecipeDetails, RecipeDetailsError};
pub use prompts::build_preparation_time_prompt;
