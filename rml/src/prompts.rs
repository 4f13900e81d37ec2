//! Prompt templates sent to the text-generation service.

/// Marker in [`PREPARATION_TIME_TEMPLATE`] replaced by the recipe name.
pub const RECIPE_NAME_PLACEHOLDER: &str = "{recipe_name}";

/// Asks for preparation time, calories and cuisine type as a list of length 3.
pub const PREPARATION_TIME_TEMPLATE: &str = include_str!("../prompts/preparation-time.md");

/// Builds the prompt estimating preparation time, calorie count and cuisine for a recipe.
///
/// The name goes in verbatim. Nothing is escaped or validated, so an empty
/// name simply leaves the substitution point blank.
pub fn build_preparation_time_prompt(recipe_name: &str) -> String {
    // The placeholder occurs once, and the name is never rescanned
    PREPARATION_TIME_TEMPLATE.replacen(RECIPE_NAME_PLACEHOLDER, recipe_name, 1)
}
