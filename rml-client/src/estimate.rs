use rml::{build_preparation_time_prompt, GenerationRequest, RecipeDetails};

use crate::errors::LmResult;
use crate::language_model::TextGenerator;

/// Asks the model for preparation time, calories and cuisine, returning its reply untouched.
pub async fn estimate_recipe_details_raw<G: TextGenerator + ?Sized>(
    model: &G,
    recipe_name: &str,
) -> LmResult<String> {
    tracing::info!("Estimating details of {} ..", recipe_name);
    let prompt = build_preparation_time_prompt(recipe_name);
    model.generate(&GenerationRequest::new(prompt)).await
}

/// Like [`estimate_recipe_details_raw`], then parses the reply.
pub async fn estimate_recipe_details<G: TextGenerator + ?Sized>(
    model: &G,
    recipe_name: &str,
) -> LmResult<RecipeDetails> {
    let text = estimate_recipe_details_raw(model, recipe_name).await?;
    tracing::debug!("Estimate: {}", text);
    Ok(RecipeDetails::parse(&text)?)
}
