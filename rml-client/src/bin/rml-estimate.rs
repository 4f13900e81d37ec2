use anyhow::{Context, Result};
use clap::Parser;
use rml::basic_models::{DEFAULT_MAX_RESPONSE_LENGTH, DEFAULT_RANDOMNESS};
use rml::{build_preparation_time_prompt, GenerationRequest, RecipeDetails};
use rml_client::{PalmConfig, PalmLanguageModel, TextGenerator};
use tracing_subscriber::EnvFilter;

/// Estimate preparation time, calories and cuisine of a recipe with a language model
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// The name of the recipe
    name: String,
    /// Sampling temperature sent to the model
    #[arg(long, default_value_t = DEFAULT_RANDOMNESS)]
    randomness: f32,
    /// Maximum number of tokens in the reply
    #[arg(long, default_value_t = DEFAULT_MAX_RESPONSE_LENGTH)]
    max_response_length: u32,
    /// Print the model's reply as-is instead of parsing it
    #[arg(long)]
    raw: bool,
    /// YAML configuration file. Without it, PALM_API_KEY and friends are read from the environment.
    #[arg(long)]
    config: Option<String>,
    /// Language model API base URL
    #[arg(long)]
    api_base: Option<String>,
    /// Model name, e.g. models/text-bison-001
    #[arg(long)]
    model: Option<String>,
    /// Retries after transient failures
    #[arg(long)]
    retries: Option<usize>,
}

/// Command line flags win over whatever the file or environment said.
fn apply_overrides(args: &Args, mut config: PalmConfig) -> PalmConfig {
    if let Some(api_base) = &args.api_base {
        config = config.with_api_base(api_base.as_str());
    }
    if let Some(model) = &args.model {
        config = config.with_model(model.as_str());
    }
    if let Some(retries) = args.retries {
        config = config.with_max_retries(retries);
    }
    config
}

fn build_request(args: &Args) -> GenerationRequest {
    GenerationRequest::new(build_preparation_time_prompt(&args.name))
        .with_randomness(args.randomness)
        .with_max_response_length(args.max_response_length)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PalmConfig::load(path).with_context(|| format!("Loading {path}"))?,
        None => PalmConfig::from_env().context("Reading configuration from environment")?,
    };
    let config = apply_overrides(&args, config);
    tracing::debug!("Config: {:?}", config);
    let model = PalmLanguageModel::new(config);

    let text = model.generate(&build_request(&args)).await?;

    if args.raw {
        println!("{text}");
        return Ok(());
    }
    let details = RecipeDetails::parse(&text)
        .with_context(|| format!("Unexpected reply from language model: {text:?}"))?;
    println!("{}", serde_json::to_string_pretty(&details)?);
    Ok(())
}
