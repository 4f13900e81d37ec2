use rml::RecipeDetailsError;

pub type LmResult<T> = std::result::Result<T, LmError>;

#[derive(thiserror::Error, Debug)]
pub enum LmError {
    #[error("Request to language model failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Language model returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("No response from language model (filters: {filters:?})")]
    NoCandidates { filters: Vec<String> },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Could not read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Malformed recipe details: {0}")]
    Details(#[from] RecipeDetailsError),
}

impl LmError {
    /// Whether sending the same request again might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            LmError::Http(err) => !(err.is_builder() || err.is_decode() || err.is_redirect()),
            LmError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
