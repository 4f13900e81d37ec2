use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_RANDOMNESS: f32 = 0.7;
pub const DEFAULT_MAX_RESPONSE_LENGTH: u32 = 1000;

/// One prompt plus the sampling parameters it is sent with.
///
/// Nothing here is validated: a randomness outside what the service accepts
/// is passed through and left for the service to reject or clamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub randomness: f32,
    pub max_response_length: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            randomness: DEFAULT_RANDOMNESS,
            max_response_length: DEFAULT_MAX_RESPONSE_LENGTH,
        }
    }

    pub fn with_randomness(mut self, randomness: f32) -> Self {
        self.randomness = randomness;
        self
    }

    pub fn with_max_response_length(mut self, max_response_length: u32) -> Self {
        self.max_response_length = max_response_length;
        self
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecipeDetailsError {
    #[error("No list found in response")]
    MissingList,
    #[error("Expected a list of 3 items, found {found}")]
    WrongLength { found: usize },
    #[error("Invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Cuisine type is empty")]
    EmptyCuisine,
}

/// What the preparation time prompt asks for, once parsed out of the reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDetails {
    pub preparation_minutes: u32,
    pub calories: u32,
    pub cuisine: String,
}

impl RecipeDetails {
    /// Parse a reply shaped like `[30, 450, 'Italian']`.
    ///
    /// Prose or code fences around the list are ignored. Items may be bare or
    /// quoted with either quote style, and numbers may carry a unit suffix
    /// such as `"45 minutes"`.
    pub fn parse(response: &str) -> Result<Self, RecipeDetailsError> {
        let start = response.find('[').ok_or(RecipeDetailsError::MissingList)?;
        let end = start
            + response[start..]
                .rfind(']')
                .ok_or(RecipeDetailsError::MissingList)?;
        let items = split_items(&response[start + 1..end]);
        let [minutes, calories, cuisine] = <[String; 3]>::try_from(items)
            .map_err(|items| RecipeDetailsError::WrongLength { found: items.len() })?;
        if cuisine.is_empty() {
            return Err(RecipeDetailsError::EmptyCuisine);
        }
        Ok(Self {
            preparation_minutes: parse_number("preparation time", &minutes)?,
            calories: parse_number("calorie count", &calories)?,
            cuisine,
        })
    }
}

impl FromStr for RecipeDetails {
    type Err = RecipeDetailsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RecipeDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} min, {} kcal, {}",
            self.preparation_minutes, self.calories, self.cuisine
        )
    }
}

/// Split list contents on commas outside quotes, trimming whitespace and quotes.
///
/// A quote only opens at the start of an item and only closes right before a
/// comma or the end, so apostrophes inside words are kept.
fn split_items(inner: &str) -> Vec<String> {
    let mut items = vec![];
    let mut current = String::new();
    let mut quoted = false;
    let mut quote = None;
    for (i, c) in inner.char_indices() {
        match (quote, c) {
            (None, '\'' | '"') if current.trim().is_empty() && !quoted => {
                current.clear();
                quote = Some(c);
                quoted = true;
            }
            (Some(q), _) if q == c && ends_item(&inner[i + c.len_utf8()..]) => quote = None,
            (None, ',') => {
                items.push(current.trim().to_string());
                current.clear();
                quoted = false;
            }
            _ => current.push(c),
        }
    }
    // A bare empty tail is a trailing comma, or the whole of `[]`
    if quoted || !current.trim().is_empty() {
        items.push(current.trim().to_string());
    }
    items
}

fn ends_item(rest: &str) -> bool {
    let rest = rest.trim_start();
    rest.is_empty() || rest.starts_with(',')
}

/// Read the leading number of an item. A unit may follow after a space
/// (`"45 minutes"`), but anything glued to the digits (`"1e3"`, `"1.2k"`) is rejected.
fn parse_number(field: &'static str, value: &str) -> Result<u32, RecipeDetailsError> {
    let invalid = || RecipeDetailsError::InvalidNumber {
        field,
        value: value.to_string(),
    };
    let prefix_len = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (numeric_prefix, rest) = value.split_at(prefix_len);
    if rest.starts_with(|c: char| c.is_alphanumeric()) {
        return Err(invalid());
    }
    let number: f64 = numeric_prefix.parse().map_err(|_| invalid())?;
    let rounded = number.round();
    if rounded > f64::from(u32::MAX) {
        return Err(invalid());
    }
    Ok(rounded as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = GenerationRequest::new("Hello");
        assert_eq!(request.prompt, "Hello");
        assert_eq!(request.randomness, 0.7);
        assert_eq!(request.max_response_length, 1000);
    }

    #[test]
    fn test_request_overrides_are_kept_unclamped() {
        let request = GenerationRequest::new("Hello")
            .with_randomness(3.5)
            .with_max_response_length(12);
        assert_eq!(request.randomness, 3.5);
        assert_eq!(request.max_response_length, 12);
    }

    #[test]
    fn test_parse_python_list() {
        let details = RecipeDetails::parse("[30, 450, 'Italian']").unwrap();
        assert_eq!(
            details,
            RecipeDetails {
                preparation_minutes: 30,
                calories: 450,
                cuisine: "Italian".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_with_fences_and_prose() {
        let response = "Sure! Here it is:\n```python\n[\"45 minutes\", \"620\", \"Indian\"]\n```\n";
        let details: RecipeDetails = response.parse().unwrap();
        assert_eq!(details.preparation_minutes, 45);
        assert_eq!(details.calories, 620);
        assert_eq!(details.cuisine, "Indian");
    }

    #[test]
    fn test_parse_quoted_comma_and_trailing_comma() {
        let details = RecipeDetails::parse("[20, 300.6, 'Thai, street food',]").unwrap();
        assert_eq!(details.preparation_minutes, 20);
        assert_eq!(details.calories, 301);
        assert_eq!(details.cuisine, "Thai, street food");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            RecipeDetails::parse("About 30 minutes."),
            Err(RecipeDetailsError::MissingList)
        );
        assert_eq!(
            RecipeDetails::parse("[30, 'Italian']"),
            Err(RecipeDetailsError::WrongLength { found: 2 })
        );
        assert_eq!(
            RecipeDetails::parse("[]"),
            Err(RecipeDetailsError::WrongLength { found: 0 })
        );
        assert_eq!(
            RecipeDetails::parse("[about 30, 450, 'Italian']"),
            Err(RecipeDetailsError::InvalidNumber {
                field: "preparation time",
                value: "about 30".to_string(),
            })
        );
        assert_eq!(
            RecipeDetails::parse("[30, 1,200, 'Italian']"),
            Err(RecipeDetailsError::WrongLength { found: 4 })
        );
        assert_eq!(
            RecipeDetails::parse("[30, 450, '  ']"),
            Err(RecipeDetailsError::EmptyCuisine)
        );
    }

    #[test]
    fn test_parse_apostrophe_in_bare_item() {
        let details = RecipeDetails::parse("[30, 450, Shepherd's pie]").unwrap();
        assert_eq!(details.cuisine, "Shepherd's pie");

        let details = RecipeDetails::parse("[30, 450, 'Shepherd's pie']").unwrap();
        assert_eq!(details.cuisine, "Shepherd's pie");

        let details = RecipeDetails::parse("[30 (it's quick), 450, Italian]").unwrap();
        assert_eq!(details.preparation_minutes, 30);
        assert_eq!(details.calories, 450);
        assert_eq!(details.cuisine, "Italian");
    }

    #[test]
    fn test_parse_rejects_glued_suffix() {
        assert_eq!(
            RecipeDetails::parse("[1e3, 450, Italian]"),
            Err(RecipeDetailsError::InvalidNumber {
                field: "preparation time",
                value: "1e3".to_string(),
            })
        );
        assert_eq!(
            RecipeDetails::parse("[30, 1.2k, Italian]"),
            Err(RecipeDetailsError::InvalidNumber {
                field: "calorie count",
                value: "1.2k".to_string(),
            })
        );
        let details = RecipeDetails::parse("[30 min, 450 kcal, Italian]").unwrap();
        assert_eq!(details.preparation_minutes, 30);
        assert_eq!(details.calories, 450);
    }

    #[test]
    fn test_display() {
        let details = RecipeDetails::parse("[30, 450, 'Italian']").unwrap();
        assert_eq!(details.to_string(), "30 min, 450 kcal, Italian");
    }
}
