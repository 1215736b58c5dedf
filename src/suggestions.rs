//! AI care suggestions.
//!
//! A prompt is interpolated from a farm or an animal and sent, together with
//! the configured persona, to a [`TextGenerator`]. The host supplies the
//! generator; this module never talks to the network itself. Any failure,
//! including an empty answer, is replaced by the configured fallback text.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::config::SuggestionConfig;
use crate::models::{Animal, Farm};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub model: String,
    pub system_instruction: String,
    pub prompt: String,
}

/// One request, one response. No streaming and no retries.
pub trait TextGenerator {
    fn generate(&self, request: &SuggestionRequest) -> Result<String, AppResponse>;
}

impl<F> TextGenerator for F
where
    F: Fn(&SuggestionRequest) -> Result<String, AppResponse>,
{
    fn generate(&self, request: &SuggestionRequest) -> Result<String, AppResponse> {
        self(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionBlock {
    Heading(String),
    Bullet(String),
    Paragraph(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub text: String,
    pub blocks: Vec<SuggestionBlock>,
    /// Set when `text` is the fallback message.
    pub is_fallback: bool,
}

pub struct SuggestionService<G> {
    generator: G,
    config: SuggestionConfig,
}

impl<G: TextGenerator> SuggestionService<G> {
    pub fn new(generator: G, config: SuggestionConfig) -> Self {
        Self { generator, config }
    }

    pub fn for_farm(&self, farm: &Farm) -> Suggestion {
        self.suggest(format!("Sugerencias para {}", farm.name), farm_prompt(farm))
    }

    pub fn for_animal(&self, animal: &Animal) -> Suggestion {
        self.suggest(format!("Sugerencias para {}", animal.tag), animal_prompt(animal))
    }

    fn suggest(&self, title: String, prompt: String) -> Suggestion {
        let request = SuggestionRequest {
            model: self.config.model.clone(),
            system_instruction: self.config.persona.clone(),
            prompt,
        };

        let outcome = match self.generator.generate(&request) {
            Ok(text) if !text.trim().is_empty() => Ok(text),
            Ok(_) => Err(AppResponse::NotFound("Empty suggestion response".to_string())),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(text) => {
                info!("Received suggestion for '{}' ({} chars)", title, text.len());
                Suggestion {
                    title,
                    blocks: format_blocks(&text),
                    text,
                    is_fallback: false,
                }
            }
            Err(e) => {
                warn!("Error requesting suggestions for '{}': {}", title, e);
                let text = self.config.fallback_message.clone();
                Suggestion {
                    title,
                    blocks: vec![SuggestionBlock::Paragraph(text.clone())],
                    text,
                    is_fallback: true,
                }
            }
        }
    }
}

pub fn farm_prompt(farm: &Farm) -> String {
    format!(
        "Proporciona sugerencias de cuidado para una finca de tipo '{}' llamada '{}', \
         ubicada en '{}'. Notas adicionales: \"{}\".",
        farm.farm_type.token(),
        farm.name,
        farm.location,
        farm.notes
    )
}

pub fn animal_prompt(animal: &Animal) -> String {
    let birth = animal
        .birth_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    format!(
        "Proporciona sugerencias de cuidado para una {} con crotal {}, nacida el {}. \
         Notas adicionales: \"{}\".",
        animal.animal_type.token(),
        animal.tag,
        birth,
        animal.notes
    )
}

/// Splits markdown-ish text into display blocks: `#` lines are headings,
/// lines starting with `*` or `- ` are bullets, everything else is a
/// paragraph. Blank lines are dropped.
///
/// A line opening with `**` is bold text, not a bullet, and stays a
/// paragraph.
pub fn format_blocks(text: &str) -> Vec<SuggestionBlock> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if let Some(rest) = line.strip_prefix('#') {
                SuggestionBlock::Heading(rest.trim_start_matches('#').trim().to_string())
            } else if let Some(rest) = bullet_text(line) {
                SuggestionBlock::Bullet(rest.trim().to_string())
            } else {
                SuggestionBlock::Paragraph(line.to_string())
            }
        })
        .collect()
}

fn bullet_text(line: &str) -> Option<&str> {
    if line.starts_with("**") {
        return None;
    }
    line.strip_prefix('*').or_else(|| line.strip_prefix("- "))
}
