//! Notebook configuration.
//!
//! Loaded from a JSON file or string supplied by the host, layered over the
//! defaults. Every field is optional, nested ones included.

use std::path::{Path, PathBuf};

use figment::providers::{Format, Json, Serialized};
use figment::Figment;
use log::info;
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;

pub const DEFAULT_DB_PATH: &str = "field_notebook.lmdb";
pub const DEFAULT_MAP_SIZE: usize = 64 * 1024 * 1024;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_PERSONA: &str = "Eres un experto agrónomo y veterinario. \
Proporciona consejos prácticos y concisos en español para agricultores y ganaderos. \
Formatea tu respuesta en Markdown.";
pub const DEFAULT_FALLBACK: &str = "No se pudieron obtener sugerencias en este momento. \
Por favor, inténtalo de nuevo más tarde.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotebookConfig {
    /// Directory of the LMDB environment.
    pub db_path: PathBuf,
    /// LMDB map size in bytes. Photos are stored inline, so keep it generous.
    pub map_size: usize,
    pub suggestions: SuggestionConfig,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            map_size: DEFAULT_MAP_SIZE,
            suggestions: SuggestionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuggestionConfig {
    pub model: String,
    /// System instruction sent with every prompt.
    pub persona: String,
    /// Shown in place of suggestions when the request fails.
    pub fallback_message: String,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            persona: DEFAULT_PERSONA.to_string(),
            fallback_message: DEFAULT_FALLBACK.to_string(),
        }
    }
}

impl NotebookConfig {
    pub fn from_json_str(json: &str) -> Result<Self, AppResponse> {
        Self::extract(Self::defaults().merge(Json::string(json)))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AppResponse> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AppResponse::BadRequest(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = Self::extract(Self::defaults().merge(Json::file(path)))?;
        info!("Loaded notebook config from {}", path.display());
        Ok(config)
    }

    fn defaults() -> Figment {
        Figment::from(Serialized::defaults(NotebookConfig::default()))
    }

    fn extract(figment: Figment) -> Result<Self, AppResponse> {
        let config: NotebookConfig = figment
            .extract()
            .map_err(|e| AppResponse::SerializationError(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Same config, with the LMDB environment placed at `db_path`.
    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }

    fn validate(&self) -> Result<(), AppResponse> {
        if self.db_path.as_os_str().is_empty() {
            return Err(AppResponse::BadRequest("dbPath must not be empty".to_string()));
        }
        if self.map_size == 0 {
            return Err(AppResponse::BadRequest("mapSize must be positive".to_string()));
        }
        if self.suggestions.fallback_message.trim().is_empty() {
            return Err(AppResponse::BadRequest(
                "suggestions.fallbackMessage must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
