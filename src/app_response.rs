use std::fmt::{Display, Formatter};

use lmdb::Error as LmdbError;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

/// Outcome of every fallible notebook operation.
///
/// The same enum travels across the C ABI as JSON, so the variants stay
/// plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppResponse {
    DatabaseError(String),
    SerializationError(String),
    NotFound(String),
    ValidationError(String),
    BadRequest(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl std::error::Error for AppResponse {}

impl From<LmdbError> for AppResponse {
    fn from(err: LmdbError) -> Self {
        match err {
            LmdbError::NotFound => AppResponse::NotFound("Key not found".to_string()),
            LmdbError::MapFull => {
                AppResponse::DatabaseError("Map size exhausted, raise map_size".to_string())
            }
            LmdbError::Corrupted => AppResponse::DatabaseError("Database is corrupted".to_string()),
            LmdbError::Other(code) => {
                AppResponse::DatabaseError(format!("IO error (code {})", code))
            }
            _ => AppResponse::DatabaseError(format!("Database error: {:?}", err)),
        }
    }
}

impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<std::io::Error> for AppResponse {
    fn from(err: std::io::Error) -> Self {
        AppResponse::DatabaseError(format!("IO error: {}", err))
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppResponse::ValidationError(msg.into())
    }

    /// Text shown to the user, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            AppResponse::DatabaseError(msg)
            | AppResponse::SerializationError(msg)
            | AppResponse::NotFound(msg)
            | AppResponse::ValidationError(msg)
            | AppResponse::BadRequest(msg)
            | AppResponse::Ok(msg) => msg,
        }
    }
}
