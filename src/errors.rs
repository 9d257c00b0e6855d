use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

#[derive(Debug, Clone)]
pub enum LinkcutError {
    InvalidAliasFormat(String),
    AliasAlreadyExists(String),
    GenerationExhausted(String),
    NotFound(String),
    Expired(String),
    Validation(String),
    Unauthorized(String),
    Forbidden(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Serialization(String),
    PasswordHash(String),
}

impl LinkcutError {
    pub fn code(&self) -> &'static str {
        match self {
            LinkcutError::InvalidAliasFormat(_) => "E001",
            LinkcutError::AliasAlreadyExists(_) => "E002",
            LinkcutError::GenerationExhausted(_) => "E003",
            LinkcutError::NotFound(_) => "E004",
            LinkcutError::Expired(_) => "E005",
            LinkcutError::Validation(_) => "E006",
            LinkcutError::Unauthorized(_) => "E007",
            LinkcutError::Forbidden(_) => "E008",
            LinkcutError::DatabaseConnection(_) => "E009",
            LinkcutError::DatabaseOperation(_) => "E010",
            LinkcutError::Serialization(_) => "E011",
            LinkcutError::PasswordHash(_) => "E012",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            LinkcutError::InvalidAliasFormat(_) => "Invalid Alias Format",
            LinkcutError::AliasAlreadyExists(_) => "Alias Already Exists",
            LinkcutError::GenerationExhausted(_) => "Code Generation Exhausted",
            LinkcutError::NotFound(_) => "Resource Not Found",
            LinkcutError::Expired(_) => "Link Expired",
            LinkcutError::Validation(_) => "Validation Error",
            LinkcutError::Unauthorized(_) => "Unauthorized",
            LinkcutError::Forbidden(_) => "Forbidden",
            LinkcutError::DatabaseConnection(_) => "Database Connection Error",
            LinkcutError::DatabaseOperation(_) => "Database Operation Error",
            LinkcutError::Serialization(_) => "Serialization Error",
            LinkcutError::PasswordHash(_) => "Password Hash Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LinkcutError::InvalidAliasFormat(msg)
            | LinkcutError::AliasAlreadyExists(msg)
            | LinkcutError::GenerationExhausted(msg)
            | LinkcutError::NotFound(msg)
            | LinkcutError::Expired(msg)
            | LinkcutError::Validation(msg)
            | LinkcutError::Unauthorized(msg)
            | LinkcutError::Forbidden(msg)
            | LinkcutError::DatabaseConnection(msg)
            | LinkcutError::DatabaseOperation(msg)
            | LinkcutError::Serialization(msg)
            | LinkcutError::PasswordHash(msg) => msg,
        }
    }

    /// HTTP status for the API surface. Store-layer failures surface as
    /// opaque server errors, never with driver detail.
    pub fn http_status(&self) -> StatusCode {
        match self {
            LinkcutError::InvalidAliasFormat(_)
            | LinkcutError::AliasAlreadyExists(_)
            | LinkcutError::Validation(_) => StatusCode::BAD_REQUEST,
            LinkcutError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            LinkcutError::Forbidden(_) => StatusCode::FORBIDDEN,
            LinkcutError::NotFound(_) => StatusCode::NOT_FOUND,
            LinkcutError::Expired(_) => StatusCode::GONE,
            LinkcutError::DatabaseConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
            LinkcutError::GenerationExhausted(_)
            | LinkcutError::DatabaseOperation(_)
            | LinkcutError::Serialization(_)
            | LinkcutError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkcutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkcutError {}

impl ResponseError for LinkcutError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        let detail = if self.http_status().is_server_error() {
            self.error_type().to_string()
        } else {
            self.message().to_string()
        };
        HttpResponse::build(self.http_status()).json(serde_json::json!({ "detail": detail }))
    }
}

impl LinkcutError {
    pub fn invalid_alias_format<T: Into<String>>(msg: T) -> Self {
        LinkcutError::InvalidAliasFormat(msg.into())
    }

    pub fn alias_already_exists<T: Into<String>>(msg: T) -> Self {
        LinkcutError::AliasAlreadyExists(msg.into())
    }

    pub fn generation_exhausted<T: Into<String>>(msg: T) -> Self {
        LinkcutError::GenerationExhausted(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkcutError::NotFound(msg.into())
    }

    pub fn expired<T: Into<String>>(msg: T) -> Self {
        LinkcutError::Expired(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkcutError::Validation(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        LinkcutError::Unauthorized(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        LinkcutError::Forbidden(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkcutError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkcutError::DatabaseOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkcutError::Serialization(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        LinkcutError::PasswordHash(msg.into())
    }
}

impl From<sea_orm::DbErr> for LinkcutError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkcutError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkcutError {
    fn from(err: serde_json::Error) -> Self {
        LinkcutError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for LinkcutError {
    fn from(err: chrono::ParseError) -> Self {
        LinkcutError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkcutError>;
