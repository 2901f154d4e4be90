use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInput,
    NotFound,
    MissingReference,
    CacheCorruption,
    EmptyGraph,
    Internal,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::MissingReference => "MISSING_REFERENCE",
            ErrorCode::CacheCorruption => "CACHE_CORRUPTION",
            ErrorCode::EmptyGraph => "EMPTY_GRAPH",
            ErrorCode::Internal => "INTERNAL",
        };
        write!(f, "{}", s)
    }
}

pub trait TopcatsError: std::error::Error {
    fn error_code(&self) -> ErrorCode;
}
