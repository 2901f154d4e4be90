use serde::{Deserialize, Serialize};
use thiserror::Error;
use topcats_core::error::{ErrorCode, TopcatsError};

const DEFAULT_CATEGORY_K: usize = 5;
const DEFAULT_ARTICLE_K: usize = 15;
const MAX_TOP_K: usize = 1_000;

/// One retrieval query. The shortlist sizes default to the standard
/// five categories and fifteen articles.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SuggestRequest {
    pub query: String,
    #[serde(default = "default_category_k")]
    pub category_k: usize,
    #[serde(default = "default_article_k")]
    pub article_k: usize,
}

const fn default_category_k() -> usize {
    DEFAULT_CATEGORY_K
}

const fn default_article_k() -> usize {
    DEFAULT_ARTICLE_K
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("shortlist size must be between 1 and {0}")]
    InvalidTopK(usize),
}

impl TopcatsError for RequestError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvalidInput
    }
}

impl SuggestRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category_k: DEFAULT_CATEGORY_K,
            article_k: DEFAULT_ARTICLE_K,
        }
    }

    pub fn parse_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        if self.query.trim().is_empty() {
            return Err(RequestError::EmptyQuery);
        }
        for k in [self.category_k, self.article_k] {
            if k == 0 || k > MAX_TOP_K {
                return Err(RequestError::InvalidTopK(MAX_TOP_K));
            }
        }
        Ok(())
    }
}
