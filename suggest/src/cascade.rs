//! Two-stage retrieval: rank the category corpus, then rank the
//! selected category's articles.

use crate::rank::{rank, Scored};
use crate::request::{RequestError, SuggestRequest};
use crate::store::{CacheError, CorpusId, EmbeddingStore};
use embed::SentenceEncoder;
use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use topcats_core::error::{ErrorCode, TopcatsError};
use topcats_core::model::{ArticleMap, CategoryMap};
use tracing::info;

#[derive(Error, Debug)]
pub enum SuggestError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),
    #[error("embedding cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("encoder failure: {0}")]
    Encoder(#[source] anyhow::Error),
    #[error("category corpus is empty")]
    EmptyCorpus,
    #[error("unknown category: {name}")]
    UnknownCategory { name: String },
    #[error("unknown node reference: {id}")]
    MissingReference { id: String },
}

impl TopcatsError for SuggestError {
    fn error_code(&self) -> ErrorCode {
        match self {
            SuggestError::InvalidRequest(_) | SuggestError::EmptyCorpus => ErrorCode::InvalidInput,
            SuggestError::Cache(err) => err.error_code(),
            SuggestError::Encoder(_) => ErrorCode::Internal,
            SuggestError::UnknownCategory { .. } => ErrorCode::NotFound,
            SuggestError::MissingReference { .. } => ErrorCode::MissingReference,
        }
    }
}

/// Both shortlists plus the category the article stage ran against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionOutcome {
    pub query: String,
    pub selected_category: String,
    pub categories: Vec<Scored>,
    pub articles: Vec<Scored>,
}

/// The retrieval cascade. Everything it needs — maps, cache, both
/// encoder handles — is injected at construction.
pub struct SuggestionEngine {
    articles: Arc<ArticleMap>,
    categories: Arc<CategoryMap>,
    store: Arc<EmbeddingStore>,
    category_encoder: Arc<dyn SentenceEncoder>,
    article_encoder: Arc<dyn SentenceEncoder>,
    fingerprint: String,
}

impl SuggestionEngine {
    pub fn new(
        articles: Arc<ArticleMap>,
        categories: Arc<CategoryMap>,
        store: Arc<EmbeddingStore>,
        category_encoder: Arc<dyn SentenceEncoder>,
        article_encoder: Arc<dyn SentenceEncoder>,
        fingerprint: impl Into<String>,
    ) -> Self {
        Self {
            articles,
            categories,
            store,
            category_encoder,
            article_encoder,
            fingerprint: fingerprint.into(),
        }
    }

    /// Resolve one query through both stages. A stage either completes
    /// fully or the whole query fails; nothing is retried.
    pub async fn suggest(&self, request: &SuggestRequest) -> Result<SuggestionOutcome, SuggestError> {
        request.validate()?;
        info!("Query: {}", request.query);

        let (selected, categories) = self.category_stage(request).await?;
        let articles = self.article_stage(request, &selected).await?;

        Ok(SuggestionOutcome {
            query: request.query.clone(),
            selected_category: selected,
            categories,
            articles,
        })
    }

    async fn category_stage(
        &self,
        request: &SuggestRequest,
    ) -> Result<(String, Vec<Scored>), SuggestError> {
        let corpus = self
            .store
            .get_or_compute(
                CorpusId::Categories,
                &self.fingerprint,
                || self.categories.names().map(str::to_string).collect(),
                self.category_encoder.as_ref(),
            )
            .await?;

        let query_vec = self
            .category_encoder
            .encode(&request.query)
            .await
            .map_err(SuggestError::Encoder)?;

        let shortlist = rank(
            &corpus.sentences,
            &corpus.vectors,
            &query_vec,
            request.category_k,
        );
        let selected = shortlist
            .first()
            .cloned()
            .ok_or(SuggestError::EmptyCorpus)?;
        info!("Top category: {}", selected.text);

        Ok((selected.text, shortlist))
    }

    async fn article_stage(
        &self,
        request: &SuggestRequest,
        category: &str,
    ) -> Result<Vec<Scored>, SuggestError> {
        let members = self
            .categories
            .members(category)
            .ok_or_else(|| SuggestError::UnknownCategory {
                name: category.to_string(),
            })?;

        let mut names = members
            .iter()
            .map(|id| {
                self.articles
                    .name_of(id)
                    .map(str::to_string)
                    .ok_or_else(|| SuggestError::MissingReference { id: id.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        names.shuffle(&mut thread_rng());

        // The article corpus depends on the selected category, so its
        // embeddings are computed per query rather than cached.
        let vectors = self
            .article_encoder
            .encode_batch(&names)
            .await
            .map_err(SuggestError::Encoder)?;
        let query_vec = self
            .article_encoder
            .encode(&request.query)
            .await
            .map_err(SuggestError::Encoder)?;

        Ok(rank(&names, &vectors, &query_vec, request.article_k))
    }
}
