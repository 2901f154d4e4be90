//! High-level facade over the whole pipeline: load the corpus files,
//! build or restore the graph, wire the encoder registry into the
//! retrieval cascade, and expose metrics, suggestions, and ego-network
//! visualization in one place.

use corpus::{read_article_map, read_category_map, source_fingerprint, CorpusError};
use embed::{EncoderRegistry, HashEncoder, RegistryError, SentenceEncoder};
use network::ego::{article_ego, category_ego};
use network::graph::{ArticleGraph, GraphError};
use network::metrics::{network_report, MetricsError, NetworkReport};
use network::snapshot::{CachePolicy, GraphStore, GraphStoreError};
use std::sync::Arc;
use suggest::cascade::{SuggestError, SuggestionEngine, SuggestionOutcome};
use suggest::request::SuggestRequest;
use suggest::store::EmbeddingStore;
use suggest::viz::{EgoRenderer, TracingRenderer};
use thiserror::Error;
use topcats_core::config::{AppConfig, ModelConfig};
use topcats_core::error::{ErrorCode, TopcatsError};
use topcats_core::model::{ArticleMap, CategoryMap};

const GRAPH_SNAPSHOT_FILE: &str = "wikipedia-network.bin";
const MODEL_VERSION: &str = "1.0.0";

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("corpus error: {0}")]
    Corpus(#[from] CorpusError),
    #[error("graph store error: {0}")]
    GraphStore(#[from] GraphStoreError),
    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),
    #[error("suggestion error: {0}")]
    Suggest(#[from] SuggestError),
    #[error("lookup error: {0}")]
    Lookup(#[from] GraphError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl TopcatsError for ExplorerError {
    fn error_code(&self) -> ErrorCode {
        match self {
            ExplorerError::Corpus(err) => err.error_code(),
            ExplorerError::GraphStore(err) => err.error_code(),
            ExplorerError::Metrics(err) => err.error_code(),
            ExplorerError::Suggest(err) => err.error_code(),
            ExplorerError::Lookup(err) => err.error_code(),
            ExplorerError::Registry(RegistryError::VersionAlreadyExists { .. }) => {
                ErrorCode::InvalidInput
            }
            ExplorerError::Registry(_) => ErrorCode::NotFound,
        }
    }
}

pub struct Explorer {
    articles: Arc<ArticleMap>,
    categories: Arc<CategoryMap>,
    graph: ArticleGraph,
    engine: SuggestionEngine,
    renderer: Box<dyn EgoRenderer>,
}

impl Explorer {
    /// Open with the default hash encoders and the logging renderer.
    pub async fn open(config: &AppConfig) -> Result<Self, ExplorerError> {
        let registry = default_registry(&config.models)?;
        let category = registry.resolve(&config.models.category_model)?;
        let article = registry.resolve(&config.models.article_model)?;
        Self::open_with(
            config,
            category.encoder,
            article.encoder,
            Box::new(TracingRenderer),
        )
        .await
    }

    /// Open with explicit encoder handles and renderer. Nothing here is
    /// ambient state; swapping a model means passing a different handle.
    pub async fn open_with(
        config: &AppConfig,
        category_encoder: Arc<dyn SentenceEncoder>,
        article_encoder: Arc<dyn SentenceEncoder>,
        renderer: Box<dyn EgoRenderer>,
    ) -> Result<Self, ExplorerError> {
        let articles = Arc::new(read_article_map(&config.data.article_map)?);
        let categories = Arc::new(read_category_map(&config.data.category_map)?);
        let fingerprint = source_fingerprint(
            &config.data.article_map,
            &config.data.category_map,
            &config.data.edge_list,
        )?;

        let policy = if config.cache.verify_fingerprint {
            CachePolicy::VerifyFingerprint
        } else {
            CachePolicy::TrustExisting
        };

        let graph_store = GraphStore::new(config.cache.dir.join(GRAPH_SNAPSHOT_FILE), policy);
        let graph = graph_store
            .build_or_load(&config.data.edge_list, &articles, &categories, &fingerprint)
            .await?;

        let store = Arc::new(EmbeddingStore::new(&config.cache.dir, policy));
        let engine = SuggestionEngine::new(
            articles.clone(),
            categories.clone(),
            store,
            category_encoder,
            article_encoder,
            fingerprint,
        );

        Ok(Self {
            articles,
            categories,
            graph,
            engine,
            renderer,
        })
    }

    pub fn graph(&self) -> &ArticleGraph {
        &self.graph
    }

    pub fn network_report(&self, category: Option<&str>) -> Result<NetworkReport, ExplorerError> {
        Ok(network_report(&self.graph, &self.categories, category)?)
    }

    /// Run the two-stage cascade and render the result as an ego
    /// network: the query at the center, the suggested articles as
    /// spokes, the selected category as the annotation.
    pub async fn suggest(&self, query: &str) -> Result<SuggestionOutcome, ExplorerError> {
        self.suggest_request(&SuggestRequest::new(query)).await
    }

    pub async fn suggest_request(
        &self,
        request: &SuggestRequest,
    ) -> Result<SuggestionOutcome, ExplorerError> {
        let outcome = self.engine.suggest(request).await?;

        let spokes: Vec<String> = outcome
            .articles
            .iter()
            .map(|scored| scored.text.clone())
            .collect();
        self.renderer
            .render_ego_network(&outcome.query, &spokes, &outcome.selected_category);

        Ok(outcome)
    }

    /// Render an article's ego network. An unknown name comes back as a
    /// `NOT_FOUND` lookup error the caller may report and move past.
    pub fn visualize_article(&self, name: &str) -> Result<(), ExplorerError> {
        let ego = article_ego(&self.graph, &self.articles, name)?;
        self.renderer
            .render_ego_network(&ego.center, &ego.neighbors, &ego.annotation);
        Ok(())
    }

    pub fn visualize_category(&self, name: &str) -> Result<(), ExplorerError> {
        let ego = category_ego(&self.categories, &self.articles, name)?;
        self.renderer
            .render_ego_network(&ego.center, &ego.neighbors, &ego.annotation);
        Ok(())
    }
}

fn default_registry(models: &ModelConfig) -> Result<EncoderRegistry, RegistryError> {
    let mut registry = EncoderRegistry::new();
    registry.register(
        models.category_model.as_str(),
        MODEL_VERSION,
        Arc::new(HashEncoder::new(
            models.category_model.as_str(),
            models.dimension,
        )),
    )?;
    registry.register(
        models.article_model.as_str(),
        MODEL_VERSION,
        Arc::new(HashEncoder::new(
            models.article_model.as_str(),
            models.dimension,
        )),
    )?;
    Ok(registry)
}
