pub mod cascade;
pub mod rank;
pub mod request;
pub mod store;
pub mod viz;

pub use cascade::{SuggestError, SuggestionEngine, SuggestionOutcome};
pub use rank::{cosine_similarity, top_k, Scored};
pub use request::{RequestError, SuggestRequest};
pub use store::{CacheError, CorpusEmbeddings, CorpusId, EmbeddingStore};
pub use viz::{EgoRenderer, TracingRenderer};
