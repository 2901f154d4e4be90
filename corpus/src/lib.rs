pub mod fingerprint;
pub mod loader;
pub mod pairs;

pub use fingerprint::source_fingerprint;
pub use loader::{read_article_map, read_category_map, read_edge_list, CorpusError};
