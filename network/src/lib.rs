pub mod ego;
pub mod graph;
pub mod metrics;
pub mod snapshot;

pub use graph::{ArticleGraph, GraphError};
pub use metrics::{network_report, MetricsError, NetworkReport};
pub use snapshot::{CachePolicy, GraphStore, GraphStoreError, SnapshotError};
