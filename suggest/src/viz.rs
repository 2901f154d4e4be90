use tracing::info;

/// Draws an ego network: a center, its spokes, and one annotation box.
/// Fire-and-forget; rendering failures are the backend's problem.
pub trait EgoRenderer: Send + Sync {
    fn render_ego_network(&self, center: &str, neighbors: &[String], annotation: &str);
}

/// Renders the layout as log events. A plotting backend implements the
/// same interface out of tree.
#[derive(Debug, Default)]
pub struct TracingRenderer;

impl EgoRenderer for TracingRenderer {
    fn render_ego_network(&self, center: &str, neighbors: &[String], annotation: &str) {
        info!("[{}] ego network of {}", annotation, center);
        for neighbor in neighbors {
            info!("  {} -> {}", center, neighbor);
        }
    }
}
