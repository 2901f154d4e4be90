use async_trait::async_trait;
use topcats_core::embedding::feature_embedding;

/// A sentence-embedding model behind an `encode` interface.
///
/// Inference may be long-running; it is neither cancellable nor retried.
/// Handles are injected where they are used — nothing loads a model as
/// process-wide ambient state.
#[async_trait]
pub trait SentenceEncoder: Send + Sync {
    async fn encode(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    async fn encode_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.encode(text).await?);
        }
        Ok(out)
    }

    fn model_id(&self) -> &str;

    fn dimension(&self) -> usize;
}

/// Deterministic feature-hash encoder, salted by model id so the
/// category and article models embed the same text differently.
pub struct HashEncoder {
    model_id: String,
    dims: usize,
}

impl HashEncoder {
    pub fn new(model_id: impl Into<String>, dims: usize) -> Self {
        Self {
            model_id: model_id.into(),
            dims: dims.max(1),
        }
    }
}

#[async_trait]
impl SentenceEncoder for HashEncoder {
    async fn encode(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(feature_embedding(text, &self.model_id, self.dims))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dims
    }
}
