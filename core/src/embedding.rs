use sha2::{Digest, Sha256};

/// Deterministic feature-hash sentence embedding.
///
/// Each token is hashed into one of `dims` buckets with a model-salted
/// SHA-256 digest; the digest also picks the sign of the contribution.
/// The result is L2-normalized, so related strings that share tokens get
/// a positive cosine similarity while unrelated strings stay near zero.
/// Stands in for a fine-tuned sentence-transformer served elsewhere.
pub fn feature_embedding(text: &str, model_id: &str, dims: usize) -> Vec<f32> {
    let dims = dims.max(1);
    let mut out = vec![0.0f32; dims];

    for token in tokenize(text) {
        let mut hasher = Sha256::new();
        hasher.update(model_id.as_bytes());
        hasher.update(b"\0");
        hasher.update(token.as_bytes());
        let digest = hasher.finalize();

        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        let bucket = (u64::from_le_bytes(prefix) % dims as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        out[bucket] += sign;
    }

    let norm: f32 = out.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut out {
            *v /= norm;
        }
    }

    out
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn feature_embedding_is_reproducible_for_same_inputs() {
        let a = feature_embedding("Usability engineering", "category-suggest", 64);
        let b = feature_embedding("Usability engineering", "category-suggest", 64);
        assert_eq!(a, b);
    }

    #[test]
    fn feature_embedding_changes_when_model_changes() {
        let a = feature_embedding("Usability", "category-suggest", 64);
        let b = feature_embedding("Usability", "article-suggest", 64);
        assert_ne!(a, b);
    }

    #[test]
    fn shared_tokens_produce_positive_similarity() {
        let a = feature_embedding("Usability engineering", "category-suggest", 256);
        let b = feature_embedding("Usability", "category-suggest", 256);
        let c = feature_embedding("Volcanology", "category-suggest", 256);

        assert!(dot(&a, &b) > dot(&a, &c));
        assert!(dot(&a, &b) > 0.0);
    }

    #[test]
    fn output_is_unit_length_or_zero() {
        let v = feature_embedding("graph theory", "category-suggest", 128);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);

        let empty = feature_embedding("...", "category-suggest", 128);
        assert!(empty.iter().all(|x| *x == 0.0));
    }
}
