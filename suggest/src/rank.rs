//! Cosine scoring and top-k selection over a sentence corpus.

use serde::{Deserialize, Serialize};

/// A ranked candidate paired with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scored {
    pub text: String,
    pub score: f32,
}

/// `sim(a, b) = (a . b) / (|a| * |b|)`. Zero-magnitude vectors score
/// 0.0; a dimension mismatch yields `None` and the candidate is skipped
/// by [`rank`].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Some(0.0);
    }

    Some(dot / (norm_a * norm_b))
}

/// Keep the k highest-scoring candidates, descending. The sort is
/// stable, so equal scores keep their input (corpus) order.
pub fn top_k(candidates: Vec<(String, f32)>, k: usize) -> Vec<Scored> {
    let mut scored: Vec<Scored> = candidates
        .into_iter()
        .map(|(text, score)| Scored { text, score })
        .collect();
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored
}

/// Score every corpus sentence against the query vector and keep the
/// top k.
pub fn rank(
    sentences: &[String],
    vectors: &[Vec<f32>],
    query: &[f32],
    k: usize,
) -> Vec<Scored> {
    let candidates: Vec<(String, f32)> = sentences
        .iter()
        .zip(vectors.iter())
        .filter_map(|(text, vector)| {
            cosine_similarity(query, vector).map(|score| (text.clone(), score))
        })
        .collect();
    top_k(candidates, k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_and_orthogonal_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];

        assert!((cosine_similarity(&a, &a).unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&a, &b), Some(0.0));
        assert_eq!(cosine_similarity(&a, &[0.0, 0.0, 0.0]), Some(0.0));
        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), None);
    }

    #[test]
    fn top_k_selects_the_five_best_of_twenty() {
        let candidates: Vec<(String, f32)> = (0..20)
            .map(|i| (format!("s{i}"), (i as f32) * 0.05))
            .collect();

        let top = top_k(candidates, 5);
        assert_eq!(top.len(), 5);
        let texts: Vec<&str> = top.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["s19", "s18", "s17", "s16", "s15"]);
        for pair in top.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn equal_scores_keep_corpus_order() {
        let candidates = vec![
            ("first".to_string(), 0.5),
            ("second".to_string(), 0.5),
            ("third".to_string(), 0.9),
            ("fourth".to_string(), 0.5),
        ];

        let top = top_k(candidates, 3);
        let texts: Vec<&str> = top.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["third", "first", "second"]);
    }

    #[test]
    fn k_larger_than_corpus_returns_everything() {
        let top = top_k(vec![("only".to_string(), 0.1)], 15);
        assert_eq!(top.len(), 1);
    }

    #[test]
    fn rank_skips_mismatched_vectors() {
        let sentences = vec!["good".to_string(), "broken".to_string()];
        let vectors = vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]];

        let top = rank(&sentences, &vectors, &[1.0, 0.0], 5);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].text, "good");
    }
}
