use crate::error::{RagError, Result};
use crate::models::IndexEntry;

/// A retrieved entry with its similarity to the query vector.
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub entry: IndexEntry,
    /// Cosine similarity, higher is more similar.
    pub similarity: f32,
}

/// In-memory vector index with cosine-similarity retrieval.
///
/// Built once per document set; never updated incrementally. All stored
/// vectors share one dimensionality, enforced at build time so that a
/// query can never silently compare across embedding spaces.
#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimension: usize,
}

impl VectorIndex {
    /// Build an index from entries. Fails on an empty entry set and on
    /// mixed embedding dimensions.
    pub fn build(entries: Vec<IndexEntry>) -> Result<Self> {
        let Some(first) = entries.first() else {
            return Err(RagError::Configuration(
                "cannot build an index from zero entries".to_string(),
            ));
        };

        let dimension = first.embedding.len();
        if dimension == 0 {
            return Err(RagError::Configuration(
                "embedding vectors must not be empty".to_string(),
            ));
        }

        for (position, entry) in entries.iter().enumerate() {
            if entry.embedding.len() != dimension {
                return Err(RagError::Configuration(format!(
                    "mixed embedding dimensions: entry {} has {} values, expected {}",
                    position,
                    entry.embedding.len(),
                    dimension
                )));
            }
        }

        log::info!("Built vector index with {} entries ({dimension}d)", entries.len());
        Ok(Self { entries, dimension })
    }

    /// The `k` entries nearest to `query`, nearest first. `k` is a
    /// ceiling: an index smaller than `k` returns everything it has.
    pub fn retrieve(&self, query: &[f32], k: usize) -> Result<Vec<ScoredEntry>> {
        if self.entries.is_empty() {
            return Err(RagError::IndexNotReady);
        }
        if k == 0 {
            return Err(RagError::Configuration(
                "retrieval k must be at least 1".to_string(),
            ));
        }
        if query.len() != self.dimension {
            return Err(RagError::Retrieval(format!(
                "query vector has {} values, index dimension is {}",
                query.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<ScoredEntry> = self
            .entries
            .iter()
            .map(|entry| ScoredEntry {
                entry: entry.clone(),
                similarity: cosine_similarity(query, &entry.embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        Ok(scored)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cosine similarity between two equal-length vectors. Zero vectors score
/// 0.0 instead of dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(embedding: Vec<f32>, source: &str) -> IndexEntry {
        IndexEntry {
            embedding,
            text: format!("text from {source}"),
            source: source.to_string(),
        }
    }

    fn sample_index() -> VectorIndex {
        VectorIndex::build(vec![
            entry(vec![1.0, 0.0, 0.0], "a.pdf"),
            entry(vec![0.0, 1.0, 0.0], "b.pdf"),
            entry(vec![0.7, 0.7, 0.0], "c.pdf"),
        ])
        .unwrap()
    }

    #[test]
    fn retrieve_orders_nearest_first() {
        let index = sample_index();
        let results = index.retrieve(&[1.0, 0.1, 0.0], 3).unwrap();

        assert_eq!(results[0].entry.source, "a.pdf");
        assert_eq!(results[1].entry.source, "c.pdf");
        assert_eq!(results[2].entry.source, "b.pdf");
        assert!(results[0].similarity >= results[1].similarity);
        assert!(results[1].similarity >= results[2].similarity);
    }

    #[test]
    fn k_is_a_ceiling() {
        let index = sample_index();
        assert_eq!(index.retrieve(&[1.0, 0.0, 0.0], 2).unwrap().len(), 2);
        assert_eq!(index.retrieve(&[1.0, 0.0, 0.0], 10).unwrap().len(), 3);
    }

    #[test]
    fn retrieve_only_returns_indexed_entries() {
        let index = sample_index();
        let sources: Vec<String> = index
            .retrieve(&[0.5, 0.5, 0.5], 10)
            .unwrap()
            .into_iter()
            .map(|s| s.entry.source)
            .collect();
        for source in sources {
            assert!(["a.pdf", "b.pdf", "c.pdf"].contains(&source.as_str()));
        }
    }

    #[test]
    fn empty_index_fails_explicitly() {
        let index = VectorIndex::default();
        let result = index.retrieve(&[1.0], 1);
        assert!(matches!(result, Err(RagError::IndexNotReady)));
    }

    #[test]
    fn build_rejects_zero_entries() {
        let result = VectorIndex::build(Vec::new());
        assert!(matches!(result, Err(RagError::Configuration(_))));
    }

    #[test]
    fn build_rejects_mixed_dimensions() {
        let result = VectorIndex::build(vec![
            entry(vec![1.0, 0.0], "a.pdf"),
            entry(vec![1.0, 0.0, 0.0], "b.pdf"),
        ]);
        assert!(matches!(result, Err(RagError::Configuration(_))));
    }

    #[test]
    fn query_dimension_mismatch_is_a_retrieval_error() {
        let index = sample_index();
        let result = index.retrieve(&[1.0, 0.0], 1);
        assert!(matches!(result, Err(RagError::Retrieval(_))));
    }

    #[test]
    fn zero_k_is_rejected() {
        let index = sample_index();
        let result = index.retrieve(&[1.0, 0.0, 0.0], 0);
        assert!(matches!(result, Err(RagError::Configuration(_))));
    }

    #[test]
    fn zero_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
