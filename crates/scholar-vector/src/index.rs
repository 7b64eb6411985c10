//! Exhaustive (flat) similarity index.

use crate::distance::DistanceMetric;
use crate::error::{Error, Result};

/// A single search hit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hit<P> {
    /// Insertion position of the vector.
    pub position: usize,
    /// Similarity to the query, higher is better.
    pub score: f32,
    /// Payload stored with the vector.
    pub payload: P,
}

/// Flat index that scores every stored vector on each query.
///
/// Sized for one document's worth of chunks: building is O(n) and a query
/// is O(n·d). The dimension is fixed by the first inserted vector.
#[derive(Debug, Clone)]
pub struct FlatIndex<P> {
    metric: DistanceMetric,
    dimensions: Option<usize>,
    vectors: Vec<Vec<f32>>,
    payloads: Vec<P>,
}

impl<P: Clone> FlatIndex<P> {
    /// Create an empty index.
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            metric,
            dimensions: None,
            vectors: Vec::new(),
            payloads: Vec::new(),
        }
    }

    /// Build an index from parallel vectors and payloads.
    pub fn from_batch(
        metric: DistanceMetric,
        vectors: Vec<Vec<f32>>,
        payloads: Vec<P>,
    ) -> Result<Self> {
        if vectors.len() != payloads.len() {
            return Err(Error::BatchMismatch {
                vectors: vectors.len(),
                payloads: payloads.len(),
            });
        }

        let mut index = Self::new(metric);
        for (vector, payload) in vectors.into_iter().zip(payloads) {
            index.insert(vector, payload)?;
        }
        Ok(index)
    }

    /// Add one vector. Returns its position.
    pub fn insert(&mut self, vector: Vec<f32>, payload: P) -> Result<usize> {
        validate(&vector)?;
        match self.dimensions {
            Some(expected) if expected != vector.len() => {
                return Err(Error::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
            None => self.dimensions = Some(vector.len()),
            _ => {}
        }

        self.vectors.push(vector);
        self.payloads.push(payload);
        Ok(self.vectors.len() - 1)
    }

    /// Return up to `k` hits ordered by descending score. Ties keep
    /// insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Hit<P>>> {
        if self.vectors.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        validate(query)?;
        if let Some(expected) = self.dimensions {
            if expected != query.len() {
                return Err(Error::DimensionMismatch {
                    expected,
                    actual: query.len(),
                });
            }
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, self.metric.similarity(query, v)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        tracing::trace!(candidates = self.vectors.len(), returned = scored.len(), "flat search");

        Ok(scored
            .into_iter()
            .map(|(position, score)| Hit {
                position,
                score,
                payload: self.payloads[position].clone(),
            })
            .collect())
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// True when nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Dimension fixed by the first insert.
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    /// Metric used for scoring.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }
}

fn validate(vector: &[f32]) -> Result<()> {
    if vector.is_empty() {
        return Err(Error::InvalidVector("vector is empty".into()));
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidVector("vector contains NaN or infinity".into()));
    }
    Ok(())
}
