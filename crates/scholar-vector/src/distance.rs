//! Distance metrics for vector similarity.

use std::fmt;

/// Similarity metric used to rank stored vectors against a query.
///
/// - **Cosine**: Angle only. The right default for text embeddings.
/// - **DotProduct**: Cosine without normalisation; assumes unit vectors.
/// - **Euclidean**: Straight-line distance, mapped into `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DistanceMetric {
    /// Cosine similarity in `[-1, 1]`.
    #[default]
    Cosine,
    /// Raw inner product.
    DotProduct,
    /// `1 / (1 + l2)`.
    Euclidean,
}

impl DistanceMetric {
    /// Score two vectors. Higher is always more similar.
    ///
    /// Both slices must have the same length; the index checks this
    /// before calling in.
    #[inline]
    pub fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

        match self {
            DistanceMetric::Cosine => cosine_similarity(a, b),
            DistanceMetric::DotProduct => dot_product(a, b),
            DistanceMetric::Euclidean => 1.0 / (1.0 + euclidean_distance(a, b)),
        }
    }

    /// Name used in config files and logs.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::DotProduct => "dot_product",
            DistanceMetric::Euclidean => "euclidean",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" | "cos" => Ok(DistanceMetric::Cosine),
            "dot" | "dot_product" | "inner" => Ok(DistanceMetric::DotProduct),
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            _ => Err(format!("Unknown distance metric: {}", s)),
        }
    }
}

#[inline]
fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[inline]
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = (norm_a * norm_b).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

#[inline]
fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let a = vec![1.0, 2.0, 3.0];
        let sim = DistanceMetric::Cosine.similarity(&a, &a);
        assert!((sim - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(DistanceMetric::Cosine.similarity(&a, &b).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 1.0];
        assert_eq!(DistanceMetric::Cosine.similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_dot_product() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![4.0, 5.0, 6.0];
        let sim = DistanceMetric::DotProduct.similarity(&a, &b);
        assert!((sim - 32.0).abs() < 0.0001);
    }

    #[test]
    fn test_euclidean_identical_is_one() {
        let a = vec![0.5, 0.5];
        let sim = DistanceMetric::Euclidean.similarity(&a, &a);
        assert!((sim - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("cos".parse::<DistanceMetric>().unwrap(), DistanceMetric::Cosine);
        assert_eq!("l2".parse::<DistanceMetric>().unwrap(), DistanceMetric::Euclidean);
        assert_eq!("dot".parse::<DistanceMetric>().unwrap(), DistanceMetric::DotProduct);
        assert!("hamming".parse::<DistanceMetric>().is_err());
    }
}
