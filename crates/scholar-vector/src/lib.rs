//! # scholar-vector
//!
//! The similarity index behind scholar's retrieval step. Each request
//! embeds one document, indexes its chunks, asks for the top few matches
//! and throws the index away, so an exhaustive scan is all that's needed.
//!
//! ## Quick Start
//!
//! ```rust
//! use scholar_vector::{DistanceMetric, FlatIndex};
//!
//! let mut index = FlatIndex::new(DistanceMetric::Cosine);
//! index.insert(vec![1.0, 0.0], "alpha").unwrap();
//! index.insert(vec![0.0, 1.0], "beta").unwrap();
//!
//! let hits = index.search(&[0.9, 0.1], 1).unwrap();
//! assert_eq!(hits[0].payload, "alpha");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod distance;
pub mod error;
pub mod index;

pub use distance::DistanceMetric;
pub use error::{Error, Result};
pub use index::{FlatIndex, Hit};
