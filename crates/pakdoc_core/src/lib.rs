//! Public library API for materializing packaged asset property graphs as navigable document trees.

/// Scalar values, node trees, path lookup, property adaptation, and the caching document store.
pub mod doc;
