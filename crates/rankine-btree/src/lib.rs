//! Bulk-loaded page-indexed tree for Rankine.
//!
//! A static search tree packed from sorted records: leaf pages of fixed
//! capacity, internal nodes holding separator keys and child references.
//! It provides an independent implementation of lower-bound used as the
//! correctness oracle and performance baseline for the learned index.

mod node;
mod tree;

pub use tree::PagedTree;
