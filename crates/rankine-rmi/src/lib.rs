//! Recursive model index for Rankine.
//!
//! This crate provides:
//! - Model primitives: a closed-form linear regressor and a small
//!   feed-forward neural regressor trained by mini-batch gradient descent
//! - A sorted key store backing the final bounded search
//! - The staged RMI engine: bulk build with top-down bucket routing,
//!   per-model error bounds, and rank lookup with bounded local search
//!
//! The index is bulk-loaded once and immutable afterwards; lookups take
//! `&self` and are safe to issue from multiple threads on a built index.

mod keys;
mod model;
mod rmi;

pub use keys::KeyStore;
pub use model::{LinearModel, Model, NeuralNetModel};
pub use rmi::{RecursiveModelIndex, RmiStats};
