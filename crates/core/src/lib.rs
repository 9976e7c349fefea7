//! Core library: fetching review comments, classification, embedding,
//! indexing, and retrieval.

pub mod classifier;
pub mod config;
pub mod fetcher;
pub mod indexer;
pub mod models;
pub mod pipeline;
pub mod search;
