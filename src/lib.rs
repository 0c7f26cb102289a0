// src/lib.rs
pub mod aggregate;
pub mod config;
pub mod corpus;
pub mod enrich;
pub mod error;
pub mod lexicon;
pub mod partition;
pub mod pipeline;
pub mod report;
pub mod store;
