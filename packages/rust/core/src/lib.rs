//! Core pipeline orchestration and domain logic for postweave.
//!
//! This crate ties together corpus I/O, indexing, relatedness scoring, and
//! keyword extraction into the end-to-end `enrich` workflow.

pub mod corpus;
pub mod index;
pub mod keywords;
pub mod pipeline;
pub mod related;
