// src/lib.rs

//! # catalog_matching
//!
//! A reconciliation and deduplication core for a movies and celebrities
//! catalog. Records describing the same real-world film or person arrive
//! from uncoordinated sources (user input, web search, third-party metadata
//! catalogs, AI-generated text); this crate decides whether two records
//! denote the same entity, merges confirmed pairs into a single canonical
//! record with a per-field choice of truth, and routes low-confidence cases
//! to human review instead of guessing.
//!
//! The scorer is deterministic and explainable, biased toward precision over
//! recall: an incorrect merge that erases a real distinct entity is far
//! worse than a missed duplicate a human later finds.

pub mod config;
pub mod matching;
pub mod merging;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod utils;

// Re-export main types for convenience
pub use config::{AliasTable, MatchThresholds, ReconcilerConfig, SourceTrustOrder};
pub use matching::{classify, find_best_match, normalize, similarity_score};
pub use merging::{EntityStore, MergeExecutor, MergeOutcome, MergeRecord};
pub use models::{Entity, EntityId, EntityKind, MatchCandidate, SourceTag, Verdict, VerdictKind};
pub use pipeline::run_reconciliation_pass;
pub use report::{ReconciliationReport, ReviewChoice, ReviewDecision, ReviewItem};
