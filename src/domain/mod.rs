//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, timestamps, errors, lenient readers)
//! - `session` - Session records, patches, merge, and completion status
//! - `condition` - Block-randomized condition assignment
//! - `scoring` - Answer-key scoring of submitted applications
//! - `analytics` - Pure aggregation of merged sessions into study statistics

pub mod analytics;
pub mod condition;
pub mod foundation;
pub mod scoring;
pub mod session;
