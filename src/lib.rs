//! Permit Study - backend for a simulated permit-application study
//!
//! Participants are assigned to a study condition, their progress and
//! behaviour are recorded in append-only per-category logs, and researchers
//! export merged sessions, quality scores, and study-wide statistics.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
