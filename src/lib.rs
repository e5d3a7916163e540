//! repocheck library crate
//!
//! Reconciles a hosted repository's file manifest against local model
//! directories: an incremental hash cache avoids re-hashing unchanged files,
//! and a deterministic matching engine classifies every remote file as
//! present, absent, or present-but-different.

pub mod cache;
pub mod cli;
pub mod config;
pub mod hasher;
pub mod output;
pub mod progress;
pub mod reconcile;
pub mod records;
pub mod remote;
pub mod scan_events;
pub mod scanner;
pub mod sidecar;
