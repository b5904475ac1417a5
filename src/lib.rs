//! # firewalld-ext - Threat-intelligence denylist manager for firewalld
//!
//! Periodically pulls threat-intelligence feeds, normalizes and collapses
//! the contained network ranges, persists the resulting blocklist snapshot,
//! and regenerates firewalld's ipset/direct-rule XML before triggering a
//! `firewall-cmd --complete-reload`.
//!
//! ## Pipeline
//!
//! ```text
//! Profile registry ─▶ Fetcher (concurrent, retry+backoff)
//!                  ─▶ Parser (per-format, per-line tolerance)
//!                  ─▶ Aggregator (CIDR collapse per family)
//!                  ─▶ Reconciliation (incremental / full replace)
//!                  ─▶ Artifacts (render, validate, atomic swap)
//!                  ─▶ Activation (firewall-cmd reload)
//!                  ─▶ Snapshot persistence
//! ```
//!
//! ## Modules
//!
//! - [`profiles`] - feed source registry and blocking profiles
//! - [`fetcher`] - concurrent HTTP polling with bounded retry
//! - [`retry`] - retry-with-backoff utility
//! - [`parser`] - per-source-format feed parsing
//! - [`aggregator`] - CIDR collapsing into minimal covering sets
//! - [`state`] - persisted blocklist snapshot
//! - [`config`] - runtime path configuration
//! - [`artifacts`] - firewalld XML generation, validation, atomic swap
//! - [`activator`] - firewalld reload invocation
//! - [`pipeline`] - reconciliation state machine tying it all together
//! - [`cmd_abstraction`] - injectable command execution
//! - [`lock`] - single-run file lock
//! - [`cli`], [`commands`] - operator-facing command layer

pub mod activator;
pub mod aggregator;
pub mod artifacts;
pub mod cli;
pub mod cmd_abstraction;
pub mod commands;
pub mod config;
pub mod fetcher;
pub mod lock;
pub mod parser;
pub mod pipeline;
pub mod profiles;
pub mod retry;
pub mod state;

pub use cli::{Cli, Commands};
pub use config::Paths;
pub use profiles::Profile;
