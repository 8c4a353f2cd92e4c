//! # Gemini Goblin
//!
//! Usage tracking and cost analytics for the Gemini CLI.
//!
//! ## Overview
//!
//! The Gemini CLI writes OpenTelemetry-style event records into a local
//! `telemetry.log` as concatenated pretty-printed JSON objects. This
//! library turns those logs into something useful:
//!
//! - Converts raw logs into canonical JSONL, incrementally: records
//!   already present in the output (by `event.timestamp`) are skipped,
//!   and the consumed source can be archived.
//! - Simplifies records at levels 0-3, trading fidelity for storage.
//! - Prices each API response against the LiteLLM price table (fetched
//!   with an on-disk cache) and aggregates token usage per model per
//!   calendar day in a chosen timezone.

/// Token usage aggregation keyed by model and day
pub mod aggregation;

/// Archiving of consumed log files
pub mod archive;

/// Command-line argument parsing and dispatch
pub mod cli;

/// CLI command implementations
pub mod commands;

/// Configuration: paths, filenames, and tuning constants
pub mod config;

/// Incremental raw-log to JSONL conversion
pub mod convert;

/// Streaming parsers for raw and canonical telemetry logs
pub mod data;

/// Typed errors shared across the crate
pub mod error;

/// Data models for telemetry records and pricing
pub mod models;

/// Cost calculation and price-table retrieval
pub mod pricing;

/// Progressive record simplification
pub mod simplify;
