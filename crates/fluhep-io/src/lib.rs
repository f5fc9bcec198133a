//! File-level plumbing around `fluhep-core`.
//!
//! This crate provides four small building blocks that keep the core free of
//! filesystem and format concerns:
//!
//! - `inputs`: resolve a path / glob selector into an ordered list of streams.
//! - `hepmc`: HepMC2 `IO_GenEvent` ASCII writer (the default output).
//! - `sinks`: JSONL and CBOR event sinks/readers plus format auto-detection.
//! - `generator`: a deterministic synthetic track-dump generator for
//!   tests/benches and the CLI `simulate` subcommand.
//!
//! We intentionally avoid broad re-exports so callers use stable paths like
//! `fluhep_io::sinks::create_sink`.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

/// Synthetic track-dump generator.
pub mod generator;
/// HepMC2 ASCII event writer.
pub mod hepmc;
/// Input selection (literal path, glob pattern, or the `glob` keyword).
pub mod inputs;
/// JSONL/CBOR sinks, readers, and output-format detection.
pub mod sinks;
