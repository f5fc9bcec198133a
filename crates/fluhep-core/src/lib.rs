//! fluhep-core — event model, particle-code mapping, record parsing, and the
//! event assembler.
//!
//! This crate defines the **stable boundary** used across fluhep crates:
//! - canonical data types (`TrackRecord`, `Event`, `Vertex`, `Particle`, …),
//! - the FLUKA → PDG particle-code mapper,
//! - a lenient line parser for 13-column track dumps, and
//! - the streaming [`EventAssembler`] that groups records into events and
//!   pushes them into any [`EventSink`].
//!
//! ```no_run
//! use fluhep_core::{AssemblerConfig, EventAssembler, VecSink};
//! # let files: Vec<std::fs::File> = vec![];
//! let mut sink = VecSink::default();
//! let summary = EventAssembler::new(AssemblerConfig::default()).run_readers(files, &mut sink)?;
//! println!("{} events", summary.events);
//! # Ok::<(), anyhow::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Event assembler: groups track records into events and drives a sink.
pub mod assembler;
/// Run configuration (assembler options + TOML profile loading).
pub mod config;
/// FLUKA particle code → PDG Monte Carlo numbering.
pub mod pdg;
/// Lenient 13-column track record parser.
pub mod record;
/// Sink trait consumed by the assembler, plus an in-memory collector.
pub mod sink;
/// Canonical event model shared across the workspace.
pub mod types;

// ---- Re-exports for workspace compatibility ----
pub use assembler::*;
pub use config::*;
pub use record::{parse_line, TrackReader};
pub use sink::*;
pub use types::*;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use fluhep_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        assembler::{AssemblySummary, EventAssembler},
        config::{AssemblerConfig, StreamBoundary},
        record::TrackReader,
        sink::{EventSink, VecSink},
        types::*,
    };
}
