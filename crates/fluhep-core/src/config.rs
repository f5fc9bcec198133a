//! Assembler options and TOML profile loading.
//!
//! A profile is a small TOML table; every key is optional:
//!
//! ```toml
//! leading_sentinel = true      # emit the -666 placeholder event first
//! stream_boundary = "reset"    # or "carry" for the legacy accumulator
//! stride = 100                 # event-number offset per input stream
//! first_event = 0              # added to every real event number
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default per-stream event-number stride.
pub const DEFAULT_STRIDE: i64 = 100;

/// What happens to the in-progress event when a stream ends.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StreamBoundary {
    /// Flush and forget: every stream starts a fresh event.
    #[default]
    Reset,
    /// Legacy behaviour: flush a copy but keep accumulating, so a stream that
    /// starts with the same index extends the previous event (which is then
    /// written again at its next boundary).
    ///
    /// The sentinel is written once, up front, and never re-emitted: leading
    /// empty streams produce no output here, whereas the legacy converter
    /// wrote its placeholder a second time.
    Carry,
}

/// Options consumed by [`crate::EventAssembler`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AssemblerConfig {
    /// Emit the empty [`crate::SENTINEL_EVENT_NUMBER`] event before any data.
    pub leading_sentinel: bool,
    /// Cross-stream behaviour.
    pub stream_boundary: StreamBoundary,
    /// Event numbers from stream `i` are shifted by `i * stride`.
    pub stride: i64,
    /// Constant shift applied to every real event number.
    pub first_event: i64,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            leading_sentinel: true,
            stream_boundary: StreamBoundary::Reset,
            stride: DEFAULT_STRIDE,
            first_event: 0,
        }
    }
}

impl AssemblerConfig {
    /// Parse a TOML profile.
    pub fn from_toml_str(src: &str) -> Result<Self> {
        toml::from_str(src).context("parse assembler profile toml")
    }

    /// Read and parse a TOML profile from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("read profile {}", path.display()))?;
        Self::from_toml_str(&src).with_context(|| format!("in {}", path.display()))
    }

    /// Final event number for raw index `index` read from stream `ordinal`.
    ///
    /// `None` when the result does not fit in an `i64`.
    #[inline]
    #[must_use]
    pub fn event_number(&self, index: i64, ordinal: usize) -> Option<i64> {
        i64::try_from(ordinal)
            .ok()?
            .checked_mul(self.stride)?
            .checked_add(index)?
            .checked_add(self.first_event)
    }
}
