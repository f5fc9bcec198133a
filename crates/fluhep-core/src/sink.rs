//! Sink abstraction the assembler writes completed events into.
//!
//! Implementors own the on-disk (or in-memory) representation; the assembler
//! only relies on append order and a single final [`EventSink::finish`].
//!
//! ## Contracts implementors should uphold
//! - `append` receives each event exactly once, by value, in output order.
//! - `append` failures are fatal to the run; the caller does not retry.
//! - `finish` flushes and closes. Calling it again must be harmless.

use crate::Event;
use anyhow::Result;

/// Sequential event writer.
pub trait EventSink {
    /// Record one complete event.
    fn append(&mut self, event: Event) -> Result<()>;

    /// Flush and close. Idempotent.
    fn finish(&mut self) -> Result<()>;
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn append(&mut self, event: Event) -> Result<()> {
        (**self).append(event)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn append(&mut self, event: Event) -> Result<()> {
        (**self).append(event)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

/// Collects events in memory.
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    /// Events in append order.
    pub events: Vec<Event>,
    /// Number of `finish` calls seen.
    pub finished: usize,
}

impl VecSink {
    /// Event numbers in append order.
    #[must_use]
    pub fn numbers(&self) -> Vec<i64> {
        self.events.iter().map(|e| e.number).collect()
    }
}

impl EventSink for VecSink {
    fn append(&mut self, event: Event) -> Result<()> {
        self.events.push(event);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished += 1;
        Ok(())
    }
}
