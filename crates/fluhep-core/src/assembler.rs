//! Event assembler: group track records into events and stream them out.
//!
//! Goals:
//! - Keep memory bounded by a single in-progress event, whatever the input
//!   size.
//! - Emit each event the moment its group ends (a new event index, or the end
//!   of a stream), in input order.
//! - Never fail on data: bad trailing lines end a stream, unknown particle
//!   codes become PDG id 0. Only the sink can abort a run.

use std::collections::BTreeMap;
use std::io::Read;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    pdg, AssemblerConfig, Event, EventSink, FourVector, Particle, StreamBoundary, TrackReader,
    TrackRecord, Vertex, FINAL_STATE, LENGTH_SCALE,
};

/// Counters for one assembler run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AssemblySummary {
    /// Input streams drained.
    pub streams: usize,
    /// Records consumed across all streams.
    pub records: u64,
    /// Events handed to the sink (sentinel and carry re-emits included).
    pub events: u64,
    /// Occurrences of each transport code with no PDG mapping.
    pub unmapped: BTreeMap<i32, u64>,
}

/// Build the single-particle vertex for one record.
///
/// Position is scaled to mm, time is the record's age; momentum is the
/// magnitude times the direction cosines, with no normalisation.
#[must_use]
pub fn build_vertex(rec: &TrackRecord) -> Vertex {
    let [x, y, z] = rec.position;
    let [cx, cy, cz] = rec.direction;
    let p = rec.momentum;

    let mut v = Vertex::new(FourVector::new(
        x * LENGTH_SCALE,
        y * LENGTH_SCALE,
        z * LENGTH_SCALE,
        rec.age,
    ));
    v.add_particle_out(Particle {
        momentum: FourVector::new(p * cx, p * cy, p * cz, rec.energy),
        pdg_id: pdg::fluka_to_pdg(rec.type_code),
        status: FINAL_STATE,
    });
    v
}

/// Drives records from ordered streams into an [`EventSink`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EventAssembler {
    cfg: AssemblerConfig,
}

/// Accumulator shared across streams.
struct Accumulator<'s, K: ?Sized> {
    sink: &'s mut K,
    current: Option<Event>,
    current_index: Option<i64>,
    summary: AssemblySummary,
}

impl<K: EventSink + ?Sized> Accumulator<'_, K> {
    fn emit(&mut self, event: Event) -> Result<()> {
        let number = event.number;
        self.sink
            .append(event)
            .with_context(|| format!("append event {number}"))?;
        self.summary.events += 1;
        Ok(())
    }

    fn flush_current(&mut self) -> Result<()> {
        match self.current.take() {
            Some(ev) => self.emit(ev),
            None => Ok(()),
        }
    }
}

impl EventAssembler {
    /// Construct with explicit options.
    #[must_use]
    pub const fn new(cfg: AssemblerConfig) -> Self {
        Self { cfg }
    }

    /// Options in use.
    #[must_use]
    pub const fn config(&self) -> &AssemblerConfig {
        &self.cfg
    }

    /// Drain every stream in order into `sink`, then call `finish` once.
    ///
    /// Stream `i` numbers its events `event_index + i * stride + first_event`.
    ///
    /// # Errors
    /// Only sink failures are returned; `finish` is not called after a failed
    /// `append`.
    pub fn run<I, S, K>(&self, streams: I, sink: &mut K) -> Result<AssemblySummary>
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = TrackRecord>,
        K: EventSink + ?Sized,
    {
        let mut acc = Accumulator {
            sink,
            current: None,
            current_index: None,
            summary: AssemblySummary::default(),
        };

        if self.cfg.leading_sentinel {
            acc.emit(Event::sentinel())?;
        }

        for (ordinal, stream) in streams.into_iter().enumerate() {
            debug!(ordinal, "stream start");
            let before = acc.summary.records;

            for rec in stream {
                if acc.current_index != Some(rec.event_index) {
                    let Some(number) = self.cfg.event_number(rec.event_index, ordinal) else {
                        warn!(
                            ordinal,
                            event_index = rec.event_index,
                            "event number out of range, ending stream"
                        );
                        break;
                    };
                    acc.flush_current()?;
                    acc.current = Some(Event::new(number));
                    acc.current_index = Some(rec.event_index);
                }

                if pdg::lookup(rec.type_code).is_none() {
                    *acc.summary.unmapped.entry(rec.type_code).or_default() += 1;
                }
                let vertex = build_vertex(&rec);
                if let Some(ev) = acc.current.as_mut() {
                    ev.add_vertex(vertex);
                }
                acc.summary.records += 1;
            }

            match self.cfg.stream_boundary {
                StreamBoundary::Reset => {
                    acc.flush_current()?;
                    acc.current_index = None;
                }
                StreamBoundary::Carry => {
                    if let Some(ev) = acc.current.clone() {
                        acc.emit(ev)?;
                    }
                }
            }

            acc.summary.streams += 1;
            debug!(ordinal, records = acc.summary.records - before, "stream done");
        }

        // A carried accumulator was already written at its stream's end.
        acc.sink.finish().context("finish event sink")?;
        Ok(acc.summary)
    }

    /// [`run`](Self::run) over raw readers, each wrapped in a [`TrackReader`].
    pub fn run_readers<I, R, K>(&self, readers: I, sink: &mut K) -> Result<AssemblySummary>
    where
        I: IntoIterator<Item = R>,
        R: Read,
        K: EventSink + ?Sized,
    {
        self.run(readers.into_iter().map(TrackReader::from_read), sink)
    }
}
