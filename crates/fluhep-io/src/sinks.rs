//! Event sinks besides HepMC, and output-format selection.
//!
//! - **JSONL**: one `Event` object per line (`.jsonl` / `.ndjson`), readable
//!   back with the owning [`EventJsonlIter`].
//! - **CBOR**: concatenated `ciborium` items (`.cbor`).
//! - **HepMC**: see [`crate::hepmc`]; the default for any other extension.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use fluhep_core::{Event, EventSink};
use tracing::debug;

use crate::hepmc::HepMcAsciiWriter;

/// Supported output encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// HepMC2 `IO_GenEvent` ASCII.
    HepMc,
    /// JSON Lines.
    Jsonl,
    /// Concatenated CBOR items.
    Cbor,
}

impl OutputFormat {
    /// Pick a format from the file extension (case-insensitive).
    ///
    /// Unknown or missing extensions fall back to HepMC.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match ext_lower(path).as_deref() {
            Some("jsonl" | "ndjson") => Self::Jsonl,
            Some("cbor") => Self::Cbor,
            _ => Self::HepMc,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hepmc" | "hepmc2" => Ok(Self::HepMc),
            "jsonl" | "ndjson" => Ok(Self::Jsonl),
            "cbor" => Ok(Self::Cbor),
            other => Err(anyhow!("unknown output format: {other} (supported: hepmc, jsonl, cbor)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::HepMc => "hepmc",
            Self::Jsonl => "jsonl",
            Self::Cbor => "cbor",
        })
    }
}

/* ---------------- JSONL ---------------- */

/// One JSON object per line.
#[derive(Debug)]
pub struct JsonlEventSink<W: Write> {
    w: W,
    finished: bool,
}

impl<W: Write> JsonlEventSink<W> {
    /// Wrap a writer.
    pub const fn new(w: W) -> Self {
        Self { w, finished: false }
    }

    /// Unwrap the underlying writer.
    pub fn into_inner(self) -> W {
        self.w
    }
}

impl<W: Write> EventSink for JsonlEventSink<W> {
    fn append(&mut self, event: Event) -> Result<()> {
        if self.finished {
            bail!("JSONL sink already closed");
        }
        serde_json::to_writer(&mut self.w, &event).context("serialize event to json")?;
        self.w.write_all(b"\n").context("write newline")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if !self.finished {
            self.w.flush().context("flush JSONL writer")?;
            self.finished = true;
        }
        Ok(())
    }
}

/// Owning JSONL iterator over `Event`.
///
/// Holds the buffered reader internally to avoid lifetime pitfalls of
/// returning a borrowed `Lines<'_>` iterator.
pub struct EventJsonlIter<R> {
    rdr: R,
    buf: String,
    line_no: usize,
}

impl<R: BufRead> EventJsonlIter<R> {
    /// Iterate events from any buffered reader.
    pub fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::with_capacity(8 << 10),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for EventJsonlIter<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.rdr.read_line(&mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_no += 1;
                let line = self.buf.trim_end_matches(['\n', '\r']);
                Some(
                    serde_json::from_str(line)
                        .with_context(|| format!("parse jsonl line {}", self.line_no)),
                )
            }
            Err(e) => Some(Err(e).with_context(|| format!("read line {}", self.line_no + 1))),
        }
    }
}

/// Stream events back from a JSONL file.
pub fn stream_events_jsonl<P: AsRef<Path>>(path: P) -> Result<EventJsonlIter<BufReader<File>>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    Ok(EventJsonlIter::new(BufReader::new(f)))
}

/* ---------------- CBOR ---------------- */

/// Concatenated CBOR items, one per event.
#[derive(Debug)]
pub struct CborEventSink<W: Write> {
    w: W,
    finished: bool,
}

impl<W: Write> CborEventSink<W> {
    /// Wrap a writer.
    pub const fn new(w: W) -> Self {
        Self { w, finished: false }
    }

    /// Unwrap the underlying writer.
    pub fn into_inner(self) -> W {
        self.w
    }
}

impl<W: Write> EventSink for CborEventSink<W> {
    fn append(&mut self, event: Event) -> Result<()> {
        if self.finished {
            bail!("CBOR sink already closed");
        }
        ciborium::ser::into_writer(&event, &mut self.w).context("serialize event to CBOR")
    }

    fn finish(&mut self) -> Result<()> {
        if !self.finished {
            self.w.flush().context("flush CBOR writer")?;
            self.finished = true;
        }
        Ok(())
    }
}

/// Decode every CBOR event from a reader until EOF.
pub fn read_events_cbor_from<R: BufRead>(mut rdr: R) -> Result<Vec<Event>> {
    let mut out = Vec::new();
    while !rdr.fill_buf().context("read CBOR input")?.is_empty() {
        let ev: Event = ciborium::de::from_reader(&mut rdr)
            .with_context(|| format!("deserialize CBOR event #{}", out.len() + 1))?;
        out.push(ev);
    }
    Ok(out)
}

/// Decode every CBOR event in a file.
pub fn read_events_cbor<P: AsRef<Path>>(path: P) -> Result<Vec<Event>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_events_cbor_from(BufReader::new(f))
}

/* --------------- Factory --------------- */

/// Create the output file (and its parent directory) and wrap it in a sink.
///
/// `format = None` detects the format from the extension.
pub fn create_sink<P: AsRef<Path>>(
    path: P,
    format: Option<OutputFormat>,
) -> Result<Box<dyn EventSink>> {
    let path = path.as_ref();
    let format = format.unwrap_or_else(|| OutputFormat::from_path(path));
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let w = BufWriter::new(f);
    debug!(path = %path.display(), %format, "output sink");

    let sink: Box<dyn EventSink> = match format {
        OutputFormat::HepMc => Box::new(HepMcAsciiWriter::new(w)),
        OutputFormat::Jsonl => Box::new(JsonlEventSink::new(w)),
        OutputFormat::Cbor => Box::new(CborEventSink::new(w)),
    };
    Ok(sink)
}

/* ---------------- Small helpers ---------------- */

/// Ensure the parent directory for a file exists (no-op if none).
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

#[inline]
fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluhep_core::{FourVector, Particle, Vertex, FINAL_STATE};
    use std::io::Cursor;

    fn sample(n: i64) -> Event {
        let mut ev = Event::new(n);
        let mut v = Vertex::new(FourVector::new(1.0, 2.0, 3.0, 0.5));
        v.add_particle_out(Particle {
            momentum: FourVector::new(0.1, 0.2, 0.3, 1.0),
            pdg_id: -211,
            status: FINAL_STATE,
        });
        ev.add_vertex(v);
        ev
    }

    #[test]
    fn format_detection() {
        assert_eq!(OutputFormat::from_path(Path::new("a/out.JSONL")), OutputFormat::Jsonl);
        assert_eq!(OutputFormat::from_path(Path::new("out.ndjson")), OutputFormat::Jsonl);
        assert_eq!(OutputFormat::from_path(Path::new("out.cbor")), OutputFormat::Cbor);
        assert_eq!(OutputFormat::from_path(Path::new("Fluka_ASCII.dat")), OutputFormat::HepMc);
        assert_eq!(OutputFormat::from_path(Path::new("out")), OutputFormat::HepMc);
        assert_eq!("HepMC".parse::<OutputFormat>().unwrap(), OutputFormat::HepMc);
        assert!("root".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn jsonl_lines_read_back() {
        let mut sink = JsonlEventSink::new(Vec::new());
        sink.append(Event::sentinel()).unwrap();
        sink.append(sample(3)).unwrap();
        sink.finish().unwrap();
        let bytes = sink.into_inner();
        assert_eq!(bytes.iter().filter(|&&b| b == b'\n').count(), 2);

        let got: Vec<Event> = EventJsonlIter::new(Cursor::new(bytes))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(got, vec![Event::sentinel(), sample(3)]);
    }

    #[test]
    fn jsonl_reports_bad_line_number() {
        let text = format!("{}\n{{oops\n", serde_json::to_string(&sample(1)).unwrap());
        let mut it = EventJsonlIter::new(Cursor::new(text));
        assert!(it.next().unwrap().is_ok());
        let err = it.next().unwrap().unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn cbor_sequence_reads_back() {
        let mut sink = CborEventSink::new(Vec::new());
        for n in 1..=3 {
            sink.append(sample(n)).unwrap();
        }
        sink.finish().unwrap();
        let got = read_events_cbor_from(Cursor::new(sink.into_inner())).unwrap();
        assert_eq!(got.iter().map(|e| e.number).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(got[0], sample(1));
    }
}
