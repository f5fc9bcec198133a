//! Lenient reader for 13-column track dumps.
//!
//! Each line holds, in order:
//! `event type energy x y z p r age path cx cy cz`.
//!
//! Parsing is best-effort: the first line that is short, long, or not
//! numeric ends the stream, exactly like a clean EOF. Callers cannot tell the
//! two apart; a partially written trailing line is simply dropped.

use std::io::{BufRead, BufReader, Read};
use tracing::debug;

use crate::TrackRecord;

/// Number of whitespace-separated fields per record.
pub const FIELDS: usize = 13;

/// Parse one line into a [`TrackRecord`].
///
/// Returns `None` unless the line has exactly [`FIELDS`] tokens, the first two
/// of which are integers and the rest finite floats (`nan` and `inf` are not
/// numbers here).
#[must_use]
pub fn parse_line(line: &str) -> Option<TrackRecord> {
    let mut tok = line.split_whitespace();
    let event_index = tok.next()?.parse::<i64>().ok()?;
    let type_code = tok.next()?.parse::<i32>().ok()?;

    let mut f = [0.0f64; FIELDS - 2];
    for slot in &mut f {
        *slot = tok.next()?.parse::<f64>().ok().filter(|v| v.is_finite())?;
    }
    if tok.next().is_some() {
        return None;
    }

    let [energy, x, y, z, momentum, radius, age, path, cx, cy, cz] = f;
    Some(TrackRecord {
        event_index,
        type_code,
        energy,
        position: [x, y, z],
        momentum,
        radius,
        age,
        path,
        direction: [cx, cy, cz],
    })
}

/// Owning iterator over the records of one stream.
///
/// Holds the buffered reader internally so it can be handed around freely.
/// Once it returns `None` it keeps returning `None`.
pub struct TrackReader<R> {
    rdr: R,
    buf: String,
    line_no: usize,
    done: bool,
}

impl<R: Read> TrackReader<BufReader<R>> {
    /// Wrap an unbuffered reader.
    pub fn from_read(inner: R) -> Self {
        Self::new(BufReader::new(inner))
    }
}

impl<R: BufRead> TrackReader<R> {
    /// Wrap a buffered reader.
    pub fn new(rdr: R) -> Self {
        Self {
            rdr,
            buf: String::with_capacity(256),
            line_no: 0,
            done: false,
        }
    }

    /// Lines read so far, including skipped blank lines and the line that
    /// stopped the stream.
    #[inline]
    #[must_use]
    pub const fn lines_consumed(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for TrackReader<R> {
    type Item = TrackRecord;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.rdr.read_line(&mut self.buf) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.line_no += 1;
                    if self.buf.trim().is_empty() {
                        continue;
                    }
                    if let Some(rec) = parse_line(&self.buf) {
                        return Some(rec);
                    }
                    debug!(line = self.line_no, "unparsable record, ending stream");
                    self.done = true;
                }
                Err(e) => {
                    debug!(line = self.line_no + 1, error = %e, "read failed, ending stream");
                    self.done = true;
                }
            }
        }
        None
    }
}

impl<R: BufRead> std::iter::FusedIterator for TrackReader<R> {}
