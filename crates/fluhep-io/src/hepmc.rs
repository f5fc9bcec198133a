//! HepMC2 `IO_GenEvent` ASCII writer.
//!
//! Layout per event (HepMC 2.06):
//!
//! ```text
//! E <num> <mpi> <scale> <aQCD> <aQED> <proc_id> <signal_vtx> <n_vtx> <beam1> <beam2> <n_rng> <n_wgt>
//! U GEV MM
//! V <barcode> <id> <x> <y> <z> <t> <n_orphan_in> <n_out> <n_wgt>
//! P <barcode> <pdg> <px> <py> <pz> <e> <m> <status> <theta> <phi> <end_vtx> <n_flow>
//! ```
//!
//! Vertex barcodes count down from -1 and particle barcodes up from 10001
//! within each event. Reals use C `%.16e` formatting so files diff cleanly
//! against ones produced by the C++ library.

use std::fmt;
use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use fluhep_core::{Event, EventSink, LengthUnit, MomentumUnit};

/// Version string written in the listing header.
pub const HEPMC_VERSION: &str = "2.06.09";

const START: &str = "HepMC::IO_GenEvent-START_EVENT_LISTING";
const END: &str = "HepMC::IO_GenEvent-END_EVENT_LISTING";

/// First particle barcode assigned in every event.
pub const FIRST_PARTICLE_BARCODE: i64 = 10_001;

/// `%.16e`-style real (`1.5000000000000000e+01`).
#[derive(Clone, Copy, Debug)]
pub struct Sci(pub f64);

impl fmt::Display for Sci {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = format!("{:.16e}", self.0);
        match s.split_once('e') {
            Some((mantissa, exp)) => {
                let exp: i32 = exp.parse().map_err(|_| fmt::Error)?;
                let sign = if exp < 0 { '-' } else { '+' };
                write!(f, "{mantissa}e{sign}{:02}", exp.unsigned_abs())
            }
            // inf / NaN have no exponent part.
            None => f.write_str(&s.to_ascii_lowercase()),
        }
    }
}

const fn momentum_name(u: MomentumUnit) -> &'static str {
    match u {
        MomentumUnit::MeV => "MEV",
        MomentumUnit::GeV => "GEV",
    }
}

const fn length_name(u: LengthUnit) -> &'static str {
    match u {
        LengthUnit::Mm => "MM",
        LengthUnit::Cm => "CM",
    }
}

/// Streams events into any `Write` in HepMC2 ASCII.
///
/// The header goes out with the first event (or at `finish` for an empty
/// run); the footer goes out once at `finish`.
#[derive(Debug)]
pub struct HepMcAsciiWriter<W: Write> {
    w: W,
    started: bool,
    finished: bool,
    written: u64,
}

impl<W: Write> HepMcAsciiWriter<W> {
    /// Wrap a writer. Nothing is written until the first event.
    pub const fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            finished: false,
            written: 0,
        }
    }

    /// Events written so far.
    #[must_use]
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Borrow the underlying writer.
    pub const fn get_ref(&self) -> &W {
        &self.w
    }

    /// Unwrap the underlying writer (no footer is added).
    pub fn into_inner(self) -> W {
        self.w
    }

    fn start(&mut self) -> io::Result<()> {
        if !self.started {
            write!(self.w, "\nHepMC::Version {HEPMC_VERSION}\n{START}\n")?;
            self.started = true;
        }
        Ok(())
    }

    /// Write one event block.
    pub fn write_event(&mut self, ev: &Event) -> io::Result<()> {
        self.start()?;
        let w = &mut self.w;
        let neg = Sci(-1.0);
        let zero = Sci(0.0);

        writeln!(
            w,
            "E {} -1 {neg} {neg} {neg} {} 0 {} 0 0 0 0",
            ev.number,
            ev.signal_process_id,
            ev.vertices.len()
        )?;
        writeln!(
            w,
            "U {} {}",
            momentum_name(ev.units.momentum),
            length_name(ev.units.length)
        )?;

        let mut particle_bc = FIRST_PARTICLE_BARCODE;
        for (i, v) in ev.vertices.iter().enumerate() {
            let p = v.position;
            writeln!(
                w,
                "V -{} 0 {} {} {} {} 0 {} 0",
                i + 1,
                Sci(p.x),
                Sci(p.y),
                Sci(p.z),
                Sci(p.t),
                v.particles_out.len()
            )?;
            for part in &v.particles_out {
                let m = part.momentum;
                writeln!(
                    w,
                    "P {particle_bc} {} {} {} {} {} {zero} {} {zero} {zero} 0 0",
                    part.pdg_id,
                    Sci(m.x),
                    Sci(m.y),
                    Sci(m.z),
                    Sci(m.t),
                    part.status
                )?;
                particle_bc += 1;
            }
        }
        self.written += 1;
        Ok(())
    }
}

impl<W: Write> EventSink for HepMcAsciiWriter<W> {
    fn append(&mut self, event: Event) -> Result<()> {
        if self.finished {
            bail!("HepMC writer already closed");
        }
        self.write_event(&event)
            .with_context(|| format!("write HepMC event {}", event.number))
    }

    fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.start().context("write HepMC header")?;
        write!(self.w, "{END}\n\n").context("write HepMC footer")?;
        self.w.flush().context("flush HepMC writer")?;
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluhep_core::{FourVector, Particle, Vertex, FINAL_STATE};

    #[test]
    fn sci_matches_c_printf() {
        assert_eq!(Sci(15.0).to_string(), "1.5000000000000000e+01");
        assert_eq!(Sci(0.0).to_string(), "0.0000000000000000e+00");
        assert_eq!(Sci(-1.0).to_string(), "-1.0000000000000000e+00");
        assert_eq!(Sci(0.125).to_string(), "1.2500000000000000e-01");
        // Nearest double to 2.5e-7 sits just below it.
        assert_eq!(Sci(2.5e-7).to_string(), "2.4999999999999999e-07");
        assert_eq!(Sci(1.0e123).to_string(), "1.0000000000000000e+123");
    }

    fn one_vertex_event() -> Event {
        let mut ev = Event::new(7);
        let mut v = Vertex::new(FourVector::new(15.0, 0.0, -20.0, 4.0));
        v.add_particle_out(Particle {
            momentum: FourVector::new(6.0, 8.0, 0.0, 12.0),
            pdg_id: 22,
            status: FINAL_STATE,
        });
        ev.add_vertex(v);
        ev
    }

    #[test]
    fn writes_full_listing() {
        let mut w = HepMcAsciiWriter::new(Vec::new());
        w.append(Event::sentinel()).unwrap();
        w.append(one_vertex_event()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();

        let text = String::from_utf8(w.into_inner()).unwrap();
        let expect = "\nHepMC::Version 2.06.09\n\
HepMC::IO_GenEvent-START_EVENT_LISTING\n\
E -666 -1 -1.0000000000000000e+00 -1.0000000000000000e+00 -1.0000000000000000e+00 0 0 0 0 0 0 0\n\
U GEV MM\n\
E 7 -1 -1.0000000000000000e+00 -1.0000000000000000e+00 -1.0000000000000000e+00 0 0 1 0 0 0 0\n\
U GEV MM\n\
V -1 0 1.5000000000000000e+01 0.0000000000000000e+00 -2.0000000000000000e+01 4.0000000000000000e+00 0 1 0\n\
P 10001 22 6.0000000000000000e+00 8.0000000000000000e+00 0.0000000000000000e+00 1.2000000000000000e+01 0.0000000000000000e+00 1 0.0000000000000000e+00 0.0000000000000000e+00 0 0\n\
HepMC::IO_GenEvent-END_EVENT_LISTING\n\n";
        assert_eq!(text, expect);
    }

    #[test]
    fn barcodes_restart_per_event() {
        let mut ev = one_vertex_event();
        ev.add_vertex(ev.vertices[0].clone());
        let mut w = HepMcAsciiWriter::new(Vec::new());
        w.write_event(&ev).unwrap();
        w.write_event(&ev).unwrap();
        let text = String::from_utf8(w.into_inner()).unwrap();

        let heads: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with('V') || l.starts_with('P'))
            .map(|l| l.splitn(3, ' ').take(2).last().unwrap_or(""))
            .collect();
        assert_eq!(heads, ["-1", "10001", "-2", "10002", "-1", "10001", "-2", "10002"]);
    }

    #[test]
    fn empty_run_still_writes_header_and_footer() {
        let mut w = HepMcAsciiWriter::new(Vec::new());
        w.finish().unwrap();
        let text = String::from_utf8(w.into_inner()).unwrap();
        assert!(text.contains(START));
        assert!(text.ends_with(&format!("{END}\n\n")));
    }

    #[test]
    fn append_after_finish_fails() {
        let mut w = HepMcAsciiWriter::new(Vec::new());
        w.finish().unwrap();
        assert!(w.append(Event::new(1)).is_err());
    }
}
