//! Canonical event model used across the fluhep workspace.
//!
//! These live in `fluhep-core` and are re-exported at the crate root so other
//! crates can import via `fluhep_core::Event`, `fluhep_core::FourVector`, etc.
//!
//! The tree is strictly owned: an [`Event`] owns its [`Vertex`] list and each
//! vertex owns its outgoing [`Particle`]s. No back references.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Event number given to the leading placeholder event.
pub const SENTINEL_EVENT_NUMBER: i64 = -666;

/// Status code for a final-state (undecayed) particle.
pub const FINAL_STATE: i32 = 1;

/// Native length unit → millimetres.
pub const LENGTH_SCALE: f64 = 10.0;

/// One line of transport-code output: a single particle at production.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrackRecord {
    /// Groups records into the same event.
    pub event_index: i64,
    /// Transport-code particle type.
    pub type_code: i32,
    /// Total energy (GeV).
    pub energy: f64,
    /// Production point in native units (cm).
    pub position: [f64; 3],
    /// Momentum magnitude (GeV).
    pub momentum: f64,
    /// Radial coordinate (carried, not used downstream).
    pub radius: f64,
    /// Particle age; becomes the vertex time component.
    pub age: f64,
    /// Path length (carried, not used downstream).
    pub path: f64,
    /// Direction cosines `(cx, cy, cz)`.
    pub direction: [f64; 3],
}

/// Lorentz four-vector `(x, y, z, t)`; momenta use `(px, py, pz, e)`.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FourVector {
    /// x / px
    pub x: f64,
    /// y / py
    pub y: f64,
    /// z / pz
    pub z: f64,
    /// t / e
    pub t: f64,
}

impl FourVector {
    /// Construct from components.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, t: f64) -> Self {
        Self { x, y, z, t }
    }
}

impl fmt::Display for FourVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.z, self.t)
    }
}

/// Momentum unit carried by an event.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum MomentumUnit {
    /// Mega-electronvolt.
    MeV,
    /// Giga-electronvolt.
    GeV,
}

/// Length unit carried by an event.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum LengthUnit {
    /// Millimetre.
    Mm,
    /// Centimetre.
    Cm,
}

/// Unit pair fixed for the lifetime of an event.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Units {
    /// Momentum/energy unit.
    pub momentum: MomentumUnit,
    /// Length unit.
    pub length: LengthUnit,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            momentum: MomentumUnit::GeV,
            length: LengthUnit::Mm,
        }
    }
}

/// An outgoing particle.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Particle {
    /// `(px, py, pz, e)`.
    pub momentum: FourVector,
    /// PDG Monte Carlo code (0 = unknown).
    pub pdg_id: i32,
    /// Status flag; always [`FINAL_STATE`] here.
    pub status: i32,
}

/// A production vertex with its outgoing particles.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Vertex {
    /// `(x, y, z, t)` in mm / native time.
    pub position: FourVector,
    /// Outgoing particles (at least one when built by the assembler).
    pub particles_out: Vec<Particle>,
}

impl Vertex {
    /// Vertex with no particles yet.
    #[inline]
    #[must_use]
    pub const fn new(position: FourVector) -> Self {
        Self {
            position,
            particles_out: Vec::new(),
        }
    }

    /// Attach an outgoing particle.
    #[inline]
    pub fn add_particle_out(&mut self, p: Particle) {
        self.particles_out.push(p);
    }
}

/// A complete event: numbered, unit-tagged, owning its vertices in order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Globally-disambiguated event number.
    pub number: i64,
    /// Signal process id (always 0 for transport dumps).
    pub signal_process_id: i32,
    /// Units fixed for this event.
    pub units: Units,
    /// Vertices in production order.
    pub vertices: Vec<Vertex>,
}

impl Event {
    /// Empty event in GeV/mm.
    #[must_use]
    pub fn new(number: i64) -> Self {
        Self {
            number,
            signal_process_id: 0,
            units: Units::default(),
            vertices: Vec::new(),
        }
    }

    /// The leading placeholder event.
    #[must_use]
    pub fn sentinel() -> Self {
        Self::new(SENTINEL_EVENT_NUMBER)
    }

    /// Append a vertex (ownership moves into the event).
    #[inline]
    pub fn add_vertex(&mut self, v: Vertex) {
        self.vertices.push(v);
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the event has no vertices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterate every outgoing particle across all vertices.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.vertices.iter().flat_map(|v| v.particles_out.iter())
    }
}
