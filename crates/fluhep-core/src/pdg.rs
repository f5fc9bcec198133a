//! FLUKA particle codes → PDG Monte Carlo numbering.
//!
//! Only the species that show up in the scoring dumps we convert are listed.
//! Anything else maps to [`UNKNOWN_PDG`] and is reported through `tracing`.

use tracing::warn;

/// Code assigned to particles with no known PDG equivalent.
pub const UNKNOWN_PDG: i32 = 0;

/// `(fluka, pdg)` pairs.
pub const FLUKA_TO_PDG: [(i32, i32); 11] = [
    (1, 2212),   // proton
    (2, -2212),  // antiproton
    (3, 11),     // electron
    (4, -11),    // positron
    (7, 22),     // photon
    (8, 2112),   // neutron
    (10, -13),   // mu+
    (13, 211),   // pi+
    (14, -211),  // pi-
    (16, -321),  // K-
    (25, -311),  // anti-K0
];

/// Pure table lookup.
#[inline]
#[must_use]
pub fn lookup(code: i32) -> Option<i32> {
    FLUKA_TO_PDG
        .iter()
        .find_map(|&(f, p)| (f == code).then_some(p))
}

/// Map a FLUKA code, falling back to [`UNKNOWN_PDG`] with a warning.
#[must_use]
pub fn fluka_to_pdg(code: i32) -> i32 {
    lookup(code).unwrap_or_else(|| {
        warn!(code, "unknown particle code, using PDG id 0");
        UNKNOWN_PDG
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[test]
    fn every_table_entry_maps() {
        let expect = [
            (7, 22),
            (8, 2112),
            (3, 11),
            (4, -11),
            (14, -211),
            (16, -321),
            (1, 2212),
            (25, -311),
            (13, 211),
            (10, -13),
            (2, -2212),
        ];
        for (f, p) in expect {
            assert_eq!(fluka_to_pdg(f), p, "fluka code {f}");
        }
    }

    #[test]
    fn unmapped_codes_are_zero() {
        for code in [0, 5, 6, 9, 11, 12, 15, 17, 24, 26, -1, 1000] {
            assert_eq!(lookup(code), None);
            assert_eq!(fluka_to_pdg(code), UNKNOWN_PDG);
        }
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unmapped_code_emits_warning() {
        let buf = Captured::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let got = tracing::subscriber::with_default(subscriber, || fluka_to_pdg(42));
        assert_eq!(got, UNKNOWN_PDG);

        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("WARN"), "{text}");
        assert!(text.contains("code=42"), "{text}");
    }

    #[test]
    fn mapped_code_is_silent() {
        let buf = Captured::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || fluka_to_pdg(7));
        assert!(buf.0.lock().unwrap().is_empty());
    }
}
