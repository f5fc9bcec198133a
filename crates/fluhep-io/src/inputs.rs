//! Turn an input selector into an ordered list of readable streams.
//!
//! A selector is one of:
//! - the keyword `glob`, meaning the batch-farm layout [`DEFAULT_PATTERN`];
//! - one or more comma-separated glob patterns (anything containing `*`, `?`
//!   or `[`), expanded and sorted;
//! - a literal path.
//!
//! Stream position matters downstream (it shifts event numbers), so a file
//! that cannot be opened is replaced by an empty stream instead of being
//! dropped.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;
use tracing::{info, warn};

/// Pattern used for the `glob` keyword: one `*KAM` dump per condor job dir.
pub const DEFAULT_PATTERN: &str = "CONDOR*/*KAM";

/// Keyword selecting [`DEFAULT_PATTERN`].
pub const GLOB_KEYWORD: &str = "glob";

/// One opened input.
pub struct InputStream {
    /// Where it came from.
    pub path: PathBuf,
    /// Buffered contents (empty if the file could not be opened).
    pub reader: Box<dyn BufRead>,
}

fn is_pattern(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// Resolve a selector into paths, in processing order.
///
/// # Errors
/// Returns an error for an invalid glob pattern. A pattern that matches
/// nothing yields an empty list.
pub fn resolve_inputs(selector: &str) -> Result<Vec<PathBuf>> {
    let selector = selector.trim();
    if selector == GLOB_KEYWORD {
        return expand_patterns(DEFAULT_PATTERN);
    }
    if is_pattern(selector) {
        return expand_patterns(selector);
    }
    Ok(vec![PathBuf::from(selector)])
}

fn expand_patterns(patterns: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pat in patterns.split(',') {
        let pat = pat.trim();
        if pat.is_empty() {
            continue;
        }
        for entry in glob(pat).with_context(|| format!("invalid glob pattern {pat:?}"))? {
            match entry {
                Ok(p) => paths.push(p),
                Err(e) => warn!(error = %e, "skipping unreadable glob match"),
            }
        }
    }
    paths.sort();
    Ok(paths)
}

/// Open every path, keeping positions stable.
#[must_use]
pub fn open_inputs<P: AsRef<Path>>(paths: &[P]) -> Vec<InputStream> {
    paths
        .iter()
        .map(|p| {
            let path = p.as_ref().to_path_buf();
            let reader: Box<dyn BufRead> = match File::open(&path) {
                Ok(f) => {
                    info!(path = %path.display(), "reading input file");
                    Box::new(BufReader::new(f))
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot open input, treating as empty");
                    Box::new(io::empty())
                }
            };
            InputStream { path, reader }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    fn tmp_dir(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let p = std::env::temp_dir().join(format!("fluhep_io_inputs_{name}_{nanos}"));
        std::fs::create_dir_all(&p).unwrap();
        p
    }

    #[test]
    fn literal_path_passes_through() {
        assert_eq!(resolve_inputs(" in.txt ").unwrap(), vec![PathBuf::from("in.txt")]);
    }

    #[test]
    fn pattern_expands_sorted() {
        let dir = tmp_dir("glob");
        for job in ["CONDOR_2", "CONDOR_1", "other"] {
            std::fs::create_dir_all(dir.join(job)).unwrap();
            std::fs::write(dir.join(job).join("run001_KAM"), "").unwrap();
        }
        let pat = format!("{}/CONDOR*/*KAM", dir.display());
        let got = resolve_inputs(&pat).unwrap();
        assert_eq!(
            got,
            vec![dir.join("CONDOR_1/run001_KAM"), dir.join("CONDOR_2/run001_KAM")]
        );

        let both = resolve_inputs(&format!("{pat}, {}/other/*", dir.display())).unwrap();
        assert_eq!(both.len(), 3);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn bad_pattern_is_an_error() {
        assert!(resolve_inputs("a/[*").is_err());
    }

    #[test]
    fn unopenable_input_becomes_empty_stream() {
        let dir = tmp_dir("open");
        let good = dir.join("good");
        std::fs::write(&good, "hello").unwrap();
        let missing = dir.join("missing");

        let mut streams = open_inputs(&[missing.clone(), good.clone()]);
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].path, missing);

        let mut s = String::new();
        streams[0].reader.read_to_string(&mut s).unwrap();
        assert!(s.is_empty());
        streams[1].reader.read_to_string(&mut s).unwrap();
        assert_eq!(s, "hello");
        let _ = std::fs::remove_dir_all(dir);
    }
}
