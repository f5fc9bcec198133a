// crates/fluhep-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fluhep_core::{AssemblerConfig, EventAssembler, StreamBoundary, TrackReader};
use fluhep_io::{
    generator::{generate_records, write_records},
    inputs::{open_inputs, resolve_inputs},
    sinks::{create_sink, OutputFormat},
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "fluhep",
    about = "FLUKA track dump → HepMC converter",
    long_about = "FLUKA track dump → HepMC converter.\n\nGroups per-particle dump lines into events and writes them as HepMC2 ASCII (or JSONL/CBOR).",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Convert one or more track dumps into an event file.
    Convert {
        /// Input file, glob pattern(s) (comma-separated), or `glob` for `CONDOR*/*KAM`
        #[arg(long, short)]
        input: String,

        /// Output path; the format follows the extension unless --format is given
        #[arg(long, short, default_value = "Fluka_ASCII.dat")]
        out: PathBuf,

        /// Output format (overrides extension detection)
        #[arg(long, value_enum)]
        format: Option<FormatOpt>,

        /// Offset added to every event number
        #[arg(long, allow_negative_numbers = true)]
        first_event: Option<i64>,

        /// Event-number shift per input file
        #[arg(long)]
        stride: Option<i64>,

        /// Do not write the leading -666 placeholder event
        #[arg(long, default_value_t = false)]
        no_sentinel: bool,

        /// Keep the open event across file boundaries (legacy behaviour)
        #[arg(long, default_value_t = false)]
        carry_streams: bool,

        /// TOML profile with assembler options; flags take precedence
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the run summary as JSON instead of a one-line report
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Write synthetic track dumps laid out like a batch-farm run.
    Simulate {
        /// Events per file (>0)
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
        events: u32,

        /// Tracks per event (>0)
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
        tracks: u32,

        /// Number of job directories to create (>0)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        files: u32,

        /// Directory receiving `CONDOR_NNN/tracksNNN_KAM`
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Base RNG seed (file i uses seed + i)
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum FormatOpt {
    /// HepMC2 IO_GenEvent ASCII
    Hepmc,
    /// JSON Lines, one event per line
    Jsonl,
    /// Concatenated CBOR events
    Cbor,
}

impl From<FormatOpt> for OutputFormat {
    fn from(f: FormatOpt) -> Self {
        match f {
            FormatOpt::Hepmc => Self::HepMc,
            FormatOpt::Jsonl => Self::Jsonl,
            FormatOpt::Cbor => Self::Cbor,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Convert {
            input,
            out,
            format,
            first_event,
            stride,
            no_sentinel,
            carry_streams,
            config,
            json,
        } => {
            let mut cfg = match config {
                Some(path) => AssemblerConfig::load(&path)?,
                None => AssemblerConfig::default(),
            };
            if let Some(n) = first_event {
                cfg.first_event = n;
            }
            if let Some(s) = stride {
                cfg.stride = s;
            }
            if no_sentinel {
                cfg.leading_sentinel = false;
            }
            if carry_streams {
                cfg.stream_boundary = StreamBoundary::Carry;
            }
            convert(&input, out, format.map(Into::into), cfg, json)
        }

        Cmd::Simulate {
            events,
            tracks,
            files,
            out_dir,
            seed,
        } => simulate(events, tracks, files, out_dir, seed),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn convert(
    input: &str,
    out: PathBuf,
    format: Option<OutputFormat>,
    cfg: AssemblerConfig,
    json: bool,
) -> Result<()> {
    let paths = resolve_inputs(input).with_context(|| format!("resolving inputs {input:?}"))?;
    if paths.is_empty() {
        bail!("no input files matched {input:?}");
    }
    info!(inputs = paths.len(), out = %out.display(), ?cfg, "converting");

    let streams = open_inputs(&paths);
    let mut sink = create_sink(&out, format)?;
    let summary = EventAssembler::new(cfg)
        .run(streams.into_iter().map(|s| TrackReader::new(s.reader)), &mut sink)
        .with_context(|| format!("writing events to {}", out.display()))?;

    if !summary.unmapped.is_empty() {
        warn!(
            unmapped = ?summary.unmapped,
            "particle codes without a PDG id were written as 0"
        );
    }

    if json {
        let text = serde_json::to_string_pretty(&summary).context("serialize run summary")?;
        println!("{text}");
        return Ok(());
    }
    println!(
        "Converted {} files, {} records → {} events → {}",
        summary.streams,
        summary.records,
        summary.events,
        out.display()
    );
    Ok(())
}

fn simulate(events: u32, tracks: u32, files: u32, out_dir: PathBuf, seed: u64) -> Result<()> {
    info!(events, tracks, files, seed, "generating synthetic track dumps");

    for i in 0..files {
        let dir = out_dir.join(format!("CONDOR_{i:03}"));
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating directory {}", dir.display()))?;
        let path = dir.join(format!("tracks{i:03}_KAM"));

        let recs = generate_records(events, tracks, seed + u64::from(i));
        let f = File::create(&path).with_context(|| format!("create {}", path.display()))?;
        write_records(BufWriter::new(f), &recs)
            .with_context(|| format!("writing track dump {}", path.display()))?;
    }

    println!(
        "Simulated {files} files × {events} events × {tracks} tracks → {}",
        out_dir.display()
    );
    Ok(())
}
