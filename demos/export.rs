use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use color_eyre::eyre::{bail, eyre};
use log::info;

use mtbdd_export::export::{status_code, Destination, ExportConfig, VectorExporter};
use mtbdd_export::format::ExportFormat;
use mtbdd_export::mtbdd::Mtbdd;
use mtbdd_export::odd::Odd;
use mtbdd_export::types::Var;

/// One vector entry given as `BITS=VALUE`, e.g. `101=2.5`.
#[derive(Debug, Clone)]
struct Entry {
    bits: String,
    value: f64,
}

impl FromStr for Entry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (bits, value) = s.split_once('=').ok_or_else(|| format!("expected BITS=VALUE, got '{}'", s))?;
        if bits.is_empty() || !bits.chars().all(|c| c == '0' || c == '1') {
            return Err(format!("'{}' is not a bit string", bits));
        }
        let value = value.parse().map_err(|e| format!("bad value '{}': {}", value, e))?;
        Ok(Entry {
            bits: bits.to_string(),
            value,
        })
    }
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Non-zero entries as `BITS=VALUE`, most significant variable first.
    #[arg(value_name = "BITS=VALUE")]
    entries: Vec<Entry>,

    /// Output format (plain, matlab, mrmc).
    #[arg(short, long, default_value = "plain")]
    format: ExportFormat,

    /// Vector name for the MATLAB format.
    #[arg(short, long, default_value = "v")]
    name: String,

    /// Output file (stdout if omitted).
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Number of state variables (width of the first entry if omitted).
    #[arg(long, value_name = "N")]
    vars: Option<usize>,

    /// Restrict numbering to these states (bit strings); all states if omitted.
    #[arg(long, value_name = "BITS", value_delimiter = ',')]
    reach: Vec<String>,

    /// Enable debug logging.
    #[arg(long)]
    verbose: bool,
}

fn parse_bits(bits: &str, num_vars: usize) -> color_eyre::Result<u64> {
    if bits.len() != num_vars {
        bail!("'{}' has {} bits, expected {}", bits, bits.len(), num_vars);
    }
    u64::from_str_radix(bits, 2).map_err(|e| eyre!("bad bit string '{}': {}", bits, e))
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let num_vars = match args.vars {
        Some(n) => n,
        None => args.entries.first().map_or(0, |e| e.bits.len()),
    };
    if num_vars >= 64 {
        bail!("at most 63 variables are supported");
    }
    let vars = Var::range(num_vars as u32);

    let mut entries = Vec::with_capacity(args.entries.len());
    for entry in &args.entries {
        entries.push((parse_bits(&entry.bits, num_vars)?, entry.value));
    }

    let dd = Mtbdd::new();
    let f = dd.from_entries(&vars, &entries);
    info!("Vector diagram has {} nodes", dd.size(f));

    let odd = if args.reach.is_empty() {
        Odd::full(num_vars)
    } else {
        let mut states = Vec::with_capacity(args.reach.len());
        for bits in &args.reach {
            states.push((parse_bits(bits, num_vars)?, 1.0));
        }
        let reach = dd.from_entries(&vars, &states);
        Odd::build(&dd, reach, &vars)
    };

    let destination = match args.output {
        Some(path) => Destination::File(path),
        None => Destination::Stdout,
    };

    let exporter = VectorExporter::new(ExportConfig::new(args.format).with_name(args.name))?;
    let result = exporter.export(&dd, f, &vars, &odd, odd.root(), &destination);
    info!("Export finished with status {}", status_code(&result));
    let summary = result?;
    info!("summary = {:?}", summary);

    Ok(())
}
