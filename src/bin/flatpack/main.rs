//! Flatpack CLI - convert an STL solid to an OBJ with a packed UV atlas.
//!
//! Usage: flatpack [OPTIONS] <NAME>
//!
//! Reads `<NAME>.stl`, writes `<NAME>.obj` next to it and prints the atlas size
//! as `N x N`. Run `flatpack --help` for options.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use flatpack::algo::coplanar::DEFAULT_TOLERANCE;
use flatpack::algo::pack::{PlacementCost, DEFAULT_TEXEL_DENSITY};
use flatpack::algo::Progress;
use flatpack::convert::{convert_file, ConvertOptions};
use flatpack::io;

#[derive(Parser)]
#[command(name = "flatpack")]
#[command(author, version, about = "Convert STL to OBJ with a packed UV atlas", long_about = None)]
struct Cli {
    /// Base file name without extension (reads NAME.stl, writes NAME.obj)
    name: PathBuf,

    /// Write the OBJ here instead of NAME.obj
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Texels per world unit
    #[arg(short, long, default_value_t = DEFAULT_TEXEL_DENSITY)]
    density: u32,

    /// Coplanarity tolerance on the edge determinant
    #[arg(short, long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// How free atlas positions are ranked
    #[arg(short, long, value_enum, default_value = "chebyshev")]
    cost: CostArg,

    /// Show a progress bar on stderr
    #[arg(long)]
    progress: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors; overrides -v
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CostArg {
    /// Smallest max(x, y)
    Chebyshev,
    /// Smallest distance from the atlas origin
    Euclidean,
}

impl From<CostArg> for PlacementCost {
    fn from(arg: CostArg) -> Self {
        match arg {
            CostArg::Chebyshev => PlacementCost::Chebyshev,
            CostArg::Euclidean => PlacementCost::Euclidean,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr. `RUST_LOG` wins over `-q` and `-v`.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let (input, default_output) = io::paths_for(&cli.name);
    let output = cli.output.unwrap_or(default_output);

    let mut options = ConvertOptions::default()
        .with_texel_density(cli.density)
        .with_tolerance(cli.tolerance)
        .with_placement_cost(cli.cost.into());
    if cli.progress {
        options = options.with_progress(create_progress());
    }

    let start = Instant::now();
    let mesh = convert_file(&input, &output, &options)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        elapsed = ?start.elapsed(),
        "converted"
    );

    println!("{0} x {0}", mesh.atlas_side);
    Ok(())
}

/// Create a progress reporter that draws one bar per stage on stderr.
fn create_progress() -> Progress {
    let last_percent = Arc::new(AtomicUsize::new(usize::MAX));

    Progress::new(move |stage, current, total| {
        if total == 0 {
            return;
        }
        let percent = if current >= total {
            100
        } else {
            (current * 100) / total
        };
        // Only redraw when the percentage changes
        if last_percent.swap(percent, Ordering::Relaxed) == percent {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);
        eprint!("\r[{}{}] {:3}% {:<10}", bar, space, percent, stage);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}
