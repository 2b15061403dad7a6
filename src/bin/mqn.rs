use std::path::PathBuf;

use clap::Parser;
use log::info;
use rdesc::{run_mqn, Config, VERSION};

/// Compute the 42 molecular quantum numbers for every SMILES in
/// `tmpForRDKit_<SUFFIX>.txt`, writing the table to
/// `tmpForRDKit_out_<SUFFIX>.txt`. Molecules that fail to parse get a row of
/// -777.0 values.
#[derive(Parser)]
struct Cli {
    /// The run identifier substituted into the input and output filenames.
    suffix: String,

    /// A TOML file overriding the default filenames and progress interval.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// The number of threads to use. 1 runs sequentially, and 0 uses one
    /// thread per logical CPU as detected by rayon.
    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// The directory containing the input file and receiving the output.
    #[arg(short, long, default_value = ".")]
    directory: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            info!("loading config from {}", path.display());
            Config::load(path)?
        }
        None => Config::default(),
    };

    run_mqn(&config, &cli.directory, &cli.suffix, cli.threads)?;

    println!("{VERSION}");

    Ok(())
}
