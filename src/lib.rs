use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use chem::descriptors::Calculator;
use chem::mqn::{mqn_from_smiles, MqnRow, MQN_LEN, SENTINEL_VALUE};
use chem::Molecule;
use log::{debug, info, trace};
use rayon::iter::{
    IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator,
};
use table::{Table, Value};

pub mod chem;
pub mod config;
pub mod error;
pub mod table;

pub use config::Config;
pub use error::{Error, Result};

/// the crate version, printed as the last line of every run
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Split `s` into lines on `\n`, `\r\n` or `\r`. A trailing line break does
/// not start another line, but blank lines in the middle are kept.
pub fn split_lines(s: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = s;
    while !rest.is_empty() {
        let Some(i) = rest.find(|c: char| c == '\n' || c == '\r') else {
            lines.push(rest.to_owned());
            break;
        };
        lines.push(rest[..i].to_owned());
        let skip = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[i + skip..];
    }
    lines
}

/// load the entries of `path`, one per line
pub fn load_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let s = std::fs::read_to_string(path).map_err(Error::io(path))?;
    Ok(split_lines(&s))
}

/// Counts processed molecules and prints `{label}: {i}` for every
/// `interval`th one, starting with the first.
struct Progress<'a> {
    label: &'a str,
    interval: usize,
    count: AtomicUsize,
}

impl<'a> Progress<'a> {
    fn new(label: &'a str, interval: usize) -> Self {
        Self {
            label,
            interval,
            count: AtomicUsize::new(0),
        }
    }

    /// count one molecule, returning the line to print when it is due
    fn tick(&self) -> Option<String> {
        let cur = self.count.fetch_add(1, Ordering::Relaxed);
        (self.interval > 0 && cur % self.interval == 0)
            .then(|| format!("{}: {cur}", self.label))
    }
}

/// Apply `f` to every line, in order. With `threads == 1` this runs on the
/// calling thread, otherwise on a dedicated rayon pool of that many threads
/// (0 meaning one per logical CPU). The output order always matches the
/// input order.
fn map_rows<T, F>(
    lines: &[String],
    threads: usize,
    progress: &Progress,
    f: F,
) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize, &str) -> T + Sync,
{
    let map_op = |(i, line): (usize, &String)| {
        let row = f(i, line);
        if let Some(msg) = progress.tick() {
            println!("{msg}");
        }
        row
    };
    if threads == 1 {
        return Ok(lines.iter().enumerate().map(map_op).collect());
    }
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    Ok(pool.install(|| lines.par_iter().enumerate().map(map_op).collect()))
}

/// Compute the descriptors named by `calc` for every SMILES in `smiles`.
/// The first SMILES that fails to parse aborts the whole table.
pub fn descriptor_table(
    calc: &Calculator,
    smiles: &[String],
    threads: usize,
    progress_interval: usize,
) -> Result<Table> {
    let progress = Progress::new("Calculating descriptors", progress_interval);
    let rows = map_rows(smiles, threads, &progress, |i, smi| -> Result<_> {
        trace!("parsing {smi}");
        let mol = Molecule::from_smiles(smi).map_err(|source| Error::Smiles {
            line: i + 1,
            smiles: smi.to_owned(),
            source,
        })?;
        Ok(calc.calc(&mol))
    })?;
    let rows = rows.into_iter().collect::<Result<Vec<_>>>()?;
    Ok(Table::new(Some(calc.descriptor_names().to_vec()), rows))
}

/// Compute MQN vectors for every SMILES in `smiles`, substituting the
/// sentinel row for any molecule that fails.
pub fn mqn_rows(
    smiles: &[String],
    threads: usize,
    progress_interval: usize,
) -> Result<Vec<MqnRow>> {
    let progress =
        Progress::new("Calculating MQN descriptors", progress_interval);
    map_rows(smiles, threads, &progress, |i, smi| {
        trace!("parsing {smi}");
        let row = mqn_from_smiles(smi);
        if let Err(e) = &row {
            debug!("line {}: substituting sentinel row: {e}", i + 1);
        }
        row
    })
}

/// Lay out MQN rows as a table with positional headers. A single sentinel
/// row turns every value into a float, and an empty input gives a table
/// with no header at all.
pub fn mqn_table(rows: &[MqnRow]) -> Table {
    if rows.is_empty() {
        return Table::default();
    }
    let header = (0..MQN_LEN).map(|i| i.to_string()).collect();
    let any_sentinel = rows.iter().any(|r| r.is_err());
    let rows = rows
        .iter()
        .map(|row| match row {
            Ok(mqn) => mqn
                .0
                .iter()
                .map(|&n| {
                    let v = Value::Int(i64::from(n));
                    if any_sentinel {
                        v.to_float()
                    } else {
                        v
                    }
                })
                .collect(),
            Err(_) => vec![Value::Float(SENTINEL_VALUE); MQN_LEN],
        })
        .collect();
    Table::new(Some(header), rows)
}

/// Run the descriptor pipeline over the files in `dir` named by `config`
/// and `suffix`, returning the path of the written table.
pub fn run_descriptors(
    config: &Config,
    dir: impl AsRef<Path>,
    suffix: &str,
    threads: usize,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let names_path = config.descriptor_path(dir);
    let input = config.input_path(dir, suffix)?;
    let output = config.output_path(dir, suffix)?;

    info!("loading descriptor names from {}", names_path.display());
    let calc = Calculator::new(load_lines(&names_path)?);
    info!("loading SMILES from {}", input.display());
    let smiles = load_lines(&input)?;
    info!(
        "computing {} descriptors for {} molecules",
        calc.descriptor_names().len(),
        smiles.len()
    );

    let table =
        descriptor_table(&calc, &smiles, threads, config.progress_interval)?;
    info!("writing {} rows to {}", table.len(), output.display());
    table.write_csv(&output)?;
    Ok(output)
}

/// Run the MQN pipeline over the files in `dir` named by `config` and
/// `suffix`, returning the path of the written table.
pub fn run_mqn(
    config: &Config,
    dir: impl AsRef<Path>,
    suffix: &str,
    threads: usize,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let input = config.input_path(dir, suffix)?;
    let output = config.output_path(dir, suffix)?;

    info!("loading SMILES from {}", input.display());
    let smiles = load_lines(&input)?;

    let rows = mqn_rows(&smiles, threads, config.progress_interval)?;
    let failed = rows.iter().filter(|r| r.is_err()).count();
    info!("{failed} of {} molecules replaced by sentinel rows", rows.len());

    let table = mqn_table(&rows);
    info!("writing {} rows to {}", table.len(), output.display());
    table.write_csv(&output)?;
    Ok(output)
}
