//! Result tables and their CSV serialization.

use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};

/// A single descriptor value. Counts are integers, everything else is a
/// float.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl Value {
    /// the same value as a float
    pub fn to_float(self) -> Self {
        match self {
            Value::Int(i) => Value::Float(i as f64),
            f => f,
        }
    }
}

impl Display for Value {
    /// Integers print plainly. Floats print as the shortest decimal that
    /// round-trips, always with a fractional part or an exponent (`2.0`,
    /// `1e-05`, `1e+20`). NaN prints as nothing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) if x.is_nan() => Ok(()),
            Value::Float(x) => {
                let s = format!("{x:?}");
                match s.split_once('e') {
                    Some((mantissa, exp)) => {
                        let (sign, digits) = match exp.strip_prefix('-') {
                            Some(d) => ('-', d),
                            None => ('+', exp),
                        };
                        write!(f, "{mantissa}e{sign}{digits:0>2}")
                    }
                    None => f.write_str(&s),
                }
            }
        }
    }
}

/// A rectangular table of values with an optional header row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(header: Option<Vec<String>>, rows: Vec<Vec<Value>>) -> Self {
        Self { header, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// serialize the table as comma-separated values with `\n` line endings
    pub fn to_writer(&self, w: impl Write) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(w);
        if let Some(header) = &self.header {
            wtr.write_record(header)?;
        }
        for row in &self.rows {
            wtr.write_record(row.iter().map(|v| v.to_string()))?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let f = File::create(path).map_err(Error::io(path))?;
        self.to_writer(BufWriter::new(f))
    }
}
