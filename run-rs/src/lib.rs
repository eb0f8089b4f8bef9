//! Run environment for simulation models.
//!
//! A run is described by a JSON document with an `input` section holding the
//! model parameters (plus the reserved `seed` and `replicate` keys) and an
//! optional `output` section naming where tables should be written.

mod error;

pub use error::{Error, Result};

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

pub struct Environment<I = ()> {
    input_json: serde_json::Map<String, Value>,
    pub input: Option<I>,
    pub seed: u64,
    pub replicate: u64,
    output: Value,
}

impl Environment {
    pub fn from_json(data: Value) -> Self {
        let mut input_json = match data.get("input") {
            Some(Value::Object(input)) => input.clone(),
            _ => serde_json::Map::new(),
        };

        // Run-level keys are not part of the model input
        let mut take_reserved = |key: &str| {
            input_json
                .remove(key)
                .and_then(|v| v.as_u64())
                .unwrap_or(0)
        };
        let seed = take_reserved("seed");
        let replicate = take_reserved("replicate");

        debug!(seed, replicate, "loaded run environment");

        Self {
            input_json,
            input: None,
            seed,
            replicate,
            output: data.get("output").cloned().unwrap_or(Value::Null),
        }
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw).map_err(Error::Read)?;
        if raw.trim().is_empty() {
            return Err(Error::EmptyInput);
        }
        let data: Value = serde_json::from_str(&raw).map_err(Error::Json)?;
        Ok(Self::from_json(data))
    }

    pub fn from_stdin() -> Result<Self> {
        Self::from_reader(io::stdin().lock())
    }

    pub fn with_input_type<I: DeserializeOwned>(self) -> Result<Environment<I>> {
        let input_value = Value::Object(self.input_json.clone());
        let input = serde_json::from_value(input_value).map_err(Error::Input)?;
        Ok(Environment {
            input_json: self.input_json,
            input: Some(input),
            seed: self.seed,
            replicate: self.replicate,
            output: self.output,
        })
    }
}

impl<I: DeserializeOwned> Environment<I> {
    pub fn load() -> Result<Self> {
        Environment::from_stdin()?.with_input_type::<I>()
    }
}

impl<I> Environment<I> {
    pub fn input_json(&self) -> &serde_json::Map<String, Value> {
        &self.input_json
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        let output = &self.output;

        // Flat output
        if output.get("spec").and_then(|v| v.as_str()) == Some("filesystem") {
            return output
                .get("dir")
                .and_then(|v| v.as_str())
                .map(PathBuf::from);
        }

        // Profiled output, falling back to the first profile
        let profiles = output.get("profile").and_then(|v| v.as_object())?;
        let profile = profiles
            .get("default")
            .or_else(|| profiles.values().next())?;
        if profile.get("spec").and_then(|v| v.as_str()) != Some("filesystem") {
            return None;
        }
        profile.get("dir").and_then(|v| v.as_str()).map(PathBuf::from)
    }

    /// Writes a CSV table to the output directory, or to stdout when the
    /// run has none.
    pub fn write_csv(&self, filename: &str, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
        self.write_csv_or(filename, headers, rows, io::stdout().lock())
    }

    fn write_csv_or<W: Write>(
        &self,
        filename: &str,
        headers: &[&str],
        rows: &[Vec<String>],
        fallback: W,
    ) -> Result<()> {
        match self.output_dir() {
            Some(dir) => {
                fs::create_dir_all(&dir).map_err(Error::Write)?;
                let path = dir.join(filename);
                let file = fs::File::create(&path).map_err(Error::Write)?;
                write_records(file, headers, rows)?;
                info!(path = %path.display(), rows = rows.len(), "wrote CSV output");
            }
            None => write_records(fallback, headers, rows)?,
        }
        Ok(())
    }
}

/// Writes a header row followed by `rows` as CSV.
pub fn write_records<W: Write>(writer: W, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(headers)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush().map_err(Error::Write)?;
    Ok(())
}
