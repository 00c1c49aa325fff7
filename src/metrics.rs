//! Metrics recording.
//!
//! A [`Logger`] buffers key/value pairs with [`Logger::record`] and hands them
//! to every attached [`MetricsWriter`] on [`Logger::dump`]. The solver records
//! `exp` and `iter` once per evaluation and dumps at the iteration count.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::error::Result;

/// One flushed batch of metrics.
pub type MetricsRow = BTreeMap<String, Value>;

/// Destination for flushed metrics.
pub trait MetricsWriter: Send {
    /// Write one batch recorded at `step`.
    fn write(&mut self, values: &MetricsRow, step: u64) -> Result<()>;

    /// Release resources. Called once by [`Logger::close`].
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Buffers recorded values and fans them out to writers.
#[derive(Default)]
pub struct Logger {
    values: MetricsRow,
    counts: BTreeMap<String, u64>,
    writers: Vec<Box<dyn MetricsWriter>>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("values", &self.values)
            .field("writers", &self.writers.len())
            .finish()
    }
}

impl Logger {
    /// Logger without writers; records are dropped on dump.
    pub fn new() -> Self {
        Self::default()
    }

    /// Logger that writes through the `log` facade.
    pub fn stdout() -> Self {
        Self::new().with_writer(LogWriter::new())
    }

    /// Builder method: attach a writer.
    pub fn with_writer<W: MetricsWriter + 'static>(mut self, writer: W) -> Self {
        self.add_writer(Box::new(writer));
        self
    }

    /// Attach a writer.
    pub fn add_writer(&mut self, writer: Box<dyn MetricsWriter>) {
        self.writers.push(writer);
    }

    /// Set `key` for the next dump, replacing any earlier value.
    pub fn record<V: Into<Value>>(&mut self, key: &str, value: V) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Fold `value` into a running mean of `key` until the next dump.
    pub fn record_mean(&mut self, key: &str, value: f64) {
        let count = self.counts.entry(key.to_string()).or_insert(0);
        let old = self
            .values
            .get(key)
            .and_then(Value::as_f64)
            .filter(|_| *count > 0)
            .unwrap_or(0.0);
        let n = *count as f64;
        let mean = old * n / (n + 1.0) + value / (n + 1.0);
        *count += 1;
        self.values.insert(key.to_string(), Value::from(mean));
    }

    /// Values recorded since the last dump.
    pub fn pending(&self) -> &MetricsRow {
        &self.values
    }

    /// Write pending values to every writer at `step` and clear them.
    pub fn dump(&mut self, step: u64) -> Result<()> {
        for writer in &mut self.writers {
            writer.write(&self.values, step)?;
        }
        self.values.clear();
        self.counts.clear();
        Ok(())
    }

    /// Close every writer.
    pub fn close(&mut self) -> Result<()> {
        for writer in &mut self.writers {
            writer.close()?;
        }
        Ok(())
    }
}

/// Writes each batch as one `log::info!` line.
#[derive(Debug, Default, Clone)]
pub struct LogWriter {
    prefix: Option<String>,
}

impl LogWriter {
    /// Writer with no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer that tags every line, e.g. with the algorithm name.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map(|x| format!("{:.6e}", x))
            .unwrap_or_else(|| n.to_string()),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl MetricsWriter for LogWriter {
    fn write(&mut self, values: &MetricsRow, step: u64) -> Result<()> {
        if values.is_empty() {
            log::warn!("tried to write an empty metrics batch at step {}", step);
            return Ok(());
        }
        let fields: Vec<String> = values
            .iter()
            .map(|(k, v)| format!("{}={}", k, format_value(v)))
            .collect();
        match &self.prefix {
            Some(prefix) => log::info!("[{}] step {}: {}", prefix, step, fields.join(" ")),
            None => log::info!("step {}: {}", step, fields.join(" ")),
        }
        Ok(())
    }
}

/// Appends one CSV row per batch.
///
/// The header is `step` followed by the keys of the first batch. Later
/// batches are written against that header; missing keys become empty
/// cells and unknown keys are dropped with a warning.
#[derive(Debug)]
pub struct CsvWriter {
    path: PathBuf,
    out: BufWriter<File>,
    columns: Option<Vec<String>>,
}

impl CsvWriter {
    /// Create (or truncate) the file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let out = BufWriter::new(File::create(&path)?);
        Ok(Self {
            path,
            out,
            columns: None,
        })
    }
}

fn csv_cell(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    if text.contains([',', '"', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text
    }
}

impl MetricsWriter for CsvWriter {
    fn write(&mut self, values: &MetricsRow, step: u64) -> Result<()> {
        let columns = match &self.columns {
            Some(columns) => {
                let unknown: Vec<&String> =
                    values.keys().filter(|k| !columns.contains(k)).collect();
                if !unknown.is_empty() {
                    log::warn!(
                        "{}: dropping columns {:?} not present in the header",
                        self.path.display(),
                        unknown
                    );
                }
                columns.clone()
            }
            None => {
                let columns: Vec<String> = values.keys().cloned().collect();
                let header: Vec<&str> = std::iter::once("step")
                    .chain(columns.iter().map(String::as_str))
                    .collect();
                writeln!(self.out, "{}", header.join(","))?;
                self.columns = Some(columns.clone());
                columns
            }
        };

        let row: Vec<String> = std::iter::once(step.to_string())
            .chain(
                columns
                    .iter()
                    .map(|c| values.get(c).map(csv_cell).unwrap_or_default()),
            )
            .collect();
        writeln!(self.out, "{}", row.join(","))?;
        self.out.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Keeps every batch in memory behind a shared handle.
///
/// Clones share the same buffer, so a caller can keep one clone and give the
/// other to a [`Logger`].
#[derive(Debug, Default, Clone)]
pub struct MemoryWriter {
    rows: Arc<Mutex<Vec<(u64, MetricsRow)>>>,
}

impl MemoryWriter {
    /// Empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every `(step, batch)` written so far.
    pub fn rows(&self) -> Vec<(u64, MetricsRow)> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Values of `key` in write order, skipping batches without it.
    pub fn series(&self, key: &str) -> Vec<(u64, f64)> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|(step, row)| row.get(key).and_then(Value::as_f64).map(|v| (*step, v)))
            .collect()
    }
}

impl MetricsWriter for MemoryWriter {
    fn write(&mut self, values: &MetricsRow, step: u64) -> Result<()> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((step, values.clone()));
        Ok(())
    }
}
