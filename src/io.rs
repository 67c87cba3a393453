use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

pub const PF_BARCODE_READS: &str = "PF_Barcode_reads";
pub const MEAN_READ_LENGTH: &str = "Mean_Read_Length";

/// A row type that can be written as one line of a CSV table.
///
/// `HEADER` is written explicitly so that a table with no rows still carries
/// its column names.
pub trait CsvRow: Serialize {
    const HEADER: &'static [&'static str];
}

/// The raw values read from a headerless `(Metric, Value)` metric file.
///
/// A value is `None` when the metric is absent. Only the first occurrence of
/// each metric counts.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MetricValues {
    pub pf_barcode_reads: Option<String>,
    pub mean_read_length: Option<String>,
}

impl MetricValues {
    /// Read count, if present and numeric. Float-formatted counts such as
    /// `1.5e3` are truncated.
    pub fn pf_barcode_reads(&self) -> Option<i64> {
        let v = self.pf_barcode_reads.as_deref()?;
        v.parse::<i64>()
            .ok()
            .or_else(|| v.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
    }

    /// Mean read length, if present and finite. `nan` and `inf` count as
    /// unparseable.
    pub fn mean_read_length(&self) -> Option<f64> {
        self.mean_read_length
            .as_deref()?
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
    }

    pub fn pf_barcode_reads_or_default(&self) -> i64 {
        self.pf_barcode_reads().unwrap_or(0)
    }

    pub fn mean_read_length_or_default(&self) -> f64 {
        self.mean_read_length().unwrap_or(0.0)
    }

    /// True when either metric had to fall back to 0.
    pub fn is_degraded(&self) -> bool {
        self.pf_barcode_reads().is_none() || self.mean_read_length().is_none()
    }
}

/// Parse a metric file from any reader. Records that the CSV parser rejects
/// are skipped; only I/O failures are errors.
pub fn parse_metrics<R: Read>(reader: R) -> Result<MetricValues> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut values = MetricValues::default();
    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(e).context("Failed to read metric file"),
            Err(e) => {
                log::debug!("Skipping malformed metric record: {}", e);
                continue;
            }
        };
        let (Some(metric), Some(value)) = (record.get(0), record.get(1)) else {
            continue;
        };
        let slot = match metric {
            PF_BARCODE_READS => &mut values.pf_barcode_reads,
            MEAN_READ_LENGTH => &mut values.mean_read_length,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }
    Ok(values)
}

pub fn read_metric_file(path: &Path) -> Result<MetricValues> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    parse_metrics(file).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write `rows` as CSV, header first.
pub fn write_table<W: Write, T: CsvRow>(writer: W, rows: &[T]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(T::HEADER)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Create `path` and write `rows` into it as CSV.
pub fn write_csv_file<T: CsvRow>(path: &Path, rows: &[T]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_table(BufWriter::new(file), rows)
        .with_context(|| format!("Failed to write {}", path.display()))
}
