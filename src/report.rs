use serde::{Serialize, Serializer};

use crate::io::CsvRow;
use crate::processing::ResultRow;
use crate::PREDM;

/// Unknown barcodes promoted into the report when no known sample failed.
pub const DEFAULT_TOP_UNKNOWN: usize = 5;

/// Unknown barcodes promoted per failed known sample.
pub const UNKNOWN_PER_FAILED_SAMPLE: usize = 3;

/// A result row with its share of the run's PF barcode reads.
///
/// Serializes to the full pre-LIMS report layout, which is also the layout of
/// the unknown-barcode overflow table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "FCID")]
    pub fcid: String,
    #[serde(rename = "Lane")]
    pub lane: String,
    #[serde(rename = "Sample ID")]
    pub sample_id: String,
    #[serde(rename = "SampleRef")]
    pub sample_ref: String,
    #[serde(rename = "Index Sequence")]
    pub index_sequence: String,
    #[serde(rename = "Yield")]
    pub yield_value: f64,
    #[serde(rename = "PF_Barcode_reads")]
    pub pf_barcode_reads: i64,
    #[serde(rename = "Mean_Read_Length")]
    pub mean_read_length: f64,
    /// `None` when the run has no PF barcode reads at all.
    #[serde(rename = "% of PF Barcode_reads")]
    pub percent_of_pf_reads: Option<f64>,
    #[serde(rename = "Non_Pass", serialize_with = "serialize_title_bool")]
    pub non_pass: bool,
    #[serde(rename = "Recipe")]
    pub recipe: String,
    #[serde(rename = "Project")]
    pub project: String,
    #[serde(rename = "LibraryType")]
    pub library_type: String,
    #[serde(rename = "ApplicationType")]
    pub application_type: String,
    #[serde(rename = "PlateId")]
    pub plate_id: String,
    #[serde(rename = "LibId")]
    pub lib_id: String,
    #[serde(rename = "CmpnyCd")]
    pub cmpny_cd: String,
}

impl CsvRow for ReportRow {
    const HEADER: &'static [&'static str] = &[
        "FCID",
        "Lane",
        "Sample ID",
        "SampleRef",
        "Index Sequence",
        "Yield",
        "PF_Barcode_reads",
        "Mean_Read_Length",
        "% of PF Barcode_reads",
        "Non_Pass",
        "Recipe",
        "Project",
        "LibraryType",
        "ApplicationType",
        "PlateId",
        "LibId",
        "CmpnyCd",
    ];
}

fn serialize_title_bool<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "True" } else { "False" })
}

impl ReportRow {
    fn from_result(row: &ResultRow, percent_of_pf_reads: Option<f64>) -> Self {
        ReportRow {
            fcid: row.fcid.clone(),
            lane: row.lane.clone(),
            sample_id: row.sample_id.clone(),
            sample_ref: row.sample_ref.clone(),
            index_sequence: row.index_sequence.clone(),
            yield_value: row.yield_value,
            pf_barcode_reads: row.pf_barcode_reads,
            mean_read_length: row.mean_read_length,
            percent_of_pf_reads,
            non_pass: row.non_pass,
            recipe: row.recipe.clone(),
            project: row.project.clone(),
            library_type: row.library_type.clone(),
            application_type: row.application_type.clone(),
            plate_id: row.plate_id.clone(),
            lib_id: row.lib_id.clone(),
            cmpny_cd: row.cmpny_cd.clone(),
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.sample_id == PREDM
    }
}

/// The two tables produced for a run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Report {
    /// Known samples followed by the top unknown barcodes.
    pub report_table: Vec<ReportRow>,
    /// Unknown barcodes that did not make the cut, by yield descending.
    pub overflow_table: Vec<ReportRow>,
}

/// Round half to even at three decimals.
fn round3(x: f64) -> f64 {
    (x * 1000.0).round_ties_even() / 1000.0
}

/// Attach each row's share of the total PF barcode reads, in percent.
///
/// The total is summed as `i128` so saturated counts cannot overflow it.
pub fn with_percentages(rows: &[ResultRow]) -> Vec<ReportRow> {
    let total: i128 = rows.iter().map(|r| i128::from(r.pf_barcode_reads)).sum();
    rows.iter()
        .map(|r| {
            let pct = (total != 0).then(|| round3(r.pf_barcode_reads as f64 / total as f64 * 100.0));
            ReportRow::from_result(r, pct)
        })
        .collect()
}

/// Move every `PreDM` flowcell row after the others, keeping relative order.
pub fn predm_last(rows: Vec<ReportRow>) -> Vec<ReportRow> {
    let (mut assigned, predm): (Vec<_>, Vec<_>) = rows.into_iter().partition(|r| r.fcid != PREDM);
    assigned.extend(predm);
    assigned
}

/// How many unknown barcodes to report: three per failed known sample, or
/// [`DEFAULT_TOP_UNKNOWN`] when none failed.
pub fn top_n(fail_count: usize) -> usize {
    if fail_count > 0 {
        fail_count * UNKNOWN_PER_FAILED_SAMPLE
    } else {
        DEFAULT_TOP_UNKNOWN
    }
}

/// Build the report and the unknown-barcode overflow table from all rows of a
/// run.
pub fn assemble(rows: &[ResultRow]) -> Report {
    let ordered = predm_last(with_percentages(rows));
    let (known, mut unknown): (Vec<_>, Vec<_>) =
        ordered.into_iter().partition(|r| !r.is_unassigned());

    let fail_count = known.iter().filter(|r| r.non_pass).count();
    let n = top_n(fail_count);

    unknown.sort_by(|a, b| b.yield_value.total_cmp(&a.yield_value));
    let overflow_table = unknown.split_off(n.min(unknown.len()));

    log::info!(
        "{} known rows ({} failed), reporting {} of {} unknown barcodes",
        known.len(),
        fail_count,
        unknown.len(),
        unknown.len() + overflow_table.len()
    );

    let mut report_table = known;
    report_table.extend(unknown);
    Report {
        report_table,
        overflow_table,
    }
}
