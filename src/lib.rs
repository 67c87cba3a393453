pub mod config;
pub mod io;
pub mod lims;
pub mod matcher;
pub mod processing;
pub mod report;
pub mod sample_sheet;

/// Sentinel identity given to every field of a barcode that is not in the
/// sample sheet.
pub const PREDM: &str = "PreDM";

/// Yield below this many bases marks a sample as failed.
pub const YIELD_PASS_THRESHOLD: f64 = 1_000_000_000.0;

/// A barcode directory name broken into its `-`-delimited parts.
///
/// The barcode is the final part. A name without any `-` is a single part,
/// so the whole name is the barcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderObservation {
    pub folder_name: String,
    pub dash_parts: Vec<String>,
    pub barcode: String,
}

impl FolderObservation {
    pub fn new(folder_name: &str) -> Self {
        let dash_parts: Vec<String> = folder_name.split('-').map(str::to_string).collect();
        let barcode = dash_parts.last().cloned().unwrap_or_default();
        FolderObservation {
            folder_name: folder_name.to_string(),
            dash_parts,
            barcode,
        }
    }

    /// Instrument housekeeping folders (`TT-TT`) and the unknown-reads sentinel
    /// folder (`UNKN`) never contribute rows.
    pub fn is_housekeeping(&self) -> bool {
        self.folder_name.contains("TT-TT") || self.folder_name.contains("UNKN")
    }

    /// Whether `file_name` is a per-barcode metric file for this folder.
    pub fn matches_metric_file(&self, file_name: &str) -> bool {
        !file_name.starts_with("merged") && file_name.ends_with(&format!("{}.csv", self.barcode))
    }
}
