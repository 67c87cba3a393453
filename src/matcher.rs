use crate::sample_sheet::{SampleIndex, SampleRecord};
use crate::{FolderObservation, PREDM};

/// Outcome of matching a barcode folder against the sample sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderClassification {
    /// The folder's barcode belongs to a sample in the sheet.
    Known(SampleRecord),
    /// Unassigned reads. `sample_ref` and `index_sequence` are recovered from
    /// the folder name as well as possible.
    Unknown {
        sample_ref: String,
        index_sequence: String,
    },
}

/// Whether a barcode looks like a nucleotide sequence. Only the first base
/// is checked.
pub fn looks_like_nucleotides(barcode: &str) -> bool {
    matches!(barcode.as_bytes().first(), Some(b'A' | b'T' | b'G' | b'C'))
}

/// Guess the sample reference of an unassigned folder from its layout:
/// `<run>-<ref>-<barcode>` or `<run>-<ref1>-<ref2>-<barcode>`.
pub fn sample_ref_from_parts(parts: &[String]) -> String {
    match parts {
        [_, a, b, _] => format!("{}-{}", a, b),
        [_, a, _] => a.clone(),
        _ => PREDM.to_string(),
    }
}

/// Classify one folder. Pure: the result depends only on the folder name and
/// the index.
pub fn classify_folder(obs: &FolderObservation, index: &SampleIndex) -> FolderClassification {
    match index.lookup_barcode(&obs.barcode) {
        Some(record) => FolderClassification::Known(record.clone()),
        None => {
            let index_sequence = if looks_like_nucleotides(&obs.barcode) {
                obs.barcode.clone()
            } else {
                String::new()
            };
            FolderClassification::Unknown {
                sample_ref: sample_ref_from_parts(&obs.dash_parts),
                index_sequence,
            }
        }
    }
}
