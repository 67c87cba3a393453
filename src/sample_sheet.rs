use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Header columns every sample sheet must carry.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "FCID",
    "Lane",
    "SampleID",
    "SampleRef",
    "Index Seq",
    "Recipe",
    "Project",
    "LibraryType",
    "ApplicationType",
    "PlateId",
    "LibId",
    "CmpnyCd",
];

#[derive(Debug, Error)]
pub enum SampleSheetError {
    #[error("sample sheet is missing required column '{0}'")]
    MissingColumn(String),
    #[error("failed to parse sample sheet: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to open sample sheet {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// One row of the sample sheet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SampleRecord {
    #[serde(rename = "SampleID")]
    pub sample_id: String,
    #[serde(rename = "FCID")]
    pub fcid: String,
    #[serde(rename = "Lane")]
    pub lane: String,
    #[serde(rename = "SampleRef")]
    pub sample_ref: String,
    #[serde(rename = "Index Seq")]
    pub index_sequence: String,
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

/// Barcode and sample lookups built from a sample sheet.
///
/// Both maps are last-write-wins: a barcode or sample id that appears twice
/// resolves to the row read last.
#[derive(Debug, Default, Clone)]
pub struct SampleIndex {
    barcodes: HashMap<String, String>,
    samples: HashMap<String, SampleRecord>,
}

impl SampleIndex {
    /// Build an index from already-parsed records, in sheet order.
    pub fn from_records<I: IntoIterator<Item = SampleRecord>>(records: I) -> Self {
        let mut index = SampleIndex::default();
        for record in records {
            index
                .barcodes
                .insert(record.index_sequence.clone(), record.sample_id.clone());
            index.samples.insert(record.sample_id.clone(), record);
        }
        index
    }

    /// Parse a comma-delimited sample sheet. Fails with
    /// [`SampleSheetError::MissingColumn`] before reading any row if a required
    /// column is absent.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SampleSheetError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b',')
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|col| !headers.iter().any(|h| h == **col))
        {
            return Err(SampleSheetError::MissingColumn(missing.to_string()));
        }

        let mut records = Vec::new();
        for result in rdr.deserialize() {
            let record: SampleRecord = result?;
            records.push(record);
        }
        log::info!("Loaded {} sample sheet rows", records.len());
        Ok(Self::from_records(records))
    }

    pub fn from_path(path: &Path) -> Result<Self, SampleSheetError> {
        let file = File::open(path).map_err(|source| SampleSheetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Resolve a barcode to the sample it was assigned to.
    pub fn lookup_barcode(&self, barcode: &str) -> Option<&SampleRecord> {
        self.barcodes
            .get(barcode)
            .and_then(|sample_id| self.samples.get(sample_id))
    }

    /// Distinct barcodes in the sheet.
    pub fn num_barcodes(&self) -> usize {
        self.barcodes.len()
    }

    /// Distinct sample ids in the sheet.
    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "FCID,Lane,SampleID,SampleRef,Index Seq,Recipe,Project,LibraryType,ApplicationType,PlateId,LibId,CmpnyCd\n";

    #[test]
    fn test_index_from_sheet() {
        let sheet = format!("{HEADER}F1,1,S1,Ref1,ATCG,R,P,L,Ap,Pl,Li,C\nF1,2,S2,Ref2,GGTT,R,P,L,Ap,Pl,Li,C\n");
        let index = SampleIndex::from_reader(sheet.as_bytes()).unwrap();
        assert_eq!(index.num_barcodes(), 2);
        assert_eq!(index.num_samples(), 2);

        let s1 = index.lookup_barcode("ATCG").unwrap();
        assert_eq!(s1.sample_id, "S1");
        assert_eq!(s1.lane, "1");
        assert_eq!(s1.sample_ref, "Ref1");
        assert_eq!(s1.cmpny_cd, "C");
        assert_eq!(index.lookup_barcode("GGTT").unwrap().sample_id, "S2");
        assert!(index.lookup_barcode("AAAA").is_none());
    }

    #[test]
    fn test_duplicate_barcode_last_write_wins() {
        let sheet = format!("{HEADER}F1,1,S1,Ref1,ATCG,R,P,L,Ap,Pl,Li,C\nF1,1,S9,Ref9,ATCG,R,P,L,Ap,Pl,Li,C\n");
        let index = SampleIndex::from_reader(sheet.as_bytes()).unwrap();
        assert_eq!(index.num_barcodes(), 1);
        assert_eq!(index.lookup_barcode("ATCG").unwrap().sample_id, "S9");
    }

    #[test]
    fn test_duplicate_sample_id_resolves_to_last_row() {
        // Both barcodes point at S1, whose record is the one read last
        let sheet = format!("{HEADER}F1,1,S1,Ref1,ATCG,R,P,L,Ap,Pl,Li,C\nF2,3,S1,Ref2,GGGG,R,P,L,Ap,Pl,Li,C\n");
        let index = SampleIndex::from_reader(sheet.as_bytes()).unwrap();
        assert_eq!(index.lookup_barcode("ATCG").unwrap().fcid, "F2");
        assert_eq!(index.lookup_barcode("GGGG").unwrap().lane, "3");
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let sheet = "Extra,FCID,Lane,SampleID,SampleRef,Index Seq,Recipe,Project,LibraryType,ApplicationType,PlateId,LibId,CmpnyCd\n\
                     x,F1,1,S1,Ref1,ATCG,R,P,L,Ap,Pl,Li,C\n";
        let index = SampleIndex::from_reader(sheet.as_bytes()).unwrap();
        assert_eq!(index.lookup_barcode("ATCG").unwrap().project, "P");
    }

    #[test]
    fn test_values_are_trimmed() {
        let sheet = format!("{HEADER}F1, 1 ,S1,Ref1, ATCG ,R,P,L,Ap,Pl,Li,C\n");
        let index = SampleIndex::from_reader(sheet.as_bytes()).unwrap();
        let rec = index.lookup_barcode("ATCG").unwrap();
        assert_eq!(rec.index_sequence, "ATCG");
        assert_eq!(rec.lane, "1");
        assert!(index.lookup_barcode(" ATCG ").is_none());
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let sheet = "FCID,Lane,SampleID,SampleRef,Recipe,Project,LibraryType,ApplicationType,PlateId,LibId,CmpnyCd\n\
                     F1,1,S1,Ref1,R,P,L,Ap,Pl,Li,C\n";
        match SampleIndex::from_reader(sheet.as_bytes()) {
            Err(SampleSheetError::MissingColumn(col)) => assert_eq!(col, "Index Seq"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }
}
