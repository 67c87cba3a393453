use serde::Serialize;

use crate::io::CsvRow;
use crate::report::ReportRow;
use crate::PREDM;

/// One line of the LIMS import file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimsRow {
    #[serde(rename = "Lane")]
    pub lane: String,
    /// `<Project>_<SampleID>`, or `PreDM` for unassigned barcodes.
    #[serde(rename = "SampleID")]
    pub sample_id: String,
    #[serde(rename = "SampleName")]
    pub sample_name: String,
    #[serde(rename = "SampleRef")]
    pub sample_ref: String,
    #[serde(rename = "index")]
    pub index: String,
    #[serde(rename = "Project")]
    pub project: String,
    #[serde(rename = "Result(Non Pass)")]
    pub result: &'static str,
    #[serde(rename = "Reads")]
    pub reads: i64,
    #[serde(rename = "Throughput")]
    pub throughput: f64,
    #[serde(rename = "Percentage")]
    pub percentage: Option<f64>,
    #[serde(rename = "PlateId")]
    pub plate_id: String,
    #[serde(rename = "LibId")]
    pub lib_id: String,
    #[serde(rename = "CmpnyCd")]
    pub cmpny_cd: String,
}

impl CsvRow for LimsRow {
    const HEADER: &'static [&'static str] = &[
        "Lane",
        "SampleID",
        "SampleName",
        "SampleRef",
        "index",
        "Project",
        "Result(Non Pass)",
        "Reads",
        "Throughput",
        "Percentage",
        "PlateId",
        "LibId",
        "CmpnyCd",
    ];
}

impl From<&ReportRow> for LimsRow {
    fn from(row: &ReportRow) -> Self {
        let sample_id = if row.sample_id == PREDM {
            PREDM.to_string()
        } else {
            format!("{}_{}", row.project, row.sample_id)
        };
        LimsRow {
            lane: row.lane.clone(),
            sample_id,
            sample_name: row.sample_id.clone(),
            sample_ref: row.sample_ref.clone(),
            index: row.index_sequence.clone(),
            project: row.project.clone(),
            result: if row.non_pass { "Fail" } else { "Pass" },
            reads: row.pf_barcode_reads,
            throughput: row.yield_value,
            percentage: row.percent_of_pf_reads,
            plate_id: row.plate_id.clone(),
            lib_id: row.lib_id.clone(),
            cmpny_cd: row.cmpny_cd.clone(),
        }
    }
}

/// Project the report table onto the LIMS column layout, row for row.
pub fn to_lims(report_table: &[ReportRow]) -> Vec<LimsRow> {
    report_table.iter().map(LimsRow::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::write_table;
    use crate::matcher::FolderClassification;
    use crate::processing::ResultRow;
    use crate::report::with_percentages;
    use crate::sample_sheet::SampleRecord;

    fn rows() -> Vec<ReportRow> {
        let rec = SampleRecord {
            sample_id: "S1".into(),
            fcid: "F1".into(),
            lane: "1".into(),
            sample_ref: "Ref1".into(),
            index_sequence: "ATCG".into(),
            recipe: "R".into(),
            project: "P".into(),
            library_type: "L".into(),
            application_type: "Ap".into(),
            plate_id: "Pl".into(),
            lib_id: "Li".into(),
            cmpny_cd: "C".into(),
        };
        let unknown = FolderClassification::Unknown {
            sample_ref: "RefA-RefB".into(),
            index_sequence: "GGGG".into(),
        };
        with_percentages(&[
            ResultRow::new(&FolderClassification::Known(rec), 3_000_000_000, 1.0),
            ResultRow::new(&unknown, 1_000_000_000, 0.5),
        ])
    }

    #[test]
    fn test_known_sample_id_is_project_prefixed() {
        let lims = to_lims(&rows());
        assert_eq!(lims[0].sample_id, "P_S1");
        assert_eq!(lims[0].sample_name, "S1");
        assert_eq!(lims[0].result, "Pass");
        assert_eq!(lims[0].reads, 3_000_000_000);
        assert_eq!(lims[0].percentage, Some(75.0));
    }

    #[test]
    fn test_predm_sample_id_is_not_prefixed() {
        let lims = to_lims(&rows());
        assert_eq!(lims[1].sample_id, PREDM);
        assert_eq!(lims[1].sample_name, PREDM);
        assert_eq!(lims[1].project, PREDM);
        assert_eq!(lims[1].index, "GGGG");
        assert_eq!(lims[1].result, "Fail");
        assert_eq!(lims[1].throughput, 5e8);
    }

    #[test]
    fn test_lims_csv_layout() {
        let mut buf = Vec::new();
        write_table(&mut buf, &to_lims(&rows())).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Lane,SampleID,SampleName,SampleRef,index,Project,Result(Non Pass),Reads,Throughput,Percentage,PlateId,LibId,CmpnyCd"
        );
        assert!(lines[1].starts_with("1,P_S1,S1,Ref1,,P,Pass,3000000000,"));
        assert!(lines[2].starts_with("PreDM,PreDM,PreDM,RefA-RefB,GGGG,PreDM,Fail,"));
    }
}
