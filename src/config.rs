use std::path::{Path, PathBuf};

pub const DEFAULT_RUN_ROOT: &str = "/garnet/Ultima/UG100_01";

/// Where a run's input lives and where its reports go, all derived from the
/// run name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    pub run_name: String,
    pub run_root: PathBuf,
    pub output_root: PathBuf,
}

impl RunLayout {
    pub fn new(run_name: &str, run_root: &Path, output_root: &Path) -> Self {
        RunLayout {
            run_name: run_name.to_string(),
            run_root: run_root.to_path_buf(),
            output_root: output_root.to_path_buf(),
        }
    }

    /// `<run_root>/<run_name>`
    pub fn run_dir(&self) -> PathBuf {
        self.run_root.join(&self.run_name)
    }

    /// `<output_root>/<run_name>`
    pub fn output_dir(&self) -> PathBuf {
        self.output_root.join(&self.run_name)
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.output_dir().join("Reports")
    }

    /// The LIMS-formatted report: `<output_dir>/<run_name>_sorted.csv`.
    pub fn report_path(&self) -> PathBuf {
        self.output_dir().join(format!("{}_sorted.csv", self.run_name))
    }

    /// The unknown-barcode overflow table.
    pub fn unknown_barcodes_path(&self) -> PathBuf {
        self.reports_dir().join("Top_Unknown_Barcodes.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = RunLayout::new(
            "422022-20250613_1638",
            Path::new("/runs"),
            Path::new("/out"),
        );
        assert_eq!(layout.run_dir(), Path::new("/runs/422022-20250613_1638"));
        assert_eq!(
            layout.report_path(),
            Path::new("/out/422022-20250613_1638/422022-20250613_1638_sorted.csv")
        );
        assert_eq!(
            layout.unknown_barcodes_path(),
            Path::new("/out/422022-20250613_1638/Reports/Top_Unknown_Barcodes.csv")
        );
    }
}
