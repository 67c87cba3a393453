use anyhow::{Context, Result};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::io::{read_metric_file, MetricValues};
use crate::matcher::{classify_folder, FolderClassification};
use crate::sample_sheet::SampleIndex;
use crate::{FolderObservation, PREDM, YIELD_PASS_THRESHOLD};

/// One processed metric file: the sample it belongs to plus its yield metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub fcid: String,
    pub lane: String,
    pub sample_id: String,
    pub sample_ref: String,
    pub index_sequence: String,
    pub recipe: String,
    pub project: String,
    pub library_type: String,
    pub application_type: String,
    pub plate_id: String,
    pub lib_id: String,
    pub cmpny_cd: String,
    pub yield_value: f64,
    pub pf_barcode_reads: i64,
    pub mean_read_length: f64,
    pub non_pass: bool,
}

impl ResultRow {
    /// Build a row, deriving yield and pass/fail from the two raw metrics.
    pub fn new(classification: &FolderClassification, pf_barcode_reads: i64, mean_read_length: f64) -> Self {
        let yield_value = pf_barcode_reads as f64 * mean_read_length;
        let non_pass = yield_value < YIELD_PASS_THRESHOLD;
        let predm = || PREDM.to_string();
        match classification {
            FolderClassification::Known(rec) => ResultRow {
                fcid: rec.fcid.clone(),
                lane: rec.lane.clone(),
                sample_id: rec.sample_id.clone(),
                sample_ref: rec.sample_ref.clone(),
                index_sequence: String::new(),
                recipe: rec.recipe.clone(),
                project: rec.project.clone(),
                library_type: rec.library_type.clone(),
                application_type: rec.application_type.clone(),
                plate_id: rec.plate_id.clone(),
                lib_id: rec.lib_id.clone(),
                cmpny_cd: rec.cmpny_cd.clone(),
                yield_value,
                pf_barcode_reads,
                mean_read_length,
                non_pass,
            },
            FolderClassification::Unknown {
                sample_ref,
                index_sequence,
            } => ResultRow {
                fcid: predm(),
                lane: predm(),
                sample_id: predm(),
                sample_ref: sample_ref.clone(),
                index_sequence: index_sequence.clone(),
                recipe: predm(),
                project: predm(),
                library_type: predm(),
                application_type: predm(),
                plate_id: predm(),
                lib_id: predm(),
                cmpny_cd: predm(),
                yield_value,
                pf_barcode_reads,
                mean_read_length,
                non_pass,
            },
        }
    }

    pub fn from_metrics(classification: &FolderClassification, metrics: &MetricValues) -> Self {
        Self::new(
            classification,
            metrics.pf_barcode_reads_or_default(),
            metrics.mean_read_length_or_default(),
        )
    }

    /// Rows for barcodes missing from the sample sheet.
    pub fn is_unassigned(&self) -> bool {
        self.sample_id == PREDM
    }
}

/// List every directory below `run_dir` in a stable order. The root itself
/// is not a barcode folder and is left out. Any walk error, such as a missing
/// root, is returned.
pub fn barcode_dirs(run_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(run_dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", run_dir.display()))?;
        if entry.depth() > 0 && entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}

/// Classify one directory and turn each of its metric files into a row.
fn process_dir(dir: &Path, index: &SampleIndex) -> Result<Vec<ResultRow>> {
    let name = dir
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let obs = FolderObservation::new(&name);
    if obs.is_housekeeping() {
        log::debug!("Skipping housekeeping folder {}", dir.display());
        return Ok(Vec::new());
    }

    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if obs.matches_metric_file(&file_name) {
            files.push((file_name, entry.path()));
        }
    }
    if files.is_empty() {
        return Ok(Vec::new());
    }
    files.sort();

    let classification = classify_folder(&obs, index);
    let mut rows = Vec::with_capacity(files.len());
    for (file_name, path) in files {
        log::debug!("Processing file: {}", file_name);
        let metrics = read_metric_file(&path)?;
        if metrics.is_degraded() {
            log::warn!(
                "{}: missing or unparseable metric (PF_Barcode_reads={:?}, Mean_Read_Length={:?}), using 0",
                path.display(),
                metrics.pf_barcode_reads,
                metrics.mean_read_length
            );
        }
        rows.push(ResultRow::from_metrics(&classification, &metrics));
    }
    Ok(rows)
}

/// Walk a run directory and collect one row per metric file.
pub fn collect_metrics(run_dir: &Path, index: &SampleIndex) -> Result<Vec<ResultRow>> {
    collect_metrics_with_progress(run_dir, index, &ProgressBar::hidden())
}

/// Same as [`collect_metrics`], ticking `progress` once per directory.
///
/// Directories are processed in parallel, but rows come back in walk order.
pub fn collect_metrics_with_progress(
    run_dir: &Path,
    index: &SampleIndex,
    progress: &ProgressBar,
) -> Result<Vec<ResultRow>> {
    let dirs = barcode_dirs(run_dir)?;
    progress.set_length(dirs.len() as u64);

    // 1. Parallel compute
    let per_dir: Vec<Result<Vec<ResultRow>>> = dirs
        .par_iter()
        .map(|dir| {
            let rows = process_dir(dir, index);
            progress.inc(1);
            rows
        })
        .collect();

    // 2. Serial merge
    let mut rows = Vec::new();
    for dir_rows in per_dir {
        rows.extend(dir_rows?);
    }
    progress.finish_and_clear();

    log::info!(
        "Collected {} rows from {} directories under {}",
        rows.len(),
        dirs.len(),
        run_dir.display()
    );
    Ok(rows)
}
