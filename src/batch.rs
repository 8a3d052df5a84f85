//! Directory-level processing and validation.
//!
//! A book's text directory holds chapter pages, part dividers and
//! everything else (cover, copyright, contents). Chapters and part dividers
//! are recognised by file name; all other files are left alone.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::compliance::check_chapter;
use crate::config::Config;
use crate::error::Result;
use crate::extract::extract_chapter;
use crate::part::process_part_file;
use crate::preserve::verify_preservation;
use crate::roman::{chapter_number_from_filename, from_roman, to_roman};
use crate::transform::{transform_file, verify_transform};
use crate::util::read_document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Chapter,
    Part,
}

/// Chapter and part-divider file name patterns.
pub(crate) struct FileClassifier {
    chapter: GlobMatcher,
    part: GlobMatcher,
}

impl FileClassifier {
    pub(crate) fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            chapter: Glob::new(&config.batch.chapter_pattern)?.compile_matcher(),
            part: Glob::new(&config.batch.part_pattern)?.compile_matcher(),
        })
    }

    pub(crate) fn classify(&self, name: &str) -> Option<FileKind> {
        if self.chapter.is_match(name) {
            Some(FileKind::Chapter)
        } else if self.part.is_match(name) {
            Some(FileKind::Part)
        } else {
            None
        }
    }

    /// Chapter and part files directly inside `dir`, sorted by name.
    fn collect(&self, dir: &Path) -> Result<Vec<(String, FileKind)>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match self.classify(&name) {
                Some(kind) => files.push((name, kind)),
                None => debug!(file = %name, "Skipping unrecognised file"),
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileStatus {
    /// Written with all content preserved.
    Preserved,
    /// Written, but the preservation check found a difference.
    Changed { summary: String },
    /// Could not be processed; nothing was written.
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub name: String,
    pub kind: FileKind,
    #[serde(flatten)]
    pub status: FileStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub files: Vec<FileOutcome>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn count(&self, kind: FileKind) -> usize {
        self.files.iter().filter(|f| f.kind == kind).count()
    }

    pub fn preserved(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Preserved)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Failed { .. }))
            .count()
    }

    /// Every file processed and preserved.
    pub fn is_success(&self) -> bool {
        self.preserved() == self.total()
    }
}

/// Process every chapter and part divider in `input_dir` into `output_dir`.
///
/// Files are written under the same name. A file that fails is recorded in
/// the summary and the batch carries on.
pub fn process_directory(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &Config,
) -> Result<BatchSummary> {
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();
    let classifier = FileClassifier::new(config)?;
    let files = classifier.collect(input_dir)?;
    std::fs::create_dir_all(output_dir)?;

    info!(
        input = %input_dir.display(),
        output = %output_dir.display(),
        files = files.len(),
        strategy = %config.batch.strategy,
        "Processing directory"
    );

    let mut summary = BatchSummary::default();
    for (name, kind) in files {
        let input = input_dir.join(&name);
        let output = output_dir.join(&name);

        let result = match kind {
            FileKind::Chapter => {
                transform_file(&input, &output, config.batch.strategy, &config.render)
                    .map(|outcome| outcome.preservation)
            }
            FileKind::Part => process_part_file(&input, &output).map(|outcome| outcome.preservation),
        };

        let status = match result {
            Ok(report) if report.is_preserved() => FileStatus::Preserved,
            Ok(report) => FileStatus::Changed {
                summary: report.summary(),
            },
            Err(e) => {
                warn!(file = %name, error = %e, "Failed to process file");
                FileStatus::Failed {
                    error: e.to_string(),
                }
            }
        };
        summary.files.push(FileOutcome { name, kind, status });
    }

    info!(
        total = summary.total(),
        preserved = summary.preserved(),
        failed = summary.failed(),
        "Directory processed"
    );
    Ok(summary)
}

/// Validation result for one input file and its processed counterpart.
#[derive(Debug, Clone, Serialize)]
pub struct FileValidation {
    pub name: String,
    pub kind: FileKind,
    pub content_preserved: bool,
    /// Preservation summary or the reason the check could not run.
    pub content_detail: String,
    /// Chapters only; part dividers are always compliant.
    pub compliant: bool,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub output_dir: PathBuf,
    pub files: Vec<FileValidation>,
    /// Percentage of files whose content was preserved.
    pub content_rate: f64,
    /// Percentage of chapters passing the compliance checks.
    pub compliance_rate: f64,
    pub content_threshold: f64,
    pub compliance_threshold: f64,
}

impl ValidationSummary {
    pub fn content_passed(&self) -> bool {
        self.content_rate >= self.content_threshold
    }

    pub fn compliance_passed(&self) -> bool {
        self.compliance_rate >= self.compliance_threshold
    }

    pub fn passed(&self) -> bool {
        self.content_passed() && self.compliance_passed()
    }
}

/// Compare each chapter and part divider in `input_dir` against its
/// processed counterpart in `output_dir`.
///
/// Content rate is taken over all files; compliance rate over chapters only.
/// A directory with no chapters has a compliance rate of 100, and an empty
/// directory a content rate of 0.
pub fn validate_directory(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &Config,
) -> Result<ValidationSummary> {
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();
    let classifier = FileClassifier::new(config)?;

    let mut files = Vec::new();
    for (name, kind) in classifier.collect(input_dir)? {
        let validation = validate_file(
            &input_dir.join(&name),
            &output_dir.join(&name),
            &name,
            kind,
            config,
        );
        if !validation.content_preserved || !validation.compliant {
            warn!(
                file = %name,
                content = validation.content_preserved,
                compliant = validation.compliant,
                issues = validation.issues.len(),
                "Validation issues"
            );
        }
        files.push(validation);
    }

    let preserved = files.iter().filter(|f| f.content_preserved).count();
    let chapters: Vec<&FileValidation> = files.iter().filter(|f| f.kind == FileKind::Chapter).collect();
    let compliant = chapters.iter().filter(|f| f.compliant).count();

    let summary = ValidationSummary {
        output_dir: output_dir.to_path_buf(),
        content_rate: percentage(preserved, files.len(), 0.0),
        compliance_rate: percentage(compliant, chapters.len(), 100.0),
        content_threshold: config.validate.content_threshold,
        compliance_threshold: config.validate.compliance_threshold,
        files,
    };

    info!(
        content_rate = summary.content_rate,
        compliance_rate = summary.compliance_rate,
        passed = summary.passed(),
        "Directory validated"
    );
    Ok(summary)
}

fn percentage(count: usize, total: usize, empty: f64) -> f64 {
    if total == 0 {
        empty
    } else {
        count as f64 * 100.0 / total as f64
    }
}

fn validate_file(
    input: &Path,
    output: &Path,
    name: &str,
    kind: FileKind,
    config: &Config,
) -> FileValidation {
    let mut validation = FileValidation {
        name: name.to_string(),
        kind,
        content_preserved: false,
        content_detail: String::new(),
        compliant: kind == FileKind::Part,
        issues: Vec::new(),
    };

    if !output.exists() {
        validation.content_detail = "Output file not found".to_string();
        validation.compliant = false;
        validation.issues.push("Output file not found".to_string());
        return validation;
    }

    let (original, processed) = match (read_document(input), read_document(output)) {
        (Ok(original), Ok(processed)) => (original, processed),
        (Err(e), _) | (_, Err(e)) => {
            validation.content_detail = format!("Validation error: {e}");
            validation.compliant = false;
            validation.issues.push(format!("Could not read file: {e}"));
            return validation;
        }
    };

    let report = match kind {
        FileKind::Chapter => verify_transform(&original, &processed, config.batch.strategy),
        FileKind::Part => Ok(verify_preservation(&original, &processed)),
    };
    match report {
        Ok(report) => {
            validation.content_preserved = report.is_preserved();
            validation.content_detail = report.summary();
        }
        Err(e) => validation.content_detail = format!("Validation error: {e}"),
    }

    if kind == FileKind::Chapter {
        validation.issues = check_chapter(&processed).issues;
        if let Some(issue) = numbering_issue(name, &processed) {
            validation.issues.push(issue);
        }
        validation.compliant = validation.issues.is_empty();
    }

    validation
}

/// Mismatch between a chapter's numeral and its position in the spine.
fn numbering_issue(name: &str, processed: &str) -> Option<String> {
    let expected = chapter_number_from_filename(name)?;
    let roman = extract_chapter(processed).ok()?.roman;
    match from_roman(&roman) {
        Some(found) if found == expected => None,
        _ => Some(format!(
            "Chapter numeral {roman} does not match file position (expected {})",
            to_roman(expected)
        )),
    }
}
