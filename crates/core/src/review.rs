use std::path::PathBuf;

/// How the backend scoped its analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewMode {
	/// Whole file was analyzed.
	FullFile,
	/// Only the pending diff hunks were analyzed.
	DiffOnly,
}

/// Line range (1-based, inclusive) the backend actually looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReviewedRange {
	pub start_line: u32,
	pub end_line: u32,
}

/// One issue reported by the review backend.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReviewIssue {
	/// 1-based line the issue anchors to.
	pub line: u32,
	pub message: String,
	/// Backend-defined category (rule id, "ai", ...), informational only.
	#[serde(default)]
	pub category: Option<String>,
}

/// Completed backend analysis for one file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileReviewResult {
	pub issues: Vec<ReviewIssue>,
	#[serde(default)]
	pub reviewed_ranges: Vec<ReviewedRange>,
	pub mode: ReviewMode,
}

impl FileReviewResult {
	pub fn is_empty(&self) -> bool {
		self.issues.is_empty()
	}
}

/// File-scoped patch applied to the displayed issue list.
///
/// Replaces only this file's previously pending-re-verification issues.
/// `preserve_stale_on_empty` keeps the old markers when the new result is
/// empty but the host still reports unresolved errors for the file, so a
/// failed-to-reproduce review does not read as "all clear".
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileReviewPatch {
	pub path: PathBuf,
	pub result: FileReviewResult,
	pub mode: ReviewMode,
	pub preserve_stale_on_empty: bool,
}
