//! Collaborator contracts driven by the scheduler.
//!
//! Everything the scheduler needs from the outside world comes through these
//! traits, so tests swap in mocks and the host wires in real machinery. All
//! of them are object-safe; the scheduler holds `Arc<dyn ...>` handles.

use std::path::Path;

use async_trait::async_trait;

use crate::diagnostics::Diagnostic;
use crate::diff::DiffSummary;
use crate::error::ReviewError;
use crate::review::{FileReviewPatch, FileReviewResult};
use crate::status::StatusState;

/// Asynchronous review backend (rule checker + AI reviewer behind one call).
///
/// May take seconds; may fail. The scheduler never retries on its own.
#[async_trait]
pub trait ReviewExecutor: Send + Sync {
	async fn review_saved_file(&self, path: &Path) -> Result<FileReviewResult, ReviewError>;
}

/// Supplies the pending diff for a file, freshly computed at call time.
pub trait DiffProvider: Send + Sync {
	/// Returns `None` when the file has no pending changes.
	fn pending_diff(&self, path: &Path) -> Option<DiffSummary>;
}

/// Supplies current editor diagnostics for a file.
pub trait DiagnosticsProvider: Send + Sync {
	fn diagnostics(&self, path: &Path) -> Vec<Diagnostic>;
}

/// The only write path into the displayed issue list.
pub trait ResultSink: Send + Sync {
	/// Applies a file-scoped result patch.
	fn apply_file_review_patch(&self, patch: FileReviewPatch);
	/// Clears "pending re-verification" markers for a file whose content is
	/// already known reviewed.
	fn clear_file_stale_markers(&self, path: &Path);
}

/// Narrow status-string channel, not a structured API.
pub trait StatusSink: Send + Sync {
	/// Replaces the current status.
	fn set_status(&self, state: StatusState, message: &str);
	/// Amends the current status without resetting host-side affordances.
	fn update_status(&self, state: StatusState, message: &str);
}

/// Document facts consulted before idle rechecks.
pub trait DocumentHost: Send + Sync {
	fn is_open(&self, path: &Path) -> bool;
	fn is_dirty(&self, path: &Path) -> bool;
	/// True while the file still carries unresolved ("stale") issues.
	fn has_stale_issues(&self, path: &Path) -> bool;
}
