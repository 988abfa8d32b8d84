/// One hunk of a pending diff, new-side coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DiffHunk {
	/// First line of the hunk on the new side (1-based).
	pub new_start: u32,
	/// Number of lines the hunk spans on the new side.
	pub new_count: u32,
	/// Raw hunk lines, prefix characters included.
	#[serde(default)]
	pub lines: Vec<String>,
}

/// Summary of the pending (unstaged + staged) changes for one file.
///
/// Produced by the host's diff machinery; the scheduler only reads it. The
/// `added_content` list, when present, carries just the added lines with
/// prefixes stripped and is preferred for risk matching over raw hunk lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DiffSummary {
	/// Added line count across all hunks, if the provider computed it.
	pub added_lines: u32,
	/// Deleted line count across all hunks, if the provider computed it.
	pub deleted_lines: u32,
	/// True when the change is whitespace/formatting only.
	#[serde(default)]
	pub format_only: bool,
	/// True when the change touches only comments.
	#[serde(default)]
	pub comment_only: bool,
	/// Hunks on the new side.
	#[serde(default)]
	pub hunks: Vec<DiffHunk>,
	/// Added lines, prefix-stripped. Empty when the provider does not split
	/// content out of the hunks.
	#[serde(default)]
	pub added_content: Vec<String>,
}

impl DiffSummary {
	/// Normalized measure of diff size.
	///
	/// Prefers the explicit added+deleted counts whenever either is positive;
	/// falls back to summing each hunk's new-side line count.
	pub fn effective_changed_lines(&self) -> u32 {
		if self.added_lines > 0 || self.deleted_lines > 0 {
			self.added_lines + self.deleted_lines
		} else {
			self.hunks.iter().map(|h| h.new_count).sum()
		}
	}

	/// True when the diff carries no hunks at all.
	pub fn is_empty(&self) -> bool {
		self.hunks.is_empty()
	}

	/// Lines to run risk matching against: `added_content` when present,
	/// otherwise every raw hunk line.
	pub fn risk_lines(&self) -> Vec<&str> {
		if !self.added_content.is_empty() {
			self.added_content.iter().map(String::as_str).collect()
		} else {
			self.hunks.iter().flat_map(|h| h.lines.iter()).map(String::as_str).collect()
		}
	}
}
