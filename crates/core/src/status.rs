/// Coarse scheduler state surfaced to the status line.
///
/// Paired with a short human-readable message; the host renders both. Skips
/// and discards are deliberately distinct from `Failed` so a user can tell
/// "nothing was wrong, we chose not to run" apart from "we tried and failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusState {
	/// Nothing pending or running for the file.
	Idle,
	/// A task sits in the slot waiting for dispatch.
	Queued,
	/// Backend call in flight.
	Running,
	/// Gate decided not to run; message carries the reason.
	Skipped,
	/// Rate window exhausted; task preserved for the cooldown retry.
	Deferred,
	/// Completed result was superseded and dropped.
	Discarded,
	/// Result applied.
	Done,
	/// Backend call failed.
	Failed,
}

impl StatusState {
	pub fn label(self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Queued => "queued",
			Self::Running => "running",
			Self::Skipped => "skipped",
			Self::Deferred => "deferred",
			Self::Discarded => "discarded",
			Self::Done => "done",
			Self::Failed => "failed",
		}
	}
}

impl std::fmt::Display for StatusState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.label())
	}
}
