use redline_core::{Fingerprint, ReviewTrigger};

/// The single pending task for a file.
///
/// At most one exists per file; a newer task of any trigger type replaces an
/// older one wholesale (last write wins, no queue depth beyond one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedTask {
	pub trigger: ReviewTrigger,
	/// Edit revision at enqueue time.
	pub edit_revision: u64,
	/// Saved revision at enqueue time.
	pub save_revision: u64,
	/// Skip the sliding-window rate limiter (never the concurrency cap).
	pub bypass_rate_limit: bool,
	/// Fingerprint snapshot of the save that produced this task, if any.
	pub saved_fingerprint: Option<Fingerprint>,
}

/// Generation stamp captured when a task is actually dispatched.
///
/// Cancellation here is cooperative: nothing aborts an in-flight backend
/// call. Instead the ticket is compared against the file's live counters when
/// the call returns, and a superseded result is dropped unpublished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket {
	/// Value of the file's request counter for this dispatch.
	pub seq: u64,
	/// Edit revision the task was captured against.
	pub edit_revision: u64,
	/// Saved revision the task was captured against.
	pub save_revision: u64,
}

impl RunTicket {
	/// True when the live counters have moved past this ticket.
	pub fn superseded_by(&self, latest_request_seq: u64, edit_revision: u64, latest_saved_revision: u64) -> bool {
		latest_request_seq > self.seq || edit_revision > self.edit_revision || latest_saved_revision > self.save_revision
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ticket() -> RunTicket {
		RunTicket {
			seq: 3,
			edit_revision: 10,
			save_revision: 8,
		}
	}

	#[test]
	fn fresh_when_counters_unchanged() {
		assert!(!ticket().superseded_by(3, 10, 8));
	}

	#[test]
	fn stale_when_newer_request_dispatched() {
		assert!(ticket().superseded_by(4, 10, 8));
	}

	#[test]
	fn stale_when_edit_revision_advanced() {
		assert!(ticket().superseded_by(3, 11, 8));
	}

	#[test]
	fn stale_when_save_revision_advanced() {
		assert!(ticket().superseded_by(3, 10, 9));
	}
}
