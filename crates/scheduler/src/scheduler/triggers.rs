//! Trigger intake: edits, saves, idle rechecks, manual requests.
//!
//! Triggers only mutate per-file state and arm timers; actual dispatch
//! happens in the flush loop. Re-arming a timer aborts its predecessor, so a
//! burst of saves collapses into one debounce wait carrying the last
//! fingerprint.

use std::path::Path;
use std::sync::Arc;

use redline_core::{Fingerprint, ReviewTrigger, StatusState};
use tokio::time::Instant;

use super::{AutoReviewScheduler, SchedState, SchedulerInner};
use crate::queue::FileKey;
use crate::ticket::QueuedTask;

impl AutoReviewScheduler {
	/// Records an edit event.
	///
	/// Bumps the edit revision unconditionally. Small edits (line delta
	/// within the configured threshold) re-arm the idle recheck timer when
	/// idle rechecks are enabled; large edits leave it alone, since the
	/// idle fire re-validates document state anyway.
	pub fn note_edit(&self, path: &Path, line_delta: u32) {
		let inner = &self.inner;
		let mut state = inner.state.lock();
		if state.disposed {
			return;
		}
		let key = state.files.key_for(path);
		inner.metrics.record_evicted(state.files.touch(&key, Instant::now()));

		let arm_idle = inner.config.idle_recheck_enabled && line_delta <= inner.config.large_change_line_threshold;
		let delay = inner.config.idle_delay();
		let st = state.files.get_mut(&key).expect("entry just touched");
		st.edit_revision += 1;
		tracing::trace!(path = %key.display(), revision = st.edit_revision, line_delta, "review.edit");

		if arm_idle {
			let timer_inner = Arc::clone(inner);
			let timer_key = Arc::clone(&key);
			let handle = tokio::spawn(async move {
				tokio::time::sleep(delay).await;
				SchedulerInner::idle_fired(&timer_inner, timer_key);
			});
			st.idle_timer.arm(handle.abort_handle());
		}
	}

	/// Records a save event and arms the debounce timer.
	///
	/// Captures a content fingerprint now; a re-save before the timer fires
	/// replaces both the snapshot and the wait, so only the most recent save
	/// survives debouncing. No-op when the save trigger is disabled.
	pub fn note_save(&self, path: &Path, content: &str) {
		let inner = &self.inner;
		if !inner.config.run_on_save {
			return;
		}
		let fingerprint = Fingerprint::of_str(content);
		let delay = inner.config.debounce();

		let mut state = inner.state.lock();
		if state.disposed {
			return;
		}
		let key = state.files.key_for(path);
		inner.metrics.record_evicted(state.files.touch(&key, Instant::now()));

		let st = state.files.get_mut(&key).expect("entry just touched");
		st.latest_saved_revision = st.edit_revision;
		st.pending_save_fingerprint = Some(fingerprint);
		tracing::trace!(path = %key.display(), saved_revision = st.latest_saved_revision, "review.save");

		let timer_inner = Arc::clone(inner);
		let timer_key = Arc::clone(&key);
		let handle = tokio::spawn(async move {
			tokio::time::sleep(delay).await;
			SchedulerInner::debounce_fired(&timer_inner, timer_key);
		});
		st.debounce_timer.arm(handle.abort_handle());
	}

	/// Enqueues a manual review of `path` immediately.
	///
	/// Bypasses the rate window when configured to, never the concurrency
	/// cap.
	pub fn review_current_file_now(&self, path: &Path) {
		let inner = &self.inner;
		let key = {
			let mut state = inner.state.lock();
			if state.disposed {
				return;
			}
			let key = state.files.key_for(path);
			inner.metrics.record_evicted(state.files.touch(&key, Instant::now()));

			let st = state.files.get_mut(&key).expect("entry just touched");
			let task = QueuedTask {
				trigger: ReviewTrigger::Manual,
				edit_revision: st.edit_revision,
				save_revision: st.latest_saved_revision,
				bypass_rate_limit: inner.config.review_current_file_now_bypass_rate_limit,
				saved_fingerprint: None,
			};
			SchedulerInner::enqueue_locked(inner, &mut state, &key, task);
			key
		};
		inner.collab.status.set_status(StatusState::Queued, "manual review queued");
		tracing::debug!(path = %key.display(), "review.manual");
		SchedulerInner::flush(inner);
	}
}

impl SchedulerInner {
	/// Debounce expiry: commit the pending save into the task slot.
	pub(crate) fn debounce_fired(this: &Arc<Self>, key: FileKey) {
		{
			let mut state = this.state.lock();
			if state.disposed {
				return;
			}
			let Some(st) = state.files.get_mut(&key) else {
				return;
			};
			let task = QueuedTask {
				trigger: ReviewTrigger::Save,
				edit_revision: st.edit_revision,
				save_revision: st.latest_saved_revision,
				bypass_rate_limit: false,
				saved_fingerprint: st.pending_save_fingerprint,
			};
			Self::enqueue_locked(this, &mut state, &key, task);
		}
		this.collab.status.set_status(StatusState::Queued, "save debounced; queued for review");
		Self::flush(this);
	}

	/// Idle expiry: enqueue a recheck only when it can still matter.
	///
	/// The document must be open, clean, and still carry stale issues;
	/// closed, re-edited, or already-clean files produce no work.
	pub(crate) fn idle_fired(this: &Arc<Self>, key: FileKey) {
		let path: &Path = key.as_ref();
		let documents = &this.collab.documents;
		if !documents.is_open(path) || documents.is_dirty(path) || !documents.has_stale_issues(path) {
			tracing::trace!(path = %key.display(), "review.idle_suppressed");
			return;
		}
		{
			let mut state = this.state.lock();
			if state.disposed {
				return;
			}
			let Some(st) = state.files.get_mut(&key) else {
				return;
			};
			let task = QueuedTask {
				trigger: ReviewTrigger::Idle,
				edit_revision: st.edit_revision,
				save_revision: st.latest_saved_revision,
				bypass_rate_limit: false,
				saved_fingerprint: None,
			};
			Self::enqueue_locked(this, &mut state, &key, task);
		}
		this.collab.status.set_status(StatusState::Queued, "idle recheck queued");
		Self::flush(this);
	}

	/// Writes `task` into the file's slot and admits the path when possible.
	///
	/// The slot is last-write-wins; admission is idempotent through the
	/// ready queue's membership set and withheld while the file is in
	/// flight (the completion handler re-admits).
	pub(crate) fn enqueue_locked(this: &Arc<Self>, state: &mut SchedState, key: &FileKey, task: QueuedTask) {
		let Some(st) = state.files.get_mut(key) else {
			return;
		};
		let replaced = st.queued.replace(task).is_some();
		let in_flight = st.in_flight;
		this.metrics.record_enqueued(replaced);
		let admitted = if in_flight { false } else { state.ready.push(Arc::clone(key)) };
		tracing::debug!(
			path = %key.display(),
			trigger = %task.trigger,
			replaced,
			admitted,
			"review.enqueue"
		);
	}
}
