//! Dispatch: the latched flush loop, admission control, and reconciliation
//! of completed backend calls against live state.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use redline_core::{FileReviewPatch, FileReviewResult, ReviewError, ReviewTrigger, StatusState, diagnostics};
use redline_core::DiagnosticSeverity;
use redline_gate::{GateInput, SkipReason, evaluate};
use tokio::time::Instant;

use super::SchedulerInner;
use crate::queue::FileKey;
use crate::rate::RateAdmission;
use crate::ticket::{QueuedTask, RunTicket};

impl SchedulerInner {
	/// Runs the dispatch algorithm, serialized by the flush latch.
	///
	/// Safe to call from any trigger path, timer expiry, or completion
	/// handler; concurrent calls coalesce into one follow-up pass.
	pub(crate) fn flush(this: &Arc<Self>) {
		{
			let mut state = this.state.lock();
			if state.disposed || !state.latch.try_begin() {
				return;
			}
		}
		loop {
			Self::flush_pass(this);
			let run_again = this.state.lock().latch.finish();
			if !run_again {
				break;
			}
		}
	}

	/// One pass: drain ready paths while concurrency and rate budgets allow.
	fn flush_pass(this: &Arc<Self>) {
		loop {
			// 1) pick a dispatchable candidate under the lock
			let Some((key, task)) = Self::next_candidate(this) else {
				return;
			};

			// 2) gate save tasks against *fresh* host state; the debounce
			//    wait may have changed diff and diagnostics since enqueue
			if task.trigger == ReviewTrigger::Save {
				let diff = this.collab.diffs.pending_diff(&key);
				let diags = this.collab.diagnostics.diagnostics(&key);
				let last_reviewed = this.state.lock().files.get(&key).and_then(|st| st.last_reviewed_fingerprint);
				let input = GateInput {
					trigger: task.trigger,
					saved_fingerprint: task.saved_fingerprint,
					last_reviewed_fingerprint: last_reviewed,
					diff: diff.as_ref(),
					diagnostics: &diags,
				};
				let decision = evaluate(&input, &this.gate_cfg, &this.risk);
				if let Some(reason) = decision.skip {
					this.metrics.record_skipped();
					tracing::debug!(
						path = %key.display(),
						reason = %reason,
						effective_changed_lines = decision.effective_changed_lines,
						risk_matched = decision.risk_matched,
						"review.skip"
					);
					if reason == SkipReason::SameContent {
						// content already reviewed: pending markers are lies
						this.collab.results.clear_file_stale_markers(&key);
					}
					this.collab.status.set_status(StatusState::Skipped, reason.message());
					continue;
				}
			}

			// 3) rate budget, concurrency cap already held by step 1
			if !task.bypass_rate_limit {
				let cap = this.config.run_on_save_max_runs_per_minute as usize;
				let admission = this.state.lock().rate.try_admit(Instant::now(), cap);
				if let RateAdmission::Deferred { retry_after } = admission {
					Self::defer_for_cooldown(this, &key, task, retry_after);
					continue;
				}
			}

			// 4) commit the dispatch
			let ticket = {
				let mut state = this.state.lock();
				state.active_runs += 1;
				let Some(st) = state.files.get_mut(&key) else {
					state.active_runs -= 1;
					continue;
				};
				st.in_flight = true;
				st.latest_request_seq += 1;
				RunTicket {
					seq: st.latest_request_seq,
					edit_revision: task.edit_revision,
					save_revision: task.save_revision,
				}
			};
			Self::spawn_execution(this, key, task, ticket);
		}
	}

	/// Pops ready paths until one is actually dispatchable.
	///
	/// Paths with no queued task (already consumed, evicted) or an in-flight
	/// execution are dropped; their completion handler re-admits them if
	/// needed. Returns `None` at the concurrency cap or on an empty queue.
	fn next_candidate(this: &Arc<Self>) -> Option<(FileKey, QueuedTask)> {
		let mut state = this.state.lock();
		if state.disposed {
			return None;
		}
		let cap = this.config.auto_review_max_parallel_files as usize;
		loop {
			if state.active_runs >= cap {
				return None;
			}
			let key = state.ready.pop()?;
			let Some(st) = state.files.get_mut(&key) else {
				continue;
			};
			if st.in_flight {
				continue;
			}
			let Some(task) = st.queued.take() else {
				continue;
			};
			return Some((key, task));
		}
	}

	/// Rate window full: preserve the task and retry when the oldest window
	/// entry ages out. Backpressure, not rejection.
	fn defer_for_cooldown(this: &Arc<Self>, key: &FileKey, task: QueuedTask, retry_after: Duration) {
		{
			let mut state = this.state.lock();
			let Some(st) = state.files.get_mut(key) else {
				return;
			};
			// newer intent wins the slot; the deferred task only backfills
			if st.queued.is_none() {
				st.queued = Some(task);
			}
			let timer_inner = Arc::clone(this);
			let timer_key = Arc::clone(key);
			let handle = tokio::spawn(async move {
				tokio::time::sleep(retry_after).await;
				SchedulerInner::cooldown_fired(&timer_inner, timer_key);
			});
			st.cooldown_timer.arm(handle.abort_handle());
		}
		this.metrics.record_deferred();
		tracing::debug!(
			path = %key.display(),
			retry_ms = retry_after.as_millis() as u64,
			"review.defer"
		);
		this.collab.status.set_status(StatusState::Deferred, "rate limit reached; will retry shortly");
	}

	/// Cooldown expiry: re-admit whatever occupies the slot now.
	pub(crate) fn cooldown_fired(this: &Arc<Self>, key: FileKey) {
		{
			let mut state = this.state.lock();
			if state.disposed {
				return;
			}
			let Some(st) = state.files.get_mut(&key) else {
				return;
			};
			if st.queued.is_none() || st.in_flight {
				return;
			}
			state.ready.push(Arc::clone(&key));
		}
		Self::flush(this);
	}

	/// Hands one task to the backend in its own task with an isolated
	/// completion handler. No failure in here may stall the flush loop.
	fn spawn_execution(this: &Arc<Self>, key: FileKey, task: QueuedTask, ticket: RunTicket) {
		this.metrics.record_dispatched();
		tracing::debug!(
			path = %key.display(),
			trigger = %task.trigger,
			seq = ticket.seq,
			"review.dispatch"
		);
		this.collab.status.update_status(StatusState::Running, "review in flight");

		let exec_inner = Arc::clone(this);
		tokio::spawn(async move {
			let started = Instant::now();
			let outcome = match AssertUnwindSafe(exec_inner.collab.executor.review_saved_file(key.as_ref()))
				.catch_unwind()
				.await
			{
				Ok(result) => result,
				Err(_) => Err(ReviewError::Panicked),
			};
			Self::on_run_complete(&exec_inner, key, task, ticket, outcome, started.elapsed());
		});
	}

	/// Reconciles a finished backend call against live state, publishes or
	/// discards, then re-triggers the flush loop.
	fn on_run_complete(
		this: &Arc<Self>,
		key: FileKey,
		task: QueuedTask,
		ticket: RunTicket,
		outcome: Result<FileReviewResult, ReviewError>,
		elapsed: Duration,
	) {
		let mut requeue = false;
		// verdict: None when the scheduler was disposed or the entry
		// vanished, Some(stale) otherwise
		let verdict = {
			let mut state = this.state.lock();
			state.active_runs = state.active_runs.saturating_sub(1);
			let disposed = state.disposed;
			let verdict = match state.files.get_mut(&key) {
				Some(st) if !disposed => {
					st.in_flight = false;
					let stale = ticket.superseded_by(st.latest_request_seq, st.edit_revision, st.latest_saved_revision);
					if !stale
						&& task.trigger == ReviewTrigger::Save
						&& outcome.is_ok()
						&& let Some(fp) = task.saved_fingerprint
					{
						st.last_reviewed_fingerprint = Some(fp);
					}
					requeue = st.queued.is_some();
					Some(stale)
				}
				_ => None,
			};
			if requeue {
				state.ready.push(Arc::clone(&key));
			}
			verdict
		};

		match (verdict, outcome) {
			(None, _) => {
				tracing::trace!(path = %key.display(), "review.complete_after_dispose");
			}
			(Some(_), Err(error)) => {
				this.metrics.record_failed();
				tracing::warn!(path = %key.display(), %error, "review.fail");
				this.collab.status.set_status(StatusState::Failed, &format!("review failed: {error}"));
			}
			(Some(true), Ok(_)) => {
				this.metrics.record_stale_discarded();
				tracing::debug!(path = %key.display(), seq = ticket.seq, "review.stale_discard");
				this.collab.status.set_status(StatusState::Discarded, "result discarded as stale");
			}
			(Some(false), Ok(result)) => {
				// an empty result with live errors must not read as "all clear"
				let unresolved_errors = diagnostics::any_at_or_above(
					&this.collab.diagnostics.diagnostics(&key),
					DiagnosticSeverity::Error,
				);
				let preserve = result.is_empty() && unresolved_errors;
				let message = if preserve {
					"reviewed; stale issues preserved"
				} else {
					"reviewed against latest save"
				};
				let patch = FileReviewPatch {
					path: key.to_path_buf(),
					mode: result.mode,
					result,
					preserve_stale_on_empty: preserve,
				};
				this.collab.results.apply_file_review_patch(patch);
				this.metrics.record_completed();
				tracing::debug!(
					path = %key.display(),
					elapsed_ms = elapsed.as_millis() as u64,
					"review.complete"
				);
				this.collab.status.set_status(StatusState::Done, message);
			}
		}

		// a slot freed up; other files may be waiting on it
		Self::flush(this);
	}
}
