//! Per-file scheduling state and the bounded tracked-file table.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use redline_core::Fingerprint;
use rustc_hash::FxHashMap;
use tokio::task::AbortHandle;
use tokio::time::Instant;

use crate::queue::FileKey;
use crate::ticket::QueuedTask;

/// Owner of one armed timer task. Re-arming aborts the previous task, so at
/// most one timer of each kind exists per file.
#[derive(Debug, Default)]
pub(crate) struct TimerSlot {
	handle: Option<AbortHandle>,
}

impl TimerSlot {
	pub fn arm(&mut self, handle: AbortHandle) {
		self.disarm();
		self.handle = Some(handle);
	}

	pub fn disarm(&mut self) {
		if let Some(handle) = self.handle.take() {
			handle.abort();
		}
	}

	pub fn is_armed(&self) -> bool {
		self.handle.as_ref().is_some_and(|h| !h.is_finished())
	}
}

impl Drop for TimerSlot {
	fn drop(&mut self) {
		self.disarm();
	}
}

/// Mutable scheduling state for one tracked file.
///
/// Created lazily on the first trigger for a path. `edit_revision` and
/// `latest_request_seq` are monotonic; completed work is gated on them (see
/// [`crate::ticket::RunTicket`]).
#[derive(Debug)]
pub(crate) struct FileReviewState {
	/// Bumped on every edit event.
	pub edit_revision: u64,
	/// Edit revision captured at the last save.
	pub latest_saved_revision: u64,
	/// Bumped each time a task for this file is actually dispatched.
	pub latest_request_seq: u64,
	/// Fingerprint of the last content that was successfully analyzed.
	pub last_reviewed_fingerprint: Option<Fingerprint>,
	/// Snapshot taken at save time; replaced wholesale by a re-save.
	pub pending_save_fingerprint: Option<Fingerprint>,
	/// Exclusivity invariant: at most one active execution per file.
	pub in_flight: bool,
	/// Single task slot; newer tasks overwrite older ones.
	pub queued: Option<QueuedTask>,
	pub debounce_timer: TimerSlot,
	pub idle_timer: TimerSlot,
	pub cooldown_timer: TimerSlot,
	/// Eviction clock, refreshed on every trigger.
	pub last_touched: Instant,
}

impl FileReviewState {
	fn new(now: Instant) -> Self {
		Self {
			edit_revision: 0,
			latest_saved_revision: 0,
			latest_request_seq: 0,
			last_reviewed_fingerprint: None,
			pending_save_fingerprint: None,
			in_flight: false,
			queued: None,
			debounce_timer: TimerSlot::default(),
			idle_timer: TimerSlot::default(),
			cooldown_timer: TimerSlot::default(),
			last_touched: now,
		}
	}

	/// Aborts every armed timer for this file.
	pub fn disarm_timers(&mut self) {
		self.debounce_timer.disarm();
		self.idle_timer.disarm();
		self.cooldown_timer.disarm();
	}
}

/// Lexically normalizes a path: strips `.` segments and folds `..` into the
/// preceding component. No filesystem access, so symlinks stay opaque; the
/// point is that the host's spellings of one file agree on a key.
pub fn normalize_path(path: &Path) -> PathBuf {
	let mut out = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				if !out.pop() {
					out.push(Component::ParentDir);
				}
			}
			other => out.push(other),
		}
	}
	out
}

/// Bounded map from file key to scheduling state.
///
/// When the table exceeds `capacity`, the least-recently-touched entry that
/// is not in flight is evicted, timers disarmed first. In-flight entries are
/// never evicted: their completion handler must find its state.
#[derive(Debug)]
pub(crate) struct FileTable {
	files: FxHashMap<FileKey, FileReviewState>,
	capacity: usize,
}

impl FileTable {
	pub fn new(capacity: usize) -> Self {
		Self {
			files: FxHashMap::default(),
			capacity: capacity.max(1),
		}
	}

	/// Returns the key for `path`, shared with any existing entry.
	pub fn key_for(&self, path: &Path) -> FileKey {
		let normalized = normalize_path(path);
		match self.files.get_key_value(normalized.as_path()) {
			Some((key, _)) => Arc::clone(key),
			None => Arc::from(normalized.into_boxed_path()),
		}
	}

	/// Fetches or lazily creates the state for `key`, refreshing its
	/// eviction clock and evicting over capacity.
	///
	/// Returns the number of entries evicted (for metrics).
	pub fn touch(&mut self, key: &FileKey, now: Instant) -> usize {
		self.files
			.entry(Arc::clone(key))
			.or_insert_with(|| FileReviewState::new(now))
			.last_touched = now;
		self.evict_over_capacity(key)
	}

	pub fn get_mut(&mut self, key: &FileKey) -> Option<&mut FileReviewState> {
		self.files.get_mut(key)
	}

	pub fn get(&self, key: &FileKey) -> Option<&FileReviewState> {
		self.files.get(key)
	}

	pub fn len(&self) -> usize {
		self.files.len()
	}

	/// Disarms every timer in the table (scheduler disposal).
	pub fn disarm_all_timers(&mut self) {
		for state in self.files.values_mut() {
			state.disarm_timers();
		}
	}

	fn evict_over_capacity(&mut self, keep: &FileKey) -> usize {
		let mut evicted = 0;
		while self.files.len() > self.capacity {
			let victim = self
				.files
				.iter()
				.filter(|(key, state)| !state.in_flight && *key != keep)
				.min_by_key(|(_, state)| state.last_touched)
				.map(|(key, _)| Arc::clone(key));
			let Some(victim) = victim else {
				// everything else is in flight; tolerate the overshoot
				break;
			};
			if let Some(mut state) = self.files.remove(&victim) {
				state.disarm_timers();
				tracing::debug!(path = %victim.display(), "review.evict");
				evicted += 1;
			}
		}
		evicted
	}
}
