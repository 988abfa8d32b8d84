//! The auto-review scheduler: trigger intake, dispatch, reconciliation.
//!
//! One logical pass of the dispatch algorithm runs at a time (flush latch);
//! timers and backend completions re-enter through [`SchedulerInner::flush`]
//! and are coalesced into follow-up passes. The state mutex is never held
//! across an `await`: the only asynchronous work is the backend call itself,
//! which runs in its own spawned task with an isolated completion handler.

mod dispatch;
mod triggers;


use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use redline_core::{DiagnosticsProvider, DiffProvider, DocumentHost, ResultSink, ReviewExecutor, StatusSink};
use redline_gate::{GateConfig, RiskPatternMatcher};

use crate::config::AutoReviewConfig;
use crate::metrics::{MetricsSnapshot, SchedulerMetrics};
use crate::queue::{FlushLatch, ReadyQueue};
use crate::rate::SlidingWindowRateLimiter;
use crate::table::FileTable;

/// Width of the rolling execution window.
pub(crate) const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Host machinery the scheduler drives.
///
/// All handles are shared trait objects so tests can wire in mocks.
#[derive(Clone)]
pub struct Collaborators {
	pub executor: Arc<dyn ReviewExecutor>,
	pub diffs: Arc<dyn DiffProvider>,
	pub diagnostics: Arc<dyn DiagnosticsProvider>,
	pub results: Arc<dyn ResultSink>,
	pub status: Arc<dyn StatusSink>,
	pub documents: Arc<dyn DocumentHost>,
}

/// Mutable scheduler state, all behind one mutex.
pub(crate) struct SchedState {
	pub files: FileTable,
	pub ready: ReadyQueue,
	pub latch: FlushLatch,
	pub rate: SlidingWindowRateLimiter,
	pub active_runs: usize,
	pub disposed: bool,
}

pub(crate) struct SchedulerInner {
	pub config: AutoReviewConfig,
	pub gate_cfg: GateConfig,
	pub risk: RiskPatternMatcher,
	pub collab: Collaborators,
	pub metrics: SchedulerMetrics,
	pub state: Mutex<SchedState>,
}

/// Cheap-to-clone handle over the shared scheduler.
///
/// Must be created inside a tokio runtime; timers and executions are spawned
/// tasks.
#[derive(Clone)]
pub struct AutoReviewScheduler {
	pub(crate) inner: Arc<SchedulerInner>,
}

impl AutoReviewScheduler {
	/// Builds a scheduler from sanitized configuration and host seams.
	pub fn new(config: AutoReviewConfig, collab: Collaborators) -> Self {
		let config = config.sanitized();
		let gate_cfg = config.gate_config();
		let risk = config.risk_matcher();
		let state = SchedState {
			files: FileTable::new(config.max_tracked_files),
			ready: ReadyQueue::new(),
			latch: FlushLatch::default(),
			rate: SlidingWindowRateLimiter::new(RATE_WINDOW),
			active_runs: 0,
			disposed: false,
		};
		Self {
			inner: Arc::new(SchedulerInner {
				config,
				gate_cfg,
				risk,
				collab,
				metrics: SchedulerMetrics::default(),
				state: Mutex::new(state),
			}),
		}
	}

	/// Point-in-time counter snapshot.
	pub fn metrics(&self) -> MetricsSnapshot {
		self.inner.metrics.snapshot()
	}

	/// Effective (sanitized) configuration.
	pub fn config(&self) -> &AutoReviewConfig {
		&self.inner.config
	}

	/// True while the file has a queued task or an execution in flight.
	pub fn has_pending(&self, path: &Path) -> bool {
		let state = self.inner.state.lock();
		let key = state.files.key_for(path);
		state.files.get(&key).is_some_and(|st| st.in_flight || st.queued.is_some())
	}

	/// Number of executions currently in flight.
	pub fn active_runs(&self) -> usize {
		self.inner.state.lock().active_runs
	}

	/// Number of files currently tracked.
	pub fn tracked_files(&self) -> usize {
		self.inner.state.lock().files.len()
	}

	/// Disposes the scheduler: aborts every timer, clears the ready queue,
	/// and turns later triggers into no-ops. In-flight backend calls finish
	/// and are dropped on return.
	pub fn shutdown(&self) {
		let mut state = self.inner.state.lock();
		if state.disposed {
			return;
		}
		state.disposed = true;
		state.files.disarm_all_timers();
		state.ready.clear();
		drop(state);
		tracing::debug!("review.shutdown");
	}
}
