//! Sliding-window admission control for backend throughput.
//!
//! Counts executions within a trailing fixed window and defers new
//! admissions once a cap is reached. Deferral is backpressure, not
//! rejection: the caller is told exactly how long until the oldest entry
//! ages out and retries then.
//!
//! The component never reads a clock itself; callers pass `now`, so tests
//! drive time explicitly.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// Outcome of an admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateAdmission {
	/// Under the cap; a timestamp was recorded.
	Admitted,
	/// Window is full; retry after the given delay.
	Deferred {
		retry_after: Duration,
	},
}

/// Sliding-window rate limiter over a rolling `window`.
#[derive(Debug)]
pub struct SlidingWindowRateLimiter {
	window: Duration,
	timestamps: VecDeque<Instant>,
}

impl SlidingWindowRateLimiter {
	pub fn new(window: Duration) -> Self {
		Self {
			window,
			timestamps: VecDeque::new(),
		}
	}

	/// Evicts entries older than the window.
	fn prune(&mut self, now: Instant) {
		while let Some(&oldest) = self.timestamps.front() {
			if now.duration_since(oldest) >= self.window {
				self.timestamps.pop_front();
			} else {
				break;
			}
		}
	}

	/// Attempts to admit one execution at `now` under `cap`.
	///
	/// Prunes first, so stale entries never count against the cap. On
	/// admission the timestamp is recorded immediately.
	pub fn try_admit(&mut self, now: Instant, cap: usize) -> RateAdmission {
		self.prune(now);
		if self.timestamps.len() >= cap.max(1) {
			let oldest = *self.timestamps.front().expect("window at cap implies a front entry");
			let retry_after = self.window.saturating_sub(now.duration_since(oldest));
			return RateAdmission::Deferred { retry_after };
		}
		self.timestamps.push_back(now);
		RateAdmission::Admitted
	}

	/// Number of executions currently inside the window.
	pub fn in_window(&mut self, now: Instant) -> usize {
		self.prune(now);
		self.timestamps.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const WINDOW: Duration = Duration::from_secs(60);

	#[test]
	fn admits_under_cap() {
		let mut rate = SlidingWindowRateLimiter::new(WINDOW);
		let now = Instant::now();
		assert_eq!(rate.try_admit(now, 2), RateAdmission::Admitted);
		assert_eq!(rate.try_admit(now, 2), RateAdmission::Admitted);
		assert_eq!(rate.in_window(now), 2);
	}

	#[test]
	fn defers_at_cap_with_exact_retry_delay() {
		let mut rate = SlidingWindowRateLimiter::new(WINDOW);
		let start = Instant::now();
		assert_eq!(rate.try_admit(start, 1), RateAdmission::Admitted);

		let later = start + Duration::from_secs(14);
		match rate.try_admit(later, 1) {
			RateAdmission::Deferred { retry_after } => {
				assert_eq!(retry_after, Duration::from_secs(46));
			}
			RateAdmission::Admitted => panic!("second admission must defer at cap 1"),
		}
	}

	#[test]
	fn entries_age_out_of_the_window() {
		let mut rate = SlidingWindowRateLimiter::new(WINDOW);
		let start = Instant::now();
		assert_eq!(rate.try_admit(start, 1), RateAdmission::Admitted);

		let past_window = start + WINDOW;
		assert_eq!(rate.try_admit(past_window, 1), RateAdmission::Admitted);
		assert_eq!(rate.in_window(past_window), 1);
	}

	#[test]
	fn deferral_records_nothing() {
		let mut rate = SlidingWindowRateLimiter::new(WINDOW);
		let start = Instant::now();
		let _ = rate.try_admit(start, 1);
		let _ = rate.try_admit(start, 1);
		let _ = rate.try_admit(start, 1);
		assert_eq!(rate.in_window(start), 1);
	}

	#[test]
	fn cap_is_floored_at_one() {
		let mut rate = SlidingWindowRateLimiter::new(WINDOW);
		let now = Instant::now();
		assert_eq!(rate.try_admit(now, 0), RateAdmission::Admitted);
		match rate.try_admit(now, 0) {
			RateAdmission::Deferred { .. } => {}
			RateAdmission::Admitted => panic!("cap 0 behaves as cap 1"),
		}
	}
}
