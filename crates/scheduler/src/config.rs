//! Scheduler configuration: recognized options, defaults, validation.

use std::time::Duration;

use redline_gate::{FunnelSeverity, GateConfig, RiskPatternMatcher};
use thiserror::Error;

/// A configuration value outside its documented range.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
	#[error("{key}: expected {expected}, got {value}")]
	OutOfRange {
		key: &'static str,
		expected: &'static str,
		value: u64,
	},
}

/// Recognized auto-review options.
///
/// Deserialized from the host settings blob; unknown keys are rejected so a
/// typo never silently reverts an option to its default. [`Self::validate`]
/// rejects out-of-range values, [`Self::sanitized`] clamps them instead and
/// logs each adjustment.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutoReviewConfig {
	/// Enables the save trigger.
	pub run_on_save: bool,
	/// Quiet period between a save and its review task.
	pub run_on_save_debounce_ms: u64,
	/// Sliding-window cap on executions per minute. Min 1.
	pub run_on_save_max_runs_per_minute: u32,
	/// Enables the same-content gate check.
	pub run_on_save_skip_same_content: bool,
	/// Size floor for the small-low-risk gate check. Zero disables it.
	pub run_on_save_min_effective_changed_lines: u32,
	/// Risk pattern sources; empty list selects the built-in defaults.
	pub run_on_save_risk_patterns: Vec<String>,
	/// Diagnostic funnel level.
	pub run_on_save_funnel_lint_severity: FunnelSeverity,
	/// Instantaneous concurrency cap. 1 or 2.
	pub auto_review_max_parallel_files: u32,
	/// Enables the idle recheck trigger.
	pub idle_recheck_enabled: bool,
	/// Quiet period before an idle recheck. Min 300.
	pub idle_recheck_ms: u64,
	/// Edits whose line delta exceeds this never arm the idle timer. Min 1.
	pub large_change_line_threshold: u32,
	/// Manual reviews skip the rate window (never the concurrency cap).
	pub review_current_file_now_bypass_rate_limit: bool,
	/// Tracked-file table bound; least-recently-touched entries beyond this
	/// are evicted. Min 8.
	pub max_tracked_files: usize,
}

impl Default for AutoReviewConfig {
	fn default() -> Self {
		Self {
			run_on_save: true,
			run_on_save_debounce_ms: 1_500,
			run_on_save_max_runs_per_minute: 6,
			run_on_save_skip_same_content: true,
			run_on_save_min_effective_changed_lines: 3,
			run_on_save_risk_patterns: Vec::new(),
			run_on_save_funnel_lint_severity: FunnelSeverity::Off,
			auto_review_max_parallel_files: 1,
			idle_recheck_enabled: false,
			idle_recheck_ms: 120_000,
			large_change_line_threshold: 80,
			review_current_file_now_bypass_rate_limit: true,
			max_tracked_files: 512,
		}
	}
}

impl AutoReviewConfig {
	/// Rejects values outside their documented ranges.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.run_on_save_max_runs_per_minute < 1 {
			return Err(ConfigError::OutOfRange {
				key: "run_on_save_max_runs_per_minute",
				expected: ">= 1",
				value: u64::from(self.run_on_save_max_runs_per_minute),
			});
		}
		if !(1..=2).contains(&self.auto_review_max_parallel_files) {
			return Err(ConfigError::OutOfRange {
				key: "auto_review_max_parallel_files",
				expected: "1 or 2",
				value: u64::from(self.auto_review_max_parallel_files),
			});
		}
		if self.idle_recheck_ms < 300 {
			return Err(ConfigError::OutOfRange {
				key: "idle_recheck_ms",
				expected: ">= 300",
				value: self.idle_recheck_ms,
			});
		}
		if self.large_change_line_threshold < 1 {
			return Err(ConfigError::OutOfRange {
				key: "large_change_line_threshold",
				expected: ">= 1",
				value: u64::from(self.large_change_line_threshold),
			});
		}
		if self.max_tracked_files < 8 {
			return Err(ConfigError::OutOfRange {
				key: "max_tracked_files",
				expected: ">= 8",
				value: self.max_tracked_files as u64,
			});
		}
		Ok(())
	}

	/// Clamps out-of-range values to their nearest legal value, logging each
	/// adjustment. Used when the host prefers degraded operation over
	/// rejection.
	pub fn sanitized(mut self) -> Self {
		if self.run_on_save_max_runs_per_minute < 1 {
			tracing::warn!(key = "run_on_save_max_runs_per_minute", "clamping to 1");
			self.run_on_save_max_runs_per_minute = 1;
		}
		if self.auto_review_max_parallel_files < 1 || self.auto_review_max_parallel_files > 2 {
			tracing::warn!(key = "auto_review_max_parallel_files", "clamping into 1..=2");
			self.auto_review_max_parallel_files = self.auto_review_max_parallel_files.clamp(1, 2);
		}
		if self.idle_recheck_ms < 300 {
			tracing::warn!(key = "idle_recheck_ms", "clamping to 300");
			self.idle_recheck_ms = 300;
		}
		if self.large_change_line_threshold < 1 {
			tracing::warn!(key = "large_change_line_threshold", "clamping to 1");
			self.large_change_line_threshold = 1;
		}
		if self.max_tracked_files < 8 {
			tracing::warn!(key = "max_tracked_files", "clamping to 8");
			self.max_tracked_files = 8;
		}
		self
	}

	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.run_on_save_debounce_ms)
	}

	pub fn idle_delay(&self) -> Duration {
		Duration::from_millis(self.idle_recheck_ms)
	}

	/// Gate knobs projected out of the full option set.
	pub fn gate_config(&self) -> GateConfig {
		GateConfig {
			skip_same_content: self.run_on_save_skip_same_content,
			min_effective_changed_lines: self.run_on_save_min_effective_changed_lines,
			funnel_severity: self.run_on_save_funnel_lint_severity,
		}
	}

	/// Compiles the configured risk patterns; an empty list selects the
	/// built-in defaults.
	pub fn risk_matcher(&self) -> RiskPatternMatcher {
		if self.run_on_save_risk_patterns.is_empty() {
			RiskPatternMatcher::with_defaults()
		} else {
			RiskPatternMatcher::compile(&self.run_on_save_risk_patterns)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_validate() {
		assert_eq!(AutoReviewConfig::default().validate(), Ok(()));
	}

	#[test]
	fn parallel_cap_above_two_rejected() {
		let cfg = AutoReviewConfig {
			auto_review_max_parallel_files: 3,
			..Default::default()
		};
		assert!(matches!(
			cfg.validate(),
			Err(ConfigError::OutOfRange {
				key: "auto_review_max_parallel_files",
				..
			})
		));
	}

	#[test]
	fn sanitize_clamps_instead_of_rejecting() {
		let cfg = AutoReviewConfig {
			auto_review_max_parallel_files: 5,
			idle_recheck_ms: 10,
			max_tracked_files: 0,
			..Default::default()
		}
		.sanitized();
		assert_eq!(cfg.auto_review_max_parallel_files, 2);
		assert_eq!(cfg.idle_recheck_ms, 300);
		assert_eq!(cfg.max_tracked_files, 8);
		assert_eq!(cfg.validate(), Ok(()));
	}

	#[test]
	fn unknown_keys_rejected() {
		let parsed: Result<AutoReviewConfig, _> = serde_json::from_str(r#"{ "run_on_saev": true }"#);
		assert!(parsed.is_err());
	}

	#[test]
	fn partial_settings_fill_in_defaults() {
		let parsed: AutoReviewConfig = serde_json::from_str(r#"{ "run_on_save_debounce_ms": 250, "idle_recheck_enabled": true }"#).unwrap();
		assert_eq!(parsed.run_on_save_debounce_ms, 250);
		assert!(parsed.idle_recheck_enabled);
		assert_eq!(parsed.run_on_save_max_runs_per_minute, 6);
	}

	#[test]
	fn empty_pattern_list_selects_defaults() {
		let cfg = AutoReviewConfig::default();
		assert!(!cfg.risk_matcher().is_empty());
	}
}
