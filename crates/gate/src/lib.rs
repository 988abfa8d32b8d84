//! Save-gate: decides whether a save-triggered review is worth running.
//!
//! Goals:
//! - pure decision function (no clocks, no I/O, no host calls)
//! - fixed check order, first match wins, named reason per skip
//! - always report diff size + risk signal, even when proceeding
//!
//! Only save triggers are gated; idle and manual triggers always proceed.

pub mod risk;

pub use risk::{DEFAULT_RISK_PATTERNS, RiskPatternMatcher};

use redline_core::diagnostics::{self, Diagnostic, DiagnosticSeverity};
use redline_core::{DiffSummary, Fingerprint, ReviewTrigger};

/// Diagnostic funnel level: which severities suppress a review run.
///
/// With editor diagnostics already on screen a review would restate known
/// problems, so the funnel holds the run back until the developer clears them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelSeverity {
	/// Funnel disabled.
	#[default]
	Off,
	/// Suppress when an error diagnostic is present.
	Error,
	/// Suppress when an error or warning diagnostic is present.
	Warning,
}

/// Why a save-triggered run was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
	/// Saved content fingerprint equals the last reviewed one.
	SameContent,
	/// No pending diff, or a diff with zero hunks.
	NoPendingDiff,
	/// Diff is format-only or comment-only.
	NoiseOnlyChange,
	/// Editor diagnostics at or above the funnel level are present.
	DiagnosticFunnel,
	/// Change is below the size floor and nothing risky was added.
	SmallLowRiskChange,
}

impl SkipReason {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::SameContent => "same_content",
			Self::NoPendingDiff => "no_pending_diff",
			Self::NoiseOnlyChange => "noise_only_change",
			Self::DiagnosticFunnel => "diagnostic_funnel",
			Self::SmallLowRiskChange => "small_low_risk_change",
		}
	}

	/// Short status-line phrasing.
	pub fn message(self) -> &'static str {
		match self {
			Self::SameContent => "content unchanged since last review",
			Self::NoPendingDiff => "no pending changes to review",
			Self::NoiseOnlyChange => "formatting/comment-only change",
			Self::DiagnosticFunnel => "editor diagnostics take precedence",
			Self::SmallLowRiskChange => "change too small and low-risk",
		}
	}
}

impl std::fmt::Display for SkipReason {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Gate tuning knobs, projected out of the scheduler configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GateConfig {
	/// Enables the same-content check.
	pub skip_same_content: bool,
	/// Floor for `effective_changed_lines` below which a low-risk change is
	/// skipped. Zero disables the check.
	pub min_effective_changed_lines: u32,
	/// Diagnostic funnel level.
	pub funnel_severity: FunnelSeverity,
}

impl Default for GateConfig {
	fn default() -> Self {
		Self {
			skip_same_content: true,
			min_effective_changed_lines: 3,
			funnel_severity: FunnelSeverity::Off,
		}
	}
}

/// Everything the gate looks at for one decision.
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
	pub trigger: ReviewTrigger,
	/// Fingerprint of the content that was just saved.
	pub saved_fingerprint: Option<Fingerprint>,
	/// Fingerprint of the last content that was successfully analyzed.
	pub last_reviewed_fingerprint: Option<Fingerprint>,
	/// Freshly fetched pending diff, `None` when the file has none.
	pub diff: Option<&'a DiffSummary>,
	/// Current editor diagnostics for the file.
	pub diagnostics: &'a [Diagnostic],
}

/// Outcome of a gate evaluation.
///
/// `effective_changed_lines` and `risk_matched` are filled in regardless of
/// whether the run proceeds, for logging and status lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateDecision {
	/// `Some(reason)` when the run should not happen.
	pub skip: Option<SkipReason>,
	pub effective_changed_lines: u32,
	pub risk_matched: bool,
}

impl GateDecision {
	pub fn proceeds(&self) -> bool {
		self.skip.is_none()
	}

	fn proceed(effective_changed_lines: u32, risk_matched: bool) -> Self {
		Self {
			skip: None,
			effective_changed_lines,
			risk_matched,
		}
	}

	fn skip(reason: SkipReason, effective_changed_lines: u32, risk_matched: bool) -> Self {
		Self {
			skip: Some(reason),
			effective_changed_lines,
			risk_matched,
		}
	}
}

/// Decides whether a triggered run should proceed.
///
/// Checks run in a fixed order; the first that matches names the skip:
/// same_content, no_pending_diff, noise_only_change, diagnostic_funnel,
/// small_low_risk_change. Non-save triggers always proceed.
pub fn evaluate(input: &GateInput<'_>, cfg: &GateConfig, risk: &RiskPatternMatcher) -> GateDecision {
	let effective = input.diff.map_or(0, DiffSummary::effective_changed_lines);
	let risk_matched = input.diff.is_some_and(|d| risk.matches_any(d.risk_lines()));

	if input.trigger != ReviewTrigger::Save {
		return GateDecision::proceed(effective, risk_matched);
	}

	// 1) identical content beats everything, including diff state
	if cfg.skip_same_content
		&& let (Some(saved), Some(reviewed)) = (input.saved_fingerprint, input.last_reviewed_fingerprint)
		&& saved == reviewed
	{
		return GateDecision::skip(SkipReason::SameContent, effective, risk_matched);
	}

	// 2) nothing to review
	let Some(diff) = input.diff else {
		return GateDecision::skip(SkipReason::NoPendingDiff, effective, risk_matched);
	};
	if diff.is_empty() {
		return GateDecision::skip(SkipReason::NoPendingDiff, effective, risk_matched);
	}

	// 3) churn without substance
	if diff.format_only || diff.comment_only {
		return GateDecision::skip(SkipReason::NoiseOnlyChange, effective, risk_matched);
	}

	// 4) diagnostic funnel
	let funnel_floor = match cfg.funnel_severity {
		FunnelSeverity::Off => None,
		FunnelSeverity::Error => Some(DiagnosticSeverity::Error),
		FunnelSeverity::Warning => Some(DiagnosticSeverity::Warning),
	};
	if let Some(floor) = funnel_floor
		&& diagnostics::any_at_or_above(input.diagnostics, floor)
	{
		return GateDecision::skip(SkipReason::DiagnosticFunnel, effective, risk_matched);
	}

	// 5) small and harmless
	if effective < cfg.min_effective_changed_lines && !risk_matched {
		return GateDecision::skip(SkipReason::SmallLowRiskChange, effective, risk_matched);
	}

	GateDecision::proceed(effective, risk_matched)
}

#[cfg(test)]
mod tests;
