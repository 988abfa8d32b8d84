use pretty_assertions::assert_eq;
use redline_core::{Diagnostic, DiagnosticSeverity, DiffHunk, DiffSummary, Fingerprint, ReviewTrigger};

use super::*;

fn diff_with_counts(added: u32, deleted: u32) -> DiffSummary {
	DiffSummary {
		added_lines: added,
		deleted_lines: deleted,
		hunks: vec![DiffHunk {
			new_start: 1,
			new_count: added.max(1),
			lines: vec![],
		}],
		..Default::default()
	}
}

fn save_input<'a>(diff: Option<&'a DiffSummary>, diagnostics: &'a [Diagnostic]) -> GateInput<'a> {
	GateInput {
		trigger: ReviewTrigger::Save,
		saved_fingerprint: Some(Fingerprint::of_str("current")),
		last_reviewed_fingerprint: None,
		diff,
		diagnostics,
	}
}

#[test]
fn same_content_skips_regardless_of_diff() {
	let fp = Fingerprint::of_str("abc");
	let diff = diff_with_counts(40, 12);
	let input = GateInput {
		trigger: ReviewTrigger::Save,
		saved_fingerprint: Some(fp),
		last_reviewed_fingerprint: Some(fp),
		diff: Some(&diff),
		diagnostics: &[],
	};
	let decision = evaluate(&input, &GateConfig::default(), &RiskPatternMatcher::default());
	assert_eq!(decision.skip, Some(SkipReason::SameContent));
	// size still reported for logging
	assert_eq!(decision.effective_changed_lines, 52);
}

#[test]
fn same_content_check_disabled_by_config() {
	let fp = Fingerprint::of_str("abc");
	let diff = diff_with_counts(40, 12);
	let input = GateInput {
		trigger: ReviewTrigger::Save,
		saved_fingerprint: Some(fp),
		last_reviewed_fingerprint: Some(fp),
		diff: Some(&diff),
		diagnostics: &[],
	};
	let cfg = GateConfig {
		skip_same_content: false,
		..Default::default()
	};
	let decision = evaluate(&input, &cfg, &RiskPatternMatcher::default());
	assert!(decision.proceeds());
}

#[test]
fn missing_diff_skips_no_pending_diff() {
	let decision = evaluate(&save_input(None, &[]), &GateConfig::default(), &RiskPatternMatcher::default());
	assert_eq!(decision.skip, Some(SkipReason::NoPendingDiff));
	assert_eq!(decision.effective_changed_lines, 0);
}

#[test]
fn zero_hunk_diff_skips_no_pending_diff() {
	let diff = DiffSummary::default();
	let decision = evaluate(&save_input(Some(&diff), &[]), &GateConfig::default(), &RiskPatternMatcher::default());
	assert_eq!(decision.skip, Some(SkipReason::NoPendingDiff));
}

#[test]
fn format_only_skips_even_when_large() {
	let diff = DiffSummary {
		format_only: true,
		..diff_with_counts(300, 280)
	};
	let decision = evaluate(&save_input(Some(&diff), &[]), &GateConfig::default(), &RiskPatternMatcher::default());
	assert_eq!(decision.skip, Some(SkipReason::NoiseOnlyChange));
	assert_eq!(decision.effective_changed_lines, 580);
}

#[test]
fn comment_only_skips_as_noise() {
	let diff = DiffSummary {
		comment_only: true,
		..diff_with_counts(4, 0)
	};
	let decision = evaluate(&save_input(Some(&diff), &[]), &GateConfig::default(), &RiskPatternMatcher::default());
	assert_eq!(decision.skip, Some(SkipReason::NoiseOnlyChange));
}

#[test]
fn error_funnel_skips_on_error_diagnostic() {
	let diff = diff_with_counts(10, 2);
	let diags = [Diagnostic::new(DiagnosticSeverity::Error)];
	let cfg = GateConfig {
		funnel_severity: FunnelSeverity::Error,
		..Default::default()
	};
	let decision = evaluate(&save_input(Some(&diff), &diags), &cfg, &RiskPatternMatcher::default());
	assert_eq!(decision.skip, Some(SkipReason::DiagnosticFunnel));
}

#[test]
fn error_funnel_ignores_warnings() {
	let diff = diff_with_counts(10, 2);
	let diags = [Diagnostic::new(DiagnosticSeverity::Warning)];
	let cfg = GateConfig {
		funnel_severity: FunnelSeverity::Error,
		..Default::default()
	};
	let decision = evaluate(&save_input(Some(&diff), &diags), &cfg, &RiskPatternMatcher::default());
	assert!(decision.proceeds());
}

#[test]
fn warning_funnel_skips_on_warning_or_error() {
	let diff = diff_with_counts(10, 2);
	let cfg = GateConfig {
		funnel_severity: FunnelSeverity::Warning,
		..Default::default()
	};
	for severity in [DiagnosticSeverity::Warning, DiagnosticSeverity::Error] {
		let diags = [Diagnostic::new(severity)];
		let decision = evaluate(&save_input(Some(&diff), &diags), &cfg, &RiskPatternMatcher::default());
		assert_eq!(decision.skip, Some(SkipReason::DiagnosticFunnel), "severity {severity:?}");
	}
}

#[test]
fn off_funnel_never_consults_diagnostics() {
	let diff = diff_with_counts(10, 2);
	let diags = [Diagnostic::new(DiagnosticSeverity::Error)];
	let decision = evaluate(&save_input(Some(&diff), &diags), &GateConfig::default(), &RiskPatternMatcher::default());
	assert!(decision.proceeds());
}

#[test]
fn small_low_risk_change_skips() {
	let diff = DiffSummary {
		added_content: vec!["const label = \"ok\";".into()],
		..diff_with_counts(1, 1)
	};
	let decision = evaluate(&save_input(Some(&diff), &[]), &GateConfig::default(), &RiskPatternMatcher::with_defaults());
	assert_eq!(decision.skip, Some(SkipReason::SmallLowRiskChange));
	assert_eq!(decision.effective_changed_lines, 2);
	assert!(!decision.risk_matched);
}

#[test]
fn small_but_risky_change_proceeds() {
	let diff = DiffSummary {
		added_content: vec!["return eval(expr);".into()],
		..diff_with_counts(1, 1)
	};
	let decision = evaluate(&save_input(Some(&diff), &[]), &GateConfig::default(), &RiskPatternMatcher::with_defaults());
	assert!(decision.proceeds());
	assert!(decision.risk_matched);
}

#[test]
fn size_floor_zero_disables_small_check() {
	let diff = DiffSummary {
		added_content: vec!["const label = \"ok\";".into()],
		..diff_with_counts(1, 0)
	};
	let cfg = GateConfig {
		min_effective_changed_lines: 0,
		..Default::default()
	};
	let decision = evaluate(&save_input(Some(&diff), &[]), &cfg, &RiskPatternMatcher::with_defaults());
	assert!(decision.proceeds());
}

#[test]
fn large_change_proceeds() {
	let diff = diff_with_counts(25, 3);
	let decision = evaluate(&save_input(Some(&diff), &[]), &GateConfig::default(), &RiskPatternMatcher::with_defaults());
	assert!(decision.proceeds());
	assert_eq!(decision.effective_changed_lines, 28);
}

#[test]
fn manual_trigger_never_skips() {
	let fp = Fingerprint::of_str("abc");
	let diags = [Diagnostic::new(DiagnosticSeverity::Error)];
	let input = GateInput {
		trigger: ReviewTrigger::Manual,
		saved_fingerprint: Some(fp),
		last_reviewed_fingerprint: Some(fp),
		diff: None,
		diagnostics: &diags,
	};
	let cfg = GateConfig {
		funnel_severity: FunnelSeverity::Error,
		..Default::default()
	};
	let decision = evaluate(&input, &cfg, &RiskPatternMatcher::with_defaults());
	assert!(decision.proceeds());
}

#[test]
fn idle_trigger_never_skips() {
	let input = GateInput {
		trigger: ReviewTrigger::Idle,
		saved_fingerprint: None,
		last_reviewed_fingerprint: None,
		diff: None,
		diagnostics: &[],
	};
	let decision = evaluate(&input, &GateConfig::default(), &RiskPatternMatcher::default());
	assert!(decision.proceeds());
}

#[test]
fn check_order_noise_beats_funnel() {
	// format-only diff plus error diagnostics: noise wins because it runs first
	let diff = DiffSummary {
		format_only: true,
		..diff_with_counts(5, 5)
	};
	let diags = [Diagnostic::new(DiagnosticSeverity::Error)];
	let cfg = GateConfig {
		funnel_severity: FunnelSeverity::Error,
		..Default::default()
	};
	let decision = evaluate(&save_input(Some(&diff), &diags), &cfg, &RiskPatternMatcher::default());
	assert_eq!(decision.skip, Some(SkipReason::NoiseOnlyChange));
}
