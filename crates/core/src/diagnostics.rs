/// Severity of a host diagnostic, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSeverity {
	Hint,
	Info,
	Warning,
	Error,
}

/// One diagnostic as reported by the editor host for a file.
///
/// The scheduler only funnels on severity; ranges and messages stay with the
/// host.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
	pub severity: DiagnosticSeverity,
	/// Diagnostic source (linter name etc.), informational only.
	#[serde(default)]
	pub source: Option<String>,
}

impl Diagnostic {
	pub fn new(severity: DiagnosticSeverity) -> Self {
		Self {
			severity,
			source: None,
		}
	}
}

/// Returns true when `diagnostics` contains an entry at or above `floor`.
pub fn any_at_or_above(diagnostics: &[Diagnostic], floor: DiagnosticSeverity) -> bool {
	diagnostics.iter().any(|d| d.severity >= floor)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn severity_orders_error_highest() {
		assert!(DiagnosticSeverity::Error > DiagnosticSeverity::Warning);
		assert!(DiagnosticSeverity::Warning > DiagnosticSeverity::Info);
		assert!(DiagnosticSeverity::Info > DiagnosticSeverity::Hint);
	}

	#[test]
	fn floor_check_matches_at_or_above() {
		let diags = vec![Diagnostic::new(DiagnosticSeverity::Warning)];
		assert!(any_at_or_above(&diags, DiagnosticSeverity::Warning));
		assert!(!any_at_or_above(&diags, DiagnosticSeverity::Error));
		assert!(any_at_or_above(&diags, DiagnosticSeverity::Hint));
	}
}
