/// Source of a review request, used to determine gating and admission rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewTrigger {
	/// Debounced file save (gated).
	Save,
	/// Idle recheck of a file that still carries unresolved issues.
	Idle,
	/// Explicit "review current file now" command.
	Manual,
}

impl ReviewTrigger {
	/// Returns a short label for status lines and log fields.
	pub fn label(self) -> &'static str {
		match self {
			Self::Save => "save",
			Self::Idle => "idle",
			Self::Manual => "manual",
		}
	}
}

impl std::fmt::Display for ReviewTrigger {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.label())
	}
}
