//! Risk pattern matching over added diff lines.
//!
//! A small change is only skippable when none of its added lines look
//! dangerous. "Dangerous" is regex-defined: control flow, dynamic code
//! evaluation, unsafe DOM sinks, subprocess spawning, async introduction.

use regex::Regex;

/// Built-in pattern sources, applied when the host configures none.
pub const DEFAULT_RISK_PATTERNS: &[&str] = &[
	// control flow
	r"\b(if|else|for|while|switch|match|loop)\b",
	r"\b(try|catch|except|finally)\b",
	// dynamic evaluation
	r"\beval\s*\(",
	r"\bnew\s+Function\s*\(",
	// unsafe DOM sinks
	r"\binnerHTML\b",
	r"\bouterHTML\b",
	r"\bdocument\.write\s*\(",
	r"\bdangerouslySetInnerHTML\b",
	// subprocess / shell
	r"\bexec(Sync)?\s*\(",
	r"\bspawn(Sync)?\s*\(",
	r"\bchild_process\b",
	// async introduction
	r"\basync\b",
	r"\bawait\b",
	// escape hatches
	r"\bunsafe\b",
	r"\bprocess\.env\b",
];

/// Compiled set of risk patterns.
///
/// Construction never fails: malformed sources are dropped with a warning so
/// one bad user pattern cannot disable the whole gate.
#[derive(Debug, Default)]
pub struct RiskPatternMatcher {
	patterns: Vec<Regex>,
}

impl RiskPatternMatcher {
	/// Compiles `sources`, silently skipping patterns that fail to parse.
	pub fn compile<S: AsRef<str>>(sources: &[S]) -> Self {
		let mut patterns = Vec::with_capacity(sources.len());
		for source in sources {
			let source = source.as_ref();
			match Regex::new(source) {
				Ok(re) => patterns.push(re),
				Err(error) => {
					tracing::warn!(pattern = source, %error, "skipping malformed risk pattern");
				}
			}
		}
		Self { patterns }
	}

	/// Compiles the built-in default pattern set.
	pub fn with_defaults() -> Self {
		Self::compile(DEFAULT_RISK_PATTERNS)
	}

	pub fn is_empty(&self) -> bool {
		self.patterns.is_empty()
	}

	pub fn len(&self) -> usize {
		self.patterns.len()
	}

	/// True when any pattern matches `line`.
	pub fn matches_line(&self, line: &str) -> bool {
		self.patterns.iter().any(|re| re.is_match(line))
	}

	/// True when any pattern matches any of `lines`.
	pub fn matches_any<'a, I>(&self, lines: I) -> bool
	where
		I: IntoIterator<Item = &'a str>,
	{
		lines.into_iter().any(|line| self.matches_line(line))
	}
}
