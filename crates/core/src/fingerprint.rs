use std::hash::Hasher;

use rustc_hash::FxHasher;

/// Content fingerprint of a saved document.
///
/// Equality is the only meaningful operation: two fingerprints compare equal
/// iff they were computed from identical bytes. The value is not stable
/// across processes and must never be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Fingerprint(u64);

impl Fingerprint {
	/// Fingerprints a byte slice.
	pub fn of_bytes(bytes: &[u8]) -> Self {
		let mut hasher = FxHasher::default();
		hasher.write(bytes);
		hasher.write_usize(bytes.len());
		Self(hasher.finish())
	}

	/// Fingerprints UTF-8 text.
	pub fn of_str(text: &str) -> Self {
		Self::of_bytes(text.as_bytes())
	}
}

impl std::fmt::Display for Fingerprint {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:016x}", self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn equal_content_equal_fingerprint() {
		assert_eq!(Fingerprint::of_str("fn main() {}"), Fingerprint::of_str("fn main() {}"));
	}

	#[test]
	fn different_content_different_fingerprint() {
		assert_ne!(Fingerprint::of_str("let a = 1;"), Fingerprint::of_str("let a = 2;"));
	}

	#[test]
	fn empty_input_is_stable() {
		assert_eq!(Fingerprint::of_bytes(b""), Fingerprint::of_bytes(b""));
	}
}
