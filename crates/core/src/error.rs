use thiserror::Error;

/// Failure of a single backend review call.
///
/// Caught at the dispatch boundary; never allowed to escape into the flush
/// loop or block other files.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReviewError {
	/// The backend rejected or failed the request.
	#[error("review backend failed: {0}")]
	Backend(String),

	/// The backend did not answer within its own deadline.
	#[error("review backend timed out after {0} ms")]
	Timeout(u64),

	/// The execution task panicked; treated as a backend failure.
	#[error("review task panicked")]
	Panicked,
}
