//! Shared primitives for the auto-review pipeline.
//!
//! This crate holds the value types exchanged between the trigger layer, the
//! gate, the dispatcher, and the editor host, plus the collaborator contracts
//! the scheduler drives. It deliberately knows nothing about scheduling
//! policy: no timers, no queues, no configuration.

pub mod diagnostics;
pub mod diff;
pub mod error;
pub mod fingerprint;
pub mod review;
pub mod status;
pub mod traits;
pub mod trigger;

pub use diagnostics::{Diagnostic, DiagnosticSeverity};
pub use diff::{DiffHunk, DiffSummary};
pub use error::ReviewError;
pub use fingerprint::Fingerprint;
pub use review::{FileReviewPatch, FileReviewResult, ReviewIssue, ReviewMode, ReviewedRange};
pub use status::StatusState;
pub use traits::{DiagnosticsProvider, DiffProvider, DocumentHost, ResultSink, ReviewExecutor, StatusSink};
pub use trigger::ReviewTrigger;
