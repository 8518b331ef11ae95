//! # Fanout
//!
//! A driver for bulk administrative operations.
//!
//! This crate provides the core abstraction shared by every bulk command:
//! take an ordered list of targets, apply one idempotent remote change per
//! target, isolate per-target failures, and report an end-of-run summary.
//!
//! ## Core Concepts
//!
//! - **Identity**: an opaque token naming one target (a mailbox address, a
//!   host name, a SID)
//! - **Batch**: the ordered, immutable list of identities for one run
//! - **RemoteAction**: a caller-supplied idempotent operation applied per
//!   identity
//! - **RunSummary**: the aggregate outcome of one run, with per-item results
//!   in batch order
//! - **SessionManager**: opens an authenticated backend session once per run
//!   and guarantees it is closed exactly once
//!
//! ## Example
//!
//! ```ignore
//! use fanout::{
//!     ApplyOutcome, AutoConfirm, Batch, Identity, NullReport, RemoteAction,
//!     RunOptions, run,
//! };
//!
//! struct TouchFile;
//!
//! impl RemoteAction for TouchFile {
//!     fn describe(&self) -> String {
//!         "Touch marker file".to_string()
//!     }
//!
//!     fn apply(&self, identity: &Identity) -> anyhow::Result<ApplyOutcome> {
//!         let path = format!("/tmp/{identity}");
//!         if std::path::Path::new(&path).exists() {
//!             return Ok(ApplyOutcome::Skipped {
//!                 reason: "already present".into(),
//!             });
//!         }
//!         std::fs::write(&path, b"")?;
//!         Ok(ApplyOutcome::Applied)
//!     }
//! }
//!
//! let batch: Batch = ["alpha", "bravo"].into_iter().collect();
//! let summary = run(
//!     &batch,
//!     &TouchFile,
//!     &RunOptions::default(),
//!     &mut AutoConfirm,
//!     &mut NullReport,
//! )?;
//! assert!(summary.is_success());
//! ```
//!
//! ## Provider Traits
//!
//! The crate uses traits for dependency injection:
//!
//! - [`RemoteAction`]: the per-identity state change
//! - [`IdentitySource`]: produces the batch (roster file, directory group)
//! - [`SessionManager`]: backend session lifecycle
//! - [`ReportSink`]: receives streamed results and the final summary
//! - [`ConfirmCallback`]: handles per-item confirmation prompts
//!
//! This allows the crate to be used without hard dependencies on specific
//! backends, UI frameworks, or file formats.

pub mod action;
pub mod driver;
pub mod error;
pub mod identity;
pub mod report;
pub mod session;
pub mod source;
pub mod types;

// Re-export main types at crate root
pub use action::{ApplyOutcome, RemoteAction};
pub use driver::{run, run_with_session};
pub use error::{BatchError, SessionError, SourceError};
pub use identity::{Batch, Identity};
pub use report::{AutoConfirm, AutoDecline, ConfirmCallback, NullReport, ReportSink};
pub use session::{NullSessionManager, SessionGuard, SessionManager};
pub use source::IdentitySource;
pub use types::{ConfirmMode, ItemOutcome, ItemResult, RunOptions, RunSummary};
