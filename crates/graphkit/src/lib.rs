//! # Graphkit
//!
//! A minimal Microsoft Graph client for bulk mailbox administration.
//!
//! Covers exactly what the drover CLI needs and nothing more:
//!
//! - app-only (client credentials) authentication with token reuse
//! - reading and writing a mailbox's automatic-replies configuration
//! - listing the members of a directory group by display name
//!
//! Errors are categorized ([`ErrorCategory`]) so callers can retry the
//! transient ones ([`with_retry`]) and surface the rest.

pub mod auth;
pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use auth::{Connection, GraphAuth};
pub use error::{Error, ErrorCategory, Result};
pub use retry::{NoCallback, RetryCallback, with_retry};
pub use types::{
    AutoReplyConfig, AutoReplyState, ExternalAudience, RetryConfig, ScheduleWindow, Token,
};
