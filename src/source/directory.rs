//! Directory group source - expand a group's membership via Graph.

use fanout::{Batch, IdentitySource, SourceError};
use graphkit::{ErrorCategory, GraphAuth, RetryConfig, with_retry};

/// Member user principal names of one directory group.
///
/// Connecting here and again inside the run is fine: [`GraphAuth`] reuses
/// its cached token.
pub struct DirectoryGroup<'a> {
    auth: &'a GraphAuth,
    group: String,
}

impl<'a> DirectoryGroup<'a> {
    pub fn new(auth: &'a GraphAuth, group: impl Into<String>) -> Self {
        Self {
            auth,
            group: group.into(),
        }
    }
}

impl IdentitySource for DirectoryGroup<'_> {
    fn load(&self) -> Result<Batch, SourceError> {
        let conn = self
            .auth
            .connect()
            .map_err(|e| SourceError::lookup(format!("could not connect to Graph: {e}")))?;

        let members = with_retry(&RetryConfig::default(), None, || {
            conn.group_members(&self.group)
        })
        .map_err(|e| match e.category() {
            ErrorCategory::NotFound => {
                SourceError::lookup(format!("group '{}' could not be resolved", self.group))
            }
            _ => SourceError::lookup(format!("could not list members of '{}': {e}", self.group)),
        })?;

        log::info!("group '{}' expanded to {} members", self.group, members.len());
        Ok(members.into_iter().collect())
    }
}
