//! Graph session lifecycle for the bulk driver.

use fanout::{SessionError, SessionManager};
use graphkit::{Connection, GraphAuth};

/// Opens one authenticated Graph connection per run.
///
/// Open is idempotent: the underlying [`GraphAuth`] caches its token, so a
/// source that already connected (for group expansion) and the run itself
/// share one authentication. Graph sessions are bearer tokens - close has
/// nothing to tear down remotely, it just drops the connection.
pub struct GraphSessionManager<'a> {
    auth: &'a GraphAuth,
}

impl<'a> GraphSessionManager<'a> {
    pub fn new(auth: &'a GraphAuth) -> Self {
        Self { auth }
    }
}

impl SessionManager for GraphSessionManager<'_> {
    type Session = Connection;

    fn open(&self) -> Result<Connection, SessionError> {
        self.auth
            .connect()
            .map_err(|e| SessionError::Open(e.to_string()))
    }

    fn close(&self, session: Connection) -> Result<(), SessionError> {
        drop(session);
        log::debug!("Graph session closed");
        Ok(())
    }
}
