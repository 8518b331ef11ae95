//! Session lifecycle - one authenticated backend connection per run.

use crate::error::SessionError;

/// Opens and closes authenticated sessions to whatever backend the remote
/// action needs. The lifecycle wraps the whole batch: open once before the
/// loop, close exactly once after it.
///
/// `open` must be idempotent-safe: detect an already-open session and
/// reuse it rather than erroring. This mirrors the "already connected,
/// reuse" checks every backend needs in practice.
pub trait SessionManager {
    type Session;

    /// Open (or reuse) a session. Failure here is fatal - the batch never
    /// starts.
    fn open(&self) -> Result<Self::Session, SessionError>;

    /// Close a session. Failure here is logged by [`SessionGuard`] and
    /// never discards an already-computed summary.
    fn close(&self, session: Self::Session) -> Result<(), SessionError>;
}

/// Session manager for actions that need no backend session (local OS
/// operations).
pub struct NullSessionManager;

impl SessionManager for NullSessionManager {
    type Session = ();

    fn open(&self) -> Result<(), SessionError> {
        Ok(())
    }

    fn close(&self, _session: ()) -> Result<(), SessionError> {
        Ok(())
    }
}

/// Scoped session ownership: closes the session exactly once on drop,
/// whatever the exit path - normal completion, abort, error, or unwind.
///
/// A close failure is logged at warn level; it never masks the run's
/// result.
pub struct SessionGuard<'m, M: SessionManager> {
    manager: &'m M,
    session: Option<M::Session>,
}

impl<'m, M: SessionManager> SessionGuard<'m, M> {
    /// Open a session and take ownership of closing it.
    pub fn open(manager: &'m M) -> Result<Self, SessionError> {
        let session = manager.open()?;
        Ok(Self {
            manager,
            session: Some(session),
        })
    }

    /// The open session.
    pub fn session(&self) -> &M::Session {
        // Only None after drop, which the borrow checker rules out.
        self.session.as_ref().expect("session already closed")
    }
}

impl<M: SessionManager> Drop for SessionGuard<'_, M> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take()
            && let Err(e) = self.manager.close(session)
        {
            log::warn!("{e}");
        }
    }
}
