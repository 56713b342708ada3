//! Process-wide session registry.
//!
//! The map lock is held only to look up, insert or remove entries. Each
//! session has its own mutex, held for the synchronous part of a turn and
//! released before generation starts.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use super::machine::{Session, SessionSnapshot, Step};
use super::{SessionError, SessionId, SessionResult};
use crate::brief::RawValue;
use crate::core::SessionConfig;
use crate::workflow::WorkflowOrchestrator;

type SharedSession = Arc<Mutex<Session>>;

/// Registry of live sessions.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SharedSession>>,
    orchestrator: Arc<WorkflowOrchestrator>,
    config: SessionConfig,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new(orchestrator: Arc<WorkflowOrchestrator>, config: SessionConfig) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), orchestrator, config }
    }

    /// Start a new session.
    pub fn create_session(&self) -> SessionId {
        let id = Uuid::new_v4();
        let session = Session::new(id, &self.config);
        self.sessions.write().insert(id, Arc::new(Mutex::new(session)));

        info!(session_id = %id, "Session created");
        id
    }

    /// Answer the pending question.
    ///
    /// When the answer completes the brief (and no confirmation is
    /// configured) generation runs before this returns.
    pub async fn submit_answer(
        &self,
        id: SessionId,
        field_key: &str,
        raw: impl Into<RawValue>,
    ) -> Result<SessionResult, SessionError> {
        let raw = raw.into();
        let step = self.with_session(id, |session| session.submit(field_key, &raw))?;
        self.finish(id, step).await
    }

    /// Skip the pending optional field.
    pub async fn skip_field(
        &self,
        id: SessionId,
        field_key: &str,
    ) -> Result<SessionResult, SessionError> {
        let step = self.with_session(id, |session| session.skip(field_key))?;
        self.finish(id, step).await
    }

    /// Skip every remaining optional field.
    pub async fn skip_optional(&self, id: SessionId) -> Result<SessionResult, SessionError> {
        let step = self.with_session(id, Session::skip_optional)?;
        self.finish(id, step).await
    }

    /// Start generation for a session awaiting confirmation.
    pub async fn confirm(&self, id: SessionId) -> Result<SessionResult, SessionError> {
        let brief = self.with_session(id, Session::confirm)?;
        self.finish(id, Step::Generate(brief)).await
    }

    /// Snapshot of a session's state.
    pub fn get_state(&self, id: SessionId) -> Result<SessionSnapshot, SessionError> {
        let session = self.lookup(id)?;
        let mut session = session.lock();
        if session.is_expired(Instant::now(), self.config.idle_timeout()) {
            session.abandon();
            drop(session);
            self.evict(id);
            return Err(SessionError::InvalidSession(id));
        }
        Ok(session.snapshot())
    }

    /// Close and remove a session.
    pub fn close_session(&self, id: SessionId) -> Result<(), SessionError> {
        let session = self.sessions.write().remove(&id).ok_or(SessionError::InvalidSession(id))?;
        session.lock().abandon();

        info!(session_id = %id, "Session closed");
        Ok(())
    }

    /// Remove sessions idle for longer than the configured timeout.
    ///
    /// Returns the number of sessions removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let idle_timeout = self.config.idle_timeout();

        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|id, session| {
            let mut session = session.lock();
            if session.is_expired(now, idle_timeout) {
                debug!(session_id = %id, "Session expired");
                session.abandon();
                false
            } else {
                true
            }
        });

        let purged = before - sessions.len();
        if purged > 0 {
            info!(purged, "Purged idle sessions");
        }
        purged
    }

    /// Purge expired sessions every `period` until the registry is dropped.
    pub fn spawn_reaper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let registry: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match registry.upgrade() {
                    Some(registry) => {
                        registry.purge_expired();
                    }
                    None => break,
                }
            }
        })
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether there are no live sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn lookup(&self, id: SessionId) -> Result<SharedSession, SessionError> {
        self.sessions.read().get(&id).cloned().ok_or(SessionError::InvalidSession(id))
    }

    /// Drop an expired session found on lookup. Must not be called with a
    /// session lock held.
    fn evict(&self, id: SessionId) {
        if self.sessions.write().remove(&id).is_some() {
            debug!(session_id = %id, "Session expired");
        }
    }

    /// Run a synchronous transition under the session lock.
    fn with_session<T>(
        &self,
        id: SessionId,
        transition: impl FnOnce(&mut Session) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let session = self.lookup(id)?;
        let mut session = session.lock();

        if session.is_expired(Instant::now(), self.config.idle_timeout()) {
            session.abandon();
            drop(session);
            self.evict(id);
            return Err(SessionError::InvalidSession(id));
        }

        let result = transition(&mut session);
        session.touch();
        result
    }

    /// Complete a turn, generating if the session finished.
    async fn finish(&self, id: SessionId, step: Step) -> Result<SessionResult, SessionError> {
        let brief = match step {
            Step::Reply(result) => return Ok(result),
            Step::Generate(brief) => brief,
        };

        info!(session_id = %id, fields = brief.len(), "Brief complete, generating");
        match self.orchestrator.run(&brief).await {
            Ok(bundle) => Ok(SessionResult::Complete(Box::new(bundle))),
            Err(e) => {
                if let Ok(session) = self.lookup(id) {
                    session.lock().generation_failed();
                }
                Err(SessionError::Generation(e))
            }
        }
    }
}
