//! Per-session state machine.
//!
//! Everything here is synchronous. The registry runs these transitions
//! under the session's lock and performs generation after releasing it.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::planner::{self, Next};
use super::{NextQuestion, SessionError, SessionId, SessionResult, SessionStatus};
use crate::brief::{coerce_raw, validate, BriefDocument, FieldSchema, RawValue, Validation};
use crate::core::SessionConfig;

/// What the registry must do after a transition.
#[derive(Debug)]
pub(crate) enum Step {
    /// Hand this result back to the caller.
    Reply(SessionResult),
    /// The session completed; generate from this brief.
    Generate(BriefDocument),
}

/// One collection conversation.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    brief: BriefDocument,
    pending: Option<&'static FieldSchema>,
    turn_count: u32,
    retries: HashMap<&'static str, u32>,
    status: SessionStatus,
    created_at: DateTime<Utc>,
    last_activity: Instant,
    max_retries: u32,
    confirm_before_generate: bool,
}

/// Read-only view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub pending_field: Option<&'static str>,
    pub question: Option<NextQuestion>,
    pub turn_count: u32,
    pub retries: BTreeMap<&'static str, u32>,
    pub brief: BriefDocument,
    pub remaining: Vec<&'static str>,
    pub created_at: DateTime<Utc>,
    pub idle_secs: u64,
}

impl Session {
    /// Start a session; the first required field is pending.
    pub fn new(id: SessionId, config: &SessionConfig) -> Self {
        let brief = BriefDocument::new();
        let pending = planner::next(&brief).field();

        Self {
            id,
            brief,
            pending,
            turn_count: 0,
            retries: HashMap::new(),
            status: SessionStatus::Collecting,
            created_at: Utc::now(),
            last_activity: Instant::now(),
            max_retries: config.max_retries,
            confirm_before_generate: config.confirm_before_generate,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn brief(&self) -> &BriefDocument {
        &self.brief
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    /// Rejections recorded for a field since it was last accepted.
    pub fn retries(&self, field_key: &str) -> u32 {
        self.retries.get(field_key).copied().unwrap_or(0)
    }

    /// The question currently waiting for an answer.
    pub fn question(&self) -> Option<NextQuestion> {
        self.pending.map(|entry| NextQuestion::new(entry, &self.brief))
    }

    /// Record activity.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Whether the session has been idle for at least `idle_timeout`.
    pub fn is_expired(&self, now: Instant, idle_timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_activity) >= idle_timeout
    }

    /// Close the session. Finished sessions keep their status.
    pub fn abandon(&mut self) {
        if !self.status.is_terminal() {
            debug!(session_id = %self.id, from = %self.status, "Session abandoned");
            self.status = SessionStatus::Abandoned;
        }
        self.pending = None;
    }

    /// Take an answer for the pending field.
    pub(crate) fn submit(&mut self, field_key: &str, raw: &RawValue) -> Result<Step, SessionError> {
        let entry = self.expect_pending(field_key)?;
        self.status = SessionStatus::Validating;
        self.turn_count += 1;

        match validate(entry, raw) {
            Validation::Accepted(value) => {
                self.brief.insert(entry.key, value);
                self.retries.remove(entry.key);
                Ok(self.advance(|question| SessionResult::Accepted {
                    field: entry.key,
                    low_confidence: false,
                    question,
                }))
            }
            Validation::Rejected(reason) => Ok(self.reject(entry, raw, reason)),
        }
    }

    /// Skip the pending optional field.
    pub(crate) fn skip(&mut self, field_key: &str) -> Result<Step, SessionError> {
        let entry = self.expect_pending(field_key)?;
        if entry.required {
            return Err(SessionError::RequiredField(entry.key.to_string()));
        }

        self.turn_count += 1;
        self.brief.skip(entry.key);
        self.retries.remove(entry.key);
        Ok(self.advance(|question| SessionResult::Skipped { field: Some(entry.key), question }))
    }

    /// Stop asking optional fields. Required fields are still asked.
    pub(crate) fn skip_optional(&mut self) -> Result<Step, SessionError> {
        self.ensure_open()?;
        if self.status == SessionStatus::AwaitingConfirmation {
            return Ok(Step::Reply(SessionResult::AwaitingConfirmation));
        }

        self.turn_count += 1;
        self.brief.close_optional();
        Ok(self.advance(|question| SessionResult::Skipped { field: None, question }))
    }

    /// Accept the finished brief for generation.
    pub(crate) fn confirm(&mut self) -> Result<BriefDocument, SessionError> {
        self.ensure_open()?;
        if self.status != SessionStatus::AwaitingConfirmation {
            return Err(SessionError::NotAwaitingConfirmation(self.id));
        }

        self.status = SessionStatus::Complete;
        Ok(self.brief.clone())
    }

    /// Generation failed; allow another attempt through `confirm`.
    pub(crate) fn generation_failed(&mut self) {
        if self.status == SessionStatus::Complete {
            self.status = SessionStatus::AwaitingConfirmation;
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            status: self.status,
            pending_field: self.pending.map(|entry| entry.key),
            question: self.question(),
            turn_count: self.turn_count,
            retries: self.retries.iter().map(|(k, v)| (*k, *v)).collect(),
            brief: self.brief.clone(),
            remaining: planner::remaining(&self.brief),
            created_at: self.created_at,
            idle_secs: self.last_activity.elapsed().as_secs(),
        }
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.status.is_terminal() {
            return Err(SessionError::InvalidSession(self.id));
        }
        Ok(())
    }

    fn expect_pending(&self, field_key: &str) -> Result<&'static FieldSchema, SessionError> {
        self.ensure_open()?;
        match self.pending {
            Some(entry) if entry.key == field_key => Ok(entry),
            pending => Err(SessionError::FieldMismatch {
                expected: pending.map_or("(none)", |entry| entry.key).to_string(),
                got: field_key.to_string(),
            }),
        }
    }

    fn reject(&mut self, entry: &'static FieldSchema, raw: &RawValue, reason: String) -> Step {
        let rejections = self.retries(entry.key);
        let forced = coerce_raw(entry, raw);

        // empty answers can never be forced in
        if rejections >= self.max_retries && !forced.is_empty() {
            info!(session_id = %self.id, field = entry.key, reason = %reason, "Force-accepting answer");
            self.brief.insert_low_confidence(entry.key, forced);
            self.retries.remove(entry.key);
            return self.advance(|question| SessionResult::Accepted {
                field: entry.key,
                low_confidence: true,
                question,
            });
        }

        if rejections >= self.max_retries && !entry.required {
            debug!(session_id = %self.id, field = entry.key, "Giving up on optional field");
            self.brief.skip(entry.key);
            self.retries.remove(entry.key);
            return self.advance(|question| SessionResult::Skipped { field: Some(entry.key), question });
        }

        let attempt = rejections + 1;
        self.retries.insert(entry.key, attempt);
        self.status = SessionStatus::Collecting;
        debug!(session_id = %self.id, field = entry.key, attempt, reason = %reason, "Answer rejected");

        Step::Reply(SessionResult::Rejected {
            field: entry.key,
            reason,
            attempt,
            question: NextQuestion::new(entry, &self.brief),
        })
    }

    /// Move to the next field, or finish.
    fn advance(&mut self, reply: impl FnOnce(NextQuestion) -> SessionResult) -> Step {
        match planner::next(&self.brief) {
            Next::Ask(entry) => {
                self.pending = Some(entry);
                self.status = SessionStatus::Collecting;
                Step::Reply(reply(NextQuestion::new(entry, &self.brief)))
            }
            Next::Done => {
                self.pending = None;
                if self.confirm_before_generate {
                    self.status = SessionStatus::AwaitingConfirmation;
                    Step::Reply(SessionResult::AwaitingConfirmation)
                } else {
                    self.status = SessionStatus::Complete;
                    Step::Generate(self.brief.clone())
                }
            }
        }
    }
}
