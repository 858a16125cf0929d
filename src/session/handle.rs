use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::models::SessionModel;
use crate::shared::AppError;

/// What the request did to its session, read by the session layer after the handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SessionChange {
    Untouched,
    Modified,
    Destroyed,
}

#[derive(Debug)]
struct SessionState {
    record: SessionModel,
    persisted: bool,
    change: SessionChange,
}

/// Per-request view of the browser's session.
///
/// Inserted into request extensions by [`session_layer`](super::session_layer) and
/// extracted by handlers. Changes are written back once the handler returns.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionState>>,
}

impl Session {
    /// A session loaded from the store
    pub(super) fn loaded(record: SessionModel) -> Self {
        Self::with_state(record, true)
    }

    /// A new anonymous session that is only stored if something changes it
    pub(super) fn fresh(record: SessionModel) -> Self {
        Self::with_state(record, false)
    }

    fn with_state(record: SessionModel, persisted: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState {
                record,
                persisted,
                change: SessionChange::Untouched,
            })),
        }
    }

    // Nothing panics while holding the lock, so a poisoned state is still consistent.
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> String {
        self.state().record.id.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state().record.token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().record.is_authenticated()
    }

    /// Stores the access token obtained from the identity provider
    pub fn set_token(&self, token: String) {
        let mut state = self.state();
        state.record.token = Some(token);
        if state.change != SessionChange::Destroyed {
            state.change = SessionChange::Modified;
        }
    }

    /// Ends the session: the record is deleted and the cookie cleared
    pub fn destroy(&self) {
        let mut state = self.state();
        state.record.token = None;
        state.change = SessionChange::Destroyed;
    }

    pub(super) fn snapshot(&self) -> (SessionModel, bool, SessionChange) {
        let state = self.state();
        (state.record.clone(), state.persisted, state.change)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Unhandled("session layer is not installed".to_string()))
    }
}
