use axum_extra::extract::SignedCookieJar;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    cookies,
    handle::{Session, SessionChange},
    models::SessionModel,
    repository::SessionRepository,
};
use crate::shared::AppError;

/// Cookie and lifetime settings for sessions
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub cookie_name: String,
    pub ttl: chrono::Duration,
    pub secure_cookies: bool,
}

/// Loads sessions for incoming requests and writes their changes back
pub struct SessionService {
    repository: Arc<dyn SessionRepository + Send + Sync>,
    settings: SessionSettings,
}

impl SessionService {
    pub fn new(
        repository: Arc<dyn SessionRepository + Send + Sync>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Resolves the session named by the request's cookie, or a fresh anonymous one
    #[instrument(skip(self, jar))]
    pub async fn load(&self, jar: &SignedCookieJar) -> Result<Session, AppError> {
        let Some(cookie) = jar.get(&self.settings.cookie_name) else {
            return Ok(self.fresh());
        };

        match self.repository.get_session(cookie.value()).await? {
            Some(record) if !record.is_expired() => Ok(Session::loaded(record)),
            Some(record) => {
                debug!(session_id = %record.id, "Session cookie refers to an expired session");
                Ok(self.fresh())
            }
            None => {
                debug!("Session cookie refers to an unknown session");
                Ok(self.fresh())
            }
        }
    }

    fn fresh(&self) -> Session {
        Session::fresh(SessionModel::new(self.settings.ttl))
    }

    /// Persists what the request did to its session and updates the cookie jar to match
    #[instrument(skip(self, session, jar))]
    pub async fn commit(
        &self,
        session: &Session,
        jar: SignedCookieJar,
    ) -> Result<SignedCookieJar, AppError> {
        let (mut record, persisted, change) = session.snapshot();

        match change {
            SessionChange::Destroyed => {
                if persisted {
                    match self.repository.delete_session(&record.id).await {
                        Ok(()) | Err(AppError::SessionNotFound(_)) => {}
                        Err(e) => return Err(e),
                    }
                }
                info!(session_id = %record.id, "Session destroyed");
                // Sent even when the request's cookie failed verification
                Ok(jar.add(cookies::clear_session_cookie(&self.settings.cookie_name)))
            }
            SessionChange::Untouched if !persisted => Ok(jar),
            SessionChange::Modified | SessionChange::Untouched => {
                record.touch(self.settings.ttl);
                self.save(&record, persisted).await?;
                Ok(jar.add(cookies::session_cookie(
                    &self.settings.cookie_name,
                    &record.id,
                    self.settings.ttl,
                    self.settings.secure_cookies,
                )))
            }
        }
    }

    async fn save(&self, record: &SessionModel, persisted: bool) -> Result<(), AppError> {
        if !persisted {
            return self.repository.create_session(record).await;
        }

        match self.repository.update_session(record).await {
            Err(AppError::SessionNotFound(_)) => {
                // Swept or logged out by a concurrent request.
                warn!(session_id = %record.id, "Session vanished before save, recreating");
                self.repository.create_session(record).await
            }
            other => other,
        }
    }

    /// Removes expired sessions from the store
    pub async fn cleanup_expired(&self) -> Result<u64, AppError> {
        self.repository.cleanup_expired_sessions().await
    }
}
