use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::domain::models::identity::OAuthToken;
use crate::errors::errors::AppResult;
use crate::repositories::sessions::session_repo::{SessionStore, StoredSession};

/// 프로세스 메모리 세션 저장소 (`REDIS_URL=memory://`, 테스트)
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, (OAuthToken, Instant)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        let now = Instant::now();
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.values().filter(|(_, expires_at)| *expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session_id: &str, token: &OAuthToken, ttl_seconds: u64) -> AppResult<()> {
        let now = Instant::now();
        let expires_at = now + Duration::from_secs(ttl_seconds);
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        // 다시 조회되지 않는 세션도 남지 않도록 저장할 때마다 만료분을 비웁니다
        sessions.retain(|_, (_, expires_at)| *expires_at > now);
        sessions.insert(session_id.to_string(), (token.clone(), expires_at));
        Ok(())
    }

    async fn load(&self, session_id: &str) -> AppResult<Option<StoredSession>> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

        match sessions.get(session_id) {
            Some((_, expires_at)) if *expires_at <= now => {
                sessions.remove(session_id);
                Ok(None)
            }
            Some((token, expires_at)) => Ok(Some(StoredSession {
                token: token.clone(),
                remaining_ttl_seconds: expires_at.duration_since(now).as_secs() as i64,
            })),
            None => Ok(None),
        }
    }

    async fn touch(&self, session_id: &str, ttl_seconds: u64) -> AppResult<bool> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

        match sessions.get_mut(session_id) {
            Some((_, expires_at)) if *expires_at > now => {
                *expires_at = now + Duration::from_secs(ttl_seconds);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove(&self, session_id: &str) -> AppResult<()> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).remove(session_id);
        Ok(())
    }
}
