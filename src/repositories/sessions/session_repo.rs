use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use singleton_macro::repository;

use crate::caching::redis::RedisClient;
use crate::core::registry::Repository;
use crate::domain::models::identity::OAuthToken;
use crate::errors::errors::AppResult;
use crate::utils::string_utils::sha256_hex;

/// 저장된 세션과 남은 수명
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: OAuthToken,
    /// 세션 만료까지 남은 시간(초). 만료가 없는 세션은 -1.
    pub remaining_ttl_seconds: i64,
}

/// 세션 ID → 업스트림 토큰 저장소
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, session_id: &str, token: &OAuthToken, ttl_seconds: u64) -> AppResult<()>;

    async fn load(&self, session_id: &str) -> AppResult<Option<StoredSession>>;

    /// 세션 TTL 을 다시 설정합니다. 세션이 없으면 `false`.
    async fn touch(&self, session_id: &str, ttl_seconds: u64) -> AppResult<bool>;

    async fn remove(&self, session_id: &str) -> AppResult<()>;
}

/// Redis 세션 저장소
///
/// 세션 ID 원문은 저장하지 않고 SHA-256 해시를 키로 씁니다.
#[repository(name = "session", collection = "sessions")]
pub struct SessionRepository {
    redis: Arc<RedisClient>,
}

pub const SESSION_KEY_PREFIX: &str = "openapi:sessionid:";

impl SessionRepository {
    pub fn session_key(session_id: &str) -> String {
        format!("{}{}", SESSION_KEY_PREFIX, sha256_hex(session_id))
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn save(&self, session_id: &str, token: &OAuthToken, ttl_seconds: u64) -> AppResult<()> {
        let key = Self::session_key(session_id);
        self.redis.set_with_expiry(&key, token, ttl_seconds).await?;
        log::debug!("세션 저장 - ttl: {}초", ttl_seconds);
        Ok(())
    }

    async fn load(&self, session_id: &str) -> AppResult<Option<StoredSession>> {
        let key = Self::session_key(session_id);
        let Some(token) = self.redis.get::<OAuthToken>(&key).await? else {
            return Ok(None);
        };

        // GET 과 TTL 사이에 키가 만료될 수 있습니다
        match self.redis.ttl(&key).await? {
            Some(remaining) => Ok(Some(StoredSession { token, remaining_ttl_seconds: remaining })),
            None => Ok(None),
        }
    }

    async fn touch(&self, session_id: &str, ttl_seconds: u64) -> AppResult<bool> {
        let key = Self::session_key(session_id);
        Ok(self.redis.expire(&key, ttl_seconds as i64).await?)
    }

    async fn remove(&self, session_id: &str) -> AppResult<()> {
        self.redis.del(&Self::session_key(session_id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_hides_raw_id() {
        let key = SessionRepository::session_key("9b2f0c7e-session");
        assert!(key.starts_with(SESSION_KEY_PREFIX));
        assert!(!key.contains("9b2f0c7e"));
        assert_eq!(key.len(), SESSION_KEY_PREFIX.len() + 64);
        assert_eq!(key, SessionRepository::session_key("9b2f0c7e-session"));
    }
}
