//! # 게이트웨이 로그인 세션 서비스
//!
//! UC / IAM 백엔드가 발급받은 업스트림 토큰을 세션 ID 뒤에 숨기고,
//! 브라우저에는 세션 쿠키(`OPENAPISESSION`)와 CSRF 쿠키만 내려줍니다.
//!
//! ```text
//! 로그인 성공 ─► create(token) ─► session_id ─► Set-Cookie: OPENAPISESSION=<id>; Domain=<매칭 도메인>
//!                                           └─► Set-Cookie: OPENAPI-CSRF-TOKEN=<uuid>
//! 요청 ─► load(session_id) ─► 남은 수명이 절반 미만이면 touch() 후 쿠키 재발급
//! ```
//!
//! 쿠키 도메인은 요청 호스트가 속한 `SESSION_COOKIE_DOMAINS` 항목 중 가장 구체적인 것을 쓰고,
//! 일치하는 항목이 없으면 host-only 쿠키가 됩니다.

use std::ops::Deref;
use std::sync::Arc;

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use singleton_macro::service;
use uuid::Uuid;

use crate::config::SessionSettings;
use crate::domain::models::identity::OAuthToken;
use crate::errors::errors::AppResult;
use crate::repositories::sessions::{SessionStore, StoredSession};
use crate::utils::http_utils::session_domain;

/// `ServiceLocator` 에 수동 등록되는 세션 저장소 핸들
///
/// 실행 환경에 따라 Redis 또는 메모리 저장소를 감쌉니다.
pub struct SessionStoreHandle(Arc<dyn SessionStore>);

impl SessionStoreHandle {
    pub fn from_store(store: Arc<dyn SessionStore>) -> Self {
        Self(store)
    }
}

impl Deref for SessionStoreHandle {
    type Target = dyn SessionStore;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

#[service(name = "session")]
pub struct SessionService {
    store: Arc<SessionStoreHandle>,
    settings: Arc<SessionSettings>,
}

impl SessionService {
    /// 싱글톤을 거치지 않고 구성합니다 (ID 백엔드 테스트, 메모리 모드).
    pub fn with_store(store: Arc<dyn SessionStore>, settings: SessionSettings) -> Self {
        Self {
            store: Arc::new(SessionStoreHandle::from_store(store)),
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    fn max_age(&self) -> u64 {
        self.settings.max_age_seconds.max(1) as u64
    }

    /// 새 세션을 만들고 세션 ID 를 반환합니다.
    pub async fn create(&self, token: &OAuthToken) -> AppResult<String> {
        let session_id = Uuid::new_v4().to_string();
        self.store.save(&session_id, token, self.max_age()).await?;
        log::debug!("세션 생성 - max_age: {}초", self.max_age());
        Ok(session_id)
    }

    /// 갱신된 토큰으로 세션을 덮어쓰고 수명을 최대치로 되돌립니다.
    pub async fn save(&self, session_id: &str, token: &OAuthToken) -> AppResult<()> {
        self.store.save(session_id, token, self.max_age()).await
    }

    pub async fn load(&self, session_id: &str) -> AppResult<Option<StoredSession>> {
        self.store.load(session_id).await
    }

    pub async fn touch(&self, session_id: &str) -> AppResult<bool> {
        self.store.touch(session_id, self.max_age()).await
    }

    pub async fn remove(&self, session_id: &str) -> AppResult<()> {
        self.store.remove(session_id).await
    }

    /// 남은 수명이 최대 수명의 절반 미만인지 (슬라이딩 만료)
    pub fn should_slide(&self, session: &StoredSession) -> bool {
        session.remaining_ttl_seconds >= 0 && session.remaining_ttl_seconds < self.settings.max_age_seconds / 2
    }

    pub fn cookie_name(&self) -> &str {
        &self.settings.cookie_name
    }

    pub fn session_cookie(&self, session_id: &str, host: &str) -> Cookie<'static> {
        self.base_cookie(self.settings.cookie_name.clone(), session_id.to_string(), host)
            .http_only(true)
            .max_age(CookieDuration::seconds(self.settings.max_age_seconds))
            .finish()
    }

    pub fn expired_session_cookie(&self, host: &str) -> Cookie<'static> {
        let mut cookie = self
            .base_cookie(self.settings.cookie_name.clone(), String::new(), host)
            .http_only(true)
            .finish();
        cookie.make_removal();
        cookie
    }

    /// 새 CSRF 토큰 쿠키. 스크립트가 읽어 헤더로 되돌려 보내야 하므로 HttpOnly 가 아닙니다.
    pub fn csrf_cookie(&self, host: &str) -> Cookie<'static> {
        self.base_cookie(self.settings.csrf_cookie_name.clone(), Uuid::new_v4().to_string(), host)
            .http_only(false)
            .max_age(CookieDuration::seconds(self.settings.max_age_seconds))
            .finish()
    }

    fn base_cookie(
        &self,
        name: String,
        value: String,
        host: &str,
    ) -> actix_web::cookie::CookieBuilder<'static> {
        let builder = Cookie::build(name, value)
            .path("/")
            .secure(self.settings.secure)
            .same_site(SameSite::Lax);

        match session_domain(host, &self.settings.domains) {
            Some(domain) => builder.domain(domain),
            None => builder,
        }
    }
}
