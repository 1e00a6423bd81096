//! # IAM 백엔드
//!
//! 토큰 엔드포인트는 JSON 본문을 받으며, 사용자 API 는 `{success, data}` 봉투로 응답합니다.
//! 세션에 저장된 액세스 토큰이 만료 5분 전이면 refresh_token 으로 갱신해 다시 저장합니다.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::{IamSettings, IdentityProviderKind};
use crate::domain::models::auth::RequestCookies;
use crate::domain::models::identity::{AuthCredential, LoadedCredential, OAuthToken, UserInfo};
use crate::errors::errors::{AppError, AppResult};
use crate::services::identity::backend::IdentityBackend;
use crate::services::identity::session_backed::{create_session, find_session, remove_session};
use crate::services::identity::upstream::{http_client, read_json, send_failed, CallKind, ClientTokenCache, Envelope};
use crate::services::sessions::SessionService;
use crate::utils::string_utils::deserialize_user_id;

/// 만료까지 이 시간(초) 이하로 남으면 토큰을 갱신합니다.
pub const IAM_REFRESH_WINDOW_SECONDS: i64 = 300;

#[derive(Debug, Default, Serialize)]
struct IamTokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_uri: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct IamUser {
    #[serde(deserialize_with = "deserialize_user_id")]
    id: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default, alias = "nickName")]
    nickname: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default, alias = "mobile")]
    phone: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl From<IamUser> for UserInfo {
    fn from(user: IamUser) -> Self {
        UserInfo {
            id: user.id,
            name: user.username.unwrap_or_default(),
            nick: user.nickname.unwrap_or_default(),
            avatar_url: user.avatar.unwrap_or_default(),
            phone: user.phone.unwrap_or_default(),
            email: user.email.unwrap_or_default(),
        }
    }
}

pub struct IamBackend {
    http: reqwest::Client,
    settings: IamSettings,
    sessions: Arc<SessionService>,
    client_token: ClientTokenCache,
}

impl IamBackend {
    pub fn new(settings: IamSettings, sessions: Arc<SessionService>, timeout_seconds: u64) -> AppResult<Self> {
        Ok(Self {
            http: http_client(timeout_seconds)?,
            settings,
            sessions,
            client_token: ClientTokenCache::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.addr, path)
    }

    fn token_request<'a>(&'a self, grant_type: &'a str) -> IamTokenRequest<'a> {
        IamTokenRequest {
            grant_type,
            client_id: &self.settings.client_id,
            client_secret: &self.settings.client_secret,
            ..Default::default()
        }
    }

    async fn request_token(&self, body: &IamTokenRequest<'_>, kind: CallKind) -> AppResult<OAuthToken> {
        let response = self
            .http
            .post(self.url("/iam/oauth2/server/token"))
            .json(body)
            .send()
            .await
            .map_err(|e| send_failed("IAM 토큰 교환", e))?;

        read_json(response, "IAM 토큰 교환", kind).await
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<OAuthToken> {
        let body = IamTokenRequest {
            refresh_token: Some(refresh_token),
            ..self.token_request("refresh_token")
        };
        self.request_token(&body, CallKind::UserGrant).await
    }

    /// 갱신할 수 없는 세션을 지우고 로그아웃 상태로 돌려보냅니다.
    async fn drop_session(&self, session_id: &str, host: &str) -> AppResult<LoadedCredential> {
        self.sessions.remove(session_id).await?;
        Ok(LoadedCredential::default().with_cookie(self.sessions.expired_session_cookie(host)))
    }
}

#[async_trait]
impl IdentityBackend for IamBackend {
    fn kind(&self) -> IdentityProviderKind {
        IdentityProviderKind::Iam
    }

    async fn load(&self, cookies: &RequestCookies, host: &str) -> AppResult<LoadedCredential> {
        let Some((session_id, stored)) = find_session(&self.sessions, cookies).await? else {
            return Ok(LoadedCredential::default());
        };

        let now = Utc::now().timestamp();
        if !stored.token.needs_refresh(now, IAM_REFRESH_WINDOW_SECONDS) {
            return Ok(LoadedCredential::new(AuthCredential::from_session(
                &session_id,
                &stored.token.access_token,
            )));
        }

        let Some(refresh_token) = stored.token.refresh_token.as_deref() else {
            if stored.token.is_expired(now) {
                log::debug!("IAM 토큰 만료, refresh_token 없음");
                return self.drop_session(&session_id, host).await;
            }
            return Ok(LoadedCredential::new(AuthCredential::from_session(
                &session_id,
                &stored.token.access_token,
            )));
        };

        match self.refresh(refresh_token).await {
            Ok(mut refreshed) => {
                // 일부 서버는 refresh 응답에 새 refresh_token 을 싣지 않습니다
                if refreshed.refresh_token.is_none() {
                    refreshed.refresh_token = Some(refresh_token.to_string());
                }
                self.sessions.save(&session_id, &refreshed).await?;
                log::debug!("IAM 토큰 갱신 완료");
                Ok(LoadedCredential::new(AuthCredential::from_session(&session_id, &refreshed.access_token))
                    .with_cookie(self.sessions.session_cookie(&session_id, host)))
            }
            Err(AppError::AuthenticationError(reason)) => {
                log::warn!("IAM 토큰 갱신 거부: {}", reason);
                self.drop_session(&session_id, host).await
            }
            Err(e) => Err(e),
        }
    }

    async fn persist(&self, token: &OAuthToken, host: &str) -> AppResult<Vec<Cookie<'static>>> {
        create_session(&self.sessions, token, host).await
    }

    async fn me(&self, credential: &AuthCredential) -> AppResult<UserInfo> {
        let Some(access_token) = credential.access_token.as_deref() else {
            return Err(AppError::AuthenticationError("로그인이 필요합니다".to_string()));
        };

        let response = self
            .http
            .get(self.url("/iam/api/v1/user/current-user"))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| send_failed("IAM current-user", e))?;

        let envelope: Envelope<IamUser> = read_json(response, "IAM current-user", CallKind::UserCredential).await?;
        envelope
            .into_result()
            .map(UserInfo::from)
            .ok_or_else(|| AppError::AuthenticationError("IAM 로그인 세션이 유효하지 않습니다".to_string()))
    }

    async fn exchange_code(&self, code: &str, redirect_uri: Option<&str>) -> AppResult<OAuthToken> {
        let body = IamTokenRequest {
            code: Some(code),
            redirect_uri,
            ..self.token_request("authorization_code")
        };
        self.request_token(&body, CallKind::UserGrant).await
    }

    async fn exchange_password(&self, username: &str, password: &str) -> AppResult<OAuthToken> {
        let body = IamTokenRequest {
            username: Some(username),
            password: Some(password),
            ..self.token_request("password")
        };
        self.request_token(&body, CallKind::UserGrant).await
    }

    async fn exchange_client_credentials(&self, refresh: bool) -> AppResult<OAuthToken> {
        if !refresh {
            if let Some(token) = self.client_token.get() {
                return Ok(token);
            }
        }

        let token = self
            .request_token(&self.token_request("client_credentials"), CallKind::Client)
            .await?;
        self.client_token.store(&token, Utc::now().timestamp());
        Ok(token)
    }

    async fn get_user(&self, user_id: &str) -> AppResult<UserInfo> {
        let token = self.exchange_client_credentials(false).await?;
        let response = self
            .http
            .get(self.url(&format!("/iam/api/v1/admin/user/{}", urlencoding::encode(user_id))))
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| send_failed("IAM 사용자 조회", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("사용자를 찾을 수 없습니다: {}", user_id)));
        }

        let envelope: Envelope<IamUser> = read_json(response, "IAM 사용자 조회", CallKind::Client).await?;
        envelope
            .into_result()
            .map(UserInfo::from)
            .ok_or_else(|| AppError::NotFound(format!("사용자를 찾을 수 없습니다: {}", user_id)))
    }

    async fn logout(&self, credential: &AuthCredential) -> AppResult<()> {
        remove_session(&self.sessions, credential).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionSettings;
    use crate::repositories::sessions::{MemorySessionStore, SessionStore};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(addr: String, store: Arc<MemorySessionStore>) -> IamBackend {
        let settings = IamSettings {
            addr,
            client_id: "erda".to_string(),
            client_secret: "secret".to_string(),
        };
        let sessions = Arc::new(SessionService::with_store(store, SessionSettings::default()));
        IamBackend::new(settings, sessions, 5).unwrap()
    }

    fn token_expiring_in(access_token: &str, seconds: i64, refresh_token: Option<&str>) -> OAuthToken {
        OAuthToken {
            refresh_token: refresh_token.map(str::to_string),
            issued_at: Utc::now().timestamp(),
            ..OAuthToken::new(access_token, seconds)
        }
    }

    #[actix_web::test]
    async fn test_exchange_code_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/iam/oauth2/server/token"))
            .and(body_partial_json(json!({
                "grant_type": "authorization_code",
                "client_id": "erda",
                "code": "c-1",
                "redirect_uri": "https://erda.cloud/callback"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "iam-at", "expires_in": 7200, "refresh_token": "iam-rt"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let iam = backend(server.uri(), Arc::new(MemorySessionStore::new()));
        let token = iam.exchange_code("c-1", Some("https://erda.cloud/callback")).await.unwrap();
        assert_eq!(token.access_token, "iam-at");
        assert_eq!(token.refresh_token.as_deref(), Some("iam-rt"));
    }

    #[actix_web::test]
    async fn test_me_normalizes_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/iam/api/v1/user/current-user"))
            .and(header("authorization", "Bearer iam-at"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"id": "u-7", "username": "erda", "nickName": "Erda", "mobile": "139", "email": null}
            })))
            .mount(&server)
            .await;

        let iam = backend(server.uri(), Arc::new(MemorySessionStore::new()));
        let user = iam.me(&AuthCredential::from_session("sid", "iam-at")).await.unwrap();
        assert_eq!(user.id, "u-7");
        assert_eq!(user.nick, "Erda");
        assert_eq!(user.phone, "139");
        assert_eq!(user.email, "");
    }

    #[actix_web::test]
    async fn test_me_without_user_id_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/iam/api/v1/user/current-user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"id": null, "username": "ghost"}
            })))
            .mount(&server)
            .await;

        let iam = backend(server.uri(), Arc::new(MemorySessionStore::new()));
        let err = iam.me(&AuthCredential::from_session("sid", "iam-at")).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalServiceError(_)));
    }

    #[actix_web::test]
    async fn test_me_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/iam/api/v1/user/current-user"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let iam = backend(server.uri(), Arc::new(MemorySessionStore::new()));
        let err = iam.me(&AuthCredential::from_session("sid", "stale")).await.unwrap_err();
        assert!(matches!(err, AppError::AuthenticationError(_)));
    }

    #[actix_web::test]
    async fn test_load_fresh_token_does_not_refresh() {
        let store = Arc::new(MemorySessionStore::new());
        store.save("sid", &token_expiring_in("at", 3600, Some("rt")), 1000).await.unwrap();
        let iam = backend("http://unused".to_string(), store);

        let loaded = iam.load(&RequestCookies::parse(["OPENAPISESSION=sid"]), "erda.cloud").await.unwrap();
        assert_eq!(loaded.credential.access_token.as_deref(), Some("at"));
        assert!(loaded.refreshed_cookies.is_empty());
    }

    #[actix_web::test]
    async fn test_load_refreshes_near_expiry_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/iam/oauth2/server/token"))
            .and(body_partial_json(json!({"grant_type": "refresh_token", "refresh_token": "rt"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at-2", "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemorySessionStore::new());
        store.save("sid", &token_expiring_in("at-1", 120, Some("rt")), 1000).await.unwrap();
        let iam = backend(server.uri(), store.clone());

        let loaded = iam.load(&RequestCookies::parse(["OPENAPISESSION=sid"]), "erda.cloud").await.unwrap();
        assert_eq!(loaded.credential.access_token.as_deref(), Some("at-2"));
        assert_eq!(loaded.refreshed_cookies.len(), 1);
        assert_eq!(loaded.refreshed_cookies[0].value(), "sid");

        let stored = store.load("sid").await.unwrap().unwrap();
        assert_eq!(stored.token.access_token, "at-2");
        assert_eq!(stored.token.refresh_token.as_deref(), Some("rt"));
    }

    #[actix_web::test]
    async fn test_rejected_refresh_logs_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/iam/oauth2/server/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
            .mount(&server)
            .await;

        let store = Arc::new(MemorySessionStore::new());
        store.save("sid", &token_expiring_in("at-1", 60, Some("rt")), 1000).await.unwrap();
        let iam = backend(server.uri(), store.clone());

        let loaded = iam.load(&RequestCookies::parse(["OPENAPISESSION=sid"]), "erda.cloud").await.unwrap();
        assert!(loaded.credential.is_empty());
        assert_eq!(loaded.refreshed_cookies[0].value(), "");
        assert!(store.load("sid").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_get_user_uses_client_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/iam/oauth2/server/token"))
            .and(body_partial_json(json!({"grant_type": "client_credentials"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "client-at", "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/iam/api/v1/admin/user/u-7"))
            .and(header("authorization", "Bearer client-at"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "data": {"id": "u-7", "username": "erda"}
            })))
            .expect(2)
            .mount(&server)
            .await;

        let iam = backend(server.uri(), Arc::new(MemorySessionStore::new()));
        assert_eq!(iam.get_user("u-7").await.unwrap().name, "erda");
        assert_eq!(iam.get_user("u-7").await.unwrap().name, "erda");
    }
}
