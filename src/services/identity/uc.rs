//! # UC 백엔드
//!
//! | 용도 | 호출 |
//! |------|------|
//! | 토큰 교환 | `POST /oauth/token` (form, client basic auth) |
//! | 현재 사용자 | `GET /api/oauth/me` (bearer) |
//! | UC 쿠키 패스스루 | `GET /api/user/web/current-user` (`{success, result}`) |
//! | 사용자 조회 | `GET /api/users/{id}` (client-credentials bearer, `{success, result}`) |
//!
//! 로그인 세션은 게이트웨이 세션 저장소에 보관되며, 남은 수명이 절반 미만이면 연장됩니다.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::COOKIE;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::{IdentityProviderKind, UcSettings};
use crate::domain::models::auth::RequestCookies;
use crate::domain::models::identity::{AuthCredential, LoadedCredential, OAuthToken, UserInfo};
use crate::errors::errors::{AppError, AppResult};
use crate::services::identity::backend::IdentityBackend;
use crate::services::identity::session_backed::{create_session, find_session, remove_session, slide_session};
use crate::services::identity::upstream::{http_client, read_json, send_failed, CallKind, ClientTokenCache, Envelope};
use crate::services::sessions::SessionService;
use crate::utils::string_utils::deserialize_user_id;

/// UC 사용자 응답. 필드가 `null` 로 내려올 수 있습니다.
#[derive(Debug, Deserialize)]
struct UcUser {
    #[serde(deserialize_with = "deserialize_user_id")]
    id: String,
    #[serde(default, alias = "userName")]
    username: Option<String>,
    #[serde(default, alias = "nickName")]
    nickname: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default, alias = "phone")]
    mobile: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl From<UcUser> for UserInfo {
    fn from(user: UcUser) -> Self {
        UserInfo {
            id: user.id,
            name: user.username.unwrap_or_default(),
            nick: user.nickname.unwrap_or_default(),
            avatar_url: user.avatar.unwrap_or_default(),
            phone: user.mobile.unwrap_or_default(),
            email: user.email.unwrap_or_default(),
        }
    }
}

pub struct UcBackend {
    http: reqwest::Client,
    settings: UcSettings,
    sessions: Arc<SessionService>,
    client_token: ClientTokenCache,
}

impl UcBackend {
    pub fn new(settings: UcSettings, sessions: Arc<SessionService>, timeout_seconds: u64) -> AppResult<Self> {
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

    async fn request_token(&self, params: &[(&str, &str)], kind: CallKind) -> AppResult<OAuthToken> {
        let response = self
            .http
            .post(self.url("/oauth/token"))
            .basic_auth(&self.settings.client_id, Some(&self.settings.client_secret))
            .form(params)
            .send()
            .await
            .map_err(|e| send_failed("UC 토큰 교환", e))?;

        read_json(response, "UC 토큰 교환", kind).await
    }

    async fn me_by_token(&self, access_token: &str) -> AppResult<UserInfo> {
        let response = self
            .http
            .get(self.url("/api/oauth/me"))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| send_failed("UC 사용자 조회", e))?;

        let user: UcUser = read_json(response, "UC 사용자 조회", CallKind::UserCredential).await?;
        Ok(user.into())
    }

    async fn me_by_cookie(&self, cookie: &str) -> AppResult<UserInfo> {
        let response = self
            .http
            .get(self.url("/api/user/web/current-user"))
            .header(COOKIE, cookie)
            .send()
            .await
            .map_err(|e| send_failed("UC current-user", e))?;

        let envelope: Envelope<UcUser> = read_json(response, "UC current-user", CallKind::UserCredential).await?;
        envelope
            .into_result()
            .map(UserInfo::from)
            .ok_or_else(|| AppError::AuthenticationError("UC 로그인 세션이 유효하지 않습니다".to_string()))
    }
}

#[async_trait]
impl IdentityBackend for UcBackend {
    fn kind(&self) -> IdentityProviderKind {
        IdentityProviderKind::Uc
    }

    async fn load(&self, cookies: &RequestCookies, host: &str) -> AppResult<LoadedCredential> {
        if let Some((session_id, stored)) = find_session(&self.sessions, cookies).await? {
            let credential = AuthCredential::from_session(&session_id, &stored.token.access_token);
            let mut loaded = LoadedCredential::new(credential);
            if let Some(cookie) = slide_session(&self.sessions, &session_id, &stored, host).await? {
                loaded = loaded.with_cookie(cookie);
            }
            return Ok(loaded);
        }

        if let Some(name) = self.settings.session_cookie.as_deref() {
            if let Some(value) = cookies.get(name) {
                return Ok(LoadedCredential::new(AuthCredential::from_cookie(name, value)));
            }
        }

        Ok(LoadedCredential::default())
    }

    async fn persist(&self, token: &OAuthToken, host: &str) -> AppResult<Vec<Cookie<'static>>> {
        create_session(&self.sessions, token, host).await
    }

    async fn me(&self, credential: &AuthCredential) -> AppResult<UserInfo> {
        if let Some(access_token) = credential.access_token.as_deref() {
            return self.me_by_token(access_token).await;
        }
        if let Some(cookie) = credential.passthrough_cookie.as_deref() {
            return self.me_by_cookie(cookie).await;
        }
        Err(AppError::AuthenticationError("로그인이 필요합니다".to_string()))
    }

    async fn exchange_code(&self, code: &str, redirect_uri: Option<&str>) -> AppResult<OAuthToken> {
        let mut params = vec![("grant_type", "authorization_code"), ("code", code)];
        if let Some(redirect_uri) = redirect_uri {
            params.push(("redirect_uri", redirect_uri));
        }
        self.request_token(&params, CallKind::UserGrant).await
    }

    async fn exchange_password(&self, username: &str, password: &str) -> AppResult<OAuthToken> {
        let params = [("grant_type", "password"), ("username", username), ("password", password)];
        self.request_token(&params, CallKind::UserGrant).await
    }

    async fn exchange_client_credentials(&self, refresh: bool) -> AppResult<OAuthToken> {
        if !refresh {
            if let Some(token) = self.client_token.get() {
                return Ok(token);
            }
        }

        let token = self
            .request_token(&[("grant_type", "client_credentials")], CallKind::Client)
            .await?;
        self.client_token.store(&token, Utc::now().timestamp());
        Ok(token)
    }

    async fn get_user(&self, user_id: &str) -> AppResult<UserInfo> {
        let token = self.exchange_client_credentials(false).await?;
        let response = self
            .http
            .get(self.url(&format!("/api/users/{}", urlencoding::encode(user_id))))
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| send_failed("UC 사용자 조회", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("사용자를 찾을 수 없습니다: {}", user_id)));
        }

        let envelope: Envelope<UcUser> = read_json(response, "UC 사용자 조회", CallKind::Client).await?;
        envelope
            .into_result()
            .map(UserInfo::from)
            .ok_or_else(|| AppError::NotFound(format!("사용자를 찾을 수 없습니다: {}", user_id)))
    }

    async fn logout(&self, credential: &AuthCredential) -> AppResult<()> {
        remove_session(&self.sessions, credential).await
    }
}
