//! 업스트림 HTTP 호출 공통 처리
//!
//! 상태 코드 → `AppError` 변환 규칙과 client-credentials 토큰 캐시를 백엔드들이 공유합니다.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::caching::TokenCache;
use crate::domain::models::identity::OAuthToken;
use crate::errors::errors::{AppError, AppResult, ErrorContext};

/// 호출 종류에 따라 4xx 를 사용자 인증 실패로 볼지 결정합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// 사용자 자격 증명으로 토큰을 교환하는 호출 (code, password, refresh_token grant)
    UserGrant,
    /// 사용자 토큰 / 쿠키로 호출
    UserCredential,
    /// 게이트웨이 자신의 client 자격 증명으로 호출
    Client,
}

impl CallKind {
    fn is_auth_failure(&self, status: StatusCode) -> bool {
        match self {
            CallKind::UserGrant => matches!(
                status,
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
            ),
            CallKind::UserCredential => matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN),
            CallKind::Client => false,
        }
    }
}

pub fn http_client(timeout_seconds: u64) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .context("HTTP 클라이언트 생성 실패")
}

pub fn send_failed(what: &str, err: reqwest::Error) -> AppError {
    log::error!("{} 요청 실패: {}", what, err);
    AppError::ExternalServiceError(format!("{} 요청 실패: {}", what, err))
}

/// 2xx 가 아니면 에러로 바꾸고, 2xx 면 JSON 본문을 파싱합니다.
pub async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
    kind: CallKind,
) -> AppResult<T> {
    let response = ensure_success(response, what, kind).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| AppError::ExternalServiceError(format!("{} 응답 파싱 실패: {}", what, e)))
}

pub async fn ensure_success(
    response: reqwest::Response,
    what: &str,
    kind: CallKind,
) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if kind.is_auth_failure(status) {
        log::warn!("{} 거부됨 ({}): {}", what, status, body);
        return Err(AppError::AuthenticationError(format!("{} 거부됨 ({})", what, status.as_u16())));
    }

    log::error!("{} 실패 ({}): {}", what, status, body);
    Err(AppError::ExternalServiceError(format!("{} 실패 ({})", what, status.as_u16())))
}

/// `{success, result}` / `{success, data}` 형태의 응답 봉투
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(alias = "data")]
    pub result: Option<T>,
}

impl<T> Envelope<T> {
    /// `success: false` 이거나 본문이 없으면 `None`
    pub fn into_result(self) -> Option<T> {
        if self.success == Some(false) {
            return None;
        }
        self.result
    }
}

/// 만료 60초 전까지 재사용할 client-credentials 토큰 캐시
pub struct ClientTokenCache {
    cache: TokenCache<OAuthToken>,
}

const CLIENT_TOKEN_KEY: &str = "client_credentials";
const CLIENT_TOKEN_MARGIN_SECONDS: i64 = 60;
/// 만료 시각이 없는 토큰의 재사용 기간
const CLIENT_TOKEN_DEFAULT_TTL: Duration = Duration::from_secs(3600);

impl ClientTokenCache {
    pub fn new() -> Self {
        Self { cache: TokenCache::new(1, CLIENT_TOKEN_DEFAULT_TTL) }
    }

    pub fn get(&self) -> Option<OAuthToken> {
        self.cache.get(CLIENT_TOKEN_KEY)
    }

    pub fn store(&self, token: &OAuthToken, now: i64) {
        let ttl = match token.remaining_seconds(now) {
            Some(remaining) => Duration::from_secs((remaining - CLIENT_TOKEN_MARGIN_SECONDS).max(0) as u64),
            None => CLIENT_TOKEN_DEFAULT_TTL,
        };
        self.cache.insert_with_ttl(CLIENT_TOKEN_KEY.to_string(), token.clone(), ttl);
    }

    pub fn clear(&self) {
        self.cache.remove(CLIENT_TOKEN_KEY);
    }
}

impl Default for ClientTokenCache {
    fn default() -> Self {
        Self::new()
    }
}
