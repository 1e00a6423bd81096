//! Bearer 토큰 검증
//!
//! 두 종류의 Bearer 토큰을 받습니다.
//!
//! | 형식 | 검증 |
//! |------|------|
//! | JWT (`aaa.bbb.ccc`) | OAuth2 서버가 HS256 으로 서명한 클라이언트 토큰. 로컬에서 서명과 만료를 검증 |
//! | 그 외 | 액세스 키. `GET {ACCESS_KEY_SERVICE_ADDR}/api/access-keys/{token}` 로 조회 |
//!
//! 검증 결과는 토큰 해시를 키로 [`TokenCache`] 에 보관하며, JWT 는 만료 시각을 넘겨 캐시되지 않습니다.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::caching::TokenCache;
use crate::config::TokenSettings;
use crate::domain::models::auth::Identity;
use crate::errors::errors::{AppError, AppResult};
use crate::services::identity::upstream::{http_client, read_json, send_failed, CallKind, Envelope};
use crate::utils::http_utils::{is_jwt_format, INTERNAL_CLIENT_HEADER};
use crate::utils::string_utils::{deserialize_string_id, sha256_hex};

/// OAuth2 서버가 발급한 클라이언트 토큰의 클레임
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientTokenClaims {
    pub client_id: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessKey {
    #[serde(deserialize_with = "deserialize_string_id")]
    id: String,
    #[serde(deserialize_with = "deserialize_string_id")]
    creator_id: String,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_id")]
    scope_id: String,
    status: String,
}

pub const ACCESS_KEY_ACTIVE: &str = "ACTIVE";
pub const ACCESS_KEY_CLIENT_NAME: &str = "access-key";

pub struct TokenValidator {
    http: reqwest::Client,
    settings: TokenSettings,
    cache: TokenCache<Identity>,
}

impl TokenValidator {
    pub fn new(settings: TokenSettings, timeout_seconds: u64) -> AppResult<Self> {
        let cache = TokenCache::new(settings.cache_capacity, Duration::from_secs(settings.cache_ttl_seconds));
        Ok(Self {
            http: http_client(timeout_seconds)?,
            settings,
            cache,
        })
    }

    /// Bearer 토큰을 검증하고 신원을 반환합니다.
    pub async fn validate(&self, token: &str) -> AppResult<Identity> {
        let key = sha256_hex(token);
        if let Some(identity) = self.cache.get(&key) {
            return Ok(identity);
        }

        if is_jwt_format(token) {
            let claims = self.verify_jwt(token)?;
            let remaining = (claims.exp - Utc::now().timestamp()).max(0) as u64;
            let identity = Self::identity_from_claims(claims);
            self.cache.insert_with_ttl(key, identity.clone(), Duration::from_secs(remaining));
            return Ok(identity);
        }

        let identity = self.lookup_access_key(token).await?;
        self.cache.insert(key, identity.clone());
        Ok(identity)
    }

    pub fn verify_jwt(&self, token: &str) -> AppResult<ClientTokenClaims> {
        let Some(secret) = self.settings.jwt_secret.as_deref() else {
            return Err(AppError::AuthenticationError("JWT 토큰을 검증할 수 없습니다".to_string()));
        };

        let decoding_key = DecodingKey::from_secret(secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);

        decode::<ClientTokenClaims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::AuthenticationError("토큰이 만료되었습니다".to_string())
                }
                _ => {
                    log::debug!("JWT 검증 실패: {}", e);
                    AppError::AuthenticationError("유효하지 않은 토큰입니다".to_string())
                }
            })
    }

    fn identity_from_claims(claims: ClientTokenClaims) -> Identity {
        let client_name = claims.client_name.unwrap_or_else(|| claims.client_id.clone());
        Identity {
            user_id: claims.user_id,
            org_id: claims.org_id,
            ..Identity::for_client(claims.client_id, client_name)
        }
    }

    async fn lookup_access_key(&self, token: &str) -> AppResult<Identity> {
        let response = self
            .http
            .get(format!(
                "{}/api/access-keys/{}",
                self.settings.access_key_addr,
                urlencoding::encode(token)
            ))
            .header(INTERNAL_CLIENT_HEADER, "openapi")
            .send()
            .await
            .map_err(|e| send_failed("액세스 키 조회", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::AuthenticationError("유효하지 않은 토큰입니다".to_string()));
        }

        let envelope: Envelope<AccessKey> = read_json(response, "액세스 키 조회", CallKind::Client).await?;
        let key = envelope
            .into_result()
            .ok_or_else(|| AppError::AuthenticationError("유효하지 않은 토큰입니다".to_string()))?;

        if key.status != ACCESS_KEY_ACTIVE {
            log::warn!("비활성 액세스 키 사용 시도 - id: {}, status: {}", key.id, key.status);
            return Err(AppError::AuthenticationError("비활성화된 액세스 키입니다".to_string()));
        }

        let org_id = match key.scope.as_deref() {
            Some(scope) if scope.eq_ignore_ascii_case("org") && !key.scope_id.is_empty() => Some(key.scope_id),
            _ => None,
        };

        Ok(Identity {
            user_id: Some(key.creator_id),
            org_id,
            ..Identity::for_client(key.id, ACCESS_KEY_CLIENT_NAME)
        })
    }
}
