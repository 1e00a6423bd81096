//! # Kratos 백엔드
//!
//! Kratos 는 로그인/로그아웃 브라우저 플로우를 직접 처리하므로 게이트웨이는 세션 쿠키를 읽기만 합니다.
//! 토큰 교환과 세션 저장은 지원하지 않습니다.

use actix_web::cookie::Cookie;
use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::{IdentityProviderKind, KratosSettings};
use crate::domain::models::auth::RequestCookies;
use crate::domain::models::identity::{AuthCredential, LoadedCredential, OAuthToken, UserInfo};
use crate::errors::errors::{AppError, AppResult};
use crate::services::identity::backend::IdentityBackend;
use crate::services::identity::upstream::{http_client, read_json, send_failed, CallKind};

#[derive(Debug, Default, Deserialize)]
struct KratosTraits {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KratosIdentity {
    id: String,
    #[serde(default)]
    traits: KratosTraits,
}

#[derive(Debug, Deserialize)]
struct KratosSession {
    #[serde(default)]
    active: bool,
    identity: KratosIdentity,
}

impl From<KratosIdentity> for UserInfo {
    fn from(identity: KratosIdentity) -> Self {
        let traits = identity.traits;
        let email = traits.email.unwrap_or_default();
        // username 특성이 없는 스키마는 이메일로 로그인합니다
        let name = traits.username.unwrap_or_else(|| email.clone());
        UserInfo {
            id: identity.id,
            nick: traits.nickname.unwrap_or_else(|| name.clone()),
            name,
            avatar_url: traits.avatar.unwrap_or_default(),
            phone: traits.phone.unwrap_or_default(),
            email,
        }
    }
}

pub struct KratosBackend {
    http: reqwest::Client,
    settings: KratosSettings,
}

impl KratosBackend {
    pub fn new(settings: KratosSettings, timeout_seconds: u64) -> AppResult<Self> {
        Ok(Self {
            http: http_client(timeout_seconds)?,
            settings,
        })
    }

    fn unsupported(operation: &str) -> AppError {
        AppError::UnsupportedOperation(format!("kratos 백엔드는 {} 를 지원하지 않습니다", operation))
    }
}

#[async_trait]
impl IdentityBackend for KratosBackend {
    fn kind(&self) -> IdentityProviderKind {
        IdentityProviderKind::Kratos
    }

    async fn load(&self, cookies: &RequestCookies, _host: &str) -> AppResult<LoadedCredential> {
        let name = &self.settings.session_cookie;
        Ok(match cookies.get(name) {
            Some(value) => LoadedCredential::new(AuthCredential::from_cookie(name, value)),
            None => LoadedCredential::default(),
        })
    }

    async fn persist(&self, _token: &OAuthToken, _host: &str) -> AppResult<Vec<Cookie<'static>>> {
        Err(Self::unsupported("persist"))
    }

    async fn me(&self, credential: &AuthCredential) -> AppResult<UserInfo> {
        let Some(cookie) = credential.passthrough_cookie.as_deref() else {
            return Err(AppError::AuthenticationError("로그인이 필요합니다".to_string()));
        };

        let response = self
            .http
            .get(format!("{}/sessions/whoami", self.settings.public_addr))
            .header(COOKIE, cookie)
            .send()
            .await
            .map_err(|e| send_failed("Kratos whoami", e))?;

        let session: KratosSession = read_json(response, "Kratos whoami", CallKind::UserCredential).await?;
        if !session.active {
            return Err(AppError::AuthenticationError("Kratos 세션이 비활성 상태입니다".to_string()));
        }
        Ok(session.identity.into())
    }

    async fn exchange_code(&self, _code: &str, _redirect_uri: Option<&str>) -> AppResult<OAuthToken> {
        Err(Self::unsupported("exchange_code"))
    }

    async fn exchange_password(&self, _username: &str, _password: &str) -> AppResult<OAuthToken> {
        Err(Self::unsupported("exchange_password"))
    }

    async fn exchange_client_credentials(&self, _refresh: bool) -> AppResult<OAuthToken> {
        Err(Self::unsupported("exchange_client_credentials"))
    }

    async fn get_user(&self, user_id: &str) -> AppResult<UserInfo> {
        let response = self
            .http
            .get(format!(
                "{}/admin/identities/{}",
                self.settings.admin_addr,
                urlencoding::encode(user_id)
            ))
            .send()
            .await
            .map_err(|e| send_failed("Kratos identity 조회", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("사용자를 찾을 수 없습니다: {}", user_id)));
        }

        let identity: KratosIdentity = read_json(response, "Kratos identity 조회", CallKind::Client).await?;
        Ok(identity.into())
    }

    /// 브라우저 로그아웃은 Kratos 플로우가 담당합니다.
    async fn logout(&self, _credential: &AuthCredential) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(addr: String) -> KratosBackend {
        let settings = KratosSettings {
            public_addr: addr.clone(),
            admin_addr: addr,
            session_cookie: "ory_kratos_session".to_string(),
        };
        KratosBackend::new(settings, 5).unwrap()
    }

    #[actix_web::test]
    async fn test_whoami_forwards_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sessions/whoami"))
            .and(header("cookie", "ory_kratos_session=ks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "session-1",
                "active": true,
                "identity": {"id": "7f3c", "traits": {"email": "a@erda.cloud"}}
            })))
            .mount(&server)
            .await;

        let kratos = backend(server.uri());
        let loaded = kratos
            .load(&RequestCookies::parse(["ory_kratos_session=ks"]), "erda.cloud")
            .await
            .unwrap();
        let user = kratos.me(&loaded.credential).await.unwrap();

        assert_eq!(user.id, "7f3c");
        assert_eq!(user.name, "a@erda.cloud");
        assert_eq!(user.nick, "a@erda.cloud");
    }

    #[actix_web::test]
    async fn test_inactive_or_rejected_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sessions/whoami"))
            .and(header("cookie", "ory_kratos_session=inactive"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "active": false, "identity": {"id": "7f3c", "traits": {}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sessions/whoami"))
            .and(header("cookie", "ory_kratos_session=expired"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let kratos = backend(server.uri());
        for value in ["inactive", "expired"] {
            let err = kratos
                .me(&AuthCredential::from_cookie("ory_kratos_session", value))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::AuthenticationError(_)), "{}: {:?}", value, err);
        }
    }

    #[actix_web::test]
    async fn test_get_user_from_admin_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/identities/7f3c"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "7f3c", "traits": {"email": "a@erda.cloud", "username": "alice", "nickname": "Alice"}
            })))
            .mount(&server)
            .await;

        let kratos = backend(server.uri());
        let user = kratos.get_user("7f3c").await.unwrap();
        assert_eq!(user.name, "alice");
        assert_eq!(user.nick, "Alice");

        let err = kratos.get_user("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn test_exchange_operations_unsupported() {
        let kratos = backend("http://unused".to_string());
        assert!(matches!(
            kratos.exchange_password("a", "b").await.unwrap_err(),
            AppError::UnsupportedOperation(_)
        ));
        assert!(matches!(
            kratos.exchange_client_credentials(false).await.unwrap_err(),
            AppError::UnsupportedOperation(_)
        ));
        assert!(matches!(
            kratos.persist(&OAuthToken::new("t", 0), "erda.cloud").await.unwrap_err(),
            AppError::UnsupportedOperation(_)
        ));
        assert!(kratos.logout(&AuthCredential::default()).await.is_ok());
    }
}
