use std::sync::Arc;

use async_trait::async_trait;

use crate::caching::TokenCache;
use crate::domain::models::auth::{AuthRequest, Identity};
use crate::domain::models::identity::AuthCredential;
use crate::errors::errors::AppError;
use crate::middlewares::authers::{AuthOutcome, AuthResult, Auther};
use crate::services::identity::IdentityBackend;
use crate::utils::http_utils::basic_credentials;
use crate::utils::string_utils::sha256_hex;

/// `Authorization: Basic` 인증
///
/// 사용자 이름/비밀번호를 ID 백엔드의 password grant 로 교환해 사용자를 확인합니다.
/// 같은 헤더 값의 결과는 캐시되어 매 요청마다 토큰을 교환하지 않습니다.
pub struct BasicAuther {
    backend: Arc<dyn IdentityBackend>,
    cache: TokenCache<Identity>,
}

impl BasicAuther {
    pub const WEIGHT: i32 = 90;

    pub fn new(backend: Arc<dyn IdentityBackend>, cache: TokenCache<Identity>) -> Self {
        Self { backend, cache }
    }
}

#[async_trait]
impl Auther for BasicAuther {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn weight(&self) -> i32 {
        Self::WEIGHT
    }

    fn matches(&self, req: &AuthRequest) -> bool {
        req.options.check_basic_auth && req.authorization().and_then(basic_credentials).is_some()
    }

    async fn check(&self, req: &AuthRequest) -> AuthResult<AuthOutcome> {
        let header = req
            .authorization()
            .ok_or_else(|| AppError::AuthenticationError("Authorization 헤더가 없습니다".to_string()))?;
        let key = sha256_hex(header);
        if let Some(identity) = self.cache.get(&key) {
            return Ok(AuthOutcome::new(identity));
        }

        let (username, password) = basic_credentials(header)
            .ok_or_else(|| AppError::AuthenticationError("잘못된 Basic 인증 헤더입니다".to_string()))?;

        let token = self.backend.exchange_password(&username, &password).await?;
        let credential = AuthCredential {
            access_token: Some(token.access_token),
            ..Default::default()
        };
        let user = self.backend.me(&credential).await?;
        log::debug!("Basic 인증 성공 - user_id: {}", user.id);

        let identity = Identity::for_user(user);
        self.cache.insert(key, identity.clone());
        Ok(AuthOutcome::new(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::auth::AuthOptions;
    use crate::services::auth::user_state::tests::StubBackend;
    use actix_web::http::Method;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn basic(user: &str, password: &str) -> AuthRequest {
        AuthRequest::new(Method::GET, "/api/x")
            .with_options(AuthOptions::public().with_basic_auth())
            .with_header("Authorization", &format!("Basic {}", STANDARD.encode(format!("{}:{}", user, password))))
    }

    #[actix_web::test]
    async fn test_basic_login_is_cached() {
        let backend = Arc::new(StubBackend::default());
        let auther = BasicAuther::new(backend.clone(), TokenCache::new(8, Duration::from_secs(60)));
        let req = basic("2", "pw");

        assert!(auther.matches(&req));
        for _ in 0..2 {
            let outcome = auther.check(&req).await.unwrap();
            assert_eq!(outcome.identity.user_id.as_deref(), Some("2"));
        }
        assert_eq!(backend.me_calls.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn test_wrong_password() {
        let auther = BasicAuther::new(Arc::new(StubBackend::default()), TokenCache::new(8, Duration::from_secs(60)));
        let err = auther.check(&basic("2", "nope")).await.unwrap_err();
        assert!(matches!(err.error, AppError::AuthenticationError(_)));
    }

    #[test]
    fn test_does_not_match_without_flag() {
        let auther = BasicAuther::new(Arc::new(StubBackend::default()), TokenCache::new(8, Duration::from_secs(60)));
        assert!(!auther.matches(&basic("2", "pw").with_options(AuthOptions::login())));
    }
}
