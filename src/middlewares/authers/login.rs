use async_trait::async_trait;

use crate::config::SessionSettings;
use crate::domain::models::auth::{AuthRequest, Identity};
use crate::errors::errors::{AppError, AppResult};
use crate::middlewares::authers::{AuthFailure, AuthOutcome, AuthResult, Auther};
use crate::services::auth::UserAuthFacade;
use crate::utils::http_utils::is_safe_method;

/// 세션(로그인 쿠키) 인증
///
/// 상태를 바꾸는 메서드에는 CSRF 더블 서브밋 검사를 먼저 수행합니다.
pub struct LoginAuther {
    facade: UserAuthFacade,
    settings: SessionSettings,
}

impl LoginAuther {
    pub const WEIGHT: i32 = 50;

    pub fn new(facade: UserAuthFacade, settings: SessionSettings) -> Self {
        Self { facade, settings }
    }

    fn verify_csrf(&self, req: &AuthRequest) -> AppResult<()> {
        if !self.settings.csrf_enabled || is_safe_method(&req.method) {
            return Ok(());
        }

        let cookie = req.cookie(&self.settings.csrf_cookie_name);
        let header = req.header(&self.settings.csrf_header_name);
        match (cookie, header) {
            (Some(cookie), Some(header)) if cookie == header => Ok(()),
            _ => {
                log::warn!("CSRF 토큰 불일치 - {} {}", req.method, req.path);
                Err(AppError::AuthorizationError("CSRF 토큰이 유효하지 않습니다".to_string()))
            }
        }
    }
}

#[async_trait]
impl Auther for LoginAuther {
    fn name(&self) -> &'static str {
        "login"
    }

    fn weight(&self) -> i32 {
        Self::WEIGHT
    }

    fn matches(&self, req: &AuthRequest) -> bool {
        req.options.check_login
    }

    async fn check(&self, req: &AuthRequest) -> AuthResult<AuthOutcome> {
        self.verify_csrf(req)?;

        let mut state = self.facade.state(req);
        let user = match state.user_info().await.cloned() {
            Ok(user) => user,
            Err(error) => return Err(AuthFailure::from(error).with_cookies(state.take_refreshed_cookies())),
        };
        log::debug!("세션 인증 성공 - user_id: {}", user.id);

        Ok(AuthOutcome::new(Identity::for_user(user)).with_cookies(state.take_refreshed_cookies()))
    }
}

/// 로그인되어 있으면 사용자로 식별하고, 아니면 익명으로 통과시키는 인증
pub struct TryLoginAuther {
    facade: UserAuthFacade,
}

impl TryLoginAuther {
    pub const WEIGHT: i32 = 10;

    pub fn new(facade: UserAuthFacade) -> Self {
        Self { facade }
    }
}

#[async_trait]
impl Auther for TryLoginAuther {
    fn name(&self) -> &'static str {
        "try-login"
    }

    fn weight(&self) -> i32 {
        Self::WEIGHT
    }

    fn matches(&self, req: &AuthRequest) -> bool {
        req.options.try_check_login
    }

    async fn check(&self, req: &AuthRequest) -> AuthResult<AuthOutcome> {
        let mut state = self.facade.state(req);
        let identity = match state.user_info().await.cloned() {
            Ok(user) => Identity::for_user(user),
            Err(AppError::AuthenticationError(reason)) => {
                log::debug!("비로그인 요청 허용 - {}", reason);
                Identity::anonymous()
            }
            Err(e) => return Err(AuthFailure::from(e).with_cookies(state.take_refreshed_cookies())),
        };

        Ok(AuthOutcome::new(identity).with_cookies(state.take_refreshed_cookies()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::auth::AuthOptions;
    use crate::services::auth::user_state::tests::{StubBackend, StubOrgs};
    use actix_web::http::Method;
    use std::sync::Arc;

    fn facade(refresh_cookie: bool) -> UserAuthFacade {
        let backend = StubBackend { refresh_cookie, ..Default::default() };
        UserAuthFacade::new(Arc::new(backend), Arc::new(StubOrgs::default()))
    }

    fn login_request(method: Method) -> AuthRequest {
        AuthRequest::new(method, "/api/projects")
            .with_host("erda.cloud")
            .with_options(AuthOptions::login())
    }

    #[actix_web::test]
    async fn test_login_with_session() {
        let auther = LoginAuther::new(facade(true), SessionSettings::default());
        let req = login_request(Method::GET).with_cookie("OPENAPISESSION", "2");

        assert!(auther.matches(&req));
        let outcome = auther.check(&req).await.unwrap();
        assert_eq!(outcome.identity.user_id.as_deref(), Some("2"));
        assert_eq!(outcome.cookies.len(), 1);
    }

    #[actix_web::test]
    async fn test_login_without_session_is_rejected() {
        let auther = LoginAuther::new(facade(false), SessionSettings::default());
        let err = auther.check(&login_request(Method::GET)).await.unwrap_err();
        assert!(matches!(err.error, AppError::AuthenticationError(_)));
        assert!(err.cookies.is_empty());
    }

    #[actix_web::test]
    async fn test_dropped_session_cookie_survives_rejection() {
        let auther = LoginAuther::new(facade(false), SessionSettings::default());
        let req = login_request(Method::GET).with_cookie("OPENAPISESSION", "dropped");

        let err = auther.check(&req).await.unwrap_err();
        assert!(matches!(err.error, AppError::AuthenticationError(_)));
        assert_eq!(err.cookies.len(), 1);
        assert_eq!(err.cookies[0].name(), "OPENAPISESSION");
        assert_eq!(err.cookies[0].value(), "");
    }

    #[actix_web::test]
    async fn test_csrf_on_unsafe_methods() {
        let settings = SessionSettings::default();
        let auther = LoginAuther::new(facade(false), settings.clone());
        let base = login_request(Method::POST).with_cookie("OPENAPISESSION", "2");

        let missing = auther.check(&base).await.unwrap_err();
        assert!(matches!(missing.error, AppError::AuthorizationError(_)));

        let mismatch = base
            .clone()
            .with_cookie(&settings.csrf_cookie_name, "a")
            .with_header(&settings.csrf_header_name, "b");
        assert!(matches!(auther.check(&mismatch).await.unwrap_err().error, AppError::AuthorizationError(_)));

        let ok = base
            .with_cookie(&settings.csrf_cookie_name, "a")
            .with_header(&settings.csrf_header_name, "a");
        assert!(auther.check(&ok).await.is_ok());
    }

    #[actix_web::test]
    async fn test_csrf_can_be_disabled() {
        let settings = SessionSettings { csrf_enabled: false, ..Default::default() };
        let auther = LoginAuther::new(facade(false), settings);
        let req = login_request(Method::DELETE).with_cookie("OPENAPISESSION", "2");
        assert!(auther.check(&req).await.is_ok());
    }

    #[actix_web::test]
    async fn test_try_login() {
        let auther = TryLoginAuther::new(facade(false));
        let anonymous = AuthRequest::new(Method::GET, "/api/public").with_options(AuthOptions::try_login());
        assert!(auther.matches(&anonymous));

        let outcome = auther.check(&anonymous).await.unwrap();
        assert!(outcome.identity.is_anonymous());

        let logged_in = anonymous.with_cookie("OPENAPISESSION", "7");
        let outcome = auther.check(&logged_in).await.unwrap();
        assert_eq!(outcome.identity.user_id.as_deref(), Some("7"));
    }

    #[actix_web::test]
    async fn test_try_login_with_rejected_credential_is_anonymous() {
        let auther = TryLoginAuther::new(facade(false));
        let req = AuthRequest::new(Method::GET, "/api/public")
            .with_options(AuthOptions::try_login())
            .with_cookie("OPENAPISESSION", "expired");
        assert!(auther.check(&req).await.unwrap().identity.is_anonymous());
    }
}
