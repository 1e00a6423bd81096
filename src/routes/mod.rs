//! API 라우트 설정 모듈
//!
//! 라우트 그룹마다 다른 [`AuthOptions`] 로 `OpenApiAuth` 를 적용합니다.
//!
//! | 경로 | 인증 |
//! |------|------|
//! | `GET /health` | 없음 |
//! | `/api/openapi/users/*` | 세션 또는 Bearer 토큰 |
//! | `/api/openapi/{login,logout,auth/callback}` | 없음 (신뢰 헤더만 제거) |
//! | `/api/**` (프록시) | Bearer, Basic, 세션 + 조직 권한 |
//!
//! actix 스코프는 접두사로 매칭되므로 더 구체적인 스코프를 먼저 등록합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! App::new().configure(|cfg| configure_all_routes(cfg, chain.clone()))
//! ```

use std::sync::Arc;

use actix_web::web;
use serde_json::json;

use crate::domain::models::auth::AuthOptions;
use crate::handlers;
use crate::middlewares::{AuthChain, OpenApiAuth};

/// 사용자 API 인증 요구 사항
pub const USER_API_AUTH: AuthOptions = AuthOptions::login().with_token();

/// 프록시 대상 API 인증 요구 사항
pub const PROXY_AUTH: AuthOptions = AuthOptions::login().with_token().with_basic_auth().with_org_check();

/// 모든 라우트를 설정합니다
pub fn configure_all_routes(cfg: &mut web::ServiceConfig, chain: Arc<AuthChain>) {
    cfg.service(health_check);

    configure_user_routes(cfg, chain.clone());
    configure_auth_routes(cfg, chain.clone());
    configure_proxy_routes(cfg, chain);
}

/// - `GET /api/openapi/users/me`
/// - `GET /api/openapi/users/{id}`
fn configure_user_routes(cfg: &mut web::ServiceConfig, chain: Arc<AuthChain>) {
    cfg.service(
        web::scope("/api/openapi/users")
            .wrap(OpenApiAuth::new(chain, USER_API_AUTH))
            .service(handlers::users::current_user)
            .service(handlers::users::get_user),
    );
}

/// 로그인/로그아웃/콜백은 인증 없이 접근 가능합니다 (인증을 위한 엔드포인트이므로).
fn configure_auth_routes(cfg: &mut web::ServiceConfig, chain: Arc<AuthChain>) {
    cfg.service(
        web::scope("/api/openapi")
            .wrap(OpenApiAuth::public(chain))
            .service(handlers::auth::login)
            .service(handlers::auth::logout)
            .service(handlers::auth::oauth_callback),
    );
}

fn configure_proxy_routes(cfg: &mut web::ServiceConfig, chain: Arc<AuthChain>) {
    cfg.service(
        web::scope("/api")
            .wrap(OpenApiAuth::new(chain, PROXY_AUTH))
            .route("/{tail:.*}", web::to(handlers::proxy::forward)),
    );
}

/// 서비스 상태를 확인하는 헬스체크 엔드포인트
///
/// ```bash
/// curl http://localhost:8080/health
/// ```
#[actix_web::get("/health")]
async fn health_check() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "openapi_auth",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionSettings;
    use crate::handlers::proxy::ProxyClient;
    use crate::middlewares::authers::{Auther, LoginAuther, TryLoginAuther};
    use crate::repositories::sessions::MemorySessionStore;
    use crate::services::auth::user_state::tests::{StubBackend, StubOrgs};
    use crate::services::auth::UserAuthFacade;
    use crate::services::sessions::SessionService;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    macro_rules! app {
        () => {{
            let facade = UserAuthFacade::new(Arc::new(StubBackend::default()), Arc::new(StubOrgs::default()));
            let settings = SessionSettings { csrf_enabled: false, ..Default::default() };
            let authers: Vec<Arc<dyn Auther>> = vec![
                Arc::new(LoginAuther::new(facade.clone(), settings.clone())),
                Arc::new(TryLoginAuther::new(facade.clone())),
            ];
            let chain = Arc::new(AuthChain::new(authers, Vec::new()));
            let sessions = SessionService::with_store(Arc::new(MemorySessionStore::new()), settings);

            test::init_service(
                App::new()
                    .app_data(web::Data::new(facade))
                    .app_data(web::Data::new(sessions))
                    .app_data(web::Data::new(ProxyClient::new("http://127.0.0.1:1", 1).unwrap()))
                    .configure(|cfg| configure_all_routes(cfg, chain.clone())),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_health() {
        let app = app!();
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
    }

    #[actix_web::test]
    async fn test_route_auth_levels() {
        let app = app!();

        // 로그인 엔드포인트는 공개
        let req = test::TestRequest::post()
            .uri("/api/openapi/login")
            .set_json(json!({"username": "2", "password": "pw"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/openapi/users/me").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/openapi/users/me")
            .insert_header(("Cookie", "OPENAPISESSION=2"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/projects").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
