//! Authentication HTTP Handlers
//!
//! 게이트웨이 로그인 세션을 만들고 없애는 엔드포인트입니다.
//!
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | `POST` | `/api/openapi/login` | 사용자 이름/비밀번호 로그인 |
//! | `POST` | `/api/openapi/logout` | 로그아웃, 세션 쿠키 만료 |
//! | `GET` | `/api/openapi/auth/callback` | 인가 코드 교환 후 `referer` 로 302 |
use actix_web::http::header::LOCATION;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::domain::dto::{ApiResponse, LoginResponse, OAuthCallbackQuery, PasswordLoginRequest};
use crate::domain::models::auth::{AuthOptions, AuthRequest};
use crate::domain::models::identity::AuthCredential;
use crate::errors::errors::AppError;
use crate::services::auth::UserAuthFacade;
use crate::services::sessions::SessionService;

fn request_host(req: &HttpRequest) -> String {
    req.connection_info().host().to_string()
}

/// 비밀번호 로그인 핸들러
///
/// password grant 로 업스트림 토큰을 받고, 사용자 정보를 확인한 뒤 세션 쿠키를 발급합니다.
///
/// # Endpoint
/// `POST /api/openapi/login`
#[post("/login")]
pub async fn login(
    req: HttpRequest,
    facade: web::Data<UserAuthFacade>,
    sessions: web::Data<SessionService>,
    payload: web::Json<PasswordLoginRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let backend = facade.backend();
    let token = backend
        .exchange_password(&payload.username, &payload.password)
        .await
        .inspect_err(|e| log::warn!("로그인 실패 - 사용자: {}, 에러: {}", payload.username, e))?;

    let credential = AuthCredential {
        access_token: Some(token.access_token.clone()),
        ..Default::default()
    };
    let user = backend.me(&credential).await?;
    let cookies = backend.persist(&token, &request_host(&req)).await?;

    log::info!("로그인 성공 - 사용자: {}, ID: {}", payload.username, user.id);

    let mut response = HttpResponse::Ok();
    for cookie in cookies {
        response.cookie(cookie);
    }
    Ok(response.json(ApiResponse::success(LoginResponse {
        user,
        session_expires_in: sessions.settings().max_age_seconds,
    })))
}

/// 로그아웃 핸들러
///
/// 세션이 없거나 이미 만료되었어도 성공으로 응답하고 세션 쿠키를 지웁니다.
///
/// # Endpoint
/// `POST /api/openapi/logout`
#[post("/logout")]
pub async fn logout(
    req: HttpRequest,
    facade: web::Data<UserAuthFacade>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let auth_request = AuthRequest::from_http(&req, AuthOptions::public());
    let mut state = facade.state(&auth_request);

    match state.credential().await {
        Ok(credential) => facade.backend().logout(credential).await?,
        Err(AppError::AuthenticationError(_)) => log::debug!("로그아웃 - 세션 없음"),
        Err(e) => return Err(e),
    }

    Ok(HttpResponse::Ok()
        .cookie(sessions.expired_session_cookie(&auth_request.host))
        .json(ApiResponse::success(true)))
}

/// 인가 코드 콜백 핸들러
///
/// # Endpoint
/// `GET /api/openapi/auth/callback?code={code}&redirect_uri={uri}&referer={path}`
#[get("/auth/callback")]
pub async fn oauth_callback(
    req: HttpRequest,
    facade: web::Data<UserAuthFacade>,
    query: web::Query<OAuthCallbackQuery>,
) -> Result<HttpResponse, AppError> {
    query.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let backend = facade.backend();
    let token = backend
        .exchange_code(&query.code, query.redirect_uri.as_deref())
        .await
        .inspect_err(|e| log::warn!("인가 코드 교환 실패: {}", e))?;
    let cookies = backend.persist(&token, &request_host(&req)).await?;

    let mut response = HttpResponse::Found();
    response.insert_header((LOCATION, query.redirect_target()));
    for cookie in cookies {
        response.cookie(cookie);
    }
    Ok(response.finish())
}
