//! # User HTTP Handlers
//!
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | `GET` | `/api/openapi/users/me` | 현재 사용자 |
//! | `GET` | `/api/openapi/users/{id}` | ID 백엔드의 사용자 조회 |
//!
//! 두 엔드포인트 모두 `OpenApiAuth` 뒤에서 동작하며 세션 또는 Bearer 토큰이 필요합니다.

use actix_web::{get, web, HttpRequest, HttpResponse};

use crate::domain::dto::ApiResponse;
use crate::domain::models::auth::{AuthOptions, AuthRequest, Identity, OptionalIdentity, RequestIdentity};
use crate::errors::errors::AppError;
use crate::services::auth::UserAuthFacade;

/// 현재 사용자 조회
///
/// 인증 체인이 이미 사용자 정보를 가져왔으면 그대로 쓰고, 토큰 신원처럼 사용자 ID 만 있으면
/// ID 백엔드에서 조회합니다. 신원이 없으면 세션에서 직접 읽습니다.
#[get("/me")]
pub async fn current_user(
    req: HttpRequest,
    identity: OptionalIdentity,
    facade: web::Data<UserAuthFacade>,
) -> Result<HttpResponse, AppError> {
    let user = match identity.0 {
        Some(Identity { user: Some(user), .. }) => user,
        Some(Identity { user_id: Some(user_id), .. }) => facade.backend().get_user(&user_id).await?,
        _ => {
            let mut state = facade.state(&AuthRequest::from_http(&req, AuthOptions::login()));
            let user = state.user_info().await?.clone();
            let mut response = HttpResponse::Ok();
            for cookie in state.take_refreshed_cookies() {
                response.cookie(cookie);
            }
            return Ok(response.json(ApiResponse::success(user)));
        }
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(user)))
}

#[get("/{user_id}")]
pub async fn get_user(
    _identity: RequestIdentity,
    user_id: web::Path<String>,
    facade: web::Data<UserAuthFacade>,
) -> Result<HttpResponse, AppError> {
    let user = facade.backend().get_user(&user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(user)))
}
