//! 게이트웨이 세션에 업스트림 토큰을 보관하는 백엔드(UC, IAM)의 공통 동작

use actix_web::cookie::Cookie;

use crate::domain::models::auth::RequestCookies;
use crate::domain::models::identity::{AuthCredential, OAuthToken};
use crate::errors::errors::AppResult;
use crate::repositories::sessions::StoredSession;
use crate::services::sessions::SessionService;

/// 세션 쿠키로 저장된 세션을 찾습니다. 쿠키가 없거나 세션이 만료되었으면 `None`.
pub async fn find_session(
    sessions: &SessionService,
    cookies: &RequestCookies,
) -> AppResult<Option<(String, StoredSession)>> {
    let Some(session_id) = cookies.get(sessions.cookie_name()) else {
        return Ok(None);
    };

    match sessions.load(session_id).await? {
        Some(stored) => Ok(Some((session_id.to_string(), stored))),
        None => {
            log::debug!("세션 쿠키는 있으나 저장된 세션이 없습니다");
            Ok(None)
        }
    }
}

/// 세션을 만들고 세션 쿠키와 CSRF 쿠키를 반환합니다.
pub async fn create_session(
    sessions: &SessionService,
    token: &OAuthToken,
    host: &str,
) -> AppResult<Vec<Cookie<'static>>> {
    let session_id = sessions.create(token).await?;
    Ok(vec![sessions.session_cookie(&session_id, host), sessions.csrf_cookie(host)])
}

/// 남은 수명이 절반 미만이면 세션을 연장하고 재발급할 쿠키를 반환합니다.
pub async fn slide_session(
    sessions: &SessionService,
    session_id: &str,
    stored: &StoredSession,
    host: &str,
) -> AppResult<Option<Cookie<'static>>> {
    if !sessions.should_slide(stored) {
        return Ok(None);
    }
    if sessions.touch(session_id).await? {
        log::debug!("세션 연장 - 남은 수명 {}초", stored.remaining_ttl_seconds);
        return Ok(Some(sessions.session_cookie(session_id, host)));
    }
    Ok(None)
}

pub async fn remove_session(sessions: &SessionService, credential: &AuthCredential) -> AppResult<()> {
    if let Some(session_id) = credential.session_id.as_deref() {
        sessions.remove(session_id).await?;
    }
    Ok(())
}
