use actix_web::cookie::Cookie;
use async_trait::async_trait;

use crate::config::IdentityProviderKind;
use crate::domain::models::auth::RequestCookies;
use crate::domain::models::identity::{AuthCredential, LoadedCredential, OAuthToken, UserInfo};
use crate::errors::errors::AppResult;

/// 사용자 ID 백엔드 공통 인터페이스
///
/// 인증 체인과 핸들러는 이 트레이트만 알고, 어떤 백엔드가 선택되었는지는 시작 시점 설정으로 결정됩니다.
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    fn kind(&self) -> IdentityProviderKind;

    /// 요청 쿠키에서 자격 증명을 읽습니다.
    ///
    /// 쿠키가 없으면 빈 자격 증명을 반환하며 에러가 아닙니다.
    /// 세션을 연장하거나 토큰을 갱신한 경우 응답에 설정할 쿠키가 함께 반환됩니다.
    async fn load(&self, cookies: &RequestCookies, host: &str) -> AppResult<LoadedCredential>;

    /// 새로 교환한 토큰을 저장하고 응답에 설정할 쿠키를 반환합니다.
    async fn persist(&self, token: &OAuthToken, host: &str) -> AppResult<Vec<Cookie<'static>>>;

    async fn me(&self, credential: &AuthCredential) -> AppResult<UserInfo>;

    async fn exchange_code(&self, code: &str, redirect_uri: Option<&str>) -> AppResult<OAuthToken>;

    async fn exchange_password(&self, username: &str, password: &str) -> AppResult<OAuthToken>;

    /// 게이트웨이 자신의 토큰. 만료 전까지 캐시되며 `refresh` 면 새로 발급받습니다.
    async fn exchange_client_credentials(&self, refresh: bool) -> AppResult<OAuthToken>;

    /// 다른 사용자 조회 (관리자 API)
    async fn get_user(&self, user_id: &str) -> AppResult<UserInfo>;

    async fn logout(&self, credential: &AuthCredential) -> AppResult<()>;
}
