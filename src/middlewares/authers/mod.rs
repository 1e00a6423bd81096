//! # 인증기(Auther)와 권한 초과 검사기
//!
//! | Auther | weight | 조건 |
//! |--------|--------|------|
//! | [`TokenAuther`] | 100 | `check_token` + `Authorization: Bearer` |
//! | [`BasicAuther`] | 90 | `check_basic_auth` + `Authorization: Basic` |
//! | [`LoginAuther`] | 50 | `check_login` |
//! | [`TryLoginAuther`] | 10 | `try_check_login` |
//!
//! 인증이 끝난 뒤에는 [`OverPermissionChecker`] 들이 신원이 요청 대상에 접근할 수 있는지 확인합니다.

pub mod basic;
pub mod login;
pub mod org_name;
pub mod token;

use std::fmt;

use actix_web::cookie::Cookie;
use async_trait::async_trait;

use crate::domain::models::auth::{AuthRequest, Identity};
use crate::errors::errors::{AppError, AppResult};

pub use basic::BasicAuther;
pub use login::{LoginAuther, TryLoginAuther};
pub use org_name::OrgNameChecker;
pub use token::TokenAuther;

/// 인증 성공 결과
#[derive(Debug, Clone, Default)]
pub struct AuthOutcome {
    pub identity: Identity,
    /// 응답에 설정할 쿠키 (세션 연장, 토큰 갱신)
    pub cookies: Vec<Cookie<'static>>,
}

impl AuthOutcome {
    pub fn new(identity: Identity) -> Self {
        Self { identity, cookies: Vec::new() }
    }

    pub fn with_cookies(mut self, cookies: Vec<Cookie<'static>>) -> Self {
        self.cookies.extend(cookies);
        self
    }
}

/// 인증 실패
///
/// 세션 저장소가 세션을 버렸다면 만료 쿠키가 `cookies` 에 담겨 거부 응답에도 실립니다.
#[derive(Debug)]
pub struct AuthFailure {
    pub error: AppError,
    pub cookies: Vec<Cookie<'static>>,
}

impl AuthFailure {
    pub fn with_cookies(mut self, cookies: Vec<Cookie<'static>>) -> Self {
        self.cookies.extend(cookies);
        self
    }
}

impl From<AppError> for AuthFailure {
    fn from(error: AppError) -> Self {
        Self { error, cookies: Vec::new() }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

pub type AuthResult<T> = Result<T, AuthFailure>;

#[async_trait]
pub trait Auther: Send + Sync {
    fn name(&self) -> &'static str;

    /// 높을수록 먼저 시도됩니다.
    fn weight(&self) -> i32;

    /// 이 인증기가 요청을 맡을지. 맡으면 다른 인증기는 시도되지 않습니다.
    fn matches(&self, req: &AuthRequest) -> bool;

    async fn check(&self, req: &AuthRequest) -> AuthResult<AuthOutcome>;
}

#[async_trait]
pub trait OverPermissionChecker: Send + Sync {
    fn name(&self) -> &'static str;

    fn weight(&self) -> i32;

    fn matches(&self, req: &AuthRequest) -> bool;

    /// 접근을 허용하면 `identity` 를 보강(`Org-ID` 등)하고, 거부하면 `AuthorizationError`.
    async fn check(&self, req: &AuthRequest, identity: &mut Identity) -> AppResult<()>;
}
