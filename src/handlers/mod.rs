//! # HTTP Request Handlers Module
//!
//! ```text
//! Client ─► OpenApiAuth (인증 체인) ─► Handlers (이 모듈) ─► IdentityBackend / SessionService
//!                                          └─► proxy ─► PROXY_UPSTREAM
//! ```
//!
//! - **`auth`**: 로그인, 로그아웃, 인가 코드 콜백
//! - **`users`**: 현재 사용자, 사용자 조회
//! - **`proxy`**: 인증된 요청의 다운스트림 전달
//!
//! 핸들러는 `web::Data` 로 주입된 [`crate::services::auth::UserAuthFacade`],
//! [`crate::services::sessions::SessionService`], [`proxy::ProxyClient`] 를 사용합니다.

pub mod auth;
pub mod proxy;
pub mod users;
