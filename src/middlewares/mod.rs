//! 미들웨어 모듈
//!
//! OpenAPI 게이트웨이의 인증 파이프라인을 제공합니다.
//!
//! ```text
//! 요청 ─► 신뢰 헤더 제거 ─► AuthChain (첫 매치 인증기) ─► 권한 초과 검사
//!                                   │
//!                                   ▼
//!            User-ID / Org-ID / Client-ID / Client-Name 주입 ─► 핸들러 / 프록시
//! ```
//!
//! # 사용 방법
//!
//! ```rust,ignore
//! use actix_web::{web, App};
//!
//! App::new()
//!     .service(
//!         web::scope("/api/openapi/users")
//!             .wrap(OpenApiAuth::new(chain.clone(), AuthOptions::login().with_token()))
//!             .route("/me", web::get().to(current_user))
//!     )
//!     .service(
//!         web::scope("/api/openapi/login")
//!             .wrap(OpenApiAuth::public(chain.clone()))
//!     )
//! ```

pub mod auth_middleware;
mod auth_inner;
pub mod authers;
pub mod chain;

// 미들웨어 재export
pub use auth_middleware::OpenApiAuth;
pub use chain::AuthChain;
