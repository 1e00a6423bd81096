//! # Domain Layer Module
//!
//! 게이트웨이 인증 도메인의 타입을 정의합니다.
//!
//! ```text
//! Domain Layer (이 모듈)
//! ├── Models  - 사용자, 토큰, 자격 증명, 신원, 조직 권한
//! └── DTOs    - 로그인 / 콜백 요청, 응답 래퍼
//!      │
//!      ▼
//! Services (ID 백엔드, 세션, 조직 디렉터리)
//!      │
//!      ▼
//! Middlewares (Auther 체인)
//! ```
//!
//! 백엔드마다 다른 업스트림 JSON 은 서비스 계층에서 [`models::UserInfo`] 와
//! [`models::OAuthToken`] 으로 정규화되며, 인증 체인 바깥으로는 [`models::Identity`] 만 나갑니다.

pub mod dto;
pub mod models;

pub use dto::{ApiResponse, LoginResponse, OAuthCallbackQuery, PasswordLoginRequest};
pub use models::{
    AuthCredential, AuthOptions, AuthRequest, Identity, OAuthToken, OrgInfo, ScopeInfo, UserInfo,
};
