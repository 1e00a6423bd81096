//! 인증 서비스 모듈
//!
//! - [`token_validator`] - Bearer 토큰(JWT 클라이언트 토큰, 액세스 키) 검증
//! - [`org_service`] - 조직 조회와 조직 접근 권한 확인
//! - [`user_state`] - 요청 단위 로그인 사용자 상태와 `UserAuthFacade`

pub mod org_service;
pub mod token_validator;
pub mod user_state;

pub use org_service::{OrgClient, OrgDirectory};
pub use token_validator::TokenValidator;
pub use user_state::{UserAuthFacade, UserStage, UserState};
