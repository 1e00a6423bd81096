//! # Service Layer
//!
//! - [`sessions`] - 게이트웨이 로그인 세션과 쿠키
//! - [`identity`] - UC / IAM / Kratos ID 백엔드
//! - [`auth`] - Bearer 토큰 검증, 조직 디렉터리, 요청 단위 사용자 상태

pub mod auth;
pub mod identity;
pub mod sessions;
