//! # Configuration Module
//!
//! 게이트웨이 인증 서비스의 설정 관리를 담당하는 모듈입니다.
//! 환경 변수 기반의 설정값들을 중앙집중식으로 관리하며, `.env` 파일은 `main` 에서
//! `PROFILE` 값에 따라 로드됩니다.
//!
//! ## 모듈 구성
//!
//! - [`data_config`] - 실행 환경, 서버, Rate Limiting, 프록시 설정
//! - [`auth_config`] - ID 백엔드, 세션 쿠키, CSRF, 토큰 검증 설정
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::config::{IdentityConfig, SessionConfig, ServerConfig};
//!
//! let provider = IdentityConfig::provider();
//! let session = SessionConfig::settings();
//! println!("{} on {}:{}", provider, ServerConfig::host(), ServerConfig::port());
//! ```

pub mod data_config;
pub mod auth_config;

pub use data_config::*;
pub use auth_config::*;
