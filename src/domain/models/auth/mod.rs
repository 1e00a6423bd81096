//! 인증 체인 입력 / 출력 모델

pub mod auth_options;
pub mod auth_request;
pub mod identity;

pub use auth_options::*;
pub use auth_request::*;
pub use identity::*;
