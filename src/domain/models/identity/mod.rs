//! 사용자 / 토큰 / 자격 증명 모델

pub mod user_info;
pub mod oauth_token;
pub mod credential;

pub use user_info::*;
pub use oauth_token::*;
pub use credential::*;
