//! # DTO Module
//!
//! HTTP 경계에서 주고받는 요청/응답 객체입니다. 요청 DTO 는 `validator` 로 검증합니다.

pub mod auth;

pub use auth::*;
